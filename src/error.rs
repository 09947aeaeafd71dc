// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// List of all errors.
///
/// None of these abort a whole-document conversion. Validation errors
/// mean one primitive/clip produced garbage input and the caller should
/// render a fallback fragment for that element; reference errors degrade
/// the affected chain (filters force rasterization, clips are treated
/// as absent).
#[derive(Clone, PartialEq, Debug)]
pub enum Error {
    /// An attribute value failed to parse.
    InvalidAttribute {
        /// The offending attribute name.
        attribute: String,
        /// The raw value that failed to parse.
        value: String,
    },

    /// `kernelMatrix` length doesn't match `order`.
    KernelSizeMismatch {
        /// `orderX * orderY`.
        expected: usize,
        /// Actual number of kernel entries.
        actual: usize,
    },

    /// A convolution `divisor` of zero.
    ZeroDivisor,

    /// A filter `in`/`in2` or a `clip-path` reference that doesn't
    /// resolve to any declared result/definition.
    UnresolvedReference(String),

    /// The filter primitive dependency graph contains a cycle.
    DependencyCycle,
}

impl Error {
    /// Checks whether this is a validation error, i.e. caused by
    /// malformed rather than merely unsupported input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidAttribute { .. } | Error::KernelSizeMismatch { .. } | Error::ZeroDivisor
        )
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::InvalidAttribute { ref attribute, ref value } => {
                write!(f, "attribute '{}' has an invalid value: '{}'", attribute, value)
            }
            Error::KernelSizeMismatch { expected, actual } => {
                write!(f, "kernel matrix has {} entries, but 'order' implies {}", actual, expected)
            }
            Error::ZeroDivisor => {
                write!(f, "convolution divisor is zero")
            }
            Error::UnresolvedReference(ref name) => {
                write!(f, "reference '{}' doesn't resolve to anything", name)
            }
            Error::DependencyCycle => {
                write!(f, "filter primitives form a dependency cycle")
            }
        }
    }
}

impl std::error::Error for Error {}
