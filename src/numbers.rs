// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::geom::{f64_bound, FuzzyEq, FuzzyZero};

macro_rules! wrap {
    ($name:ident) => {
        impl From<f64> for $name {
            #[inline]
            fn from(n: f64) -> Self {
                $name::new(n)
            }
        }

        impl PartialEq for $name {
            #[inline]
            fn eq(&self, other: &Self) -> bool {
                self.0.fuzzy_eq(&other.0)
            }
        }
    };
}

/// A normalized value.
///
/// Just like `f64` but immutable and guarantee to be in a 0..1 range.
#[derive(Clone, Copy, Debug)]
pub struct NormalizedValue(f64);

impl NormalizedValue {
    /// Creates a new `NormalizedValue` value.
    ///
    /// Out of range values are clamped.
    #[inline]
    pub fn new(n: f64) -> Self {
        NormalizedValue(f64_bound(0.0, n, 1.0))
    }

    /// Returns an underlying value.
    #[inline]
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for NormalizedValue {
    #[inline]
    fn default() -> Self {
        NormalizedValue::new(1.0)
    }
}

wrap!(NormalizedValue);

/// An alias to `NormalizedValue`.
pub type Opacity = NormalizedValue;

/// A positive number.
///
/// Just like `f64` but immutable and guarantee to be >= 0.0.
#[derive(Clone, Copy, Debug)]
pub struct PositiveNumber(f64);

impl PositiveNumber {
    /// Creates a new `PositiveNumber` value.
    ///
    /// Falls back to 0.0 when the value is negative or not finite.
    #[inline]
    pub fn new(n: f64) -> Self {
        if n.is_finite() && !n.is_sign_negative() {
            PositiveNumber(n)
        } else {
            PositiveNumber(0.0)
        }
    }

    /// Returns an underlying value.
    #[inline]
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Checks that the current number is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_fuzzy_zero()
    }
}

wrap!(PositiveNumber);

impl Default for PositiveNumber {
    #[inline]
    fn default() -> Self {
        PositiveNumber::new(0.0)
    }
}

impl std::fmt::Display for PositiveNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A non-zero `f64`.
///
/// Just like `f64` but immutable and guarantee to never be zero.
#[derive(Clone, Copy, Debug)]
pub struct NonZeroF64(f64);

impl NonZeroF64 {
    /// Creates a new `NonZeroF64` value.
    #[inline]
    pub fn new(n: f64) -> Option<Self> {
        if n.is_fuzzy_zero() {
            None
        } else {
            Some(NonZeroF64(n))
        }
    }

    /// Returns an underlying value.
    #[inline]
    pub fn value(&self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_zero() {
        assert!(NonZeroF64::new(0.0).is_none());
        assert!(NonZeroF64::new(-3.0).is_some());
    }

    #[test]
    fn normalized_clamps() {
        assert_eq!(NormalizedValue::new(1.5).value(), 1.0);
        assert_eq!(NormalizedValue::new(-0.5).value(), 0.0);
    }

    #[test]
    fn positive_fallback() {
        assert_eq!(PositiveNumber::new(-1.0).value(), 0.0);
        assert!(PositiveNumber::new(0.0).is_zero());
    }
}
