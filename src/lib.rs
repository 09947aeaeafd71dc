// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
`svg2dml` converts SVG effect constructs into the DrawingML vocabulary
used by presentation documents.

SVG filters and clip-paths have only partial, lossy equivalents in
DrawingML. This crate implements the strategy engine that decides,
per effect and per clip, how far the conversion can go:

- a *native* DrawingML effect (`a:blur`, `a:outerShdw`, `a:glow`, ...),
- an approximated *hack* built from adjacent native capabilities,
- or a structured "rasterize me" signal that the caller's raster/EMF
  pipeline must honor.

The crate never renders pixels and never touches the package container.
It consumes element nodes from an already-parsed [`roxmltree`] document
plus a caller-supplied [`Context`], and produces either an XML fragment
string or a [`RasterizeRequest`].

A single invalid primitive or clip never aborts a whole-document
conversion: malformed input degrades with a warning and a typed error
recorded on the result.
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod cache;
pub mod clip;
mod complexity;
mod context;
mod engine;
mod error;
pub mod filter;
mod geom;
mod mapper;
mod numbers;
mod svgtree;
mod units;

pub use roxmltree;

pub use crate::complexity::{classify_kernel, is_intrinsically_raster, score_chain, KernelClass};
pub use crate::context::{BasicContext, ClipPolicy, Context, PolicyVerdict, Registry};
pub use crate::engine::{FilterConversion, FilterEngine, FilterStats};
pub use crate::error::Error;
pub use crate::geom::{FuzzyEq, FuzzyZero, Point, Rect};
pub use crate::mapper::{EffectList, EffectMapper, MappedEffect, RasterizeRequest, Strategy};
pub use crate::numbers::{NonZeroF64, NormalizedValue, Opacity, PositiveNumber};
pub use crate::units::Units;

/// An RGB color.
///
/// Parsed from any CSS color notation `svgtypes` understands.
#[derive(Clone, Copy, PartialEq, Debug)]
#[allow(missing_docs)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    /// Creates a new color.
    #[inline]
    pub fn new(red: u8, green: u8, blue: u8) -> Color {
        Color { red, green, blue }
    }

    /// Creates a black color.
    #[inline]
    pub fn black() -> Color {
        Color::new(0, 0, 0)
    }

    /// Creates a white color.
    #[inline]
    pub fn white() -> Color {
        Color::new(255, 255, 255)
    }

    /// Formats the color as an RRGGBB hex string, the way
    /// DrawingML's `a:srgbClr` expects it.
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

impl From<svgtypes::Color> for Color {
    fn from(c: svgtypes::Color) -> Self {
        // Alpha is handled separately, via `opacity` attributes.
        Color::new(c.red, c.green, c.blue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_hex() {
        assert_eq!(Color::new(255, 128, 0).to_hex(), "FF8000");
        assert_eq!(Color::black().to_hex(), "000000");
    }
}
