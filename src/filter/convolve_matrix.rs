// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use roxmltree::Node;

use super::{ChainBuilder, Input, Kind};
use crate::svgtree::SvgNodeExt;
use crate::{Error, FuzzyZero, NonZeroF64};

/// A matrix convolution filter primitive.
///
/// `feConvolveMatrix` element in the SVG.
#[derive(Clone, Debug)]
pub struct ConvolveMatrix {
    /// Identifies input for the given filter primitive.
    ///
    /// `in` in the SVG.
    pub input: Input,

    /// A convolve matrix.
    pub matrix: ConvolveMatrixData,

    /// A matrix divisor.
    ///
    /// `divisor` in the SVG. Guaranteed to be non-zero; an explicit
    /// zero is a validation error.
    pub divisor: NonZeroF64,

    /// A kernel matrix bias.
    ///
    /// `bias` in the SVG.
    pub bias: f64,

    /// An edges processing mode.
    ///
    /// `edgeMode` in the SVG.
    pub edge_mode: EdgeMode,

    /// An alpha preserving flag.
    ///
    /// `preserveAlpha` in the SVG.
    pub preserve_alpha: bool,
}

/// A convolve matrix representation.
///
/// Used primarily by [`ConvolveMatrix`].
#[derive(Clone, Debug)]
pub struct ConvolveMatrixData {
    columns: u32,
    rows: u32,
    data: Vec<f64>,
}

impl ConvolveMatrixData {
    /// Creates a new `ConvolveMatrixData`.
    ///
    /// Returns an error when `columns * rows != data.len()`.
    pub fn new(columns: u32, rows: u32, data: Vec<f64>) -> Result<Self, Error> {
        if (columns * rows) as usize != data.len() {
            return Err(Error::KernelSizeMismatch {
                expected: (columns * rows) as usize,
                actual: data.len(),
            });
        }

        Ok(ConvolveMatrixData { columns, rows, data })
    }

    /// Returns a number of columns in the matrix.
    ///
    /// Part of the `order` attribute in the SVG.
    #[inline]
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Returns a number of rows in the matrix.
    ///
    /// Part of the `order` attribute in the SVG.
    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Returns a reference to an internal data.
    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }
}

/// An edges processing mode.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum EdgeMode {
    None,
    Duplicate,
    Wrap,
}

pub(crate) fn convert(fe: Node, builder: &mut ChainBuilder) -> Result<Kind, Error> {
    let mut order_x = 3;
    let mut order_y = 3;
    if let Some(list) = fe.try_number_list("order")? {
        let x = list.first().map(|n| *n as i32).unwrap_or(3);
        let y = list.get(1).map(|n| *n as i32).unwrap_or(x);
        if x > 0 && y > 0 {
            order_x = x as u32;
            order_y = y as u32;
        }
    }

    let matrix = fe.try_number_list("kernelMatrix")?.unwrap_or_default();
    let matrix = ConvolveMatrixData::new(order_x, order_y, matrix)?;

    let mut kernel_sum: f64 = matrix.data().iter().sum();
    // Round up to prevent float precision issues.
    kernel_sum = (kernel_sum * 1_000_000.0).round() / 1_000_000.0;
    if kernel_sum.is_fuzzy_zero() {
        kernel_sum = 1.0;
    }

    let divisor = fe.try_parse_attr::<f64>("divisor")?.unwrap_or(kernel_sum);
    let divisor = NonZeroF64::new(divisor).ok_or(Error::ZeroDivisor)?;

    let edge_mode = match fe.attr("edgeMode").unwrap_or("duplicate") {
        "none" => EdgeMode::None,
        "wrap" => EdgeMode::Wrap,
        _ => EdgeMode::Duplicate,
    };

    let preserve_alpha = fe.attr("preserveAlpha").unwrap_or("false") == "true";

    Ok(Kind::ConvolveMatrix(ConvolveMatrix {
        input: builder.resolve_input(fe, "in"),
        matrix,
        divisor,
        bias: fe.try_parse_attr("bias")?.unwrap_or(0.0),
        edge_mode,
        preserve_alpha,
    }))
}
