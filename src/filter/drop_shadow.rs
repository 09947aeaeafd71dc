// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use roxmltree::Node;

use super::{gaussian_blur, ChainBuilder, Input, Kind};
use crate::svgtree::SvgNodeExt;
use crate::{Color, Error, Opacity, PositiveNumber};

/// A drop shadow filter primitive.
///
/// `feDropShadow` element in the SVG.
#[derive(Clone, Debug)]
pub struct DropShadow {
    /// Identifies input for the given filter primitive.
    ///
    /// `in` in the SVG.
    pub input: Input,

    /// The amount to offset the input graphic along the X-axis.
    pub dx: f64,

    /// The amount to offset the input graphic along the Y-axis.
    pub dy: f64,

    /// A standard deviation along the X-axis.
    ///
    /// `stdDeviation` in the SVG.
    pub std_dev_x: PositiveNumber,

    /// A standard deviation along the Y-axis.
    ///
    /// `stdDeviation` in the SVG.
    pub std_dev_y: PositiveNumber,

    /// A shadow color.
    ///
    /// `flood-color` in the SVG.
    pub color: Color,

    /// A shadow opacity.
    ///
    /// `flood-opacity` in the SVG.
    pub opacity: Opacity,
}

pub(crate) fn convert(fe: Node, builder: &mut ChainBuilder) -> Result<Kind, Error> {
    let (std_dev_x, std_dev_y) = gaussian_blur::parse_std_dev(fe)?;

    Ok(Kind::DropShadow(DropShadow {
        input: builder.resolve_input(fe, "in"),
        dx: fe.try_parse_attr("dx")?.unwrap_or(2.0),
        dy: fe.try_parse_attr("dy")?.unwrap_or(2.0),
        std_dev_x,
        std_dev_y,
        color: fe
            .parse_attr::<svgtypes::Color>("flood-color")
            .map(Color::from)
            .unwrap_or_else(Color::black),
        opacity: fe
            .parse_attr::<f64>("flood-opacity")
            .map(Opacity::new)
            .unwrap_or_default(),
    }))
}
