// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use roxmltree::Node;

use super::{ChainBuilder, Input, Kind};
use crate::svgtree::SvgNodeExt;
use crate::{Error, PositiveNumber};

/// A Gaussian blur filter primitive.
///
/// `feGaussianBlur` element in the SVG.
#[derive(Clone, Debug)]
pub struct GaussianBlur {
    /// Identifies input for the given filter primitive.
    ///
    /// `in` in the SVG.
    pub input: Input,

    /// A standard deviation along the X-axis.
    ///
    /// `stdDeviation` in the SVG.
    pub std_dev_x: PositiveNumber,

    /// A standard deviation along the Y-axis.
    ///
    /// `stdDeviation` in the SVG.
    pub std_dev_y: PositiveNumber,
}

pub(crate) fn convert(fe: Node, builder: &mut ChainBuilder) -> Result<Kind, Error> {
    let (std_dev_x, std_dev_y) = parse_std_dev(fe)?;

    Ok(Kind::GaussianBlur(GaussianBlur {
        input: builder.resolve_input(fe, "in"),
        std_dev_x,
        std_dev_y,
    }))
}

pub(super) fn parse_std_dev(fe: Node) -> Result<(PositiveNumber, PositiveNumber), Error> {
    let list = fe.try_number_list("stdDeviation")?.unwrap_or_default();

    let (mut x, mut y) = (0.0, 0.0);
    if list.len() == 2 {
        x = list[0];
        y = list[1];
    } else if list.len() == 1 {
        x = list[0];
        y = list[0]; // The same as `x`.
    }

    // Negative values are in error per the SVG spec; a value of zero
    // disables the effect.
    if x < 0.0 || y < 0.0 {
        return Err(Error::InvalidAttribute {
            attribute: "stdDeviation".to_string(),
            value: fe.attr("stdDeviation").unwrap_or_default().to_string(),
        });
    }

    Ok((PositiveNumber::new(x), PositiveNumber::new(y)))
}
