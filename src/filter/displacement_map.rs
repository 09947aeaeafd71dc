// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use roxmltree::Node;

use super::{ChainBuilder, Input, Kind};
use crate::svgtree::SvgNodeExt;
use crate::Error;

/// A displacement map filter primitive.
///
/// `feDisplacementMap` element in the SVG.
#[derive(Clone, Debug)]
pub struct DisplacementMap {
    /// Identifies input for the given filter primitive.
    ///
    /// `in` in the SVG.
    pub input1: Input,

    /// Identifies input for the given filter primitive.
    ///
    /// `in2` in the SVG.
    pub input2: Input,

    /// Scale factor.
    ///
    /// `scale` in the SVG.
    pub scale: f64,

    /// Indicates a source color channel along the X-axis.
    ///
    /// `xChannelSelector` in the SVG.
    pub x_channel_selector: ColorChannel,

    /// Indicates a source color channel along the Y-axis.
    ///
    /// `yChannelSelector` in the SVG.
    pub y_channel_selector: ColorChannel,
}

/// A color channel.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ColorChannel {
    R,
    G,
    B,
    A,
}

pub(crate) fn convert(fe: Node, builder: &mut ChainBuilder) -> Result<Kind, Error> {
    let parse_channel = |name| match fe.attr(name).unwrap_or("A") {
        "R" => ColorChannel::R,
        "G" => ColorChannel::G,
        "B" => ColorChannel::B,
        _ => ColorChannel::A,
    };

    Ok(Kind::DisplacementMap(DisplacementMap {
        input1: builder.resolve_input(fe, "in"),
        input2: builder.resolve_input(fe, "in2"),
        scale: fe.try_parse_attr("scale")?.unwrap_or(0.0),
        x_channel_selector: parse_channel("xChannelSelector"),
        y_channel_selector: parse_channel("yChannelSelector"),
    }))
}
