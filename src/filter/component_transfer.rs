// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use roxmltree::Node;

use super::{ChainBuilder, Input, Kind};
use crate::svgtree::SvgNodeExt;
use crate::Error;

/// A component-wise remapping filter primitive.
///
/// `feComponentTransfer` element in the SVG.
#[derive(Clone, Debug)]
pub struct ComponentTransfer {
    /// Identifies input for the given filter primitive.
    ///
    /// `in` in the SVG.
    pub input: Input,

    /// `feFuncR` in the SVG.
    pub func_r: TransferFunction,

    /// `feFuncG` in the SVG.
    pub func_g: TransferFunction,

    /// `feFuncB` in the SVG.
    pub func_b: TransferFunction,

    /// `feFuncA` in the SVG.
    pub func_a: TransferFunction,
}

impl ComponentTransfer {
    /// Checks that every color channel uses a `discrete` table of at
    /// most `max_len` entries.
    ///
    /// Short discrete tables are how posterize/duotone looks are
    /// authored in SVG, and DrawingML has a native `a:duotone` that
    /// approximates them.
    pub fn is_discrete_posterize(&self, max_len: usize) -> bool {
        [&self.func_r, &self.func_g, &self.func_b]
            .iter()
            .all(|f| matches!(f, TransferFunction::Discrete(t) if !t.is_empty() && t.len() <= max_len))
    }
}

/// A transfer function used by `ComponentTransfer`.
///
/// <https://www.w3.org/TR/SVG11/filters.html#transferFuncElements>
#[derive(Clone, Debug)]
pub enum TransferFunction {
    /// Keeps a component as is.
    Identity,

    /// Applies a linear interpolation to a component.
    ///
    /// The number list can be empty.
    Table(Vec<f64>),

    /// Applies a step function to a component.
    ///
    /// The number list can be empty.
    Discrete(Vec<f64>),

    /// Applies a linear shift to a component.
    #[allow(missing_docs)]
    Linear { slope: f64, intercept: f64 },

    /// Applies an exponential shift to a component.
    #[allow(missing_docs)]
    Gamma {
        amplitude: f64,
        exponent: f64,
        offset: f64,
    },
}

pub(crate) fn convert(fe: Node, builder: &mut ChainBuilder) -> Result<Kind, Error> {
    let mut kind = ComponentTransfer {
        input: builder.resolve_input(fe, "in"),
        func_r: TransferFunction::Identity,
        func_g: TransferFunction::Identity,
        func_b: TransferFunction::Identity,
        func_a: TransferFunction::Identity,
    };

    for child in fe.children().filter(|n| n.is_element()) {
        if let Some(func) = convert_transfer_function(child) {
            match child.tag_name().name() {
                "feFuncR" => kind.func_r = func,
                "feFuncG" => kind.func_g = func,
                "feFuncB" => kind.func_b = func,
                "feFuncA" => kind.func_a = func,
                _ => {}
            }
        }
    }

    Ok(Kind::ComponentTransfer(kind))
}

fn convert_transfer_function(node: Node) -> Option<TransferFunction> {
    match node.attr("type")? {
        "identity" => Some(TransferFunction::Identity),
        "table" => Some(TransferFunction::Table(
            node.number_list("tableValues").unwrap_or_default(),
        )),
        "discrete" => Some(TransferFunction::Discrete(
            node.number_list("tableValues").unwrap_or_default(),
        )),
        "linear" => Some(TransferFunction::Linear {
            slope: node.parse_attr("slope").unwrap_or(1.0),
            intercept: node.parse_attr("intercept").unwrap_or(0.0),
        }),
        "gamma" => Some(TransferFunction::Gamma {
            amplitude: node.parse_attr("amplitude").unwrap_or(1.0),
            exponent: node.parse_attr("exponent").unwrap_or(1.0),
            offset: node.parse_attr("offset").unwrap_or(0.0),
        }),
        _ => None,
    }
}
