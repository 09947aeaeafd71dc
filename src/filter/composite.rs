// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use roxmltree::Node;

use super::{ChainBuilder, Input, Kind};
use crate::svgtree::SvgNodeExt;
use crate::Error;

/// A composite filter primitive.
///
/// `feComposite` element in the SVG.
#[derive(Clone, Debug)]
pub struct Composite {
    /// Identifies input for the given filter primitive.
    ///
    /// `in` in the SVG.
    pub input1: Input,

    /// Identifies input for the given filter primitive.
    ///
    /// `in2` in the SVG.
    pub input2: Input,

    /// A compositing operation.
    ///
    /// `operator` in the SVG.
    pub operator: CompositeOperator,
}

/// An images compositing operation.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum CompositeOperator {
    Over,
    In,
    Out,
    Atop,
    Xor,
    Arithmetic { k1: f64, k2: f64, k3: f64, k4: f64 },
}

pub(crate) fn convert(fe: Node, builder: &mut ChainBuilder) -> Result<Kind, Error> {
    let operator = match fe.attr("operator").unwrap_or("over") {
        "in" => CompositeOperator::In,
        "out" => CompositeOperator::Out,
        "atop" => CompositeOperator::Atop,
        "xor" => CompositeOperator::Xor,
        "arithmetic" => CompositeOperator::Arithmetic {
            k1: fe.try_parse_attr("k1")?.unwrap_or(0.0),
            k2: fe.try_parse_attr("k2")?.unwrap_or(0.0),
            k3: fe.try_parse_attr("k3")?.unwrap_or(0.0),
            k4: fe.try_parse_attr("k4")?.unwrap_or(0.0),
        },
        _ => CompositeOperator::Over,
    };

    let input1 = builder.resolve_input(fe, "in");
    let input2 = builder.resolve_input(fe, "in2");

    Ok(Kind::Composite(Composite {
        operator,
        input1,
        input2,
    }))
}
