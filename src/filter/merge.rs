// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use roxmltree::Node;

use super::{ChainBuilder, Input, Kind};

/// A merge filter primitive.
///
/// `feMerge` element in the SVG.
#[derive(Clone, Debug)]
pub struct Merge {
    /// List of input layers that should be merged.
    ///
    /// List of `feMergeNode`'s in the SVG.
    pub inputs: Vec<Input>,
}

pub(crate) fn convert(fe: Node, builder: &mut ChainBuilder) -> Kind {
    let mut inputs = Vec::new();
    for child in fe.children().filter(|c| c.is_element()) {
        inputs.push(builder.resolve_input(child, "in"));
    }

    Kind::Merge(Merge { inputs })
}
