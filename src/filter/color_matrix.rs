// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use roxmltree::Node;

use super::{ChainBuilder, Input, Kind};
use crate::svgtree::SvgNodeExt;
use crate::{Error, NormalizedValue};

/// A color matrix filter primitive.
///
/// `feColorMatrix` element in the SVG.
#[derive(Clone, Debug)]
pub struct ColorMatrix {
    /// Identifies input for the given filter primitive.
    ///
    /// `in` in the SVG.
    pub input: Input,

    /// A matrix kind.
    ///
    /// `type` in the SVG.
    pub kind: ColorMatrixKind,
}

/// A color matrix filter primitive kind.
#[derive(Clone, Debug)]
#[allow(missing_docs)]
pub enum ColorMatrixKind {
    Matrix(Vec<f64>), // Guarantee to have 20 numbers.
    Saturate(NormalizedValue),
    HueRotate(f64),
    LuminanceToAlpha,
}

impl Default for ColorMatrixKind {
    fn default() -> Self {
        ColorMatrixKind::Matrix(vec![
            1.0, 0.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0, 0.0,
        ])
    }
}

pub(crate) fn convert(fe: Node, builder: &mut ChainBuilder) -> Result<Kind, Error> {
    let kind = convert_kind(fe)?;
    Ok(Kind::ColorMatrix(ColorMatrix {
        input: builder.resolve_input(fe, "in"),
        kind,
    }))
}

fn convert_kind(fe: Node) -> Result<ColorMatrixKind, Error> {
    let values = fe.try_number_list("values")?;

    match fe.attr("type") {
        Some("saturate") => {
            let n = values.and_then(|l| l.first().copied()).unwrap_or(1.0);
            Ok(ColorMatrixKind::Saturate(NormalizedValue::new(n)))
        }
        Some("hueRotate") => {
            let deg = values.and_then(|l| l.first().copied()).unwrap_or(0.0);
            Ok(ColorMatrixKind::HueRotate(deg))
        }
        Some("luminanceToAlpha") => Ok(ColorMatrixKind::LuminanceToAlpha),
        _ => {
            // Fallback to `matrix`.
            match values {
                Some(list) => {
                    if list.len() == 20 {
                        Ok(ColorMatrixKind::Matrix(list))
                    } else {
                        Err(Error::InvalidAttribute {
                            attribute: "values".to_string(),
                            value: fe.attr("values").unwrap_or_default().to_string(),
                        })
                    }
                }
                None => Ok(ColorMatrixKind::default()),
            }
        }
    }
}
