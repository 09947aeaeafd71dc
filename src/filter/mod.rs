// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Filter primitive parsing and chain resolution.
//!
//! A `<filter>` element is parsed into a [`Chain`]: the typed
//! primitives in document order, the execution order resolved from the
//! `result`/`in` dependency graph, and every non-fatal problem that was
//! found along the way. Nothing in here aborts: malformed primitives
//! become transparent floods, broken references degrade the chain to
//! rasterization.

use std::collections::HashSet;

use roxmltree::Node;

use crate::svgtree::SvgNodeExt;
use crate::{Color, Error, Opacity};

mod color_matrix;
mod component_transfer;
mod composite;
mod convolve_matrix;
mod displacement_map;
mod drop_shadow;
mod flood;
mod gaussian_blur;
mod lighting;
mod merge;
mod morphology;
mod offset;
mod tile;
mod turbulence;

pub mod graph;
pub mod patterns;

pub use self::color_matrix::*;
pub use self::component_transfer::*;
pub use self::composite::*;
pub use self::convolve_matrix::*;
pub use self::displacement_map::*;
pub use self::drop_shadow::*;
pub use self::flood::*;
pub use self::gaussian_blur::*;
pub use self::lighting::*;
pub use self::merge::*;
pub use self::morphology::*;
pub use self::offset::*;
pub use self::tile::*;
pub use self::turbulence::*;

/// Identifies input for a filter primitive.
#[allow(missing_docs)]
#[derive(Clone, PartialEq, Debug)]
pub enum Input {
    SourceGraphic,
    SourceAlpha,
    BackgroundImage,
    BackgroundAlpha,
    FillPaint,
    StrokePaint,
    Reference(String),
}

impl Input {
    /// Checks that the input refers to the element being filtered.
    pub fn is_source(&self) -> bool {
        matches!(self, Input::SourceGraphic | Input::SourceAlpha)
    }
}

/// A filter primitive kind.
#[allow(missing_docs)]
#[derive(Clone, Debug)]
pub enum Kind {
    GaussianBlur(GaussianBlur),
    DropShadow(DropShadow),
    Offset(Offset),
    ColorMatrix(ColorMatrix),
    Composite(Composite),
    Morphology(Morphology),
    ConvolveMatrix(ConvolveMatrix),
    Turbulence(Turbulence),
    Lighting(Lighting),
    Tile(Tile),
    ComponentTransfer(ComponentTransfer),
    DisplacementMap(DisplacementMap),
    Merge(Merge),
    Flood(Flood),
}

impl Kind {
    /// Returns the SVG element name this kind was parsed from.
    pub fn name(&self) -> &'static str {
        match self {
            Kind::GaussianBlur(_) => "feGaussianBlur",
            Kind::DropShadow(_) => "feDropShadow",
            Kind::Offset(_) => "feOffset",
            Kind::ColorMatrix(_) => "feColorMatrix",
            Kind::Composite(_) => "feComposite",
            Kind::Morphology(_) => "feMorphology",
            Kind::ConvolveMatrix(_) => "feConvolveMatrix",
            Kind::Turbulence(_) => "feTurbulence",
            Kind::Lighting(ref l) => match l.kind {
                LightingKind::Diffuse { .. } => "feDiffuseLighting",
                LightingKind::Specular { .. } => "feSpecularLighting",
            },
            Kind::Tile(_) => "feTile",
            Kind::ComponentTransfer(_) => "feComponentTransfer",
            Kind::DisplacementMap(_) => "feDisplacementMap",
            Kind::Merge(_) => "feMerge",
            Kind::Flood(_) => "feFlood",
        }
    }

    /// Checks that `Kind` has a specific input.
    pub fn has_input(&self, input: &Input) -> bool {
        match self {
            Kind::GaussianBlur(ref fe) => fe.input == *input,
            Kind::DropShadow(ref fe) => fe.input == *input,
            Kind::Offset(ref fe) => fe.input == *input,
            Kind::ColorMatrix(ref fe) => fe.input == *input,
            Kind::Composite(ref fe) => fe.input1 == *input || fe.input2 == *input,
            Kind::Morphology(ref fe) => fe.input == *input,
            Kind::ConvolveMatrix(ref fe) => fe.input == *input,
            Kind::Turbulence(_) => false,
            Kind::Lighting(ref fe) => fe.input == *input,
            Kind::Tile(ref fe) => fe.input == *input,
            Kind::ComponentTransfer(ref fe) => fe.input == *input,
            Kind::DisplacementMap(ref fe) => fe.input1 == *input || fe.input2 == *input,
            Kind::Merge(ref fe) => fe.inputs.iter().any(|i| i == input),
            Kind::Flood(_) => false,
        }
    }
}

/// A filter primitive.
#[derive(Clone, Debug)]
pub struct Primitive {
    /// `x` coordinate of the filter subregion.
    pub x: Option<f64>,

    /// `y` coordinate of the filter subregion.
    pub y: Option<f64>,

    /// The filter subregion width.
    pub width: Option<f64>,

    /// The filter subregion height.
    pub height: Option<f64>,

    /// Name under which this primitive's output is published.
    ///
    /// `result` in the SVG. Auto-assigned when absent.
    pub result: String,

    /// Filter primitive kind.
    pub kind: Kind,
}

/// A parsed filter chain.
#[derive(Clone, Debug)]
pub struct Chain {
    /// Primitives in document order.
    pub primitives: Vec<Primitive>,

    /// Execution order as indices into `primitives`.
    ///
    /// Falls back to document order when the dependency graph is
    /// broken; `requires_rasterization` will be set in that case.
    pub order: Vec<usize>,

    /// Whether the whole chain must be rasterized because its
    /// dependency graph could not be resolved.
    pub requires_rasterization: bool,

    /// Every non-fatal problem found while parsing.
    pub errors: Vec<Error>,

    // Raw `in`/`in2` reference names per primitive, for the
    // dependency graph.
    pub(crate) raw_refs: Vec<Vec<String>>,
}

impl Chain {
    /// Parses the children of a `<filter>` element.
    pub fn parse(filter: Node) -> Chain {
        let mut builder = ChainBuilder::default();

        for child in filter.children().filter(|c| c.is_element()) {
            builder.current_refs.clear();

            let kind = match child.tag_name().name() {
                "feGaussianBlur" => gaussian_blur::convert(child, &mut builder),
                "feDropShadow" => drop_shadow::convert(child, &mut builder),
                "feOffset" => offset::convert(child, &mut builder),
                "feColorMatrix" => color_matrix::convert(child, &mut builder),
                "feComposite" => composite::convert(child, &mut builder),
                "feMorphology" => morphology::convert(child, &mut builder),
                "feConvolveMatrix" => convolve_matrix::convert(child, &mut builder),
                "feTurbulence" => Ok(turbulence::convert(child)),
                "feDiffuseLighting" => lighting::convert_diffuse(child, &mut builder),
                "feSpecularLighting" => lighting::convert_specular(child, &mut builder),
                "feTile" => tile::convert(child, &mut builder),
                "feComponentTransfer" => component_transfer::convert(child, &mut builder),
                "feDisplacementMap" => displacement_map::convert(child, &mut builder),
                "feMerge" => Ok(merge::convert(child, &mut builder)),
                "feFlood" => Ok(flood::convert(child)),
                tag_name => {
                    log::warn!("'{}' is not a supported filter primitive. Skipped.", tag_name);
                    continue;
                }
            };

            let kind = match kind {
                Ok(kind) => kind,
                Err(e) => {
                    log::warn!("Filter primitive is invalid: {}. Replaced by an empty flood.", e);
                    builder.errors.push(e);
                    create_dummy_primitive()
                }
            };

            let result = builder.gen_result(child);
            let refs = std::mem::take(&mut builder.current_refs);
            builder.raw_refs.push(refs);
            builder.primitives.push(Primitive {
                x: child.parse_attr("x"),
                y: child.parse_attr("y"),
                width: child.parse_attr("width"),
                height: child.parse_attr("height"),
                result,
                kind,
            });
        }

        builder.finish()
    }

    /// Returns the index of the primitive producing `result`.
    pub fn producer(&self, result: &str) -> Option<usize> {
        self.primitives.iter().position(|p| p.result == result)
    }

    /// Checks whether the chain contains a primitive of the
    /// `feOffset` kind.
    pub fn has_offset(&self) -> bool {
        self.primitives
            .iter()
            .any(|p| matches!(p.kind, Kind::Offset(_)))
    }
}

/// Incremental chain state shared with the per-primitive parsers.
#[derive(Default, Debug)]
pub struct ChainBuilder {
    primitives: Vec<Primitive>,
    raw_refs: Vec<Vec<String>>,
    errors: Vec<Error>,
    names: HashSet<String>,
    idx: usize,
    current_refs: Vec<String>,
}

impl ChainBuilder {
    /// Resolves an `in`/`in2` attribute against the primitives parsed
    /// so far.
    ///
    /// An unset attribute defaults to the previous primitive's result,
    /// or `SourceGraphic` for the first primitive. A reference to a
    /// result that no earlier primitive declared falls back the same
    /// way, but is recorded as an unresolved reference — the whole
    /// chain will be rasterized.
    pub(crate) fn resolve_input(&mut self, node: Node, name: &str) -> Input {
        match node.attr(name) {
            Some(s) => {
                let input = parse_in(s);

                if let Input::Reference(ref name) = input {
                    self.current_refs.push(name.clone());

                    if !self.primitives.iter().any(|p| p.result == *name) {
                        self.errors.push(Error::UnresolvedReference(name.clone()));
                        return if let Some(prev) = self.primitives.last() {
                            Input::Reference(prev.result.clone())
                        } else {
                            Input::SourceGraphic
                        };
                    }
                }

                input
            }
            None => {
                if let Some(prev) = self.primitives.last() {
                    Input::Reference(prev.result.clone())
                } else {
                    Input::SourceGraphic
                }
            }
        }
    }

    fn gen_result(&mut self, node: Node) -> String {
        match node.attr("result") {
            Some(s) => {
                // Remember predefined result.
                self.names.insert(s.to_string());
                self.idx += 1;

                s.to_string()
            }
            None => {
                // Generate an unique name for `result`.
                loop {
                    let name = format!("result{}", self.idx);
                    self.idx += 1;

                    if !self.names.contains(&name) {
                        return name;
                    }
                }
            }
        }
    }

    fn finish(self) -> Chain {
        let mut errors = self.errors;
        let mut requires_rasterization =
            errors.iter().any(|e| matches!(e, Error::UnresolvedReference(_)));

        let order = match graph::sort(&self.primitives, &self.raw_refs) {
            Ok(order) => order,
            Err(e) => {
                log::warn!("Filter chain is not resolvable: {}. Forcing rasterization.", e);
                errors.push(e);
                requires_rasterization = true;
                (0..self.primitives.len()).collect()
            }
        };

        Chain {
            primitives: self.primitives,
            order,
            requires_rasterization,
            errors,
            raw_refs: self.raw_refs,
        }
    }
}

// A malformed filter primitive usually should produce a transparent image.
// Since `Kind` structs are designed to always be valid, we are using
// a fully transparent `Flood` as fallback.
#[inline(never)]
pub(crate) fn create_dummy_primitive() -> Kind {
    Kind::Flood(Flood {
        color: Color::black(),
        opacity: Opacity::new(0.0),
    })
}

fn parse_in(s: &str) -> Input {
    match s {
        "SourceGraphic" => Input::SourceGraphic,
        "SourceAlpha" => Input::SourceAlpha,
        "BackgroundImage" => Input::BackgroundImage,
        "BackgroundAlpha" => Input::BackgroundAlpha,
        "FillPaint" => Input::FillPaint,
        "StrokePaint" => Input::StrokePaint,
        _ => Input::Reference(s.to_string()),
    }
}
