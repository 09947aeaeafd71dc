// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Multi-primitive pattern detection.
//!
//! Hand-authored SVG rarely uses `feDropShadow`; the same look is
//! usually built from an offset/blur/composite run. Detecting those
//! runs lets the mapper emit one native DrawingML effect instead of
//! rasterizing a chain that is semantically trivial.

use super::{Chain, ColorMatrixKind, Input, Kind, LightingKind};
use crate::complexity::{classify_kernel, is_intrinsically_raster, KernelClass};
use crate::{Color, Opacity};

/// A semantic effect derived from one primitive or a detected
/// multi-primitive pattern.
#[derive(Clone, Debug)]
pub struct FilterEffect {
    /// What the effect is, with its typed parameters.
    pub kind: EffectKind,

    /// Whether DrawingML cannot express this effect at all.
    pub requires_rasterization: bool,

    /// The owning chain's complexity score.
    pub complexity_score: f64,

    /// Optimization opportunities detected on this effect,
    /// e.g. `duotone`.
    pub optimizations: Vec<&'static str>,
}

/// A semantic effect kind.
#[derive(Clone, Debug)]
pub enum EffectKind {
    /// A plain Gaussian blur.
    Blur {
        /// Standard deviation in user units.
        std_dev: f64,
    },

    /// A drop shadow, native or reconstructed from
    /// offset → blur → composite.
    Shadow {
        /// Shadow offset along the X-axis.
        dx: f64,
        /// Shadow offset along the Y-axis.
        dy: f64,
        /// Blur standard deviation.
        std_dev: f64,
        /// Shadow color.
        color: Color,
        /// Shadow opacity.
        opacity: Opacity,
    },

    /// A glow: a blurred duplicate merged back under the source.
    Glow {
        /// Blur standard deviation.
        std_dev: f64,
        /// Glow color.
        color: Color,
        /// Glow opacity.
        opacity: Opacity,
    },

    /// `feColorMatrix type='saturate'`.
    Saturate(f64),

    /// `feColorMatrix type='hueRotate'`, angle in degrees.
    HueRotate(f64),

    /// A full 20-entry color matrix or `luminanceToAlpha`.
    ColorMatrix,

    /// `feComponentTransfer` that is not a recognized posterize.
    ComponentTransfer,

    /// Diffuse or specular lighting.
    Lighting {
        /// `true` for `feSpecularLighting`.
        specular: bool,
        /// The lighting color.
        color: Color,
    },

    /// `feMorphology`.
    Morphology,

    /// `feConvolveMatrix`, pre-classified by kernel shape.
    Convolve {
        /// Whether the kernel reduces to an outline approximation.
        class: KernelClass,
    },

    /// `feTurbulence`.
    Turbulence,

    /// `feTile`.
    Tile,

    /// `feDisplacementMap`.
    Displacement,

    /// A lone `feOffset` that is not part of a shadow.
    OffsetOnly,

    /// A lone compositing primitive (`feComposite`, `feMerge`,
    /// `feFlood`) with no pattern around it.
    Compositing,
}

impl EffectKind {
    /// A short lowercase tag, used in rasterization reasons and logs.
    pub fn tag(&self) -> &'static str {
        match self {
            EffectKind::Blur { .. } => "blur",
            EffectKind::Shadow { .. } => "shadow",
            EffectKind::Glow { .. } => "glow",
            EffectKind::Saturate(_) => "saturate",
            EffectKind::HueRotate(_) => "hue_rotate",
            EffectKind::ColorMatrix => "color_matrix",
            EffectKind::ComponentTransfer => "component_transfer",
            EffectKind::Lighting { .. } => "lighting",
            EffectKind::Morphology => "morphology",
            EffectKind::Convolve { .. } => "convolve",
            EffectKind::Turbulence => "turbulence",
            EffectKind::Tile => "tile",
            EffectKind::Displacement => "displacement",
            EffectKind::OffsetOnly => "offset",
            EffectKind::Compositing => "compositing",
        }
    }
}

/// Collapses a parsed chain into semantic effects.
///
/// Detected patterns consume their primitives; everything left over
/// becomes one effect per primitive. `score` is the chain complexity
/// score, stamped onto every produced effect.
pub fn detect(chain: &Chain, score: f64) -> Vec<FilterEffect> {
    let mut consumed = vec![false; chain.primitives.len()];
    let mut effects = Vec::new();

    if let Some(effect) = detect_shadow(chain, score, &mut consumed) {
        effects.push(effect);
    }
    if let Some(effect) = detect_glow(chain, score, &mut consumed) {
        effects.push(effect);
    }

    for (i, p) in chain.primitives.iter().enumerate() {
        if consumed[i] {
            continue;
        }

        let mut optimizations = Vec::new();
        let kind = match p.kind {
            Kind::GaussianBlur(ref fe) => EffectKind::Blur {
                std_dev: fe.std_dev_x.value(),
            },
            Kind::DropShadow(ref fe) => EffectKind::Shadow {
                dx: fe.dx,
                dy: fe.dy,
                std_dev: fe.std_dev_x.value(),
                color: fe.color,
                opacity: fe.opacity,
            },
            Kind::Offset(_) => EffectKind::OffsetOnly,
            Kind::ColorMatrix(ref fe) => match fe.kind {
                ColorMatrixKind::Saturate(s) => EffectKind::Saturate(s.value()),
                ColorMatrixKind::HueRotate(deg) => EffectKind::HueRotate(deg),
                _ => EffectKind::ColorMatrix,
            },
            Kind::Composite(_) | Kind::Merge(_) | Kind::Flood(_) => EffectKind::Compositing,
            Kind::Morphology(_) => EffectKind::Morphology,
            Kind::ConvolveMatrix(ref fe) => EffectKind::Convolve {
                class: classify_kernel(&fe.matrix),
            },
            Kind::Turbulence(_) => EffectKind::Turbulence,
            Kind::Lighting(ref fe) => EffectKind::Lighting {
                specular: matches!(fe.kind, LightingKind::Specular { .. }),
                color: fe.lighting_color,
            },
            Kind::Tile(_) => EffectKind::Tile,
            Kind::ComponentTransfer(ref fe) => {
                if fe.is_discrete_posterize(3) {
                    optimizations.push("duotone");
                }
                EffectKind::ComponentTransfer
            }
            Kind::DisplacementMap(_) => EffectKind::Displacement,
        };

        effects.push(FilterEffect {
            kind,
            requires_rasterization: chain.requires_rasterization
                || is_intrinsically_raster(&p.kind),
            complexity_score: score,
            optimizations,
        });
    }

    // Pattern effects still honor a degraded chain.
    if chain.requires_rasterization {
        for effect in &mut effects {
            effect.requires_rasterization = true;
        }
    }

    effects
}

/// Looks for the `Offset → GaussianBlur → Composite(in2=SourceGraphic)`
/// run and collapses it into one shadow effect.
///
/// The three primitives are matched through their input references,
/// not through adjacency, so dependency-free primitives interleaved by
/// the topological sort (a flood supplying the shadow paint is the
/// common case) do not break the pattern.
fn detect_shadow(chain: &Chain, score: f64, consumed: &mut [bool]) -> Option<FilterEffect> {
    for &ci in &chain.order {
        let composite = match chain.primitives[ci].kind {
            Kind::Composite(ref fe) => fe,
            _ => continue,
        };

        // The composite must put the source over a referenced layer.
        let blurred = if composite.input2.is_source() {
            &composite.input1
        } else if composite.input1.is_source() {
            &composite.input2
        } else {
            continue;
        };

        // That layer must be a blur...
        let bi = match blurred {
            Input::Reference(name) => match chain.producer(name) {
                Some(i) => i,
                None => continue,
            },
            _ => continue,
        };
        let blur = match chain.primitives[bi].kind {
            Kind::GaussianBlur(ref fe) => fe,
            _ => continue,
        };

        // ...which in turn consumes an offset's output.
        let oi = match blur.input {
            Input::Reference(ref name) => match chain.producer(name) {
                Some(i) => i,
                None => continue,
            },
            _ => continue,
        };
        let offset = match chain.primitives[oi].kind {
            Kind::Offset(ref fe) => fe,
            _ => continue,
        };

        // Shadow paint comes from the nearest flood before the
        // composite, when the author supplied one.
        let paint = chain.primitives[..ci]
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, p)| match p.kind {
                Kind::Flood(ref f) => Some((i, f.color, f.opacity)),
                _ => None,
            });

        let (color, opacity) = match paint {
            Some((fi, color, opacity)) => {
                // The flood belongs to the pattern unless some other
                // primitive consumes its output.
                let referenced = chain
                    .raw_refs
                    .iter()
                    .enumerate()
                    .any(|(j, refs)| j != fi && refs.contains(&chain.primitives[fi].result));
                if !referenced {
                    consumed[fi] = true;
                }
                (color, opacity)
            }
            None => (Color::black(), Opacity::default()),
        };

        consumed[oi] = true;
        consumed[bi] = true;
        consumed[ci] = true;

        return Some(FilterEffect {
            kind: EffectKind::Shadow {
                dx: offset.dx,
                dy: offset.dy,
                std_dev: blur.std_dev_x.value(),
                color,
                opacity,
            },
            requires_rasterization: false,
            complexity_score: score,
            optimizations: Vec::new(),
        });
    }

    None
}

/// Looks for a terminal merge of a blurred source duplicate with the
/// source itself, with no offset anywhere in the chain.
fn detect_glow(chain: &Chain, score: f64, consumed: &mut [bool]) -> Option<FilterEffect> {
    if chain.has_offset() {
        return None;
    }

    let &last = chain.order.last()?;
    if consumed[last] {
        return None;
    }

    let merge = match chain.primitives[last].kind {
        Kind::Merge(ref fe) => fe,
        _ => return None,
    };

    if !merge.inputs.iter().any(|i| *i == Input::SourceGraphic) {
        return None;
    }

    // One of the merged layers must be a blur of the source.
    let blur_idx = merge.inputs.iter().find_map(|input| {
        let name = match input {
            Input::Reference(name) => name,
            _ => return None,
        };
        let idx = chain.producer(name)?;
        match chain.primitives[idx].kind {
            Kind::GaussianBlur(ref fe) if fe.input.is_source() => Some(idx),
            _ => None,
        }
    })?;

    let std_dev = match chain.primitives[blur_idx].kind {
        Kind::GaussianBlur(ref fe) => fe.std_dev_x.value(),
        _ => unreachable!(),
    };

    let (color, opacity) = chain
        .primitives
        .iter()
        .find_map(|p| match p.kind {
            Kind::Flood(ref f) => Some((f.color, f.opacity)),
            _ => None,
        })
        .unwrap_or((Color::white(), Opacity::default()));

    consumed[last] = true;
    consumed[blur_idx] = true;

    Some(FilterEffect {
        kind: EffectKind::Glow {
            std_dev,
            color,
            opacity,
        },
        requires_rasterization: false,
        complexity_score: score,
        optimizations: Vec::new(),
    })
}
