// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Strategy selection and DrawingML fragment emission for filter
//! effects.
//!
//! Strategies degrade monotonically: native effect → approximation
//! built from adjacent native capabilities → rasterization signal.
//! The caller embeds emitted fragments inside a shape's effect
//! properties; rasterization requests must be honored by producing an
//! image part and wiring its relationship id back into the shape.

use xmlwriter::XmlWriter;

use crate::complexity::KernelClass;
use crate::filter::patterns::{EffectKind, FilterEffect};
use crate::units;
use crate::{Color, Registry};

/// How a single effect gets converted.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Strategy {
    /// A faithful native DrawingML effect.
    NativeDml,
    /// An approximation using adjacent native capabilities.
    DmlHack,
    /// Cannot be expressed; the caller must rasterize.
    Rasterize,
}

/// A structured "rasterize me" signal.
#[derive(Clone, PartialEq, Debug)]
pub struct RasterizeRequest {
    /// Why the construct cannot be expressed in DrawingML.
    pub reason: String,

    /// The complexity score that backed the decision.
    pub complexity_score: f64,

    /// The shape id allocated for the replacement image.
    pub id: u32,
}

/// One mapped effect.
#[derive(Clone, Debug)]
pub struct MappedEffect {
    /// The selected strategy.
    pub strategy: Strategy,

    /// The DrawingML fragment, absent for [`Strategy::Rasterize`].
    pub fragment: Option<String>,

    /// The rasterization signal, present only for
    /// [`Strategy::Rasterize`].
    pub rasterize: Option<RasterizeRequest>,
}

/// The combined output for all effects on one element.
#[derive(Clone, Debug, Default)]
pub struct EffectList {
    /// `<a:effectLst>` plus any trailing non-effect fragments
    /// (`a:sp3d`, fill color transforms). `None` when every effect
    /// rasterized.
    pub fragment: Option<String>,

    /// Count of native decisions made in this call.
    pub native: usize,

    /// Count of hack decisions made in this call.
    pub hack: usize,

    /// Count of rasterize decisions made in this call.
    pub raster: usize,

    /// The rasterization requests, one per rasterized effect.
    pub rasterize: Vec<RasterizeRequest>,
}

/// Maps semantic filter effects onto DrawingML.
#[derive(Clone, Copy, Default, Debug)]
pub struct EffectMapper {
    registry: Registry,
}

impl EffectMapper {
    /// Creates a mapper with the provided thresholds.
    pub fn new(registry: Registry) -> Self {
        EffectMapper { registry }
    }

    /// Selects a strategy for one effect.
    ///
    /// The global rasterization threshold wins over every per-type
    /// rule. Below it, blur/shadow/glow effects that don't need pixel
    /// sampling go native; saturation, hue rotation, lighting and
    /// edge-detection convolutions can be approximated.
    pub fn strategy(&self, effect: &FilterEffect) -> Strategy {
        if effect.complexity_score >= self.registry.rasterization_threshold {
            return Strategy::Rasterize;
        }

        match effect.kind {
            EffectKind::Blur { .. } | EffectKind::Shadow { .. } | EffectKind::Glow { .. }
                if !effect.requires_rasterization
                    && effect.complexity_score < self.registry.native_threshold =>
            {
                Strategy::NativeDml
            }

            EffectKind::Saturate(_)
            | EffectKind::HueRotate(_)
            | EffectKind::Lighting { .. }
                if effect.complexity_score < self.registry.hack_threshold =>
            {
                Strategy::DmlHack
            }

            EffectKind::Convolve {
                class: KernelClass::EdgeDetect,
            } if effect.complexity_score < self.registry.hack_threshold => Strategy::DmlHack,

            _ => Strategy::Rasterize,
        }
    }

    /// Maps a single effect, using `id` for a potential rasterization
    /// request.
    pub fn map(&self, effect: &FilterEffect, id: u32) -> MappedEffect {
        let strategy = self.strategy(effect);
        match strategy {
            Strategy::Rasterize => MappedEffect {
                strategy,
                fragment: None,
                rasterize: Some(self.rasterize_request(effect, id)),
            },
            _ => {
                let mut xml = new_writer();
                self.write_effect(&mut xml, effect);
                self.write_trailing(&mut xml, effect);
                MappedEffect {
                    strategy,
                    fragment: Some(xml.end_document()),
                    rasterize: None,
                }
            }
        }
    }

    /// Maps every effect on one element, wrapping the effect elements
    /// in a single `<a:effectLst>` container.
    ///
    /// `next_id` allocates shape ids for rasterization requests.
    pub fn map_all<F: FnMut() -> u32>(
        &self,
        effects: &[FilterEffect],
        mut next_id: F,
    ) -> EffectList {
        let mut out = EffectList::default();

        let decisions: Vec<Strategy> = effects.iter().map(|e| self.strategy(e)).collect();

        for (effect, strategy) in effects.iter().zip(&decisions) {
            match strategy {
                Strategy::NativeDml => out.native += 1,
                Strategy::DmlHack => out.hack += 1,
                Strategy::Rasterize => {
                    out.raster += 1;
                    out.rasterize.push(self.rasterize_request(effect, next_id()));
                }
            }
        }

        if out.native + out.hack == 0 {
            return out;
        }

        let mut xml = new_writer();
        xml.start_element("a:effectLst");
        for (effect, strategy) in effects.iter().zip(&decisions) {
            if *strategy != Strategy::Rasterize {
                self.write_effect(&mut xml, effect);
            }
        }
        xml.end_element();

        for (effect, strategy) in effects.iter().zip(&decisions) {
            if *strategy != Strategy::Rasterize {
                self.write_trailing(&mut xml, effect);
            }
        }

        out.fragment = Some(xml.end_document());
        out
    }

    fn rasterize_request(&self, effect: &FilterEffect, id: u32) -> RasterizeRequest {
        let reason = if effect.complexity_score >= self.registry.rasterization_threshold {
            format!(
                "'{}' chain complexity {} exceeds the rasterization threshold",
                effect.kind.tag(),
                effect.complexity_score
            )
        } else if effect.requires_rasterization {
            format!("'{}' requires pixel-level sampling", effect.kind.tag())
        } else {
            format!("'{}' has no DrawingML counterpart", effect.kind.tag())
        };

        RasterizeRequest {
            reason,
            complexity_score: effect.complexity_score,
            id,
        }
    }

    // Effect-list children: everything that legally lives inside
    // `<a:effectLst>`.
    fn write_effect(&self, xml: &mut XmlWriter, effect: &FilterEffect) {
        let dpi = self.registry.dpi;
        match effect.kind {
            EffectKind::Blur { std_dev } => {
                xml.start_element("a:blur");
                xml.write_attribute("rad", &units::px_to_emu(blur_radius(std_dev), dpi));
                xml.end_element();
            }

            EffectKind::Shadow { dx, dy, std_dev, color, opacity } => {
                let (dist, dir) = units::shadow_offset(dx, dy, dpi);
                xml.start_element("a:outerShdw");
                xml.write_attribute("blurRad", &units::px_to_emu(blur_radius(std_dev), dpi));
                xml.write_attribute("dist", &dist);
                xml.write_attribute("dir", &dir);
                write_color(xml, color, opacity.value());
                xml.end_element();
            }

            EffectKind::Glow { std_dev, color, opacity } => {
                xml.start_element("a:glow");
                xml.write_attribute("rad", &units::px_to_emu(blur_radius(std_dev), dpi));
                write_color(xml, color, opacity.value());
                xml.end_element();
            }

            EffectKind::Lighting { specular: true, .. } => {
                // Specular highlight approximated by a white outer
                // shadow straight above the shape.
                xml.start_element("a:outerShdw");
                xml.write_attribute("blurRad", &units::px_to_emu(4.0, dpi));
                xml.write_attribute("dist", &units::px_to_emu(2.0, dpi));
                xml.write_attribute("dir", &units::degrees_to_angle_units(270.0));
                write_color(xml, Color::white(), 0.6);
                xml.end_element();
            }

            EffectKind::Lighting { specular: false, color } => {
                // Diffuse shading approximated by an inner shadow;
                // the matching bevel is written by `write_trailing`.
                xml.start_element("a:innerShdw");
                xml.write_attribute("blurRad", &units::px_to_emu(5.0, dpi));
                xml.write_attribute("dist", &units::px_to_emu(2.0, dpi));
                xml.write_attribute("dir", &units::degrees_to_angle_units(90.0));
                write_color(xml, color, 0.4);
                xml.end_element();
            }

            _ => {}
        }
    }

    // Fragments that live outside `<a:effectLst>`: 3-D properties and
    // fill color transforms. The caller splices them into the shape's
    // properties next to the effect list.
    fn write_trailing(&self, xml: &mut XmlWriter, effect: &FilterEffect) {
        let dpi = self.registry.dpi;
        match effect.kind {
            EffectKind::Saturate(s) => {
                xml.start_element("a:satMod");
                xml.write_attribute("val", &units::fraction_to_percent_units(s));
                xml.end_element();
            }

            EffectKind::HueRotate(deg) => {
                xml.start_element("a:hue");
                xml.write_attribute("val", &units::degrees_to_angle_units(deg));
                xml.end_element();
            }

            EffectKind::Lighting { specular: false, .. } => {
                xml.start_element("a:sp3d");
                xml.start_element("a:bevelT");
                xml.write_attribute("w", &units::px_to_emu(3.0, dpi));
                xml.write_attribute("h", &units::px_to_emu(1.5, dpi));
                xml.end_element();
                xml.end_element();
            }

            EffectKind::Convolve {
                class: KernelClass::EdgeDetect,
            } => {
                // An edge-detection kernel reduces to outlining the
                // shape; emitted as a dashed outline the caller merges
                // into the shape's line properties.
                xml.start_element("a:ln");
                xml.write_attribute("w", &units::px_to_emu(1.0, dpi));
                xml.start_element("a:solidFill");
                write_color(xml, Color::black(), 1.0);
                xml.end_element();
                xml.start_element("a:prstDash");
                xml.write_attribute("val", "dash");
                xml.end_element();
                xml.end_element();
            }

            _ => {}
        }
    }
}

fn new_writer() -> XmlWriter {
    XmlWriter::new(xmlwriter::Options::default())
}

// DrawingML blur radii describe the visual extent of the blur, which
// for a Gaussian is roughly three standard deviations.
fn blur_radius(std_dev: f64) -> f64 {
    std_dev * 3.0
}

fn write_color(xml: &mut XmlWriter, color: Color, alpha: f64) {
    xml.start_element("a:srgbClr");
    xml.write_attribute("val", &color.to_hex());
    if alpha < 1.0 {
        xml.start_element("a:alpha");
        xml.write_attribute("val", &units::fraction_to_percent_units(alpha));
        xml.end_element();
    }
    xml.end_element();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::patterns::{detect, EffectKind, FilterEffect};
    use crate::filter::Chain;
    use crate::complexity;

    fn effects_for(filter: &str) -> Vec<FilterEffect> {
        let text = format!("<svg>{}</svg>", filter);
        let doc = roxmltree::Document::parse(&text).unwrap();
        let filter = doc.root_element().first_element_child().unwrap();
        let chain = Chain::parse(filter);
        let score = complexity::score_chain(&chain);
        detect(&chain, score)
    }

    fn mapper() -> EffectMapper {
        EffectMapper::new(Registry::default())
    }

    #[test]
    fn shadow_scenario_goes_native() {
        let effects = effects_for(
            "<filter id='f'>\
                <feOffset dx='3' dy='3' result='o'/>\
                <feGaussianBlur in='o' stdDeviation='2' result='b'/>\
                <feComposite in='b' in2='SourceGraphic' operator='over'/>\
            </filter>",
        );

        assert_eq!(effects.len(), 1);
        assert_eq!(mapper().strategy(&effects[0]), Strategy::NativeDml);

        // dist = hypot(3,3) = 4.2426... px.
        let mapped = mapper().map(&effects[0], 1);
        let fragment = mapped.fragment.unwrap();
        let expected_dist = units::px_to_emu((3.0f64).hypot(3.0), 96.0);
        assert!(fragment.contains(&format!("dist=\"{}\"", expected_dist)));
        assert!(fragment.contains("a:outerShdw"));
    }

    #[test]
    fn hue_and_saturate_are_hacks() {
        let effects = effects_for(
            "<filter id='f'>\
                <feColorMatrix type='hueRotate' values='90'/>\
            </filter>",
        );
        assert_eq!(mapper().strategy(&effects[0]), Strategy::DmlHack);
        let fragment = mapper().map(&effects[0], 1).fragment.unwrap();
        assert!(fragment.contains("val=\"5400000\""));

        let effects = effects_for(
            "<filter id='f'>\
                <feColorMatrix type='saturate' values='0.5'/>\
            </filter>",
        );
        let fragment = mapper().map(&effects[0], 1).fragment.unwrap();
        assert!(fragment.contains("val=\"50000\""));
    }

    #[test]
    fn turbulence_rasterizes_with_reason() {
        let effects = effects_for(
            "<filter id='f'>\
                <feTurbulence baseFrequency='0.05'/>\
            </filter>",
        );

        let mapped = mapper().map(&effects[0], 7);
        assert_eq!(mapped.strategy, Strategy::Rasterize);
        let request = mapped.rasterize.unwrap();
        assert_eq!(request.id, 7);
        assert_eq!(request.complexity_score, 3.5);
        assert!(mapped.fragment.is_none());
    }

    #[test]
    fn edge_detect_kernel_is_a_hack_uniform_is_not() {
        let effects = effects_for(
            "<filter id='f'>\
                <feConvolveMatrix order='3' kernelMatrix='-1 0 1 -2 0 2 -1 0 1'/>\
            </filter>",
        );
        assert_eq!(mapper().strategy(&effects[0]), Strategy::DmlHack);

        let effects = effects_for(
            "<filter id='f'>\
                <feConvolveMatrix order='5' kernelMatrix='1 1 1 1 1 1 1 1 1 1 1 1 1 1 1 1 1 1 1 1 1 1 1 1 1'/>\
            </filter>",
        );
        assert_eq!(mapper().strategy(&effects[0]), Strategy::Rasterize);
    }

    #[test]
    fn lighting_is_an_approximation() {
        let effects = effects_for(
            "<filter id='f'>\
                <feDiffuseLighting surfaceScale='2'>\
                    <feDistantLight azimuth='45' elevation='60'/>\
                </feDiffuseLighting>\
            </filter>",
        );

        // score 0.5 + 2.2 = 2.7, under the hack threshold.
        assert_eq!(mapper().strategy(&effects[0]), Strategy::DmlHack);
        let fragment = mapper().map(&effects[0], 1).fragment.unwrap();
        assert!(fragment.contains("a:innerShdw"));
        assert!(fragment.contains("a:bevelT"));
    }

    #[test]
    fn effect_list_reports_counts() {
        let effects = effects_for(
            "<filter id='f'>\
                <feGaussianBlur stdDeviation='2' result='b'/>\
                <feColorMatrix in='b' type='saturate' values='0.3' result='s'/>\
                <feDisplacementMap in='s' in2='SourceGraphic' scale='10'/>\
            </filter>",
        );

        let mut ids = 0;
        let list = mapper().map_all(&effects, || {
            ids += 1;
            ids
        });

        assert_eq!(list.native, 1);
        assert_eq!(list.hack, 1);
        assert_eq!(list.raster, 1);
        assert_eq!(list.rasterize.len(), 1);
        let fragment = list.fragment.unwrap();
        assert!(fragment.starts_with("<a:effectLst>"));
        assert!(fragment.contains("a:blur"));
        assert!(fragment.contains("a:satMod"));
    }

    #[test]
    fn degraded_chain_never_goes_native() {
        let mut effect = FilterEffect {
            kind: EffectKind::Blur { std_dev: 2.0 },
            requires_rasterization: true,
            complexity_score: 0.5,
            optimizations: Vec::new(),
        };
        assert_eq!(mapper().strategy(&effect), Strategy::Rasterize);

        effect.requires_rasterization = false;
        assert_eq!(mapper().strategy(&effect), Strategy::NativeDml);
    }
}
