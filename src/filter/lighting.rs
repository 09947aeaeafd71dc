// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use roxmltree::Node;

use super::{ChainBuilder, Input, Kind};
use crate::geom::f64_bound;
use crate::svgtree::SvgNodeExt;
use crate::{Color, Error};

/// A lighting filter primitive.
///
/// `feDiffuseLighting` or `feSpecularLighting` element in the SVG.
#[derive(Clone, Debug)]
pub struct Lighting {
    /// Identifies input for the given filter primitive.
    ///
    /// `in` in the SVG.
    pub input: Input,

    /// A surface scale.
    ///
    /// `surfaceScale` in the SVG.
    pub surface_scale: f64,

    /// Diffuse or specular parameters.
    pub kind: LightingKind,

    /// A lighting color.
    ///
    /// `lighting-color` in the SVG.
    pub lighting_color: Color,

    /// A light source.
    pub light_source: LightSource,
}

/// Diffuse/specular specific lighting parameters.
#[derive(Clone, Copy, Debug)]
pub enum LightingKind {
    /// `feDiffuseLighting`.
    Diffuse {
        /// `diffuseConstant` in the SVG.
        diffuse_constant: f64,
    },

    /// `feSpecularLighting`.
    Specular {
        /// `specularConstant` in the SVG.
        specular_constant: f64,

        /// `specularExponent` in the SVG. Guaranteed to be in 1..128.
        specular_exponent: f64,
    },
}

/// A light source kind.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug)]
pub enum LightSource {
    DistantLight {
        /// `azimuth` in the SVG.
        azimuth: f64,
        /// `elevation` in the SVG.
        elevation: f64,
    },
    PointLight {
        x: f64,
        y: f64,
        z: f64,
    },
    SpotLight {
        x: f64,
        y: f64,
        z: f64,
        points_at_x: f64,
        points_at_y: f64,
        points_at_z: f64,
        specular_exponent: f64,
        limiting_cone_angle: Option<f64>,
    },
}

pub(crate) fn convert_diffuse(fe: Node, builder: &mut ChainBuilder) -> Result<Kind, Error> {
    Ok(Kind::Lighting(Lighting {
        input: builder.resolve_input(fe, "in"),
        surface_scale: fe.try_parse_attr("surfaceScale")?.unwrap_or(1.0),
        kind: LightingKind::Diffuse {
            diffuse_constant: fe.try_parse_attr("diffuseConstant")?.unwrap_or(1.0),
        },
        lighting_color: convert_lighting_color(fe),
        light_source: convert_light_source(fe),
    }))
}

pub(crate) fn convert_specular(fe: Node, builder: &mut ChainBuilder) -> Result<Kind, Error> {
    let specular_exponent = fe.try_parse_attr("specularExponent")?.unwrap_or(1.0);
    let specular_exponent = f64_bound(1.0, specular_exponent, 128.0);

    Ok(Kind::Lighting(Lighting {
        input: builder.resolve_input(fe, "in"),
        surface_scale: fe.try_parse_attr("surfaceScale")?.unwrap_or(1.0),
        kind: LightingKind::Specular {
            specular_constant: fe.try_parse_attr("specularConstant")?.unwrap_or(1.0),
            specular_exponent,
        },
        lighting_color: convert_lighting_color(fe),
        light_source: convert_light_source(fe),
    }))
}

fn convert_lighting_color(fe: Node) -> Color {
    fe.parse_attr::<svgtypes::Color>("lighting-color")
        .map(Color::from)
        .unwrap_or_else(Color::white)
}

// A missing light source behaves like a distant light straight above,
// which keeps the primitive valid without special-casing.
fn convert_light_source(fe: Node) -> LightSource {
    let child = fe.children().find(|n| {
        n.is_element()
            && matches!(
                n.tag_name().name(),
                "feDistantLight" | "fePointLight" | "feSpotLight"
            )
    });

    let child = match child {
        Some(c) => c,
        None => {
            return LightSource::DistantLight {
                azimuth: 0.0,
                elevation: 90.0,
            };
        }
    };

    match child.tag_name().name() {
        "fePointLight" => LightSource::PointLight {
            x: child.parse_attr("x").unwrap_or(0.0),
            y: child.parse_attr("y").unwrap_or(0.0),
            z: child.parse_attr("z").unwrap_or(0.0),
        },
        "feSpotLight" => LightSource::SpotLight {
            x: child.parse_attr("x").unwrap_or(0.0),
            y: child.parse_attr("y").unwrap_or(0.0),
            z: child.parse_attr("z").unwrap_or(0.0),
            points_at_x: child.parse_attr("pointsAtX").unwrap_or(0.0),
            points_at_y: child.parse_attr("pointsAtY").unwrap_or(0.0),
            points_at_z: child.parse_attr("pointsAtZ").unwrap_or(0.0),
            specular_exponent: child.parse_attr("specularExponent").unwrap_or(1.0),
            limiting_cone_angle: child.parse_attr("limitingConeAngle"),
        },
        _ => LightSource::DistantLight {
            azimuth: child.parse_attr("azimuth").unwrap_or(0.0),
            elevation: child.parse_attr("elevation").unwrap_or(0.0),
        },
    }
}
