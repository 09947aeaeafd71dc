// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use svg2dml::{BasicContext, Error, FilterEngine, Registry};

fn convert(svg: &str) -> svg2dml::FilterConversion {
    let doc = roxmltree::Document::parse(svg).unwrap();
    let element = doc
        .descendants()
        .find(|n| n.attribute("filter").is_some())
        .unwrap();

    let mut ctx = BasicContext::new(doc.root_element());
    FilterEngine::new(Registry::default()).convert(element, &mut ctx)
}

#[test]
fn drop_shadow_chain_goes_native() {
    let conversion = convert(
        "<svg>\
            <filter id='f'>\
                <feOffset in='SourceAlpha' dx='3' dy='3' result='off'/>\
                <feGaussianBlur in='off' stdDeviation='2' result='blur'/>\
                <feComposite in='blur' in2='SourceGraphic' operator='over'/>\
            </filter>\
            <rect width='10' height='10' filter='url(#f)'/>\
        </svg>",
    );

    assert_eq!(conversion.native, 1);
    assert_eq!(conversion.hack, 0);
    assert_eq!(conversion.raster, 0);
    assert!(conversion.errors.is_empty());

    let fragment = conversion.fragment.unwrap();
    assert!(fragment.contains("a:outerShdw"));
    // hypot(3, 3) px at 96 dpi, 45 degrees in 60000ths.
    assert!(fragment.contains("dist=\"40411\""));
    assert!(fragment.contains("dir=\"2700000\""));
    // Blur radius is three standard deviations: 6 px.
    assert!(fragment.contains("blurRad=\"57150\""));
}

#[test]
fn asymmetric_shadow_direction() {
    let conversion = convert(
        "<svg>\
            <filter id='f'>\
                <feOffset dx='3' dy='4' result='off'/>\
                <feGaussianBlur in='off' stdDeviation='1' result='blur'/>\
                <feComposite in='blur' in2='SourceGraphic' operator='over'/>\
            </filter>\
            <rect filter='url(#f)'/>\
        </svg>",
    );

    let fragment = conversion.fragment.unwrap();
    // A 3-4-5 triangle: 5 px distance, atan2(4, 3) degrees.
    assert!(fragment.contains("dist=\"47625\""));
    assert!(fragment.contains("dir=\"3187806\""));
}

#[test]
fn flood_colored_shadow_goes_native() {
    // The paint flood has no dependencies and sorts between the blur
    // and the composite; the shadow must still be detected, carry the
    // flood's paint and consume the whole chain. Four primitives score
    // 2.0, so the native bound is lifted above that.
    let doc = roxmltree::Document::parse(
        "<svg>\
            <filter id='f'>\
                <feOffset in='SourceAlpha' dx='3' dy='3' result='off'/>\
                <feGaussianBlur in='off' stdDeviation='2' result='blur'/>\
                <feFlood flood-color='red' flood-opacity='0.5' result='paint'/>\
                <feComposite in='blur' in2='SourceGraphic' operator='over'/>\
            </filter>\
            <rect width='10' height='10' filter='url(#f)'/>\
        </svg>",
    )
    .unwrap();
    let element = doc
        .descendants()
        .find(|n| n.attribute("filter").is_some())
        .unwrap();

    let registry = Registry {
        native_threshold: 2.5,
        ..Registry::default()
    };
    let mut ctx = BasicContext::new(doc.root_element());
    let conversion = FilterEngine::new(registry).convert(element, &mut ctx);

    assert_eq!(conversion.effects.len(), 1);
    assert_eq!(conversion.native, 1);
    assert_eq!(conversion.raster, 0);
    assert!(conversion.errors.is_empty());

    let fragment = conversion.fragment.unwrap();
    assert!(fragment.contains("a:outerShdw"));
    assert!(fragment.contains("dist=\"40411\""));
    assert!(fragment.contains("val=\"FF0000\""));
    assert!(fragment.contains("val=\"50000\""));
}

#[test]
fn hue_rotation_uses_sixty_thousandths() {
    let conversion = convert(
        "<svg>\
            <filter id='f'><feColorMatrix type='hueRotate' values='90'/></filter>\
            <rect filter='url(#f)'/>\
        </svg>",
    );

    assert_eq!(conversion.hack, 1);
    assert!(conversion.fragment.unwrap().contains("val=\"5400000\""));
}

#[test]
fn turbulence_rasterizes() {
    let conversion = convert(
        "<svg>\
            <filter id='f'><feTurbulence baseFrequency='0.05'/></filter>\
            <rect filter='url(#f)'/>\
        </svg>",
    );

    assert_eq!(conversion.raster, 1);
    assert!(conversion.fragment.is_none());
    assert_eq!(conversion.rasterize[0].complexity_score, 3.5);
}

#[test]
fn sobel_kernel_is_hackable_uniform_is_not() {
    let conversion = convert(
        "<svg>\
            <filter id='f'>\
                <feConvolveMatrix order='3' kernelMatrix='-1 0 1 -2 0 2 -1 0 1'/>\
            </filter>\
            <rect filter='url(#f)'/>\
        </svg>",
    );
    assert_eq!(conversion.hack, 1);
    assert!(conversion.fragment.unwrap().contains("a:prstDash"));

    let conversion = convert(
        "<svg>\
            <filter id='f'>\
                <feConvolveMatrix order='5' kernelMatrix='1 1 1 1 1 1 1 1 1 1 \
1 1 1 1 1 1 1 1 1 1 1 1 1 1 1'/>\
            </filter>\
            <rect filter='url(#f)'/>\
        </svg>",
    );
    assert_eq!(conversion.raster, 1);
}

#[test]
fn zero_divisor_is_a_validation_error_not_an_abort() {
    let conversion = convert(
        "<svg>\
            <filter id='f'>\
                <feConvolveMatrix order='3' divisor='0' \
                    kernelMatrix='1 1 1 1 1 1 1 1 1' result='conv'/>\
                <feGaussianBlur stdDeviation='2'/>\
            </filter>\
            <rect filter='url(#f)'/>\
        </svg>",
    );

    // The invalid primitive degraded to a transparent stand-in; the
    // blur next to it still converted.
    assert_eq!(conversion.errors.len(), 1);
    assert!(conversion.errors[0].is_validation());
    assert!(matches!(conversion.errors[0], Error::ZeroDivisor));
    assert_eq!(conversion.native, 1);
}

#[test]
fn kernel_size_mismatch_is_a_validation_error() {
    let conversion = convert(
        "<svg>\
            <filter id='f'>\
                <feConvolveMatrix order='3' kernelMatrix='1 1 1 1'/>\
            </filter>\
            <rect filter='url(#f)'/>\
        </svg>",
    );

    assert!(matches!(
        conversion.errors[0],
        Error::KernelSizeMismatch { expected: 9, actual: 4 }
    ));
    assert!(conversion.errors[0].is_validation());
}

#[test]
fn reference_cycle_degrades_to_rasterization() {
    let conversion = convert(
        "<svg>\
            <filter id='f'>\
                <feGaussianBlur in='b' stdDeviation='1' result='a'/>\
                <feOffset in='a' dx='1' dy='1' result='b'/>\
            </filter>\
            <rect filter='url(#f)'/>\
        </svg>",
    );

    assert!(conversion.requires_rasterization);
    assert!(conversion
        .errors
        .iter()
        .any(|e| matches!(e, Error::DependencyCycle)));
    assert_eq!(conversion.native, 0);
}

#[test]
fn identical_filters_share_one_analysis() {
    let doc = roxmltree::Document::parse(
        "<svg>\
            <filter id='f'><feGaussianBlur stdDeviation='2'/></filter>\
            <rect filter='url(#f)'/>\
            <circle filter='url(#f)'/>\
        </svg>",
    )
    .unwrap();
    let elements: Vec<_> = doc
        .descendants()
        .filter(|n| n.attribute("filter").is_some())
        .collect();

    let mut ctx = BasicContext::new(doc.root_element());
    let mut engine = FilterEngine::new(Registry::default());
    engine.convert(elements[0], &mut ctx);
    engine.convert(elements[1], &mut ctx);

    let stats = engine.stats();
    assert_eq!(stats.analyses_performed, 2);
    assert_eq!(stats.cache_hits, 1);
    assert_eq!(stats.native, 2);
}

#[test]
fn raised_threshold_forces_rasterization() {
    let doc = roxmltree::Document::parse(
        "<svg>\
            <filter id='f'><feGaussianBlur stdDeviation='2'/></filter>\
            <rect filter='url(#f)'/>\
        </svg>",
    )
    .unwrap();
    let element = doc
        .descendants()
        .find(|n| n.attribute("filter").is_some())
        .unwrap();

    let registry = Registry {
        rasterization_threshold: 0.4,
        ..Registry::default()
    };

    let mut ctx = BasicContext::new(doc.root_element());
    let mut engine = FilterEngine::new(registry);
    let conversion = engine.convert(element, &mut ctx);

    assert_eq!(conversion.raster, 1);
    assert!(conversion.fragment.is_none());
}
