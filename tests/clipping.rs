// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use once_cell::sync::Lazy;

use svg2dml::clip::{Analysis, ClipStrategy, ClippingAnalyzer, Complexity, PerformanceImpact};
use svg2dml::{BasicContext, ClipPolicy, PolicyVerdict, Registry};

fn analyze(svg: &str) -> Analysis {
    let doc = roxmltree::Document::parse(svg).unwrap();
    let element = doc
        .descendants()
        .find(|n| {
            n.attribute("clip-path").is_some() && n.tag_name().name() != "clipPath"
        })
        .unwrap();

    let mut ctx = BasicContext::new(doc.root_element());
    ClippingAnalyzer::new(Registry::default()).analyze(element, &mut ctx)
}

#[test]
fn lone_rect_clip_is_native() {
    let analysis = analyze(
        "<svg>\
            <clipPath id='c'><rect x='0' y='0' width='100' height='50'/></clipPath>\
            <g clip-path='url(#c)'><rect width='200' height='200'/></g>\
        </svg>",
    );

    assert_eq!(analysis.complexity, Complexity::Simple);
    assert!(analysis.powerpoint_compatible);
    assert_eq!(analysis.recommended_strategy, ClipStrategy::PowerPointNative);
    assert_eq!(analysis.fallback_strategy, ClipStrategy::CustGeom);
}

#[test]
fn six_shapes_need_emf() {
    let analysis = analyze(
        "<svg>\
            <clipPath id='c'>\
                <rect width='1' height='1'/><rect width='2' height='2'/>\
                <rect width='3' height='3'/><rect width='4' height='4'/>\
                <rect width='5' height='5'/><rect width='6' height='6'/>\
            </clipPath>\
            <g clip-path='url(#c)'/>\
        </svg>",
    );

    assert_eq!(analysis.complexity, Complexity::Complex);
    assert_eq!(analysis.recommended_strategy, ClipStrategy::EmfVector);
    assert_eq!(analysis.fallback_strategy, ClipStrategy::Rasterization);
    assert_eq!(analysis.performance_impact, PerformanceImpact::High);
}

static LONG_PATH_SVG: Lazy<String> = Lazy::new(|| {
    let d: String = std::iter::once("M 0 0".to_string())
        .chain((1..30).map(|i| format!(" L {} {}", i * 3, i * 7 % 50)))
        .collect();
    format!(
        "<svg>\
            <clipPath id='c'><path d='{} Z'/></clipPath>\
            <g clip-path='url(#c)'/>\
        </svg>",
        d
    )
});

#[test]
fn long_path_is_complex() {
    let analysis = analyze(&LONG_PATH_SVG);
    assert_eq!(analysis.complexity, Complexity::Complex);
    assert_eq!(analysis.recommended_strategy, ClipStrategy::EmfVector);
}

#[test]
fn nested_references_aggregate_one_tier() {
    let analysis = analyze(
        "<svg>\
            <clipPath id='outer' clip-path='url(#inner)'>\
                <rect width='10' height='10'/>\
            </clipPath>\
            <clipPath id='inner'><circle cx='5' cy='5' r='5'/></clipPath>\
            <g clip-path='url(#outer)'/>\
        </svg>",
    );

    assert_eq!(analysis.clip_paths.len(), 2);
    assert_eq!(analysis.clip_paths[0].complexity, Complexity::Simple);
    assert_eq!(analysis.clip_paths[1].complexity, Complexity::Simple);
    assert_eq!(analysis.complexity, Complexity::Moderate);
    assert!(analysis.requires_preprocessing);
    assert!(analysis
        .optimization_opportunities
        .contains(&"shape_merging"));
}

#[test]
fn fallback_is_always_one_step_down() {
    let cases = [
        "<svg><clipPath id='c'><rect width='1' height='1'/></clipPath>\
         <g clip-path='url(#c)'/></svg>",
        "<svg><clipPath id='c'><path d='M 0 0 L 1 0 L 1 1 L 0 1 L 0 0 L 1 0 L 1 1 Z'/>\
         </clipPath><g clip-path='url(#c)'/></svg>",
        "<svg><clipPath id='c'><text>x</text></clipPath>\
         <g clip-path='url(#c)'/></svg>",
    ];

    for svg in &cases {
        let analysis = analyze(svg);
        assert_eq!(
            analysis.fallback_strategy,
            analysis.recommended_strategy.next()
        );
    }
}

#[test]
fn long_path_data_suggests_simplification() {
    let analysis = analyze(&LONG_PATH_SVG);
    assert!(analysis
        .optimization_opportunities
        .contains(&"path_simplification"));
}

#[test]
fn transform_suggests_flattening() {
    let analysis = analyze(
        "<svg>\
            <clipPath id='c' transform='translate(5 5)'>\
                <rect width='10' height='10'/>\
            </clipPath>\
            <g clip-path='url(#c)'/>\
        </svg>",
    );

    assert!(analysis
        .optimization_opportunities
        .contains(&"transform_flattening"));
}

#[test]
fn resolved_marker_is_idempotent() {
    let analysis = analyze(
        "<svg>\
            <clipPath id='c'><image href='a.png'/></clipPath>\
            <g clip-path='url(#c)' data-clip-resolved='true' \
               data-clip-complexity='simple'/>\
        </svg>",
    );

    // The marker wins over the (unsupported) definition.
    assert!(analysis.prior_resolved);
    assert_eq!(analysis.complexity, Complexity::Simple);
    assert!(!analysis.requires_preprocessing);
}

#[derive(Debug)]
struct NoNativeClips;

impl ClipPolicy for NoNativeClips {
    fn decide(&self, strategy: ClipStrategy, _shape_count: usize) -> PolicyVerdict {
        if strategy == ClipStrategy::PowerPointNative {
            PolicyVerdict::Degrade
        } else {
            PolicyVerdict::Keep
        }
    }
}

#[test]
fn policy_vetoes_only_downward() {
    let doc = roxmltree::Document::parse(
        "<svg>\
            <clipPath id='c'><rect width='10' height='10'/></clipPath>\
            <g clip-path='url(#c)'/>\
        </svg>",
    )
    .unwrap();
    let element = doc
        .descendants()
        .find(|n| n.attribute("clip-path").is_some())
        .unwrap();

    let mut ctx = BasicContext::new(doc.root_element()).with_policy(Box::new(NoNativeClips));
    let mut analyzer = ClippingAnalyzer::new(Registry::default());
    let analysis = analyzer.analyze(element, &mut ctx);

    assert_eq!(analysis.recommended_strategy, ClipStrategy::CustGeom);
    assert_eq!(analysis.fallback_strategy, ClipStrategy::EmfVector);
    assert_eq!(analyzer.stats().policy_decisions, 1);
}

#[test]
fn conversion_fragments_match_the_strategy() {
    let doc = roxmltree::Document::parse(
        "<svg>\
            <clipPath id='a'><rect width='96' height='48'/></clipPath>\
            <clipPath id='b'><path d='M 0 0 L 96 0 L 96 48 L 0 48 Z'/></clipPath>\
            <clipPath id='c'><text>x</text></clipPath>\
            <g clip-path='url(#a)'/>\
            <g clip-path='url(#b)'/>\
            <g clip-path='url(#c)'/>\
        </svg>",
    )
    .unwrap();
    let elements: Vec<_> = doc
        .descendants()
        .filter(|n| n.tag_name().name() == "g")
        .collect();

    let mut ctx = BasicContext::new(doc.root_element());
    let mut analyzer = ClippingAnalyzer::new(Registry::default());

    let native = analyzer.convert(elements[0], &mut ctx);
    assert!(native.fragment.unwrap().contains("prst=\"rect\""));

    let custom = analyzer.convert(elements[1], &mut ctx);
    let fragment = custom.fragment.unwrap();
    assert!(fragment.contains("a:custGeom"));
    // 96px at 96dpi is exactly one inch.
    assert!(fragment.contains("w=\"914400\""));

    let raster = analyzer.convert(elements[2], &mut ctx);
    assert!(raster.fragment.is_none());
    let request = raster.rasterize.unwrap();
    assert!(request.reason.contains("'c'"));

    // Shape ids keep increasing across conversions.
    assert!(native.shape_id < custom.shape_id);
    assert!(custom.shape_id < raster.shape_id);
}

#[test]
fn cache_and_tallies_accumulate() {
    let doc = roxmltree::Document::parse(
        "<svg>\
            <clipPath id='c'><rect width='10' height='10'/></clipPath>\
            <g clip-path='url(#c)'/>\
            <g clip-path='url(#c)'/>\
        </svg>",
    )
    .unwrap();
    let elements: Vec<_> = doc
        .descendants()
        .filter(|n| n.tag_name().name() == "g")
        .collect();

    let mut ctx = BasicContext::new(doc.root_element());
    let mut analyzer = ClippingAnalyzer::new(Registry::default());
    analyzer.analyze(elements[0], &mut ctx);
    analyzer.analyze(elements[1], &mut ctx);

    let stats = analyzer.stats();
    assert_eq!(stats.analyses_performed, 2);
    assert_eq!(stats.cache_hits, 1);
    assert_eq!(stats.simple, 2);

    analyzer.reset_statistics();
    let stats = analyzer.stats();
    assert_eq!(stats.analyses_performed, 0);
    assert_eq!(stats.simple, 0);
}

#[test]
fn missing_definition_degrades_to_unclipped() {
    let analysis = analyze("<svg><g clip-path='url(#missing)'/></svg>");
    assert!(analysis.clip_paths.is_empty());
    assert_eq!(analysis.performance_impact, PerformanceImpact::None);
}
