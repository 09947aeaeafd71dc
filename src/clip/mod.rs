// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Clip-path analysis and conversion.
//!
//! A `clip-path` reference is resolved against the document, every
//! shape inside the referenced `<clipPath>` is classified, and the
//! aggregate complexity picks a strategy along a fixed chain that only
//! ever degrades:
//!
//! `PowerPointNative` → `CustGeom` → `EmfVector` → `Rasterization`
//!
//! The fallback is always exactly one step down from the
//! recommendation, never a skip.

use xmlwriter::XmlWriter;

use crate::cache::ResultCache;
use crate::context::{Context, PolicyVerdict};
use crate::mapper::RasterizeRequest;
use crate::svgtree::{element_by_id, SvgNodeExt};
use crate::units::Units;
use crate::Registry;

pub mod shapes;

pub use self::shapes::ClipShape;

/// Marker left by an upstream pass that already flattened the clip
/// chain to a boolean mask.
const RESOLVED_MARKER: &str = "data-clip-resolved";
const RESOLVED_COMPLEXITY: &str = "data-clip-complexity";

/// How hard a clip chain is to express in DrawingML.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Complexity {
    /// A single elementary shape or a short path.
    Simple,
    /// A few elementary shapes or a medium path.
    Moderate,
    /// Many shapes, long paths or filtered shapes.
    Complex,
    /// Text, images or `use` references inside the clip.
    Unsupported,
}

impl Complexity {
    /// One tier up. `Complex` and `Unsupported` saturate.
    pub fn bump(self) -> Complexity {
        match self {
            Complexity::Simple => Complexity::Moderate,
            Complexity::Moderate => Complexity::Complex,
            Complexity::Complex => Complexity::Complex,
            Complexity::Unsupported => Complexity::Unsupported,
        }
    }

    fn parse(s: &str) -> Option<Complexity> {
        match s {
            "simple" => Some(Complexity::Simple),
            "moderate" => Some(Complexity::Moderate),
            "complex" => Some(Complexity::Complex),
            "unsupported" => Some(Complexity::Unsupported),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Moderate => "moderate",
            Complexity::Complex => "complex",
            Complexity::Unsupported => "unsupported",
        }
    }
}

/// The conversion strategy chain, best to worst.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ClipStrategy {
    /// A DrawingML preset geometry.
    PowerPointNative,
    /// A custom geometry with an explicit path list.
    CustGeom,
    /// Vector metafile produced by the caller's EMF pipeline.
    EmfVector,
    /// Flatten to a bitmap.
    Rasterization,
}

impl ClipStrategy {
    /// The next strategy down the chain. `Rasterization` is terminal.
    pub fn next(self) -> ClipStrategy {
        match self {
            ClipStrategy::PowerPointNative => ClipStrategy::CustGeom,
            ClipStrategy::CustGeom => ClipStrategy::EmfVector,
            ClipStrategy::EmfVector => ClipStrategy::Rasterization,
            ClipStrategy::Rasterization => ClipStrategy::Rasterization,
        }
    }
}

/// Estimated conversion cost for observability.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[allow(missing_docs)]
pub enum PerformanceImpact {
    None,
    Low,
    Medium,
    High,
    VeryHigh,
}

/// One resolved `<clipPath>` definition.
#[derive(Clone, Debug)]
pub struct ClipPath {
    /// The definition's `id`.
    pub id: String,

    /// Raw `d` data when the clip is a single path.
    pub path_data: Option<String>,

    /// The classified shapes inside the definition.
    pub shapes: Vec<ClipShape>,

    /// `clipPathUnits`, user-space by default.
    pub units: Units,

    /// The definition carries its own `transform`.
    pub has_transform: bool,

    /// This path's individual complexity.
    pub complexity: Complexity,

    /// `clip-rule` of the first shape that sets one.
    pub clip_rule: Option<String>,

    /// Union bounding box of the expressible shape outlines.
    pub bounding_box: Option<crate::Rect>,
}

/// The full analysis result for one clipped element.
#[derive(Clone, Debug)]
pub struct Analysis {
    /// Every `<clipPath>` on the reference chain, outermost first.
    pub clip_paths: Vec<ClipPath>,

    /// Aggregate complexity over the whole chain.
    pub complexity: Complexity,

    /// The structurally selected strategy, after any policy veto.
    pub recommended_strategy: ClipStrategy,

    /// Exactly one step down from the recommendation.
    pub fallback_strategy: ClipStrategy,

    /// Aggregate is simple and the chain has at most two shapes.
    pub powerpoint_compatible: bool,

    /// An upstream flattening pass would simplify this chain.
    pub requires_preprocessing: bool,

    /// Detected optimization opportunity tags.
    pub optimization_opportunities: Vec<&'static str>,

    /// Estimated conversion cost.
    pub performance_impact: PerformanceImpact,

    /// An injected policy asked to drop clipping entirely.
    pub clipping_skipped: bool,

    /// The element carried a prior-resolution marker.
    pub prior_resolved: bool,
}

/// The rendered outcome for one clipped element.
#[derive(Clone, Debug)]
pub struct ClipConversion {
    /// The analysis backing the decision.
    pub analysis: Analysis,

    /// The shape id allocated for the clipping output.
    pub shape_id: u32,

    /// Geometry fragment for the native and custom strategies.
    pub fragment: Option<String>,

    /// Rasterization signal for the EMF and bitmap strategies.
    pub rasterize: Option<RasterizeRequest>,
}

/// Counters kept by [`ClippingAnalyzer`].
#[derive(Clone, Copy, Default, Debug)]
pub struct ClipStats {
    /// Total analyze calls, including cached and degraded ones.
    pub analyses_performed: u64,

    /// Analyze calls answered from the cache.
    pub cache_hits: u64,

    /// Aggregate-complexity tallies, one counter per tier.
    pub simple: u64,
    /// See [`ClipStats::simple`].
    pub moderate: u64,
    /// See [`ClipStats::simple`].
    pub complex: u64,
    /// See [`ClipStats::simple`].
    pub unsupported: u64,

    /// How many times an injected policy was consulted.
    pub policy_decisions: u64,
}

/// Analyzes and converts `clip-path` references.
#[derive(Debug, Default)]
pub struct ClippingAnalyzer {
    registry: Registry,
    cache: ResultCache<Analysis>,
    simple: u64,
    moderate: u64,
    complex: u64,
    unsupported: u64,
    policy_decisions: u64,
}

impl ClippingAnalyzer {
    /// Creates an analyzer with the provided thresholds.
    pub fn new(registry: Registry) -> Self {
        ClippingAnalyzer {
            registry,
            cache: ResultCache::new(),
            simple: 0,
            moderate: 0,
            complex: 0,
            unsupported: 0,
            policy_decisions: 0,
        }
    }

    /// Analyzes an element's clip chain.
    ///
    /// Results are cached by the element's structural hash; an element
    /// without a `clip-path` yields a trivial analysis rather than an
    /// error.
    pub fn analyze<'a, 'input: 'a>(
        &mut self,
        element: roxmltree::Node<'a, 'input>,
        ctx: &mut dyn Context<'a, 'input>,
    ) -> Analysis {
        let mut consulted = 0;
        let analysis = self
            .cache
            .get_or_compute(element, || compute(element, ctx, &mut consulted));
        self.policy_decisions += consulted;

        match analysis.complexity {
            Complexity::Simple => self.simple += 1,
            Complexity::Moderate => self.moderate += 1,
            Complexity::Complex => self.complex += 1,
            Complexity::Unsupported => self.unsupported += 1,
        }

        analysis
    }

    /// Analyzes an element and renders its strategy-specific output.
    pub fn convert<'a, 'input: 'a>(
        &mut self,
        element: roxmltree::Node<'a, 'input>,
        ctx: &mut dyn Context<'a, 'input>,
    ) -> ClipConversion {
        let analysis = self.analyze(element, ctx);
        let shape_id = ctx.next_shape_id();

        if analysis.clipping_skipped || analysis.clip_paths.is_empty() {
            return ClipConversion {
                analysis,
                shape_id,
                fragment: None,
                rasterize: None,
            };
        }

        match analysis.recommended_strategy {
            ClipStrategy::PowerPointNative => {
                let mut xml = XmlWriter::new(xmlwriter::Options::default());
                shapes::write_prst_geom(&mut xml, &analysis.clip_paths[0].shapes[0]);
                ClipConversion {
                    analysis,
                    shape_id,
                    fragment: Some(xml.end_document()),
                    rasterize: None,
                }
            }
            ClipStrategy::CustGeom => {
                let all: Vec<ClipShape> = analysis
                    .clip_paths
                    .iter()
                    .flat_map(|p| p.shapes.iter().cloned())
                    .collect();

                let mut xml = XmlWriter::new(xmlwriter::Options::default());
                shapes::write_cust_geom(&mut xml, &all, self.registry.dpi);
                let fragment = xml.end_document();

                if fragment.is_empty() {
                    // No expressible outline at all. Degrade along the
                    // chain instead of emitting an empty geometry.
                    ClipConversion {
                        rasterize: Some(rasterize_request(&analysis, shape_id)),
                        analysis,
                        shape_id,
                        fragment: None,
                    }
                } else {
                    ClipConversion {
                        analysis,
                        shape_id,
                        fragment: Some(fragment),
                        rasterize: None,
                    }
                }
            }
            ClipStrategy::EmfVector | ClipStrategy::Rasterization => ClipConversion {
                rasterize: Some(rasterize_request(&analysis, shape_id)),
                analysis,
                shape_id,
                fragment: None,
            },
        }
    }

    /// Returns a counters snapshot, merged with the cache counters.
    pub fn stats(&self) -> ClipStats {
        let cache = self.cache.stats();
        ClipStats {
            analyses_performed: cache.analyses_performed,
            cache_hits: cache.cache_hits,
            simple: self.simple,
            moderate: self.moderate,
            complex: self.complex,
            unsupported: self.unsupported,
            policy_decisions: self.policy_decisions,
        }
    }

    /// Zeroes all counters. Cached entries are kept.
    pub fn reset_statistics(&mut self) {
        self.cache.reset_statistics();
        self.simple = 0;
        self.moderate = 0;
        self.complex = 0;
        self.unsupported = 0;
        self.policy_decisions = 0;
    }

    /// Drops all cached analyses. Counters are kept.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

fn rasterize_request(analysis: &Analysis, shape_id: u32) -> RasterizeRequest {
    let id = analysis
        .clip_paths
        .first()
        .map_or("", |p| p.id.as_str());

    RasterizeRequest {
        reason: format!(
            "clip path '{}' is {} and needs the vector/raster pipeline",
            id,
            analysis.complexity.name()
        ),
        complexity_score: complexity_score(analysis.complexity),
        id: shape_id,
    }
}

fn complexity_score(complexity: Complexity) -> f64 {
    match complexity {
        Complexity::Simple => 1.0,
        Complexity::Moderate => 2.0,
        Complexity::Complex => 3.0,
        Complexity::Unsupported => 4.0,
    }
}

fn compute<'a, 'input: 'a>(
    element: roxmltree::Node<'a, 'input>,
    ctx: &mut dyn Context<'a, 'input>,
    policy_consultations: &mut u64,
) -> Analysis {
    // An upstream pass may already have flattened the chain to a mask.
    // Its annotation is reused verbatim; re-resolving would break
    // idempotence.
    if element.attr(RESOLVED_MARKER) == Some("true") {
        let complexity = element
            .attr(RESOLVED_COMPLEXITY)
            .and_then(Complexity::parse)
            .unwrap_or(Complexity::Simple);
        return resolved_analysis(complexity);
    }

    let id = match element.func_iri("clip-path") {
        Some(id) => id,
        None => return unclipped_analysis(),
    };

    let clip_paths = match resolve_chain(ctx, &id) {
        Some(paths) => paths,
        None => {
            log::warn!("Failed to resolve clip path '{}'. Element stays unclipped.", id);
            return unclipped_analysis();
        }
    };

    let complexity = aggregate(&clip_paths);
    let total_shapes: usize = clip_paths.iter().map(|p| p.shapes.len()).sum();
    let powerpoint_compatible = complexity == Complexity::Simple && total_shapes <= 2;

    // Stricter than the compatibility flag on purpose: a preset
    // geometry can hold exactly one elementary shape, while two
    // compatible shapes still fit a custom geometry.
    let native_capable = total_shapes == 1
        && clip_paths.len() == 1
        && clip_paths[0].shapes[0].elementary;

    let mut recommended = match complexity {
        Complexity::Unsupported => ClipStrategy::Rasterization,
        Complexity::Simple if native_capable => ClipStrategy::PowerPointNative,
        Complexity::Simple | Complexity::Moderate => ClipStrategy::CustGeom,
        Complexity::Complex => ClipStrategy::EmfVector,
    };

    let mut clipping_skipped = false;
    if let Some(policy) = ctx.policy() {
        *policy_consultations += 1;
        match policy.decide(recommended, total_shapes) {
            PolicyVerdict::Keep => {}
            // A policy can only veto towards a safer tier; it can
            // never promote past the structural verdict.
            PolicyVerdict::Degrade => recommended = recommended.next(),
            PolicyVerdict::SkipClipping => clipping_skipped = true,
        }
    }

    let requires_preprocessing = clip_paths.len() > 1
        || clip_paths.iter().any(|p| p.complexity >= Complexity::Moderate);

    let mut opportunities = Vec::new();
    if clip_paths
        .iter()
        .flat_map(|p| p.shapes.iter())
        .any(|s| s.path_data_len > 200)
    {
        opportunities.push("path_simplification");
    }
    if clip_paths.len() > 1 {
        opportunities.push("shape_merging");
    }
    if clip_paths.iter().any(|p| p.has_transform)
        || clip_paths
            .iter()
            .flat_map(|p| p.shapes.iter())
            .any(|s| s.has_transform)
    {
        opportunities.push("transform_flattening");
    }
    if complexity >= Complexity::Moderate {
        opportunities.push("preprocessing_resolution");
    }

    Analysis {
        clip_paths,
        complexity,
        recommended_strategy: recommended,
        fallback_strategy: recommended.next(),
        powerpoint_compatible,
        requires_preprocessing,
        optimization_opportunities: opportunities,
        performance_impact: impact_of(complexity),
        clipping_skipped,
        prior_resolved: false,
    }
}

fn resolved_analysis(complexity: Complexity) -> Analysis {
    let recommended = match complexity {
        Complexity::Unsupported => ClipStrategy::Rasterization,
        Complexity::Simple => ClipStrategy::PowerPointNative,
        Complexity::Moderate => ClipStrategy::CustGeom,
        Complexity::Complex => ClipStrategy::EmfVector,
    };

    Analysis {
        clip_paths: Vec::new(),
        complexity,
        recommended_strategy: recommended,
        fallback_strategy: recommended.next(),
        powerpoint_compatible: complexity == Complexity::Simple,
        requires_preprocessing: false,
        optimization_opportunities: Vec::new(),
        performance_impact: impact_of(complexity),
        clipping_skipped: false,
        prior_resolved: true,
    }
}

fn unclipped_analysis() -> Analysis {
    Analysis {
        clip_paths: Vec::new(),
        complexity: Complexity::Simple,
        recommended_strategy: ClipStrategy::PowerPointNative,
        fallback_strategy: ClipStrategy::CustGeom,
        powerpoint_compatible: true,
        requires_preprocessing: false,
        optimization_opportunities: Vec::new(),
        performance_impact: PerformanceImpact::None,
        clipping_skipped: false,
        prior_resolved: false,
    }
}

fn impact_of(complexity: Complexity) -> PerformanceImpact {
    match complexity {
        Complexity::Simple => PerformanceImpact::Low,
        Complexity::Moderate => PerformanceImpact::Medium,
        Complexity::Complex => PerformanceImpact::High,
        Complexity::Unsupported => PerformanceImpact::VeryHigh,
    }
}

// Follows the reference chain: a <clipPath> may itself carry a
// clip-path attribute pointing at another definition.
fn resolve_chain<'a, 'input: 'a>(
    ctx: &dyn Context<'a, 'input>,
    first_id: &str,
) -> Option<Vec<ClipPath>> {
    let root = ctx.document_root();
    let mut paths = Vec::new();
    let mut visited = Vec::new();
    let mut current = first_id.to_string();

    loop {
        if visited.contains(&current) {
            log::warn!("Self-referencing clip path '{}'. The chain is truncated.", current);
            break;
        }
        visited.push(current.clone());

        let node = element_by_id(root, &current)?;
        if !node.is_tag("clipPath") {
            log::warn!("'{}' is not a clipPath element.", current);
            return None;
        }

        paths.push(build_clip_path(node, &current));

        match node.func_iri("clip-path") {
            Some(next) => current = next,
            None => break,
        }
    }

    Some(paths)
}

fn build_clip_path(node: roxmltree::Node, id: &str) -> ClipPath {
    let shapes = shapes::collect(node);
    let complexity = classify(&shapes);
    let bounding_box = shapes::union_bbox(&shapes)
        .and_then(|b| crate::Rect::new(b.x0, b.y0, b.width(), b.height()));

    let units = match node.attr("clipPathUnits") {
        Some("objectBoundingBox") => Units::ObjectBoundingBox,
        _ => Units::UserSpaceOnUse,
    };

    let path_data = if shapes.len() == 1 && shapes[0].tag == "path" {
        node.children()
            .find(|n| n.is_tag("path"))
            .and_then(|n| n.attr("d"))
            .map(str::to_string)
    } else {
        None
    };

    let clip_rule = node
        .children()
        .filter(|n| n.is_element())
        .find_map(|n| n.attr("clip-rule"))
        .map(str::to_string);

    ClipPath {
        id: id.to_string(),
        path_data,
        complexity,
        units,
        has_transform: node.attr("transform").is_some(),
        clip_rule,
        bounding_box,
        shapes,
    }
}

/// Classifies the shapes of a single `<clipPath>` definition.
pub fn classify(shapes: &[ClipShape]) -> Complexity {
    if shapes.iter().any(|s| s.unsupported) {
        return Complexity::Unsupported;
    }

    if shapes.is_empty() {
        // An empty definition clips everything away; trivial.
        return Complexity::Simple;
    }

    if shapes.iter().any(|s| s.has_filter) {
        return Complexity::Complex;
    }

    if shapes.len() == 1 {
        let shape = &shapes[0];
        if shape.elementary {
            return Complexity::Simple;
        }

        if shape.tag == "path" {
            return match shape.command_count {
                0..=5 => Complexity::Simple,
                6..=20 => Complexity::Moderate,
                _ => Complexity::Complex,
            };
        }

        return Complexity::Moderate;
    }

    if shapes.len() > 5 {
        return Complexity::Complex;
    }

    if shapes.iter().any(|s| s.command_count > 20) {
        return Complexity::Complex;
    }

    Complexity::Moderate
}

/// Aggregates a whole reference chain: one tier above the worst
/// individual path when several are present.
pub fn aggregate(paths: &[ClipPath]) -> Complexity {
    let max = paths
        .iter()
        .map(|p| p.complexity)
        .max()
        .unwrap_or(Complexity::Simple);

    if paths.len() > 1 {
        max.bump()
    } else {
        max
    }
}
