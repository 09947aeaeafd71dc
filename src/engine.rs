// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The filter conversion entry point.
//!
//! Resolves an element's `filter` reference, analyzes the primitive
//! chain and maps the detected effects onto DrawingML. Analyses are
//! memoized by the filter element's structural hash; shape ids for
//! rasterization requests are always allocated fresh, so a cached
//! analysis never replays stale ids.

use crate::cache::ResultCache;
use crate::complexity;
use crate::context::Context;
use crate::filter::patterns::{self, FilterEffect};
use crate::filter::Chain;
use crate::mapper::{EffectMapper, RasterizeRequest};
use crate::svgtree::{element_by_id, SvgNodeExt};
use crate::{Error, Registry};

/// The memoized part of a conversion, everything except shape ids.
#[derive(Clone, Debug)]
struct ChainAnalysis {
    effects: Vec<FilterEffect>,
    complexity_score: f64,
    requires_rasterization: bool,
    errors: Vec<Error>,
}

/// The result of converting one element's filter.
#[derive(Clone, Debug)]
pub struct FilterConversion {
    /// The detected semantic effects, in chain order.
    pub effects: Vec<FilterEffect>,

    /// The whole chain's complexity score.
    pub complexity_score: f64,

    /// The chain degraded as a whole and must be rasterized.
    pub requires_rasterization: bool,

    /// Combined DrawingML output, absent when everything rasterized
    /// or the element carries no filter.
    pub fragment: Option<String>,

    /// One request per rasterized effect.
    pub rasterize: Vec<RasterizeRequest>,

    /// Native strategy decisions made for this element.
    pub native: usize,
    /// Hack strategy decisions made for this element.
    pub hack: usize,
    /// Rasterize strategy decisions made for this element.
    pub raster: usize,

    /// Validation errors collected while parsing the chain. The
    /// affected primitives were replaced by transparent stand-ins;
    /// the conversion itself still succeeded.
    pub errors: Vec<Error>,
}

impl FilterConversion {
    fn empty() -> Self {
        FilterConversion {
            effects: Vec::new(),
            complexity_score: 0.0,
            requires_rasterization: false,
            fragment: None,
            rasterize: Vec::new(),
            native: 0,
            hack: 0,
            raster: 0,
            errors: Vec::new(),
        }
    }
}

/// Counters kept by [`FilterEngine`].
#[derive(Clone, Copy, Default, Debug)]
pub struct FilterStats {
    /// Total convert calls that reached chain analysis.
    pub analyses_performed: u64,

    /// Analyses answered from the cache.
    pub cache_hits: u64,

    /// Accumulated native strategy decisions.
    pub native: u64,
    /// Accumulated hack strategy decisions.
    pub hack: u64,
    /// Accumulated rasterize strategy decisions.
    pub raster: u64,

    /// Chains that degraded to whole-chain rasterization.
    pub degraded_chains: u64,
}

/// Converts `filter` references into DrawingML effect lists.
#[derive(Debug, Default)]
pub struct FilterEngine {
    mapper: EffectMapper,
    cache: ResultCache<ChainAnalysis>,
    native: u64,
    hack: u64,
    raster: u64,
    degraded_chains: u64,
}

impl FilterEngine {
    /// Creates an engine with the provided thresholds.
    pub fn new(registry: Registry) -> Self {
        FilterEngine {
            mapper: EffectMapper::new(registry),
            cache: ResultCache::new(),
            native: 0,
            hack: 0,
            raster: 0,
            degraded_chains: 0,
        }
    }

    /// Converts the filter applied to `element`.
    ///
    /// `element` is either a `<filter>` element itself or any element
    /// carrying a `filter="url(#id)"` reference. An element without a
    /// filter yields an empty conversion; a dangling reference forces
    /// rasterization of the whole element.
    pub fn convert<'a, 'input: 'a>(
        &mut self,
        element: roxmltree::Node<'a, 'input>,
        ctx: &mut dyn Context<'a, 'input>,
    ) -> FilterConversion {
        let filter = if element.is_tag("filter") {
            element
        } else {
            let id = match element.func_iri("filter") {
                Some(id) => id,
                None => return FilterConversion::empty(),
            };

            match element_by_id(ctx.document_root(), &id) {
                Some(node) if node.is_tag("filter") => node,
                _ => {
                    log::warn!(
                        "Failed to resolve filter '{}'. The element will be rasterized.",
                        id
                    );
                    return self.unresolved_conversion(id, ctx);
                }
            }
        };

        let analysis = self
            .cache
            .get_or_compute(filter, || Self::analyze(filter));

        let list = self.mapper.map_all(&analysis.effects, || ctx.next_shape_id());
        self.native += list.native as u64;
        self.hack += list.hack as u64;
        self.raster += list.raster as u64;
        if analysis.requires_rasterization {
            self.degraded_chains += 1;
        }

        FilterConversion {
            effects: analysis.effects,
            complexity_score: analysis.complexity_score,
            requires_rasterization: analysis.requires_rasterization,
            fragment: list.fragment,
            rasterize: list.rasterize,
            native: list.native,
            hack: list.hack,
            raster: list.raster,
            errors: analysis.errors,
        }
    }

    fn analyze(filter: roxmltree::Node) -> ChainAnalysis {
        let chain = Chain::parse(filter);
        let complexity_score = complexity::score_chain(&chain);
        let effects = patterns::detect(&chain, complexity_score);

        ChainAnalysis {
            effects,
            complexity_score,
            requires_rasterization: chain.requires_rasterization,
            errors: chain.errors,
        }
    }

    fn unresolved_conversion<'a, 'input: 'a>(
        &mut self,
        id: String,
        ctx: &mut dyn Context<'a, 'input>,
    ) -> FilterConversion {
        self.raster += 1;
        self.degraded_chains += 1;

        let mut conversion = FilterConversion::empty();
        conversion.requires_rasterization = true;
        conversion.errors.push(Error::UnresolvedReference(id.clone()));
        conversion.rasterize.push(RasterizeRequest {
            reason: format!("filter '{}' is not defined in this document", id),
            complexity_score: 0.0,
            id: ctx.next_shape_id(),
        });
        conversion.raster = 1;
        conversion
    }

    /// Returns a counters snapshot, merged with the cache counters.
    pub fn stats(&self) -> FilterStats {
        let cache = self.cache.stats();
        FilterStats {
            analyses_performed: cache.analyses_performed,
            cache_hits: cache.cache_hits,
            native: self.native,
            hack: self.hack,
            raster: self.raster,
            degraded_chains: self.degraded_chains,
        }
    }

    /// Zeroes all counters. Cached entries are kept.
    pub fn reset_statistics(&mut self) {
        self.cache.reset_statistics();
        self.native = 0;
        self.hack = 0;
        self.raster = 0;
        self.degraded_chains = 0;
    }

    /// Drops all cached analyses. Counters are kept.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
