// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Structural memoization of analysis results.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use siphasher::sip::SipHasher13;

/// Hashes the *surface* of an element: tag name, sorted attribute
/// pairs and the direct element-child count.
///
/// This is deliberately not a full-subtree hash. Two elements with the
/// same tag, attributes and child count but different descendants will
/// alias to the same key. The source system accepts this trade-off and
/// so do we; deepening the key would change observable cache behavior.
pub fn structural_hash(node: roxmltree::Node) -> u64 {
    let mut hasher = SipHasher13::new();

    node.tag_name().name().hash(&mut hasher);

    let mut attrs: Vec<(&str, &str)> = node
        .attributes()
        .map(|a| (a.name(), a.value()))
        .collect();
    attrs.sort();
    for (name, value) in attrs {
        name.hash(&mut hasher);
        value.hash(&mut hasher);
    }

    let child_count = node.children().filter(|c| c.is_element()).count();
    child_count.hash(&mut hasher);

    hasher.finish()
}

/// Cache counters snapshot.
#[derive(Clone, Copy, Default, Debug)]
pub struct CacheStats {
    /// Total lookups, hits and misses combined.
    pub analyses_performed: u64,
    /// Lookups answered from the cache.
    pub cache_hits: u64,
}

/// A get-or-compute memo map keyed by [`structural_hash`].
#[derive(Debug)]
pub struct ResultCache<T> {
    map: HashMap<u64, T>,
    stats: CacheStats,
}

impl<T: Clone> ResultCache<T> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        ResultCache {
            map: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    /// Returns the cached value for `node`, computing and storing it
    /// on a miss. Every call counts as one performed analysis.
    pub fn get_or_compute<F: FnOnce() -> T>(&mut self, node: roxmltree::Node, f: F) -> T {
        let key = structural_hash(node);
        self.stats.analyses_performed += 1;

        if let Some(v) = self.map.get(&key) {
            self.stats.cache_hits += 1;
            return v.clone();
        }

        let v = f();
        self.map.insert(key, v.clone());
        v
    }

    /// Drops all cached entries. Counters are kept.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Returns the current counters.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Zeroes the counters. Cached entries are kept.
    pub fn reset_statistics(&mut self) {
        self.stats = CacheStats::default();
    }
}

impl<T: Clone> Default for ResultCache<T> {
    fn default() -> Self {
        ResultCache::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_on_structurally_identical() {
        let doc = roxmltree::Document::parse(
            "<svg>\
                <clipPath id='a'><rect width='10' height='10'/></clipPath>\
                <clipPath id='a'><rect width='10' height='10'/></clipPath>\
            </svg>",
        )
        .unwrap();
        let mut nodes = doc.root_element().children().filter(|n| n.is_element());
        let first = nodes.next().unwrap();
        let second = nodes.next().unwrap();

        let mut cache = ResultCache::new();
        let a = cache.get_or_compute(first, || 42);
        let b = cache.get_or_compute(second, || 7);

        assert_eq!(a, 42);
        assert_eq!(b, 42); // aliased to the first computation
        assert_eq!(cache.stats().analyses_performed, 2);
        assert_eq!(cache.stats().cache_hits, 1);
    }

    #[test]
    fn descendants_do_not_affect_the_key() {
        // Same tag/attrs/child count, different grandchildren: aliases
        // by design.
        let doc = roxmltree::Document::parse(
            "<svg>\
                <clipPath id='a'><g><rect/></g></clipPath>\
                <clipPath id='a'><g><circle/></g></clipPath>\
            </svg>",
        )
        .unwrap();
        let mut nodes = doc.root_element().children().filter(|n| n.is_element());
        let first = nodes.next().unwrap();
        let second = nodes.next().unwrap();

        assert_eq!(structural_hash(first), structural_hash(second));
    }

    #[test]
    fn clear_and_reset() {
        let doc = roxmltree::Document::parse("<svg><rect/></svg>").unwrap();
        let node = doc.root_element().first_element_child().unwrap();

        let mut cache = ResultCache::new();
        cache.get_or_compute(node, || 1);
        cache.clear();
        // Recomputes after clear, counters keep accumulating.
        let v = cache.get_or_compute(node, || 2);
        assert_eq!(v, 2);
        assert_eq!(cache.stats().analyses_performed, 2);
        assert_eq!(cache.stats().cache_hits, 0);

        cache.reset_statistics();
        assert_eq!(cache.stats().analyses_performed, 0);
    }
}
