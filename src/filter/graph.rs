// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Filter primitive dependency resolution.
//!
//! Execution order is resolved with Kahn's algorithm over the
//! `result` → `in` reference edges. A cycle is an ordinary, recoverable
//! outcome reported through `Result` — the caller degrades the chain to
//! rasterization instead of unwinding.

use std::collections::{HashMap, VecDeque};

use super::Primitive;
use crate::Error;

/// Topologically sorts primitives by their declared references.
///
/// `raw_refs` holds, per primitive, the raw `in`/`in2` result names as
/// written in the document (reserved tokens excluded). References to
/// names no primitive declares are skipped here; the chain parser has
/// already recorded them as unresolved.
///
/// Ties are broken by document order, so a chain without forward
/// references sorts to exactly the document order.
pub(crate) fn sort(primitives: &[Primitive], raw_refs: &[Vec<String>]) -> Result<Vec<usize>, Error> {
    let n = primitives.len();

    let mut producers = HashMap::new();
    for (i, p) in primitives.iter().enumerate() {
        // On duplicate result names the last producer wins, as in SVG.
        producers.insert(p.result.as_str(), i);
    }

    // Edge producer -> consumer.
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut in_degree = vec![0usize; n];
    for (consumer, refs) in raw_refs.iter().enumerate() {
        for name in refs {
            if let Some(&producer) = producers.get(name.as_str()) {
                if producer != consumer {
                    dependents[producer].push(consumer);
                    in_degree[consumer] += 1;
                }
            }
        }
    }

    let mut queue: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(n);

    while let Some(i) = queue.pop_front() {
        order.push(i);
        for &dep in &dependents[i] {
            in_degree[dep] -= 1;
            if in_degree[dep] == 0 {
                queue.push_back(dep);
            }
        }
    }

    if order.len() != n {
        return Err(Error::DependencyCycle);
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use crate::filter::Chain;

    fn parse_chain(filter: &str) -> Chain {
        let text = format!("<svg>{}</svg>", filter);
        let doc = roxmltree::Document::parse(&text).unwrap();
        let filter = doc.root_element().first_element_child().unwrap();
        Chain::parse(filter)
    }

    #[test]
    fn document_order_without_references() {
        let chain = parse_chain(
            "<filter id='f'>\
                <feFlood result='f1'/>\
                <feGaussianBlur stdDeviation='1'/>\
                <feOffset dx='1' dy='1'/>\
            </filter>",
        );

        assert_eq!(chain.order, vec![0, 1, 2]);
    }

    #[test]
    fn forward_reference_is_still_sortable() {
        // `in='late'` points forward; the graph can be ordered, the
        // unresolved-at-parse-time reference was already flagged.
        let chain = parse_chain(
            "<filter id='f'>\
                <feGaussianBlur in='late' stdDeviation='1' result='early'/>\
                <feFlood result='late'/>\
            </filter>",
        );

        assert_eq!(chain.order, vec![1, 0]);
        assert!(chain.requires_rasterization);
    }

    #[test]
    fn self_reference_is_not_a_cycle() {
        // `in` referencing its own `result` resolves to the previous
        // primitive in SVG; the graph must not see it as a loop.
        let chain = parse_chain(
            "<filter id='f'>\
                <feFlood result='a'/>\
                <feGaussianBlur in='b' result='b' stdDeviation='1'/>\
            </filter>",
        );

        assert_eq!(chain.order.len(), 2);
    }

    #[test]
    fn two_cycle_detected() {
        let chain = parse_chain(
            "<filter id='f'>\
                <feOffset in='b' result='a' dx='1' dy='1'/>\
                <feGaussianBlur in='a' result='b' stdDeviation='1'/>\
            </filter>",
        );

        assert!(chain
            .errors
            .iter()
            .any(|e| matches!(e, crate::Error::DependencyCycle)));
        assert!(chain.requires_rasterization);
        // Fallback order is document order.
        assert_eq!(chain.order, vec![0, 1]);
    }
}
