// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use roxmltree::Node;

/// What an injected clipping policy decided.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum PolicyVerdict {
    /// Keep the structurally selected strategy.
    Keep,
    /// Degrade by one step along the strategy chain.
    Degrade,
    /// Skip clipping for this element entirely.
    SkipClipping,
}

/// An optional clipping policy collaborator.
///
/// When present, its verdict overrides the structural strategy table,
/// but only towards a safer tier: a policy can veto native clipping,
/// it can never force an upgrade the structural analysis disqualified.
pub trait ClipPolicy: std::fmt::Debug {
    /// Decides what to do with a structurally selected strategy.
    fn decide(&self, strategy: crate::clip::ClipStrategy, shape_count: usize) -> PolicyVerdict;
}

/// Conversion context supplied by the caller.
///
/// Everything the engines need from the surrounding conversion:
/// the document root for `url(#id)` lookups, a monotonic shape id
/// allocator and an optional clipping policy.
///
/// Test doubles must implement the whole trait; there is no partial,
/// duck-typed variant.
pub trait Context<'a, 'input: 'a> {
    /// Returns the root of the whole parsed document.
    fn document_root(&self) -> Node<'a, 'input>;

    /// Allocates the next document-wide shape id.
    fn next_shape_id(&mut self) -> u32;

    /// Returns the injected clipping policy, if any.
    fn policy(&self) -> Option<&dyn ClipPolicy> {
        None
    }
}

/// A ready-made [`Context`] over a parsed document.
#[derive(Debug)]
pub struct BasicContext<'a, 'input> {
    root: Node<'a, 'input>,
    next_id: u32,
    policy: Option<Box<dyn ClipPolicy>>,
}

impl<'a, 'input: 'a> BasicContext<'a, 'input> {
    /// Creates a context rooted at `root` with shape ids starting at 1.
    pub fn new(root: Node<'a, 'input>) -> Self {
        BasicContext {
            root,
            next_id: 1,
            policy: None,
        }
    }

    /// Attaches a clipping policy.
    pub fn with_policy(mut self, policy: Box<dyn ClipPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }
}

impl<'a, 'input: 'a> Context<'a, 'input> for BasicContext<'a, 'input> {
    fn document_root(&self) -> Node<'a, 'input> {
        self.root
    }

    fn next_shape_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn policy(&self) -> Option<&dyn ClipPolicy> {
        self.policy.as_deref()
    }
}

/// Conversion thresholds and weights.
///
/// An explicit value passed to both engines instead of a global
/// registry. `Default` matches the reference behavior; tweak fields
/// to tune strategy selection.
#[derive(Clone, Copy, Debug)]
pub struct Registry {
    /// Output DPI used for EMU conversions.
    pub dpi: f64,

    /// Scores at or above this always rasterize, regardless of the
    /// per-effect-type rules.
    pub rasterization_threshold: f64,

    /// Upper score bound for native DrawingML effects.
    pub native_threshold: f64,

    /// Upper score bound for approximated "hack" effects.
    pub hack_threshold: f64,
}

impl Default for Registry {
    fn default() -> Self {
        Registry {
            dpi: 96.0,
            rasterization_threshold: 3.0,
            native_threshold: 2.0,
            hack_threshold: 3.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_ids_are_monotonic() {
        let doc = roxmltree::Document::parse("<svg/>").unwrap();
        let mut ctx = BasicContext::new(doc.root_element());
        assert_eq!(ctx.next_shape_id(), 1);
        assert_eq!(ctx.next_shape_id(), 2);
        assert_eq!(ctx.next_shape_id(), 3);
    }
}
