// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Filter chain complexity scoring.
//!
//! The score combines a per-primitive base cost with fixed per-kind
//! weights. The exact weights are part of the output contract: strategy
//! selection downstream compares them against thresholds, so changing
//! them changes which documents rasterize.

use crate::filter::{Chain, ConvolveMatrixData, Kind};
use crate::FuzzyZero;

/// Per-primitive base cost.
const BASE_COST: f64 = 0.5;

/// Scores the structural complexity of a filter chain.
///
/// `0.5 × primitive_count + Σ type_weight`, where only the
/// pixel-sampling kinds carry a weight.
pub fn score_chain(chain: &Chain) -> f64 {
    let base = BASE_COST * chain.primitives.len() as f64;
    let weights: f64 = chain.primitives.iter().map(|p| type_weight(&p.kind)).sum();
    base + weights
}

fn type_weight(kind: &Kind) -> f64 {
    match kind {
        Kind::Morphology(_) => 1.8,
        Kind::ConvolveMatrix(_) => 2.0,
        Kind::Lighting(_) => 2.2,
        Kind::Turbulence(_) => 3.0,
        _ => 0.0,
    }
}

/// Checks whether a primitive kind requires pixel-level sampling that
/// DrawingML cannot express.
///
/// This is independent of the numeric score: a chain can be cheap and
/// still impossible to express natively.
pub fn is_intrinsically_raster(kind: &Kind) -> bool {
    matches!(
        kind,
        Kind::ConvolveMatrix(_)
            | Kind::Turbulence(_)
            | Kind::DisplacementMap(_)
            | Kind::Lighting(_)
            | Kind::Tile(_)
            | Kind::Morphology(_)
    )
}

/// How a convolution kernel can be approximated.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum KernelClass {
    /// An edge-detection kernel (entries sum to zero, small order).
    ///
    /// Approximable in DrawingML with an outline hack.
    EdgeDetect,

    /// Everything else — smoothing/sharpening kernels and anything
    /// larger than 3×3 need real pixel sampling.
    Raster,
}

/// Classifies a convolution kernel.
///
/// A Sobel-style kernel (≤3×3, entries summing to zero) reduces to an
/// outline approximation; a 5×5 uniform blur does not.
pub fn classify_kernel(matrix: &ConvolveMatrixData) -> KernelClass {
    if matrix.columns() > 3 || matrix.rows() > 3 {
        return KernelClass::Raster;
    }

    let sum: f64 = matrix.data().iter().sum();
    // Same precision guard as the kernel-sum divisor default.
    let sum = (sum * 1_000_000.0).round() / 1_000_000.0;

    if sum.is_fuzzy_zero() {
        KernelClass::EdgeDetect
    } else {
        KernelClass::Raster
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Chain;

    fn parse_chain(filter: &str) -> Chain {
        let text = format!("<svg>{}</svg>", filter);
        let doc = roxmltree::Document::parse(&text).unwrap();
        let filter = doc.root_element().first_element_child().unwrap();
        Chain::parse(filter)
    }

    #[test]
    fn base_term_only() {
        let chain = parse_chain(
            "<filter id='f'>\
                <feOffset dx='3' dy='3'/>\
                <feGaussianBlur stdDeviation='2'/>\
                <feComposite in2='SourceGraphic'/>\
            </filter>",
        );

        assert_eq!(score_chain(&chain), 1.5);
    }

    #[test]
    fn weighted_kinds() {
        let chain = parse_chain(
            "<filter id='f'>\
                <feTurbulence baseFrequency='0.05'/>\
            </filter>",
        );
        assert_eq!(score_chain(&chain), 3.5);

        let chain = parse_chain(
            "<filter id='f'>\
                <feMorphology operator='dilate' radius='2'/>\
            </filter>",
        );
        assert_eq!(score_chain(&chain), 2.3);
    }

    #[test]
    fn intrinsic_rasterization_is_a_flag_not_a_score() {
        let chain = parse_chain(
            "<filter id='f'>\
                <feDisplacementMap in2='SourceGraphic' scale='5'/>\
            </filter>",
        );

        // Displacement has no weight, but still can't be expressed.
        assert_eq!(score_chain(&chain), 0.5);
        assert!(is_intrinsically_raster(&chain.primitives[0].kind));
    }

    #[test]
    fn sobel_kernel_is_edge_detect() {
        let m = ConvolveMatrixData::new(
            3,
            3,
            vec![-1.0, 0.0, 1.0, -2.0, 0.0, 2.0, -1.0, 0.0, 1.0],
        )
        .unwrap();
        assert_eq!(classify_kernel(&m), KernelClass::EdgeDetect);
    }

    #[test]
    fn uniform_blur_kernel_is_raster() {
        let m = ConvolveMatrixData::new(5, 5, vec![1.0; 25]).unwrap();
        assert_eq!(classify_kernel(&m), KernelClass::Raster);
    }
}
