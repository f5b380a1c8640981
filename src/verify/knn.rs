//! Distance-ranked k-nearest-neighbor verification over a neighbor-count
//! sweep. Identity-agnostic: the caller labels each reference with its
//! membership in the claimed identity.

use super::Decision;
use crate::config::KnnConfig;
use crate::errors::BioauthError;
use crate::features::{FeatureVector, Sample};
use crate::stats;
use std::cmp::Ordering;

/// Enrollment template labeled relative to the claimed identity.
#[derive(Debug, Clone, Copy)]
pub struct Reference<'a> {
    pub sample: &'a Sample,
    pub genuine: bool,
}

pub struct KnnVerifier {
    config: KnnConfig,
}

impl KnnVerifier {
    pub fn new(config: KnnConfig) -> Self {
        Self { config }
    }

    /// Accept/reject decisions for each k in `[knn_min, knn_max]`, indexed
    /// by `k - knn_min`.
    ///
    /// References sharing fewer than `min_comparable_features` defined
    /// features with the probe are dropped from the neighbor pool. Ranking
    /// uses a stable sort, so equidistant references keep their insertion
    /// order and repeated runs over identical input are bit-identical.
    pub fn verify(
        &self,
        probe: &Sample,
        references: &[Reference<'_>],
    ) -> Result<Vec<Decision>, BioauthError> {
        let mut ranked: Vec<(f64, bool)> = Vec::with_capacity(references.len());
        for reference in references {
            match comparable_distance(
                &probe.vector,
                &reference.sample.vector,
                self.config.min_comparable_features,
            ) {
                Ok(distance) => ranked.push((distance, reference.genuine)),
                Err(BioauthError::InsufficientOverlap { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
        if ranked.is_empty() {
            return Err(BioauthError::NoComparableReferences);
        }
        ranked.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        let sweep = self.config.knn_min..=self.config.knn_max;
        let mut decisions = Vec::with_capacity(sweep.clone().count());
        for k in sweep {
            // cap at the surviving pool; a sweep never asks for zero neighbors
            let k = (k as usize).clamp(1, ranked.len());
            let genuine_votes = ranked[..k].iter().filter(|(_, genuine)| *genuine).count();
            // an exact tie rejects
            let decision = if genuine_votes * 2 > k {
                Decision::Accept
            } else {
                Decision::Reject
            };
            decisions.push(decision);
        }
        Ok(decisions)
    }
}

/// Euclidean distance over the pairwise-defined feature subset; entries
/// where either side is undefined are excluded from the comparison.
fn comparable_distance(
    probe: &FeatureVector,
    reference: &FeatureVector,
    min_comparable: u32,
) -> Result<f64, BioauthError> {
    if probe.len() != reference.len() {
        return Err(BioauthError::DimensionMismatch {
            left: probe.len(),
            right: reference.len(),
        });
    }
    let mut xs = Vec::with_capacity(probe.len());
    let mut ys = Vec::with_capacity(probe.len());
    for (a, b) in probe.values.iter().zip(&reference.values) {
        if let (Some(x), Some(y)) = (a.defined(), b.defined()) {
            xs.push(x);
            ys.push(y);
        }
    }
    if (xs.len() as u32) < min_comparable {
        return Err(BioauthError::InsufficientOverlap {
            shared: xs.len(),
            required: min_comparable as usize,
        });
    }
    stats::euclidean_distance(&xs, &ys)
}
