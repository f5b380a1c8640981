//! Crate-level error type. An `Undefined` feature value is a sentinel, not
//! an error; everything that can actually fail funnels through
//! [`BioauthError`] and is propagated to the caller, never swallowed.

use crate::features::FeatureId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BioauthError {
    /// Distance over vectors of unequal length. Cannot happen when both
    /// vectors come from the same feature set; treated as a programming
    /// error and surfaced immediately.
    #[error("vector length mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("unknown feature id {0}")]
    UnknownFeature(FeatureId),

    #[error("unknown feature set `{0}`")]
    UnknownFeatureSet(String),

    /// Catalog failed its construction-time integrity check.
    #[error("invalid feature catalog: {0}")]
    InvalidCatalog(String),

    /// Probe and reference share too few defined features. Recoverable:
    /// the verifier drops that reference from the neighbor pool.
    #[error("probe and reference share {shared} defined features, {required} required")]
    InsufficientOverlap { shared: usize, required: usize },

    /// Every reference was dropped for insufficient overlap.
    #[error("no reference sample shares enough defined features with the probe")]
    NoComparableReferences,

    /// Error rates are undefined without both trial classes.
    #[error("cannot evaluate error rates over {genuine} genuine and {impostor} impostor trials")]
    EmptyTrialSet { genuine: usize, impostor: usize },
}
