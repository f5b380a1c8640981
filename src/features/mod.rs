//! Hierarchical timing features: catalog, extraction with statistical
//! fallback, and the vectors handed to the verification layer.

mod catalog;
mod english;
mod extractor;

pub use catalog::{FeatureCatalog, FeatureDefinition, FeatureKind, Measure};
pub use english::{english_catalog, FEATURE_SET_EN_US};
pub use extractor::FeatureExtractor;

use crate::keystroke::{SessionId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FeatureId(pub u32);

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A computed feature value. `Undefined` means no ancestor in the fallback
/// chain had enough occurrences in the session; it is preserved through
/// downstream comparison, never coerced to zero. Serializes as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum FeatureValue {
    Defined(f64),
    Undefined,
}

impl FeatureValue {
    pub fn defined(self) -> Option<f64> {
        match self {
            FeatureValue::Defined(v) => Some(v),
            FeatureValue::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, FeatureValue::Defined(_))
    }
}

impl From<Option<f64>> for FeatureValue {
    fn from(v: Option<f64>) -> Self {
        match v {
            Some(v) => FeatureValue::Defined(v),
            None => FeatureValue::Undefined,
        }
    }
}

impl From<FeatureValue> for Option<f64> {
    fn from(v: FeatureValue) -> Self {
        v.defined()
    }
}

/// One vector per (user, session); positions follow the feature set's order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureVector {
    pub ids: Vec<FeatureId>,
    pub values: Vec<FeatureValue>,
}

impl FeatureVector {
    pub fn get(&self, id: FeatureId) -> Option<FeatureValue> {
        self.ids
            .iter()
            .position(|&i| i == id)
            .map(|p| self.values[p])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_defined()).count()
    }
}

/// A feature vector bound to the session it was extracted from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    pub user: UserId,
    pub session: SessionId,
    pub vector: FeatureVector,
}
