//! Probe-versus-enrollment verification and accuracy evaluation.

mod evaluate;
mod knn;

pub use evaluate::{DecisionMode, ErrorRates, PerformanceEvaluator};
pub use knn::{KnnVerifier, Reference};

use crate::keystroke::{SessionId, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub fn symbol(self) -> char {
        match self {
            Decision::Accept => 'a',
            Decision::Reject => 'r',
        }
    }
}

/// Render a decision sweep as the compact accept/reject string the
/// reporting layer stores per (user, quiz), one column per k.
pub fn decision_symbols(decisions: &[Decision]) -> String {
    decisions.iter().map(|d| d.symbol()).collect()
}

/// One verification attempt: a probe scored against a claimed identity,
/// with the per-k decisions from the neighbor sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trial {
    /// The claimed identity.
    pub user: UserId,
    /// The session the probe vector came from.
    pub session: SessionId,
    /// Whether the probe truly belongs to the claimed identity.
    pub genuine: bool,
    /// Indexed by `k - knn_min`.
    pub decisions: Vec<Decision>,
}

impl Trial {
    pub fn symbols(&self) -> String {
        decision_symbols(&self.decisions)
    }
}
