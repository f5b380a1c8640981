//! FRR/FAR curves over the neighbor sweep and operating-point selection.

use super::{Decision, Trial};
use crate::config::EvaluationConfig;
use crate::errors::BioauthError;
use serde::{Deserialize, Serialize};

/// Bias applied when collapsing the sweep to a single operating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionMode {
    /// Closest to the equal-error point.
    Neutral,
    /// Minimize false rejects, within a tolerance band of the best FRR.
    Convenience,
    /// Minimize false accepts.
    Secure,
}

/// Error-rate curves indexed by `k - knn_min`, plus the chosen operating
/// point. `eer` is the mean of FRR and FAR at the neutral point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRates {
    pub frr: Vec<f64>,
    pub far: Vec<f64>,
    pub chosen_k: u32,
    pub eer: f64,
}

pub struct PerformanceEvaluator {
    knn_min: u32,
    mode: DecisionMode,
    convenience_band: f64,
}

impl PerformanceEvaluator {
    pub fn new(knn_min: u32, config: &EvaluationConfig) -> Self {
        Self {
            knn_min,
            mode: config.decision_mode,
            convenience_band: config.convenience_band,
        }
    }

    /// Aggregate per-trial decisions into FRR(k)/FAR(k) and pick k.
    pub fn evaluate(&self, trials: &[Trial]) -> Result<ErrorRates, BioauthError> {
        let genuine: Vec<&Trial> = trials.iter().filter(|t| t.genuine).collect();
        let impostor: Vec<&Trial> = trials.iter().filter(|t| !t.genuine).collect();
        if genuine.is_empty() || impostor.is_empty() {
            return Err(BioauthError::EmptyTrialSet {
                genuine: genuine.len(),
                impostor: impostor.len(),
            });
        }

        // Every trial carries one decision per swept k; an empty sweep has
        // no rates to aggregate.
        let sweep_len = genuine[0].decisions.len();
        if sweep_len == 0 {
            return Err(BioauthError::EmptyTrialSet {
                genuine: genuine.len(),
                impostor: impostor.len(),
            });
        }
        let mut frr = Vec::with_capacity(sweep_len);
        let mut far = Vec::with_capacity(sweep_len);
        for i in 0..sweep_len {
            let rejected = genuine
                .iter()
                .filter(|t| t.decisions[i] == Decision::Reject)
                .count();
            let accepted = impostor
                .iter()
                .filter(|t| t.decisions[i] == Decision::Accept)
                .count();
            frr.push(rejected as f64 / genuine.len() as f64);
            far.push(accepted as f64 / impostor.len() as f64);
        }

        let neutral = neutral_index(&frr, &far);
        let chosen = match self.mode {
            DecisionMode::Neutral => neutral,
            DecisionMode::Convenience => {
                let best = frr.iter().cloned().fold(f64::INFINITY, f64::min);
                frr.iter()
                    .position(|&r| r <= best + self.convenience_band)
                    .unwrap_or(neutral)
            }
            DecisionMode::Secure => {
                let best = far.iter().cloned().fold(f64::INFINITY, f64::min);
                far.iter().position(|&r| r <= best).unwrap_or(neutral)
            }
        };

        Ok(ErrorRates {
            eer: (frr[neutral] + far[neutral]) / 2.0,
            chosen_k: self.knn_min + chosen as u32,
            frr,
            far,
        })
    }
}

/// Index minimizing |FRR - FAR|; ties resolve to the smaller k.
fn neutral_index(frr: &[f64], far: &[f64]) -> usize {
    let mut best = 0;
    let mut best_gap = f64::INFINITY;
    for (i, (r, a)) in frr.iter().zip(far).enumerate() {
        let gap = (r - a).abs();
        if gap < best_gap {
            best_gap = gap;
            best = i;
        }
    }
    best
}
