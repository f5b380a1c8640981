//! Engine configuration: feature extraction, neighbor sweep, evaluation
//! policy, and job lifecycle knobs.

use crate::verify::DecisionMode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Feature extraction parameters
    pub features: FeaturesConfig,
    /// Neighbor sweep parameters
    pub knn: KnnConfig,
    /// Operating-point selection policy
    pub evaluation: EvaluationConfig,
    /// Job lifecycle parameters
    pub jobs: JobsConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesConfig {
    /// Named feature set to extract (one per locale)
    pub feature_set: String,
    /// Minimum occurrences before a feature is trusted without fallback
    pub min_key_frequency: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnConfig {
    /// Smallest neighbor count in the sweep (>= 1)
    pub knn_min: u32,
    /// Largest neighbor count in the sweep
    pub knn_max: u32,
    /// References sharing fewer defined features with the probe are skipped
    pub min_comparable_features: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    pub decision_mode: DecisionMode,
    /// FRR tolerance band used by the convenience mode
    pub convenience_band: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Percent of expected data required before a job may run (0-100)
    pub percent_data_needed: f64,
    /// Global cap on concurrently running jobs
    pub max_concurrent_jobs: u32,
    /// How long a job stays active and monitors new data
    pub weeks_keep_active: u32,
    /// Keystrokes a session needs to count as complete for data readiness
    pub min_keystrokes_per_session: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            features: FeaturesConfig::default(),
            knn: KnnConfig::default(),
            evaluation: EvaluationConfig::default(),
            jobs: JobsConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            feature_set: crate::features::FEATURE_SET_EN_US.to_string(),
            min_key_frequency: 5,
        }
    }
}

impl Default for KnnConfig {
    fn default() -> Self {
        Self {
            knn_min: 1,
            knn_max: 7,
            min_comparable_features: 3,
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            decision_mode: DecisionMode::Neutral,
            convenience_band: 0.02,
        }
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            percent_data_needed: 50.0,
            max_concurrent_jobs: 2,
            weeks_keep_active: 4,
            min_keystrokes_per_session: 100,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl EngineConfig {
    /// Load from JSON file if present; otherwise return default
    pub fn load(path: &std::path::Path) -> Self {
        if path.exists() {
            if let Ok(data) = std::fs::read_to_string(path) {
                if let Ok(c) = serde_json::from_str::<EngineConfig>(&data) {
                    return c;
                }
            }
        }
        Self::default()
    }

    /// Expiry deadline for a job created now.
    pub fn active_until(&self, now: chrono::DateTime<chrono::Utc>) -> chrono::DateTime<chrono::Utc> {
        now + chrono::Duration::weeks(self.jobs.weeks_keep_active as i64)
    }
}
