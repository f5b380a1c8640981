//! One validation run for a course: extract every (user, session) vector,
//! build leave-one-out genuine and impostor trials, and aggregate them into
//! FRR/FAR curves with a chosen operating point.

use crate::config::EngineConfig;
use crate::errors::BioauthError;
use crate::features::{FeatureCatalog, FeatureExtractor, Sample};
use crate::keystroke::{CourseData, UserId};
use crate::verify::{ErrorRates, KnnVerifier, PerformanceEvaluator, Reference, Trial};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Everything a reporting collaborator needs: curves, the operating point,
/// and the per-trial decision sweeps keyed by claimed identity and session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub frr: Vec<f64>,
    pub far: Vec<f64>,
    pub chosen_k: u32,
    pub eer: f64,
    pub trials: Vec<Trial>,
    /// Probes dropped because no reference shared enough defined features.
    pub skipped_probes: u32,
}

pub fn run_validation(
    data: &CourseData,
    catalog: &FeatureCatalog,
    config: &EngineConfig,
) -> Result<ValidationReport, BioauthError> {
    let extractor = FeatureExtractor::new(catalog, config.features.min_key_frequency);

    let mut samples: Vec<Sample> = Vec::with_capacity(data.total_sessions());
    for user in &data.users {
        for session in &user.sessions {
            samples.push(extractor.extract_sample(
                &config.features.feature_set,
                user.user,
                session,
            )?);
        }
    }
    debug!(
        course = data.course.0,
        vectors = samples.len(),
        "feature extraction finished"
    );

    let verifier = KnnVerifier::new(config.knn.clone());
    let users: Vec<UserId> = data.users.iter().map(|u| u.user).collect();
    let mut trials: Vec<Trial> = Vec::new();
    let mut skipped_probes = 0u32;

    // Each sample probes every enrolled identity: its own (genuine trial,
    // remaining own samples enrolled) and everyone else's (impostor trial).
    for (probe_index, probe) in samples.iter().enumerate() {
        for &claimed in &users {
            let references: Vec<Reference<'_>> = samples
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != probe_index)
                .map(|(_, s)| Reference {
                    sample: s,
                    genuine: s.user == claimed,
                })
                .collect();
            // An identity with no enrolled samples cannot be claimed.
            if !references.iter().any(|r| r.genuine) {
                continue;
            }
            match verifier.verify(probe, &references) {
                Ok(decisions) => trials.push(Trial {
                    user: claimed,
                    session: probe.session,
                    genuine: probe.user == claimed,
                    decisions,
                }),
                Err(BioauthError::NoComparableReferences) => {
                    skipped_probes += 1;
                    warn!(
                        course = data.course.0,
                        user = probe.user.0,
                        "probe shares no defined features with any reference; trial skipped"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    let evaluator = PerformanceEvaluator::new(config.knn.knn_min, &config.evaluation);
    let ErrorRates {
        frr,
        far,
        chosen_k,
        eer,
    } = evaluator.evaluate(&trials)?;

    Ok(ValidationReport {
        frr,
        far,
        chosen_k,
        eer,
        trials,
        skipped_probes,
    })
}
