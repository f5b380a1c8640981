//! bioauth demo driver: synthesizes a course of typists, then plays the
//! external scheduler's role, ticking the validation job lifecycle until the
//! error curves are ready. The library itself never schedules anything.

use bioauth::{
    config::EngineConfig,
    features::english_catalog,
    jobs::{CourseSnapshot, Job, JobState, RunSlots},
    keystroke::CourseId,
    logging::StructuredLogger,
    synth,
    verify::decision_symbols,
};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tracing::info;

const DEMO_USERS: u32 = 4;
const DEMO_SESSIONS_PER_USER: u32 = 4;
const DEMO_KEYSTROKES_PER_SESSION: usize = 250;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config_path = std::env::var("BIOAUTH_CONFIG_PATH")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::path::PathBuf::from("config.json"));
    let config = EngineConfig::load(&config_path);

    StructuredLogger::init(config.log.json, &config.log.level);

    let seed = std::env::var("BIOAUTH_DEMO_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(7);
    info!(seed, users = DEMO_USERS, "bioauth demo starting");

    let catalog = english_catalog()?;
    let mut rng = StdRng::seed_from_u64(seed);
    let course = CourseId(1);
    let data = synth::generate_course(
        &mut rng,
        course,
        DEMO_USERS,
        DEMO_SESSIONS_PER_USER,
        DEMO_KEYSTROKES_PER_SESSION,
    );
    let snapshot = CourseSnapshot::from_course(
        &data,
        DEMO_SESSIONS_PER_USER,
        config.jobs.min_keystrokes_per_session,
    );

    let slots = RunSlots::new(config.jobs.max_concurrent_jobs);
    let mut job = Job::from_config(course, &config, Utc::now());
    job.enable();

    static STOP: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);
    let _ = ctrlc::set_handler(|| {
        STOP.store(true, std::sync::atomic::Ordering::Relaxed);
    });

    let mut failed_attempts = 0u32;
    while !STOP.load(std::sync::atomic::Ordering::Relaxed) && job.state != JobState::Complete {
        if let Some(_guard) = job.advance(&snapshot, &slots, Utc::now()) {
            if job.execute(&data, &catalog, &config).is_err() {
                failed_attempts += 1;
                if failed_attempts >= 3 {
                    tracing::error!(failed_attempts, "giving up on the demo job");
                    break;
                }
            }
        }
        info!(
            state = ?job.state,
            data_ready = job.percent_data_ready,
            "tick"
        );
        std::thread::sleep(Duration::from_millis(250));
    }

    if let Some(report) = &job.result {
        info!(
            chosen_k = report.chosen_k,
            eer = report.eer,
            trials = report.trials.len(),
            skipped = report.skipped_probes,
            "validation ready"
        );
        for (i, frr) in report.frr.iter().enumerate() {
            info!(k = i as u32 + config.knn.knn_min, frr, far = report.far[i], "operating point");
        }
        // First few per-trial sweeps, the way the report tables render them.
        for trial in report.trials.iter().take(5) {
            info!(
                user = trial.user.0,
                genuine = trial.genuine,
                decisions = %decision_symbols(&trial.decisions),
                "trial"
            );
        }
    }

    info!("bioauth demo stopping");
    Ok(())
}
