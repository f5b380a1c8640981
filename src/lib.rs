//! bioauth — Continuous keystroke-dynamics verification engine.
//!
//! Turns raw press/release event streams into statistically robust feature
//! vectors, verifies probes against enrolled templates with a k-nearest-
//! neighbor sweep, and summarizes accuracy as FRR/FAR curves with a chosen
//! operating point, all orchestrated by a per-course job lifecycle.
//!
//! Modular structure:
//! - [`keystroke`] — raw event and id types
//! - [`keymap`] — en-US key table and key-group parsing
//! - [`stats`] — distance and combinatorics primitives
//! - [`features`] — hierarchical feature catalog and extraction with fallback
//! - [`verify`] — k-NN verification and FRR/FAR evaluation
//! - [`jobs`] — per-course validation job lifecycle and run slots
//! - [`synth`] — synthetic typist generation for demos and tests
//! - [`logging`] — structured JSON logging

pub mod config;
pub mod errors;
pub mod features;
pub mod jobs;
pub mod keymap;
pub mod keystroke;
pub mod logging;
pub mod stats;
pub mod synth;
pub mod verify;

pub use config::EngineConfig;
pub use errors::BioauthError;
pub use features::{english_catalog, FeatureCatalog, FeatureExtractor, FeatureVector, Sample};
pub use jobs::{CourseSnapshot, Job, JobState, RunSlots, ValidationReport};
pub use keystroke::{CourseData, KeystrokeEvent};
pub use logging::StructuredLogger;
pub use verify::{Decision, KnnVerifier, PerformanceEvaluator};
