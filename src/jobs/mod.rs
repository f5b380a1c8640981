//! Per-course validation job lifecycle. The state machine is driven by an
//! external scheduler calling [`Job::advance`] on a tick; the machine itself
//! carries no timers or I/O. Run-slot accounting caps concurrent runs
//! globally and guarantees one running job per course.

mod runner;

pub use runner::{run_validation, ValidationReport};

use crate::config::EngineConfig;
use crate::errors::BioauthError;
use crate::features::FeatureCatalog;
use crate::keystroke::{CourseData, CourseId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Not enabled for the course (or disabled/expired).
    Void,
    /// Enabled, waiting for any enrollment data to appear.
    Waiting,
    /// Enrollment exists; watching for enough submissions.
    Monitor,
    /// Enough data; queued for a run slot.
    Ready,
    /// Extraction, verification, and evaluation in progress.
    Running,
    /// Curves computed; results served while `Job::available` is set.
    Complete,
}

/// Course-level data availability, computed by the hosting collaborator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CourseSnapshot {
    pub enrolled_users: u32,
    /// 0-100; 100 means every expected session meets the keystroke minimum.
    pub percent_data_ready: f64,
}

impl CourseSnapshot {
    /// Readiness of an in-memory course snapshot: the share of expected
    /// (user, session) slots whose keystroke count meets the minimum.
    pub fn from_course(
        data: &CourseData,
        expected_sessions_per_user: u32,
        min_keystrokes_per_session: u32,
    ) -> Self {
        let enrolled_users = data.users.len() as u32;
        let expected = (enrolled_users * expected_sessions_per_user) as f64;
        if expected == 0.0 {
            return Self {
                enrolled_users,
                percent_data_ready: 0.0,
            };
        }
        let complete = data
            .users
            .iter()
            .flat_map(|u| &u.sessions)
            .filter(|s| s.keystroke_count() as u32 >= min_keystrokes_per_session)
            .count() as f64;
        Self {
            enrolled_users,
            percent_data_ready: 100.0 * complete / expected,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub course: CourseId,
    pub state: JobState,
    /// Percent of expected data required before this job may run (0-100).
    pub percent_data_needed: f64,
    pub percent_data_ready: f64,
    pub percent_complete: f64,
    pub active_until: DateTime<Utc>,
    /// Whether a completed job's results are being actively served.
    pub available: bool,
    pub result: Option<ValidationReport>,
}

impl Job {
    pub fn new(course: CourseId, percent_data_needed: f64, active_until: DateTime<Utc>) -> Self {
        Self {
            course,
            state: JobState::Void,
            percent_data_needed,
            percent_data_ready: 0.0,
            percent_complete: 0.0,
            active_until,
            available: false,
            result: None,
        }
    }

    pub fn from_config(course: CourseId, config: &EngineConfig, now: DateTime<Utc>) -> Self {
        Self::new(
            course,
            config.jobs.percent_data_needed,
            config.active_until(now),
        )
    }

    /// Course enablement: `Void -> Waiting`.
    pub fn enable(&mut self) {
        if self.state == JobState::Void {
            self.state = JobState::Waiting;
            info!(course = self.course.0, "job enabled");
        }
    }

    /// Course disablement or cancellation: any state -> `Void`, discarding
    /// any partial or published results.
    pub fn cancel(&mut self) {
        info!(course = self.course.0, state = ?self.state, "job cancelled");
        self.discard();
    }

    fn discard(&mut self) {
        self.state = JobState::Void;
        self.available = false;
        self.result = None;
        self.percent_complete = 0.0;
    }

    /// Apply at most one lifecycle transition for this tick. Returns the
    /// run guard when the job just entered `Running`; the caller must hold
    /// it across [`Job::execute`] and drop it afterwards.
    pub fn advance(
        &mut self,
        snapshot: &CourseSnapshot,
        slots: &RunSlots,
        now: DateTime<Utc>,
    ) -> Option<RunGuard> {
        self.percent_data_ready = snapshot.percent_data_ready;

        // Expiry never interrupts a run in progress.
        if self.state != JobState::Running && self.state != JobState::Void && now > self.active_until
        {
            info!(course = self.course.0, "job expired");
            self.discard();
            return None;
        }

        match self.state {
            JobState::Void | JobState::Complete | JobState::Running => {}
            JobState::Waiting => {
                if snapshot.enrolled_users > 0 {
                    self.state = JobState::Monitor;
                }
            }
            JobState::Monitor => {
                if snapshot.percent_data_ready >= self.percent_data_needed {
                    self.state = JobState::Ready;
                }
            }
            JobState::Ready => {
                if let Some(guard) = slots.acquire(self.course) {
                    self.state = JobState::Running;
                    self.percent_complete = 0.0;
                    info!(course = self.course.0, "job running");
                    return Some(guard);
                }
            }
        }
        None
    }

    /// Run extraction, verification, and evaluation for the course while
    /// `Running`. Success publishes the report and completes the job; any
    /// error reverts to `Ready` so the next tick can retry.
    pub fn execute(
        &mut self,
        data: &CourseData,
        catalog: &FeatureCatalog,
        config: &EngineConfig,
    ) -> Result<(), BioauthError> {
        match run_validation(data, catalog, config) {
            Ok(report) => {
                info!(
                    course = self.course.0,
                    chosen_k = report.chosen_k,
                    eer = report.eer,
                    "job complete"
                );
                self.result = Some(report);
                self.state = JobState::Complete;
                self.available = true;
                self.percent_complete = 100.0;
                Ok(())
            }
            Err(e) => {
                warn!(course = self.course.0, error = %e, "validation run failed; job requeued");
                self.state = JobState::Ready;
                self.percent_complete = 0.0;
                Err(e)
            }
        }
    }
}

/// Shared run-slot accounting: a global cap plus per-course exclusivity.
/// The engine spawns no threads; callers may execute guarded jobs on
/// whatever threads they own.
#[derive(Clone)]
pub struct RunSlots {
    inner: Arc<Mutex<HashSet<CourseId>>>,
    max_concurrent: usize,
}

impl RunSlots {
    pub fn new(max_concurrent: u32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashSet::new())),
            max_concurrent: max_concurrent as usize,
        }
    }

    /// Claim a slot for the course, or None when the global cap is reached
    /// or the course already has a running job.
    pub fn acquire(&self, course: CourseId) -> Option<RunGuard> {
        let mut running = self.inner.lock().expect("lock");
        if running.len() >= self.max_concurrent || running.contains(&course) {
            return None;
        }
        running.insert(course);
        Some(RunGuard {
            slots: Arc::clone(&self.inner),
            course,
        })
    }

    pub fn running(&self) -> usize {
        self.inner.lock().expect("lock").len()
    }
}

/// Releases its slot on drop.
pub struct RunGuard {
    slots: Arc<Mutex<HashSet<CourseId>>>,
    course: CourseId,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if let Ok(mut running) = self.slots.lock() {
            running.remove(&self.course);
        }
    }
}
