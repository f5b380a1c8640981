//! Raw keystroke events and the id types shared across the engine.
//! Event streams are captured by an external logging client; the engine
//! only ever sees complete, in-memory sequences.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a physical key, as assigned by the key table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KeyId(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CourseId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// One key press/release pair, timestamps in milliseconds.
/// Immutable once recorded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeystrokeEvent {
    pub key: KeyId,
    pub time_press: i64,
    pub time_release: i64,
}

impl KeystrokeEvent {
    pub fn duration_ms(&self) -> f64 {
        (self.time_release - self.time_press) as f64
    }
}

/// All events of one typing session, ordered by press time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEvents {
    pub session: SessionId,
    pub events: Vec<KeystrokeEvent>,
}

impl SessionEvents {
    /// Orders events by press time; extraction relies on this ordering.
    pub fn new(session: SessionId, mut events: Vec<KeystrokeEvent>) -> Self {
        events.sort_by_key(|e| e.time_press);
        Self { session, events }
    }

    pub fn keystroke_count(&self) -> usize {
        self.events.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSessions {
    pub user: UserId,
    pub sessions: Vec<SessionEvents>,
}

/// In-memory snapshot of one course's keystroke data, supplied by the
/// hosting collaborator for a single validation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseData {
    pub course: CourseId,
    pub users: Vec<UserSessions>,
}

impl CourseData {
    pub fn total_sessions(&self) -> usize {
        self.users.iter().map(|u| u.sessions.len()).sum()
    }
}
