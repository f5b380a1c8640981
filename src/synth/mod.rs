//! Synthetic typist generation for demos, tests, and benches. Each user
//! gets a Gaussian per-key timing profile; sampled sessions look enough
//! like real typing to exercise the full extraction and verification path.
//! Never used on real data.

use crate::keymap;
use crate::keystroke::{
    CourseData, CourseId, KeyId, KeystrokeEvent, SessionEvents, SessionId, UserId, UserSessions,
};
use crate::stats;
use rand::Rng;

/// Per-user timing profile: dwell is hold time, flight is press-to-press
/// spacing, both in milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct TypistProfile {
    pub dwell_mean: f64,
    pub dwell_std: f64,
    pub flight_mean: f64,
    pub flight_std: f64,
}

impl TypistProfile {
    /// Draw a plausible profile; distinct users land far enough apart for
    /// verification to have signal.
    pub fn sampled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            dwell_mean: rng.gen_range(70.0..160.0),
            dwell_std: rng.gen_range(8.0..25.0),
            flight_mean: rng.gen_range(130.0..280.0),
            flight_std: rng.gen_range(15.0..50.0),
        }
    }
}

/// One session of `count` keystrokes over the given key universe.
pub fn generate_session<R: Rng + ?Sized>(
    rng: &mut R,
    profile: &TypistProfile,
    keys: &[KeyId],
    count: usize,
) -> SessionEvents {
    let mut events = Vec::with_capacity(count);
    let mut cursor = 0i64;
    for _ in 0..count {
        let key = keys[rng.gen_range(0..keys.len())];
        let (dwell, _) = stats::gaussian_pair(rng, profile.dwell_mean, profile.dwell_std);
        let (flight, _) = stats::gaussian_pair(rng, profile.flight_mean, profile.flight_std);
        let dwell = dwell.max(20.0) as i64;
        let flight = flight.max(dwell as f64 + 10.0) as i64;
        events.push(KeystrokeEvent {
            key,
            time_press: cursor,
            time_release: cursor + dwell,
        });
        cursor += flight;
    }
    SessionEvents::new(SessionId::new(), events)
}

/// A whole course of typists over the visible-key universe.
pub fn generate_course<R: Rng + ?Sized>(
    rng: &mut R,
    course: CourseId,
    users: u32,
    sessions_per_user: u32,
    keystrokes_per_session: usize,
) -> CourseData {
    let keys = keymap::visible_keys();
    let users = (0..users)
        .map(|u| {
            let profile = TypistProfile::sampled(rng);
            let sessions = (0..sessions_per_user)
                .map(|_| generate_session(rng, &profile, &keys, keystrokes_per_session))
                .collect();
            UserSessions {
                user: UserId(u as u64 + 1),
                sessions,
            }
        })
        .collect();
    CourseData { course, users }
}
