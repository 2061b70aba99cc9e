//! # Trajectory playback
//!
//! Couples the waypoint store with a playback cursor. Once started, the goal at any instant is
//! found by moving the cursor past every waypoint whose time has been reached and linearly
//! interpolating between the last reached waypoint and the next one. Before the first waypoint
//! is due, after the last one has passed, or if playback was never started, the goal is the hold
//! point: the last waypoint of the most recently started path.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::{TrajEntry, TrajError, TrajPoint, WaypointStore};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The waypoint store and its playback state.
#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    store: WaypointStore,

    /// Fallback goal, survives resets.
    hold: TrajEntry,

    /// Playback epoch, `None` until the first start.
    start_time: Option<Instant>,

    /// Index of the first waypoint that has not been reached yet.
    current_entry: usize,

    state: TrajState,
}

/// A waypoint accepted by [`Trajectory::append`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appended {
    /// Index of the waypoint in the store.
    pub index: usize,

    /// Offset of the previous waypoint, if the new one is earlier than it.
    pub earlier_than_ms: Option<u16>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Playback state of the trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrajState {
    /// No path is being played back.
    Idle,

    /// A path has been started and may be followed.
    Active,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for TrajState {
    fn default() -> Self {
        TrajState::Idle
    }
}

impl Trajectory {
    /// Create an empty trajectory whose store holds `capacity` waypoints.
    pub fn new(capacity: usize) -> Self {
        Self {
            store: WaypointStore::new(capacity),
            ..Default::default()
        }
    }

    /// Discard all waypoints and go idle.
    ///
    /// The hold point and the playback cursor are kept until the next start.
    pub fn reset(&mut self) {
        self.store.clear();
        self.state = TrajState::Idle;
    }

    /// Append a waypoint to the end of the path.
    ///
    /// Waypoints earlier than their predecessor are accepted, the returned [`Appended`] flags
    /// them.
    pub fn append(&mut self, entry: TrajEntry) -> Result<Appended, TrajError> {
        let earlier_than_ms = self
            .store
            .last()
            .map(|last| last.time_from_start_ms)
            .filter(|&prev_ms| entry.time_from_start_ms < prev_ms);

        let index = self.store.len();
        self.store.push(entry)?;

        Ok(Appended {
            index,
            earlier_than_ms,
        })
    }

    /// Start playback of the uploaded path, with `now` as the epoch.
    ///
    /// The last waypoint becomes the hold point. With an empty store the previous hold point is
    /// kept, so playback holds where the last path ended.
    pub fn start(&mut self, now: Instant) {
        if let Some(last) = self.store.last() {
            self.hold = *last;
        }

        self.start_time = Some(now);
        self.current_entry = 0;
        self.state = TrajState::Active;
    }

    /// Get the goal point at `now`, advancing the playback cursor.
    pub fn current_goal(&mut self, now: Instant) -> TrajPoint {
        let start_time = match self.start_time {
            Some(t) => t,
            None => return self.hold.point,
        };

        let elapsed = now.saturating_duration_since(start_time);

        // Move past all the waypoints which are due
        while let Some(entry) = self.store.get(self.current_entry) {
            if entry_offset(entry) > elapsed {
                break;
            }
            self.current_entry += 1;
        }

        let cur = self.current_entry;
        if cur == 0 || cur >= self.store.len() {
            return self.hold.point;
        }

        match (self.store.get(cur - 1), self.store.get(cur)) {
            (Some(prev), Some(next)) => interpolate(prev, next, elapsed),
            _ => self.hold.point,
        }
    }

    pub fn state(&self) -> TrajState {
        self.state
    }

    pub fn set_state(&mut self, state: TrajState) {
        self.state = state;
    }

    pub fn store(&self) -> &WaypointStore {
        &self.store
    }

    /// The point held before the first and after the last waypoint.
    pub fn hold(&self) -> &TrajEntry {
        &self.hold
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn entry_offset(entry: &TrajEntry) -> Duration {
    Duration::from_millis(entry.time_from_start_ms as u64)
}

/// Linearly interpolate between two waypoints.
///
/// A zero or negative span between the two gives the later waypoint.
fn interpolate(prev: &TrajEntry, next: &TrajEntry, elapsed: Duration) -> TrajPoint {
    let span_ms = next.time_from_start_ms as f32 - prev.time_from_start_ms as f32;
    if span_ms <= 0.0 {
        return next.point;
    }

    let into_ms = elapsed.as_secs_f32() * 1000.0 - prev.time_from_start_ms as f32;
    let frac = (into_ms / span_ms).max(0.0).min(1.0);

    TrajPoint {
        position_m: prev.point.position_m.lerp(&next.point.position_m, frac),
        velocity_ms: prev.point.velocity_ms.lerp(&next.point.velocity_ms, frac),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
