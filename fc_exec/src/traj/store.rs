//! # Waypoint store
//!
//! A bounded, append only list of waypoints. The store only enforces its capacity, the order of
//! the waypoints is the order in which they arrived.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::traj::TrajAdd;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::TrajError;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default number of waypoints the store can hold.
pub const MAX_TRAJ_ENTRIES: usize = 100;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A target position and velocity.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajPoint {
    /// Units: meters
    pub position_m: Vector3<f32>,

    /// Units: meters/second
    pub velocity_ms: Vector3<f32>,
}

/// A waypoint: a point and the time at which it shall be reached.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajEntry {
    /// Offset from the playback epoch.
    ///
    /// Units: milliseconds
    pub time_from_start_ms: u16,

    pub point: TrajPoint,
}

/// Bounded store of waypoints.
#[derive(Debug, Clone)]
pub struct WaypointStore {
    entries: Vec<TrajEntry>,
    capacity: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajPoint {
    pub fn new(position_m: Vector3<f32>, velocity_ms: Vector3<f32>) -> Self {
        Self {
            position_m,
            velocity_ms,
        }
    }
}

impl From<TrajAdd> for TrajEntry {
    fn from(add: TrajAdd) -> Self {
        Self {
            time_from_start_ms: add.time_from_start_ms,
            point: TrajPoint {
                position_m: Vector3::new(add.x_m, add.y_m, add.z_m),
                velocity_ms: Vector3::new(add.vx_ms, add.vy_ms, add.vz_ms),
            },
        }
    }
}

impl Default for WaypointStore {
    fn default() -> Self {
        Self::new(MAX_TRAJ_ENTRIES)
    }
}

impl WaypointStore {
    /// Create an empty store which can hold `capacity` waypoints.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Remove all waypoints.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Append a waypoint, failing if the store is already full.
    pub fn push(&mut self, entry: TrajEntry) -> Result<(), TrajError> {
        if self.is_full() {
            return Err(TrajError::StoreFull(self.capacity));
        }

        self.entries.push(entry);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The most recently appended waypoint.
    pub fn last(&self) -> Option<&TrajEntry> {
        self.entries.last()
    }

    pub fn get(&self, index: usize) -> Option<&TrajEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[TrajEntry] {
        &self.entries
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
