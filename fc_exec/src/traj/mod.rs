//! # Trajectory module
//!
//! Stores a waypoint path uploaded over the command link and plays it back against the monotonic
//! clock, producing the goal point for the position controller.
//!
//! The trajectory is shared between the command receiver thread, which mutates it, and the state
//! controller, which reads the goal and forces playback idle on fail-safe. Both go through
//! [`lock_traj`] and hold the lock for a complete operation.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod receiver;
pub mod state;
pub mod store;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::{Arc, Mutex, MutexGuard};

use log::warn;
use thiserror::Error;

pub use receiver::*;
pub use state::*;
pub use store::*;

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// Trajectory shared between the command receiver and the state controller.
pub type SharedTrajectory = Arc<Mutex<Trajectory>>;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrajError {
    #[error("The waypoint store is full ({0} waypoints)")]
    StoreFull(usize),
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Wrap a trajectory so it can be shared between threads.
pub fn shared(traj: Trajectory) -> SharedTrajectory {
    Arc::new(Mutex::new(traj))
}

/// Lock the shared trajectory.
///
/// A thread panicking while holding the lock cannot leave the trajectory half updated in a way
/// that matters (it is plain data), so a poisoned lock is recovered.
pub fn lock_traj(traj: &SharedTrajectory) -> MutexGuard<'_, Trajectory> {
    match traj.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("Trajectory lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}
