//! # Flight control library.
//!
//! This library allows other crates in the workspace to access items defined inside the flight
//! control crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Command server - serves the trajectory link over zmq
pub mod cmd_server;

/// Controller stages - the controller abstraction and the PID stages
pub mod ctrl;

/// Data store - the data exchanged between modules during a cycle
pub mod data_store;

/// Executable parameters
pub mod params;

/// State control module - schedules the controller stages and enforces the fail-safe
pub mod state_ctrl;

/// Trajectory module - waypoint upload and playback
pub mod traj;

/// Data types shared by all modules
pub mod types;
