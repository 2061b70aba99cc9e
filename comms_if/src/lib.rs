//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the software.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Trajectory command link: opcodes, payload layout and reply status codes
pub mod traj;

/// Network module
pub mod net;
