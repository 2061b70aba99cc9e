//! # Flight Control Executable Parameters
//!
//! This module provide parameters for the flight control executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::{traj::MAX_TRAJ_ENTRIES, types::Setpoint};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FcExecParams {
    /// Network endpoint the trajectory command server binds to
    pub cmd_endpoint: String,

    /// Receive timeout of the command server, the receiver checks for shutdown at this period.
    ///
    /// Units: milliseconds
    pub cmd_recv_timeout_ms: i32,

    /// Send timeout of the command server.
    ///
    /// Units: milliseconds
    pub cmd_send_timeout_ms: i32,

    /// Number of waypoints the trajectory can hold
    #[serde(default = "default_traj_capacity")]
    pub traj_capacity: usize,

    /// Number of consecutive cycle overruns after which an error is raised in the log
    pub overrun_error_limit: u64,

    /// Setpoint applied on every cycle
    #[serde(default)]
    pub setpoint: Setpoint,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn default_traj_capacity() -> usize {
    MAX_TRAJ_ENTRIES
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
