//! State controller parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the state controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Rate at which the executive calls the state controller.
    ///
    /// Units: Hz
    pub tick_rate_hz: u32,

    /// Rate of the attitude and rate stages.
    ///
    /// Units: Hz
    pub attitude_rate_hz: u32,

    /// Rate of the position stage.
    ///
    /// Units: Hz
    pub position_rate_hz: u32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            tick_rate_hz: 1000,
            attitude_rate_hz: 500,
            position_rate_hz: 100,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
