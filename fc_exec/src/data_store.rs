//! # Data Store

use std::time::Instant;

use crate::{
    state_ctrl,
    types::{Control, EstState, SensorData, Setpoint},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Debug, Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// Tick counter passed to the state controller, wraps on overflow
    pub tick: u32,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    // Inputs
    pub setpoint: Setpoint,
    pub sensors: SensorData,
    pub est_state: EstState,

    // StateCtrl
    pub control: Control,
    pub state_ctrl_status_rpt: state_ctrl::StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears the outputs of the previous cycle and sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, tick_rate_hz: u32) {
        self.is_1_hz_cycle = tick_rate_hz == 0 || self.num_cycles % (tick_rate_hz as u128) == 0;

        self.control = Control::default();
        self.state_ctrl_status_rpt = state_ctrl::StatusReport::default();
    }

    /// Perform actions required at the end of a cycle.
    pub fn cycle_end(&mut self) {
        self.num_cycles += 1;
        self.tick = self.tick.wrapping_add(1);
    }

    /// Build the state controller input for this cycle.
    pub fn state_ctrl_input(&self, now: Instant) -> state_ctrl::InputData {
        state_ctrl::InputData {
            setpoint: self.setpoint,
            sensors: self.sensors,
            state: self.est_state,
            tick: self.tick,
            now,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
