//! # PID controller
//!
//! A single axis PID controller run at a fixed rate. Since the state controller gates every stage
//! on the tick counter the time step is known in advance and is not measured.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gains of a single PID controller.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    /// Proportional gain
    pub k_p: f32,

    /// Integral gain
    pub k_i: f32,

    /// Derivative gain
    pub k_d: f32,

    /// Symmetric limit on the integral accumulation
    pub i_limit: f32,
}

/// A PID controller
#[derive(Debug, Clone, Serialize)]
pub struct PidController {
    gains: PidGains,

    /// Time between two calls to `get`.
    ///
    /// Units: seconds
    dt_s: f32,

    /// Previous error
    prev_error: Option<f32>,

    /// The integral accumulation
    integral: f32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {
    /// Create a new controller with the given gains, which will be called every `dt_s` seconds.
    pub fn new(gains: PidGains, dt_s: f32) -> Self {
        Self {
            gains,
            dt_s,
            prev_error: None,
            integral: 0.0,
        }
    }

    /// Create a new controller which will be called at `rate_hz`.
    pub fn with_rate(gains: PidGains, rate_hz: u32) -> Self {
        Self::new(gains, util::time::period_s(rate_hz) as f32)
    }

    /// Get the value of the controller for the given error.
    pub fn get(&mut self, error: f32) -> f32 {
        // Accumulate the integral term, clamping it so that a long saturation doesn't wind it up
        let i_limit = self.gains.i_limit.abs();
        self.integral = (self.integral + error * self.dt_s).clamp(-i_limit, i_limit);

        // No derivative on the first call, otherwise the first error would produce a spike
        let deriv = match self.prev_error {
            Some(e) if self.dt_s > 0.0 => (error - e) / self.dt_s,
            _ => 0.0,
        };

        self.prev_error = Some(error);

        self.gains.k_p * error + self.gains.k_i * self.integral + self.gains.k_d * deriv
    }

    /// Clear the integral and the previous error.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = None;
    }

    /// The current integral accumulation.
    #[cfg(test)]
    pub fn integral(&self) -> f32 {
        self.integral
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
