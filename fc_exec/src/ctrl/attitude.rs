//! Attitude and rate PID stages

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use util::maths::wrap_180_deg;

use super::{AttitudeCorrection, AttitudePidParams, Controller, PidController, RatePidParams};
use crate::types::Attitude;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Converts an attitude error into a desired attitude rate.
#[derive(Debug, Clone, Serialize)]
pub struct AttitudePid {
    roll: PidController,
    pitch: PidController,
    yaw: PidController,
}

/// Converts an attitude rate error into an actuator demand.
#[derive(Debug, Clone, Serialize)]
pub struct RatePid {
    roll: PidController,
    pitch: PidController,
    yaw: PidController,
    output_limit: f32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AttitudePid {
    pub fn new(params: &AttitudePidParams, rate_hz: u32) -> Self {
        Self {
            roll: PidController::with_rate(params.roll, rate_hz),
            pitch: PidController::with_rate(params.pitch, rate_hz),
            yaw: PidController::with_rate(params.yaw, rate_hz),
        }
    }
}

impl Controller for AttitudePid {
    type Input = AttitudeCorrection;
    type Output = Attitude;

    fn correct(&mut self, input: &AttitudeCorrection) -> Attitude {
        let AttitudeCorrection { measured, desired } = input;

        // The yaw error takes the short way round
        Attitude {
            roll: self.roll.get(desired.roll - measured.roll),
            pitch: self.pitch.get(desired.pitch - measured.pitch),
            yaw: self.yaw.get(wrap_180_deg(desired.yaw - measured.yaw)),
        }
    }

    fn reset(&mut self) {
        self.roll.reset();
        self.pitch.reset();
        self.yaw.reset();
    }
}

impl RatePid {
    pub fn new(params: &RatePidParams, rate_hz: u32) -> Self {
        Self {
            roll: PidController::with_rate(params.roll, rate_hz),
            pitch: PidController::with_rate(params.pitch, rate_hz),
            yaw: PidController::with_rate(params.yaw, rate_hz),
            output_limit: params.output_limit.abs(),
        }
    }

    fn limit(&self, value: f32) -> f32 {
        value.clamp(-self.output_limit, self.output_limit)
    }
}

impl Controller for RatePid {
    type Input = AttitudeCorrection;
    type Output = Attitude;

    fn correct(&mut self, input: &AttitudeCorrection) -> Attitude {
        let AttitudeCorrection { measured, desired } = input;

        let roll = self.roll.get(desired.roll - measured.roll);
        let pitch = self.pitch.get(desired.pitch - measured.pitch);
        let yaw = self.yaw.get(desired.yaw - measured.yaw);

        Attitude {
            roll: self.limit(roll),
            pitch: self.limit(pitch),
            yaw: self.limit(yaw),
        }
    }

    fn reset(&mut self) {
        self.roll.reset();
        self.pitch.reset();
        self.yaw.reset();
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::ctrl::PidGains;

    fn p_only(k_p: f32) -> PidGains {
        PidGains {
            k_p,
            ..Default::default()
        }
    }

    #[test]
    fn test_attitude_yaw_short_way() {
        let params = AttitudePidParams {
            roll: p_only(1.0),
            pitch: p_only(1.0),
            yaw: p_only(1.0),
        };
        let mut pid = AttitudePid::new(&params, 500);

        // 170 to -170 is a 20 degree turn, not a 340 degree one
        let out = pid.correct(&AttitudeCorrection {
            measured: Attitude::new(0.0, 0.0, 170.0),
            desired: Attitude::new(10.0, -5.0, -170.0),
        });

        assert_eq!(out.roll, 10.0);
        assert_eq!(out.pitch, -5.0);
        assert!((out.yaw - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_rate_output_limit() {
        let params = RatePidParams {
            roll: p_only(100.0),
            pitch: p_only(100.0),
            yaw: p_only(0.5),
            output_limit: 50.0,
        };
        let mut pid = RatePid::new(&params, 500);

        let out = pid.correct(&AttitudeCorrection {
            measured: Attitude::default(),
            desired: Attitude::new(10.0, -10.0, 10.0),
        });

        assert_eq!(out, Attitude::new(50.0, -50.0, 5.0));
    }
}
