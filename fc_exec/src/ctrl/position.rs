//! # Position PID stage
//!
//! Drives the estimated position onto the trajectory goal. The horizontal correction is computed
//! in the world frame, with the goal velocity as feed-forward, then rotated into the heading frame
//! given by the desired yaw:
//!
//! - a positive forward correction produces a positive pitch demand,
//! - a positive leftward correction produces a negative roll demand,
//! - the vertical correction is added to the base (hover) thrust.
//!
//! The desired yaw passes through unchanged.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::{Controller, PidController, PositionInput, PositionOutput, PositionPidParams};
use crate::types::Attitude;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct PositionPid {
    x: PidController,
    y: PidController,
    z: PidController,
    params: PositionPidParams,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PositionPid {
    pub fn new(params: &PositionPidParams, rate_hz: u32) -> Self {
        Self {
            x: PidController::with_rate(params.x, rate_hz),
            y: PidController::with_rate(params.y, rate_hz),
            z: PidController::with_rate(params.z, rate_hz),
            params: *params,
        }
    }
}

impl Controller for PositionPid {
    type Input = PositionInput;
    type Output = PositionOutput;

    fn correct(&mut self, input: &PositionInput) -> PositionOutput {
        let p = &self.params;

        let error_m = input.goal.position_m - input.state.position_m;
        let ff_ms = input.goal.velocity_ms * p.vel_ff;

        // World frame corrections
        let world_x = self.x.get(error_m.x) + ff_ms.x;
        let world_y = self.y.get(error_m.y) + ff_ms.y;
        let world_z = self.z.get(error_m.z) + ff_ms.z;

        // Rotate into the heading frame
        let (sin_yaw, cos_yaw) = input.attitude_desired.yaw.to_radians().sin_cos();
        let fwd = world_x * cos_yaw + world_y * sin_yaw;
        let left = -world_x * sin_yaw + world_y * cos_yaw;

        let rp_limit = p.rp_limit_deg.abs();

        PositionOutput {
            thrust: (p.thrust_base + p.thrust_scale * world_z).clamp(p.thrust_min, p.thrust_max),
            attitude: Attitude {
                roll: (-left).clamp(-rp_limit, rp_limit),
                pitch: fwd.clamp(-rp_limit, rp_limit),
                yaw: input.attitude_desired.yaw,
            },
        }
    }

    fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
        self.z.reset();
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use nalgebra::Vector3;

    use super::*;
    use crate::ctrl::PidGains;
    use crate::traj::TrajPoint;

    fn params() -> PositionPidParams {
        let p = PidGains {
            k_p: 1.0,
            ..Default::default()
        };

        PositionPidParams {
            x: p,
            y: p,
            z: p,
            vel_ff: 0.0,
            thrust_base: 30000.0,
            thrust_scale: 1000.0,
            thrust_min: 20000.0,
            thrust_max: 60000.0,
            rp_limit_deg: 20.0,
        }
    }

    fn input(goal_m: Vector3<f32>, yaw_deg: f32) -> PositionInput {
        PositionInput {
            goal: TrajPoint {
                position_m: goal_m,
                velocity_ms: Vector3::zeros(),
            },
            attitude_desired: Attitude::new(0.0, 0.0, yaw_deg),
            ..Default::default()
        }
    }

    #[test]
    fn test_on_goal_hovers() {
        let mut pid = PositionPid::new(&params(), 100);
        let out = pid.correct(&input(Vector3::zeros(), 45.0));

        assert_eq!(out.thrust, 30000.0);
        assert_eq!(out.attitude, Attitude::new(0.0, 0.0, 45.0));
    }

    #[test]
    fn test_forward_and_lateral() {
        let mut pid = PositionPid::new(&params(), 100);

        let out = pid.correct(&input(Vector3::new(2.0, 0.0, 0.0), 0.0));
        assert!((out.attitude.pitch - 2.0).abs() < 1e-5);
        assert!(out.attitude.roll.abs() < 1e-5);

        let out = pid.correct(&input(Vector3::new(0.0, 3.0, 0.0), 0.0));
        assert!((out.attitude.roll + 3.0).abs() < 1e-5);

        // Facing +y the world y error is straight ahead
        let out = pid.correct(&input(Vector3::new(0.0, 3.0, 0.0), 90.0));
        assert!((out.attitude.pitch - 3.0).abs() < 1e-4);
        assert!(out.attitude.roll.abs() < 1e-4);
    }

    #[test]
    fn test_limits() {
        let mut pid = PositionPid::new(&params(), 100);

        let out = pid.correct(&input(Vector3::new(100.0, 0.0, 100.0), 0.0));
        assert_eq!(out.attitude.pitch, 20.0);
        assert_eq!(out.thrust, 60000.0);

        let out = pid.correct(&input(Vector3::new(0.0, 0.0, -100.0), 0.0));
        assert_eq!(out.thrust, 20000.0);
    }
}
