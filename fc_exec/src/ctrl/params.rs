//! Parameters for the PID controller stages

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::PidGains;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for all PID controller stages.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct Params {
    pub attitude: AttitudePidParams,
    pub rate: RatePidParams,
    pub position: PositionPidParams,
}

/// Gains of the attitude (angle) stage.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct AttitudePidParams {
    pub roll: PidGains,
    pub pitch: PidGains,
    pub yaw: PidGains,
}

/// Gains and limits of the rate stage.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct RatePidParams {
    pub roll: PidGains,
    pub pitch: PidGains,
    pub yaw: PidGains,

    /// Symmetric saturation applied to each actuator demand.
    pub output_limit: f32,
}

/// Gains and limits of the position stage.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct PositionPidParams {
    pub x: PidGains,
    pub y: PidGains,
    pub z: PidGains,

    /// Gain applied to the goal velocity, added to the output of each position controller.
    pub vel_ff: f32,

    /// Thrust demand at zero z correction, i.e. roughly the hover thrust.
    pub thrust_base: f32,

    /// Thrust per unit of z controller output.
    pub thrust_scale: f32,

    /// Minimum thrust demand. Must be greater than zero so the position stage never demands a
    /// motor stop.
    pub thrust_min: f32,

    /// Maximum thrust demand.
    pub thrust_max: f32,

    /// Limit on the magnitude of the roll and pitch demands.
    ///
    /// Units: degrees
    pub rp_limit_deg: f32,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Limits which the controller stages cannot apply.
#[derive(Debug, Error, PartialEq)]
pub enum ParamsError {
    #[error("{0} is not a number")]
    NotANumber(&'static str),

    #[error("The minimum thrust ({min}) is greater than the maximum thrust ({max})")]
    ThrustRange { min: f32, max: f32 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check that every limit can be used to saturate a stage output.
    pub fn validate(&self) -> Result<(), ParamsError> {
        let limits = [
            ("attitude.roll.i_limit", self.attitude.roll.i_limit),
            ("attitude.pitch.i_limit", self.attitude.pitch.i_limit),
            ("attitude.yaw.i_limit", self.attitude.yaw.i_limit),
            ("rate.roll.i_limit", self.rate.roll.i_limit),
            ("rate.pitch.i_limit", self.rate.pitch.i_limit),
            ("rate.yaw.i_limit", self.rate.yaw.i_limit),
            ("rate.output_limit", self.rate.output_limit),
            ("position.x.i_limit", self.position.x.i_limit),
            ("position.y.i_limit", self.position.y.i_limit),
            ("position.z.i_limit", self.position.z.i_limit),
            ("position.thrust_min", self.position.thrust_min),
            ("position.thrust_max", self.position.thrust_max),
            ("position.rp_limit_deg", self.position.rp_limit_deg),
        ];

        if let Some((name, _)) = limits.iter().find(|(_, v)| v.is_nan()) {
            return Err(ParamsError::NotANumber(name));
        }

        if self.position.thrust_min > self.position.thrust_max {
            return Err(ParamsError::ThrustRange {
                min: self.position.thrust_min,
                max: self.position.thrust_max,
            });
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn shipped() -> Params {
        util::params::load_from_path(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../params/ctrl_pid.toml"
        ))
        .unwrap()
    }

    #[test]
    fn test_load_shipped_params() {
        let params = shipped();
        assert_eq!(params.validate(), Ok(()));

        assert!(params.rate.output_limit > 0.0);
        assert!(params.position.thrust_min > 0.0);
        assert!(params.position.thrust_min <= params.position.thrust_base);
        assert!(params.position.thrust_base <= params.position.thrust_max);
    }

    #[test]
    fn test_validate() {
        let mut params = shipped();
        params.position.thrust_min = 50000.0;
        params.position.thrust_max = 40000.0;
        assert_eq!(
            params.validate(),
            Err(ParamsError::ThrustRange {
                min: 50000.0,
                max: 40000.0
            })
        );

        let mut params = shipped();
        params.rate.yaw.i_limit = f32::NAN;
        assert_eq!(params.validate(), Err(ParamsError::NotANumber("rate.yaw.i_limit")));

        let mut params = shipped();
        params.position.rp_limit_deg = f32::NAN;
        assert_eq!(
            params.validate(),
            Err(ParamsError::NotANumber("position.rp_limit_deg"))
        );

        // Equal bounds pin the thrust
        let mut params = shipped();
        params.position.thrust_min = params.position.thrust_max;
        assert_eq!(params.validate(), Ok(()));
    }
}
