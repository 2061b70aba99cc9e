//! # Flight control data types
//!
//! Plain data exchanged between the setpoint source, the estimator, the state controller and the
//! actuators. All of these are snapshots: the state controller reads them once per tick and never
//! keeps references to them.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Roll, pitch and yaw triple.
///
/// Depending on context this is a measured orientation, a desired orientation (both in degrees)
/// or a desired angular rate (degrees/second).
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attitude {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
}

/// Control mode of every axis in a setpoint.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisModes {
    pub roll: AxisMode,
    pub pitch: AxisMode,
    pub yaw: AxisMode,
    pub x: AxisMode,
    pub y: AxisMode,

    /// The z axis, which is controlled through thrust.
    pub z: AxisMode,
}

/// The demand from the setpoint source for a single tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Setpoint {
    /// How each axis of this setpoint must be interpreted.
    pub mode: AxisModes,

    /// Target attitude in degrees, used by axes in `Abs` mode and by manual overrides.
    pub attitude: Attitude,

    /// Target attitude rate in degrees/second, used by axes in `Velocity` mode.
    pub attitude_rate: Attitude,

    /// Raw thrust demand, used when the z axis is disabled.
    pub thrust: f32,

    /// If true the position stage runs and trajectory playback is required.
    pub enable_pos_ctrl: bool,
}

/// Sensor data for a single tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorData {
    /// Gyro rates about the body x, y and z axes.
    ///
    /// Units: degrees/second
    pub gyro_degs: Vector3<f32>,

    /// False if the sensors cannot be trusted this tick.
    pub valid: bool,
}

/// The fused state estimate.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstState {
    /// Measured attitude in degrees.
    pub attitude: Attitude,

    /// Position in the world frame.
    ///
    /// Units: meters
    pub position_m: Vector3<f32>,

    /// Velocity in the world frame.
    ///
    /// Units: meters/second
    pub velocity_ms: Vector3<f32>,
}

/// Actuator command produced by the state controller.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub thrust: f32,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The way a setpoint axis is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisMode {
    /// The axis is not under automatic control, its raw setpoint value is used directly.
    Disable,

    /// The setpoint holds an absolute target for the axis.
    Abs,

    /// The setpoint holds a rate for the axis.
    Velocity,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for AxisMode {
    fn default() -> Self {
        AxisMode::Disable
    }
}

impl Attitude {
    pub fn new(roll: f32, pitch: f32, yaw: f32) -> Self {
        Self { roll, pitch, yaw }
    }
}

impl Control {
    /// True if every field of the command is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.roll == 0.0 && self.pitch == 0.0 && self.yaw == 0.0 && self.thrust == 0.0
    }
}
