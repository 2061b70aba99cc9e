//! # Controller stages
//!
//! The state controller reduces a desired state to an actuator command through a cascade of
//! controller stages: position correction (optional) feeds attitude correction, which feeds rate
//! correction. Every stage is hidden behind the [`Controller`] trait so that the state controller
//! only depends on the capability, not on the numerics. Each stage may keep memory (for example
//! integrators) between calls, which is only cleared by [`Controller::reset`].
//!
//! PID based implementations of all three stages are provided in this module.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod attitude;
mod params;
mod pid;
mod position;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use attitude::*;
pub use params::*;
pub use pid::*;
pub use position::*;

use crate::traj::TrajPoint;
use crate::types::{Attitude, EstState, Setpoint};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A stateful controller stage.
pub trait Controller {
    /// Data the stage corrects on.
    type Input;

    /// Demand produced by the stage.
    type Output;

    /// Run the stage once, updating any internal memory.
    fn correct(&mut self, input: &Self::Input) -> Self::Output;

    /// Clear all internal memory of the stage.
    fn reset(&mut self);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Input to the attitude and rate stages: a measured quantity and the demanded value of it.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct AttitudeCorrection {
    pub measured: Attitude,
    pub desired: Attitude,
}

/// Input to the position stage.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PositionInput {
    /// Current state estimate.
    pub state: EstState,

    /// Setpoint of this tick.
    pub setpoint: Setpoint,

    /// The attitude currently demanded by the state controller. The yaw is kept by the stage.
    pub attitude_desired: Attitude,

    /// The goal point from the trajectory.
    pub goal: TrajPoint,
}

/// Demands produced by the position stage.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PositionOutput {
    pub thrust: f32,
    pub attitude: Attitude,
}
