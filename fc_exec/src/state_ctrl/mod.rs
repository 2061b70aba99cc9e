//! # State control module
//!
//! The state controller is the periodic entry point of flight control. It is called once per
//! tick of the executive and:
//!
//! 1. Runs the position stage on position ticks (if position control is enabled), following the
//!    trajectory goal,
//! 2. Runs the attitude and rate stages on attitude ticks, substituting the setpoint for any axis
//!    under manual control,
//! 3. Checks the fail-safe conditions, zeroing the output and resetting every stage if they are
//!    met.
//!
//! Which stages run on a tick is decided by [`RateGate`]s built from the configured rates.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod rate;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use rate::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors in the configuration of the state controller.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum StateCtrlError {
    #[error("The {0} rate must not be zero")]
    ZeroRate(&'static str),

    #[error("The {name} rate ({rate_hz} Hz) is faster than the tick rate ({tick_rate_hz} Hz)")]
    FasterThanTick {
        name: &'static str,
        rate_hz: u32,
        tick_rate_hz: u32,
    },

    #[error("The {name} rate ({rate_hz} Hz) does not divide the tick rate ({tick_rate_hz} Hz)")]
    NotADivisor {
        name: &'static str,
        rate_hz: u32,
        tick_rate_hz: u32,
    },

    #[error("Invalid controller parameters: {0}")]
    CtrlParams(#[from] crate::ctrl::ParamsError),
}
