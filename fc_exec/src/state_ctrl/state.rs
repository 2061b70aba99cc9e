//! # State controller state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::convert::Infallible;
use std::time::Instant;

use log::{debug, info, warn};
use serde::Serialize;
use util::{maths::wrap_180_deg, module::State};

use super::{Params, RateGate, StateCtrlError};
use crate::{
    ctrl::{self, AttitudeCorrection, AttitudePid, Controller, PositionInput, PositionOutput,
        PositionPid, RatePid},
    traj::{lock_traj, SharedTrajectory, TrajState},
    types::{Attitude, AxisMode, Control, EstState, SensorData, Setpoint},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The state controller, generic over its attitude (`A`), rate (`R`) and position (`P`) stages.
pub struct StateCtrl<A, R, P> {
    params: Params,

    attitude_gate: RateGate,
    position_gate: RateGate,

    attitude_ctrl: A,
    rate_ctrl: R,
    position_ctrl: P,

    traj: SharedTrajectory,

    /// Attitude demanded of the attitude stage.
    ///
    /// Units: degrees
    attitude_desired: Attitude,

    /// Rate demanded of the rate stage.
    ///
    /// Units: degrees/second
    rate_desired: Attitude,

    /// Last output of the rate stage, held between attitude ticks.
    actuator: Attitude,

    /// Tracked thrust demand.
    thrust: f32,

    mode: CtrlMode,
}

/// A state controller built from the PID stages.
pub type PidStateCtrl = StateCtrl<AttitudePid, RatePid, PositionPid>;

/// Input data to the state controller.
#[derive(Debug, Clone, Copy)]
pub struct InputData {
    pub setpoint: Setpoint,
    pub sensors: SensorData,
    pub state: EstState,

    /// Tick counter of the executive.
    pub tick: u32,

    /// Time of this tick, used for trajectory playback.
    pub now: Instant,
}

/// Status report for state controller processing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct StatusReport {
    /// The attitude and rate stages ran on this tick.
    pub attitude_stage_run: bool,

    /// The position stage ran on this tick.
    pub position_stage_run: bool,

    /// Mode after this tick.
    pub mode: CtrlMode,

    /// Why the output was zeroed, if it was.
    pub fail_safe_cause: Option<FailSafeCause>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Fail-safe state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CtrlMode {
    /// Outputs are zeroed and all stages held in reset.
    Safe,

    /// Outputs follow the controller stages.
    Armed,
}

/// The condition that put the controller in safe mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailSafeCause {
    /// The thrust demand is zero.
    ZeroThrust,

    /// Position control is enabled but the sensors are not valid.
    SensorsInvalid,

    /// Position control is enabled but no trajectory is being played back.
    TrajectoryIdle,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for CtrlMode {
    fn default() -> Self {
        CtrlMode::Safe
    }
}

impl PidStateCtrl {
    /// Build a state controller using the PID stages.
    ///
    /// Fails if the rates cannot be scheduled or the controller limits are invalid.
    pub fn with_pid(
        params: Params,
        pid_params: &ctrl::Params,
        traj: SharedTrajectory,
    ) -> Result<Self, StateCtrlError> {
        pid_params.validate()?;

        Self::new(
            params,
            AttitudePid::new(&pid_params.attitude, params.attitude_rate_hz),
            RatePid::new(&pid_params.rate, params.attitude_rate_hz),
            PositionPid::new(&pid_params.position, params.position_rate_hz),
            traj,
        )
    }
}

impl<A, R, P> StateCtrl<A, R, P>
where
    A: Controller<Input = AttitudeCorrection, Output = Attitude>,
    R: Controller<Input = AttitudeCorrection, Output = Attitude>,
    P: Controller<Input = PositionInput, Output = PositionOutput>,
{
    /// Create a new state controller.
    ///
    /// Fails if the rates in `params` cannot be scheduled.
    pub fn new(
        params: Params,
        attitude_ctrl: A,
        rate_ctrl: R,
        position_ctrl: P,
        traj: SharedTrajectory,
    ) -> Result<Self, StateCtrlError> {
        let attitude_gate = RateGate::new("attitude", params.tick_rate_hz, params.attitude_rate_hz)?;
        let position_gate = RateGate::new("position", params.tick_rate_hz, params.position_rate_hz)?;

        debug!(
            "Attitude stage every {} ticks, position stage every {} ticks",
            attitude_gate.divider(),
            position_gate.divider()
        );

        Ok(Self {
            attitude_gate,
            position_gate,
            params,
            attitude_ctrl,
            rate_ctrl,
            position_ctrl,
            traj,
            attitude_desired: Attitude::default(),
            rate_desired: Attitude::default(),
            actuator: Attitude::default(),
            thrust: 0.0,
            mode: CtrlMode::Safe,
        })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn mode(&self) -> CtrlMode {
        self.mode
    }

    pub fn attitude_desired(&self) -> &Attitude {
        &self.attitude_desired
    }

    /// Update the desired yaw from the setpoint.
    ///
    /// In velocity mode the yaw rate is integrated over one attitude period.
    fn update_yaw(&mut self, setpoint: &Setpoint) {
        if setpoint.mode.yaw == AxisMode::Velocity {
            self.attitude_desired.yaw = wrap_180_deg(
                self.attitude_desired.yaw
                    - setpoint.attitude_rate.yaw / self.params.attitude_rate_hz as f32,
            );
        } else {
            self.attitude_desired.yaw = setpoint.attitude.yaw;
        }
    }

    fn position_stage(&mut self, input: &InputData) {
        // The lock is released before running the controller
        let goal = lock_traj(&self.traj).current_goal(input.now);

        let out = self.position_ctrl.correct(&PositionInput {
            state: input.state,
            setpoint: input.setpoint,
            attitude_desired: self.attitude_desired,
            goal,
        });

        self.thrust = out.thrust;
        self.attitude_desired = out.attitude;
    }

    fn attitude_stage(&mut self, input: &InputData) {
        let sp = &input.setpoint;

        // Manual overrides
        if sp.mode.z == AxisMode::Disable {
            self.thrust = sp.thrust;
        }
        if sp.mode.x == AxisMode::Disable || sp.mode.y == AxisMode::Disable {
            self.attitude_desired.roll = sp.attitude.roll;
            self.attitude_desired.pitch = sp.attitude.pitch;
        }

        self.rate_desired = self.attitude_ctrl.correct(&AttitudeCorrection {
            measured: input.state.attitude,
            desired: self.attitude_desired,
        });

        if sp.mode.roll == AxisMode::Velocity {
            self.rate_desired.roll = sp.attitude_rate.roll;
        }
        if sp.mode.pitch == AxisMode::Velocity {
            self.rate_desired.pitch = sp.attitude_rate.pitch;
        }

        // The gyro pitch axis is opposite to the attitude pitch axis
        let gyro = &input.sensors.gyro_degs;
        let actuator = self.rate_ctrl.correct(&AttitudeCorrection {
            measured: Attitude::new(gyro.x, -gyro.y, gyro.z),
            desired: self.rate_desired,
        });

        self.actuator = Attitude {
            yaw: -actuator.yaw,
            ..actuator
        };
    }

    /// Check the fail-safe conditions, applying the fail-safe if needed.
    ///
    /// The trajectory state is read and forced idle under a single hold of the lock.
    fn check_fail_safe(&mut self, input: &InputData, control: &mut Control) -> Option<FailSafeCause> {
        let pos_ctrl = input.setpoint.enable_pos_ctrl;

        let cause = {
            let mut traj = lock_traj(&self.traj);

            let cause = if control.thrust == 0.0 {
                Some(FailSafeCause::ZeroThrust)
            } else if pos_ctrl && !input.sensors.valid {
                Some(FailSafeCause::SensorsInvalid)
            } else if pos_ctrl && traj.state() == TrajState::Idle {
                Some(FailSafeCause::TrajectoryIdle)
            } else {
                None
            };

            if cause.is_some() {
                traj.set_state(TrajState::Idle);
            }

            cause
        };

        if cause.is_some() {
            *control = Control::default();
            self.actuator = Attitude::default();

            self.attitude_ctrl.reset();
            self.rate_ctrl.reset();
            self.position_ctrl.reset();

            self.attitude_desired.yaw = input.state.attitude.yaw;
        }

        cause
    }

    fn set_mode(&mut self, cause: Option<FailSafeCause>) {
        match (self.mode, cause) {
            (CtrlMode::Armed, Some(c)) => warn!("Entering fail-safe, cause: {:?}", c),
            (CtrlMode::Safe, None) => info!("Fail-safe cleared, armed"),
            _ => (),
        }

        self.mode = match cause {
            Some(_) => CtrlMode::Safe,
            None => CtrlMode::Armed,
        };
    }
}

impl<A, R, P> State for StateCtrl<A, R, P>
where
    A: Controller<Input = AttitudeCorrection, Output = Attitude>,
    R: Controller<Input = AttitudeCorrection, Output = Attitude>,
    P: Controller<Input = PositionInput, Output = PositionOutput>,
{
    type InputData = InputData;
    type OutputData = Control;
    type StatusReport = StatusReport;
    type ProcError = Infallible;

    /// Run one tick of the state controller.
    ///
    /// Never fails, invalid conditions are handled by the fail-safe.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let mut report = StatusReport::default();

        let attitude_due = self.attitude_gate.is_due(input_data.tick);
        let position_due = self.position_gate.is_due(input_data.tick);

        if attitude_due {
            self.update_yaw(&input_data.setpoint);
        }

        if position_due && input_data.setpoint.enable_pos_ctrl {
            self.position_stage(input_data);
            report.position_stage_run = true;
        }

        if attitude_due {
            self.attitude_stage(input_data);
            report.attitude_stage_run = true;
        }

        // No tilt compensation, the tracked thrust is output as is
        let mut control = Control {
            roll: self.actuator.roll,
            pitch: self.actuator.pitch,
            yaw: self.actuator.yaw,
            thrust: self.thrust,
        };

        report.fail_safe_cause = self.check_fail_safe(input_data, &mut control);
        self.set_mode(report.fail_safe_cause);
        report.mode = self.mode;

        Ok((control, report))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
