//! Main flight control executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the trajectory and the state controller
//!     - Start the trajectory command receiver on its own thread
//!     - Main loop, once per tick:
//!         - System input acquisition
//!         - State control processing
//!         - Cycle management
//!
//! # Modules
//!
//! All cyclic modules (e.g. `state_ctrl`) shall provide a public struct implementing the
//! `util::module::State` trait.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, error, info, warn};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use comms_if::net::zmq;
use fc_lib::{
    cmd_server::CmdServer,
    ctrl,
    data_store::DataStore,
    params::FcExecParams,
    state_ctrl::{self, PidStateCtrl},
    traj::{self, Trajectory},
};
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("fc_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, Some(&session)).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Flight Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: FcExecParams =
        util::params::load("fc_exec.toml").wrap_err("Could not load exec params")?;
    let state_ctrl_params: state_ctrl::Params =
        util::params::load("state_ctrl.toml").wrap_err("Could not load StateCtrl params")?;
    let pid_params: ctrl::Params =
        util::params::load("ctrl_pid.toml").wrap_err("Could not load controller params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();
    ds.setpoint = exec_params.setpoint;

    let traj = traj::shared(Trajectory::new(exec_params.traj_capacity));
    info!(
        "Trajectory store holds up to {} waypoints",
        traj::lock_traj(&traj).store().capacity()
    );

    let mut state_ctrl = PidStateCtrl::with_pid(state_ctrl_params, &pid_params, traj.clone())
        .wrap_err("Failed to initialise StateCtrl")?;
    info!(
        "StateCtrl init complete, tick {} Hz, attitude {} Hz, position {} Hz",
        state_ctrl.params().tick_rate_hz,
        state_ctrl.params().attitude_rate_hz,
        state_ctrl.params().position_rate_hz
    );

    info!("Module initialisation complete\n");

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = zmq::Context::new();

    let mut cmd_server =
        CmdServer::new(&zmq_ctx, &exec_params).wrap_err("Failed to initialise CmdServer")?;
    info!("CmdServer bound to {}", exec_params.cmd_endpoint);

    let stop = Arc::new(AtomicBool::new(false));

    let receiver = {
        let traj = traj.clone();
        let stop = stop.clone();

        thread::Builder::new()
            .name("traj_receiver".into())
            .spawn(move || traj::run(&mut cmd_server, &traj, &stop))
            .wrap_err("Failed to start the trajectory receiver thread")?
    };

    info!("Network initialisation complete");

    // ---- MAIN LOOP ----

    let cycle_period = Duration::from_secs_f64(util::time::period_s(state_ctrl_params.tick_rate_hz));

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(state_ctrl_params.tick_rate_hz);

        // ---- CONTROL ALGORITHM PROCESSING ----

        match state_ctrl.proc(&ds.state_ctrl_input(cycle_start_instant)) {
            Ok((o, r)) => {
                ds.control = o;
                ds.state_ctrl_status_rpt = r;
            }
            Err(e) => match e {},
        }

        if ds.is_1_hz_cycle {
            debug!("StateCtrl {:?}, output: {:?}", state_ctrl.mode(), ds.control);
        }

        // The executive has no way to receive trajectories without the receiver
        if receiver.is_finished() {
            error!("Trajectory receiver stopped, exiting");
            break;
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                );
                ds.num_consec_cycle_overruns += 1;

                if ds.num_consec_cycle_overruns == exec_params.overrun_error_limit {
                    error!(
                        "{} consecutive cycle overruns, control rates can't be met",
                        exec_params.overrun_error_limit
                    );
                }
            }
        }

        ds.cycle_end();
    }

    // ---- SHUTDOWN ----

    stop.store(true, Ordering::Relaxed);

    let result = match receiver.join() {
        Ok(r) => r.wrap_err("The trajectory receiver failed"),
        Err(_) => Err(eyre!("The trajectory receiver thread panicked")),
    };

    session.exit();

    info!("End of execution");

    result
}
