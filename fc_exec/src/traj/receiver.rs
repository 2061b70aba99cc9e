//! # Trajectory command receiver
//!
//! Applies commands from the trajectory link to the shared trajectory. Each received packet is
//! decoded, executed and answered with exactly one response. Only the execution itself holds the
//! trajectory lock: logging and archiving of the outcome happen once it has been released, so the
//! state controller never waits on log or file output.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use comms_if::traj::{TrajCmd, TrajResponse, TrajStatus};
use log::{debug, info, warn};

use super::{lock_traj, Appended, SharedTrajectory, TrajEntry, TrajError, Trajectory};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Archive path of every started path.
const PATH_ARCHIVE: &str = "traj/path.json";

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A bidirectional packet link carrying trajectory commands.
pub trait CmdLink {
    type Error: std::error::Error;

    /// Wait for the next packet.
    ///
    /// Returns `Ok(None)` if nothing was received within the link's timeout, in which case no
    /// response must be sent.
    fn recv(&mut self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Send a response to the last received packet.
    fn send(&mut self, packet: &[u8]) -> Result<(), Self::Error>;
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// What executing a command did to the trajectory.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Reset,

    Added(Appended),

    /// The waypoint was dropped, the store holds this many waypoints.
    StoreFull(usize),

    /// Playback started on a copy of the uploaded path.
    Started(Vec<TrajEntry>),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Outcome {
    pub fn status(&self) -> TrajStatus {
        match self {
            Outcome::StoreFull(_) => TrajStatus::StoreFull,
            _ => TrajStatus::Ok,
        }
    }

    /// Log the outcome and archive a started path.
    ///
    /// Must not be called with the trajectory lock held.
    fn report(self) {
        match self {
            Outcome::Reset => debug!("Trajectory reset"),
            Outcome::Added(Appended {
                index,
                earlier_than_ms: Some(prev_ms),
            }) => warn!(
                "Waypoint {} is earlier than the previous one at {} ms",
                index, prev_ms
            ),
            Outcome::Added(_) => (),
            Outcome::StoreFull(n) => {
                warn!("Waypoint rejected, the store already holds {} waypoints", n)
            }
            Outcome::Started(path) if path.is_empty() => {
                warn!("Trajectory started with no waypoints, holding the previous point")
            }
            Outcome::Started(path) => {
                info!("Trajectory started with {} waypoints", path.len());
                util::session::save_with_timestamp(PATH_ARCHIVE, path);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Serve the link until `stop` is set or the link fails.
pub fn run<L: CmdLink>(
    link: &mut L,
    traj: &SharedTrajectory,
    stop: &AtomicBool,
) -> Result<(), L::Error> {
    info!("Trajectory command receiver running");

    while !stop.load(Ordering::Relaxed) {
        let packet = match link.recv()? {
            Some(p) => p,
            None => continue,
        };

        let response = handle_packet(traj, &packet, Instant::now());

        link.send(&response.to_bytes())?;
    }

    info!("Trajectory command receiver stopped");

    Ok(())
}

/// Decode and execute a single packet, returning the response to send.
pub fn handle_packet(traj: &SharedTrajectory, packet: &[u8], now: Instant) -> TrajResponse {
    let cmd = match TrajCmd::from_bytes(packet) {
        Ok(c) => c,
        Err(e) => {
            warn!("Rejected trajectory packet: {}", e);
            return TrajResponse::for_parse_error(packet, &e);
        }
    };

    // The guard is dropped at the end of this statement
    let outcome = exec(&mut lock_traj(traj), &cmd, now);

    let status = outcome.status();
    debug!("Executed {:?}: {}", cmd, status);
    outcome.report();

    TrajResponse {
        opcode: cmd.opcode() as u8,
        status,
    }
}

/// Execute a command on the trajectory.
///
/// Does no logging or I/O, so it can run under the trajectory lock.
pub fn exec(traj: &mut Trajectory, cmd: &TrajCmd, now: Instant) -> Outcome {
    match cmd {
        TrajCmd::Reset => {
            traj.reset();
            Outcome::Reset
        }
        TrajCmd::Add(add) => match traj.append(TrajEntry::from(*add)) {
            Ok(appended) => Outcome::Added(appended),
            Err(TrajError::StoreFull(n)) => Outcome::StoreFull(n),
        },
        TrajCmd::Start => {
            traj.start(now);
            Outcome::Started(traj.store().entries().to_vec())
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use std::collections::VecDeque;
    use std::sync::{atomic::AtomicUsize, Arc, TryLockError};
    use std::thread::{self, ThreadId};
    use std::time::Duration;

    use comms_if::traj::{TrajAdd, TrajOpcode, NO_OPCODE};
    use thiserror::Error;

    use super::*;
    use crate::traj::{shared, TrajState, MAX_TRAJ_ENTRIES};

    /// Logger counting the records emitted by one thread while a trajectory is locked.
    struct LockWatcher {
        thread: ThreadId,
        traj: SharedTrajectory,
        logged: Arc<AtomicUsize>,
        logged_locked: Arc<AtomicUsize>,
    }

    impl log::Log for LockWatcher {
        fn enabled(&self, _: &log::Metadata) -> bool {
            true
        }

        fn log(&self, _: &log::Record) {
            if thread::current().id() != self.thread {
                return;
            }

            self.logged.fetch_add(1, Ordering::SeqCst);
            if let Err(TryLockError::WouldBlock) = self.traj.try_lock() {
                self.logged_locked.fetch_add(1, Ordering::SeqCst);
            }
        }

        fn flush(&self) {}
    }

    fn add(time_ms: u16, x: f32) -> TrajCmd {
        TrajCmd::Add(TrajAdd {
            time_from_start_ms: time_ms,
            x_m: x,
            y_m: 0.0,
            z_m: 0.0,
            vx_ms: 0.0,
            vy_ms: 0.0,
            vz_ms: 0.0,
        })
    }

    fn send(traj: &SharedTrajectory, cmd: TrajCmd, now: Instant) -> TrajResponse {
        handle_packet(traj, &cmd.to_bytes(), now)
    }

    #[test]
    fn test_upload_and_start() {
        let traj = shared(Trajectory::default());
        let t0 = Instant::now();

        for cmd in [TrajCmd::Reset, add(0, 0.0), add(1000, 10.0), TrajCmd::Start].iter() {
            let resp = send(&traj, *cmd, t0);
            assert_eq!(resp.opcode, cmd.opcode() as u8);
            assert_eq!(resp.status, TrajStatus::Ok);
        }

        let mut traj = lock_traj(&traj);
        assert_eq!(traj.state(), TrajState::Active);
        let goal = traj.current_goal(t0 + Duration::from_millis(500));
        assert!((goal.position_m.x - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_store_full() {
        let traj = shared(Trajectory::default());
        let t0 = Instant::now();

        for i in 0..MAX_TRAJ_ENTRIES {
            assert_eq!(send(&traj, add(i as u16, 0.0), t0).status, TrajStatus::Ok);
        }
        assert_eq!(
            send(&traj, add(1000, 0.0), t0),
            TrajResponse {
                opcode: TrajOpcode::Add as u8,
                status: TrajStatus::StoreFull
            }
        );

        send(&traj, TrajCmd::Reset, t0);
        assert_eq!(send(&traj, add(0, 0.0), t0).status, TrajStatus::Ok);
    }

    #[test]
    fn test_unknown_opcode() {
        let traj = shared(Trajectory::default());
        let t0 = Instant::now();
        send(&traj, add(0, 1.0), t0);

        for opcode in 3..=255u8 {
            let resp = handle_packet(&traj, &[opcode, 1, 2, 3], t0);
            assert_eq!(resp.opcode, opcode);
            assert_eq!(resp.status, TrajStatus::NotExecutable);
        }

        let traj = lock_traj(&traj);
        assert_eq!(traj.store().len(), 1);
        assert_eq!(traj.state(), TrajState::Idle);
    }

    #[test]
    fn test_malformed_packets() {
        let traj = shared(Trajectory::default());
        let t0 = Instant::now();

        assert_eq!(
            handle_packet(&traj, &[], t0),
            TrajResponse {
                opcode: NO_OPCODE,
                status: TrajStatus::NotExecutable
            }
        );

        let mut short = add(0, 1.0).to_bytes();
        short.truncate(10);
        assert_eq!(handle_packet(&traj, &short, t0).status, TrajStatus::InvalidPayload);

        assert!(lock_traj(&traj).store().is_empty());
    }

    #[test]
    fn test_reset_mid_flight() {
        let traj = shared(Trajectory::default());
        let t0 = Instant::now();

        send(&traj, add(0, 0.0), t0);
        send(&traj, add(1000, 10.0), t0);
        send(&traj, TrajCmd::Start, t0);
        send(&traj, TrajCmd::Reset, t0 + Duration::from_millis(200));

        let mut traj = lock_traj(&traj);
        assert_eq!(traj.state(), TrajState::Idle);
        assert_eq!(traj.current_goal(t0 + Duration::from_millis(300)).position_m.x, 10.0);
    }

    #[test]
    fn test_no_logging_under_lock() {
        let traj = shared(Trajectory::new(2));
        let logged = Arc::new(AtomicUsize::new(0));
        let logged_locked = Arc::new(AtomicUsize::new(0));

        log::set_boxed_logger(Box::new(LockWatcher {
            thread: thread::current().id(),
            traj: traj.clone(),
            logged: logged.clone(),
            logged_locked: logged_locked.clone(),
        }))
        .unwrap();
        log::set_max_level(log::LevelFilter::Trace);

        let t0 = Instant::now();
        let packets = vec![
            TrajCmd::Reset.to_bytes(),
            TrajCmd::Start.to_bytes(),
            add(1000, 1.0).to_bytes(),
            add(10, 2.0).to_bytes(),
            add(20, 3.0).to_bytes(),
            TrajCmd::Start.to_bytes(),
            vec![9, 0],
            vec![],
        ];
        for packet in packets.iter() {
            handle_packet(&traj, packet, t0);
        }

        assert!(logged.load(Ordering::SeqCst) >= packets.len());
        assert_eq!(logged_locked.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_exec_outcomes() {
        let mut traj = Trajectory::new(1);
        let t0 = Instant::now();

        assert_eq!(exec(&mut traj, &TrajCmd::Start, t0), Outcome::Started(Vec::new()));
        assert_eq!(
            exec(&mut traj, &add(5, 1.0), t0),
            Outcome::Added(Appended {
                index: 0,
                earlier_than_ms: None
            })
        );
        assert_eq!(exec(&mut traj, &add(6, 1.0), t0), Outcome::StoreFull(1));
        assert_eq!(Outcome::StoreFull(1).status(), TrajStatus::StoreFull);

        match exec(&mut traj, &TrajCmd::Start, t0) {
            Outcome::Started(path) => assert_eq!(path, traj.store().entries()),
            o => panic!("Unexpected outcome {:?}", o),
        }
        assert_eq!(exec(&mut traj, &TrajCmd::Reset, t0), Outcome::Reset);
        assert_eq!(traj.state(), TrajState::Idle);
    }

    #[derive(Debug, Error)]
    #[error("mock link failure")]
    struct MockError;

    /// Link replaying a fixed list of packets, then raising the stop flag.
    struct MockLink {
        rx: VecDeque<Option<Vec<u8>>>,
        tx: Vec<Vec<u8>>,
        stop: Arc<AtomicBool>,
        fail_send: bool,
    }

    impl CmdLink for MockLink {
        type Error = MockError;

        fn recv(&mut self) -> Result<Option<Vec<u8>>, MockError> {
            match self.rx.pop_front() {
                Some(p) => Ok(p),
                None => {
                    self.stop.store(true, Ordering::Relaxed);
                    Ok(None)
                }
            }
        }

        fn send(&mut self, packet: &[u8]) -> Result<(), MockError> {
            if self.fail_send {
                return Err(MockError);
            }
            self.tx.push(packet.to_vec());
            Ok(())
        }
    }

    #[test]
    fn test_run() {
        let traj = shared(Trajectory::default());
        let stop = Arc::new(AtomicBool::new(false));

        let mut link = MockLink {
            rx: vec![
                Some(TrajCmd::Reset.to_bytes()),
                None,
                Some(add(0, 1.0).to_bytes()),
                Some(vec![7]),
                Some(TrajCmd::Start.to_bytes()),
            ]
            .into_iter()
            .collect(),
            tx: Vec::new(),
            stop: stop.clone(),
            fail_send: false,
        };

        assert!(run(&mut link, &traj, &stop).is_ok());

        // One response per packet, none for the timeout
        assert_eq!(link.tx, vec![vec![0, 0], vec![1, 0], vec![7, 8], vec![2, 0]]);
        assert_eq!(lock_traj(&traj).state(), TrajState::Active);
    }

    #[test]
    fn test_run_link_failure() {
        let traj = shared(Trajectory::default());
        let stop = Arc::new(AtomicBool::new(false));

        let mut link = MockLink {
            rx: vec![Some(TrajCmd::Reset.to_bytes())].into_iter().collect(),
            tx: Vec::new(),
            stop: stop.clone(),
            fail_send: true,
        };

        assert!(run(&mut link, &traj, &stop).is_err());
    }

    #[test]
    fn test_concurrent_playback() {
        const NUM_PATHS: usize = 20;
        const PATH_LEN: u16 = 50;

        // Every waypoint of path k is at x = k
        let mut rx = VecDeque::new();
        for k in 1..=NUM_PATHS {
            rx.push_back(Some(TrajCmd::Reset.to_bytes()));
            for i in 0..PATH_LEN {
                rx.push_back(Some(add(i, k as f32).to_bytes()));
            }
            rx.push_back(Some(TrajCmd::Start.to_bytes()));
        }
        let num_packets = rx.len();

        let traj = shared(Trajectory::default());
        let stop = Arc::new(AtomicBool::new(false));
        let mut link = MockLink {
            rx,
            tx: Vec::new(),
            stop: stop.clone(),
            fail_send: false,
        };

        let receiver = {
            let traj = traj.clone();
            let stop = stop.clone();
            thread::spawn(move || {
                let result = run(&mut link, &traj, &stop);
                (result.is_ok(), link)
            })
        };

        while !stop.load(Ordering::Relaxed) {
            let x = lock_traj(&traj).current_goal(Instant::now()).position_m.x;

            assert!(
                (x - x.round()).abs() < 1e-4,
                "Goal x = {} mixes two paths",
                x
            );
            assert!(x > -1e-4 && x < NUM_PATHS as f32 + 1e-4);
        }

        let (ok, link) = receiver.join().unwrap();
        assert!(ok);
        assert_eq!(link.tx.len(), num_packets);
        assert!(link.tx.iter().all(|r| r[1] == TrajStatus::Ok as u8));

        let mut traj = lock_traj(&traj);
        assert_eq!(traj.state(), TrajState::Active);
        assert_eq!(traj.current_goal(Instant::now()).position_m.x, NUM_PATHS as f32);
    }
}
