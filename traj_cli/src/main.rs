//! # Trajectory command line
//!
//! Interactive shell sending trajectory commands to the flight control executable:
//!
//! - `reset`
//! - `add <time_from_start_ms> <x_m> <y_m> <z_m> <vx_ms> <vy_ms> <vz_ms>`
//! - `start`
//! - `upload <file.json>`: reset, then add every waypoint in the file
//! - `quit`
//!
//! The waypoint file is a JSON array of objects with the same fields as the `add` command.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::fs;
use std::iter;

use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use rustyline::{error::ReadlineError, DefaultEditor};
use structopt::StructOpt;

use comms_if::{
    net::{create_socket, zmq, SocketOptions},
    traj::{TrajAdd, TrajCmd, TrajResponse, TrajStatus},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const PROMPT: &str = "traj $ ";
const HISTORY_PATH: &str = ".traj_cli_history";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(
    name = "traj_cli",
    about = "Upload trajectories to the flight control executable"
)]
struct Opt {
    /// Endpoint of the flight control command server
    #[structopt(short, long, default_value = "tcp://localhost:5030")]
    endpoint: String,

    /// Time to wait for each response, in milliseconds
    #[structopt(short, long, default_value = "1000")]
    timeout_ms: i32,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn main() -> Result<(), Report> {
    let opt = Opt::from_args();

    let ctx = zmq::Context::new();
    let socket = create_socket(
        &ctx,
        zmq::REQ,
        &SocketOptions {
            linger: 1,
            recv_timeout: opt.timeout_ms,
            send_timeout: opt.timeout_ms,
            // Allows a new request after a lost response
            req_correlate: true,
            req_relaxed: true,
            ..Default::default()
        },
        &opt.endpoint,
    )
    .wrap_err("Could not connect to the flight control executable")?;

    println!("Connected to {}", opt.endpoint);

    let mut rl = DefaultEditor::new().wrap_err("Could not start the line editor")?;
    if rl.load_history(HISTORY_PATH).is_err() {
        println!("No history detected");
    }

    loop {
        let line = match rl.readline(PROMPT) {
            Ok(l) => l,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).wrap_err("Could not read the command line"),
        };

        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }
        rl.add_history_entry(line.as_str()).ok();

        let result = match words[0] {
            "quit" | "exit" => break,
            "upload" => match words.get(1) {
                Some(path) => upload(&socket, path),
                None => Err(eyre!("Usage: upload <file.json>")),
            },
            _ => match TrajCmd::from_iter_safe(iter::once("traj").chain(words.iter().copied())) {
                Ok(cmd) => send_cmd(&socket, &cmd).map(|r| print_response(&r)),
                // Includes help requests
                Err(e) => {
                    println!("{}", e.message);
                    Ok(())
                }
            },
        };

        if let Err(e) = result {
            println!("Error: {:?}", e);
        }
    }

    if let Err(e) = rl.save_history(HISTORY_PATH) {
        println!("Could not save history: {}", e);
    }

    println!("Exiting...");

    Ok(())
}

/// Send a single command and wait for its response.
fn send_cmd(socket: &zmq::Socket, cmd: &TrajCmd) -> Result<TrajResponse, Report> {
    socket
        .send(cmd.to_bytes(), 0)
        .wrap_err("Could not send the command")?;

    let packet = socket
        .recv_bytes(0)
        .wrap_err("No response from the flight control executable")?;

    TrajResponse::from_bytes(&packet).wrap_err("Invalid response")
}

/// Reset the trajectory then add every waypoint in the file at `path`.
fn upload(socket: &zmq::Socket, path: &str) -> Result<(), Report> {
    let json = fs::read_to_string(path).wrap_err_with(|| format!("Could not read {}", path))?;
    let waypoints: Vec<TrajAdd> =
        serde_json::from_str(&json).wrap_err_with(|| format!("Could not parse {}", path))?;

    for (i, cmd) in iter::once(TrajCmd::Reset)
        .chain(waypoints.into_iter().map(TrajCmd::Add))
        .enumerate()
    {
        let response = send_cmd(socket, &cmd)?;

        if response.status != TrajStatus::Ok {
            print_response(&response);
            return Err(eyre!("Upload stopped at command {}", i));
        }
    }

    println!("Uploaded {}", path);

    Ok(())
}

fn print_response(response: &TrajResponse) {
    println!("[opcode {}] {}", response.opcode, response.status);
}
