//! # Trajectory Command Server
//!
//! Serves the trajectory link over a zmq `REP` socket. Ground tools connect a `REQ` socket and
//! send one raw command packet per request.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::net::{create_socket, zmq, NetError, SocketOptions};

use crate::{params::FcExecParams, traj::CmdLink};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Trajectory command server
pub struct CmdServer {
    socket: zmq::Socket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CmdServerError {
    #[error("Socket error: {0}")]
    SocketError(NetError),

    #[error("Could not recieve a command: {0}")]
    RecvError(zmq::Error),

    #[error("Could not send the response: {0}")]
    SendError(zmq::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CmdServer {
    /// Create a new instance of the command server, bound to the command endpoint.
    pub fn new(ctx: &zmq::Context, params: &FcExecParams) -> Result<Self, CmdServerError> {
        let socket_options = SocketOptions {
            bind: true,
            linger: 1,
            recv_timeout: params.cmd_recv_timeout_ms,
            send_timeout: params.cmd_send_timeout_ms,
            ..Default::default()
        };

        let socket = create_socket(ctx, zmq::REP, &socket_options, &params.cmd_endpoint)
            .map_err(CmdServerError::SocketError)?;

        Ok(Self { socket })
    }
}

impl CmdLink for CmdServer {
    type Error = CmdServerError;

    fn recv(&mut self) -> Result<Option<Vec<u8>>, CmdServerError> {
        match self.socket.recv_bytes(0) {
            Ok(b) => Ok(Some(b)),
            // No message in timeout
            Err(zmq::Error::EAGAIN) => Ok(None),
            Err(e) => Err(CmdServerError::RecvError(e)),
        }
    }

    fn send(&mut self, packet: &[u8]) -> Result<(), CmdServerError> {
        self.socket
            .send(packet, 0)
            .map_err(CmdServerError::SendError)
    }
}
