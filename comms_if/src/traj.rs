//! # Trajectory command link
//!
//! This module defines the binary format of the trajectory upload link. Each request is a single
//! packet made of one opcode byte followed by a fixed layout payload:
//!
//! | Opcode | Command | Payload                                                          |
//! |--------|---------|------------------------------------------------------------------|
//! | `0`    | RESET   | none                                                             |
//! | `1`    | ADD     | `u16` time from start (ms), `f32` x, y, z, vx, vy, vz            |
//! | `2`    | START   | none                                                             |
//!
//! All multi-byte fields are little endian and packed with no padding. Every request is answered
//! with exactly one two byte response: the echoed opcode and a [`TrajStatus`] code.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::convert::TryFrom;
use std::fmt;

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use structopt::{clap::AppSettings, StructOpt};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Length of the ADD payload in bytes (not including the opcode).
pub const ADD_PAYLOAD_LEN: usize = 2 + 6 * 4;

/// Length of a response packet in bytes.
pub const RESPONSE_LEN: usize = 2;

/// Opcode byte echoed in the response to an empty request.
pub const NO_OPCODE: u8 = 0xFF;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Payload of an ADD command: a single waypoint of the trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, StructOpt)]
pub struct TrajAdd {
    /// Time of the waypoint relative to the start of playback, in milliseconds.
    pub time_from_start_ms: u16,

    /// Target x position in meters.
    pub x_m: f32,

    /// Target y position in meters.
    pub y_m: f32,

    /// Target z position in meters.
    pub z_m: f32,

    /// Target x velocity in meters/second.
    pub vx_ms: f32,

    /// Target y velocity in meters/second.
    pub vy_ms: f32,

    /// Target z velocity in meters/second.
    pub vz_ms: f32,
}

/// The response sent back for every request on the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrajResponse {
    /// Opcode byte of the request this response answers.
    pub opcode: u8,

    /// Result of executing the request.
    pub status: TrajStatus,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Opcodes recognised on the trajectory link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum TrajOpcode {
    Reset = 0,
    Add = 1,
    Start = 2,
}

/// A decoded trajectory command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, StructOpt)]
#[structopt(name = "traj")]
pub enum TrajCmd {
    /// Clear all uploaded waypoints.
    #[structopt(name = "reset")]
    Reset,

    /// Append a waypoint to the end of the uploaded trajectory.
    #[structopt(name = "add", setting = AppSettings::AllowNegativeNumbers)]
    Add(TrajAdd),

    /// Begin playing back the uploaded trajectory from now.
    #[structopt(name = "start")]
    Start,
}

/// Status codes returned in a response.
///
/// The non-zero codes match the errno values used by the flight firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum TrajStatus {
    /// The command was executed.
    Ok = 0,

    /// The opcode is not recognised (`ENOEXEC`).
    NotExecutable = 8,

    /// The waypoint store is full, no more waypoints can be added (`ENOMEM`).
    StoreFull = 12,

    /// The payload of the command is malformed (`EINVAL`).
    InvalidPayload = 22,
}

/// Errors which can occur while decoding packets from the link.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrajParseError {
    #[error("The packet is empty")]
    EmptyPacket,

    #[error("Unrecognised opcode {0:#04x}")]
    UnknownOpcode(u8),

    #[error("Payload of opcode {opcode} is too short, expected {expected} bytes, found {found}")]
    PayloadTooShort {
        opcode: u8,
        expected: usize,
        found: usize,
    },

    #[error("Expected a 2 byte response, found {0} bytes")]
    ResponseLength(usize),

    #[error("Unrecognised status code {0}")]
    UnknownStatus(u8),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TryFrom<u8> for TrajOpcode {
    type Error = TrajParseError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0 => Ok(TrajOpcode::Reset),
            1 => Ok(TrajOpcode::Add),
            2 => Ok(TrajOpcode::Start),
            b => Err(TrajParseError::UnknownOpcode(b)),
        }
    }
}

impl TrajCmd {
    /// Get the opcode of this command.
    pub fn opcode(&self) -> TrajOpcode {
        match self {
            TrajCmd::Reset => TrajOpcode::Reset,
            TrajCmd::Add(_) => TrajOpcode::Add,
            TrajCmd::Start => TrajOpcode::Start,
        }
    }

    /// Decode a command from a received packet.
    ///
    /// Bytes after the expected payload are ignored, since the link may pad packets.
    pub fn from_bytes(packet: &[u8]) -> Result<Self, TrajParseError> {
        let (&opcode, payload) = packet.split_first().ok_or(TrajParseError::EmptyPacket)?;

        match TrajOpcode::try_from(opcode)? {
            TrajOpcode::Reset => Ok(TrajCmd::Reset),
            TrajOpcode::Start => Ok(TrajCmd::Start),
            TrajOpcode::Add => {
                if payload.len() < ADD_PAYLOAD_LEN {
                    return Err(TrajParseError::PayloadTooShort {
                        opcode,
                        expected: ADD_PAYLOAD_LEN,
                        found: payload.len(),
                    });
                }

                Ok(TrajCmd::Add(TrajAdd {
                    time_from_start_ms: LittleEndian::read_u16(&payload[0..2]),
                    x_m: LittleEndian::read_f32(&payload[2..6]),
                    y_m: LittleEndian::read_f32(&payload[6..10]),
                    z_m: LittleEndian::read_f32(&payload[10..14]),
                    vx_ms: LittleEndian::read_f32(&payload[14..18]),
                    vy_ms: LittleEndian::read_f32(&payload[18..22]),
                    vz_ms: LittleEndian::read_f32(&payload[22..26]),
                }))
            }
        }
    }

    /// Encode this command into a packet.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            TrajCmd::Reset | TrajCmd::Start => vec![self.opcode() as u8],
            TrajCmd::Add(add) => {
                let mut packet = vec![0u8; 1 + ADD_PAYLOAD_LEN];
                packet[0] = TrajOpcode::Add as u8;

                LittleEndian::write_u16(&mut packet[1..3], add.time_from_start_ms);
                LittleEndian::write_f32_into(
                    &[add.x_m, add.y_m, add.z_m, add.vx_ms, add.vy_ms, add.vz_ms],
                    &mut packet[3..],
                );

                packet
            }
        }
    }
}

impl TrajStatus {
    /// The status byte sent on the link.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Get the status matching a status byte, if it is recognised.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(TrajStatus::Ok),
            8 => Some(TrajStatus::NotExecutable),
            12 => Some(TrajStatus::StoreFull),
            22 => Some(TrajStatus::InvalidPayload),
            _ => None,
        }
    }
}

impl fmt::Display for TrajStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let desc = match self {
            TrajStatus::Ok => "ok",
            TrajStatus::NotExecutable => "not executable",
            TrajStatus::StoreFull => "waypoint store full",
            TrajStatus::InvalidPayload => "invalid payload",
        };

        write!(f, "{} ({})", desc, self.code())
    }
}

impl From<&TrajParseError> for TrajStatus {
    fn from(e: &TrajParseError) -> Self {
        match e {
            TrajParseError::PayloadTooShort { .. } => TrajStatus::InvalidPayload,
            _ => TrajStatus::NotExecutable,
        }
    }
}

impl TrajResponse {
    /// Build the response to a request which could not be decoded.
    pub fn for_parse_error(packet: &[u8], error: &TrajParseError) -> Self {
        Self {
            opcode: packet.first().copied().unwrap_or(NO_OPCODE),
            status: TrajStatus::from(error),
        }
    }

    /// Encode the response into a packet.
    pub fn to_bytes(&self) -> [u8; RESPONSE_LEN] {
        [self.opcode, self.status.code()]
    }

    /// Decode a response packet.
    pub fn from_bytes(packet: &[u8]) -> Result<Self, TrajParseError> {
        if packet.len() != RESPONSE_LEN {
            return Err(TrajParseError::ResponseLength(packet.len()));
        }

        Ok(Self {
            opcode: packet[0],
            status: TrajStatus::from_code(packet[1])
                .ok_or(TrajParseError::UnknownStatus(packet[1]))?,
        })
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn add_packet() -> Vec<u8> {
        let mut packet = vec![0x01, 0xE8, 0x03];
        for v in &[10.0f32, -2.5, 1.0, 0.5, 0.0, -0.25] {
            packet.extend_from_slice(&v.to_le_bytes());
        }
        packet
    }

    #[test]
    fn test_decode_add() {
        let cmd = TrajCmd::from_bytes(&add_packet()).unwrap();

        assert_eq!(
            cmd,
            TrajCmd::Add(TrajAdd {
                time_from_start_ms: 1000,
                x_m: 10.0,
                y_m: -2.5,
                z_m: 1.0,
                vx_ms: 0.5,
                vy_ms: 0.0,
                vz_ms: -0.25,
            })
        );
        assert_eq!(cmd.to_bytes(), add_packet());
    }

    #[test]
    fn test_decode_add_with_padding() {
        let mut packet = add_packet();
        packet.extend_from_slice(&[0xAA, 0xBB, 0xCC]);

        match TrajCmd::from_bytes(&packet) {
            Ok(TrajCmd::Add(add)) => assert_eq!(add.time_from_start_ms, 1000),
            r => panic!("Expected an ADD command, got {:?}", r),
        }
    }

    #[test]
    fn test_decode_short_add() {
        let full = add_packet();
        let packet = &full[..20];

        let err = TrajCmd::from_bytes(packet).unwrap_err();
        assert_eq!(
            err,
            TrajParseError::PayloadTooShort {
                opcode: 1,
                expected: 26,
                found: 19
            }
        );

        let resp = TrajResponse::for_parse_error(packet, &err);
        assert_eq!(resp.to_bytes(), [1, 22]);
    }

    #[test]
    fn test_decode_no_payload_cmds() {
        assert_eq!(TrajCmd::from_bytes(&[0]), Ok(TrajCmd::Reset));
        assert_eq!(TrajCmd::from_bytes(&[2]), Ok(TrajCmd::Start));
        assert_eq!(TrajCmd::from_bytes(&[2, 0, 0, 0]), Ok(TrajCmd::Start));
        assert_eq!(TrajCmd::Reset.to_bytes(), vec![0]);
        assert_eq!(TrajCmd::Start.to_bytes(), vec![2]);
    }

    #[test]
    fn test_decode_unknown_opcode() {
        for op in 3..=255u8 {
            let packet = [op, 1, 2, 3];
            let err = TrajCmd::from_bytes(&packet).unwrap_err();
            assert_eq!(err, TrajParseError::UnknownOpcode(op));
            assert_eq!(
                TrajResponse::for_parse_error(&packet, &err).to_bytes(),
                [op, TrajStatus::NotExecutable.code()]
            );
        }
    }

    #[test]
    fn test_empty_packet_response() {
        let err = TrajCmd::from_bytes(&[]).unwrap_err();
        assert_eq!(err, TrajParseError::EmptyPacket);
        assert_eq!(
            TrajResponse::for_parse_error(&[], &err).to_bytes(),
            [NO_OPCODE, 8]
        );
    }

    #[test]
    fn test_response_decode() {
        assert_eq!(
            TrajResponse::from_bytes(&[1, 12]),
            Ok(TrajResponse {
                opcode: 1,
                status: TrajStatus::StoreFull
            })
        );
        assert_eq!(
            TrajResponse::from_bytes(&[1]),
            Err(TrajParseError::ResponseLength(1))
        );
        assert_eq!(
            TrajResponse::from_bytes(&[0, 99]),
            Err(TrajParseError::UnknownStatus(99))
        );
    }

    #[test]
    fn test_cli_parse() {
        assert_eq!(
            TrajCmd::from_iter_safe(&["traj", "reset"]).unwrap(),
            TrajCmd::Reset
        );

        match TrajCmd::from_iter_safe(&["traj", "add", "250", "1", "2", "3", "0", "0", "0.5"]) {
            Ok(TrajCmd::Add(add)) => {
                assert_eq!(add.time_from_start_ms, 250);
                assert_eq!(add.z_m, 3.0);
                assert_eq!(add.vz_ms, 0.5);
            }
            r => panic!("Expected an ADD command, got {:?}", r),
        }

        assert!(TrajCmd::from_iter_safe(&["traj", "fly"]).is_err());
    }

    #[test]
    fn test_waypoint_file_format() {
        let adds: Vec<TrajAdd> = serde_json::from_str(
            r#"[{"time_from_start_ms": 0, "x_m": 0, "y_m": 0, "z_m": 0.5,
                 "vx_ms": 0, "vy_ms": 0, "vz_ms": 0}]"#,
        )
        .unwrap();

        assert_eq!(adds.len(), 1);
        assert_eq!(adds[0].z_m, 0.5);
    }
}
