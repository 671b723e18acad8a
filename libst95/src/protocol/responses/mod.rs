// libst95/src/protocol/responses/mod.rs

//! Typed chip responses.

pub mod idn;
pub mod send_recv;

pub use idn::decode_idn;
pub use send_recv::decode_send_recv;

use crate::constants::{ECHO_BYTE, RESULT_OK};
use crate::protocol::Frame;
use crate::protocol::commands::Opcode;
use crate::protocol::parser;
use crate::types::{ChipId, WakeupSource};
use crate::{Error, Result};

/// High-level Response enum. Per-command decoders live in
/// `protocol::responses::<name>.rs` and are dispatched here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Chip name and ROM CRC
    Idn(ChipId),
    /// Protocol accepted
    Protocol,
    /// Air reply including the chip's status trailer.
    SendRecv {
        /// Air bytes and trailer
        data: Vec<u8>,
    },
    /// The chip woke up
    Idle {
        /// Why it woke up
        wakeup: WakeupSource,
    },
    /// Register values
    ReadReg {
        /// Bytes read
        values: Vec<u8>,
    },
    /// Register write accepted
    WriteReg,
    /// Baud rate switch acknowledged
    Baudrate,
    /// Echo byte received
    Echo,
}

impl Response {
    /// Decode a response frame for the command that produced it.
    pub fn decode(opcode: Opcode, frame: &Frame) -> Result<Self> {
        match opcode {
            Opcode::Echo | Opcode::Baudrate => {
                if !frame.is_echo() {
                    return Err(Error::UnexpectedResponse {
                        expected: ECHO_BYTE,
                        actual: frame.code,
                    });
                }
                Ok(if opcode == Opcode::Echo {
                    Self::Echo
                } else {
                    Self::Baudrate
                })
            }
            Opcode::SendRecv => Ok(Self::SendRecv {
                data: decode_send_recv(frame)?,
            }),
            Opcode::Idn => {
                expect_ok(opcode, frame)?;
                Ok(Self::Idn(decode_idn(&frame.payload)?))
            }
            Opcode::Protocol => expect_ok(opcode, frame).map(|_| Self::Protocol),
            Opcode::Idle => {
                expect_ok(opcode, frame)?;
                let b = parser::byte_at(&frame.payload, 0)?;
                Ok(Self::Idle {
                    wakeup: WakeupSource::from(b),
                })
            }
            Opcode::ReadReg => {
                expect_ok(opcode, frame)?;
                Ok(Self::ReadReg {
                    values: frame.payload.clone(),
                })
            }
            Opcode::WriteReg => expect_ok(opcode, frame).map(|_| Self::WriteReg),
        }
    }

    /// Opcode of the command this response answers.
    pub fn opcode(&self) -> Opcode {
        match self {
            Response::Idn(_) => Opcode::Idn,
            Response::Protocol => Opcode::Protocol,
            Response::SendRecv { .. } => Opcode::SendRecv,
            Response::Idle { .. } => Opcode::Idle,
            Response::ReadReg { .. } => Opcode::ReadReg,
            Response::WriteReg => Opcode::WriteReg,
            Response::Baudrate => Opcode::Baudrate,
            Response::Echo => Opcode::Echo,
        }
    }
}

/// Result code 0x00 or the chip's error code surfaced as `ChipError`.
fn expect_ok(opcode: Opcode, frame: &Frame) -> Result<()> {
    if frame.is_echo() {
        return Err(Error::UnexpectedResponse {
            expected: RESULT_OK,
            actual: frame.code,
        });
    }
    if frame.code != RESULT_OK {
        return Err(Error::ChipError {
            command: opcode.code(),
            code: frame.code,
        });
    }
    Ok(())
}
