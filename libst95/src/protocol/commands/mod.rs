// libst95/src/protocol/commands/mod.rs

//! Chip command set.

pub mod idle;
pub mod register;

pub use idle::IdleParams;
pub use register::{encode_read_reg, encode_write_reg};

use crate::types::ProtocolConfig;
use crate::{Error, Result};

/// Chip opcodes.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// IDN
    Idn = 0x01,
    /// PROTOCOL
    Protocol = 0x02,
    /// SEND_RECV
    SendRecv = 0x04,
    /// IDLE
    Idle = 0x07,
    /// READ_REG
    ReadReg = 0x08,
    /// WRITE_REG
    WriteReg = 0x09,
    /// BAUDRATE
    Baudrate = 0x0A,
    /// ECHO
    Echo = 0x55,
}

impl Opcode {
    /// Command code on the wire.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Opcode {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0x01 => Ok(Opcode::Idn),
            0x02 => Ok(Opcode::Protocol),
            0x04 => Ok(Opcode::SendRecv),
            0x07 => Ok(Opcode::Idle),
            0x08 => Ok(Opcode::ReadReg),
            0x09 => Ok(Opcode::WriteReg),
            0x0A => Ok(Opcode::Baudrate),
            0x55 => Ok(Opcode::Echo),
            other => Err(Error::UnsupportedOperation(format!(
                "unknown opcode {:#04x}",
                other
            ))),
        }
    }
}

/// High-level Command enum. Each variant maps to exactly one opcode and
/// encodes its own parameter bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Chip identification
    Idn,
    /// Select a protocol or turn the field off
    Protocol(ProtocolConfig),
    /// Air payload; for ISO14443A the last byte carries the transmission
    /// flags (valid bits in last byte, CRC append).
    SendRecv {
        /// Air bytes plus the transmission flags byte
        data: Vec<u8>,
    },
    /// Enter low-power mode
    Idle(IdleParams),
    /// Read registers
    ReadReg {
        /// First register
        address: u8,
        /// Bytes to read
        count: u8,
    },
    /// Write registers
    WriteReg {
        /// First register
        address: u8,
        /// Auto-increment flag
        flags: u8,
        /// Values to write
        data: Vec<u8>,
    },
    /// Baud rate = 13.56 MHz / (2 * code + 2)
    Baudrate {
        /// Divider code
        code: u8,
    },
    /// Liveness probe
    Echo,
}

impl Command {
    /// Opcode of this command.
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::Idn => Opcode::Idn,
            Self::Protocol(_) => Opcode::Protocol,
            Self::SendRecv { .. } => Opcode::SendRecv,
            Self::Idle(_) => Opcode::Idle,
            Self::ReadReg { .. } => Opcode::ReadReg,
            Self::WriteReg { .. } => Opcode::WriteReg,
            Self::Baudrate { .. } => Opcode::Baudrate,
            Self::Echo => Opcode::Echo,
        }
    }

    /// Command code on the wire.
    pub fn command_code(&self) -> u8 {
        self.opcode().code()
    }

    /// Encode the parameter bytes that follow opcode and length.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Idn | Self::Echo => Vec::new(),
            Self::Protocol(cfg) => vec![cfg.protocol.id(), cfg.parameter_byte()],
            Self::SendRecv { data } => data.clone(),
            Self::Idle(params) => params.encode().to_vec(),
            Self::ReadReg { address, count } => encode_read_reg(*address, *count),
            Self::WriteReg {
                address,
                flags,
                data,
            } => encode_write_reg(*address, *flags, data),
            Self::Baudrate { code } => vec![*code],
        }
    }

    /// Baud rate code for the closest rate not above `baud`.
    pub fn baud_code(baud: u32) -> Result<u8> {
        if baud == 0 {
            return Err(Error::UnsupportedOperation("baud rate 0".into()));
        }
        // baud = 13_560_000 / (2 * code + 2)
        let code = 13_560_000u64.div_ceil(2 * baud as u64).saturating_sub(1);
        u8::try_from(code)
            .map_err(|_| Error::UnsupportedOperation(format!("baud rate {} too low", baud)))
    }

    /// Baud rate produced by a BAUDRATE code.
    pub fn baud_for_code(code: u8) -> u32 {
        13_560_000 / (2 * code as u32 + 2)
    }
}
