// libst95/src/error.rs

//! Driver error type.

use thiserror::Error;

/// Common error type for every layer of the driver.
#[derive(Error, Debug)]
pub enum Error {
    /// Nothing (or nothing complete) arrived before the deadline, or the
    /// chip reported that no tag answered.
    #[error("no response before deadline")]
    NoResponse,

    /// Declared and received length disagree, or a byte broke the framing.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Bytes required
        expected: usize,
        /// Bytes present
        actual: usize,
    },

    #[error("unexpected response code: expected {expected:#04x}, got {actual:#04x}")]
    UnexpectedResponse {
        /// Code the command expects
        expected: u8,
        /// Code that arrived
        actual: u8,
    },

    /// The chip rejected a command or reported a receive error on the air
    /// interface.
    #[error("chip error for command {command:#04x}: status={code:#04x}")]
    ChipError {
        /// Command the chip rejected
        command: u8,
        /// Result code it sent
        code: u8,
    },

    /// The cascade could not resolve one consistent UID.
    #[error("anticollision failed at level {level}: {reason}")]
    AnticollisionFailed {
        /// Cascade level, 1 to 3
        level: u8,
        /// What went wrong
        reason: String,
    },

    /// Echo probe failed on every attempt. The session is unusable until the
    /// field is cycled.
    #[error("device fault: chip does not answer echo")]
    DeviceFault,

    /// Operation not allowed in the current state.
    #[error("invalid device state: {0}")]
    InvalidState(String),

    /// Unknown code, disabled protocol or a carrier without the feature.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Carrier I/O failed.
    #[error("transport i/o error: {0}")]
    Io(String),

    /// Serial port failure.
    #[cfg(feature = "serial")]
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// One-byte code used in host replies. `0x00` and `0x01` are reserved
    /// for "ok" and "no tag".
    pub fn code(&self) -> u8 {
        match self {
            Error::NoResponse => 0x10,
            Error::MalformedFrame(_) => 0x11,
            Error::InvalidLength { .. } => 0x12,
            Error::UnexpectedResponse { .. } => 0x13,
            Error::ChipError { .. } => 0x14,
            Error::AnticollisionFailed { .. } => 0x15,
            Error::DeviceFault => 0x16,
            Error::InvalidState(_) => 0x17,
            Error::UnsupportedOperation(_) => 0x18,
            Error::Io(_) => 0x19,
            #[cfg(feature = "serial")]
            Error::Serial(_) => 0x19,
        }
    }

    /// True for errors that mean the bytes on the wire could not be trusted.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Error::MalformedFrame(_) | Error::InvalidLength { .. } | Error::UnexpectedResponse { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => Error::NoResponse,
            _ => Error::Io(err.to_string()),
        }
    }
}
