// libst95/src/protocol/frame.rs

//! `code, len, payload` frames and the lone echo byte.

use crate::constants::{ECHO_BYTE, MAX_DATA_BYTES};
use crate::{Error, Result};

/// ST95 frame helper. Provides encode/decode of the chip envelope
/// Format: [Code(1)] [Len(1)] [Payload(n)]
/// Code is the command opcode host->chip and the result code chip->host.
/// The echo exchange is the single byte 0x55 without a length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command or result code
    pub code: u8,
    /// Payload, at most 254 bytes
    pub payload: Vec<u8>,
}

impl Frame {
    /// Frame from its parts. Length is checked on encode.
    pub fn new(code: u8, payload: Vec<u8>) -> Self {
        Self { code, payload }
    }

    /// The one-byte echo frame.
    pub fn echo() -> Self {
        Self::new(ECHO_BYTE, Vec::new())
    }

    /// True for the lone echo byte.
    pub fn is_echo(&self) -> bool {
        self.code == ECHO_BYTE && self.payload.is_empty()
    }

    /// Encode a code and payload into wire bytes
    pub fn encode(code: u8, payload: &[u8]) -> Result<Vec<u8>> {
        if payload.len() > MAX_DATA_BYTES {
            return Err(Error::InvalidLength {
                expected: MAX_DATA_BYTES,
                actual: payload.len(),
            });
        }
        if code == ECHO_BYTE && payload.is_empty() {
            return Ok(vec![ECHO_BYTE]);
        }

        let mut out = Vec::with_capacity(2 + payload.len());
        out.push(code);
        out.push(payload.len() as u8);
        out.extend_from_slice(payload);
        Ok(out)
    }

    /// Encode this frame into wire bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Self::encode(self.code, &self.payload)
    }

    /// Decode wire bytes into a frame. The declared length must match the
    /// bytes present exactly.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        match bytes {
            [] => Err(Error::MalformedFrame("empty frame".into())),
            [ECHO_BYTE] => Ok(Self::echo()),
            [_] => Err(Error::MalformedFrame("missing length byte".into())),
            [code, len, payload @ ..] => {
                let len = *len as usize;
                if len > MAX_DATA_BYTES {
                    return Err(Error::MalformedFrame(format!(
                        "declared length {} exceeds {}",
                        len, MAX_DATA_BYTES
                    )));
                }
                if payload.len() != len {
                    return Err(Error::MalformedFrame(format!(
                        "declared length {} but {} bytes received",
                        len,
                        payload.len()
                    )));
                }
                Ok(Self::new(*code, payload.to_vec()))
            }
        }
    }
}
