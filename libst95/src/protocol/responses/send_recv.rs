// libst95/src/protocol/responses/send_recv.rs

//! SEND_RECV reply decoding.

use crate::constants::{RESULT_FRAME_OK, RESULT_FRAME_OK_SHORT, RESULT_NO_TAG};
use crate::protocol::Frame;
use crate::protocol::commands::Opcode;
use crate::{Error, Result};

/// Decode a SEND_RECV reply into the air payload (status trailer kept).
///
/// `0x87` is the chip reporting that no tag answered inside the frame
/// wait time and surfaces as `NoResponse`. Every other error code is a
/// `ChipError`.
pub fn decode_send_recv(frame: &Frame) -> Result<Vec<u8>> {
    match frame.code {
        RESULT_FRAME_OK | RESULT_FRAME_OK_SHORT => Ok(frame.payload.clone()),
        RESULT_NO_TAG => Err(Error::NoResponse),
        code => Err(Error::ChipError {
            command: Opcode::SendRecv.code(),
            code,
        }),
    }
}
