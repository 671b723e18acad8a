// libst95/src/protocol/codec.rs

//! Command to wire frame and wire frame to `Response`.

use crate::Result;

use super::Frame;
use super::commands::{Command, Opcode};
use super::responses::Response;

/// Encode a Command into wire bytes (opcode, length, parameters).
pub fn encode_command_frame(cmd: &Command) -> Result<Vec<u8>> {
    let payload = cmd.encode();
    Frame::encode(cmd.command_code(), &payload)
}

/// Decode wire bytes and parse the contained response for the command
/// that was sent.
pub fn decode_response_frame(opcode: Opcode, bytes: &[u8]) -> Result<Response> {
    let frame = Frame::decode(bytes)?;
    Response::decode(opcode, &frame)
}
