// libst95/src/protocol/commands/register.rs

//! READ_REG / WRITE_REG encoders and register helpers.

use crate::constants::{REG_ARC_B, REG_TIMER_WINDOW, TIMER_WINDOW_CONFIRM};

/// Write flag: auto-increment the register index after the first byte
pub const FLAG_INCREMENT: u8 = 0x01;

/// Index of the ISO14443A entry in the ARC_B window
pub const ARC_B_INDEX_14443A: u8 = 0x01;

/// READ_REG parameters: address, count, reserved byte.
pub fn encode_read_reg(address: u8, count: u8) -> Vec<u8> {
    vec![address, count, 0x00]
}

/// WRITE_REG parameters: address, flags, data.
pub fn encode_write_reg(address: u8, flags: u8, data: &[u8]) -> Vec<u8> {
    let mut v = Vec::with_capacity(2 + data.len());
    v.push(address);
    v.push(flags);
    v.extend_from_slice(data);
    v
}

/// Point the ARC_B window at `index` so a following READ_REG returns it.
pub fn arc_b_select(index: u8) -> (u8, u8, Vec<u8>) {
    (REG_ARC_B, 0x00, vec![index])
}

/// Write `value` into the ARC_B entry at `index`.
pub fn arc_b_write(index: u8, value: u8) -> (u8, u8, Vec<u8>) {
    (REG_ARC_B, FLAG_INCREMENT, vec![index, value])
}

/// ISO14443A timer window.
pub fn timer_window(value: u8) -> (u8, u8, Vec<u8>) {
    (REG_TIMER_WINDOW, 0x00, vec![value, TIMER_WINDOW_CONFIRM])
}
