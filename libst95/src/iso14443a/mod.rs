// libst95/src/iso14443a/mod.rs

//! ISO14443A air frames as handed to SEND_RECV.
//!
//! The last byte of every outgoing frame is the chip's transmission flag
//! byte: bits 3:0 give the number of valid bits in the last air byte, bit 5
//! asks the chip to append CRC_A. Replies end with a 3-byte status trailer.

pub mod anticollision;

pub use anticollision::{AnticollisionState, ScanOutcome, acquire};

use crate::protocol::parser;
use crate::{Error, Result};

/// REQA short frame command
pub const REQA: u8 = 0x26;

/// First UID byte of a partial UID
pub const CASCADE_TAG: u8 = 0x88;

/// NVB for ANTICOL with no known UID bits
pub const NVB_ANTICOL: u8 = 0x20;

/// NVB for SELECT with the full 40 bits
pub const NVB_SELECT: u8 = 0x70;

/// 7-bit short frame, no CRC
pub const TX_SHORT_FRAME: u8 = 0x07;

/// 8 valid bits, no CRC
pub const TX_8_BITS: u8 = 0x08;

/// 8 valid bits, append CRC
pub const TX_8_BITS_CRC: u8 = 0x28;

/// Length of the status trailer on 14443A replies
pub const RX_TRAILER_LEN: usize = 3;

/// ISO14443A cascade level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CascadeLevel {
    /// SEL 0x93
    One,
    /// SEL 0x95
    Two,
    /// SEL 0x97
    Three,
}

impl CascadeLevel {
    /// SEL byte for ANTICOL and SELECT at this level.
    pub fn sel(self) -> u8 {
        match self {
            CascadeLevel::One => 0x93,
            CascadeLevel::Two => 0x95,
            CascadeLevel::Three => 0x97,
        }
    }

    /// Level number, 1 to 3.
    pub fn number(self) -> u8 {
        match self {
            CascadeLevel::One => 1,
            CascadeLevel::Two => 2,
            CascadeLevel::Three => 3,
        }
    }

    /// Level after this one, `None` at level 3.
    pub fn next(self) -> Option<Self> {
        match self {
            CascadeLevel::One => Some(CascadeLevel::Two),
            CascadeLevel::Two => Some(CascadeLevel::Three),
            CascadeLevel::Three => None,
        }
    }
}

/// XOR of the four UID bytes of one cascade level.
pub fn bcc(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, b| acc ^ b)
}

/// REQA sent as a 7-bit short frame.
pub fn reqa_frame() -> Vec<u8> {
    vec![REQA, TX_SHORT_FRAME]
}

/// ANTICOL for `level` with NVB 0x20.
pub fn anticol_frame(level: CascadeLevel) -> Vec<u8> {
    vec![level.sel(), NVB_ANTICOL, TX_8_BITS]
}

/// SELECT for `level` with the four UID bytes, BCC and CRC.
pub fn select_frame(level: CascadeLevel, uid: &[u8; 4]) -> Vec<u8> {
    let mut v = Vec::with_capacity(8);
    v.push(level.sel());
    v.push(NVB_SELECT);
    v.extend_from_slice(uid);
    v.push(bcc(uid));
    v.push(TX_8_BITS_CRC);
    v
}

/// Status trailer the chip appends to every 14443A reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxStatus {
    /// Error flags and significant bits of the last byte
    pub flags: u8,
    /// Byte index of the first collision
    pub collision_byte: u8,
    /// Bit index of the first collision
    pub collision_bit: u8,
}

impl RxStatus {
    /// Collision detected
    pub const COLLISION: u8 = 0x80;
    /// CRC mismatch
    pub const CRC_ERROR: u8 = 0x20;

    /// True when the chip saw a collision.
    pub fn collision(&self) -> bool {
        self.flags & Self::COLLISION != 0
    }

    /// True when the CRC check failed.
    pub fn crc_error(&self) -> bool {
        self.flags & Self::CRC_ERROR != 0
    }

    /// Valid bits in the last received byte.
    pub fn significant_bits(&self) -> u8 {
        self.flags & 0x0F
    }
}

/// Split a SEND_RECV reply into air bytes and the status trailer.
pub fn split_reply(reply: &[u8]) -> Result<(&[u8], RxStatus)> {
    let (body, trailer) = parser::split_trailer(reply, RX_TRAILER_LEN)?;
    Ok((
        body,
        RxStatus {
            flags: trailer[0],
            collision_byte: trailer[1],
            collision_bit: trailer[2],
        },
    ))
}

/// Split a reply and require exactly `len` air bytes.
pub fn expect_body(reply: &[u8], len: usize) -> Result<(&[u8], RxStatus)> {
    let (body, status) = split_reply(reply)?;
    if body.len() != len {
        return Err(Error::InvalidLength {
            expected: len,
            actual: body.len(),
        });
    }
    Ok((body, status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_match_wire_format() {
        assert_eq!(reqa_frame(), vec![0x26, 0x07]);
        assert_eq!(anticol_frame(CascadeLevel::One), vec![0x93, 0x20, 0x08]);
        assert_eq!(anticol_frame(CascadeLevel::Three), vec![0x97, 0x20, 0x08]);
        assert_eq!(
            select_frame(CascadeLevel::Two, &[0x88, 0x04, 0x2B, 0x6A]),
            vec![0x95, 0x70, 0x88, 0x04, 0x2B, 0x6A, 0x88 ^ 0x04 ^ 0x2B ^ 0x6A, 0x28]
        );
    }

    #[test]
    fn bcc_is_xor() {
        assert_eq!(bcc(&[0x88, 0x02, 0xF7, 0xA5]), 0xD8);
        assert_eq!(bcc(&[]), 0x00);
    }

    #[test]
    fn cascade_levels_advance_to_three() {
        assert_eq!(CascadeLevel::One.next(), Some(CascadeLevel::Two));
        assert_eq!(CascadeLevel::Two.next(), Some(CascadeLevel::Three));
        assert_eq!(CascadeLevel::Three.next(), None);
        assert_eq!(CascadeLevel::Two.number(), 2);
    }

    #[test]
    fn split_reply_reads_trailer() {
        let (body, st) = split_reply(&[0x44, 0x00, 0x28, 0x00, 0x00]).unwrap();
        assert_eq!(body, &[0x44, 0x00]);
        assert!(!st.collision());
        assert!(st.crc_error());
        assert_eq!(st.significant_bits(), 8);

        let (_, st) = split_reply(&[0x12, 0x34, 0xA8, 0x01, 0x03]).unwrap();
        assert!(st.collision());
        assert_eq!(st.collision_byte, 0x01);
        assert_eq!(st.collision_bit, 0x03);
    }

    #[test]
    fn expect_body_checks_length() {
        assert!(expect_body(&[0x44, 0x00, 0x28, 0x00, 0x00], 2).is_ok());
        assert!(matches!(
            expect_body(&[0x44, 0x28, 0x00, 0x00], 2),
            Err(Error::InvalidLength { expected: 2, actual: 1 })
        ));
        assert!(split_reply(&[0x00, 0x00]).is_err());
    }
}
