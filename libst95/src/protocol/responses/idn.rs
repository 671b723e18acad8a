// libst95/src/protocol/responses/idn.rs

//! IDN reply: NUL-terminated name followed by the ROM CRC.

use crate::protocol::parser;
use crate::types::ChipId;
use crate::Result;

/// Decode an IDN payload
/// Layout: name(ASCII, NUL terminated) + rom_crc(2, big endian)
pub fn decode_idn(data: &[u8]) -> Result<ChipId> {
    // at least one name byte, the NUL and the CRC
    parser::ensure_len(data, 3)?;

    let (name_part, crc_part) = parser::split_trailer(data, 2)?;
    let name = String::from_utf8_lossy(parser::until_nul(name_part)?).into_owned();
    let rom_crc = u16::from_be_bytes([crc_part[0], crc_part[1]]);

    Ok(ChipId { name, rom_crc })
}
