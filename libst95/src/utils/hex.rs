// libst95/src/utils/hex.rs

//! Hex rendering for wire traces and UIDs.

use std::fmt::Write;

/// Lowercase hex without separators: `&[0xde, 0xad]` -> `"dead"`.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        let _ = write!(s, "{:02x}", b);
        s
    })
}

/// Lowercase hex, one space between bytes: `&[0xde, 0xad]` -> `"de ad"`.
pub fn bytes_to_hex_spaced(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `code/len | payload` view of a chip frame. The echo byte and frames too
/// short to carry a header are rendered as plain hex.
pub fn frame_to_string(frame: &[u8]) -> String {
    match frame {
        [code, len, payload @ ..] => format!(
            "{:02x}/{:02x} | {}",
            code,
            len,
            bytes_to_hex_spaced(payload)
        ),
        other => bytes_to_hex_spaced(other),
    }
}
