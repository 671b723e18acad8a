// libst95/src/protocol/parser.rs

//! Bounds-checked readers for reply payloads.

use crate::{Error, Result};

/// Ensure the slice has at least `min` bytes.
pub fn ensure_len(data: &[u8], min: usize) -> Result<()> {
    if data.len() < min {
        return Err(Error::InvalidLength {
            expected: min,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Read a single byte at `idx` with bounds checking.
pub fn byte_at(data: &[u8], idx: usize) -> Result<u8> {
    data.get(idx).copied().ok_or(Error::InvalidLength {
        expected: idx + 1,
        actual: data.len(),
    })
}

/// Split `data` into a body and a trailer of `trailer` bytes.
pub fn split_trailer(data: &[u8], trailer: usize) -> Result<(&[u8], &[u8])> {
    ensure_len(data, trailer)?;
    Ok(data.split_at(data.len() - trailer))
}

/// Bytes before the first NUL. A missing terminator is a malformed reply.
pub fn until_nul(data: &[u8]) -> Result<&[u8]> {
    let end = data
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| Error::MalformedFrame("string is not NUL terminated".into()))?;
    Ok(&data[..end])
}
