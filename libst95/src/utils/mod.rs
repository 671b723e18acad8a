// libst95/src/utils/mod.rs

//! Small helpers for hex traces and duration conversion.

pub mod hex;
pub mod timeout;

pub use hex::*;
pub use timeout::*;
