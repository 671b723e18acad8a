// libst95/src/lib.rs

//! libst95
//!
//! Pure Rust driver for ST95 family (CR95HF / ST95HF) contactless
//! transceivers: framing over UART or SPI, timeout supervision, the chip's
//! command set, protocol selection and ISO14443A UID acquisition.
#![warn(missing_docs)]

pub mod config;
pub mod constants;
pub mod device;
pub mod error;
pub mod host;
pub mod iso14443a;
pub mod prelude;
pub mod protocol;
pub mod selector;
#[doc(hidden)]
pub mod test_support;
pub mod timing;
pub mod transport;
pub mod types;
pub mod utils;

// Re-export common types at crate root so `crate::Error`, `crate::Result`,
// and the newtypes in `types` are available for consumers.
pub use crate::error::*;
pub use crate::types::*;

pub use prelude::*;
