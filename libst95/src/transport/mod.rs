// libst95/src/transport/mod.rs

//! Carriers between host and chip.

pub mod mock;
#[cfg(feature = "hal")]
pub mod spi;
pub mod traits;
pub mod uart;

pub use mock::MockTransport;
#[cfg(feature = "hal")]
pub use spi::{NoIrqOut, SpiTransport};
pub use traits::Transport;
pub use uart::{SerialLink, UartTransport};
