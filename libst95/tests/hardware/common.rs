#![cfg(feature = "serial")]

//! Helpers for tests against a real ST95 board on a serial port.
//!
//! The port is taken from `ST95_PORT`. Without it (CI) the helpers return
//! `Ok(None)` and the tests pass without touching hardware.

use libst95::device::{Device, Initialized};
use libst95::transport::UartTransport;

/// Open the board named by `ST95_PORT` and run the power-up sequence.
pub fn open_and_initialize_device() -> anyhow::Result<Option<Device<Initialized>>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let Ok(path) = std::env::var("ST95_PORT") else {
        return Ok(None);
    };
    let transport = UartTransport::open(&path)?;
    let device = Device::new_with_transport(Box::new(transport))?;
    Ok(Some(device.initialize()?))
}
