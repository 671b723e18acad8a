// libst95/src/transport/traits.rs

//! Carrier abstraction.

use crate::types::Interface;
use crate::{Error, Result};

/// Transport trait abstracts the carrier (UART or SPI) away from the
/// command engine.
///
/// `send` takes one complete wire frame. `receive` returns one complete wire
/// frame: `code, len, payload`, or the lone echo byte `0x55`. The carrier is
/// responsible for reading exactly as many bytes as the length byte
/// announces.
pub trait Transport {
    /// Send one raw frame to the chip
    fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive one raw frame, waiting at most `timeout_ms` for it to start
    fn receive(&mut self, timeout_ms: u64) -> Result<Vec<u8>>;

    /// Which carrier this is
    fn interface(&self) -> Interface;

    /// Carrier-level reset (SPI control 0x01, UART input flush)
    fn reset(&mut self) -> Result<()>;

    /// Pulse the chip's IRQ_IN line to leave low-power mode.
    fn wake(&mut self) -> Result<()> {
        Ok(())
    }

    /// Retune the host side after a BAUDRATE command. Only UART carriers
    /// support this.
    fn set_baud_rate(&mut self, _baud: u32) -> Result<()> {
        Err(Error::UnsupportedOperation(format!(
            "baud rate change on {:?} carrier",
            self.interface()
        )))
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        (**self).send(data)
    }

    fn receive(&mut self, timeout_ms: u64) -> Result<Vec<u8>> {
        (**self).receive(timeout_ms)
    }

    fn interface(&self) -> Interface {
        (**self).interface()
    }

    fn reset(&mut self) -> Result<()> {
        (**self).reset()
    }

    fn wake(&mut self) -> Result<()> {
        (**self).wake()
    }

    fn set_baud_rate(&mut self, baud: u32) -> Result<()> {
        (**self).set_baud_rate(baud)
    }
}
