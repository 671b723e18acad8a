// libst95/src/transport/spi.rs

//! SPI carrier over `embedded-hal` 1.0.
//!
//! Every transaction starts with a control byte: 0x00 send, 0x01 reset,
//! 0x02 read, 0x03 poll. Data-ready is IRQ_OUT going low, or bit 3 of the
//! poll flags when no IRQ_OUT pin is wired.

use std::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use embedded_hal::spi::SpiBus;

use crate::constants::{
    ECHO_BYTE, MAX_DATA_BYTES, SPI_CTRL_POLL, SPI_CTRL_READ, SPI_CTRL_RESET, SPI_CTRL_SEND,
    SPI_FLAG_DATA_READY,
};
use crate::transport::traits::Transport;
use crate::types::Interface;
use crate::utils::bytes_to_hex_spaced;
use crate::{Error, Result};

/// Width of the IRQ_IN low pulse that wakes the chip
const WAKE_PULSE_US: u32 = 10;

/// Placeholder for boards without an IRQ_OUT line. Data-ready is polled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIrqOut;

impl ErrorType for NoIrqOut {
    type Error = Infallible;
}

impl InputPin for NoIrqOut {
    fn is_high(&mut self) -> core::result::Result<bool, Infallible> {
        Ok(true)
    }

    fn is_low(&mut self) -> core::result::Result<bool, Infallible> {
        Ok(false)
    }
}

fn hal_err<E: core::fmt::Debug>(e: E) -> Error {
    Error::Io(format!("{:?}", e))
}

/// ST95 framing over an SPI bus with control bytes.
pub struct SpiTransport<SPI, CS, IRQIN, IRQOUT, D> {
    spi: SPI,
    cs: CS,
    irq_in: IRQIN,
    irq_out: Option<IRQOUT>,
    delay: D,
}

impl<SPI, CS, IRQIN, D> SpiTransport<SPI, CS, IRQIN, NoIrqOut, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    IRQIN: OutputPin,
    D: DelayNs,
{
    /// Carrier that polls the chip's flags for data-ready.
    pub fn polling(spi: SPI, cs: CS, irq_in: IRQIN, delay: D) -> Self {
        Self {
            spi,
            cs,
            irq_in,
            irq_out: None,
            delay,
        }
    }
}

impl<SPI, CS, IRQIN, IRQOUT, D> SpiTransport<SPI, CS, IRQIN, IRQOUT, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    IRQIN: OutputPin,
    IRQOUT: InputPin,
    D: DelayNs,
{
    /// Carrier that watches IRQ_OUT for data-ready.
    pub fn new(spi: SPI, cs: CS, irq_in: IRQIN, irq_out: IRQOUT, delay: D) -> Self {
        Self {
            spi,
            cs,
            irq_in,
            irq_out: Some(irq_out),
            delay,
        }
    }

    /// Give back the bus, pins and delay.
    pub fn release(self) -> (SPI, CS, IRQIN, Option<IRQOUT>, D) {
        (self.spi, self.cs, self.irq_in, self.irq_out, self.delay)
    }

    /// Run `f` with chip select asserted. CS is released even when `f`
    /// fails.
    fn selected<T>(&mut self, f: impl FnOnce(&mut SPI) -> Result<T>) -> Result<T> {
        self.cs.set_low().map_err(hal_err)?;
        let res = f(&mut self.spi).and_then(|v| {
            self.spi.flush().map_err(hal_err)?;
            Ok(v)
        });
        self.cs.set_high().map_err(hal_err)?;
        res
    }

    fn data_ready(&mut self) -> Result<bool> {
        if let Some(pin) = self.irq_out.as_mut() {
            return pin.is_low().map_err(hal_err);
        }
        let flags = self.selected(|spi| {
            spi.write(&[SPI_CTRL_POLL]).map_err(hal_err)?;
            let mut f = [0u8; 1];
            spi.read(&mut f).map_err(hal_err)?;
            Ok(f[0])
        })?;
        Ok(flags & SPI_FLAG_DATA_READY != 0)
    }
}

impl<SPI, CS, IRQIN, IRQOUT, D> Transport for SpiTransport<SPI, CS, IRQIN, IRQOUT, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    IRQIN: OutputPin,
    IRQOUT: InputPin,
    D: DelayNs,
{
    fn send(&mut self, data: &[u8]) -> Result<()> {
        log::trace!("spi tx: {}", bytes_to_hex_spaced(data));
        self.selected(|spi| {
            spi.write(&[SPI_CTRL_SEND]).map_err(hal_err)?;
            spi.write(data).map_err(hal_err)
        })
    }

    fn receive(&mut self, timeout_ms: u64) -> Result<Vec<u8>> {
        let mut waited = 0u64;
        while !self.data_ready()? {
            if waited >= timeout_ms {
                return Err(Error::NoResponse);
            }
            self.delay.delay_ms(1);
            waited += 1;
        }

        let frame = self.selected(|spi| {
            spi.write(&[SPI_CTRL_READ]).map_err(hal_err)?;
            let mut head = [0u8; 1];
            spi.read(&mut head).map_err(hal_err)?;
            if head[0] == ECHO_BYTE {
                return Ok(vec![ECHO_BYTE]);
            }
            let mut len = [0u8; 1];
            spi.read(&mut len).map_err(hal_err)?;
            let n = len[0] as usize;
            if n > MAX_DATA_BYTES {
                return Err(Error::MalformedFrame(format!(
                    "length byte {} exceeds {}",
                    n, MAX_DATA_BYTES
                )));
            }
            let mut frame = vec![0u8; 2 + n];
            frame[0] = head[0];
            frame[1] = len[0];
            spi.read(&mut frame[2..]).map_err(hal_err)?;
            Ok(frame)
        })?;
        log::trace!("spi rx: {}", bytes_to_hex_spaced(&frame));
        Ok(frame)
    }

    fn interface(&self) -> Interface {
        Interface::Spi
    }

    fn reset(&mut self) -> Result<()> {
        self.selected(|spi| spi.write(&[SPI_CTRL_RESET]).map_err(hal_err))
    }

    fn wake(&mut self) -> Result<()> {
        self.irq_in.set_low().map_err(hal_err)?;
        self.delay.delay_us(WAKE_PULSE_US);
        self.irq_in.set_high().map_err(hal_err)
    }
}
