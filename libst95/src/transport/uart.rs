// libst95/src/transport/uart.rs

//! UART carrier.
//!
//! The chip answers with `code, len, payload` (or the lone echo byte). Only
//! the first byte may take up to the caller's timeout; every following byte
//! has to arrive within the inter-byte budget or the frame is truncated.

use std::time::Duration;

use crate::config::St95Config;
use crate::constants::ECHO_BYTE;
use crate::transport::traits::Transport;
use crate::types::Interface;
use crate::utils::{frame_to_string, ms, us};
use crate::{Error, Result};

/// Byte-level serial link the UART carrier runs on.
pub trait SerialLink {
    /// Write and flush `data`.
    fn write_all(&mut self, data: &[u8]) -> Result<()>;

    /// Read one byte, `Ok(None)` when nothing arrived within `timeout`.
    fn read_byte(&mut self, timeout: Duration) -> Result<Option<u8>>;

    /// Retune the host side of the link.
    fn set_baud_rate(&mut self, baud: u32) -> Result<()>;

    /// Drop any unread input.
    fn clear_input(&mut self) -> Result<()>;
}

#[cfg(feature = "serial")]
impl SerialLink for Box<dyn serialport::SerialPort> {
    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        std::io::Write::write_all(self, data)?;
        std::io::Write::flush(self)?;
        Ok(())
    }

    fn read_byte(&mut self, timeout: Duration) -> Result<Option<u8>> {
        self.set_timeout(timeout)?;
        let mut buf = [0u8; 1];
        match std::io::Read::read(self, &mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(e)
                if e.kind() == std::io::ErrorKind::TimedOut
                    || e.kind() == std::io::ErrorKind::WouldBlock =>
            {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn set_baud_rate(&mut self, baud: u32) -> Result<()> {
        serialport::SerialPort::set_baud_rate(self.as_mut(), baud)?;
        Ok(())
    }

    fn clear_input(&mut self) -> Result<()> {
        self.clear(serialport::ClearBuffer::Input)?;
        Ok(())
    }
}

/// ST95 framing over a [`SerialLink`].
pub struct UartTransport<L: SerialLink> {
    link: L,
    inter_byte: Duration,
    baud: u32,
}

impl<L: SerialLink> UartTransport<L> {
    /// Carrier with the default configuration's baud rate and inter-byte
    /// budget.
    pub fn new(link: L) -> Self {
        Self::from_config(link, &St95Config::default())
    }

    /// Carrier using `config.uart_inter_byte_timeout_us`. The link must
    /// already run at `config.uart_baud`.
    pub fn from_config(link: L, config: &St95Config) -> Self {
        Self {
            link,
            inter_byte: us(config.uart_inter_byte_timeout_us as u64),
            baud: config.uart_baud,
        }
    }

    /// Override the inter-byte budget.
    pub fn with_inter_byte_timeout_us(mut self, micros: u32) -> Self {
        self.inter_byte = us(micros as u64);
        self
    }

    /// Baud rate the host side currently runs at.
    pub fn baud(&self) -> u32 {
        self.baud
    }

    /// Borrow the underlying link.
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Give back the underlying link.
    pub fn into_inner(self) -> L {
        self.link
    }

    fn next_byte(&mut self, got: &[u8]) -> Result<u8> {
        match self.link.read_byte(self.inter_byte)? {
            Some(b) => Ok(b),
            None => Err(Error::MalformedFrame(format!(
                "truncated frame after {} byte(s): {}",
                got.len(),
                frame_to_string(got)
            ))),
        }
    }
}

#[cfg(feature = "serial")]
impl UartTransport<Box<dyn serialport::SerialPort>> {
    /// Open `path` at the chip's power-up baud rate.
    pub fn open(path: &str) -> Result<Self> {
        Self::open_with_config(path, &St95Config::default())
    }

    /// Open `path` at `config.uart_baud` with the configured inter-byte
    /// budget.
    pub fn open_with_config(path: &str, config: &St95Config) -> Result<Self> {
        let port = serialport::new(path, config.uart_baud)
            .timeout(ms(10))
            .open()?;
        Ok(Self::from_config(port, config))
    }
}

impl<L: SerialLink> Transport for UartTransport<L> {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        log::trace!("uart tx: {}", frame_to_string(data));
        self.link.write_all(data)
    }

    fn receive(&mut self, timeout_ms: u64) -> Result<Vec<u8>> {
        let first = self.link.read_byte(ms(timeout_ms))?.ok_or(Error::NoResponse)?;
        if first == ECHO_BYTE {
            log::trace!("uart rx: 55");
            return Ok(vec![ECHO_BYTE]);
        }

        let mut frame = vec![first];
        let len = self.next_byte(&frame)?;
        frame.push(len);
        for _ in 0..len {
            let b = self.next_byte(&frame)?;
            frame.push(b);
        }
        log::trace!("uart rx: {}", frame_to_string(&frame));
        Ok(frame)
    }

    fn interface(&self) -> Interface {
        Interface::Uart
    }

    fn reset(&mut self) -> Result<()> {
        self.link.clear_input()
    }

    /// A 0x00 byte on RX pulls IRQ_IN low long enough to wake the chip.
    fn wake(&mut self) -> Result<()> {
        self.link.write_all(&[0x00])
    }

    fn set_baud_rate(&mut self, baud: u32) -> Result<()> {
        self.link.set_baud_rate(baud)?;
        self.baud = baud;
        log::debug!("uart host side now at {} baud", baud);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedSerial;

    #[test]
    fn receives_complete_frame() {
        let link = ScriptedSerial::with_bytes(&[0x00, 0x02, 0xAB, 0xCD]);
        let mut t = UartTransport::new(link);
        assert_eq!(t.receive(10).unwrap(), vec![0x00, 0x02, 0xAB, 0xCD]);
    }

    #[test]
    fn echo_byte_is_a_frame_on_its_own() {
        let link = ScriptedSerial::with_bytes(&[0x55, 0x00]);
        let mut t = UartTransport::new(link);
        assert_eq!(t.receive(10).unwrap(), vec![0x55]);
    }

    #[test]
    fn nothing_received_is_no_response() {
        let mut t = UartTransport::new(ScriptedSerial::default());
        assert!(matches!(t.receive(10), Err(Error::NoResponse)));
    }

    #[test]
    fn inter_byte_gap_truncates_frame() {
        let mut link = ScriptedSerial::with_bytes(&[0x80, 0x05, 0x04]);
        link.push_gap();
        link.push_bytes(&[0x00, 0x28]);
        let mut t = UartTransport::new(link);
        match t.receive(10) {
            Err(Error::MalformedFrame(msg)) => assert!(msg.contains("truncated")),
            other => panic!("expected MalformedFrame, got {:?}", other),
        }
    }

    #[test]
    fn inter_byte_reads_use_configured_budget() {
        let link = ScriptedSerial::with_bytes(&[0x00, 0x00]);
        let mut t = UartTransport::new(link).with_inter_byte_timeout_us(250);
        t.receive(7).unwrap();
        assert_eq!(
            t.link().timeouts,
            vec![Duration::from_millis(7), Duration::from_micros(250)]
        );
    }

    #[test]
    fn from_config_takes_budget_and_baud() {
        let mut cfg = St95Config::default();
        cfg.uart_inter_byte_timeout_us = 300;
        cfg.uart_baud = 115_200;
        let link = ScriptedSerial::with_bytes(&[0x00, 0x00]);
        let mut t = UartTransport::from_config(link, &cfg);
        assert_eq!(t.baud(), 115_200);
        t.receive(5).unwrap();
        assert_eq!(
            t.link().timeouts,
            vec![Duration::from_millis(5), Duration::from_micros(300)]
        );
    }

    #[test]
    fn default_carrier_uses_chip_defaults() {
        let link = ScriptedSerial::with_bytes(&[0x00, 0x00]);
        let mut t = UartTransport::new(link);
        assert_eq!(t.baud(), 57_600);
        t.receive(1).unwrap();
        assert_eq!(t.link().timeouts[1], Duration::from_micros(500));
    }

    #[test]
    fn wake_writes_zero_byte_and_baud_retunes() {
        let mut t = UartTransport::new(ScriptedSerial::default());
        t.wake().unwrap();
        t.set_baud_rate(115_200).unwrap();
        assert_eq!(t.baud(), 115_200);
        let link = t.into_inner();
        assert_eq!(link.written, vec![0x00]);
        assert_eq!(link.baud, Some(115_200));
    }
}
