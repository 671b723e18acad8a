// libst95/src/transport/mock.rs

//! Queue-based transport for tests.

use crate::transport::traits::Transport;
use crate::types::Interface;
use crate::{Error, Result};

/// Mock transport for unit tests. It records sent frames and returns queued
/// responses in order.
#[derive(Debug, Default)]
pub struct MockTransport {
    /// Frames sent by the device, oldest first
    pub sent: Vec<Vec<u8>>,
    /// Queued replies. `Err` entries are returned as-is so tests can inject
    /// carrier failures.
    pub responses: Vec<Result<Vec<u8>>>,
    /// Carrier the mock reports
    pub interface: Interface,
    /// Wake pulses requested
    pub wakes: usize,
    /// Carrier resets requested
    pub resets: usize,
    /// Last host baud rate set
    pub baud: Option<u32>,
}

impl MockTransport {
    /// Empty mock on `interface`.
    pub fn new(interface: Interface) -> Self {
        Self {
            interface,
            ..Self::default()
        }
    }

    /// Queue a raw reply frame.
    pub fn push_response(&mut self, resp: Vec<u8>) {
        self.responses.push(Ok(resp));
    }

    /// Queue a receive error.
    pub fn push_error(&mut self, err: Error) {
        self.responses.push(Err(err));
    }

    /// Replies not consumed yet.
    pub fn pending(&self) -> usize {
        self.responses.len()
    }
}

impl Transport for MockTransport {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.sent.push(data.to_vec());
        Ok(())
    }

    fn receive(&mut self, _timeout_ms: u64) -> Result<Vec<u8>> {
        if self.responses.is_empty() {
            Err(Error::NoResponse)
        } else {
            self.responses.remove(0)
        }
    }

    fn interface(&self) -> Interface {
        self.interface
    }

    fn reset(&mut self) -> Result<()> {
        // Keep queued responses so tests can pre-seed the power-up echo
        // before handing the transport to a Device.
        self.sent.clear();
        self.resets += 1;
        Ok(())
    }

    fn wake(&mut self) -> Result<()> {
        self.wakes += 1;
        Ok(())
    }

    fn set_baud_rate(&mut self, baud: u32) -> Result<()> {
        if self.interface == Interface::Uart {
            self.baud = Some(baud);
            Ok(())
        } else {
            Err(Error::UnsupportedOperation(
                "baud rate change on SPI carrier".into(),
            ))
        }
    }
}
