// libst95/src/config.rs

//! Driver configuration injected at construction.

use crate::constants::{ECHO_RETRIES, UART_BAUD_DEFAULT, UART_INTER_BYTE_TIMEOUT_US};
use crate::protocol::commands::IdleParams;
use crate::timing::Timings;
use crate::types::{Interface, Protocol, ProtocolMask, Role};

/// Everything the driver needs that is not hard protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct St95Config {
    /// Carrier the chip is strapped for
    pub interface: Interface,
    /// Reader or writer role handed to the protocol selector
    pub role: Role,
    /// Protocol selected by a host PROTOCOL request without an id byte
    pub protocol: Protocol,
    /// Protocols the selector accepts
    pub enabled: ProtocolMask,
    /// UART baud rate the link is opened at
    pub uart_baud: u32,
    /// UART inter-byte budget, microseconds
    pub uart_inter_byte_timeout_us: u32,
    /// Deadline budgets
    pub timings: Timings,
    /// Echo attempts before a liveness probe gives up
    pub echo_retries: u8,
    /// Parameters used by `idle()`
    pub idle: IdleParams,
    /// ARC_B value written after ISO14443A selection, if any
    pub arc_b: Option<u8>,
}

impl Default for St95Config {
    fn default() -> Self {
        Self {
            interface: Interface::default(),
            role: Role::default(),
            protocol: Protocol::Iso14443A,
            enabled: ProtocolMask::ALL,
            uart_baud: UART_BAUD_DEFAULT,
            uart_inter_byte_timeout_us: UART_INTER_BYTE_TIMEOUT_US,
            timings: Timings::default(),
            echo_retries: ECHO_RETRIES,
            idle: IdleParams::default(),
            arc_b: None,
        }
    }
}

impl St95Config {
    /// Set the carrier.
    pub fn with_interface(mut self, interface: Interface) -> Self {
        self.interface = interface;
        self
    }

    /// Set the role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Restrict the protocols the selector accepts.
    pub fn with_enabled(mut self, enabled: ProtocolMask) -> Self {
        self.enabled = enabled;
        self
    }

    /// Replace the deadline budgets.
    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    /// Replace the `idle()` parameters.
    pub fn with_idle(mut self, idle: IdleParams) -> Self {
        self.idle = idle;
        self
    }

    /// Write `value` to ARC_B after every ISO14443A selection.
    pub fn with_arc_b(mut self, value: u8) -> Self {
        self.arc_b = Some(value);
        self
    }

    /// Protocol a host PROTOCOL request falls back to.
    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }
}
