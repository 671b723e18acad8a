// libst95/src/selector.rs

//! Requested protocol + role -> `ProtocolConfig` -> PROTOCOL.

use crate::config::St95Config;
use crate::constants::TIMER_WINDOW_14443A;
use crate::device::{Device, Initialized};
use crate::protocol::commands::register::ARC_B_INDEX_14443A;
use crate::types::{BitRate, DeviceState, Protocol, ProtocolConfig, ProtocolMask, Role};
use crate::{Error, Result};

/// Turns a requested protocol into a chip configuration and selects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolSelector {
    enabled: ProtocolMask,
    role: Role,
    arc_b: Option<u8>,
}

impl ProtocolSelector {
    /// Selector with an enabled mask and role.
    pub fn new(enabled: ProtocolMask, role: Role) -> Self {
        Self {
            enabled,
            role,
            arc_b: None,
        }
    }

    /// Selector taking mask, role and ARC_B from `config`.
    pub fn from_config(config: &St95Config) -> Self {
        Self {
            enabled: config.enabled,
            role: config.role,
            arc_b: config.arc_b,
        }
    }

    /// ARC_B value written after each fresh ISO14443A selection.
    pub fn with_arc_b(mut self, value: u8) -> Self {
        self.arc_b = Some(value);
        self
    }

    /// Configured role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Protocols this selector accepts.
    pub fn enabled(&self) -> ProtocolMask {
        self.enabled
    }

    /// Configuration for `protocol` at 106 kbps.
    pub fn config_for(&self, protocol: Protocol) -> Result<ProtocolConfig> {
        self.config_with_rates(protocol, BitRate::Kbps106, BitRate::Kbps106)
    }

    /// ISO14443A stays at 106 kbps because the cascade assumes it.
    pub fn config_with_rates(
        &self,
        protocol: Protocol,
        tx_rate: BitRate,
        rx_rate: BitRate,
    ) -> Result<ProtocolConfig> {
        if !self.enabled.allows(protocol) {
            return Err(Error::UnsupportedOperation(format!(
                "{:?} is not enabled (mask {:#04x})",
                protocol,
                self.enabled.bits()
            )));
        }
        if protocol == Protocol::Iso14443A
            && (tx_rate != BitRate::Kbps106 || rx_rate != BitRate::Kbps106)
        {
            return Err(Error::UnsupportedOperation(
                "ISO14443A runs at 106 kbps only".into(),
            ));
        }
        ProtocolConfig::new(protocol)
            .with_role(self.role)
            .with_rates(tx_rate, rx_rate)
    }

    /// Build the configuration for `protocol` and apply it.
    pub fn select(
        &self,
        device: &mut Device<Initialized>,
        protocol: Protocol,
    ) -> Result<ProtocolConfig> {
        let cfg = self.config_for(protocol)?;
        self.apply(device, cfg)?;
        Ok(cfg)
    }

    /// Select `cfg` and program the reader registers that belong to it.
    pub fn apply(&self, device: &mut Device<Initialized>, cfg: ProtocolConfig) -> Result<()> {
        if !self.enabled.allows(cfg.protocol) {
            return Err(Error::UnsupportedOperation(format!(
                "{:?} is not enabled",
                cfg.protocol
            )));
        }
        let already = device.state() == DeviceState::FieldOn && device.protocol() == Some(cfg);
        device.select_protocol(cfg)?;
        if already || cfg.protocol != Protocol::Iso14443A {
            return Ok(());
        }

        device.set_timer_window(TIMER_WINDOW_14443A)?;
        if let Some(value) = self.arc_b {
            device.write_analog_config(ARC_B_INDEX_14443A, value)?;
        }
        log::debug!("ISO14443A registers programmed");
        Ok(())
    }
}
