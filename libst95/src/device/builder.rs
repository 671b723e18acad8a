// libst95/src/device/builder.rs

//! Builder for `Device<Uninitialized>`.

use crate::config::St95Config;
use crate::device::handle::{Device, Initialized, Uninitialized};
use crate::timing::{Delay, StdDelay};
use crate::transport::Transport;
use crate::{Error, Result};

/// Helper to construct a Device with optional configuration.
pub struct DeviceBuilder {
    transport: Option<Box<dyn Transport>>,
    config: St95Config,
    delay: Option<Box<dyn Delay>>,
}

impl Default for DeviceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceBuilder {
    /// Builder with the default configuration and a sleeping delay.
    pub fn new() -> Self {
        Self {
            transport: None,
            config: St95Config::default(),
            delay: None,
        }
    }

    /// Provide an already-created transport instance (e.g. MockTransport)
    pub fn with_transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use `config` instead of the defaults.
    pub fn with_config(mut self, config: St95Config) -> Self {
        self.config = config;
        self
    }

    /// Replace the sleeping delay, e.g. with a HAL timer.
    pub fn with_delay(mut self, delay: Box<dyn Delay>) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Consume the builder and return an uninitialized Device.
    /// Requires a transport to be provided.
    pub fn build_uninitialized(self) -> Result<Device<Uninitialized>> {
        let transport = self
            .transport
            .ok_or_else(|| Error::InvalidState("no transport configured".into()))?;
        if transport.interface() != self.config.interface {
            log::warn!(
                "transport is {:?} but config names {:?}",
                transport.interface(),
                self.config.interface
            );
        }
        let delay = self.delay.unwrap_or_else(|| Box::new(StdDelay));
        Ok(Device::with_parts(transport, self.config, delay))
    }

    /// Build and run the power-up sequence.
    pub fn build(self) -> Result<Device<Initialized>> {
        self.build_uninitialized()?.initialize()
    }
}
