// libst95/src/prelude.rs

//! Common imports.

pub use crate::config::St95Config;
pub use crate::device::{Device, DeviceBuilder, Initialized, Uninitialized};
pub use crate::host::{Host, Reply, ReplyStatus, Request};
pub use crate::iso14443a::ScanOutcome;
pub use crate::protocol::{Command, IdleParams, Response};
pub use crate::selector::ProtocolSelector;
pub use crate::timing::{DeadlineKind, Delay, StdDelay, TimeoutSupervisor, Timings};
pub use crate::transport::{MockTransport, Transport, UartTransport};
pub use crate::{
    Atqa, ChipId, DeviceState, Error, Interface, Protocol, ProtocolConfig, ProtocolMask, Result,
    Role, Sak, Tag, Uid, WakeupSource,
};

pub use crate::utils::{bytes_to_hex, bytes_to_hex_spaced, ms};
