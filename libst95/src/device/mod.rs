// libst95/src/device/mod.rs

//! Command engine.

pub mod builder;
pub mod handle;

pub use builder::DeviceBuilder;
pub use handle::{Device, Initialized, Uninitialized};
