#![allow(dead_code)]

// Shared helpers for the integration test crates.

pub mod fixtures;

pub use libst95::test_support::{
    SharedTransport, SimFault, SimTag, SimulatedChip, initialized_mock_device,
    seed_init_and_frames, shared_mock_device,
};

/// Route `log` output to the test harness. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
