#[path = "../common/mod.rs"]
mod common;

use libst95::device::{Device, DeviceBuilder};
use libst95::timing::RecordingDelay;
use libst95::transport::mock::MockTransport;
use libst95::types::{DeviceState, Interface};
use libst95::utils::ms;
use libst95::{Error, St95Config};

#[test]
fn builder_initializes_over_uart() {
    let mut m = MockTransport::new(Interface::Uart);
    common::seed_init_and_frames(&mut m, vec![]);
    let rec = RecordingDelay::new();

    let dev = DeviceBuilder::new()
        .with_transport(Box::new(m))
        .with_delay(Box::new(rec.clone()))
        .build()
        .unwrap();

    assert_eq!(dev.interface(), Interface::Uart);
    assert_eq!(dev.state(), DeviceState::Idle);
    assert!(dev.protocol().is_none());
    // ramp-up then oscillator settle before the first echo
    assert_eq!(rec.recorded(), vec![ms(9), ms(9)]);
}

#[test]
fn uninitialized_device_state() {
    let m = MockTransport::new(Interface::Spi);
    let dev = Device::with_parts(
        Box::new(m),
        St95Config::default(),
        Box::new(RecordingDelay::new()),
    );
    assert_eq!(dev.state(), DeviceState::Uninitialized);
    assert_eq!(dev.interface(), Interface::Spi);
}

#[test]
fn silent_chip_is_a_device_fault() {
    let m = MockTransport::new(Interface::Uart);
    let res = Device::with_parts(
        Box::new(m),
        St95Config::default(),
        Box::new(RecordingDelay::new()),
    )
    .initialize();
    assert!(matches!(res, Err(Error::DeviceFault)));
}

#[test]
fn builder_without_transport_is_rejected() {
    assert!(matches!(
        DeviceBuilder::new().build(),
        Err(Error::InvalidState(_))
    ));
}
