#[path = "../common/mod.rs"]
mod common;

use common::{SimTag, SimulatedChip};
use libst95::protocol::IdleParams;
use libst95::types::{DeviceState, Protocol, ProtocolConfig};

#[test]
fn idle_then_next_command_wakes_the_chip() {
    let chip = SimulatedChip::new(None);
    let log = chip.log();
    let mut dev = chip.into_device().unwrap();

    dev.select_protocol(ProtocolConfig::new(Protocol::Iso14443A))
        .unwrap();
    dev.idle().unwrap();
    assert!(dev.is_asleep());
    assert_eq!(dev.state(), DeviceState::Idle);
    assert!(dev.protocol().is_none());

    // second request while asleep sends nothing
    let before = log.borrow().len();
    dev.idle().unwrap();
    assert_eq!(log.borrow().len(), before);

    let id = dev.get_idn().unwrap();
    assert_eq!(id.name, "NFC FS2JAST4");
    assert!(!dev.is_asleep());
}

#[test]
fn calibration_finds_detector_reference() {
    common::init_logging();
    let chip = SimulatedChip::new(None).with_dac_reference(0x64);
    let log = chip.log();
    let mut dev = chip.into_device().unwrap();

    let reference = dev.calibrate_tag_detector().unwrap();
    assert_eq!(reference, 0x64);
    assert!(!dev.is_asleep());

    // six probes, each an IDLE frame
    let idles = log.borrow().iter().filter(|f| f[0] == 0x07).count();
    assert_eq!(idles, 6);

    dev.set_idle_params(IdleParams::tag_detector_around(reference));
    assert_eq!(dev.config().idle.dac_data_low, 0x5C);
}

#[test]
fn tag_survives_low_power_cycle() {
    let chip = SimulatedChip::new(Some(SimTag::new(&[0x11, 0x22, 0x33, 0x44])));
    let mut dev = chip.into_device().unwrap();
    dev.idle().unwrap();

    dev.select_protocol(ProtocolConfig::new(Protocol::Iso14443A))
        .unwrap();
    let outcome = libst95::iso14443a::acquire(&mut dev).unwrap();
    assert_eq!(
        outcome.tag().unwrap().uid().as_bytes(),
        &[0x11, 0x22, 0x33, 0x44]
    );
}
