#[path = "../common/mod.rs"]
mod common;

use libst95::protocol::{Command, Response};
use libst95::types::{DeviceState, Protocol, ProtocolConfig, WakeupSource};
use libst95::utils::ms;
use libst95::Error;

#[test]
fn idn_over_mock() {
    let (mut dev, inner, _) =
        common::shared_mock_device(vec![common::fixtures::idn_frame()]).unwrap();
    let id = dev.get_idn().unwrap();
    assert_eq!(id.name, "NFC FS2JAST4");
    assert_eq!(id.rom_crc, 0x2ACE);
    assert_eq!(inner.borrow().sent.last().unwrap(), &vec![0x01, 0x00]);
    assert_eq!(dev.state(), DeviceState::Idle);
}

#[test]
fn select_then_exchange_then_field_off() {
    let (mut dev, inner, rec) = common::shared_mock_device(vec![
        common::fixtures::protocol_ack(),
        common::fixtures::ultralight_atqa(),
        common::fixtures::protocol_ack(),
    ])
    .unwrap();
    rec.clear();

    dev.select_protocol(ProtocolConfig::new(Protocol::Iso14443A))
        .unwrap();
    assert_eq!(dev.state(), DeviceState::FieldOn);
    // field ramp-up and oscillator settle after PROTOCOL
    assert_eq!(rec.recorded(), vec![ms(9), ms(9)]);

    let reply = dev.send_receive(&[0x26, 0x07]).unwrap();
    assert_eq!(reply, vec![0x44, 0x00, 0x28, 0x00, 0x00]);

    dev.field_off().unwrap();
    assert_eq!(dev.state(), DeviceState::Idle);
    assert!(dev.protocol().is_none());

    let sent = inner.borrow().sent.clone();
    assert_eq!(sent[1], vec![0x02, 0x02, 0x02, 0x00]);
    assert_eq!(sent[2], vec![0x04, 0x02, 0x26, 0x07]);
    assert_eq!(sent[3], vec![0x02, 0x02, 0x00, 0x00]);
}

#[test]
fn exchange_without_protocol_is_invalid_state() {
    let (mut dev, inner, _) = common::shared_mock_device(vec![]).unwrap();
    assert!(matches!(
        dev.send_receive(&[0x26, 0x07]),
        Err(Error::InvalidState(_))
    ));
    // nothing beyond the power-up echo went out
    assert_eq!(inner.borrow().sent.len(), 1);
}

#[test]
fn no_tag_reply_is_no_response_and_keeps_state() {
    let (mut dev, _, _) = common::shared_mock_device(vec![
        common::fixtures::protocol_ack(),
        common::fixtures::no_tag(),
    ])
    .unwrap();
    dev.select_protocol(ProtocolConfig::new(Protocol::Iso14443A))
        .unwrap();
    assert!(matches!(
        dev.send_receive(&[0x26, 0x07]),
        Err(Error::NoResponse)
    ));
    assert_eq!(dev.state(), DeviceState::FieldOn);
}

#[test]
fn short_reply_moves_to_error() {
    let (mut dev, _, _) = common::shared_mock_device(vec![
        common::fixtures::protocol_ack(),
        vec![0x80, 0x05, 0x44, 0x00],
    ])
    .unwrap();
    dev.select_protocol(ProtocolConfig::new(Protocol::Iso14443A))
        .unwrap();
    let res = dev.send_receive(&[0x26, 0x07]);
    assert!(matches!(res, Err(Error::MalformedFrame(_))));
    assert_eq!(dev.state(), DeviceState::Error);
}

#[test]
fn chip_error_code_surfaces() {
    let (mut dev, _, _) = common::shared_mock_device(vec![vec![0x82, 0x00]]).unwrap();
    match dev.execute(Command::ReadReg {
        address: 0x69,
        count: 1,
    }) {
        Err(Error::ChipError { command, code }) => {
            assert_eq!(command, 0x08);
            assert_eq!(code, 0x82);
        }
        other => panic!("expected ChipError, got {:?}", other),
    }
    assert_eq!(dev.state(), DeviceState::Idle);
}

#[test]
fn execute_idle_blocks_until_wakeup() {
    let (mut dev, _, _) = common::shared_mock_device(vec![vec![0x00, 0x01, 0x02]]).unwrap();
    let resp = dev
        .execute(Command::Idle(libst95::protocol::IdleParams::hibernate()))
        .unwrap();
    assert_eq!(
        resp,
        Response::Idle {
            wakeup: WakeupSource::TagDetect
        }
    );
    assert!(!dev.is_asleep());
}

#[test]
fn device_fault_blocks_air_traffic_until_field_off() {
    let (mut dev, inner, _) = common::shared_mock_device(vec![]).unwrap();
    assert!(matches!(dev.probe(), Err(Error::DeviceFault)));

    inner.borrow_mut().push_response(common::fixtures::protocol_ack());
    assert!(matches!(
        dev.execute(Command::Idn),
        Err(Error::DeviceFault)
    ));
    assert!(matches!(
        dev.send_receive(&[0x26, 0x07]),
        Err(Error::DeviceFault)
    ));
    assert_eq!(dev.state(), DeviceState::Error);

    dev.field_off().unwrap();
    assert!(!dev.is_faulted());
    assert_eq!(dev.state(), DeviceState::Idle);
}
