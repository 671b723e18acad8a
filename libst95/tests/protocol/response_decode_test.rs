#[path = "../common/mod.rs"]
mod common;

use libst95::Error;
use libst95::protocol::codec::decode_response_frame;
use libst95::protocol::{Opcode, Response};
use libst95::types::WakeupSource;

#[test]
fn idn_fixture_decodes() {
    match decode_response_frame(Opcode::Idn, &common::fixtures::idn_frame()).unwrap() {
        Response::Idn(id) => {
            assert_eq!(id.name, "NFC FS2JAST4");
            assert_eq!(id.rom_crc, 0x2ACE);
        }
        other => panic!("expected IDN response, got {:?}", other),
    }
}

#[test]
fn send_recv_keeps_trailer() {
    match decode_response_frame(Opcode::SendRecv, &common::fixtures::ultralight_cl1()).unwrap() {
        Response::SendRecv { data } => {
            assert_eq!(data.len(), 8);
            assert_eq!(&data[..5], &[0x88, 0x04, 0x2B, 0x6A, 0xCD]);
        }
        other => panic!("expected SEND_RECV response, got {:?}", other),
    }
}

#[test]
fn no_tag_and_chip_errors_are_distinct() {
    assert!(matches!(
        decode_response_frame(Opcode::SendRecv, &common::fixtures::no_tag()),
        Err(Error::NoResponse)
    ));
    assert!(matches!(
        decode_response_frame(Opcode::SendRecv, &[0x86, 0x00]),
        Err(Error::ChipError {
            command: 0x04,
            code: 0x86
        })
    ));
    assert!(matches!(
        decode_response_frame(Opcode::Protocol, &[0x83, 0x00]),
        Err(Error::ChipError { command: 0x02, .. })
    ));
}

#[test]
fn echo_expected_for_echo_and_baudrate() {
    assert_eq!(
        decode_response_frame(Opcode::Echo, &[0x55]).unwrap(),
        Response::Echo
    );
    assert_eq!(
        decode_response_frame(Opcode::Baudrate, &[0x55]).unwrap(),
        Response::Baudrate
    );
    assert!(matches!(
        decode_response_frame(Opcode::Echo, &[0x00, 0x00]),
        Err(Error::UnexpectedResponse { .. })
    ));
}

#[test]
fn idle_reply_names_wakeup_source() {
    assert_eq!(
        decode_response_frame(Opcode::Idle, &[0x00, 0x01, 0x01]).unwrap(),
        Response::Idle {
            wakeup: WakeupSource::Timeout
        }
    );
    assert!(decode_response_frame(Opcode::Idle, &[0x00, 0x00]).is_err());
}
