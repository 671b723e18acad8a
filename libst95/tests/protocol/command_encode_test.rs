use libst95::iso14443a::{self, CascadeLevel};
use libst95::protocol::codec::encode_command_frame;
use libst95::protocol::{Command, IdleParams};
use libst95::types::{BitRate, Protocol, ProtocolConfig, Role};

#[test]
fn reqa_goes_out_as_short_frame() {
    let frame = encode_command_frame(&Command::SendRecv {
        data: iso14443a::reqa_frame(),
    })
    .unwrap();
    assert_eq!(frame, vec![0x04, 0x02, 0x26, 0x07]);
}

#[test]
fn select_carries_bcc_and_crc_flag() {
    let frame = encode_command_frame(&Command::SendRecv {
        data: iso14443a::select_frame(CascadeLevel::One, &[0x88, 0x04, 0x2B, 0x6A]),
    })
    .unwrap();
    assert_eq!(
        frame,
        vec![0x04, 0x07, 0x93, 0x70, 0x88, 0x04, 0x2B, 0x6A, 0xCD, 0x28]
    );
}

#[test]
fn protocol_parameter_bytes() {
    let cases = [
        (ProtocolConfig::FIELD_OFF, vec![0x02, 0x02, 0x00, 0x00]),
        (
            ProtocolConfig::new(Protocol::Iso14443A),
            vec![0x02, 0x02, 0x02, 0x00],
        ),
        (
            ProtocolConfig::new(Protocol::Iso15693),
            vec![0x02, 0x02, 0x01, 0x05],
        ),
        (
            ProtocolConfig::new(Protocol::Iso15693).with_role(Role::Writer),
            vec![0x02, 0x02, 0x01, 0x01],
        ),
    ];
    for (cfg, expected) in cases {
        assert_eq!(
            encode_command_frame(&Command::Protocol(cfg)).unwrap(),
            expected,
            "{:?}",
            cfg
        );
    }
    let b = ProtocolConfig::new(Protocol::Iso14443B)
        .with_rates(BitRate::Kbps424, BitRate::Kbps212)
        .unwrap();
    assert_eq!(
        encode_command_frame(&Command::Protocol(b)).unwrap(),
        vec![0x02, 0x02, 0x03, 0x91]
    );
}

#[test]
fn idle_frame_is_fourteen_parameter_bytes() {
    let frame = encode_command_frame(&Command::Idle(IdleParams::tag_detector(0x5C, 0x6C))).unwrap();
    assert_eq!(frame[0], 0x07);
    assert_eq!(frame[1], 0x0E);
    assert_eq!(frame.len(), 16);
    assert_eq!(frame[2], 0x0A);
    assert_eq!(&frame[12..14], &[0x5C, 0x6C]);
}

#[test]
fn register_access_frames() {
    assert_eq!(
        encode_command_frame(&Command::ReadReg {
            address: 0x69,
            count: 1
        })
        .unwrap(),
        vec![0x08, 0x03, 0x69, 0x01, 0x00]
    );
    assert_eq!(
        encode_command_frame(&Command::WriteReg {
            address: 0x3A,
            flags: 0x00,
            data: vec![0x58, 0x04]
        })
        .unwrap(),
        vec![0x09, 0x04, 0x3A, 0x00, 0x58, 0x04]
    );
}

#[test]
fn baud_codes() {
    assert_eq!(Command::baud_for_code(0x75), 57_457);
    let code = Command::baud_code(57_600).unwrap();
    assert_eq!(code, 0x75);
}
