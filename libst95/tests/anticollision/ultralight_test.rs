#[path = "../common/mod.rs"]
mod common;

use libst95::iso14443a::{ScanOutcome, acquire};
use libst95::types::{Protocol, ProtocolConfig, UidSize};

#[test]
fn double_size_uid_over_mock() {
    common::init_logging();
    let mut frames = vec![common::fixtures::protocol_ack()];
    frames.extend(common::fixtures::ultralight_session());
    let (mut dev, inner, _) = common::shared_mock_device(frames).unwrap();

    dev.select_protocol(ProtocolConfig::new(Protocol::Iso14443A))
        .unwrap();
    let tag = match acquire(&mut dev).unwrap() {
        ScanOutcome::Tag(tag) => tag,
        ScanOutcome::NoTagDetected => panic!("tag expected"),
    };

    assert_eq!(tag.uid().as_bytes(), common::fixtures::ultralight_uid().as_slice());
    assert_eq!(tag.uid().size(), UidSize::Double);
    assert_eq!(tag.sak().as_u8(), 0x00);
    assert_eq!(tag.atqa().as_bytes(), &[0x44, 0x00]);

    let sent = inner.borrow().sent.clone();
    let air: Vec<_> = sent[2..].iter().map(|f| f[2..].to_vec()).collect();
    assert_eq!(
        air,
        vec![
            vec![0x26, 0x07],
            vec![0x93, 0x20, 0x08],
            vec![0x93, 0x70, 0x88, 0x04, 0x2B, 0x6A, 0xCD, 0x28],
            vec![0x95, 0x20, 0x08],
            vec![0x95, 0x70, 0x2A, 0x2F, 0x5A, 0x80, 0xDF, 0x28],
        ]
    );
}

#[test]
fn empty_field_reports_no_tag() {
    let (mut dev, _, _) = common::shared_mock_device(vec![
        common::fixtures::protocol_ack(),
        common::fixtures::no_tag(),
    ])
    .unwrap();
    dev.select_protocol(ProtocolConfig::new(Protocol::Iso14443A))
        .unwrap();
    assert_eq!(acquire(&mut dev).unwrap(), ScanOutcome::NoTagDetected);
}

#[test]
fn reqa_receive_error_reads_as_no_tag() {
    let (mut dev, inner, _) = common::shared_mock_device(vec![
        common::fixtures::protocol_ack(),
        common::fixtures::rx_framing_error(),
    ])
    .unwrap();
    dev.select_protocol(ProtocolConfig::new(Protocol::Iso14443A))
        .unwrap();
    assert_eq!(acquire(&mut dev).unwrap(), ScanOutcome::NoTagDetected);
    assert_eq!(inner.borrow().sent.len(), 3);
}
