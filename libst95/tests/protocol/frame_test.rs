use libst95::Error;
use libst95::constants::{ECHO_BYTE, MAX_DATA_BYTES};
use libst95::protocol::Frame;
use proptest::prelude::*;

proptest! {
    #[test]
    fn any_frame_survives_the_wire(
        code in any::<u8>().prop_filter("echo byte is unframed", |c| *c != ECHO_BYTE),
        payload in prop::collection::vec(any::<u8>(), 0..=MAX_DATA_BYTES),
    ) {
        let frame = Frame::new(code, payload);
        let bytes = frame.to_bytes().unwrap();
        prop_assert_eq!(bytes[1] as usize, frame.payload.len());
        prop_assert_eq!(Frame::decode(&bytes).unwrap(), frame);
    }

    #[test]
    fn truncated_frames_are_rejected(
        code in any::<u8>().prop_filter("echo byte is unframed", |c| *c != ECHO_BYTE),
        payload in prop::collection::vec(any::<u8>(), 1..=MAX_DATA_BYTES),
        cut in 1usize..MAX_DATA_BYTES,
    ) {
        let bytes = Frame::encode(code, &payload).unwrap();
        let cut = cut.min(payload.len());
        let res = Frame::decode(&bytes[..bytes.len() - cut]);
        prop_assert!(matches!(res, Err(Error::MalformedFrame(_))));
    }
}

#[test]
fn longest_payload_fits() {
    let payload = vec![0xA5; MAX_DATA_BYTES];
    let bytes = Frame::encode(0x04, &payload).unwrap();
    assert_eq!(bytes.len(), 256);
    assert_eq!(bytes[1], 0xFE);
}

#[test]
fn oversized_payload_is_refused() {
    assert!(matches!(
        Frame::encode(0x04, &[0u8; 255]),
        Err(Error::InvalidLength { .. })
    ));
}
