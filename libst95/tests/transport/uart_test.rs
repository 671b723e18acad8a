use libst95::Error;
use libst95::test_support::ScriptedSerial;
use libst95::transport::{Transport, UartTransport};

#[test]
fn reads_one_frame_per_receive() {
    let mut link = ScriptedSerial::with_bytes(&[0x80, 0x02, 0x44, 0x00]);
    link.push_bytes(&[0x55]);
    let mut t = UartTransport::new(link);

    assert_eq!(t.receive(100).unwrap(), vec![0x80, 0x02, 0x44, 0x00]);
    assert_eq!(t.receive(100).unwrap(), vec![0x55]);
    assert!(matches!(t.receive(100), Err(Error::NoResponse)));
}

#[test]
fn gap_inside_frame_is_malformed() {
    let mut link = ScriptedSerial::with_bytes(&[0x80, 0x05, 0x44]);
    link.push_gap();
    let mut t = UartTransport::new(link);
    assert!(matches!(t.receive(100), Err(Error::MalformedFrame(_))));
}

#[test]
fn wake_and_send_write_raw_bytes() {
    let mut t = UartTransport::new(ScriptedSerial::default());
    t.wake().unwrap();
    t.send(&[0x01, 0x00]).unwrap();
    assert_eq!(t.link().written, vec![0x00, 0x01, 0x00]);
}

#[test]
fn baud_rate_retunes_link() {
    let mut t = UartTransport::new(ScriptedSerial::default());
    t.set_baud_rate(115_200).unwrap();
    assert_eq!(t.baud(), 115_200);
    assert_eq!(t.into_inner().baud, Some(115_200));
}
