use libst95::Error;
use libst95::transport::Transport;
use libst95::transport::mock::MockTransport;
use libst95::types::Interface;

#[test]
fn mock_transport_send_and_receive() {
    let mut m = MockTransport::new(Interface::Uart);
    m.push_response(vec![0x55]);
    m.send(&[0x55]).unwrap();
    assert_eq!(m.sent.len(), 1);
    assert_eq!(m.receive(10).unwrap(), vec![0x55]);
    // queue drained: the deadline passes
    assert!(matches!(m.receive(10), Err(Error::NoResponse)));
}

#[test]
fn boxed_transport_delegates() {
    let mut m = MockTransport::new(Interface::Spi);
    m.push_error(Error::Io("bus fault".into()));
    let mut boxed: Box<dyn Transport> = Box::new(m);
    assert_eq!(boxed.interface(), Interface::Spi);
    assert!(matches!(boxed.receive(10), Err(Error::Io(_))));
    // SPI has no baud rate
    assert!(matches!(
        boxed.set_baud_rate(115_200),
        Err(Error::UnsupportedOperation(_))
    ));
}
