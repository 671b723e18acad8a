#![cfg(feature = "serial")]

#[path = "common.rs"]
mod common;

use libst95::host::{Host, MessageKind};
use serial_test::serial;

// These tests need a CR95HF/ST95HF board on a serial port. They are marked
// `#[ignore]` so CI does not attempt to run them. Run manually with:
//
// ST95_PORT=/dev/ttyUSB0 cargo test -p libst95 --test hardware --features serial -- --ignored

#[test]
#[ignore]
#[serial]
fn board_answers_idn() -> anyhow::Result<()> {
    let Some(mut dev) = common::open_and_initialize_device()? else {
        return Ok(());
    };
    let id = dev.get_idn()?;
    assert!(!id.name.is_empty());
    Ok(())
}

#[test]
#[ignore]
#[serial]
fn radio_request_round_trip() -> anyhow::Result<()> {
    let Some(dev) = common::open_and_initialize_device()? else {
        return Ok(());
    };
    let mut host = Host::new(dev);
    let (reply, ok) = host.execute(&[MessageKind::Radio.code()]);
    assert!(ok, "reply {:02x?}", reply);
    // tag or "no tag", both are fine without a card on the antenna
    assert!(reply[1] <= 0x01);
    Ok(())
}
