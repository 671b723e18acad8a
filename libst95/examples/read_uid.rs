//! Read ISO14443A UIDs from a CR95HF/ST95HF board on a serial port.
//!
//! Usage:
//!   RUST_LOG=debug cargo run -p libst95 --example read_uid --features serial -- /dev/ttyUSB0

use libst95::host::encode_tag;
use libst95::iso14443a::{self, ScanOutcome};
use libst95::transport::UartTransport;
use libst95::{DeviceBuilder, Protocol, ProtocolSelector, Result, St95Config, utils};

fn main() -> Result<()> {
    env_logger::init();
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/dev/ttyUSB0".to_string());

    let config = St95Config::default();
    let transport = UartTransport::open_with_config(&path, &config)?;
    let mut dev = DeviceBuilder::new()
        .with_transport(Box::new(transport))
        .with_config(config)
        .build()?;

    let id = dev.get_idn()?;
    println!("{} (ROM CRC {:04x}) on {}", id.name, id.rom_crc, path);

    let selector = ProtocolSelector::from_config(dev.config());
    selector.select(&mut dev, Protocol::Iso14443A)?;

    for _ in 0..10 {
        match iso14443a::acquire(&mut dev) {
            Ok(ScanOutcome::Tag(tag)) => {
                println!(
                    "uid {} atqa {} sak {}",
                    tag.uid().to_hex(),
                    tag.atqa(),
                    tag.sak()
                );
                println!("reply data {}", utils::bytes_to_hex_spaced(&encode_tag(&tag)));
            }
            Ok(ScanOutcome::NoTagDetected) => println!("no tag"),
            Err(e) => println!("scan failed: {}", e),
        }
        std::thread::sleep(std::time::Duration::from_millis(500));
    }

    dev.field_off()
}
