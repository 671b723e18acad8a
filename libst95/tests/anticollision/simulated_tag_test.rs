#[path = "../common/mod.rs"]
mod common;

use common::{SimFault, SimTag, SimulatedChip};
use libst95::Error;
use libst95::iso14443a::{ScanOutcome, acquire};
use libst95::types::{Protocol, ProtocolConfig};
use proptest::prelude::*;

fn scan(chip: SimulatedChip) -> libst95::Result<ScanOutcome> {
    let mut dev = chip.into_device()?;
    dev.select_protocol(ProtocolConfig::new(Protocol::Iso14443A))?;
    acquire(&mut dev)
}

fn uid_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 4),
        prop::collection::vec(any::<u8>(), 7),
        prop::collection::vec(any::<u8>(), 10),
    ]
}

proptest! {
    #[test]
    fn resolved_uid_matches_tag(uid in uid_strategy()) {
        let outcome = scan(SimulatedChip::new(Some(SimTag::new(&uid)))).unwrap();
        let tag = outcome.tag().cloned().unwrap();
        prop_assert_eq!(tag.uid().as_bytes(), uid.as_slice());
        prop_assert!(!tag.sak().cascade());
    }

    #[test]
    fn silent_select_fails_at_that_level(uid in uid_strategy(), pick in 1u8..=3) {
        let levels = match uid.len() { 4 => 1, 7 => 2, _ => 3 };
        let level = pick.min(levels);
        let chip = SimulatedChip::new(Some(SimTag::new(&uid)))
            .with_fault(SimFault::SilentSelect(level));
        match scan(chip) {
            Err(Error::AnticollisionFailed { level: l, .. }) => prop_assert_eq!(l, level),
            other => prop_assert!(false, "expected AnticollisionFailed, got {:?}", other),
        }
    }
}

#[test]
fn tag_leaving_the_field() {
    let chip = SimulatedChip::new(Some(SimTag::new(&[9, 8, 7, 6])));
    let handle = chip.tag_handle();
    let mut dev = chip.into_device().unwrap();
    dev.select_protocol(ProtocolConfig::new(Protocol::Iso14443A))
        .unwrap();
    assert!(acquire(&mut dev).unwrap().tag().is_some());

    handle.borrow_mut().take();
    assert_eq!(acquire(&mut dev).unwrap(), ScanOutcome::NoTagDetected);
}

#[test]
fn collision_and_bad_bcc_fail_the_scan() {
    for fault in [SimFault::Collision(1), SimFault::BadBcc(1)] {
        let chip = SimulatedChip::new(Some(SimTag::new(&[1, 2, 3, 4]))).with_fault(fault);
        assert!(
            matches!(scan(chip), Err(Error::AnticollisionFailed { level: 1, .. })),
            "{:?}",
            fault
        );
    }
}
