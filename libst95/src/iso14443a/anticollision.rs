// libst95/src/iso14443a/anticollision.rs

//! REQA -> ANTICOL -> SELECT cascade for a single ISO14443A tag.
//!
//! Levels advance only on the SAK cascade bit. A 4-byte prefix can belong
//! to a longer UID, so the UID length is never used to stop early.

use crate::device::{Device, Initialized};
use crate::types::{Atqa, Protocol, Sak, Tag, Uid};
use crate::{Error, Result};

use super::{
    CASCADE_TAG, CascadeLevel, anticol_frame, bcc, expect_body, reqa_frame, select_frame,
};

/// Result of one acquisition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// A tag completed the cascade.
    Tag(Tag),
    /// Nothing answered REQA. Not an error.
    NoTagDetected,
}

impl ScanOutcome {
    /// The acquired tag, if any.
    pub fn tag(&self) -> Option<&Tag> {
        match self {
            ScanOutcome::Tag(t) => Some(t),
            ScanOutcome::NoTagDetected => None,
        }
    }
}

/// Progress through the cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnticollisionState {
    level: CascadeLevel,
    uid: Vec<u8>,
    cascade_tag_present: bool,
    complete: bool,
}

impl Default for AnticollisionState {
    fn default() -> Self {
        Self::new()
    }
}

impl AnticollisionState {
    /// Fresh state at cascade level 1.
    pub fn new() -> Self {
        Self {
            level: CascadeLevel::One,
            uid: Vec::with_capacity(10),
            cascade_tag_present: false,
            complete: false,
        }
    }

    /// Level the next ANTICOL/SELECT pair runs at.
    pub fn level(&self) -> CascadeLevel {
        self.level
    }

    /// UID bytes collected so far, cascade tags removed.
    pub fn uid_bytes(&self) -> &[u8] {
        &self.uid
    }

    /// True once any level carried the 0x88 cascade tag.
    pub fn cascade_tag_present(&self) -> bool {
        self.cascade_tag_present
    }

    /// True once a SAK without the cascade bit was accepted.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Take the four bytes selected at the current level together with
    /// the SAK that acknowledged them.
    pub fn accept(&mut self, selected: [u8; 4], sak: Sak) -> Result<()> {
        if self.complete {
            return Err(failed(self.level, "cascade already complete"));
        }
        if !sak.cascade() {
            self.uid.extend_from_slice(&selected);
            self.complete = true;
            return Ok(());
        }
        if selected[0] != CASCADE_TAG {
            return Err(failed(
                self.level,
                format!("cascade bit set but first byte is {:#04x}", selected[0]),
            ));
        }
        let Some(next) = self.level.next() else {
            return Err(failed(self.level, "cascade bit set at the last level"));
        };
        self.uid.extend_from_slice(&selected[1..]);
        self.cascade_tag_present = true;
        self.level = next;
        Ok(())
    }

    /// Build the tag once the cascade completed.
    pub fn finish(&self, atqa: Atqa, sak: Sak) -> Result<Tag> {
        if !self.complete {
            return Err(failed(self.level, "cascade not complete"));
        }
        let uid = Uid::try_from(self.uid.as_slice()).map_err(|e| failed(self.level, e.to_string()))?;
        Ok(Tag::new(uid, atqa, sak))
    }
}

fn failed(level: CascadeLevel, reason: impl Into<String>) -> Error {
    Error::AnticollisionFailed {
        level: level.number(),
        reason: reason.into(),
    }
}

/// Run REQA and, if a tag answers, the full cascade. The field must be on
/// with ISO14443A selected, otherwise `InvalidState`. No retries.
pub fn acquire(device: &mut Device<Initialized>) -> Result<ScanOutcome> {
    require_iso14443a(device)?;
    let atqa = match request(device)? {
        Some(atqa) => atqa,
        None => return Ok(ScanOutcome::NoTagDetected),
    };
    cascade(device, atqa).map(ScanOutcome::Tag)
}

/// REQA. `None` when nothing answered within the detect window or the
/// chip could not receive a usable ATQA.
pub fn request(device: &mut Device<Initialized>) -> Result<Option<Atqa>> {
    require_iso14443a(device)?;
    let reply = match device.send_receive(&reqa_frame()) {
        Ok(r) => r,
        Err(Error::NoResponse) => {
            log::debug!("no tag answered REQA");
            return Ok(None);
        }
        Err(Error::ChipError { code, .. }) => {
            log::debug!("REQA receive error {:#04x}, treated as no tag", code);
            return Ok(None);
        }
        Err(e) => return Err(e),
    };
    let (body, _) =
        expect_body(&reply, 2).map_err(|e| failed(CascadeLevel::One, format!("ATQA: {}", e)))?;
    let atqa = Atqa::try_from(body)?;
    log::debug!("ATQA {}", atqa);
    Ok(Some(atqa))
}

/// ANTICOL/SELECT across up to three levels after a successful REQA.
pub fn cascade(device: &mut Device<Initialized>, atqa: Atqa) -> Result<Tag> {
    require_iso14443a(device)?;
    let mut state = AnticollisionState::new();
    loop {
        let level = state.level();
        let candidate = anticol(device, level)?;
        let sak = select(device, level, &candidate)?;
        state.accept(candidate, sak)?;
        if !state.is_complete() {
            log::trace!("level {} partial, continuing", level.number());
            continue;
        }

        let tag = state.finish(atqa, sak)?;
        match atqa.uid_size() {
            Some(size) if size != tag.uid().size() => log::warn!(
                "ATQA {} announces {:?} UID but cascade resolved {} bytes",
                atqa,
                size,
                tag.uid().len()
            ),
            _ => {}
        }
        log::debug!("tag uid {} sak {}", tag.uid().to_hex(), sak);
        return Ok(tag);
    }
}

fn require_iso14443a(device: &Device<Initialized>) -> Result<()> {
    match device.protocol() {
        Some(cfg) if cfg.protocol == Protocol::Iso14443A => Ok(()),
        Some(cfg) => Err(Error::InvalidState(format!(
            "anticollision needs ISO14443A, {:?} is selected",
            cfg.protocol
        ))),
        None => Err(Error::InvalidState(
            "anticollision needs the field on".into(),
        )),
    }
}

fn anticol(device: &mut Device<Initialized>, level: CascadeLevel) -> Result<[u8; 4]> {
    let reply = device
        .send_receive(&anticol_frame(level))
        .map_err(|e| failed(level, format!("ANTICOL: {}", e)))?;
    let (body, status) =
        expect_body(&reply, 5).map_err(|e| failed(level, format!("ANTICOL reply: {}", e)))?;
    if status.collision() {
        return Err(failed(
            level,
            format!(
                "collision at byte {} bit {}",
                status.collision_byte, status.collision_bit
            ),
        ));
    }
    let uid = [body[0], body[1], body[2], body[3]];
    if bcc(&uid) != body[4] {
        return Err(failed(
            level,
            format!("BCC mismatch: got {:#04x}, computed {:#04x}", body[4], bcc(&uid)),
        ));
    }
    Ok(uid)
}

fn select(device: &mut Device<Initialized>, level: CascadeLevel, uid: &[u8; 4]) -> Result<Sak> {
    let reply = device
        .send_receive(&select_frame(level, uid))
        .map_err(|e| failed(level, format!("SELECT: {}", e)))?;
    // SAK and its two CRC bytes
    let (body, status) =
        expect_body(&reply, 3).map_err(|e| failed(level, format!("SAK reply: {}", e)))?;
    if status.crc_error() {
        return Err(failed(level, "CRC error in SAK"));
    }
    Ok(Sak::from(body[0]))
}
