// libst95/src/test_support.rs

//! Test support helpers intended for use by unit and integration tests.
//!
//! These helpers centralize common MockTransport setup and a small chip
//! simulator so tests across the crate, the tests/ directory and the
//! benches can reuse the same logic.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use crate::config::St95Config;
use crate::constants::{ECHO_BYTE, RESULT_FRAME_OK, RESULT_NO_TAG, RESULT_OK};
use crate::device::{Device, Initialized};
use crate::iso14443a::{self, CASCADE_TAG};
use crate::protocol::commands::idle::{WU_IRQ_IN, WU_TAG_DETECT, WU_TIMEOUT};
use crate::timing::RecordingDelay;
use crate::transport::mock::MockTransport;
use crate::transport::traits::Transport;
use crate::transport::uart::SerialLink;
use crate::types::{Interface, WakeupSource};
use crate::{Error, Result};

/// "No tag answered" SEND_RECV reply.
pub const NO_TAG_FRAME: [u8; 2] = [RESULT_NO_TAG, 0x00];

/// Result code 0x00 with `payload`.
pub fn ok_frame(payload: &[u8]) -> Vec<u8> {
    let mut v = vec![RESULT_OK, payload.len() as u8];
    v.extend_from_slice(payload);
    v
}

/// SEND_RECV reply carrying `data` (air bytes and status trailer).
pub fn air_frame(data: &[u8]) -> Vec<u8> {
    let mut v = vec![RESULT_FRAME_OK, data.len() as u8];
    v.extend_from_slice(data);
    v
}

pub fn idn_frame(name: &str, rom_crc: u16) -> Vec<u8> {
    let mut payload = name.as_bytes().to_vec();
    payload.push(0x00);
    payload.extend_from_slice(&rom_crc.to_be_bytes());
    ok_frame(&payload)
}

pub fn wakeup_frame(source: WakeupSource) -> Vec<u8> {
    ok_frame(&[u8::from(source)])
}

/// REQA reply: ATQA plus the chip's 3-byte status trailer.
pub fn atqa_reply(atqa: [u8; 2]) -> Vec<u8> {
    air_frame(&[atqa[0], atqa[1], 0x28, 0x00, 0x00])
}

/// ANTICOL reply for four UID bytes with a correct BCC.
pub fn anticol_reply(bytes: [u8; 4]) -> Vec<u8> {
    let bcc = iso14443a::bcc(&bytes);
    air_frame(&[bytes[0], bytes[1], bytes[2], bytes[3], bcc, 0x28, 0x00, 0x00])
}

/// SELECT reply: SAK, two CRC bytes, status trailer.
pub fn sak_reply(sak: u8) -> Vec<u8> {
    air_frame(&[sak, 0x00, 0x00, 0x08, 0x00, 0x00])
}

/// Build a MockTransport pre-seeded with the given framed responses and
/// return it boxed as a Transport trait object.
#[doc(hidden)]
pub fn boxed_mock_with_responses(
    interface: Interface,
    responses: Vec<Vec<u8>>,
) -> Box<dyn Transport> {
    let mut mock = MockTransport::new(interface);
    for resp in responses {
        mock.push_response(resp);
    }
    Box::new(mock)
}

/// Push the power-up echo then additional frames onto a MockTransport.
#[doc(hidden)]
pub fn seed_init_and_frames(mock: &mut MockTransport, frames: Vec<Vec<u8>>) {
    mock.push_response(vec![ECHO_BYTE]);
    for f in frames {
        mock.push_response(f);
    }
}

/// Convenience: create and initialize a Device<Initialized> backed by a
/// MockTransport. The power-up echo is seeded before `responses`.
#[doc(hidden)]
pub fn initialized_mock_device(responses: Vec<Vec<u8>>) -> Result<Device<Initialized>> {
    let mut mock = MockTransport::new(Interface::Uart);
    seed_init_and_frames(&mut mock, responses);
    Device::with_parts(
        Box::new(mock),
        St95Config::default(),
        Box::new(RecordingDelay::new()),
    )
    .initialize()
}

/// Transport wrapper that delegates into a shared MockTransport so tests
/// can inspect sent frames after the Device owns the transport.
pub struct SharedTransport {
    inner: Rc<RefCell<MockTransport>>,
}

impl SharedTransport {
    pub fn new(inner: Rc<RefCell<MockTransport>>) -> Self {
        Self { inner }
    }
}

impl Transport for SharedTransport {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.inner.borrow_mut().send(data)
    }

    fn receive(&mut self, timeout_ms: u64) -> Result<Vec<u8>> {
        self.inner.borrow_mut().receive(timeout_ms)
    }

    fn interface(&self) -> Interface {
        self.inner.borrow().interface()
    }

    fn reset(&mut self) -> Result<()> {
        self.inner.borrow_mut().reset()
    }

    fn wake(&mut self) -> Result<()> {
        self.inner.borrow_mut().wake()
    }

    fn set_baud_rate(&mut self, baud: u32) -> Result<()> {
        self.inner.borrow_mut().set_baud_rate(baud)
    }
}

/// Initialized device over a shared MockTransport and a recording delay.
#[doc(hidden)]
pub fn shared_mock_device(
    responses: Vec<Vec<u8>>,
) -> Result<(
    Device<Initialized>,
    Rc<RefCell<MockTransport>>,
    RecordingDelay,
)> {
    let inner = Rc::new(RefCell::new(MockTransport::new(Interface::Uart)));
    seed_init_and_frames(&mut inner.borrow_mut(), responses);
    let rec = RecordingDelay::new();
    let dev = Device::with_parts(
        Box::new(SharedTransport::new(inner.clone())),
        St95Config::default(),
        Box::new(rec.clone()),
    )
    .initialize()?;
    Ok((dev, inner, rec))
}

/// Scripted byte source for the UART carrier. `None` entries are gaps:
/// the read that hits one times out.
#[derive(Debug, Default)]
pub struct ScriptedSerial {
    pub script: VecDeque<Option<u8>>,
    pub written: Vec<u8>,
    pub baud: Option<u32>,
    pub timeouts: Vec<Duration>,
}

impl ScriptedSerial {
    pub fn with_bytes(bytes: &[u8]) -> Self {
        let mut s = Self::default();
        s.push_bytes(bytes);
        s
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.script.extend(bytes.iter().map(|b| Some(*b)));
    }

    pub fn push_gap(&mut self) {
        self.script.push_back(None);
    }
}

impl SerialLink for ScriptedSerial {
    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.written.extend_from_slice(data);
        Ok(())
    }

    fn read_byte(&mut self, timeout: Duration) -> Result<Option<u8>> {
        self.timeouts.push(timeout);
        Ok(self.script.pop_front().flatten())
    }

    fn set_baud_rate(&mut self, baud: u32) -> Result<()> {
        self.baud = Some(baud);
        Ok(())
    }

    fn clear_input(&mut self) -> Result<()> {
        self.script.clear();
        Ok(())
    }
}

/// ISO14443A tag answering a simulated cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimTag {
    pub uid: Vec<u8>,
    pub atqa: [u8; 2],
    pub sak: u8,
}

impl SimTag {
    /// Tag with an ATQA matching the UID length and a final SAK without
    /// the cascade bit.
    pub fn new(uid: &[u8]) -> Self {
        let atqa = match uid.len() {
            4 => [0x04, 0x00],
            7 => [0x44, 0x00],
            _ => [0x84, 0x00],
        };
        let sak = if uid.len() == 4 { 0x08 } else { 0x00 };
        Self {
            uid: uid.to_vec(),
            atqa,
            sak,
        }
    }

    pub fn with_atqa(mut self, atqa: [u8; 2]) -> Self {
        self.atqa = atqa;
        self
    }

    fn levels(&self) -> u8 {
        match self.uid.len() {
            4 => 1,
            7 => 2,
            _ => 3,
        }
    }

    /// Four bytes the tag answers at `level` (1-based).
    fn level_bytes(&self, level: u8) -> Option<[u8; 4]> {
        let levels = self.levels();
        if level == 0 || level > levels {
            return None;
        }
        let u = &self.uid;
        let start = (level as usize - 1) * 3;
        if level < levels {
            Some([CASCADE_TAG, u[start], u[start + 1], u[start + 2]])
        } else {
            Some([u[start], u[start + 1], u[start + 2], u[start + 3]])
        }
    }
}

/// Faults the simulator can inject into a cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimFault {
    SilentAnticol(u8),
    SilentSelect(u8),
    Collision(u8),
    BadBcc(u8),
    /// SAK keeps the cascade bit set at the last level
    EndlessCascade,
}

/// Simulated ST95 with an optional ISO14443A tag in the field.
pub struct SimulatedChip {
    tag: Rc<RefCell<Option<SimTag>>>,
    faults: Vec<SimFault>,
    log: Rc<RefCell<Vec<Vec<u8>>>>,
    echo_muted: Rc<Cell<bool>>,
    pending: VecDeque<Vec<u8>>,
    interface: Interface,
    field_on: bool,
    asleep: bool,
    dac_reference: u8,
    arc_b: [u8; 8],
    arc_b_index: usize,
}

impl SimulatedChip {
    pub fn new(tag: Option<SimTag>) -> Self {
        Self {
            tag: Rc::new(RefCell::new(tag)),
            faults: Vec::new(),
            log: Rc::new(RefCell::new(Vec::new())),
            echo_muted: Rc::new(Cell::new(false)),
            pending: VecDeque::new(),
            interface: Interface::Uart,
            field_on: false,
            asleep: false,
            dac_reference: 0x64,
            arc_b: [0; 8],
            arc_b_index: 0,
        }
    }

    pub fn with_fault(mut self, fault: SimFault) -> Self {
        self.faults.push(fault);
        self
    }

    pub fn with_dac_reference(mut self, reference: u8) -> Self {
        self.dac_reference = reference;
        self
    }

    /// Shared log of every frame the host sent.
    pub fn log(&self) -> Rc<RefCell<Vec<Vec<u8>>>> {
        self.log.clone()
    }

    /// Shared switch that makes the chip ignore echo while set.
    pub fn echo_mute(&self) -> Rc<Cell<bool>> {
        self.echo_muted.clone()
    }

    /// Shared handle to swap the tag in or out of the field.
    pub fn tag_handle(&self) -> Rc<RefCell<Option<SimTag>>> {
        self.tag.clone()
    }

    /// Initialized device around this simulator with a recording delay.
    pub fn into_device(self) -> Result<Device<Initialized>> {
        self.into_device_with(St95Config::default())
    }

    pub fn into_device_with(self, config: St95Config) -> Result<Device<Initialized>> {
        Device::with_parts(Box::new(self), config, Box::new(RecordingDelay::new())).initialize()
    }

    fn has(&self, fault: SimFault) -> bool {
        self.faults.contains(&fault)
    }

    fn reply(&mut self, frame: Vec<u8>) {
        self.pending.push_back(frame);
    }

    fn air(&mut self, data: &[u8]) {
        if !self.field_on {
            self.reply(vec![0x86, 0x00]);
            return;
        }
        let tag = self.tag.borrow().clone();
        let Some(tag) = tag else {
            self.reply(NO_TAG_FRAME.to_vec());
            return;
        };
        match data {
            [0x26, 0x07] => self.reply(atqa_reply(tag.atqa)),
            [sel, 0x20, 0x08] => {
                let level = level_of(*sel);
                match tag.level_bytes(level) {
                    Some(b) if !self.has(SimFault::SilentAnticol(level)) => {
                        let mut bcc = iso14443a::bcc(&b);
                        if self.has(SimFault::BadBcc(level)) {
                            bcc ^= 0xFF;
                        }
                        let mut flags = 0x28;
                        if self.has(SimFault::Collision(level)) {
                            flags |= 0x80;
                        }
                        self.reply(air_frame(&[b[0], b[1], b[2], b[3], bcc, flags, 0x00, 0x00]));
                    }
                    _ => self.reply(NO_TAG_FRAME.to_vec()),
                }
            }
            [sel, 0x70, _, _, _, _, _, 0x28] => {
                let level = level_of(*sel);
                if self.has(SimFault::SilentSelect(level)) || tag.level_bytes(level).is_none() {
                    self.reply(NO_TAG_FRAME.to_vec());
                    return;
                }
                let sak = if level < tag.levels() || self.has(SimFault::EndlessCascade) {
                    0x04
                } else {
                    tag.sak
                };
                self.reply(sak_reply(sak));
            }
            _ => self.reply(NO_TAG_FRAME.to_vec()),
        }
    }

    fn idle(&mut self, params: &[u8]) {
        let source = params.first().copied().unwrap_or(0);
        if source & WU_TIMEOUT != 0 && source & WU_TAG_DETECT != 0 {
            // calibration step: answer right away
            let dac_high = params.get(11).copied().unwrap_or(0);
            let woke = if dac_high < self.dac_reference {
                WakeupSource::TagDetect
            } else {
                WakeupSource::Timeout
            };
            self.reply(wakeup_frame(woke));
            return;
        }
        self.field_on = false;
        self.asleep = true;
    }
}

fn level_of(sel: u8) -> u8 {
    match sel {
        0x93 => 1,
        0x95 => 2,
        0x97 => 3,
        _ => 0,
    }
}

impl Transport for SimulatedChip {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.log.borrow_mut().push(data.to_vec());
        if self.asleep {
            return Ok(());
        }
        match data {
            [ECHO_BYTE] if self.echo_muted.get() => {}
            [ECHO_BYTE] => self.reply(vec![ECHO_BYTE]),
            [0x01, 0x00] => self.reply(idn_frame("NFC FS2JAST4", 0x2ACE)),
            [0x02, 0x02, id, _] => {
                self.field_on = *id != 0x00;
                self.reply(ok_frame(&[]));
            }
            [0x04, _, air @ ..] => {
                let air = air.to_vec();
                self.air(&air);
            }
            [0x07, 0x0E, params @ ..] => {
                let params = params.to_vec();
                self.idle(&params);
            }
            [0x08, 0x03, 0x69, 0x01, 0x00] => {
                let v = self.arc_b[self.arc_b_index];
                self.reply(ok_frame(&[v]));
            }
            [0x09, _, 0x68, 0x00, idx] => {
                self.arc_b_index = (*idx as usize) % self.arc_b.len();
                self.reply(ok_frame(&[]));
            }
            [0x09, _, 0x68, 0x01, idx, value] => {
                self.arc_b[(*idx as usize) % self.arc_b.len()] = *value;
                self.reply(ok_frame(&[]));
            }
            [0x09, ..] => self.reply(ok_frame(&[])),
            [0x0A, 0x01, _] => self.reply(vec![ECHO_BYTE]),
            _ => self.reply(vec![0x82, 0x00]),
        }
        Ok(())
    }

    fn receive(&mut self, _timeout_ms: u64) -> Result<Vec<u8>> {
        self.pending.pop_front().ok_or(Error::NoResponse)
    }

    fn interface(&self) -> Interface {
        self.interface
    }

    fn reset(&mut self) -> Result<()> {
        self.pending.clear();
        self.field_on = false;
        Ok(())
    }

    fn wake(&mut self) -> Result<()> {
        if self.asleep {
            self.asleep = false;
            self.reply(wakeup_frame(WakeupSource::from(WU_IRQ_IN)));
        }
        Ok(())
    }

    fn set_baud_rate(&mut self, _baud: u32) -> Result<()> {
        Ok(())
    }
}
