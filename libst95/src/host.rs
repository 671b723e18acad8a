// libst95/src/host.rs

//! Host boundary: `execute(request bytes) -> (reply bytes, ok)`.
//!
//! Request byte 0 names the message kind; `PROTOCOL` carries the protocol
//! id in byte 1, or falls back to the configured protocol without it. Replies are `[kind, status, data...]` where status 0x00 is
//! success, 0x01 is "no tag" and anything else is [`Error::code`].

use std::convert::TryFrom;

use crate::device::{Device, Initialized};
use crate::iso14443a::{self, ScanOutcome};
use crate::protocol::commands::IdleParams;
use crate::selector::ProtocolSelector;
use crate::timing::DeadlineKind;
use crate::types::{Protocol, Tag};
use crate::utils::bytes_to_hex_spaced;
use crate::{Error, Result};

/// Message kinds understood by [`Host::execute`].
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// RADIO
    Radio = 0,
    /// ECHO
    Echo = 1,
    /// CALIBR
    Calibrate = 2,
    /// IDN
    Idn = 3,
    /// UID
    Uid = 4,
    /// ANTICOL
    Anticollision = 5,
    /// IDLE
    Idle = 6,
    /// PROTOCOL
    Protocol = 7,
    /// GET_UID
    GetUid = 8,
    /// RF_OFF
    RfOff = 9,
}

impl MessageKind {
    /// Wire value of the kind.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for MessageKind {
    type Error = Error;

    fn try_from(b: u8) -> Result<Self> {
        Ok(match b {
            0 => MessageKind::Radio,
            1 => MessageKind::Echo,
            2 => MessageKind::Calibrate,
            3 => MessageKind::Idn,
            4 => MessageKind::Uid,
            5 => MessageKind::Anticollision,
            6 => MessageKind::Idle,
            7 => MessageKind::Protocol,
            8 => MessageKind::GetUid,
            9 => MessageKind::RfOff,
            other => {
                return Err(Error::UnsupportedOperation(format!(
                    "unknown message kind {}",
                    other
                )));
            }
        })
    }
}

/// Decoded host request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Select ISO14443A and retry acquisition within the no-response ceiling
    Radio,
    /// Liveness probe
    Echo,
    /// Tag detector calibration
    Calibrate,
    /// Chip identification
    Idn,
    /// Select ISO14443A and acquire once
    Uid,
    /// One cascade on the current field
    Anticollision,
    /// Enter low-power mode
    Idle,
    /// Select a protocol
    Protocol(Protocol),
    /// Last acquired tag
    GetUid,
    /// Field off
    RfOff,
}

impl Request {
    /// Message kind this request travels as.
    pub fn kind(&self) -> MessageKind {
        match self {
            Request::Radio => MessageKind::Radio,
            Request::Echo => MessageKind::Echo,
            Request::Calibrate => MessageKind::Calibrate,
            Request::Idn => MessageKind::Idn,
            Request::Uid => MessageKind::Uid,
            Request::Anticollision => MessageKind::Anticollision,
            Request::Idle => MessageKind::Idle,
            Request::Protocol(_) => MessageKind::Protocol,
            Request::GetUid => MessageKind::GetUid,
            Request::RfOff => MessageKind::RfOff,
        }
    }

    /// Decode request bytes. `PROTOCOL` needs its id byte.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Self::decode_with(bytes, None)
    }

    /// Decode request bytes, using `default_protocol` for a `PROTOCOL`
    /// request without an id byte.
    pub fn decode_with(bytes: &[u8], default_protocol: Option<Protocol>) -> Result<Self> {
        let (&kind, rest) = bytes.split_first().ok_or(Error::InvalidLength {
            expected: 1,
            actual: 0,
        })?;
        Ok(match MessageKind::try_from(kind)? {
            MessageKind::Radio => Request::Radio,
            MessageKind::Echo => Request::Echo,
            MessageKind::Calibrate => Request::Calibrate,
            MessageKind::Idn => Request::Idn,
            MessageKind::Uid => Request::Uid,
            MessageKind::Anticollision => Request::Anticollision,
            MessageKind::Idle => Request::Idle,
            MessageKind::Protocol => match (rest.first(), default_protocol) {
                (Some(&id), _) => Request::Protocol(Protocol::try_from(id)?),
                (None, Some(p)) => Request::Protocol(p),
                (None, None) => {
                    return Err(Error::InvalidLength {
                        expected: 2,
                        actual: bytes.len(),
                    });
                }
            },
            MessageKind::GetUid => Request::GetUid,
            MessageKind::RfOff => Request::RfOff,
        })
    }

    /// Request bytes.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Request::Protocol(p) => vec![self.kind().code(), p.id()],
            other => vec![other.kind().code()],
        }
    }
}

/// Status byte of a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStatus {
    /// 0x00
    Ok,
    /// 0x01, nothing answered
    NoTag,
    /// Error code from [`Error::code`]
    Error(u8),
}

impl ReplyStatus {
    /// Wire value.
    pub fn code(self) -> u8 {
        match self {
            ReplyStatus::Ok => 0x00,
            ReplyStatus::NoTag => 0x01,
            ReplyStatus::Error(c) => c,
        }
    }
}

/// Host reply before encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Kind byte echoed from the request
    pub kind: u8,
    /// Outcome
    pub status: ReplyStatus,
    /// Kind-specific data
    pub data: Vec<u8>,
}

impl Reply {
    /// Successful reply carrying `data`.
    pub fn ok(kind: MessageKind, data: Vec<u8>) -> Self {
        Self {
            kind: kind.code(),
            status: ReplyStatus::Ok,
            data,
        }
    }

    /// "No tag" reply without data.
    pub fn no_tag(kind: MessageKind) -> Self {
        Self {
            kind: kind.code(),
            status: ReplyStatus::NoTag,
            data: Vec::new(),
        }
    }

    /// Error reply for `err`.
    pub fn error(kind: u8, err: &Error) -> Self {
        Self {
            kind,
            status: ReplyStatus::Error(err.code()),
            data: Vec::new(),
        }
    }

    /// False only for errors. "No tag" is a normal outcome.
    pub fn is_ok(&self) -> bool {
        !matches!(self.status, ReplyStatus::Error(_))
    }

    /// `[kind, status, data...]`
    pub fn encode(&self) -> Vec<u8> {
        let mut v = Vec::with_capacity(2 + self.data.len());
        v.push(self.kind);
        v.push(self.status.code());
        v.extend_from_slice(&self.data);
        v
    }
}

/// Tag as carried in replies: UID length, UID, ATQA, SAK.
pub fn encode_tag(tag: &Tag) -> Vec<u8> {
    let uid = tag.uid().as_bytes();
    let mut v = Vec::with_capacity(uid.len() + 4);
    v.push(uid.len() as u8);
    v.extend_from_slice(uid);
    v.extend_from_slice(tag.atqa().as_bytes());
    v.push(tag.sak().as_u8());
    v
}

/// Single entry point a host module drives.
pub struct Host {
    device: Device<Initialized>,
    selector: ProtocolSelector,
    last_tag: Option<Tag>,
}

impl Host {
    /// Host over an initialized device, selector built from its config.
    pub fn new(device: Device<Initialized>) -> Self {
        let selector = ProtocolSelector::from_config(device.config());
        Self {
            device,
            selector,
            last_tag: None,
        }
    }

    /// Replace the protocol selector.
    pub fn with_selector(mut self, selector: ProtocolSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Borrow the device.
    pub fn device(&self) -> &Device<Initialized> {
        &self.device
    }

    /// Borrow the device mutably.
    pub fn device_mut(&mut self) -> &mut Device<Initialized> {
        &mut self.device
    }

    /// Tag cached by the last successful acquisition.
    pub fn last_tag(&self) -> Option<&Tag> {
        self.last_tag.as_ref()
    }

    /// Give back the device.
    pub fn into_device(self) -> Device<Initialized> {
        self.device
    }

    /// Decode, dispatch and encode. Never fails: errors become a reply with
    /// the error's code and `ok == false`.
    pub fn execute(&mut self, request: &[u8]) -> (Vec<u8>, bool) {
        let kind = request.first().copied().unwrap_or(0xFF);
        let default_protocol = Some(self.device.config().protocol);
        let reply = match Request::decode_with(request, default_protocol)
            .and_then(|req| self.dispatch(req))
        {
            Ok(reply) => reply,
            Err(e) => {
                log::warn!("request {:#04x} failed: {}", kind, e);
                Reply::error(kind, &e)
            }
        };
        let bytes = reply.encode();
        log::debug!("reply {}", bytes_to_hex_spaced(&bytes));
        (bytes, reply.is_ok())
    }

    /// Run a decoded request. Errors are returned, not encoded.
    pub fn dispatch(&mut self, request: Request) -> Result<Reply> {
        let kind = request.kind();
        log::debug!("dispatch {:?}", request);
        match request {
            Request::Radio => {
                self.last_tag = None;
                self.selector.select(&mut self.device, Protocol::Iso14443A)?;
                self.scan_with_retry().map(|o| self.record(kind, o))
            }
            Request::Uid => {
                self.last_tag = None;
                self.selector.select(&mut self.device, Protocol::Iso14443A)?;
                iso14443a::acquire(&mut self.device).map(|o| self.record(kind, o))
            }
            Request::Anticollision => {
                self.last_tag = None;
                iso14443a::acquire(&mut self.device).map(|o| self.record(kind, o))
            }
            Request::GetUid => Ok(match &self.last_tag {
                Some(tag) => Reply::ok(kind, encode_tag(tag)),
                None => Reply::no_tag(kind),
            }),
            Request::Echo => {
                let alive = self.device.echo();
                Ok(Reply::ok(kind, vec![alive as u8]))
            }
            Request::Calibrate => {
                self.device.field_off()?;
                let reference = self.device.calibrate_tag_detector()?;
                self.device
                    .set_idle_params(IdleParams::tag_detector_around(reference));
                Ok(Reply::ok(kind, vec![reference]))
            }
            Request::Idn => {
                let id = self.device.get_idn()?;
                let mut data = id.name.into_bytes();
                data.push(0x00);
                data.extend_from_slice(&id.rom_crc.to_be_bytes());
                Ok(Reply::ok(kind, data))
            }
            Request::Idle => {
                self.device.idle()?;
                Ok(Reply::ok(kind, Vec::new()))
            }
            Request::Protocol(p) => {
                let cfg = self.selector.select(&mut self.device, p)?;
                Ok(Reply::ok(kind, vec![cfg.protocol.id(), cfg.parameter_byte()]))
            }
            Request::RfOff => {
                self.last_tag = None;
                self.device.field_off()?;
                Ok(Reply::ok(kind, Vec::new()))
            }
        }
    }

    /// Acquisition retried while the no-response ceiling allows another
    /// detect window. The last failure is reported when none succeeds.
    fn scan_with_retry(&mut self) -> Result<ScanOutcome> {
        let ceiling = self.device.deadline(DeadlineKind::NoResponse);
        let window = self.device.budget_ms(DeadlineKind::TagDetect).max(1);
        let attempts = (self.device.budget_ms(DeadlineKind::NoResponse) / window).max(1);

        let mut attempt = 1;
        loop {
            let outcome = iso14443a::acquire(&mut self.device);
            match &outcome {
                Ok(ScanOutcome::Tag(_)) => {}
                Ok(ScanOutcome::NoTagDetected) => log::trace!("scan {}: no tag", attempt),
                Err(e) => log::debug!("scan {} failed: {}", attempt, e),
            }
            let found = matches!(outcome, Ok(ScanOutcome::Tag(_)));
            if found || attempt >= attempts || ceiling.expired() {
                return outcome;
            }
            attempt += 1;
        }
    }

    fn record(&mut self, kind: MessageKind, outcome: ScanOutcome) -> Reply {
        match outcome {
            ScanOutcome::Tag(tag) => {
                self.last_tag = Some(tag);
                Reply::ok(kind, encode_tag(&tag))
            }
            ScanOutcome::NoTagDetected => Reply::no_tag(kind),
        }
    }
}
