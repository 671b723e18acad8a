// libst95/src/types.rs

//! Protocol, tag and chip types.

use crate::Error;
use derive_more::{Display, From};
use std::convert::TryFrom;

/// Air-interface protocol as encoded in the PROTOCOL command.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Protocol {
    /// RF field off
    FieldOff = 0x00,
    /// ISO15693 vicinity cards
    Iso15693 = 0x01,
    /// ISO14443 type A
    Iso14443A = 0x02,
    /// ISO14443 type B
    Iso14443B = 0x03,
    /// ISO18092 / FeliCa
    Iso18092 = 0x04,
}

impl Protocol {
    /// Protocol id byte of the PROTOCOL command.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Bit of this protocol in a [`ProtocolMask`]. `FieldOff` has none.
    pub fn mask_bit(self) -> u8 {
        match self {
            Protocol::FieldOff => 0x00,
            Protocol::Iso14443A => 0x01,
            Protocol::Iso14443B => 0x02,
            Protocol::Iso15693 => 0x04,
            Protocol::Iso18092 => 0x08,
        }
    }
}

impl TryFrom<u8> for Protocol {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            0x00 => Ok(Protocol::FieldOff),
            0x01 => Ok(Protocol::Iso15693),
            0x02 => Ok(Protocol::Iso14443A),
            0x03 => Ok(Protocol::Iso14443B),
            0x04 => Ok(Protocol::Iso18092),
            other => Err(Error::UnsupportedOperation(format!(
                "unknown protocol id {:#04x}",
                other
            ))),
        }
    }
}

/// Set of protocols a host allows to be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, From)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProtocolMask(u8);

impl ProtocolMask {
    /// ISO14443A
    pub const ISO14443A: Self = Self(0x01);
    /// ISO14443B
    pub const ISO14443B: Self = Self(0x02);
    /// ISO15693
    pub const ISO15693: Self = Self(0x04);
    /// ISO18092 / FeliCa
    pub const ISO18092: Self = Self(0x08);
    /// Every protocol
    pub const ALL: Self = Self(0x0F);

    /// Raw mask bits.
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// FieldOff is always allowed.
    pub fn allows(&self, protocol: Protocol) -> bool {
        protocol == Protocol::FieldOff || self.0 & protocol.mask_bit() != 0
    }
}

/// Data rate class. Only meaningful for ISO14443A/B.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BitRate {
    /// 106 kbps
    #[default]
    Kbps106 = 0,
    /// 212 kbps
    Kbps212 = 1,
    /// 424 kbps
    Kbps424 = 2,
}

impl BitRate {
    /// Rate field value in the parameter byte.
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Role the host plays toward the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    /// Full modulation depth for writes
    Writer,
    /// Normal reading
    #[default]
    Reader,
}

/// Physical carrier between host and chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Interface {
    /// UART at 57600 baud after power-up
    #[default]
    Uart,
    /// SPI with control bytes
    Spi,
}

/// Protocol selection handed to the PROTOCOL command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProtocolConfig {
    /// Air protocol
    pub protocol: Protocol,
    /// Transmit rate
    pub tx_rate: BitRate,
    /// Receive rate
    pub rx_rate: BitRate,
    /// Reader or writer
    pub role: Role,
}

impl ProtocolConfig {
    /// Field off.
    pub const FIELD_OFF: Self = Self {
        protocol: Protocol::FieldOff,
        tx_rate: BitRate::Kbps106,
        rx_rate: BitRate::Kbps106,
        role: Role::Reader,
    };

    /// Defaults for `protocol`: 106 kbps, reader.
    pub fn new(protocol: Protocol) -> Self {
        Self {
            protocol,
            ..Self::FIELD_OFF
        }
    }

    /// Set the role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Set tx/rx data rates. Rejected for protocols other than ISO14443A/B
    /// unless both rates are the 106 kbps class.
    pub fn with_rates(mut self, tx_rate: BitRate, rx_rate: BitRate) -> crate::Result<Self> {
        let rated = matches!(self.protocol, Protocol::Iso14443A | Protocol::Iso14443B);
        if !rated && (tx_rate != BitRate::Kbps106 || rx_rate != BitRate::Kbps106) {
            return Err(Error::UnsupportedOperation(format!(
                "data rates are fixed for {:?}",
                self.protocol
            )));
        }
        self.tx_rate = tx_rate;
        self.rx_rate = rx_rate;
        Ok(self)
    }

    /// False only for the field-off configuration.
    pub fn is_field_on(&self) -> bool {
        self.protocol != Protocol::FieldOff
    }

    /// Parameter byte that follows the protocol id in the PROTOCOL command.
    pub fn parameter_byte(&self) -> u8 {
        let rates = (self.tx_rate.code() << 6) | (self.rx_rate.code() << 4);
        match self.protocol {
            Protocol::FieldOff => 0x00,
            // 26 kbps, 312 us wait, append CRC; bit 2 selects 10% modulation
            Protocol::Iso15693 => match self.role {
                Role::Reader => 0x05,
                Role::Writer => 0x01,
            },
            Protocol::Iso14443A => rates,
            // append CRC
            Protocol::Iso14443B => rates | 0x01,
            // 212 kbps both ways, append CRC
            Protocol::Iso18092 => 0x51,
        }
    }
}

/// Runtime state of the chip as seen by the command engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeviceState {
    /// Before power-up
    Uninitialized,
    /// Alive, field off
    Idle,
    /// A protocol is selected and the field is on
    FieldOn,
    /// A command is in flight
    AwaitingResponse,
    /// Last reply could not be trusted or the chip stopped answering
    Error,
}

/// Answer To reQuest A (two bytes, LSB first as received).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Atqa([u8; 2]);

impl std::fmt::Display for Atqa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02x}{:02x}", self.0[0], self.0[1])
    }
}

impl Atqa {
    /// ATQA from the two bytes the tag sent.
    pub fn from_bytes(bytes: [u8; 2]) -> Self {
        Self(bytes)
    }

    /// Raw ATQA bytes.
    pub fn as_bytes(&self) -> &[u8; 2] {
        &self.0
    }

    /// UID size class from bits 7:6 of the first byte.
    pub fn uid_size(&self) -> Option<UidSize> {
        match (self.0[0] >> 6) & 0x03 {
            0 => Some(UidSize::Single),
            1 => Some(UidSize::Double),
            2 => Some(UidSize::Triple),
            _ => None,
        }
    }
}

impl TryFrom<&[u8]> for Atqa {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != 2 {
            return Err(Error::InvalidLength {
                expected: 2,
                actual: bytes.len(),
            });
        }
        Ok(Self([bytes[0], bytes[1]]))
    }
}

/// Select AcKnowledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, From, Display)]
#[display(fmt = "{:02x}", _0)]
pub struct Sak(u8);

impl Sak {
    /// ISO14443-3 cascade bit: UID not complete.
    pub const CASCADE_BIT: u8 = 0x04;

    /// Raw SAK byte.
    pub fn as_u8(&self) -> u8 {
        self.0
    }

    /// Cascade bit: the UID is not complete yet.
    pub fn cascade(&self) -> bool {
        self.0 & Self::CASCADE_BIT != 0
    }
}

/// UID size class announced in ATQA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UidSize {
    /// 4 bytes
    Single,
    /// 7 bytes
    Double,
    /// 10 bytes
    Triple,
}

impl UidSize {
    /// UID length in bytes.
    pub fn len(self) -> usize {
        match self {
            UidSize::Single => 4,
            UidSize::Double => 7,
            UidSize::Triple => 10,
        }
    }
}

/// Tag UID of 4, 7 or 10 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Uid {
    bytes: [u8; 10],
    len: u8,
}

impl Uid {
    /// UID bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// UID length in bytes.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// True when no bytes are held.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size class from the length.
    pub fn size(&self) -> UidSize {
        match self.len {
            4 => UidSize::Single,
            7 => UidSize::Double,
            _ => UidSize::Triple,
        }
    }

    /// Upper-case hex without separators.
    pub fn to_hex(&self) -> String {
        crate::utils::bytes_to_hex(self.as_bytes())
    }
}

impl TryFrom<&[u8]> for Uid {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        match bytes.len() {
            4 | 7 | 10 => {
                let mut arr = [0u8; 10];
                arr[..bytes.len()].copy_from_slice(bytes);
                Ok(Self {
                    bytes: arr,
                    len: bytes.len() as u8,
                })
            }
            n => Err(Error::InvalidLength {
                expected: if n < 4 {
                    4
                } else if n < 7 {
                    7
                } else {
                    10
                },
                actual: n,
            }),
        }
    }
}

/// ISO14443A tag resolved by a complete cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    uid: Uid,
    atqa: Atqa,
    sak: Sak,
}

impl Tag {
    /// Tag from its acquisition results.
    pub fn new(uid: Uid, atqa: Atqa, sak: Sak) -> Self {
        Self { uid, atqa, sak }
    }

    /// Full UID, cascade tags removed.
    pub fn uid(&self) -> &Uid {
        &self.uid
    }

    /// ATQA from REQA.
    pub fn atqa(&self) -> Atqa {
        self.atqa
    }

    /// SAK of the last cascade level.
    pub fn sak(&self) -> Sak {
        self.sak
    }
}

/// Chip identification returned by IDN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipId {
    /// Chip name without the trailing NUL
    pub name: String,
    /// ROM CRC, big-endian on the wire
    pub rom_crc: u16,
}

/// Reason the chip left low-power mode (IDLE reply byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeupSource {
    /// Sleep timer ran out
    Timeout,
    /// Tag detector fired
    TagDetect,
    /// Low pulse on IRQ_IN
    IrqIn,
    /// Low pulse on SPI_SS
    IrqSpiSs,
    /// External field detected
    FieldDetect,
    /// Any other reply byte
    Other(u8),
}

impl From<u8> for WakeupSource {
    fn from(b: u8) -> Self {
        match b {
            0x01 => WakeupSource::Timeout,
            0x02 => WakeupSource::TagDetect,
            0x08 => WakeupSource::IrqIn,
            0x10 => WakeupSource::IrqSpiSs,
            0x04 => WakeupSource::FieldDetect,
            other => WakeupSource::Other(other),
        }
    }
}

impl From<WakeupSource> for u8 {
    fn from(w: WakeupSource) -> u8 {
        match w {
            WakeupSource::Timeout => 0x01,
            WakeupSource::TagDetect => 0x02,
            WakeupSource::FieldDetect => 0x04,
            WakeupSource::IrqIn => 0x08,
            WakeupSource::IrqSpiSs => 0x10,
            WakeupSource::Other(b) => b,
        }
    }
}
