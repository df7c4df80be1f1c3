//! Subrecord payload codecs.
//!
//! Each subrecord type has its own binary layout. Flag bytes are read
//! MSB-first, so the first field listed for a flag byte occupies its most
//! significant bit. Optional fields gated by a flag are omitted from the
//! wire when absent.
//!
//! # Design Principles
//!
//! - **Closed dispatch** - [`Subrecord`] is a closed enum; the wire tag is
//!   derived from the variant and unknown tags are decode errors.
//! - **Presence by construction** - Optional fields are `Option`s and the
//!   flag bits are derived from them, so a flag can never disagree with
//!   the data it gates.
//! - **Tolerant tails** - Bytes left over inside a subrecord after every
//!   flagged field was read are ignored.

mod abs_sensors;
mod accel_data;
mod ad_sensors;
mod auth_info;
mod counters_data;
mod dispatcher_identity;
mod ext_pos_data;
mod liquid_level;
mod loopin;
mod module_data;
mod passengers;
mod plus_data;
mod pos_data;
mod response;
mod state_data;
mod term_identity;

use bitstream::{BitReader, BitWriter};

use crate::error::{DecodeError, DecodeResult, EncodeError, EncodeResult};

pub use abs_sensors::{AbsAnSens, AbsCntr, AbsDigSens};
pub use accel_data::{AccelData, AccelMeasurement};
pub use ad_sensors::AdSensors;
pub use auth_info::AuthInfo;
pub use counters_data::CountersData;
pub use dispatcher_identity::DispatcherIdentity;
pub use ext_pos_data::ExtPosData;
pub use liquid_level::{LiquidLevelReading, LiquidLevelSensor, LiquidLevelUnit};
pub use loopin::{AbsLoopin, LoopinData};
pub use module_data::ModuleData;
pub use passengers::{DoorCount, PassengerReadings, PassengersCounters};
pub use plus_data::PlusData;
pub use pos_data::{CoordinateSystem, PosData};
pub use response::{RecordResponse, ResultCodeRecord};
pub use state_data::StateData;
pub use term_identity::TermIdentity;

/// Wire tags of the known subrecord types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum SubrecordType {
    RecordResponse = 0,
    TermIdentity = 1,
    ModuleData = 2,
    DispatcherIdentity = 5,
    AuthInfo = 7,
    ResultCode = 9,
    EgtsPlusData = 15,
    PosData = 16,
    ExtPosData = 17,
    AdSensorsData = 18,
    CountersData = 19,
    AccelData = 20,
    StateData = 21,
    LoopinData = 22,
    AbsDigSensData = 23,
    AbsAnSensData = 24,
    AbsCntrData = 25,
    AbsLoopinData = 26,
    LiquidLevelSensor = 27,
    PassengersCounters = 28,
}

impl SubrecordType {
    /// Parses a subrecord tag.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        Some(match raw {
            0 => Self::RecordResponse,
            1 => Self::TermIdentity,
            2 => Self::ModuleData,
            5 => Self::DispatcherIdentity,
            7 => Self::AuthInfo,
            9 => Self::ResultCode,
            15 => Self::EgtsPlusData,
            16 => Self::PosData,
            17 => Self::ExtPosData,
            18 => Self::AdSensorsData,
            19 => Self::CountersData,
            20 => Self::AccelData,
            21 => Self::StateData,
            22 => Self::LoopinData,
            23 => Self::AbsDigSensData,
            24 => Self::AbsAnSensData,
            25 => Self::AbsCntrData,
            26 => Self::AbsLoopinData,
            27 => Self::LiquidLevelSensor,
            28 => Self::PassengersCounters,
            _ => return None,
        })
    }

    /// Returns the wire tag.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self as u8
    }
}

/// Binary codec implemented by every subrecord payload.
pub trait SubrecordCodec: Sized {
    /// Tag written in front of this payload.
    const TYPE: SubrecordType;

    /// Decodes the payload bytes of one subrecord.
    fn decode(payload: &[u8]) -> DecodeResult<Self>;

    /// Appends the payload bytes to `writer`.
    fn encode_into(&self, writer: &mut BitWriter) -> EncodeResult<()>;

    /// Encodes the payload bytes.
    fn encode(&self) -> EncodeResult<Vec<u8>> {
        let mut writer = BitWriter::new();
        self.encode_into(&mut writer)?;
        Ok(writer.finish())
    }

    /// Length of the encoded payload.
    fn wire_length(&self) -> EncodeResult<u16> {
        let len = self.encode()?.len();
        u16::try_from(len).map_err(|_| EncodeError::LengthOverflow {
            field: "subrecord",
            length: len,
        })
    }
}

/// A decoded subrecord payload, one variant per subrecord type.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Subrecord {
    Response(RecordResponse),
    TermIdentity(TermIdentity),
    ModuleData(ModuleData),
    DispatcherIdentity(DispatcherIdentity),
    AuthInfo(AuthInfo),
    ResultCode(ResultCodeRecord),
    PlusData(PlusData),
    PosData(PosData),
    ExtPosData(ExtPosData),
    AdSensors(AdSensors),
    Counters(CountersData),
    AccelData(AccelData),
    StateData(StateData),
    LoopinData(LoopinData),
    AbsDigSens(AbsDigSens),
    AbsAnSens(AbsAnSens),
    AbsCntr(AbsCntr),
    AbsLoopin(AbsLoopin),
    LiquidLevel(LiquidLevelSensor),
    PassengersCounters(PassengersCounters),
}

/// Applies `$body` to the payload of whichever variant `$sub` holds.
macro_rules! with_payload {
    ($sub:expr, $payload:ident => $body:expr) => {
        match $sub {
            Subrecord::Response($payload) => $body,
            Subrecord::TermIdentity($payload) => $body,
            Subrecord::ModuleData($payload) => $body,
            Subrecord::DispatcherIdentity($payload) => $body,
            Subrecord::AuthInfo($payload) => $body,
            Subrecord::ResultCode($payload) => $body,
            Subrecord::PlusData($payload) => $body,
            Subrecord::PosData($payload) => $body,
            Subrecord::ExtPosData($payload) => $body,
            Subrecord::AdSensors($payload) => $body,
            Subrecord::Counters($payload) => $body,
            Subrecord::AccelData($payload) => $body,
            Subrecord::StateData($payload) => $body,
            Subrecord::LoopinData($payload) => $body,
            Subrecord::AbsDigSens($payload) => $body,
            Subrecord::AbsAnSens($payload) => $body,
            Subrecord::AbsCntr($payload) => $body,
            Subrecord::AbsLoopin($payload) => $body,
            Subrecord::LiquidLevel($payload) => $body,
            Subrecord::PassengersCounters($payload) => $body,
        }
    };
}

impl Subrecord {
    /// Decodes a payload according to its wire tag.
    ///
    /// Tag 20 carries a five-byte state report on older terminals and is
    /// decoded as [`StateData`] when the payload has exactly that length.
    pub fn decode(tag: u8, payload: &[u8]) -> DecodeResult<Self> {
        let length = u16::try_from(payload.len()).unwrap_or(u16::MAX);
        let Some(kind) = SubrecordType::from_raw(tag) else {
            return Err(DecodeError::UnknownSubrecordType { tag, length });
        };
        Ok(match kind {
            SubrecordType::RecordResponse => Self::Response(RecordResponse::decode(payload)?),
            SubrecordType::TermIdentity => Self::TermIdentity(TermIdentity::decode(payload)?),
            SubrecordType::ModuleData => Self::ModuleData(ModuleData::decode(payload)?),
            SubrecordType::DispatcherIdentity => {
                Self::DispatcherIdentity(DispatcherIdentity::decode(payload)?)
            }
            SubrecordType::AuthInfo => Self::AuthInfo(AuthInfo::decode(payload)?),
            SubrecordType::ResultCode => Self::ResultCode(ResultCodeRecord::decode(payload)?),
            SubrecordType::EgtsPlusData => Self::PlusData(PlusData::decode(payload)?),
            SubrecordType::PosData => Self::PosData(PosData::decode(payload)?),
            SubrecordType::ExtPosData => Self::ExtPosData(ExtPosData::decode(payload)?),
            SubrecordType::AdSensorsData => Self::AdSensors(AdSensors::decode(payload)?),
            SubrecordType::CountersData => Self::Counters(CountersData::decode(payload)?),
            SubrecordType::AccelData if payload.len() == state_data::STATE_DATA_LEN => {
                Self::StateData(StateData::decode(payload)?)
            }
            SubrecordType::AccelData => Self::AccelData(AccelData::decode(payload)?),
            SubrecordType::StateData => Self::StateData(StateData::decode(payload)?),
            SubrecordType::LoopinData => Self::LoopinData(LoopinData::decode(payload)?),
            SubrecordType::AbsDigSensData => Self::AbsDigSens(AbsDigSens::decode(payload)?),
            SubrecordType::AbsAnSensData => Self::AbsAnSens(AbsAnSens::decode(payload)?),
            SubrecordType::AbsCntrData => Self::AbsCntr(AbsCntr::decode(payload)?),
            SubrecordType::AbsLoopinData => Self::AbsLoopin(AbsLoopin::decode(payload)?),
            SubrecordType::LiquidLevelSensor => {
                Self::LiquidLevel(LiquidLevelSensor::decode(payload)?)
            }
            SubrecordType::PassengersCounters => {
                Self::PassengersCounters(PassengersCounters::decode(payload)?)
            }
        })
    }

    /// Returns the wire tag for this variant.
    #[must_use]
    pub fn subrecord_type(&self) -> SubrecordType {
        fn tag_of<T: SubrecordCodec>(_: &T) -> SubrecordType {
            T::TYPE
        }
        with_payload!(self, payload => tag_of(payload))
    }

    /// Appends the payload bytes (without the type/length prefix).
    pub fn encode_into(&self, writer: &mut BitWriter) -> EncodeResult<()> {
        with_payload!(self, payload => payload.encode_into(writer))
    }

    /// Encodes the payload bytes (without the type/length prefix).
    pub fn encode(&self) -> EncodeResult<Vec<u8>> {
        with_payload!(self, payload => payload.encode())
    }

    /// Length of the encoded payload.
    pub fn wire_length(&self) -> EncodeResult<u16> {
        with_payload!(self, payload => payload.wire_length())
    }

    /// Returns `true` for subrecords that identify or authenticate a terminal.
    #[must_use]
    pub const fn is_identification(&self) -> bool {
        matches!(self, Self::TermIdentity(_) | Self::AuthInfo(_))
    }
}

/// Decodes wire text. Invalid UTF-8 is replaced rather than rejected, since
/// terminals commonly send single-byte code pages.
pub(crate) fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Reads a fixed-width text field.
pub(crate) fn read_fixed_text(reader: &mut BitReader<'_>, width: usize) -> DecodeResult<String> {
    Ok(decode_text(reader.read_bytes(width)?))
}

/// Reads a NUL-terminated text field.
pub(crate) fn read_cstring(reader: &mut BitReader<'_>) -> DecodeResult<String> {
    Ok(decode_text(reader.read_until(0)?))
}

/// Writes `value` followed by a NUL terminator.
pub(crate) fn write_cstring(
    writer: &mut BitWriter,
    field: &'static str,
    value: &str,
) -> EncodeResult<()> {
    if value.as_bytes().contains(&0) {
        return Err(EncodeError::EmbeddedNul { field });
    }
    writer.write_bytes(value.as_bytes())?;
    writer.write_u8_aligned(0)?;
    Ok(())
}

/// Writes a text field that must occupy exactly `width` bytes.
pub(crate) fn write_fixed_text(
    writer: &mut BitWriter,
    field: &'static str,
    value: &str,
    width: usize,
) -> EncodeResult<()> {
    let bytes = value.as_bytes();
    if bytes.len() != width {
        return Err(EncodeError::FieldLength {
            field,
            expected: width,
            actual: bytes.len(),
        });
    }
    writer.write_bytes(bytes)?;
    Ok(())
}

/// Checks that `value` fits in `bits` bits.
pub(crate) fn ensure_width(field: &'static str, value: u64, bits: u8) -> EncodeResult<()> {
    let max = (1u64 << bits) - 1;
    if value > max {
        return Err(EncodeError::FieldOutOfRange { field, value, max });
    }
    Ok(())
}

/// Flag byte where bit `i` (LSB = 0) marks the presence of slot `i`.
pub(crate) fn presence_mask<T>(slots: &[Option<T>]) -> u8 {
    slots
        .iter()
        .take(8)
        .enumerate()
        .filter(|(_, slot)| slot.is_some())
        .fold(0u8, |mask, (i, _)| mask | (1 << i))
}
