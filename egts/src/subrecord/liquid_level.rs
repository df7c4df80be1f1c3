//! `EGTS_SR_LIQUID_LEVEL_SENSOR`: fuel or liquid level sensor reading.

use bitstream::{BitReader, BitWriter};

use super::{ensure_width, SubrecordCodec, SubrecordType};
use crate::error::{DecodeResult, EncodeResult};

/// Unit of a calibrated reading (`LLSVU`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LiquidLevelUnit {
    /// Raw sensor units.
    #[default]
    Uncalibrated,
    /// Tenths of a percent of the total volume.
    PercentTenths,
    /// Tenths of a litre.
    LitreTenths,
    Reserved,
}

impl LiquidLevelUnit {
    const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::Uncalibrated,
            1 => Self::PercentTenths,
            2 => Self::LitreTenths,
            _ => Self::Reserved,
        }
    }

    const fn bits(self) -> u8 {
        match self {
            Self::Uncalibrated => 0,
            Self::PercentTenths => 1,
            Self::LitreTenths => 2,
            Self::Reserved => 3,
        }
    }
}

/// Sensor payload: a 32-bit value, or the raw sensor bytes when `RDF` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LiquidLevelReading {
    Value(u32),
    Raw(Vec<u8>),
}

impl Default for LiquidLevelReading {
    fn default() -> Self {
        Self::Value(0)
    }
}

/// Liquid level sensor report.
///
/// Flag byte, MSB first: reserved, `LLSEF`, `LLSVU` (2 bits), `RDF`,
/// `LLSN` (3 bits).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LiquidLevelSensor {
    /// Sensor number, 3 bits.
    pub number: u8,
    /// Sensor reported an error.
    pub error: bool,
    pub unit: LiquidLevelUnit,
    pub module_address: u16,
    pub reading: LiquidLevelReading,
}

impl SubrecordCodec for LiquidLevelSensor {
    const TYPE: SubrecordType = SubrecordType::LiquidLevelSensor;

    fn decode(payload: &[u8]) -> DecodeResult<Self> {
        let mut reader = BitReader::new(payload);
        reader.read_bit()?;
        let error = reader.read_bit()?;
        let unit = LiquidLevelUnit::from_bits(reader.read_bits(2)? as u8);
        let raw = reader.read_bit()?;
        let number = reader.read_bits(3)? as u8;
        let module_address = reader.read_u16_aligned()?;
        let reading = if raw {
            LiquidLevelReading::Raw(reader.read_remaining()?.to_vec())
        } else {
            LiquidLevelReading::Value(reader.read_u32_aligned()?)
        };
        Ok(Self {
            number,
            error,
            unit,
            module_address,
            reading,
        })
    }

    fn encode_into(&self, writer: &mut BitWriter) -> EncodeResult<()> {
        ensure_width("liquid level sensor number", u64::from(self.number), 3)?;
        writer.write_bit(false);
        writer.write_bit(self.error);
        writer.write_bits(u64::from(self.unit.bits()), 2)?;
        writer.write_bit(matches!(self.reading, LiquidLevelReading::Raw(_)));
        writer.write_bits(u64::from(self.number), 3)?;
        writer.write_u16_aligned(self.module_address)?;
        match &self.reading {
            LiquidLevelReading::Value(value) => writer.write_u32_aligned(*value)?,
            LiquidLevelReading::Raw(bytes) => writer.write_bytes(bytes)?,
        }
        Ok(())
    }
}
