//! `EGTS_SR_ACCEL_DATA`: accelerometer samples relative to an absolute time.

use bitstream::{BitReader, BitWriter};
use chrono::{DateTime, Utc};

use super::{SubrecordCodec, SubrecordType};
use crate::error::{DecodeError, DecodeResult, EncodeError, EncodeResult};
use crate::time::{from_egts_seconds, to_egts_seconds};

/// One accelerometer sample. Accelerations are in 0.1 m/s².
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccelMeasurement {
    /// Milliseconds after [`AccelData::absolute_time`].
    pub relative_time: u16,
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

/// Accelerometer report.
///
/// A report needs at least one measurement: an empty one would be five
/// bytes long, which decoders read as [`StateData`](super::StateData)
/// under the same tag.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccelData {
    pub absolute_time: DateTime<Utc>,
    pub measurements: Vec<AccelMeasurement>,
}

impl SubrecordCodec for AccelData {
    const TYPE: SubrecordType = SubrecordType::AccelData;

    fn decode(payload: &[u8]) -> DecodeResult<Self> {
        let mut reader = BitReader::new(payload);
        let count = reader.read_u8_aligned()?;
        let seconds = reader.read_u32_aligned()?;
        let absolute_time = from_egts_seconds(seconds)
            .ok_or_else(|| DecodeError::invalid("accelerometer time", seconds))?;

        let mut measurements = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            measurements.push(AccelMeasurement {
                relative_time: reader.read_u16_aligned()?,
                x: reader.read_i16_aligned()?,
                y: reader.read_i16_aligned()?,
                z: reader.read_i16_aligned()?,
            });
        }
        Ok(Self {
            absolute_time,
            measurements,
        })
    }

    fn encode_into(&self, writer: &mut BitWriter) -> EncodeResult<()> {
        if self.measurements.is_empty() {
            return Err(EncodeError::EmptyField {
                field: "accelerometer measurements",
            });
        }
        let count =
            u8::try_from(self.measurements.len()).map_err(|_| EncodeError::FieldOutOfRange {
                field: "accelerometer measurements",
                value: self.measurements.len() as u64,
                max: u64::from(u8::MAX),
            })?;
        let seconds = to_egts_seconds(&self.absolute_time).ok_or(
            EncodeError::TimestampOutOfRange {
                field: "absolute_time",
            },
        )?;

        writer.write_u8_aligned(count)?;
        writer.write_u32_aligned(seconds)?;
        for sample in &self.measurements {
            writer.write_u16_aligned(sample.relative_time)?;
            writer.write_i16_aligned(sample.x)?;
            writer.write_i16_aligned(sample.y)?;
            writer.write_i16_aligned(sample.z)?;
        }
        Ok(())
    }
}
