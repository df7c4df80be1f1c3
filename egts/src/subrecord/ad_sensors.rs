//! `EGTS_SR_AD_SENSORS_DATA`: additional digital inputs and analog sensors.

use bitstream::{BitReader, BitWriter};

use super::{presence_mask, SubrecordCodec, SubrecordType};
use crate::error::{DecodeResult, EncodeResult};

/// Banks of up to eight digital input octets and eight 24-bit analog values.
///
/// Slot `i` of each array corresponds to bit `i` of its flag byte, so
/// `digital_inputs[0]` is `ADIO1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdSensors {
    pub digital_inputs: [Option<u8>; 8],
    /// States of digital outputs 1..=8.
    pub digital_outputs: u8,
    pub analog_sensors: [Option<u32>; 8],
}

impl SubrecordCodec for AdSensors {
    const TYPE: SubrecordType = SubrecordType::AdSensorsData;

    fn decode(payload: &[u8]) -> DecodeResult<Self> {
        let mut reader = BitReader::new(payload);
        let digital_mask = reader.read_u8_aligned()?;
        let digital_outputs = reader.read_u8_aligned()?;
        let analog_mask = reader.read_u8_aligned()?;

        let mut digital_inputs = [None; 8];
        for (i, slot) in digital_inputs.iter_mut().enumerate() {
            if digital_mask & (1 << i) != 0 {
                *slot = Some(reader.read_u8_aligned()?);
            }
        }
        let mut analog_sensors = [None; 8];
        for (i, slot) in analog_sensors.iter_mut().enumerate() {
            if analog_mask & (1 << i) != 0 {
                *slot = Some(reader.read_u24_aligned()?);
            }
        }

        Ok(Self {
            digital_inputs,
            digital_outputs,
            analog_sensors,
        })
    }

    fn encode_into(&self, writer: &mut BitWriter) -> EncodeResult<()> {
        writer.write_u8_aligned(presence_mask(&self.digital_inputs))?;
        writer.write_u8_aligned(self.digital_outputs)?;
        writer.write_u8_aligned(presence_mask(&self.analog_sensors))?;
        for octet in self.digital_inputs.iter().flatten() {
            writer.write_u8_aligned(*octet)?;
        }
        for value in self.analog_sensors.iter().flatten() {
            writer.write_u24_aligned(*value)?;
        }
        Ok(())
    }
}
