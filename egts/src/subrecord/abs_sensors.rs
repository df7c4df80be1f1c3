//! Single absolute sensor readings: digital, analog and counter.

use bitstream::{BitReader, BitWriter};

use super::{ensure_width, SubrecordCodec, SubrecordType};
use crate::error::{DecodeResult, EncodeResult};

/// `EGTS_SR_ABS_DIG_SENS_DATA`: state of one digital sensor.
///
/// Packed little-endian as `number << 4 | state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbsDigSens {
    /// Sensor number, 12 bits.
    pub number: u16,
    /// Sensor state, 4 bits.
    pub state: u8,
}

impl SubrecordCodec for AbsDigSens {
    const TYPE: SubrecordType = SubrecordType::AbsDigSensData;

    fn decode(payload: &[u8]) -> DecodeResult<Self> {
        let mut reader = BitReader::new(payload);
        let packed = reader.read_u16_aligned()?;
        Ok(Self {
            number: packed >> 4,
            state: (packed & 0x0F) as u8,
        })
    }

    fn encode_into(&self, writer: &mut BitWriter) -> EncodeResult<()> {
        ensure_width("digital sensor number", u64::from(self.number), 12)?;
        ensure_width("digital sensor state", u64::from(self.state), 4)?;
        writer.write_u16_aligned(self.number << 4 | u16::from(self.state))?;
        Ok(())
    }
}

/// `EGTS_SR_ABS_AN_SENS_DATA`: value of one analog sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbsAnSens {
    pub number: u8,
    /// 24-bit value.
    pub value: u32,
}

impl SubrecordCodec for AbsAnSens {
    const TYPE: SubrecordType = SubrecordType::AbsAnSensData;

    fn decode(payload: &[u8]) -> DecodeResult<Self> {
        let mut reader = BitReader::new(payload);
        Ok(Self {
            number: reader.read_u8_aligned()?,
            value: reader.read_u24_aligned()?,
        })
    }

    fn encode_into(&self, writer: &mut BitWriter) -> EncodeResult<()> {
        writer.write_u8_aligned(self.number)?;
        writer.write_u24_aligned(self.value)?;
        Ok(())
    }
}

/// `EGTS_SR_ABS_CNTR_DATA`: value of one counter input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbsCntr {
    pub number: u8,
    /// 24-bit value.
    pub value: u32,
}

impl SubrecordCodec for AbsCntr {
    const TYPE: SubrecordType = SubrecordType::AbsCntrData;

    fn decode(payload: &[u8]) -> DecodeResult<Self> {
        let mut reader = BitReader::new(payload);
        Ok(Self {
            number: reader.read_u8_aligned()?,
            value: reader.read_u24_aligned()?,
        })
    }

    fn encode_into(&self, writer: &mut BitWriter) -> EncodeResult<()> {
        writer.write_u8_aligned(self.number)?;
        writer.write_u24_aligned(self.value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EncodeError;

    #[test]
    fn digital_packing() {
        let sensor = AbsDigSens {
            number: 0x123,
            state: 0x5,
        };
        assert_eq!(sensor.encode().unwrap(), vec![0x35, 0x12]);
        assert_eq!(AbsDigSens::decode(&[0x35, 0x12]).unwrap(), sensor);
    }

    #[test]
    fn digital_number_out_of_range() {
        let sensor = AbsDigSens {
            number: 0x1000,
            state: 0,
        };
        assert!(matches!(
            sensor.encode().unwrap_err(),
            EncodeError::FieldOutOfRange { max: 0xFFF, .. }
        ));
    }

    #[test]
    fn captured_analog_sensor() {
        let sensor = AbsAnSens::decode(&[0x01, 0x00, 0x00, 0x00]).unwrap();
        assert_eq!(sensor, AbsAnSens { number: 1, value: 0 });
    }

    #[test]
    fn analog_layout() {
        let sensor = AbsAnSens {
            number: 3,
            value: 0x00AB_CDEF,
        };
        assert_eq!(sensor.encode().unwrap(), vec![3, 0xEF, 0xCD, 0xAB]);
    }

    #[test]
    fn counter_value_must_fit_24_bits() {
        let counter = AbsCntr {
            number: 1,
            value: 0x0100_0000,
        };
        assert!(matches!(
            counter.encode().unwrap_err(),
            EncodeError::Bitstream(_)
        ));
        let counter = AbsCntr {
            number: 1,
            value: 0x00FF_FFFF,
        };
        assert_eq!(AbsCntr::decode(&counter.encode().unwrap()).unwrap(), counter);
    }
}
