//! `EGTS_SR_COUNTERS_DATA`: a bank of up to eight 24-bit counters.

use bitstream::{BitReader, BitWriter};

use super::{presence_mask, SubrecordCodec, SubrecordType};
use crate::error::{DecodeResult, EncodeResult};

/// Counter inputs; `counters[0]` is `CN1` and maps to bit 0 of the flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CountersData {
    pub counters: [Option<u32>; 8],
}

impl SubrecordCodec for CountersData {
    const TYPE: SubrecordType = SubrecordType::CountersData;

    fn decode(payload: &[u8]) -> DecodeResult<Self> {
        let mut reader = BitReader::new(payload);
        let mask = reader.read_u8_aligned()?;
        let mut counters = [None; 8];
        for (i, slot) in counters.iter_mut().enumerate() {
            if mask & (1 << i) != 0 {
                *slot = Some(reader.read_u24_aligned()?);
            }
        }
        Ok(Self { counters })
    }

    fn encode_into(&self, writer: &mut BitWriter) -> EncodeResult<()> {
        writer.write_u8_aligned(presence_mask(&self.counters))?;
        for value in self.counters.iter().flatten() {
            writer.write_u24_aligned(*value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;

    #[test]
    fn sparse_counters() {
        let mut data = CountersData::default();
        data.counters[2] = Some(0x0012_3456);
        data.counters[5] = Some(7);
        let bytes = data.encode().unwrap();
        assert_eq!(
            bytes,
            vec![0b0010_0100, 0x56, 0x34, 0x12, 0x07, 0x00, 0x00]
        );
        assert_eq!(CountersData::decode(&bytes).unwrap(), data);
    }

    #[test]
    fn no_counters() {
        assert_eq!(CountersData::default().encode().unwrap(), vec![0]);
        assert_eq!(CountersData::decode(&[0]).unwrap(), CountersData::default());
    }

    #[test]
    fn truncated_counter() {
        let err = CountersData::decode(&[0b1, 0x01, 0x02]).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { .. }));
    }
}
