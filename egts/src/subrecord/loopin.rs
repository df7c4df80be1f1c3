//! Loop input subrecords: a bank of eight and a single absolute input.

use bitstream::{BitReader, BitWriter};

use super::{ensure_width, presence_mask, SubrecordCodec, SubrecordType};
use crate::error::{DecodeResult, EncodeResult};

/// `EGTS_SR_LOOPIN_DATA`: 4-bit states of up to eight loop inputs.
///
/// `states[0]` is input 1 and maps to bit 0 of the flag byte. Present states
/// are packed two per byte, the earlier input in the low nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoopinData {
    pub states: [Option<u8>; 8],
}

impl SubrecordCodec for LoopinData {
    const TYPE: SubrecordType = SubrecordType::LoopinData;

    fn decode(payload: &[u8]) -> DecodeResult<Self> {
        let mut reader = BitReader::new(payload);
        let mask = reader.read_u8_aligned()?;
        let present = mask.count_ones() as usize;
        let packed = reader.read_bytes(present.div_ceil(2))?;

        let mut nibbles = packed.iter().flat_map(|byte| [byte & 0x0F, byte >> 4]);
        let mut states = [None; 8];
        for (i, slot) in states.iter_mut().enumerate() {
            if mask & (1 << i) != 0 {
                *slot = nibbles.next();
            }
        }
        Ok(Self { states })
    }

    fn encode_into(&self, writer: &mut BitWriter) -> EncodeResult<()> {
        for state in self.states.iter().flatten() {
            ensure_width("loop input state", u64::from(*state), 4)?;
        }
        writer.write_u8_aligned(presence_mask(&self.states))?;
        let present: Vec<u8> = self.states.iter().flatten().copied().collect();
        for pair in present.chunks(2) {
            let high = pair.get(1).copied().unwrap_or(0);
            writer.write_u8_aligned(pair[0] | high << 4)?;
        }
        Ok(())
    }
}

/// `EGTS_SR_ABS_LOOPIN_DATA`: state of one loop input.
///
/// Packed little-endian as `state << 12 | number`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbsLoopin {
    /// Input number, 12 bits.
    pub number: u16,
    /// Input state, 4 bits.
    pub state: u8,
}

impl SubrecordCodec for AbsLoopin {
    const TYPE: SubrecordType = SubrecordType::AbsLoopinData;

    fn decode(payload: &[u8]) -> DecodeResult<Self> {
        let mut reader = BitReader::new(payload);
        let packed = reader.read_u16_aligned()?;
        Ok(Self {
            number: packed & 0x0FFF,
            state: (packed >> 12) as u8,
        })
    }

    fn encode_into(&self, writer: &mut BitWriter) -> EncodeResult<()> {
        ensure_width("loop input number", u64::from(self.number), 12)?;
        ensure_width("loop input state", u64::from(self.state), 4)?;
        writer.write_u16_aligned(u16::from(self.state) << 12 | self.number)?;
        Ok(())
    }
}
