//! `EGTS_SR_EGTSPLUS_DATA`: vendor extension payload.

use bitstream::{BitReader, BitWriter};

use super::{SubrecordCodec, SubrecordType};
use crate::error::{DecodeResult, EncodeResult};

/// Extension payload carried verbatim; its inner encoding is vendor specific.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlusData {
    pub data: Vec<u8>,
}

impl SubrecordCodec for PlusData {
    const TYPE: SubrecordType = SubrecordType::EgtsPlusData;

    fn decode(payload: &[u8]) -> DecodeResult<Self> {
        let mut reader = BitReader::new(payload);
        Ok(Self {
            data: reader.read_remaining()?.to_vec(),
        })
    }

    fn encode_into(&self, writer: &mut BitWriter) -> EncodeResult<()> {
        writer.write_bytes(&self.data)?;
        Ok(())
    }
}
