//! Acknowledgement subrecords: record response and result code.

use bitstream::{BitReader, BitWriter};

use super::{SubrecordCodec, SubrecordType};
use crate::error::{DecodeResult, EncodeResult};
use crate::result_code::ResultCode;

/// `EGTS_SR_RECORD_RESPONSE`: confirms processing of one service record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecordResponse {
    /// Number of the record being confirmed.
    pub confirmed_record_number: u16,
    /// Processing status of that record.
    pub status: ResultCode,
}

impl SubrecordCodec for RecordResponse {
    const TYPE: SubrecordType = SubrecordType::RecordResponse;

    fn decode(payload: &[u8]) -> DecodeResult<Self> {
        let mut reader = BitReader::new(payload);
        Ok(Self {
            confirmed_record_number: reader.read_u16_aligned()?,
            status: ResultCode::from_raw(reader.read_u8_aligned()?),
        })
    }

    fn encode_into(&self, writer: &mut BitWriter) -> EncodeResult<()> {
        writer.write_u16_aligned(self.confirmed_record_number)?;
        writer.write_u8_aligned(self.status.raw())?;
        Ok(())
    }
}

/// `EGTS_SR_RESULT_CODE`: outcome of terminal authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResultCodeRecord {
    pub result_code: ResultCode,
}

impl SubrecordCodec for ResultCodeRecord {
    const TYPE: SubrecordType = SubrecordType::ResultCode;

    fn decode(payload: &[u8]) -> DecodeResult<Self> {
        let mut reader = BitReader::new(payload);
        Ok(Self {
            result_code: ResultCode::from_raw(reader.read_u8_aligned()?),
        })
    }

    fn encode_into(&self, writer: &mut BitWriter) -> EncodeResult<()> {
        writer.write_u8_aligned(self.result_code.raw())?;
        Ok(())
    }
}
