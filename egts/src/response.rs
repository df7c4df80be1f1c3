//! `EGTS_PT_RESPONSE` body.

use bitstream::{BitReader, BitWriter};

use crate::error::{DecodeResult, EncodeResult};
use crate::limits::Limits;
use crate::result_code::ResultCode;
use crate::service::ServiceDataSet;

/// Acknowledgement of a received packet, optionally followed by records
/// that acknowledge individual service records.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PtResponse {
    /// Identifier of the packet being acknowledged.
    pub response_packet_id: u16,
    pub processing_result: ResultCode,
    pub records: ServiceDataSet,
}

impl PtResponse {
    /// Decodes a response body with default limits.
    pub fn decode(bytes: &[u8]) -> DecodeResult<Self> {
        Self::decode_with_limits(bytes, &Limits::default())
    }

    pub fn decode_with_limits(bytes: &[u8], limits: &Limits) -> DecodeResult<Self> {
        let mut reader = BitReader::new(bytes);
        let response_packet_id = reader.read_u16_aligned()?;
        let processing_result = ResultCode::from_raw(reader.read_u8_aligned()?);
        let records = ServiceDataSet::decode_with_limits(reader.read_remaining()?, limits)?;
        Ok(Self {
            response_packet_id,
            processing_result,
            records,
        })
    }

    pub fn encode_into(&self, writer: &mut BitWriter) -> EncodeResult<()> {
        writer.write_u16_aligned(self.response_packet_id)?;
        writer.write_u8_aligned(self.processing_result.raw())?;
        self.records.encode_into(writer)
    }

    pub fn encode(&self) -> EncodeResult<Vec<u8>> {
        let mut writer = BitWriter::new();
        self.encode_into(&mut writer)?;
        Ok(writer.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use crate::record::RecordSet;
    use crate::service::ServiceDataRecord;
    use crate::subrecord::{RecordResponse, Subrecord};
    use crate::types::ServiceType;

    #[test]
    fn bare_response() {
        let response = PtResponse::decode(&[0x05, 0x88, 0x00]).unwrap();
        assert_eq!(response.response_packet_id, 0x8805);
        assert!(response.processing_result.is_ok());
        assert!(response.records.is_empty());
        assert_eq!(response.encode().unwrap(), vec![0x05, 0x88, 0x00]);
    }

    #[test]
    fn response_with_acknowledgements() {
        let ack = ServiceDataRecord::new(
            1,
            ServiceType::TELEDATA,
            ServiceType::TELEDATA,
            RecordSet::from(vec![Subrecord::Response(RecordResponse {
                confirmed_record_number: 0x8806,
                status: ResultCode::OK,
            })]),
        );
        let response = PtResponse {
            response_packet_id: 0x8805,
            processing_result: ResultCode::OK,
            records: ServiceDataSet::from(vec![ack]),
        };
        let bytes = response.encode().unwrap();
        assert_eq!(bytes.len(), 3 + 7 + 6);
        assert_eq!(PtResponse::decode(&bytes).unwrap(), response);
    }

    #[test]
    fn too_short() {
        let err = PtResponse::decode(&[0x05, 0x88]).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { .. }));
    }
}
