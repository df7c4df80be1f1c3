//! `EGTS_SR_DISPATCHER_IDENTITY`: dispatcher authentication on the platform.

use bitstream::{BitReader, BitWriter};

use super::{decode_text, SubrecordCodec, SubrecordType};
use crate::error::{DecodeResult, EncodeResult};

/// Dispatcher identity. The description runs to the end of the subrecord.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DispatcherIdentity {
    pub dispatcher_type: u8,
    pub dispatcher_id: u32,
    pub description: String,
}

impl SubrecordCodec for DispatcherIdentity {
    const TYPE: SubrecordType = SubrecordType::DispatcherIdentity;

    fn decode(payload: &[u8]) -> DecodeResult<Self> {
        let mut reader = BitReader::new(payload);
        Ok(Self {
            dispatcher_type: reader.read_u8_aligned()?,
            dispatcher_id: reader.read_u32_aligned()?,
            description: decode_text(reader.read_remaining()?),
        })
    }

    fn encode_into(&self, writer: &mut BitWriter) -> EncodeResult<()> {
        writer.write_u8_aligned(self.dispatcher_type)?;
        writer.write_u32_aligned(self.dispatcher_id)?;
        writer.write_bytes(self.description.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout() {
        let identity = DispatcherIdentity {
            dispatcher_type: 0,
            dispatcher_id: 0x0000_0457,
            description: "dispatcher".into(),
        };
        let bytes = identity.encode().unwrap();
        assert_eq!(&bytes[..5], &[0x00, 0x57, 0x04, 0x00, 0x00]);
        assert_eq!(&bytes[5..], b"dispatcher");
        assert_eq!(DispatcherIdentity::decode(&bytes).unwrap(), identity);
    }

    #[test]
    fn empty_description() {
        let identity = DispatcherIdentity::decode(&[1, 2, 0, 0, 0]).unwrap();
        assert_eq!(identity.dispatcher_id, 2);
        assert!(identity.description.is_empty());
    }

    #[test]
    fn truncated_id() {
        assert!(DispatcherIdentity::decode(&[1, 2, 0]).is_err());
    }
}
