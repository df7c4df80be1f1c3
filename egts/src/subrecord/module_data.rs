//! `EGTS_SR_MODULE_DATA`: description of one terminal module.

use bitstream::{BitReader, BitWriter};

use super::{read_cstring, write_cstring, SubrecordCodec, SubrecordType};
use crate::error::{DecodeResult, EncodeResult};

/// Module description reported by a terminal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModuleData {
    pub module_type: u8,
    pub vendor_id: u32,
    /// Major version in the high byte, minor in the low byte.
    pub firmware_version: u16,
    /// Major version in the high byte, minor in the low byte.
    pub software_version: u16,
    pub modification: u8,
    /// 1 = on, 0 = off, above 127 = fault.
    pub state: u8,
    pub serial_number: String,
    pub description: String,
}

impl SubrecordCodec for ModuleData {
    const TYPE: SubrecordType = SubrecordType::ModuleData;

    fn decode(payload: &[u8]) -> DecodeResult<Self> {
        let mut reader = BitReader::new(payload);
        Ok(Self {
            module_type: reader.read_u8_aligned()?,
            vendor_id: reader.read_u32_aligned()?,
            firmware_version: reader.read_u16_aligned()?,
            software_version: reader.read_u16_aligned()?,
            modification: reader.read_u8_aligned()?,
            state: reader.read_u8_aligned()?,
            serial_number: read_cstring(&mut reader)?,
            description: read_cstring(&mut reader)?,
        })
    }

    fn encode_into(&self, writer: &mut BitWriter) -> EncodeResult<()> {
        writer.write_u8_aligned(self.module_type)?;
        writer.write_u32_aligned(self.vendor_id)?;
        writer.write_u16_aligned(self.firmware_version)?;
        writer.write_u16_aligned(self.software_version)?;
        writer.write_u8_aligned(self.modification)?;
        writer.write_u8_aligned(self.state)?;
        write_cstring(writer, "serial_number", &self.serial_number)?;
        write_cstring(writer, "description", &self.description)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DecodeError, EncodeError};

    fn sample() -> ModuleData {
        ModuleData {
            module_type: 1,
            vendor_id: 0x0102_0304,
            firmware_version: 0x0203,
            software_version: 0x0110,
            modification: 4,
            state: 1,
            serial_number: "SN-42".into(),
            description: "main unit".into(),
        }
    }

    #[test]
    fn layout() {
        let bytes = sample().encode().unwrap();
        assert_eq!(
            &bytes[..11],
            &[0x01, 0x04, 0x03, 0x02, 0x01, 0x03, 0x02, 0x10, 0x01, 0x04, 0x01]
        );
        assert_eq!(&bytes[11..], b"SN-42\0main unit\0");
        assert_eq!(ModuleData::decode(&bytes).unwrap(), sample());
    }

    #[test]
    fn empty_strings() {
        let module = ModuleData::default();
        let bytes = module.encode().unwrap();
        assert_eq!(bytes.len(), 11 + 2);
        assert_eq!(ModuleData::decode(&bytes).unwrap(), module);
    }

    #[test]
    fn missing_terminator_is_truncated() {
        let mut bytes = sample().encode().unwrap();
        bytes.pop();
        let err = ModuleData::decode(&bytes).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { .. }));
    }

    #[test]
    fn embedded_nul_rejected() {
        let module = ModuleData {
            description: "bad\0desc".into(),
            ..sample()
        };
        assert_eq!(
            module.encode().unwrap_err(),
            EncodeError::EmbeddedNul {
                field: "description"
            }
        );
    }
}
