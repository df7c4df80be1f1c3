//! `EGTS_SR_TERM_IDENTITY`: terminal identification sent during authentication.

use bitstream::{BitReader, BitWriter};

use super::{read_fixed_text, write_fixed_text, SubrecordCodec, SubrecordType};
use crate::error::{DecodeResult, EncodeResult};

const IMEI_LEN: usize = 15;
const IMSI_LEN: usize = 16;
const LANGUAGE_LEN: usize = 3;
const MSISDN_LEN: usize = 15;

/// Terminal identity.
///
/// Flag byte, MSB first: `MNE BSE NIDE SSRA LNGCE IMSIE IMEIE HDIDE`.
/// Optional fields follow in the reverse order of their flags.
///
/// The fixed-width text fields are decoded lossily. A field holding bytes
/// that are not UTF-8 comes back with replacement characters, longer than
/// its wire width, and re-encoding it fails with
/// [`EncodeError::FieldLength`](crate::EncodeError::FieldLength).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TermIdentity {
    /// Terminal identifier assigned by the platform.
    pub terminal_id: u32,
    /// Whether the terminal uses the simple (`true`) or service-request
    /// authentication algorithm.
    pub simple_auth: bool,
    pub home_dispatcher_id: Option<u16>,
    /// 15 ASCII digits.
    pub imei: Option<String>,
    /// 16 ASCII digits.
    pub imsi: Option<String>,
    /// ISO 639-2 code, 3 characters.
    pub language_code: Option<String>,
    /// Mobile network identifier.
    pub network_id: Option<[u8; 3]>,
    /// Receive buffer size in bytes.
    pub buffer_size: Option<u16>,
    /// 15 ASCII digits.
    pub msisdn: Option<String>,
}

impl SubrecordCodec for TermIdentity {
    const TYPE: SubrecordType = SubrecordType::TermIdentity;

    fn decode(payload: &[u8]) -> DecodeResult<Self> {
        let mut reader = BitReader::new(payload);
        let terminal_id = reader.read_u32_aligned()?;

        let has_msisdn = reader.read_bit()?;
        let has_buffer_size = reader.read_bit()?;
        let has_network_id = reader.read_bit()?;
        let simple_auth = reader.read_bit()?;
        let has_language = reader.read_bit()?;
        let has_imsi = reader.read_bit()?;
        let has_imei = reader.read_bit()?;
        let has_home_dispatcher = reader.read_bit()?;

        let home_dispatcher_id = if has_home_dispatcher {
            Some(reader.read_u16_aligned()?)
        } else {
            None
        };
        let imei = if has_imei {
            Some(read_fixed_text(&mut reader, IMEI_LEN)?)
        } else {
            None
        };
        let imsi = if has_imsi {
            Some(read_fixed_text(&mut reader, IMSI_LEN)?)
        } else {
            None
        };
        let language_code = if has_language {
            Some(read_fixed_text(&mut reader, LANGUAGE_LEN)?)
        } else {
            None
        };
        let network_id = if has_network_id {
            Some(reader.read_array::<3>()?)
        } else {
            None
        };
        let buffer_size = if has_buffer_size {
            Some(reader.read_u16_aligned()?)
        } else {
            None
        };
        let msisdn = if has_msisdn {
            Some(read_fixed_text(&mut reader, MSISDN_LEN)?)
        } else {
            None
        };

        Ok(Self {
            terminal_id,
            simple_auth,
            home_dispatcher_id,
            imei,
            imsi,
            language_code,
            network_id,
            buffer_size,
            msisdn,
        })
    }

    fn encode_into(&self, writer: &mut BitWriter) -> EncodeResult<()> {
        writer.write_u32_aligned(self.terminal_id)?;

        writer.write_bit(self.msisdn.is_some());
        writer.write_bit(self.buffer_size.is_some());
        writer.write_bit(self.network_id.is_some());
        writer.write_bit(self.simple_auth);
        writer.write_bit(self.language_code.is_some());
        writer.write_bit(self.imsi.is_some());
        writer.write_bit(self.imei.is_some());
        writer.write_bit(self.home_dispatcher_id.is_some());

        if let Some(id) = self.home_dispatcher_id {
            writer.write_u16_aligned(id)?;
        }
        if let Some(imei) = &self.imei {
            write_fixed_text(writer, "imei", imei, IMEI_LEN)?;
        }
        if let Some(imsi) = &self.imsi {
            write_fixed_text(writer, "imsi", imsi, IMSI_LEN)?;
        }
        if let Some(language) = &self.language_code {
            write_fixed_text(writer, "language_code", language, LANGUAGE_LEN)?;
        }
        if let Some(network_id) = &self.network_id {
            writer.write_bytes(network_id)?;
        }
        if let Some(size) = self.buffer_size {
            writer.write_u16_aligned(size)?;
        }
        if let Some(msisdn) = &self.msisdn {
            write_fixed_text(writer, "msisdn", msisdn, MSISDN_LEN)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DecodeError, EncodeError};

    fn full() -> TermIdentity {
        TermIdentity {
            terminal_id: 1001,
            simple_auth: true,
            home_dispatcher_id: Some(7),
            imei: Some("356307042441013".into()),
            imsi: Some("0250990000000001".into()),
            language_code: Some("rus".into()),
            network_id: Some([0x02, 0xFA, 0x01]),
            buffer_size: Some(1024),
            msisdn: Some("079001234567890".into()),
        }
    }

    #[test]
    fn minimal_layout() {
        let identity = TermIdentity {
            terminal_id: 0x0000_03E9,
            buffer_size: Some(0x0400),
            imei: Some("356307042441013".into()),
            ..TermIdentity::default()
        };
        let bytes = identity.encode().unwrap();
        assert_eq!(&bytes[..5], &[0xE9, 0x03, 0x00, 0x00, 0b0100_0010]);
        assert_eq!(&bytes[5..20], b"356307042441013");
        assert_eq!(&bytes[20..], &[0x00, 0x04]);
        assert_eq!(TermIdentity::decode(&bytes).unwrap(), identity);
    }

    #[test]
    fn all_fields_roundtrip() {
        let identity = full();
        let bytes = identity.encode().unwrap();
        assert_eq!(bytes.len(), 4 + 1 + 2 + 15 + 16 + 3 + 3 + 2 + 15);
        assert_eq!(bytes[4], 0xFF);
        assert_eq!(TermIdentity::decode(&bytes).unwrap(), identity);
    }

    #[test]
    fn flagged_field_missing_is_truncated() {
        // IMEIE set, but no IMEI follows.
        let err = TermIdentity::decode(&[1, 0, 0, 0, 0b0000_0010, b'3']).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { .. }));
    }

    #[test]
    fn non_utf8_imei_cannot_be_reencoded() {
        let mut bytes = TermIdentity {
            imei: Some("356307042441013".into()),
            ..TermIdentity::default()
        }
        .encode()
        .unwrap();
        bytes[5] = 0xFF;

        let identity = TermIdentity::decode(&bytes).unwrap();
        let imei = identity.imei.as_deref().unwrap();
        assert!(imei.starts_with('\u{FFFD}'));
        assert!(imei.len() > IMEI_LEN);
        assert_eq!(
            identity.encode().unwrap_err(),
            EncodeError::FieldLength {
                field: "imei",
                expected: IMEI_LEN,
                actual: imei.len(),
            }
        );
    }

    #[test]
    fn short_imei_rejected_on_encode() {
        let identity = TermIdentity {
            imei: Some("12345".into()),
            ..TermIdentity::default()
        };
        let err = identity.encode().unwrap_err();
        assert!(matches!(err, EncodeError::FieldLength { field: "imei", .. }));
    }
}
