//! `EGTS_SR_AUTH_INFO`: credentials sent by a terminal.

use bitstream::{BitReader, BitWriter};

use super::{read_cstring, write_cstring, SubrecordCodec, SubrecordType};
use crate::error::{DecodeResult, EncodeResult};

/// NUL-delimited user name, password and optional server sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuthInfo {
    pub user_name: String,
    pub user_password: String,
    /// Present only with the service-request authentication algorithm.
    pub server_sequence: Option<String>,
}

impl SubrecordCodec for AuthInfo {
    const TYPE: SubrecordType = SubrecordType::AuthInfo;

    fn decode(payload: &[u8]) -> DecodeResult<Self> {
        let mut reader = BitReader::new(payload);
        let user_name = read_cstring(&mut reader)?;
        let user_password = read_cstring(&mut reader)?;
        let server_sequence = if reader.is_empty() {
            None
        } else {
            Some(read_cstring(&mut reader)?)
        };
        Ok(Self {
            user_name,
            user_password,
            server_sequence,
        })
    }

    fn encode_into(&self, writer: &mut BitWriter) -> EncodeResult<()> {
        write_cstring(writer, "user_name", &self.user_name)?;
        write_cstring(writer, "user_password", &self.user_password)?;
        if let Some(sequence) = &self.server_sequence {
            write_cstring(writer, "server_sequence", sequence)?;
        }
        Ok(())
    }
}
