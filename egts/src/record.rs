//! Record-set codec: the `(type, length, payload)` triples inside a service record.

use bitstream::{BitReader, BitWriter};
use tracing::trace;

use crate::error::{DecodeError, DecodeResult, EncodeError, EncodeResult, LimitKind};
use crate::limits::Limits;
use crate::subrecord::Subrecord;

/// Bytes in front of every subrecord payload: type `u8` plus length `u16`.
pub const SUBRECORD_HEADER_LEN: usize = 3;

/// Ordered subrecords of one service data record.
///
/// The wire tag of each entry is derived from its variant and its length
/// from its encoded payload, so neither can disagree with the data.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RecordSet(Vec<Subrecord>);

impl RecordSet {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Decodes a record set with default limits.
    pub fn decode(bytes: &[u8]) -> DecodeResult<Self> {
        Self::decode_with_limits(bytes, &Limits::default())
    }

    /// Decodes triples until `bytes` is exhausted.
    ///
    /// An unknown type tag fails the whole set. A failing payload is wrapped
    /// in [`DecodeError::Subrecord`] with the offset of its triple.
    pub fn decode_with_limits(bytes: &[u8], limits: &Limits) -> DecodeResult<Self> {
        let mut reader = BitReader::new(bytes);
        let mut subrecords = Vec::new();

        while !reader.is_empty() {
            if subrecords.len() == limits.max_subrecords {
                return Err(DecodeError::LimitsExceeded {
                    kind: LimitKind::Subrecords,
                    limit: limits.max_subrecords,
                    actual: subrecords.len() + 1,
                });
            }
            let offset = reader.byte_position();
            let tag = reader.read_u8_aligned()?;
            let length = reader.read_u16_aligned()?;
            let payload = reader.read_bytes(usize::from(length))?;

            let subrecord = Subrecord::decode(tag, payload).map_err(|err| match err {
                DecodeError::UnknownSubrecordType { .. } => err,
                source => DecodeError::Subrecord {
                    tag,
                    offset,
                    source: Box::new(source),
                },
            })?;
            trace!(tag, length, offset, "decoded subrecord");
            subrecords.push(subrecord);
        }

        Ok(Self(subrecords))
    }

    /// Appends every triple to `writer`.
    pub fn encode_into(&self, writer: &mut BitWriter) -> EncodeResult<()> {
        for subrecord in &self.0 {
            let payload = subrecord.encode()?;
            let length = u16::try_from(payload.len()).map_err(|_| EncodeError::LengthOverflow {
                field: "subrecord",
                length: payload.len(),
            })?;
            writer.write_u8_aligned(subrecord.subrecord_type().raw())?;
            writer.write_u16_aligned(length)?;
            writer.write_bytes(&payload)?;
        }
        Ok(())
    }

    pub fn encode(&self) -> EncodeResult<Vec<u8>> {
        let mut writer = BitWriter::new();
        self.encode_into(&mut writer)?;
        Ok(writer.finish())
    }

    /// Encoded length of the whole set.
    pub fn total_length(&self) -> EncodeResult<u16> {
        let length = self
            .0
            .iter()
            .map(|subrecord| {
                subrecord
                    .wire_length()
                    .map(|len| usize::from(len) + SUBRECORD_HEADER_LEN)
            })
            .sum::<EncodeResult<usize>>()?;
        u16::try_from(length).map_err(|_| EncodeError::LengthOverflow {
            field: "record set",
            length,
        })
    }

    pub fn push(&mut self, subrecord: Subrecord) {
        self.0.push(subrecord);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Subrecord> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Subrecord] {
        &self.0
    }

    /// Returns `true` if any subrecord identifies or authenticates a terminal.
    #[must_use]
    pub fn has_identification(&self) -> bool {
        self.0.iter().any(Subrecord::is_identification)
    }
}

impl From<Vec<Subrecord>> for RecordSet {
    fn from(subrecords: Vec<Subrecord>) -> Self {
        Self(subrecords)
    }
}

impl FromIterator<Subrecord> for RecordSet {
    fn from_iter<I: IntoIterator<Item = Subrecord>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for RecordSet {
    type Item = Subrecord;
    type IntoIter = std::vec::IntoIter<Subrecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Subrecord;
    type IntoIter = std::slice::Iter<'a, Subrecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
