//! Service data records: the routed units inside an application-data body.

use bitstream::{BitReader, BitWriter};
use chrono::{DateTime, Utc};
use tracing::trace;

use crate::error::{DecodeError, DecodeResult, EncodeError, EncodeResult, LimitKind};
use crate::limits::Limits;
use crate::record::RecordSet;
use crate::time::{from_egts_seconds, to_egts_seconds};
use crate::types::{Priority, ServiceType};

/// One service data record.
///
/// Flag byte, MSB first: `SSOD RSOD GRP RPP(2) TMFE EVFE OBFE`. The
/// presence bits are derived from the optional fields and the record
/// length from the encoded record set.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceDataRecord {
    pub record_number: u16,
    /// Source service runs on the terminal.
    pub source_on_device: bool,
    /// Recipient service runs on the terminal.
    pub recipient_on_device: bool,
    /// Record belongs to a group of objects.
    pub group: bool,
    pub priority: Priority,
    pub object_id: Option<u32>,
    pub event_id: Option<u32>,
    pub time: Option<DateTime<Utc>>,
    pub source_service: ServiceType,
    pub recipient_service: ServiceType,
    pub records: RecordSet,
}

impl ServiceDataRecord {
    /// Creates a record with no optional fields and all flags clear.
    #[must_use]
    pub fn new(
        record_number: u16,
        source_service: ServiceType,
        recipient_service: ServiceType,
        records: RecordSet,
    ) -> Self {
        Self {
            record_number,
            source_on_device: false,
            recipient_on_device: false,
            group: false,
            priority: Priority::default(),
            object_id: None,
            event_id: None,
            time: None,
            source_service,
            recipient_service,
            records,
        }
    }

    fn read(reader: &mut BitReader<'_>, limits: &Limits) -> DecodeResult<Self> {
        let length = reader.read_u16_aligned()?;
        let record_number = reader.read_u16_aligned()?;

        let source_on_device = reader.read_bit()?;
        let recipient_on_device = reader.read_bit()?;
        let group = reader.read_bit()?;
        let priority = Priority::from_bits(reader.read_bits(2)? as u8);
        let has_time = reader.read_bit()?;
        let has_event = reader.read_bit()?;
        let has_object = reader.read_bit()?;

        let object_id = if has_object {
            Some(reader.read_u32_aligned()?)
        } else {
            None
        };
        let event_id = if has_event {
            Some(reader.read_u32_aligned()?)
        } else {
            None
        };
        let time = if has_time {
            let seconds = reader.read_u32_aligned()?;
            Some(
                from_egts_seconds(seconds)
                    .ok_or_else(|| DecodeError::invalid("record time", seconds))?,
            )
        } else {
            None
        };
        let source_service = ServiceType::from_raw(reader.read_u8_aligned()?);
        let recipient_service = ServiceType::from_raw(reader.read_u8_aligned()?);
        let data = reader.read_bytes(usize::from(length))?;
        let records = RecordSet::decode_with_limits(data, limits)?;

        Ok(Self {
            record_number,
            source_on_device,
            recipient_on_device,
            group,
            priority,
            object_id,
            event_id,
            time,
            source_service,
            recipient_service,
            records,
        })
    }

    /// Appends the record to `writer`.
    pub fn encode_into(&self, writer: &mut BitWriter) -> EncodeResult<()> {
        let data = self.records.encode()?;
        let length = u16::try_from(data.len()).map_err(|_| EncodeError::LengthOverflow {
            field: "record data",
            length: data.len(),
        })?;
        let seconds = match &self.time {
            Some(time) => Some(
                to_egts_seconds(time).ok_or(EncodeError::TimestampOutOfRange { field: "time" })?,
            ),
            None => None,
        };

        writer.write_u16_aligned(length)?;
        writer.write_u16_aligned(self.record_number)?;

        writer.write_bit(self.source_on_device);
        writer.write_bit(self.recipient_on_device);
        writer.write_bit(self.group);
        writer.write_bits(u64::from(self.priority.bits()), 2)?;
        writer.write_bit(seconds.is_some());
        writer.write_bit(self.event_id.is_some());
        writer.write_bit(self.object_id.is_some());

        if let Some(object_id) = self.object_id {
            writer.write_u32_aligned(object_id)?;
        }
        if let Some(event_id) = self.event_id {
            writer.write_u32_aligned(event_id)?;
        }
        if let Some(seconds) = seconds {
            writer.write_u32_aligned(seconds)?;
        }
        writer.write_u8_aligned(self.source_service.raw())?;
        writer.write_u8_aligned(self.recipient_service.raw())?;
        writer.write_bytes(&data)?;
        Ok(())
    }

    /// Encodes the record on its own.
    pub fn encode(&self) -> EncodeResult<Vec<u8>> {
        let mut writer = BitWriter::new();
        self.encode_into(&mut writer)?;
        Ok(writer.finish())
    }
}

/// The body of an application-data packet.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ServiceDataSet(Vec<ServiceDataRecord>);

impl ServiceDataSet {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Decodes a body with default limits.
    pub fn decode(bytes: &[u8]) -> DecodeResult<Self> {
        Self::decode_with_limits(bytes, &Limits::default())
    }

    /// Decodes records until `bytes` is exhausted.
    ///
    /// A failing record is wrapped in [`DecodeError::ServiceRecord`] with its
    /// index and byte offset.
    pub fn decode_with_limits(bytes: &[u8], limits: &Limits) -> DecodeResult<Self> {
        let mut reader = BitReader::new(bytes);
        let mut records = Vec::new();

        while !reader.is_empty() {
            if records.len() == limits.max_service_records {
                return Err(DecodeError::LimitsExceeded {
                    kind: LimitKind::ServiceRecords,
                    limit: limits.max_service_records,
                    actual: records.len() + 1,
                });
            }
            let offset = reader.byte_position();
            let record = ServiceDataRecord::read(&mut reader, limits).map_err(|err| {
                DecodeError::ServiceRecord {
                    index: records.len(),
                    offset,
                    source: Box::new(err),
                }
            })?;
            trace!(
                record_number = record.record_number,
                subrecords = record.records.len(),
                offset,
                "decoded service record"
            );
            records.push(record);
        }

        Ok(Self(records))
    }

    pub fn encode_into(&self, writer: &mut BitWriter) -> EncodeResult<()> {
        for record in &self.0 {
            record.encode_into(writer)?;
        }
        Ok(())
    }

    pub fn encode(&self) -> EncodeResult<Vec<u8>> {
        let mut writer = BitWriter::new();
        self.encode_into(&mut writer)?;
        Ok(writer.finish())
    }

    pub fn push(&mut self, record: ServiceDataRecord) {
        self.0.push(record);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ServiceDataRecord> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ServiceDataRecord] {
        &self.0
    }
}

impl From<Vec<ServiceDataRecord>> for ServiceDataSet {
    fn from(records: Vec<ServiceDataRecord>) -> Self {
        Self(records)
    }
}

impl FromIterator<ServiceDataRecord> for ServiceDataSet {
    fn from_iter<I: IntoIterator<Item = ServiceDataRecord>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ServiceDataSet {
    type Item = ServiceDataRecord;
    type IntoIter = std::vec::IntoIter<ServiceDataRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ServiceDataSet {
    type Item = &'a ServiceDataRecord;
    type IntoIter = std::slice::Iter<'a, ServiceDataRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
