//! Transport packets: header, checksums, body dispatch and response synthesis.

use bitstream::{BitReader, BitWriter};
use thiserror::Error;
use tracing::debug;

use crate::checksum::{crc16, crc8};
use crate::counters::Counters;
use crate::error::{DecodeError, DecodeResult, EncodeError, EncodeResult};
use crate::options::CodecOptions;
use crate::record::RecordSet;
use crate::response::PtResponse;
use crate::result_code::ResultCode;
use crate::service::{ServiceDataRecord, ServiceDataSet};
use crate::subrecord::{RecordResponse, ResultCodeRecord, Subrecord};
use crate::types::{PacketType, Priority, ServiceType};

/// The only protocol version this codec speaks.
pub const PROTOCOL_VERSION: u8 = 1;

/// Header length without routing fields, checksum included.
pub const HEADER_LEN: usize = 11;

/// Header length with the routing triple.
pub const ROUTED_HEADER_LEN: usize = 16;

/// Length of the body checksum that follows a non-empty body.
pub const BODY_CRC_LEN: usize = 2;

/// Largest frame the wire format can describe.
pub const MAX_FRAME_LEN: usize = ROUTED_HEADER_LEN + u16::MAX as usize + BODY_CRC_LEN;

/// Packet flag byte without the routing bit.
///
/// Layout, MSB first: `PRF(2) RTE ENA(2) CMP PR(2)`. The `RTE` bit is
/// derived from [`PacketHeader::routing`] and never stored here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PacketFlags(u8);

impl PacketFlags {
    /// Routing fields present.
    pub const ROUTE: u8 = 1 << 5;

    /// Body is compressed.
    pub const COMPRESSED: u8 = 1 << 2;

    const PREFIX_SHIFT: u8 = 6;
    const ENCRYPTION_SHIFT: u8 = 3;
    const ENCRYPTION_MASK: u8 = 0b11 << Self::ENCRYPTION_SHIFT;
    const PRIORITY_MASK: u8 = 0b11;

    /// Creates flags from a wire byte, dropping the routing bit.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw & !Self::ROUTE)
    }

    /// Returns the flag bits, routing bit clear.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Two-bit header prefix; zero for every known header layout.
    #[must_use]
    pub const fn prefix(self) -> u8 {
        self.0 >> Self::PREFIX_SHIFT
    }

    /// Encryption algorithm code; zero means plain text.
    #[must_use]
    pub const fn encryption(self) -> u8 {
        (self.0 & Self::ENCRYPTION_MASK) >> Self::ENCRYPTION_SHIFT
    }

    #[must_use]
    pub const fn is_encrypted(self) -> bool {
        self.encryption() != 0
    }

    #[must_use]
    pub const fn is_compressed(self) -> bool {
        self.0 & Self::COMPRESSED != 0
    }

    #[must_use]
    pub const fn priority(self) -> Priority {
        Priority::from_bits(self.0)
    }

    #[must_use]
    pub const fn with_priority(self, priority: Priority) -> Self {
        Self(self.0 & !Self::PRIORITY_MASK | priority.bits())
    }

    /// Sets the encryption algorithm; only the low two bits of `algorithm` are kept.
    #[must_use]
    pub const fn with_encryption(self, algorithm: u8) -> Self {
        Self(self.0 & !Self::ENCRYPTION_MASK | (algorithm & 0b11) << Self::ENCRYPTION_SHIFT)
    }

    #[must_use]
    pub const fn with_compression(self, compressed: bool) -> Self {
        if compressed {
            Self(self.0 | Self::COMPRESSED)
        } else {
            Self(self.0 & !Self::COMPRESSED)
        }
    }
}

/// Optional routing triple carried by relayed packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Routing {
    /// Address of the platform that sent the packet.
    pub peer_address: u16,
    /// Address of the platform the packet is for.
    pub recipient_address: u16,
    pub time_to_live: u8,
}

/// Transport header.
///
/// Header length, frame data length and both checksums are computed on
/// encode and verified on decode, so they are not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PacketHeader {
    pub security_key_id: u8,
    pub flags: PacketFlags,
    pub header_encoding: u8,
    pub packet_id: u16,
    pub packet_type: PacketType,
    pub routing: Option<Routing>,
}

impl PacketHeader {
    /// Creates an unrouted, unencrypted header with highest priority.
    #[must_use]
    pub const fn new(packet_id: u16, packet_type: PacketType) -> Self {
        Self {
            security_key_id: 0,
            flags: PacketFlags::from_raw(0),
            header_encoding: 0,
            packet_id,
            packet_type,
            routing: None,
        }
    }

    /// Encoded header length, checksum included.
    #[must_use]
    pub const fn header_length(&self) -> usize {
        if self.routing.is_some() {
            ROUTED_HEADER_LEN
        } else {
            HEADER_LEN
        }
    }

    /// Decodes and verifies the header at the start of `bytes`.
    ///
    /// The header extent follows from the routing bit, and its checksum is
    /// verified before any field is interpreted.
    pub fn decode(bytes: &[u8]) -> DecodeResult<Self> {
        read_header(bytes).map(|frame| frame.header)
    }

    fn encode_into(&self, writer: &mut BitWriter, frame_data_length: u16) -> EncodeResult<()> {
        let mut flags = self.flags.raw();
        if self.routing.is_some() {
            flags |= PacketFlags::ROUTE;
        }
        let mut header = BitWriter::with_capacity(ROUTED_HEADER_LEN);
        header.write_u8_aligned(PROTOCOL_VERSION)?;
        header.write_u8_aligned(self.security_key_id)?;
        header.write_u8_aligned(flags)?;
        // Both header lengths fit in one byte.
        header.write_u8_aligned(self.header_length() as u8)?;
        header.write_u8_aligned(self.header_encoding)?;
        header.write_u16_aligned(frame_data_length)?;
        header.write_u16_aligned(self.packet_id)?;
        header.write_u8_aligned(self.packet_type.raw())?;
        if let Some(routing) = &self.routing {
            header.write_u16_aligned(routing.peer_address)?;
            header.write_u16_aligned(routing.recipient_address)?;
            header.write_u8_aligned(routing.time_to_live)?;
        }
        let header = header.finish();
        writer.write_bytes(&header)?;
        writer.write_u8_aligned(crc8(&header))?;
        Ok(())
    }
}

/// A verified header plus the lengths it declares.
struct RawFrame {
    header: PacketHeader,
    header_len: usize,
    frame_data_length: usize,
}

impl RawFrame {
    const fn total_len(&self) -> usize {
        frame_len(self.header_len, self.frame_data_length)
    }
}

/// Total frame length for the given header and body lengths.
pub(crate) const fn frame_len(header_len: usize, frame_data_length: usize) -> usize {
    if frame_data_length == 0 {
        header_len
    } else {
        header_len + frame_data_length + BODY_CRC_LEN
    }
}

fn read_header(bytes: &[u8]) -> DecodeResult<RawFrame> {
    if bytes.len() < HEADER_LEN {
        return Err(DecodeError::HeaderTruncated {
            needed: HEADER_LEN,
            available: bytes.len(),
        });
    }
    let header_len = if bytes[2] & PacketFlags::ROUTE == 0 {
        HEADER_LEN
    } else {
        ROUTED_HEADER_LEN
    };
    if bytes.len() < header_len {
        return Err(DecodeError::HeaderTruncated {
            needed: header_len,
            available: bytes.len(),
        });
    }

    let covered = &bytes[..header_len - 1];
    let expected = crc8(covered);
    let found = bytes[header_len - 1];
    if expected != found {
        return Err(DecodeError::HeaderChecksumMismatch { expected, found });
    }

    let mut reader = BitReader::new(covered);
    let version = reader.read_u8_aligned()?;
    if version != PROTOCOL_VERSION {
        return Err(DecodeError::UnsupportedVersion { found: version });
    }
    let security_key_id = reader.read_u8_aligned()?;
    let flags = PacketFlags::from_raw(reader.read_u8_aligned()?);
    let declared_len = reader.read_u8_aligned()?;
    if usize::from(declared_len) != header_len {
        return Err(DecodeError::InvalidHeaderLength {
            found: declared_len,
        });
    }
    let header_encoding = reader.read_u8_aligned()?;
    let frame_data_length = reader.read_u16_aligned()?;
    let packet_id = reader.read_u16_aligned()?;
    let raw_type = reader.read_u8_aligned()?;
    let packet_type = PacketType::from_raw(raw_type)
        .ok_or(DecodeError::UnsupportedPacketType { found: raw_type })?;
    let routing = if header_len == ROUTED_HEADER_LEN {
        Some(Routing {
            peer_address: reader.read_u16_aligned()?,
            recipient_address: reader.read_u16_aligned()?,
            time_to_live: reader.read_u8_aligned()?,
        })
    } else {
        None
    };

    Ok(RawFrame {
        header: PacketHeader {
            security_key_id,
            flags,
            header_encoding,
            packet_id,
            packet_type,
            routing,
        },
        header_len,
        frame_data_length: usize::from(frame_data_length),
    })
}

/// Decoded packet body, selected by the packet type.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Body {
    AppData(ServiceDataSet),
    Response(PtResponse),
}

impl Body {
    /// Packet type this body belongs to.
    #[must_use]
    pub const fn packet_type(&self) -> PacketType {
        match self {
            Self::AppData(_) => PacketType::AppData,
            Self::Response(_) => PacketType::Response,
        }
    }

    pub fn encode(&self) -> EncodeResult<Vec<u8>> {
        match self {
            Self::AppData(records) => records.encode(),
            Self::Response(response) => response.encode(),
        }
    }

    /// Service records carried by the body, if any.
    #[must_use]
    pub fn service_records(&self) -> &[ServiceDataRecord] {
        match self {
            Self::AppData(records) => records.as_slice(),
            Self::Response(response) => response.records.as_slice(),
        }
    }
}

/// A transport packet.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Packet {
    pub header: PacketHeader,
    /// `None` when the frame data length is zero.
    pub body: Option<Body>,
    /// Processing result reported by synthesized responses. Never on the
    /// wire; a decoded packet starts out `OK` and the caller may replace it
    /// (for example with `AUTH_DENIED`) before building a response.
    pub result_code: ResultCode,
}

impl Packet {
    /// Creates an application-data packet.
    #[must_use]
    pub const fn app_data(packet_id: u16, records: ServiceDataSet) -> Self {
        Self {
            header: PacketHeader::new(packet_id, PacketType::AppData),
            body: Some(Body::AppData(records)),
            result_code: ResultCode::OK,
        }
    }

    /// Creates a response packet.
    #[must_use]
    pub const fn response_packet(packet_id: u16, response: PtResponse) -> Self {
        Self {
            header: PacketHeader::new(packet_id, PacketType::Response),
            body: Some(Body::Response(response)),
            result_code: ResultCode::OK,
        }
    }

    /// Decodes exactly one frame.
    ///
    /// Both checksums are verified before the fields they cover are
    /// interpreted, and the body checksum covers the body as transmitted.
    /// On failure the returned [`PacketError`] keeps the header whenever it
    /// was verified, so the caller can still answer the terminal.
    pub fn decode(bytes: &[u8], options: &CodecOptions) -> Result<Self, PacketError> {
        let frame = read_header(bytes).map_err(|error| {
            debug!(result = %error.result_code(), %error, "rejected packet header");
            PacketError {
                header: None,
                error,
            }
        })?;
        let header = frame.header;
        let body = decode_body(&frame, bytes, options).map_err(|error| {
            debug!(
                packet_id = header.packet_id,
                result = %error.result_code(),
                %error,
                "rejected packet body"
            );
            PacketError {
                header: Some(header),
                error,
            }
        })?;
        Ok(Self {
            header,
            body,
            result_code: ResultCode::OK,
        })
    }

    /// Encodes the packet, encrypting the body when the flags ask for it.
    pub fn encode(&self, options: &CodecOptions) -> EncodeResult<Vec<u8>> {
        let flags = self.header.flags;
        if flags.is_compressed() {
            return Err(EncodeError::UnsupportedCompression);
        }
        let plain = match &self.body {
            Some(body) if body.packet_type() != self.header.packet_type => {
                return Err(EncodeError::BodyTypeMismatch {
                    packet_type: self.header.packet_type,
                });
            }
            Some(body) => body.encode()?,
            None => Vec::new(),
        };
        let body = if flags.is_encrypted() && !plain.is_empty() {
            let secret = options.secret().ok_or(EncodeError::MissingSecretKey)?;
            secret.encode(&plain).map_err(EncodeError::Encrypt)?
        } else {
            plain
        };
        let frame_data_length =
            u16::try_from(body.len()).map_err(|_| EncodeError::LengthOverflow {
                field: "frame data",
                length: body.len(),
            })?;

        let mut writer = BitWriter::with_capacity(frame_len(
            self.header.header_length(),
            body.len(),
        ));
        self.header.encode_into(&mut writer, frame_data_length)?;
        if !body.is_empty() {
            writer.write_bytes(&body)?;
            writer.write_u16_aligned(crc16(&body))?;
        }
        Ok(writer.finish())
    }

    /// Service records of the body, empty when there is none.
    #[must_use]
    pub fn service_records(&self) -> &[ServiceDataRecord] {
        self.body.as_ref().map_or(&[], Body::service_records)
    }

    /// Acknowledges every service record with `OK`.
    ///
    /// See [`response_with`](Self::response_with).
    pub fn response(&self, counters: &Counters) -> EncodeResult<Vec<u8>> {
        self.response_with(counters, |_| ResultCode::OK)
    }

    /// Encodes the packets built by [`response_packets`](Self::response_packets)
    /// back to back.
    pub fn response_with<F>(&self, counters: &Counters, status: F) -> EncodeResult<Vec<u8>>
    where
        F: FnMut(&ServiceDataRecord) -> ResultCode,
    {
        let options = CodecOptions::default();
        let mut out = Vec::new();
        for packet in self.response_packets(counters, status) {
            out.extend_from_slice(&packet.encode(&options)?);
        }
        Ok(out)
    }

    /// Builds the packets that answer this one.
    ///
    /// The first is a response echoing this packet's identifier and
    /// [`result_code`](Self::result_code), with one acknowledgement record
    /// per received service record carrying the status chosen by `status`.
    /// When any received record held a terminal identity or auth info
    /// subrecord, a second response follows with an `AUTH` service record
    /// holding the result code. Identifiers come from `counters`. Response
    /// packets are not answered, so they yield nothing.
    pub fn response_packets<F>(&self, counters: &Counters, mut status: F) -> Vec<Self>
    where
        F: FnMut(&ServiceDataRecord) -> ResultCode,
    {
        if self.header.packet_type != PacketType::AppData {
            return Vec::new();
        }
        let received = self.service_records();

        let acknowledgements: ServiceDataSet = received
            .iter()
            .map(|record| {
                let ack = Subrecord::Response(RecordResponse {
                    confirmed_record_number: record.record_number,
                    status: status(record),
                });
                ServiceDataRecord {
                    group: true,
                    ..ServiceDataRecord::new(
                        counters.next_record_number(),
                        record.source_service,
                        record.source_service,
                        RecordSet::from(vec![ack]),
                    )
                }
            })
            .collect();
        let mut packets = vec![self.reply(
            counters.next_packet_id(),
            PtResponse {
                response_packet_id: self.header.packet_id,
                processing_result: self.result_code,
                records: acknowledgements,
            },
        )];

        if received.iter().any(|record| record.records.has_identification()) {
            let result = ServiceDataRecord {
                group: true,
                ..ServiceDataRecord::new(
                    counters.next_record_number(),
                    ServiceType::AUTH,
                    ServiceType::AUTH,
                    RecordSet::from(vec![Subrecord::ResultCode(ResultCodeRecord {
                        result_code: self.result_code,
                    })]),
                )
            };
            packets.push(self.reply(
                counters.next_packet_id(),
                PtResponse {
                    response_packet_id: self.header.packet_id,
                    processing_result: self.result_code,
                    records: ServiceDataSet::from(vec![result]),
                },
            ));
        }

        debug!(
            packet_id = self.header.packet_id,
            records = received.len(),
            packets = packets.len(),
            "synthesized response"
        );
        packets
    }

    fn reply(&self, packet_id: u16, response: PtResponse) -> Self {
        let mut packet = Self::response_packet(packet_id, response);
        packet.header.security_key_id = self.header.security_key_id;
        packet
    }
}

fn decode_body(
    frame: &RawFrame,
    bytes: &[u8],
    options: &CodecOptions,
) -> DecodeResult<Option<Body>> {
    let declared = frame.total_len();
    if declared != bytes.len() {
        return Err(DecodeError::FrameLengthMismatch {
            declared,
            actual: bytes.len(),
        });
    }
    let header = &frame.header;
    if header.flags.is_compressed() {
        return Err(DecodeError::UnsupportedCompression);
    }
    if frame.frame_data_length == 0 {
        return Ok(None);
    }

    let body_end = frame.header_len + frame.frame_data_length;
    let raw = &bytes[frame.header_len..body_end];
    let found = u16::from_le_bytes([bytes[body_end], bytes[body_end + 1]]);
    let expected = crc16(raw);
    if expected != found {
        return Err(DecodeError::BodyChecksumMismatch { expected, found });
    }

    let decrypted;
    let plain = if header.flags.is_encrypted() {
        let secret = options.secret().ok_or(DecodeError::MissingSecretKey)?;
        decrypted = secret.decode(raw).map_err(DecodeError::Decrypt)?;
        decrypted.as_slice()
    } else {
        raw
    };

    let limits = options.limits();
    match header.packet_type {
        PacketType::AppData => Ok(Some(Body::AppData(ServiceDataSet::decode_with_limits(
            plain, limits,
        )?))),
        PacketType::Response => Ok(Some(Body::Response(PtResponse::decode_with_limits(
            plain, limits,
        )?))),
        packet_type @ PacketType::SignedAppData => {
            Err(DecodeError::UnsupportedBodyType { packet_type })
        }
    }
}

/// A failed [`Packet::decode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct PacketError {
    /// The header, when its checksum was verified before the failure.
    pub header: Option<PacketHeader>,
    #[source]
    pub error: DecodeError,
}

impl PacketError {
    /// Status code describing the failure.
    #[must_use]
    pub fn result_code(&self) -> ResultCode {
        self.error.result_code()
    }

    /// Builds a bare response carrying the failure's result code.
    ///
    /// Returns `None` when the header itself could not be trusted.
    #[must_use]
    pub fn response_packet(&self, counters: &Counters) -> Option<Packet> {
        let header = self.header.as_ref()?;
        let mut packet = Packet::response_packet(
            counters.next_packet_id(),
            PtResponse {
                response_packet_id: header.packet_id,
                processing_result: self.result_code(),
                records: ServiceDataSet::new(),
            },
        );
        packet.header.security_key_id = header.security_key_id;
        Some(packet)
    }

    /// Encoded form of [`response_packet`](Self::response_packet).
    pub fn response(&self, counters: &Counters) -> EncodeResult<Option<Vec<u8>>> {
        self.response_packet(counters)
            .map(|packet| packet.encode(&CodecOptions::default()))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CipherError;
    use crate::options::SecretKey;
    use crate::subrecord::{AuthInfo, StateData};
    use std::sync::Arc;

    const CAPTURED: &str = "0100010b003a000588013a2f00068801cdd34502020210\
        18006e29ca1880b9b4a1a7f31d3391e600e4f4de588010000000110400081400001804\
        000100000012030000000051e1";

    fn captured() -> Vec<u8> {
        hex::decode(CAPTURED).unwrap()
    }

    fn options() -> CodecOptions {
        CodecOptions::default()
    }

    struct Xor(u8);

    impl SecretKey for Xor {
        fn decode(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
            Ok(ciphertext.iter().map(|b| b ^ self.0).collect())
        }

        fn encode(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
            Ok(plaintext.iter().map(|b| b ^ self.0).collect())
        }
    }

    fn state_record(number: u16) -> ServiceDataRecord {
        ServiceDataRecord::new(
            number,
            ServiceType::TELEDATA,
            ServiceType::TELEDATA,
            RecordSet::from(vec![Subrecord::StateData(StateData::default())]),
        )
    }

    #[test]
    fn flags_accessors() {
        let flags = PacketFlags::from_raw(0b1110_1101);
        assert_eq!(flags.prefix(), 0b11);
        assert_eq!(flags.encryption(), 0b01);
        assert!(flags.is_encrypted());
        assert!(flags.is_compressed());
        assert_eq!(flags.priority(), Priority::High);
        assert_eq!(flags.raw() & PacketFlags::ROUTE, 0);

        let built = PacketFlags::default()
            .with_priority(Priority::Low)
            .with_encryption(2)
            .with_compression(true)
            .with_compression(false);
        assert_eq!(built.raw(), 0b0001_0011);
    }

    #[test]
    fn captured_header() {
        let header = PacketHeader::decode(&captured()).unwrap();
        assert_eq!(header.packet_id, 0x8805);
        assert_eq!(header.packet_type, PacketType::AppData);
        assert_eq!(header.flags.priority(), Priority::High);
        assert_eq!(header.routing, None);
        assert_eq!(header.header_length(), HEADER_LEN);
    }

    #[test]
    fn captured_packet() {
        let packet = Packet::decode(&captured(), &options()).unwrap();
        assert_eq!(packet.result_code, ResultCode::OK);
        let records = packet.service_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record_number, 0x8806);
        assert_eq!(records[0].records.len(), 4);
    }

    #[test]
    fn header_only_frame() {
        let packet = Packet {
            header: PacketHeader::new(7, PacketType::AppData),
            body: None,
            result_code: ResultCode::OK,
        };
        let bytes = packet.encode(&options()).unwrap();
        assert_eq!(bytes.len(), HEADER_LEN);
        assert_eq!(Packet::decode(&bytes, &options()).unwrap(), packet);
    }

    #[test]
    fn routed_header() {
        let mut packet = Packet::app_data(9, ServiceDataSet::from(vec![state_record(1)]));
        packet.header.routing = Some(Routing {
            peer_address: 0x0102,
            recipient_address: 0x0304,
            time_to_live: 5,
        });
        let bytes = packet.encode(&options()).unwrap();
        assert_eq!(bytes[2] & PacketFlags::ROUTE, PacketFlags::ROUTE);
        assert_eq!(bytes[3], 16);
        assert_eq!(&bytes[10..15], &[0x02, 0x01, 0x04, 0x03, 5]);
        assert_eq!(Packet::decode(&bytes, &options()).unwrap(), packet);
    }

    #[test]
    fn too_short_for_header() {
        let err = Packet::decode(&captured()[..10], &options()).unwrap_err();
        assert_eq!(err.header, None);
        assert!(matches!(err.error, DecodeError::HeaderTruncated { needed: 11, .. }));
        assert_eq!(err.result_code(), ResultCode::INC_HEADERFORM);
    }

    #[test]
    fn header_length_must_match_routing() {
        let mut bytes = captured();
        bytes[3] = 16;
        bytes[10] = crc8(&bytes[..10]);
        let err = Packet::decode(&bytes, &options()).unwrap_err();
        assert_eq!(err.error, DecodeError::InvalidHeaderLength { found: 16 });
    }

    #[test]
    fn unsupported_version() {
        let mut bytes = captured();
        bytes[0] = 2;
        bytes[10] = crc8(&bytes[..10]);
        let err = Packet::decode(&bytes, &options()).unwrap_err();
        assert_eq!(err.error, DecodeError::UnsupportedVersion { found: 2 });
        assert_eq!(err.result_code(), ResultCode::UNS_PROTOCOL);
    }

    #[test]
    fn unknown_packet_type() {
        let mut bytes = captured();
        bytes[9] = 7;
        bytes[10] = crc8(&bytes[..10]);
        let err = Packet::decode(&bytes, &options()).unwrap_err();
        assert_eq!(err.error, DecodeError::UnsupportedPacketType { found: 7 });
        assert_eq!(err.result_code(), ResultCode::UNS_TYPE);
    }

    #[test]
    fn signed_app_data_body_unsupported() {
        let mut bytes = captured();
        bytes[9] = 2;
        bytes[10] = crc8(&bytes[..10]);
        let err = Packet::decode(&bytes, &options()).unwrap_err();
        assert_eq!(
            err.error,
            DecodeError::UnsupportedBodyType {
                packet_type: PacketType::SignedAppData
            }
        );
        assert!(err.header.is_some());
    }

    #[test]
    fn trailing_bytes_are_a_length_mismatch() {
        let mut bytes = captured();
        bytes.push(0);
        let err = Packet::decode(&bytes, &options()).unwrap_err();
        assert_eq!(
            err.error,
            DecodeError::FrameLengthMismatch {
                declared: 71,
                actual: 72
            }
        );
        assert_eq!(err.result_code(), ResultCode::INVDATALEN);
    }

    #[test]
    fn compressed_rejected_both_ways() {
        let mut bytes = captured();
        bytes[2] |= PacketFlags::COMPRESSED;
        bytes[10] = crc8(&bytes[..10]);
        let err = Packet::decode(&bytes, &options()).unwrap_err();
        assert_eq!(err.error, DecodeError::UnsupportedCompression);

        let mut packet = Packet::app_data(1, ServiceDataSet::new());
        packet.header.flags = packet.header.flags.with_compression(true);
        assert_eq!(
            packet.encode(&options()).unwrap_err(),
            EncodeError::UnsupportedCompression
        );
    }

    #[test]
    fn encrypted_roundtrip_checksums_ciphertext() {
        let key: Arc<dyn SecretKey> = Arc::new(Xor(0x5A));
        let with_key = CodecOptions::default().with_secret(key);
        let mut packet = Packet::app_data(3, ServiceDataSet::from(vec![state_record(4)]));
        packet.header.flags = packet.header.flags.with_encryption(1);

        let bytes = packet.encode(&with_key).unwrap();
        let body_end = bytes.len() - BODY_CRC_LEN;
        let plain = ServiceDataSet::from(vec![state_record(4)]).encode().unwrap();
        assert_ne!(&bytes[HEADER_LEN..body_end], plain.as_slice());
        assert_eq!(
            u16::from_le_bytes([bytes[body_end], bytes[body_end + 1]]),
            crc16(&bytes[HEADER_LEN..body_end])
        );
        assert_eq!(Packet::decode(&bytes, &with_key).unwrap(), packet);

        let err = Packet::decode(&bytes, &options()).unwrap_err();
        assert_eq!(err.error, DecodeError::MissingSecretKey);
        assert!(err.error.is_configuration());
        assert_eq!(
            packet.encode(&options()).unwrap_err(),
            EncodeError::MissingSecretKey
        );
    }

    #[test]
    fn body_type_must_match_packet_type() {
        let mut packet = Packet::app_data(1, ServiceDataSet::new());
        packet.header.packet_type = PacketType::Response;
        assert_eq!(
            packet.encode(&options()).unwrap_err(),
            EncodeError::BodyTypeMismatch {
                packet_type: PacketType::Response
            }
        );
    }

    #[test]
    fn response_acknowledges_each_record() {
        let counters = Counters::starting_at(99, 9);
        let packet = Packet::app_data(
            0x0100,
            ServiceDataSet::from(vec![state_record(10), state_record(11)]),
        );
        let mut statuses = [ResultCode::OK, ResultCode::DATACRC_ERROR].into_iter();
        let replies =
            packet.response_packets(&counters, |_| statuses.next().unwrap_or(ResultCode::OK));
        assert_eq!(replies.len(), 1);

        let reply = &replies[0];
        assert_eq!(reply.header.packet_id, 100);
        assert_eq!(reply.header.packet_type, PacketType::Response);
        let Some(Body::Response(response)) = &reply.body else {
            panic!("expected a response body");
        };
        assert_eq!(response.response_packet_id, 0x0100);
        assert_eq!(response.processing_result, ResultCode::OK);

        let acks = response.records.as_slice();
        assert_eq!(acks.len(), 2);
        assert_eq!(acks[0].record_number, 10);
        assert_eq!(acks[1].record_number, 11);
        assert!(acks[0].group);
        assert_eq!(acks[1].source_service, ServiceType::TELEDATA);
        assert_eq!(acks[1].recipient_service, ServiceType::TELEDATA);
        assert_eq!(
            acks[1].records.as_slice(),
            &[Subrecord::Response(RecordResponse {
                confirmed_record_number: 11,
                status: ResultCode::DATACRC_ERROR,
            })]
        );
    }

    #[test]
    fn identification_adds_result_code_packet() {
        let counters = Counters::new();
        let auth = ServiceDataRecord::new(
            5,
            ServiceType::AUTH,
            ServiceType::AUTH,
            RecordSet::from(vec![Subrecord::AuthInfo(AuthInfo {
                user_name: "u".into(),
                user_password: "p".into(),
                server_sequence: None,
            })]),
        );
        let mut packet = Packet::app_data(42, ServiceDataSet::from(vec![auth]));
        packet.result_code = ResultCode::AUTH_DENIED;

        let bytes = packet.response(&counters).unwrap();
        let mut frames = crate::framer::Frames::new(&bytes);
        let first = Packet::decode(frames.next().unwrap().unwrap(), &options()).unwrap();
        let second = Packet::decode(frames.next().unwrap().unwrap(), &options()).unwrap();
        assert!(frames.next().is_none());

        assert_eq!(first.header.packet_id, 1);
        assert_eq!(second.header.packet_id, 2);
        let Some(Body::Response(result)) = &second.body else {
            panic!("expected a response body");
        };
        assert_eq!(result.response_packet_id, 42);
        assert_eq!(result.processing_result, ResultCode::AUTH_DENIED);
        let record = &result.records.as_slice()[0];
        assert_eq!(record.record_number, 2);
        assert_eq!(record.source_service, ServiceType::AUTH);
        assert_eq!(
            record.records.as_slice(),
            &[Subrecord::ResultCode(ResultCodeRecord {
                result_code: ResultCode::AUTH_DENIED
            })]
        );
    }

    #[test]
    fn responses_are_not_answered() {
        let packet = Packet::response_packet(1, PtResponse::default());
        assert!(packet.response(&Counters::new()).unwrap().is_empty());
    }

    #[test]
    fn error_response_needs_verified_header() {
        let counters = Counters::new();
        let mut bytes = captured();
        bytes[20] ^= 0x01;
        let err = Packet::decode(&bytes, &options()).unwrap_err();
        assert!(matches!(err.error, DecodeError::BodyChecksumMismatch { .. }));

        let reply = err.response_packet(&counters).unwrap();
        let Some(Body::Response(response)) = &reply.body else {
            panic!("expected a response body");
        };
        assert_eq!(response.response_packet_id, 0x8805);
        assert_eq!(response.processing_result, ResultCode::DATACRC_ERROR);
        assert!(response.records.is_empty());
        assert!(err.response(&counters).unwrap().is_some());

        bytes[10] ^= 0x01;
        let err = Packet::decode(&bytes, &options()).unwrap_err();
        assert!(err.header.is_none());
        assert_eq!(err.response(&counters).unwrap(), None);
    }
}
