//! Error types for EGTS encoding, decoding and stream framing.

use std::fmt;

use bitstream::BitError;
use thiserror::Error;

use crate::result_code::ResultCode;
use crate::types::PacketType;

/// Result type for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type for encode operations.
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Errors raised while decoding a packet or any structure nested in it.
///
/// Every variant maps to the protocol status code a terminal expects in
/// the response, see [`DecodeError::result_code`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// Fewer bytes remain than the structure requires.
    #[error("truncated input: need {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    /// A field holds a value the protocol does not allow.
    #[error("invalid {field}: {detail}")]
    InvalidEncoding { field: &'static str, detail: String },

    /// A record-set entry carries a subrecord type this codec does not know.
    #[error("unknown subrecord type {tag} ({length} bytes)")]
    UnknownSubrecordType { tag: u8, length: u16 },

    /// The buffer is shorter than the transport header.
    #[error("truncated header: need {needed} bytes, {available} available")]
    HeaderTruncated { needed: usize, available: usize },

    /// The header length byte does not match the routing flag.
    #[error("invalid header length {found}")]
    InvalidHeaderLength { found: u8 },

    /// The protocol version byte is not supported.
    #[error("unsupported protocol version {found}")]
    UnsupportedVersion { found: u8 },

    /// The packet type byte is not a known packet type.
    #[error("unsupported packet type {found}")]
    UnsupportedPacketType { found: u8 },

    /// The packet type is known but its body has no codec.
    #[error("unsupported body for {packet_type}")]
    UnsupportedBodyType { packet_type: PacketType },

    /// The body is flagged as compressed.
    #[error("compressed bodies are not supported")]
    UnsupportedCompression,

    /// The header CRC-8 does not match the header bytes.
    #[error("header checksum mismatch: computed 0x{expected:02X}, received 0x{found:02X}")]
    HeaderChecksumMismatch { expected: u8, found: u8 },

    /// The body CRC-16 does not match the body bytes.
    #[error("body checksum mismatch: computed 0x{expected:04X}, received 0x{found:04X}")]
    BodyChecksumMismatch { expected: u16, found: u16 },

    /// The buffer length disagrees with the lengths declared in the header.
    #[error("frame length mismatch: header declares {declared} bytes, buffer holds {actual}")]
    FrameLengthMismatch { declared: usize, actual: usize },

    /// The body is encrypted and no secret key was configured.
    #[error("encrypted body but no secret key is configured")]
    MissingSecretKey,

    /// The configured secret key failed to decrypt the body.
    #[error("body decryption failed: {0}")]
    Decrypt(CipherError),

    /// A configured decoding limit was exceeded.
    #[error("{kind} limit exceeded: {actual} > {limit}")]
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// A subrecord failed to decode.
    #[error("subrecord type {tag} at offset {offset}: {source}")]
    Subrecord {
        tag: u8,
        offset: usize,
        source: Box<DecodeError>,
    },

    /// A service data record failed to decode.
    #[error("service record #{index} at offset {offset}: {source}")]
    ServiceRecord {
        index: usize,
        offset: usize,
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    /// Strips the subrecord/service-record context wrappers.
    #[must_use]
    pub fn root(&self) -> &Self {
        let mut err = self;
        while let Self::Subrecord { source, .. } | Self::ServiceRecord { source, .. } = err {
            err = &**source;
        }
        err
    }

    /// Returns the protocol status code describing this failure.
    #[must_use]
    pub fn result_code(&self) -> ResultCode {
        match self.root() {
            Self::Truncated { .. } | Self::InvalidEncoding { .. } => ResultCode::INC_DATAFORM,
            Self::HeaderTruncated { .. } | Self::InvalidHeaderLength { .. } => {
                ResultCode::INC_HEADERFORM
            }
            Self::UnknownSubrecordType { .. }
            | Self::UnsupportedPacketType { .. }
            | Self::UnsupportedBodyType { .. } => ResultCode::UNS_TYPE,
            Self::UnsupportedVersion { .. } | Self::UnsupportedCompression => {
                ResultCode::UNS_PROTOCOL
            }
            Self::HeaderChecksumMismatch { .. } => ResultCode::HEADERCRC_ERROR,
            Self::BodyChecksumMismatch { .. } => ResultCode::DATACRC_ERROR,
            Self::FrameLengthMismatch { .. } => ResultCode::INVDATALEN,
            Self::MissingSecretKey | Self::Decrypt(_) => ResultCode::DECRYPT_ERROR,
            Self::LimitsExceeded { .. } => ResultCode::NO_RES_AVAIL,
            Self::Subrecord { source, .. } | Self::ServiceRecord { source, .. } => {
                source.result_code()
            }
        }
    }

    /// Returns `true` for configuration problems rather than malformed input.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self.root(), Self::MissingSecretKey)
    }

    pub(crate) fn invalid(field: &'static str, detail: impl fmt::Display) -> Self {
        Self::InvalidEncoding {
            field,
            detail: detail.to_string(),
        }
    }
}

impl From<BitError> for DecodeError {
    fn from(err: BitError) -> Self {
        match err {
            BitError::UnexpectedEof {
                requested,
                available,
            } => Self::Truncated {
                needed: requested.div_ceil(8),
                available: available / 8,
            },
            BitError::MissingDelimiter { available, .. } => Self::Truncated {
                needed: available + 1,
                available,
            },
            other => Self::invalid("bitstream", other),
        }
    }
}

/// Specific decoding limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    ServiceRecords,
    Subrecords,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ServiceRecords => "service record count",
            Self::Subrecords => "subrecord count",
        };
        write!(f, "{name}")
    }
}

/// Errors raised while encoding caller-built structures.
///
/// These point at an invalid in-memory value, never at external input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum EncodeError {
    /// A numeric field does not fit its wire width.
    #[error("{field} value {value} exceeds maximum {max}")]
    FieldOutOfRange {
        field: &'static str,
        value: u64,
        max: u64,
    },

    /// A fixed-width text field has the wrong length.
    #[error("{field} must be exactly {expected} bytes, got {actual}")]
    FieldLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A list field that the wire format requires to be non-empty is empty.
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    /// A NUL-terminated text field contains a NUL byte.
    #[error("{field} contains an embedded NUL byte")]
    EmbeddedNul { field: &'static str },

    /// A coordinate is not finite or outside its hemisphere range.
    #[error("{field} is not a valid coordinate")]
    InvalidCoordinate { field: &'static str },

    /// A timestamp is outside the representable protocol range.
    #[error("{field} is outside the protocol time range")]
    TimestampOutOfRange { field: &'static str },

    /// An encoded structure is longer than its 16-bit length field allows.
    #[error("{field} length {length} does not fit in 16 bits")]
    LengthOverflow { field: &'static str, length: usize },

    /// The body variant does not match the packet type.
    #[error("body does not match packet type {packet_type}")]
    BodyTypeMismatch { packet_type: PacketType },

    /// Encryption was requested and no secret key is configured.
    #[error("encryption requested but no secret key is configured")]
    MissingSecretKey,

    /// The configured secret key failed to encrypt the body.
    #[error("body encryption failed: {0}")]
    Encrypt(CipherError),

    /// Compression was requested.
    #[error("compressed bodies are not supported")]
    UnsupportedCompression,

    /// Low-level bit packing failed.
    #[error("bitstream error: {0}")]
    Bitstream(#[from] BitError),
}

/// Error reported by a [`SecretKey`](crate::SecretKey) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CipherError {
    message: String,
}

impl CipherError {
    /// Creates a cipher error with a description.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors raised by the stream framer.
///
/// Both variants mean the stream cannot be resynchronised; the session
/// owner decides whether to drop the connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FrameError {
    /// The buffered bytes cannot start a packet.
    #[error("data is inconsistent with the protocol ({len} bytes)")]
    InconsistentData { len: usize },

    /// The stream ended in the middle of a packet.
    #[error("stream ended inside a packet: need {needed} bytes, {available} available")]
    TruncatedTail { needed: usize, available: usize },

    /// A header declares a packet longer than the configured limit.
    #[error("declared packet length {len} exceeds limit {limit}")]
    FrameTooLarge { len: usize, limit: usize },
}
