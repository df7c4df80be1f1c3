//! EGTS telematics transport protocol codec.
//!
//! A frame carries a header guarded by CRC-8 and an optional body guarded
//! by CRC-16. Application-data bodies hold service data records, each of
//! which holds a set of typed subrecords. This crate decodes and encodes all
//! three levels, splits frames out of a byte stream and synthesizes the
//! acknowledgements a receiving platform sends back.
//!
//! # Design Principles
//!
//! - **Checksums before fields** - Nothing covered by a checksum is interpreted
//!   before the checksum is verified.
//! - **Bounded decoding** - Record counts and frame sizes are checked against [`Limits`].
//! - **Status codes from errors** - Every decode failure maps to the [`ResultCode`]
//!   the terminal expects in the response.
//! - **Injected collaborators** - Ciphers come through [`CodecOptions`], identifier
//!   sequences through [`Counters`]; there is no global state.
//!
//! # Example
//!
//! ```
//! use egts::{CodecOptions, Counters, Frames, Packet};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let stream = [
//!     0x01, 0x00, 0x01, 0x0b, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x2a,
//! ];
//! let options = CodecOptions::default();
//! let counters = Counters::new();
//!
//! for frame in Frames::new(&stream) {
//!     let packet = Packet::decode(frame?, &options)?;
//!     assert!(packet.body.is_none());
//!     let reply = packet.response(&counters)?;
//!     assert!(!reply.is_empty());
//! }
//! # Ok(())
//! # }
//! ```

mod checksum;
mod counters;
mod error;
mod framer;
mod limits;
mod options;
mod packet;
mod record;
mod response;
mod result_code;
mod service;
pub mod subrecord;
mod time;
mod types;

pub use checksum::{crc16, crc8};
pub use counters::Counters;
pub use error::{
    CipherError, DecodeError, DecodeResult, EncodeError, EncodeResult, FrameError, LimitKind,
};
pub use framer::{EgtsSplitter, FrameSplitter, FrameState, Frames, Split};
pub use limits::Limits;
pub use options::{CodecOptions, SecretKey};
pub use packet::{
    Body, Packet, PacketError, PacketFlags, PacketHeader, Routing, BODY_CRC_LEN, HEADER_LEN,
    MAX_FRAME_LEN, PROTOCOL_VERSION, ROUTED_HEADER_LEN,
};
pub use record::{RecordSet, SUBRECORD_HEADER_LEN};
pub use response::PtResponse;
pub use result_code::ResultCode;
pub use service::{ServiceDataRecord, ServiceDataSet};
pub use subrecord::{Subrecord, SubrecordType};
pub use time::{egts_epoch, from_egts_seconds, to_egts_seconds, EGTS_EPOCH_UNIX};
pub use types::{PacketType, Priority, ServiceType};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = PROTOCOL_VERSION;
        let _ = MAX_FRAME_LEN;
        let _ = PacketFlags::default();
        let _ = PacketHeader::new(0, PacketType::AppData);
        let _ = Limits::default();
        let _ = CodecOptions::default();
        let _ = Counters::new();
        let _ = EgtsSplitter::new();
        let _ = ServiceType::TELEDATA;
        let _ = SubrecordType::PosData;

        let _: DecodeResult<()> = Ok(());
        let _: EncodeResult<()> = Ok(());
    }

    #[test]
    fn header_lengths() {
        assert_eq!(
            HEADER_LEN,
            1 // protocol version
                + 1 // security key id
                + 1 // flags
                + 1 // header length
                + 1 // header encoding
                + 2 // frame data length
                + 2 // packet id
                + 1 // packet type
                + 1 // header checksum
        );
        assert_eq!(ROUTED_HEADER_LEN, HEADER_LEN + 2 + 2 + 1);
    }

    #[test]
    fn empty_app_data_is_header_only() {
        let packet = Packet {
            header: PacketHeader::new(1, PacketType::AppData),
            body: None,
            result_code: ResultCode::OK,
        };
        let bytes = packet.encode(&CodecOptions::default()).unwrap();
        assert_eq!(bytes[..10], [1, 0, 0, 11, 0, 0, 0, 1, 0, 1]);
        assert_eq!(bytes[10], crc8(&bytes[..10]));
    }
}
