//! Low-level bit packing primitives for telematics wire formats.
//!
//! This crate provides [`BitWriter`] and [`BitReader`] for bit-level encoding and decoding.
//! Flag bytes are packed MSB-first; multi-byte integers are little-endian and byte-aligned.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - All reads/writes are bounds-checked.
//! - **No protocol knowledge** - This crate knows nothing about packets, records or checksums.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use bitstream::{BitWriter, BitReader};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bits(0b01, 2).unwrap();
//! writer.write_bit(true);
//! writer.write_bits(0, 5).unwrap();
//! writer.write_u16_aligned(0x8805).unwrap();
//!
//! let bytes = writer.finish();
//! assert_eq!(bytes, [0b0110_0000, 0x05, 0x88]);
//!
//! let mut reader = BitReader::new(&bytes);
//! assert_eq!(reader.read_bits(2).unwrap(), 0b01);
//! assert!(reader.read_bit().unwrap());
//! reader.align_to_byte().unwrap();
//! assert_eq!(reader.read_u16_aligned().unwrap(), 0x8805);
//! ```

mod error;
mod reader;
mod writer;

pub use error::{BitError, BitResult};
pub use reader::BitReader;
pub use writer::BitWriter;
