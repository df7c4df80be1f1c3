//! Bit-level writer for encoding packed binary data.

use crate::error::{BitError, BitResult};

/// A bit-level writer for encoding packed binary data.
///
/// Writes are accumulated in an internal buffer. Call [`finish`](Self::finish)
/// to get the final byte buffer.
#[derive(Debug, Default)]
pub struct BitWriter {
    /// The accumulated bytes.
    bytes: Vec<u8>,
    /// Current byte being written (not yet pushed to bytes).
    current_byte: u8,
    /// Number of bits written to `current_byte` (0-7).
    bit_count: u8,
}

impl BitWriter {
    /// Creates a new empty `BitWriter`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `BitWriter` with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            current_byte: 0,
            bit_count: 0,
        }
    }

    /// Returns the number of bits written so far.
    #[must_use]
    pub fn bits_written(&self) -> usize {
        self.bytes.len() * 8 + self.bit_count as usize
    }

    /// Returns the number of complete bytes written so far.
    #[must_use]
    pub fn bytes_written(&self) -> usize {
        self.bytes.len()
    }

    /// Writes a single bit.
    pub fn write_bit(&mut self, value: bool) {
        self.current_byte = (self.current_byte << 1) | u8::from(value);
        self.bit_count += 1;
        if self.bit_count == 8 {
            self.bytes.push(self.current_byte);
            self.current_byte = 0;
            self.bit_count = 0;
        }
    }

    /// Writes up to 64 bits from an unsigned integer, most significant bit first.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::InvalidBitCount`] if `bits > 64`.
    /// Returns [`BitError::ValueOutOfRange`] if `value` doesn't fit in `bits`.
    pub fn write_bits(&mut self, value: u64, bits: u8) -> BitResult<()> {
        if bits > 64 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
        }
        if bits == 0 {
            return Ok(());
        }
        if bits < 64 && value >= (1u64 << bits) {
            return Err(BitError::ValueOutOfRange { value, bits });
        }

        for i in (0..bits).rev() {
            self.write_bit((value >> i) & 1 == 1);
        }
        Ok(())
    }

    /// Pads the current byte with zero bits up to the next boundary.
    pub fn align_to_byte(&mut self) {
        while self.bit_count != 0 {
            self.write_bit(false);
        }
    }

    /// Writes a byte-aligned `u8`.
    pub fn write_u8_aligned(&mut self, value: u8) -> BitResult<()> {
        self.write_bytes(&[value])
    }

    /// Writes a byte-aligned `u16` (little-endian).
    pub fn write_u16_aligned(&mut self, value: u16) -> BitResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes a byte-aligned `i16` (little-endian, two's complement).
    pub fn write_i16_aligned(&mut self, value: i16) -> BitResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes a byte-aligned 24-bit unsigned integer (little-endian).
    ///
    /// # Errors
    ///
    /// Returns [`BitError::ValueOutOfRange`] if `value` exceeds `0xFF_FFFF`.
    pub fn write_u24_aligned(&mut self, value: u32) -> BitResult<()> {
        if value > 0x00FF_FFFF {
            return Err(BitError::ValueOutOfRange {
                value: u64::from(value),
                bits: 24,
            });
        }
        let [b0, b1, b2, _] = value.to_le_bytes();
        self.write_bytes(&[b0, b1, b2])
    }

    /// Writes a byte-aligned `u32` (little-endian).
    pub fn write_u32_aligned(&mut self, value: u32) -> BitResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes a run of raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::MisalignedAccess`] if a partial byte is pending.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> BitResult<()> {
        if self.bit_count != 0 {
            return Err(BitError::MisalignedAccess {
                bit_position: self.bits_written(),
            });
        }
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }

    /// Finishes writing and returns the byte buffer.
    ///
    /// If the last byte is incomplete, it is padded with zeros on the right.
    #[must_use]
    pub fn finish(mut self) -> Vec<u8> {
        self.align_to_byte();
        self.bytes
    }

    /// Finishes writing and appends to the provided buffer.
    ///
    /// If the last byte is incomplete, it is padded with zeros on the right.
    pub fn finish_into(mut self, buf: &mut Vec<u8>) {
        self.align_to_byte();
        buf.append(&mut self.bytes);
    }
}
