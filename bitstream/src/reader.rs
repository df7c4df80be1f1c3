//! Bit-level reader with bounded operations.

use crate::error::{BitError, BitResult};

/// A bit-level reader for decoding packed binary data.
///
/// Bits are consumed MSB-first within each byte. Multi-byte integers are
/// read little-endian and require the cursor to sit on a byte boundary.
/// All read operations are bounds-checked and return errors on failure.
/// The reader never panics on malformed input.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a new `BitReader` from a byte slice.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    /// Returns the number of bits remaining to read.
    #[must_use]
    pub const fn bits_remaining(&self) -> usize {
        self.data
            .len()
            .saturating_mul(8)
            .saturating_sub(self.bit_pos)
    }

    /// Returns the number of whole bytes remaining to read.
    #[must_use]
    pub const fn bytes_remaining(&self) -> usize {
        self.bits_remaining() / 8
    }

    /// Returns `true` if there are no more bits to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits_remaining() == 0
    }

    /// Returns the current bit position.
    #[must_use]
    pub const fn bit_position(&self) -> usize {
        self.bit_pos
    }

    /// Returns the index of the byte the cursor is in.
    #[must_use]
    pub const fn byte_position(&self) -> usize {
        self.bit_pos / 8
    }

    /// Reads a single bit as a boolean.
    pub fn read_bit(&mut self) -> BitResult<bool> {
        self.ensure_bits(1)?;
        let byte_idx = self.bit_pos / 8;
        let bit_idx = self.bit_pos % 8;
        let bit = (self.data[byte_idx] >> (7 - bit_idx)) & 1;
        self.bit_pos += 1;
        Ok(bit == 1)
    }

    /// Reads up to 64 bits as an unsigned integer, most significant bit first.
    pub fn read_bits(&mut self, bits: u8) -> BitResult<u64> {
        if bits > 64 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
        }
        if bits == 0 {
            return Ok(0);
        }
        self.ensure_bits(bits as usize)?;

        let mut value = 0u64;
        for _ in 0..bits {
            value = (value << 1) | u64::from(self.read_bit()?);
        }
        Ok(value)
    }

    /// Aligns to the next byte boundary.
    pub fn align_to_byte(&mut self) -> BitResult<()> {
        let rem = self.bit_pos % 8;
        if rem == 0 {
            return Ok(());
        }
        let skip = 8 - rem;
        self.ensure_bits(skip)?;
        self.bit_pos += skip;
        Ok(())
    }

    /// Reads a byte-aligned `u8`.
    pub fn read_u8_aligned(&mut self) -> BitResult<u8> {
        let [value] = self.read_aligned_bytes::<1>()?;
        Ok(value)
    }

    /// Reads a byte-aligned `u16` (little-endian).
    pub fn read_u16_aligned(&mut self) -> BitResult<u16> {
        let bytes = self.read_aligned_bytes::<2>()?;
        Ok(u16::from_le_bytes(bytes))
    }

    /// Reads a byte-aligned `i16` (little-endian, two's complement).
    pub fn read_i16_aligned(&mut self) -> BitResult<i16> {
        let bytes = self.read_aligned_bytes::<2>()?;
        Ok(i16::from_le_bytes(bytes))
    }

    /// Reads a byte-aligned 24-bit unsigned integer (little-endian).
    pub fn read_u24_aligned(&mut self) -> BitResult<u32> {
        let [b0, b1, b2] = self.read_aligned_bytes::<3>()?;
        Ok(u32::from_le_bytes([b0, b1, b2, 0]))
    }

    /// Reads a byte-aligned `u32` (little-endian).
    pub fn read_u32_aligned(&mut self) -> BitResult<u32> {
        let bytes = self.read_aligned_bytes::<4>()?;
        Ok(u32::from_le_bytes(bytes))
    }

    /// Reads a fixed-size byte array.
    pub fn read_array<const N: usize>(&mut self) -> BitResult<[u8; N]> {
        self.read_aligned_bytes::<N>()
    }

    /// Reads `len` bytes as a borrowed slice.
    pub fn read_bytes(&mut self, len: usize) -> BitResult<&'a [u8]> {
        self.ensure_aligned()?;
        self.ensure_bits(len.saturating_mul(8))?;
        let data: &'a [u8] = self.data;
        let idx = self.bit_pos / 8;
        let out = &data[idx..idx + len];
        self.bit_pos += len * 8;
        Ok(out)
    }

    /// Reads bytes up to `delimiter`, consuming the delimiter.
    ///
    /// The returned slice does not include the delimiter.
    pub fn read_until(&mut self, delimiter: u8) -> BitResult<&'a [u8]> {
        self.ensure_aligned()?;
        let data: &'a [u8] = self.data;
        let rest = &data[self.bit_pos / 8..];
        let Some(end) = rest.iter().position(|&b| b == delimiter) else {
            return Err(BitError::MissingDelimiter {
                delimiter,
                available: rest.len(),
            });
        };
        self.bit_pos += (end + 1) * 8;
        Ok(&rest[..end])
    }

    /// Consumes and returns every remaining byte.
    pub fn read_remaining(&mut self) -> BitResult<&'a [u8]> {
        self.ensure_aligned()?;
        let data: &'a [u8] = self.data;
        let rest = &data[self.bit_pos / 8..];
        self.bit_pos = data.len() * 8;
        Ok(rest)
    }

    fn ensure_aligned(&self) -> BitResult<()> {
        if self.bit_pos % 8 != 0 {
            return Err(BitError::MisalignedAccess {
                bit_position: self.bit_pos,
            });
        }
        Ok(())
    }

    fn ensure_bits(&self, bits: usize) -> BitResult<()> {
        let available = self.bits_remaining();
        if bits > available {
            return Err(BitError::UnexpectedEof {
                requested: bits,
                available,
            });
        }
        Ok(())
    }

    fn read_aligned_bytes<const N: usize>(&mut self) -> BitResult<[u8; N]> {
        self.ensure_aligned()?;
        self.ensure_bits(N * 8)?;
        let idx = self.bit_pos / 8;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[idx..idx + N]);
        self.bit_pos += N * 8;
        Ok(out)
    }
}
