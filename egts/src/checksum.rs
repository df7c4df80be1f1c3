//! Table-driven checksums guarding the packet header and body.
//!
//! - Header: CRC-8, polynomial 0x31, init 0xFF, no reflection, no final xor.
//! - Body: CRC-16/CCITT-FALSE, polynomial 0x1021, init 0xFFFF.

const CRC8_POLY: u8 = 0x31;
const CRC8_INIT: u8 = 0xFF;
const CRC16_POLY: u16 = 0x1021;
const CRC16_INIT: u16 = 0xFFFF;

static CRC8_TABLE: [u8; 256] = crc8_table();
static CRC16_TABLE: [u16; 256] = crc16_table();

#[allow(clippy::cast_possible_truncation)]
const fn crc8_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ CRC8_POLY
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

#[allow(clippy::cast_possible_truncation)]
const fn crc16_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u16) << 8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ CRC16_POLY
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Computes the header checksum (CRC-8) over `bytes`.
#[must_use]
pub fn crc8(bytes: &[u8]) -> u8 {
    bytes
        .iter()
        .fold(CRC8_INIT, |crc, &byte| CRC8_TABLE[usize::from(crc ^ byte)])
}

/// Computes the body checksum (CRC-16/CCITT-FALSE) over `bytes`.
#[must_use]
pub fn crc16(bytes: &[u8]) -> u16 {
    bytes.iter().fold(CRC16_INIT, |crc, &byte| {
        let idx = usize::from((crc >> 8) ^ u16::from(byte));
        (crc << 8) ^ CRC16_TABLE[idx]
    })
}
