//! `EGTS_SR_EXT_POS_DATA`: dilution of precision and satellite info.

use bitstream::{BitReader, BitWriter};

use super::{SubrecordCodec, SubrecordType};
use crate::error::{DecodeResult, EncodeResult};

/// Extended position data.
///
/// Flag byte, MSB first: three reserved bits, then `NSFE SFE PFE HFE VFE`.
/// Fields follow in the order VDOP, HDOP, PDOP, SAT, NS. Every flag is
/// independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtPosData {
    /// Vertical dilution of precision, scaled by 100.
    pub vdop: Option<u16>,
    /// Horizontal dilution of precision, scaled by 100.
    pub hdop: Option<u16>,
    /// Position dilution of precision, scaled by 100.
    pub pdop: Option<u16>,
    /// Visible satellites.
    pub satellites: Option<u8>,
    /// Bit mask of navigation systems in use (GLONASS, GPS, Galileo, ...).
    pub navigation_systems: Option<u16>,
}

impl SubrecordCodec for ExtPosData {
    const TYPE: SubrecordType = SubrecordType::ExtPosData;

    fn decode(payload: &[u8]) -> DecodeResult<Self> {
        let mut reader = BitReader::new(payload);
        reader.read_bits(3)?;
        let has_ns = reader.read_bit()?;
        let has_sat = reader.read_bit()?;
        let has_pdop = reader.read_bit()?;
        let has_hdop = reader.read_bit()?;
        let has_vdop = reader.read_bit()?;

        let mut ext = Self::default();
        if has_vdop {
            ext.vdop = Some(reader.read_u16_aligned()?);
        }
        if has_hdop {
            ext.hdop = Some(reader.read_u16_aligned()?);
        }
        if has_pdop {
            ext.pdop = Some(reader.read_u16_aligned()?);
        }
        if has_sat {
            ext.satellites = Some(reader.read_u8_aligned()?);
        }
        if has_ns {
            ext.navigation_systems = Some(reader.read_u16_aligned()?);
        }
        Ok(ext)
    }

    fn encode_into(&self, writer: &mut BitWriter) -> EncodeResult<()> {
        writer.write_bits(0, 3)?;
        writer.write_bit(self.navigation_systems.is_some());
        writer.write_bit(self.satellites.is_some());
        writer.write_bit(self.pdop.is_some());
        writer.write_bit(self.hdop.is_some());
        writer.write_bit(self.vdop.is_some());

        for dop in [self.vdop, self.hdop, self.pdop].into_iter().flatten() {
            writer.write_u16_aligned(dop)?;
        }
        if let Some(satellites) = self.satellites {
            writer.write_u8_aligned(satellites)?;
        }
        if let Some(systems) = self.navigation_systems {
            writer.write_u16_aligned(systems)?;
        }
        Ok(())
    }
}
