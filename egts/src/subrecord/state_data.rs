//! `EGTS_SR_STATE_DATA`: terminal state and supply voltages.

use bitstream::{BitReader, BitWriter};

use super::{SubrecordCodec, SubrecordType};
use crate::error::{DecodeResult, EncodeResult};

pub(crate) const STATE_DATA_LEN: usize = 5;

/// Terminal state. Voltages are in units of 0.1 V.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateData {
    /// Operating mode (0 passive, 1 era, 2 active, ...).
    pub state: u8,
    pub main_power_voltage: u8,
    pub backup_battery_voltage: u8,
    pub internal_battery_voltage: u8,
    /// Navigation module enabled.
    pub navigation_enabled: bool,
    pub internal_battery_used: bool,
    pub backup_battery_used: bool,
}

impl SubrecordCodec for StateData {
    const TYPE: SubrecordType = SubrecordType::StateData;

    fn decode(payload: &[u8]) -> DecodeResult<Self> {
        let mut reader = BitReader::new(payload);
        let state = reader.read_u8_aligned()?;
        let main_power_voltage = reader.read_u8_aligned()?;
        let backup_battery_voltage = reader.read_u8_aligned()?;
        let internal_battery_voltage = reader.read_u8_aligned()?;
        reader.read_bits(5)?;
        Ok(Self {
            state,
            main_power_voltage,
            backup_battery_voltage,
            internal_battery_voltage,
            navigation_enabled: reader.read_bit()?,
            internal_battery_used: reader.read_bit()?,
            backup_battery_used: reader.read_bit()?,
        })
    }

    fn encode_into(&self, writer: &mut BitWriter) -> EncodeResult<()> {
        writer.write_u8_aligned(self.state)?;
        writer.write_u8_aligned(self.main_power_voltage)?;
        writer.write_u8_aligned(self.backup_battery_voltage)?;
        writer.write_u8_aligned(self.internal_battery_voltage)?;
        writer.write_bits(0, 5)?;
        writer.write_bit(self.navigation_enabled);
        writer.write_bit(self.internal_battery_used);
        writer.write_bit(self.backup_battery_used);
        Ok(())
    }
}
