//! `EGTS_SR_PASSENGERS_COUNTERS`: door passenger counters.

use bitstream::{BitReader, BitWriter};

use super::{presence_mask, SubrecordCodec, SubrecordType};
use crate::error::{DecodeResult, EncodeResult};

/// Passengers that entered and exited through one door.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DoorCount {
    pub entered: u8,
    pub exited: u8,
}

/// Counter payload: per-door counts, or raw counter bytes when `RDF` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PassengerReadings {
    /// `counts[i]` is door `i + 1`, bit `i` of `DPR`.
    Counts([Option<DoorCount>; 8]),
    Raw { doors_present: u8, data: Vec<u8> },
}

impl Default for PassengerReadings {
    fn default() -> Self {
        Self::Counts([None; 8])
    }
}

/// Passenger counter report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PassengersCounters {
    /// Doors released (`DRL`), one bit per door.
    pub doors_released: u8,
    pub module_address: u16,
    pub readings: PassengerReadings,
}

impl SubrecordCodec for PassengersCounters {
    const TYPE: SubrecordType = SubrecordType::PassengersCounters;

    fn decode(payload: &[u8]) -> DecodeResult<Self> {
        let mut reader = BitReader::new(payload);
        reader.read_bits(7)?;
        let raw = reader.read_bit()?;
        let doors_present = reader.read_u8_aligned()?;
        let doors_released = reader.read_u8_aligned()?;
        let module_address = reader.read_u16_aligned()?;

        let readings = if raw {
            PassengerReadings::Raw {
                doors_present,
                data: reader.read_remaining()?.to_vec(),
            }
        } else {
            let mut counts = [None; 8];
            for (i, slot) in counts.iter_mut().enumerate() {
                if doors_present & (1 << i) != 0 {
                    *slot = Some(DoorCount {
                        entered: reader.read_u8_aligned()?,
                        exited: reader.read_u8_aligned()?,
                    });
                }
            }
            PassengerReadings::Counts(counts)
        };

        Ok(Self {
            doors_released,
            module_address,
            readings,
        })
    }

    fn encode_into(&self, writer: &mut BitWriter) -> EncodeResult<()> {
        let (raw, doors_present) = match &self.readings {
            PassengerReadings::Counts(counts) => (false, presence_mask(counts)),
            PassengerReadings::Raw { doors_present, .. } => (true, *doors_present),
        };
        writer.write_bits(0, 7)?;
        writer.write_bit(raw);
        writer.write_u8_aligned(doors_present)?;
        writer.write_u8_aligned(self.doors_released)?;
        writer.write_u16_aligned(self.module_address)?;
        match &self.readings {
            PassengerReadings::Counts(counts) => {
                for door in counts.iter().flatten() {
                    writer.write_u8_aligned(door.entered)?;
                    writer.write_u8_aligned(door.exited)?;
                }
            }
            PassengerReadings::Raw { data, .. } => writer.write_bytes(data)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;

    #[test]
    fn per_door_counts() {
        let mut counts = [None; 8];
        counts[0] = Some(DoorCount {
            entered: 3,
            exited: 1,
        });
        counts[2] = Some(DoorCount {
            entered: 0,
            exited: 5,
        });
        let report = PassengersCounters {
            doors_released: 0b0000_0101,
            module_address: 0x0010,
            readings: PassengerReadings::Counts(counts),
        };
        let bytes = report.encode().unwrap();
        assert_eq!(
            bytes,
            vec![0x00, 0b0000_0101, 0b0000_0101, 0x10, 0x00, 3, 1, 0, 5]
        );
        assert_eq!(PassengersCounters::decode(&bytes).unwrap(), report);
    }

    #[test]
    fn raw_counters() {
        let bytes = [0x01, 0x03, 0x00, 0x20, 0x00, 0xAA, 0xBB, 0xCC];
        let report = PassengersCounters::decode(&bytes).unwrap();
        assert_eq!(
            report.readings,
            PassengerReadings::Raw {
                doors_present: 0x03,
                data: vec![0xAA, 0xBB, 0xCC],
            }
        );
        assert_eq!(report.encode().unwrap(), bytes);
    }

    #[test]
    fn missing_door_count() {
        let err = PassengersCounters::decode(&[0x00, 0x03, 0x00, 0x10, 0x00, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { .. }));
    }
}
