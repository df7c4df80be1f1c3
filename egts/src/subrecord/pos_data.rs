//! `EGTS_SR_POS_DATA`: the basic navigation report.

use bitstream::{BitReader, BitWriter};
use chrono::{DateTime, Utc};

use super::{ensure_width, SubrecordCodec, SubrecordType};
use crate::error::{DecodeError, DecodeResult, EncodeError, EncodeResult};
use crate::time::{from_egts_seconds, to_egts_seconds};

const LATITUDE_RANGE: f64 = 90.0;
const LONGITUDE_RANGE: f64 = 180.0;

const SPEED_BITS: u8 = 14;
const DIRECTION_BITS: u8 = 9;
const ODOMETER_BITS: u8 = 24;

/// Bit 14 of `SPD`: altitude below sea level.
const ALTS_BIT: u16 = 1 << 14;
/// Bit 15 of `SPD`: bit 8 of the direction.
const DIRH_BIT: u16 = 1 << 15;
const SPEED_MASK: u16 = (1 << SPEED_BITS) - 1;

/// Reference frame of the reported coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CoordinateSystem {
    #[default]
    Wgs84,
    /// PZ-90.02 state geocentric system.
    Pz90,
}

/// Navigation report.
///
/// Coordinates are signed degrees: south latitudes and west longitudes are
/// negative and the hemisphere bits are derived from the sign. The wire
/// stores each as an unsigned fraction of 90 or 180 degrees, so a value
/// survives a round trip only to within `range / 0xFFFF_FFFF`.
///
/// A hemisphere bit on a zero coordinate, or `ALTS` on a zero altitude, has
/// no signed value to live in. Decoding accepts it and encoding writes the
/// bit clear, so such reports are normalized when re-encoded.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PosData {
    pub navigation_time: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub moving: bool,
    /// Report was replayed from the terminal's black box memory.
    pub from_black_box: bool,
    pub coordinate_system: CoordinateSystem,
    /// 3D fix rather than 2D.
    pub fix_3d: bool,
    pub valid: bool,
    /// Speed in 0.1 km/h, 14 bits.
    pub speed: u16,
    /// Course over ground in degrees, 9 bits.
    pub direction: u16,
    /// Odometer in 0.1 km, 24 bits.
    pub odometer: u32,
    /// States of digital inputs 1..=8, input 1 in bit 0.
    pub digital_inputs: u8,
    /// Event that triggered the report.
    pub source: u8,
    /// Altitude in metres relative to sea level, 24-bit magnitude.
    pub altitude: Option<i32>,
}

impl PosData {
    /// Speed in km/h.
    #[must_use]
    pub fn speed_kmh(&self) -> f64 {
        f64::from(self.speed) / 10.0
    }
}

impl SubrecordCodec for PosData {
    const TYPE: SubrecordType = SubrecordType::PosData;

    fn decode(payload: &[u8]) -> DecodeResult<Self> {
        let mut reader = BitReader::new(payload);

        let seconds = reader.read_u32_aligned()?;
        let navigation_time = from_egts_seconds(seconds)
            .ok_or_else(|| DecodeError::invalid("navigation time", seconds))?;
        let raw_latitude = reader.read_u32_aligned()?;
        let raw_longitude = reader.read_u32_aligned()?;

        let has_altitude = reader.read_bit()?;
        let west = reader.read_bit()?;
        let south = reader.read_bit()?;
        let moving = reader.read_bit()?;
        let from_black_box = reader.read_bit()?;
        let coordinate_system = if reader.read_bit()? {
            CoordinateSystem::Pz90
        } else {
            CoordinateSystem::Wgs84
        };
        let fix_3d = reader.read_bit()?;
        let valid = reader.read_bit()?;

        let spd = reader.read_u16_aligned()?;
        let direction_low = reader.read_u8_aligned()?;
        let direction = if spd & DIRH_BIT == 0 {
            u16::from(direction_low)
        } else {
            u16::from(direction_low) | 0x100
        };
        let odometer = reader.read_u24_aligned()?;
        let digital_inputs = reader.read_u8_aligned()?;
        let source = reader.read_u8_aligned()?;

        let altitude = if has_altitude {
            // Magnitude is at most 24 bits, so the cast cannot wrap.
            let magnitude = reader.read_u24_aligned()? as i32;
            Some(if spd & ALTS_BIT == 0 {
                magnitude
            } else {
                -magnitude
            })
        } else {
            None
        };

        Ok(Self {
            navigation_time,
            latitude: decode_coordinate(raw_latitude, LATITUDE_RANGE, south),
            longitude: decode_coordinate(raw_longitude, LONGITUDE_RANGE, west),
            moving,
            from_black_box,
            coordinate_system,
            fix_3d,
            valid,
            speed: spd & SPEED_MASK,
            direction,
            odometer,
            digital_inputs,
            source,
            altitude,
        })
    }

    fn encode_into(&self, writer: &mut BitWriter) -> EncodeResult<()> {
        let seconds = to_egts_seconds(&self.navigation_time).ok_or(
            EncodeError::TimestampOutOfRange {
                field: "navigation_time",
            },
        )?;
        let (raw_latitude, south) = encode_coordinate("latitude", self.latitude, LATITUDE_RANGE)?;
        let (raw_longitude, west) =
            encode_coordinate("longitude", self.longitude, LONGITUDE_RANGE)?;
        ensure_width("speed", u64::from(self.speed), SPEED_BITS)?;
        ensure_width("direction", u64::from(self.direction), DIRECTION_BITS)?;
        ensure_width("odometer", u64::from(self.odometer), ODOMETER_BITS)?;
        if let Some(altitude) = self.altitude {
            ensure_width("altitude", u64::from(altitude.unsigned_abs()), 24)?;
        }

        writer.write_u32_aligned(seconds)?;
        writer.write_u32_aligned(raw_latitude)?;
        writer.write_u32_aligned(raw_longitude)?;

        writer.write_bit(self.altitude.is_some());
        writer.write_bit(west);
        writer.write_bit(south);
        writer.write_bit(self.moving);
        writer.write_bit(self.from_black_box);
        writer.write_bit(self.coordinate_system == CoordinateSystem::Pz90);
        writer.write_bit(self.fix_3d);
        writer.write_bit(self.valid);

        let mut spd = self.speed;
        if self.direction > 0xFF {
            spd |= DIRH_BIT;
        }
        if self.altitude.is_some_and(i32::is_negative) {
            spd |= ALTS_BIT;
        }
        writer.write_u16_aligned(spd)?;
        writer.write_u8_aligned((self.direction & 0xFF) as u8)?;
        writer.write_u24_aligned(self.odometer)?;
        writer.write_u8_aligned(self.digital_inputs)?;
        writer.write_u8_aligned(self.source)?;
        if let Some(altitude) = self.altitude {
            writer.write_u24_aligned(altitude.unsigned_abs())?;
        }
        Ok(())
    }
}

fn decode_coordinate(raw: u32, range: f64, negative: bool) -> f64 {
    let degrees = f64::from(raw) * range / f64::from(u32::MAX);
    if negative {
        -degrees
    } else {
        degrees
    }
}

/// Returns the wire fraction and whether the hemisphere bit is set.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn encode_coordinate(field: &'static str, degrees: f64, range: f64) -> EncodeResult<(u32, bool)> {
    if !degrees.is_finite() || degrees.abs() > range {
        return Err(EncodeError::InvalidCoordinate { field });
    }
    let raw = (degrees.abs() / range * f64::from(u32::MAX)).round() as u32;
    Ok((raw, degrees.is_sign_negative() && raw != 0))
}
