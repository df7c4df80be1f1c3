//! Conversion between absolute time and protocol timestamps.
//!
//! The protocol counts seconds since 2010-01-01T00:00:00Z in an unsigned 32-bit field.

use chrono::{DateTime, Utc};

/// Unix timestamp of the protocol epoch (2010-01-01T00:00:00Z).
pub const EGTS_EPOCH_UNIX: i64 = 1_262_304_000;

/// Converts a wire timestamp to absolute time.
#[must_use]
pub fn from_egts_seconds(seconds: u32) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(EGTS_EPOCH_UNIX + i64::from(seconds), 0)
}

/// Converts absolute time to a wire timestamp.
///
/// Sub-second precision is dropped. Returns `None` for times before the
/// epoch or past the end of the 32-bit range.
#[must_use]
pub fn to_egts_seconds(time: &DateTime<Utc>) -> Option<u32> {
    u32::try_from(time.timestamp() - EGTS_EPOCH_UNIX).ok()
}

/// The protocol epoch itself.
#[must_use]
pub fn egts_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + chrono::TimeDelta::seconds(EGTS_EPOCH_UNIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_is_2010() {
        assert_eq!(egts_epoch().to_rfc3339(), "2010-01-01T00:00:00+00:00");
        assert_eq!(from_egts_seconds(0), Some(egts_epoch()));
    }

    #[test]
    fn captured_navigation_time() {
        let time = from_egts_seconds(0x18ca_296e).unwrap();
        assert_eq!(time.to_rfc3339(), "2023-03-07T16:21:02+00:00");
        assert_eq!(to_egts_seconds(&time), Some(0x18ca_296e));
    }

    #[test]
    fn before_epoch_is_rejected() {
        let time = DateTime::from_timestamp(EGTS_EPOCH_UNIX - 1, 0).unwrap();
        assert_eq!(to_egts_seconds(&time), None);
    }

    #[test]
    fn end_of_range() {
        let time = from_egts_seconds(u32::MAX).unwrap();
        assert_eq!(to_egts_seconds(&time), Some(u32::MAX));
        let past = time + chrono::TimeDelta::seconds(1);
        assert_eq!(to_egts_seconds(&past), None);
    }
}
