//! Configurable limits for bounded decoding.

use crate::packet::MAX_FRAME_LEN;

/// Limits enforced while framing and decoding packets.
///
/// Declared lengths are already bounded by their 16-bit fields; these
/// limits cap how much work a single hostile packet can cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum frame size the splitter accepts, in bytes.
    pub max_frame_bytes: usize,

    /// Maximum number of service data records in one body.
    pub max_service_records: usize,

    /// Maximum number of subrecords in one record set.
    pub max_subrecords: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_frame_bytes: MAX_FRAME_LEN,
            max_service_records: 256,
            max_subrecords: 1024,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_frame_bytes: 1024,
            max_service_records: 8,
            max_subrecords: 32,
        }
    }

    /// Creates limits with no restrictions beyond the wire format itself.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_frame_bytes: usize::MAX,
            max_service_records: usize::MAX,
            max_subrecords: usize::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_accepts_largest_frame() {
        let limits = Limits::default();
        assert_eq!(limits.max_frame_bytes, 16 + 65_535 + 2);
        assert_eq!(limits.max_service_records, 256);
    }

    #[test]
    fn testing_limits_smaller() {
        let test_limits = Limits::for_testing();
        let default_limits = Limits::default();

        assert!(test_limits.max_frame_bytes < default_limits.max_frame_bytes);
        assert!(test_limits.max_service_records < default_limits.max_service_records);
        assert!(test_limits.max_subrecords < default_limits.max_subrecords);
    }

    #[test]
    fn unlimited_limits() {
        let limits = Limits::unlimited();
        assert_eq!(limits.max_frame_bytes, usize::MAX);
        assert_eq!(limits.max_subrecords, usize::MAX);
    }

    #[test]
    fn limits_const_constructible() {
        const LIMITS: Limits = Limits::for_testing();
        assert_eq!(LIMITS.max_service_records, 8);
    }
}
