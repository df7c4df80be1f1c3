//! Identifier sequences for packets this node originates.

use std::sync::atomic::{AtomicU16, Ordering};

/// Wrap-around sequences for packet identifiers and record numbers.
///
/// Both sequences advance by one on every call and wrap from 65535 to 0.
/// Increments are lock-free, so one `Counters` can be shared (for example
/// behind an `Arc`) by every connection that synthesizes responses.
/// Decoded identifiers are never routed through here.
#[derive(Debug, Default)]
pub struct Counters {
    packet_id: AtomicU16,
    record_number: AtomicU16,
}

impl Counters {
    /// Creates counters whose first issued values are both 1.
    #[must_use]
    pub const fn new() -> Self {
        Self::starting_at(0, 0)
    }

    /// Creates counters as if `packet_id` and `record_number` were the last
    /// values issued.
    #[must_use]
    pub const fn starting_at(packet_id: u16, record_number: u16) -> Self {
        Self {
            packet_id: AtomicU16::new(packet_id),
            record_number: AtomicU16::new(record_number),
        }
    }

    /// Returns the next packet identifier.
    pub fn next_packet_id(&self) -> u16 {
        self.packet_id.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    /// Returns the next record number.
    pub fn next_record_number(&self) -> u16 {
        self.record_number
            .fetch_add(1, Ordering::Relaxed)
            .wrapping_add(1)
    }
}
