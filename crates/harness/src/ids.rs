//! Widget id generation for demo mounts
//!
//! Raw wall-clock millis collide under rapid successive creation, so ids
//! combine the timestamp with a process-local sequence number.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

const SEQUENCE_BITS: i64 = 10;
const SEQUENCE_MASK: i64 = (1 << SEQUENCE_BITS) - 1;

/// Collision-resistant generator for host-assigned widget ids.
#[derive(Debug, Default)]
pub struct WidgetIdGenerator {
    sequence: AtomicI64,
}

impl WidgetIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id: millisecond timestamp in the high bits, sequence in the low
    /// bits. Unique within a process even inside one millisecond.
    pub fn next_id(&self) -> i64 {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) & SEQUENCE_MASK;
        (Utc::now().timestamp_millis() << SEQUENCE_BITS) | sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rapid_ids_never_collide() {
        let generator = WidgetIdGenerator::new();
        let mut ids: Vec<i64> = (0..512).map(|_| generator.next_id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 512);
    }
}
