// Path: crates/telemetry/src/metrics.rs
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide atomic counters. A single static instance (`COUNTERS`) is
/// shared by every component; there is no per-round or per-node
/// partitioning since this process only ever represents one node.
#[derive(Debug, Default)]
pub struct Counters {
    pub rounds_started: AtomicU64,
    pub rounds_committed: AtomicU64,
    pub rounds_abandoned: AtomicU64,
    pub protocol_invalid: AtomicU64,
    pub reconnect_attempts: AtomicU64,
}

impl Counters {
    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            rounds_started: self.rounds_started.load(Ordering::Relaxed),
            rounds_committed: self.rounds_committed.load(Ordering::Relaxed),
            rounds_abandoned: self.rounds_abandoned.load(Ordering::Relaxed),
            protocol_invalid: self.protocol_invalid.load(Ordering::Relaxed),
            reconnect_attempts: self.reconnect_attempts.load(Ordering::Relaxed),
        }
    }

    pub fn inc_rounds_started(&self) {
        self.rounds_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rounds_committed(&self) {
        self.rounds_committed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rounds_abandoned(&self) {
        self.rounds_abandoned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_protocol_invalid(&self) {
        self.protocol_invalid.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_reconnect_attempts(&self) {
        self.reconnect_attempts.fetch_add(1, Ordering::Relaxed);
    }
}

/// A point-in-time copy of [`Counters`], comparable and printable, used by
/// tests and any future introspection endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountersSnapshot {
    pub rounds_started: u64,
    pub rounds_committed: u64,
    pub rounds_abandoned: u64,
    pub protocol_invalid: u64,
    pub reconnect_attempts: u64,
}

/// The process-wide counters instance.
pub static COUNTERS: Lazy<Counters> = Lazy::new(Counters::default);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_invalid_increments_independently() {
        let counters = Counters::default();
        counters.inc_protocol_invalid();
        counters.inc_protocol_invalid();
        let snap = counters.snapshot();
        assert_eq!(snap.protocol_invalid, 2);
        assert_eq!(snap.rounds_committed, 0);
    }
}
