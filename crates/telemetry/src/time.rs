// Path: crates/telemetry/src/time.rs
use std::time::Instant;

/// A scope-based timer that logs its own elapsed duration on drop.
pub struct Timer {
    label: &'static str,
    started: Instant,
}

impl Timer {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            started: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let elapsed = self.started.elapsed();
        tracing::debug!(target: "telemetry", event = "timer", label = self.label, elapsed_ms = elapsed.as_millis() as u64);
    }
}
