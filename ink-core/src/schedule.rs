//! Export gating.
//!
//! The export loop is a polling design, not a timer: an external frame
//! clock (finer than the export interval) asks the gate on every tick
//! whether enough wall time has passed. The gate itself never sleeps,
//! schedules, or touches a real clock; callers feed it monotonic
//! milliseconds, which keeps it trivially testable.

/// Minimum gap between exports in milliseconds (~6.7 Hz cap).
///
/// A floor on the gap, not a guaranteed rate: firing is gated by however
/// fast the frame clock actually polls.
pub const EXPORT_INTERVAL_MS: u64 = 150;

/// Elapsed-time gate for the export loop.
#[derive(Debug, Clone)]
pub struct ExportGate {
    interval_ms: u64,
    /// Time of the last fire; `None` until the first tick, so the very
    /// first poll always fires regardless of the clock's origin.
    last_fire_ms: Option<u64>,
}

impl ExportGate {
    /// Create a gate with the standard 150ms interval.
    #[must_use]
    pub fn new() -> Self {
        Self::with_interval(EXPORT_INTERVAL_MS)
    }

    /// Create a gate with a custom interval.
    #[must_use]
    pub fn with_interval(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_fire_ms: None,
        }
    }

    /// Poll the gate at `now_ms` on the caller's monotonic clock.
    ///
    /// Returns true (and records the fire) when the interval has elapsed
    /// since the last fire, or when no tick has ever fired.
    pub fn should_fire(&mut self, now_ms: u64) -> bool {
        let due = match self.last_fire_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.interval_ms,
        };
        if due {
            self.last_fire_ms = Some(now_ms);
        }
        due
    }

    /// The configured minimum gap in milliseconds.
    #[must_use]
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }
}

impl Default for ExportGate {
    fn default() -> Self {
        Self::new()
    }
}
