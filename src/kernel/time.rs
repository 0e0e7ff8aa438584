use std::time::{SystemTime, UNIX_EPOCH};

use tokio::time::Instant;

pub const NANOS_PER_MILLI: u64 = 1_000_000;

/// Host wall clock with millisecond resolution.
///
/// Anchored to the system clock once and advanced by the tokio clock afterwards,
/// so a paused test runtime moves wall time together with its timers.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    epoch_millis: u64,
    origin: Instant,
}

impl Clock {
    pub fn system() -> Self {
        let epoch_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self::starting_at(epoch_millis)
    }

    pub fn starting_at(epoch_millis: u64) -> Self {
        Self {
            epoch_millis,
            origin: Instant::now(),
        }
    }

    pub fn now_unix_millis(&self) -> u64 {
        self.epoch_millis + self.origin.elapsed().as_millis() as u64
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

/// Sub-millisecond digits are always zero: the host has no finer clock.
pub fn millis_to_unix_nanos(millis: u64) -> u64 {
    millis.saturating_mul(NANOS_PER_MILLI)
}
