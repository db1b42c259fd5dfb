// src/runtime/clock.rs
//
// Time sources
//
// Wall time stamps history records; monotonic milliseconds drive every
// player timer. Tests and simulations use ManualClock so timer-driven
// behavior is deterministic.

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;
use std::time::Instant;

pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;

    /// Milliseconds since an arbitrary fixed origin
    fn monotonic_ms(&self) -> u64;
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn monotonic_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Clock advanced by hand
pub struct ManualClock {
    state: Mutex<ManualState>,
}

struct ManualState {
    wall: DateTime<Utc>,
    monotonic_ms: u64,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            state: Mutex::new(ManualState {
                wall: start,
                monotonic_ms: 0,
            }),
        }
    }

    /// Moves both wall and monotonic time forward
    pub fn advance_ms(&self, ms: u64) {
        if let Ok(mut state) = self.state.lock() {
            state.monotonic_ms += ms;
            state.wall += Duration::milliseconds(ms as i64);
        }
    }
}

impl Clock for ManualClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.state
            .lock()
            .map(|s| s.wall)
            .unwrap_or_else(|poisoned| poisoned.into_inner().wall)
    }

    fn monotonic_ms(&self) -> u64 {
        self.state
            .lock()
            .map(|s| s.monotonic_ms)
            .unwrap_or_else(|poisoned| poisoned.into_inner().monotonic_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances_both_axes() {
        let start = Utc::now();
        let clock = ManualClock::new(start);
        clock.advance_ms(1500);
        assert_eq!(clock.monotonic_ms(), 1500);
        assert_eq!(clock.now_utc() - start, Duration::milliseconds(1500));
    }
}
