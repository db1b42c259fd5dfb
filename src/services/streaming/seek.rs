// src/services/streaming/seek.rs
//
// Seek Coordinator
//
// A seek is written to the element and then checked on a retry timer.
// If the element has not landed within tolerance the target is written
// again, up to the configured number of retries. After that the target
// is kept as a best-effort display position until the element catches up.
// A newer seek replaces any pending one.

use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekCheck {
    /// Nothing pending
    Idle,
    Confirmed(f64),
    /// Write the target again and check later
    Retry(f64),
    GaveUp(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingSeek {
    target: f64,
    retries: u32,
}

#[derive(Debug)]
pub struct SeekCoordinator {
    pending: Option<PendingSeek>,
    best_effort: Option<f64>,
    max_retries: u32,
    tolerance: f64,
}

impl SeekCoordinator {
    pub fn new(max_retries: u32, tolerance: f64) -> Self {
        Self {
            pending: None,
            best_effort: None,
            max_retries,
            tolerance,
        }
    }

    pub fn begin(&mut self, target: f64) {
        if let Some(previous) = self.pending {
            debug!("seek to {:.2}s superseded by {:.2}s", previous.target, target);
        }
        self.pending = Some(PendingSeek { target, retries: 0 });
        self.best_effort = None;
    }

    pub fn verify(&mut self, current_time: f64) -> SeekCheck {
        let Some(mut pending) = self.pending else {
            return SeekCheck::Idle;
        };

        if (current_time - pending.target).abs() <= self.tolerance {
            self.pending = None;
            return SeekCheck::Confirmed(pending.target);
        }

        pending.retries += 1;
        if pending.retries > self.max_retries {
            warn!(
                "seek to {:.2}s not applied after {} retries (at {:.2}s)",
                pending.target, self.max_retries, current_time
            );
            self.pending = None;
            self.best_effort = Some(pending.target);
            return SeekCheck::GaveUp(pending.target);
        }

        self.pending = Some(pending);
        SeekCheck::Retry(pending.target)
    }

    /// Drops the best-effort position once the element agrees with it
    pub fn observe(&mut self, current_time: f64) {
        if let Some(target) = self.best_effort {
            if (current_time - target).abs() <= self.tolerance {
                self.best_effort = None;
            }
        }
    }

    /// Position to show: pending or best-effort target, else the element's
    pub fn display_time(&self, current_time: f64) -> f64 {
        self.target()
            .or(self.best_effort)
            .unwrap_or(current_time)
    }

    pub fn target(&self) -> Option<f64> {
        self.pending.map(|p| p.target)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn reset(&mut self) {
        self.pending = None;
        self.best_effort = None;
    }
}
