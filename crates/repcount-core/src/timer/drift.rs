//! Drift-corrected timer base.
//!
//! The timer never counts ticks. Every read recomputes
//! `now - started_at + accumulated` against the injected clock, so the
//! value stays correct across missed polls, app suspension, and scheduler
//! jitter. The caller polls at whatever rate it likes.

use serde::{Deserialize, Serialize};

use crate::clock::Clock;

/// Restartable countdown/count-up primitive.
///
/// A bounded timer (`target_ms = Some(..)`) counts down and completes once;
/// an unbounded timer (`target_ms = None`) counts up indefinitely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftTimer {
    /// Epoch-ms snapshot of the last start/resume. `None` while paused or idle.
    started_at_ms: Option<u64>,
    /// Time accrued across previous run windows.
    accumulated_ms: u64,
    /// Countdown target; `None` means count-up forever.
    target_ms: Option<u64>,
    /// The owned "active ticking" token. Disarmed by `stop()`, so a stale
    /// poll after logical cancellation can never observe or fire anything.
    armed: bool,
    /// Completion latch: a bounded timer fires at most once per `start()`.
    fired: bool,
}

impl DriftTimer {
    pub fn new() -> Self {
        Self {
            started_at_ms: None,
            accumulated_ms: 0,
            target_ms: None,
            armed: false,
            fired: false,
        }
    }

    /// Arm the timer. `target_ms = None` counts up without completing.
    pub fn start(&mut self, clock: &dyn Clock, target_ms: Option<u64>) {
        self.started_at_ms = Some(clock.now_ms());
        self.accumulated_ms = 0;
        self.target_ms = target_ms;
        self.armed = true;
        self.fired = false;
    }

    /// Freeze the running total. Idempotent: pausing a paused timer is a no-op.
    pub fn pause(&mut self, clock: &dyn Clock) {
        if let Some(started) = self.started_at_ms.take() {
            self.accumulated_ms += clock.now_ms().saturating_sub(started);
        }
    }

    /// Continue from a pause. No-op unless armed and currently paused.
    pub fn resume(&mut self, clock: &dyn Clock) {
        if self.armed && self.started_at_ms.is_none() {
            self.started_at_ms = Some(clock.now_ms());
        }
    }

    /// Shift the read value by exactly `delta_ms` without restarting.
    ///
    /// Bounded: raises the target, which also re-arms a timer that already
    /// reached zero but whose completion has not been observed yet.
    /// Count-up: lowers the accumulated offset instead.
    pub fn extend(&mut self, delta_ms: u64) {
        if !self.armed {
            return;
        }
        match self.target_ms {
            Some(target) => self.target_ms = Some(target.saturating_add(delta_ms)),
            None => self.accumulated_ms = self.accumulated_ms.saturating_sub(delta_ms),
        }
    }

    /// Total running time. Pure read, safe at any polling rate.
    pub fn elapsed_ms(&self, clock: &dyn Clock) -> u64 {
        let running = self
            .started_at_ms
            .map(|started| clock.now_ms().saturating_sub(started))
            .unwrap_or(0);
        self.accumulated_ms + running
    }

    /// Remaining time for a bounded timer; 0 for count-up or once expired.
    pub fn remaining_ms(&self, clock: &dyn Clock) -> u64 {
        self.target_ms
            .map(|target| target.saturating_sub(self.elapsed_ms(clock)))
            .unwrap_or(0)
    }

    /// Returns `true` exactly once per `start()`: the first poll that
    /// observes zero remaining on an armed bounded timer.
    pub fn poll_complete(&mut self, clock: &dyn Clock) -> bool {
        if !self.armed || self.fired || self.target_ms.is_none() {
            return false;
        }
        if self.remaining_ms(clock) == 0 {
            self.fired = true;
            return true;
        }
        false
    }

    /// Disarm and release the timer. Subsequent polls and resumes are no-ops.
    pub fn stop(&mut self) {
        self.started_at_ms = None;
        self.accumulated_ms = 0;
        self.target_ms = None;
        self.armed = false;
        self.fired = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Countdown target, if bounded.
    pub fn target_ms(&self) -> Option<u64> {
        self.target_ms
    }

    pub fn is_paused(&self) -> bool {
        self.armed && self.started_at_ms.is_none()
    }
}

impl Default for DriftTimer {
    fn default() -> Self {
        Self::new()
    }
}
