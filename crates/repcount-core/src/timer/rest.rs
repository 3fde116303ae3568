//! Countdown timer for the rest interval between sets.
//!
//! State machine: `Idle -> Running -> {completed | skipped} -> Idle`.
//! Completion and skip both return the timer to `Idle` so the next set's
//! rest can reuse it. Only natural expiry produces the completion cue;
//! `skip()` cancels silently.

use serde::{Deserialize, Serialize};

use super::drift::DriftTimer;
use crate::clock::Clock;

/// While remaining is in `(0, COUNTDOWN_CUE_SECS]`, `tick()` emits one cue
/// per distinct second -- the boundary haptic/alert signal.
pub const COUNTDOWN_CUE_SECS: u64 = 3;

/// Outcome of a rest timer poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestTick {
    /// Once-per-second countdown cue near the boundary.
    Cue { remaining_secs: u64 },
    /// The countdown reached zero. Fires exactly once per `begin()`.
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RestState {
    Idle,
    Running,
}

/// Drift-corrected rest countdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestTimer {
    timer: DriftTimer,
    state: RestState,
    /// Last remaining-seconds value a cue was emitted for, so a fast poll
    /// rate still cues once per second.
    last_cue_secs: Option<u64>,
}

impl RestTimer {
    pub fn new() -> Self {
        Self {
            timer: DriftTimer::new(),
            state: RestState::Idle,
            last_cue_secs: None,
        }
    }

    /// Start counting down from `duration_secs`.
    pub fn begin(&mut self, clock: &dyn Clock, duration_secs: u64) {
        self.timer.start(clock, Some(duration_secs * 1000));
        self.state = RestState::Running;
        self.last_cue_secs = None;
    }

    /// Poll the countdown. Returns the completion signal the first time a
    /// poll observes zero, or a countdown cue near the boundary.
    pub fn tick(&mut self, clock: &dyn Clock) -> Option<RestTick> {
        if self.state != RestState::Running {
            return None;
        }
        if self.timer.poll_complete(clock) {
            self.state = RestState::Idle;
            self.timer.stop();
            self.last_cue_secs = None;
            return Some(RestTick::Completed);
        }
        let remaining = self.remaining_secs(clock);
        if remaining > 0 && remaining <= COUNTDOWN_CUE_SECS && self.last_cue_secs != Some(remaining)
        {
            self.last_cue_secs = Some(remaining);
            return Some(RestTick::Cue {
                remaining_secs: remaining,
            });
        }
        None
    }

    /// Cancel without the completion signal. Skip counts as "done resting".
    pub fn skip(&mut self) {
        self.timer.stop();
        self.state = RestState::Idle;
        self.last_cue_secs = None;
    }

    /// Extend the countdown mid-flight. If the timer already hit zero in the
    /// same polling window, this re-arms it above zero instead of letting a
    /// stale completion fire.
    pub fn add_time(&mut self, secs: u64) {
        if self.state == RestState::Running {
            self.timer.extend(secs * 1000);
        }
    }

    pub fn pause(&mut self, clock: &dyn Clock) {
        self.timer.pause(clock);
    }

    pub fn resume(&mut self, clock: &dyn Clock) {
        self.timer.resume(clock);
    }

    /// Remaining whole seconds, rounded up so the display only shows 0 once
    /// the countdown has truly expired.
    pub fn remaining_secs(&self, clock: &dyn Clock) -> u64 {
        self.timer.remaining_ms(clock).div_ceil(1000)
    }

    /// Seconds actually rested so far in this countdown.
    pub fn elapsed_secs(&self, clock: &dyn Clock) -> u64 {
        self.timer.elapsed_ms(clock) / 1000
    }

    /// Seconds of rest this countdown contributed, capped at its target:
    /// observing an expired countdown late must not count the idle gap
    /// between expiry and the observing poll as rest.
    pub fn rested_secs(&self, clock: &dyn Clock) -> u64 {
        let elapsed = self.timer.elapsed_ms(clock);
        match self.timer.target_ms() {
            Some(target) => elapsed.min(target) / 1000,
            None => elapsed / 1000,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == RestState::Running
    }
}

impl Default for RestTimer {
    fn default() -> Self {
        Self::new()
    }
}
