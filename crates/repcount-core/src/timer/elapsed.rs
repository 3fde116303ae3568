//! Count-up timer for total workout duration.
//!
//! Strictly count-up: no target, never completes on its own. Pause/resume
//! accumulate exactly, so time spent paused never leaks into the total.

use serde::{Deserialize, Serialize};

use super::drift::DriftTimer;
use crate::clock::Clock;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElapsedTimer {
    timer: DriftTimer,
}

impl ElapsedTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting from zero.
    pub fn start(&mut self, clock: &dyn Clock) {
        self.timer.start(clock, None);
    }

    pub fn pause(&mut self, clock: &dyn Clock) {
        self.timer.pause(clock);
    }

    pub fn resume(&mut self, clock: &dyn Clock) {
        self.timer.resume(clock);
    }

    pub fn stop(&mut self) {
        self.timer.stop();
    }

    /// Whole seconds elapsed while running.
    pub fn elapsed_secs(&self, clock: &dyn Clock) -> u64 {
        self.timer.elapsed_ms(clock) / 1000
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_armed() && !self.timer.is_paused()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[test]
    fn starts_at_zero() {
        let clock = ManualClock::new(500_000);
        let mut t = ElapsedTimer::new();
        t.start(&clock);
        assert_eq!(t.elapsed_secs(&clock), 0);
    }

    #[test]
    fn counts_up_across_pause_resume() {
        let clock = ManualClock::new(0);
        let mut t = ElapsedTimer::new();
        t.start(&clock);

        clock.advance_secs(90);
        assert_eq!(t.elapsed_secs(&clock), 90);

        t.pause(&clock);
        clock.advance_secs(600);
        assert_eq!(t.elapsed_secs(&clock), 90);

        t.resume(&clock);
        clock.advance_secs(10);
        assert_eq!(t.elapsed_secs(&clock), 100);
    }

    #[test]
    fn stop_releases_the_timer() {
        let clock = ManualClock::new(0);
        let mut t = ElapsedTimer::new();
        t.start(&clock);
        clock.advance_secs(5);
        t.stop();
        assert_eq!(t.elapsed_secs(&clock), 0);
        assert!(!t.is_running());
    }
}
