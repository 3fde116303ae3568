//! Interval training timer (HIIT, Tabata, custom work/rest rounds).
//!
//! Alternates `Work -> Rest` phases across a fixed number of rounds, all
//! driven by the drift-corrected base timer: each phase is one bounded
//! countdown, and phase changes happen when a poll observes expiry, never
//! by counting ticks. Shares the rest timer's boundary-cue rule.

use serde::{Deserialize, Serialize};

use super::drift::DriftTimer;
use super::rest::COUNTDOWN_CUE_SECS;
use crate::clock::Clock;

/// A named work/rest/rounds recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalPreset {
    pub name: String,
    pub work_seconds: u32,
    pub rest_seconds: u32,
    pub rounds: u32,
}

impl IntervalPreset {
    pub fn new(name: impl Into<String>, work_seconds: u32, rest_seconds: u32, rounds: u32) -> Self {
        Self {
            name: name.into(),
            work_seconds,
            rest_seconds,
            rounds,
        }
    }

    /// The stock recipes offered before any customization.
    pub fn builtins() -> Vec<IntervalPreset> {
        vec![
            IntervalPreset::new("Tabata", 20, 10, 8),
            IntervalPreset::new("HIIT 30/30", 30, 30, 10),
            IntervalPreset::new("HIIT 45/15", 45, 15, 8),
            IntervalPreset::new("EMOM", 50, 10, 10),
            IntervalPreset::new("Boxing Rounds", 180, 60, 3),
        ]
    }

    pub fn total_duration_secs(&self) -> u64 {
        u64::from(self.work_seconds + self.rest_seconds) * u64::from(self.rounds)
    }

    /// All numeric fields must be >= 1.
    pub fn is_valid(&self) -> bool {
        self.work_seconds >= 1 && self.rest_seconds >= 1 && self.rounds >= 1
    }
}

/// Which half of the round is counting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalPhase {
    Work,
    Rest,
}

/// Outcome of an interval timer poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum IntervalTick {
    /// Once-per-second cue in the final stretch of a phase.
    Cue { remaining_secs: u64 },
    /// A phase expired and the next one started counting down.
    PhaseChanged {
        phase: IntervalPhase,
        round: u32,
        duration_secs: u64,
    },
    /// The last round's rest expired; the timer is idle again.
    Finished,
}

/// Work/rest round state machine over the drift-corrected countdown.
///
/// Serializable so a host can persist it between invocations, like the
/// workout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalTimer {
    preset: Option<IntervalPreset>,
    phase: IntervalPhase,
    round: u32,
    timer: DriftTimer,
    last_cue_secs: Option<u64>,
}

impl IntervalTimer {
    pub fn new() -> Self {
        Self {
            preset: None,
            phase: IntervalPhase::Work,
            round: 1,
            timer: DriftTimer::new(),
            last_cue_secs: None,
        }
    }

    /// Begin round 1's work phase. Rejects invalid presets; restarting
    /// while running abandons the old run.
    pub fn start(&mut self, clock: &dyn Clock, preset: IntervalPreset) -> bool {
        if !preset.is_valid() {
            return false;
        }
        self.timer
            .start(clock, Some(u64::from(preset.work_seconds) * 1000));
        self.phase = IntervalPhase::Work;
        self.round = 1;
        self.last_cue_secs = None;
        self.preset = Some(preset);
        true
    }

    /// Poll the countdown. Emits at most one signal per call: a boundary
    /// cue, a phase change, or the final completion.
    pub fn tick(&mut self, clock: &dyn Clock) -> Option<IntervalTick> {
        let preset = self.preset.clone()?;
        if self.timer.poll_complete(clock) {
            self.last_cue_secs = None;
            return Some(self.advance_phase(clock, &preset));
        }
        let remaining = self.remaining_secs(clock);
        if remaining > 0 && remaining <= COUNTDOWN_CUE_SECS && self.last_cue_secs != Some(remaining)
        {
            self.last_cue_secs = Some(remaining);
            return Some(IntervalTick::Cue {
                remaining_secs: remaining,
            });
        }
        None
    }

    fn advance_phase(&mut self, clock: &dyn Clock, preset: &IntervalPreset) -> IntervalTick {
        match self.phase {
            IntervalPhase::Work => {
                self.phase = IntervalPhase::Rest;
                let duration = u64::from(preset.rest_seconds);
                self.timer.start(clock, Some(duration * 1000));
                IntervalTick::PhaseChanged {
                    phase: IntervalPhase::Rest,
                    round: self.round,
                    duration_secs: duration,
                }
            }
            IntervalPhase::Rest if self.round < preset.rounds => {
                self.round += 1;
                self.phase = IntervalPhase::Work;
                let duration = u64::from(preset.work_seconds);
                self.timer.start(clock, Some(duration * 1000));
                IntervalTick::PhaseChanged {
                    phase: IntervalPhase::Work,
                    round: self.round,
                    duration_secs: duration,
                }
            }
            IntervalPhase::Rest => {
                self.stop();
                IntervalTick::Finished
            }
        }
    }

    /// Abandon the run. Subsequent polls are no-ops.
    pub fn stop(&mut self) {
        self.timer.stop();
        self.preset = None;
        self.phase = IntervalPhase::Work;
        self.round = 1;
        self.last_cue_secs = None;
    }

    pub fn pause(&mut self, clock: &dyn Clock) {
        self.timer.pause(clock);
    }

    pub fn resume(&mut self, clock: &dyn Clock) {
        self.timer.resume(clock);
    }

    pub fn remaining_secs(&self, clock: &dyn Clock) -> u64 {
        self.timer.remaining_ms(clock).div_ceil(1000)
    }

    pub fn phase(&self) -> IntervalPhase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn preset(&self) -> Option<&IntervalPreset> {
        self.preset.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.preset.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.timer.is_paused()
    }
}

impl Default for IntervalTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn short_preset() -> IntervalPreset {
        IntervalPreset::new("test", 5, 3, 2)
    }

    /// Advance one second at a time, collecting every emitted tick.
    fn drive(timer: &mut IntervalTimer, clock: &ManualClock, secs: u64) -> Vec<IntervalTick> {
        let mut ticks = Vec::new();
        for _ in 0..secs {
            clock.advance_secs(1);
            if let Some(tick) = timer.tick(clock) {
                ticks.push(tick);
            }
        }
        ticks
    }

    #[test]
    fn starts_in_work_phase_of_round_one() {
        let clock = ManualClock::new(0);
        let mut t = IntervalTimer::new();
        assert!(t.start(&clock, short_preset()));
        assert!(t.is_running());
        assert_eq!(t.phase(), IntervalPhase::Work);
        assert_eq!(t.round(), 1);
        assert_eq!(t.remaining_secs(&clock), 5);
    }

    #[test]
    fn invalid_preset_is_rejected() {
        let clock = ManualClock::new(0);
        let mut t = IntervalTimer::new();
        assert!(!t.start(&clock, IntervalPreset::new("bad", 30, 0, 10)));
        assert!(!t.is_running());
        assert!(t.tick(&clock).is_none());
    }

    #[test]
    fn full_run_walks_every_phase_and_finishes() {
        let clock = ManualClock::new(0);
        let mut t = IntervalTimer::new();
        t.start(&clock, short_preset());

        // 2 rounds of (5s work + 3s rest) = 16s total.
        let ticks = drive(&mut t, &clock, 20);
        let changes: Vec<(IntervalPhase, u32)> = ticks
            .iter()
            .filter_map(|tick| match tick {
                IntervalTick::PhaseChanged { phase, round, .. } => Some((*phase, *round)),
                _ => None,
            })
            .collect();
        assert_eq!(
            changes,
            vec![
                (IntervalPhase::Rest, 1),
                (IntervalPhase::Work, 2),
                (IntervalPhase::Rest, 2),
            ]
        );
        assert!(matches!(ticks.last(), Some(IntervalTick::Finished)));
        assert!(!t.is_running());
        assert!(t.tick(&clock).is_none());
    }

    #[test]
    fn each_phase_gets_boundary_cues() {
        let clock = ManualClock::new(0);
        let mut t = IntervalTimer::new();
        t.start(&clock, IntervalPreset::new("test", 5, 4, 1));

        let ticks = drive(&mut t, &clock, 12);
        let cues: Vec<u64> = ticks
            .iter()
            .filter_map(|tick| match tick {
                IntervalTick::Cue { remaining_secs } => Some(*remaining_secs),
                _ => None,
            })
            .collect();
        // 3-2-1 in the work phase, then again in the rest phase.
        assert_eq!(cues, vec![3, 2, 1, 3, 2, 1]);
    }

    #[test]
    fn pause_freezes_the_current_phase() {
        let clock = ManualClock::new(0);
        let mut t = IntervalTimer::new();
        t.start(&clock, short_preset());

        clock.advance_secs(2);
        t.pause(&clock);
        assert!(t.is_paused());

        clock.advance_secs(300);
        assert_eq!(t.remaining_secs(&clock), 3);
        assert_eq!(t.phase(), IntervalPhase::Work);
        assert_eq!(t.round(), 1);

        t.resume(&clock);
        clock.advance_secs(3);
        assert!(matches!(
            t.tick(&clock),
            Some(IntervalTick::PhaseChanged {
                phase: IntervalPhase::Rest,
                round: 1,
                duration_secs: 3,
            })
        ));
    }

    #[test]
    fn stop_cancels_and_stale_polls_do_nothing() {
        let clock = ManualClock::new(0);
        let mut t = IntervalTimer::new();
        t.start(&clock, short_preset());
        clock.advance_secs(2);
        t.stop();

        assert!(!t.is_running());
        clock.advance_secs(60);
        assert!(t.tick(&clock).is_none());
        assert_eq!(t.remaining_secs(&clock), 0);
    }

    #[test]
    fn restart_abandons_the_previous_run() {
        let clock = ManualClock::new(0);
        let mut t = IntervalTimer::new();
        t.start(&clock, short_preset());
        drive(&mut t, &clock, 6); // into round 1's rest

        t.start(&clock, IntervalPreset::new("again", 10, 5, 3));
        assert_eq!(t.phase(), IntervalPhase::Work);
        assert_eq!(t.round(), 1);
        assert_eq!(t.remaining_secs(&clock), 10);
    }

    #[test]
    fn builtin_presets_are_valid() {
        for preset in IntervalPreset::builtins() {
            assert!(preset.is_valid(), "{} invalid", preset.name);
        }
        let tabata = &IntervalPreset::builtins()[0];
        assert_eq!(tabata.total_duration_secs(), 240);
    }

    #[test]
    fn serialized_timer_restores_mid_run() {
        let clock = ManualClock::new(0);
        let mut t = IntervalTimer::new();
        t.start(&clock, short_preset());
        drive(&mut t, &clock, 6); // round 1 rest, 2s remaining

        let json = serde_json::to_string(&t).unwrap();
        let mut restored: IntervalTimer = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.phase(), IntervalPhase::Rest);
        assert_eq!(restored.round(), 1);
        assert_eq!(restored.remaining_secs(&clock), 2);

        clock.advance_secs(2);
        assert!(matches!(
            restored.tick(&clock),
            Some(IntervalTick::PhaseChanged {
                phase: IntervalPhase::Work,
                round: 2,
                ..
            })
        ));
    }
}
