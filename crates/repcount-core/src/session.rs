//! Workout session state machine.
//!
//! The session is a wall-clock-based state machine with no internal
//! threads: the caller invokes `tick()` periodically (0.5s or faster for a
//! smooth countdown) and the session re-evaluates its timers against the
//! clock. All transitions are synchronous and run on whatever single
//! context owns the session, so no locking is needed around its fields.
//!
//! ## Phases
//!
//! ```text
//! Setup -> Active -> Resting -> Active -> ... -> Summary -> Setup
//! ```
//!
//! `Active` and `Resting` can each be overlaid by the `paused` flag, which
//! freezes both timers while preserving which phase it paused from.
//!
//! Guards recover by no-op: a transition invoked from the wrong phase
//! returns `None` and changes nothing, so replayed or duplicated host
//! calls are harmless and never panic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::clock::{system_clock, SharedClock};
use crate::events::Event;
use crate::storage::{SessionRecord, WorkoutConfig};
use crate::timer::{ElapsedTimer, RestTick, RestTimer};

/// Top-level session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Setup,
    Active,
    Resting,
    Summary,
}

/// One logged batch of repetitions. Immutable once appended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletedSet {
    pub reps: u32,
    pub completed_at: DateTime<Utc>,
}

/// End-of-session rollup, computed at `end_workout()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total_reps: u32,
    pub elapsed_secs: u64,
    pub sets_completed: u32,
}

/// The central workout state machine.
///
/// Owns its rest and elapsed timers (created and released with the session
/// lifecycle) and a copy of the device config. Serializable so a host can
/// persist it between invocations; the clock is restored as the system
/// clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSession {
    config: WorkoutConfig,
    phase: Phase,
    paused: bool,
    current_set_number: u32,
    completed_sets: Vec<CompletedSet>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    total_rest_secs: u64,
    summary: Option<SessionSummary>,
    elapsed: ElapsedTimer,
    rest: RestTimer,
    #[serde(skip, default = "system_clock")]
    clock: SharedClock,
}

impl WorkoutSession {
    pub fn new(config: WorkoutConfig) -> Self {
        Self::with_clock(config, system_clock())
    }

    pub fn with_clock(config: WorkoutConfig, clock: SharedClock) -> Self {
        Self {
            config,
            phase: Phase::Setup,
            paused: false,
            current_set_number: 1,
            completed_sets: Vec::new(),
            started_at: None,
            ended_at: None,
            total_rest_secs: 0,
            summary: None,
            elapsed: ElapsedTimer::new(),
            rest: RestTimer::new(),
            clock,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_resting(&self) -> bool {
        self.phase == Phase::Resting
    }

    pub fn config(&self) -> &WorkoutConfig {
        &self.config
    }

    pub fn current_set_number(&self) -> u32 {
        self.current_set_number
    }

    pub fn completed_sets(&self) -> &[CompletedSet] {
        &self.completed_sets
    }

    pub fn completed_reps(&self) -> u32 {
        self.completed_sets.iter().map(|s| s.reps).sum()
    }

    /// Goal progress clamped to `[0, 1]`. Advisory only: reaching the goal
    /// never auto-ends the session.
    pub fn progress_percent(&self) -> f64 {
        if self.config.total_reps_goal == 0 {
            return 0.0;
        }
        (f64::from(self.completed_reps()) / f64::from(self.config.total_reps_goal)).min(1.0)
    }

    pub fn is_goal_complete(&self) -> bool {
        self.completed_reps() >= self.config.total_reps_goal
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed.elapsed_secs(&*self.clock)
    }

    pub fn rest_remaining_secs(&self) -> u64 {
        if self.phase == Phase::Resting {
            self.rest.remaining_secs(&*self.clock)
        } else {
            0
        }
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    /// The history record for a session in `Summary`. The caller appends it
    /// to the history store and may forward it to the peer channel.
    pub fn session_record(&self) -> Option<SessionRecord> {
        if self.phase != Phase::Summary {
            return None;
        }
        Some(SessionRecord {
            sets: self.completed_sets.clone(),
            started_at: self.started_at?,
            completed_at: self.ended_at?,
            total_rest_secs: self.total_rest_secs,
        })
    }

    /// Full published state.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            paused: self.paused,
            set_number: self.current_set_number,
            sets_completed: self.completed_sets.len() as u32,
            completed_reps: self.completed_reps(),
            goal_reps: self.config.total_reps_goal,
            progress_pct: self.progress_percent(),
            goal_complete: self.is_goal_complete(),
            elapsed_secs: self.elapsed_secs(),
            rest_remaining_secs: self.rest_remaining_secs(),
            at: self.clock.now(),
        }
    }

    // ── Setup-phase config edits ─────────────────────────────────────

    /// Replace the whole config. Only allowed while no session is active.
    pub fn set_config(&mut self, config: WorkoutConfig) {
        if self.phase == Phase::Setup && config.is_valid() {
            self.config = config;
        }
    }

    pub fn set_reps_per_set(&mut self, value: u32) {
        if self.phase == Phase::Setup && value >= 1 {
            self.config.reps_per_set = value;
        }
    }

    pub fn set_rest_seconds(&mut self, value: u32) {
        if self.phase == Phase::Setup && value >= 1 {
            self.config.rest_seconds = value;
        }
    }

    pub fn set_total_reps_goal(&mut self, value: u32) {
        if self.phase == Phase::Setup && value >= 1 {
            self.config.total_reps_goal = value;
        }
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Setup -> Active. Resets counters and starts the elapsed timer.
    pub fn start_workout(&mut self) -> Option<Event> {
        if self.phase != Phase::Setup || !self.config.is_valid() {
            return None;
        }
        let clock = Arc::clone(&self.clock);
        self.phase = Phase::Active;
        self.paused = false;
        self.current_set_number = 1;
        self.completed_sets.clear();
        self.total_rest_secs = 0;
        self.summary = None;
        self.started_at = Some(clock.now());
        self.ended_at = None;
        self.elapsed.start(&*clock);
        Some(Event::WorkoutStarted {
            set_number: 1,
            goal_reps: self.config.total_reps_goal,
            at: clock.now(),
        })
    }

    /// Active -> Resting. Logs the set and arms the rest countdown.
    pub fn complete_set(&mut self, reps: u32) -> Option<Event> {
        if self.phase != Phase::Active || self.paused {
            return None;
        }
        let clock = Arc::clone(&self.clock);
        let at = clock.now();
        self.completed_sets.push(CompletedSet {
            reps,
            completed_at: at,
        });
        self.phase = Phase::Resting;
        let rest_secs = u64::from(self.config.rest_seconds);
        self.rest.begin(&*clock, rest_secs);
        Some(Event::SetCompleted {
            set_number: self.current_set_number,
            reps,
            rest_secs,
            upcoming_set: self.current_set_number + 1,
            at,
        })
    }

    /// Drive the rest countdown. Call at any rate; the timers compute from
    /// the clock, not the call count. No-op while paused.
    pub fn tick(&mut self) -> Option<Event> {
        if self.phase != Phase::Resting || self.paused {
            return None;
        }
        let clock = Arc::clone(&self.clock);
        let rested = self.rest.rested_secs(&*clock);
        match self.rest.tick(&*clock)? {
            RestTick::Cue { remaining_secs } => Some(Event::RestCountdownTick {
                remaining_secs,
                at: clock.now(),
            }),
            RestTick::Completed => {
                self.total_rest_secs += rested;
                self.phase = Phase::Active;
                self.current_set_number += 1;
                Some(Event::RestCompleted {
                    set_number: self.current_set_number,
                    at: clock.now(),
                })
            }
        }
    }

    /// Resting -> Active without the completion cue. Skip counts as "done
    /// resting", not "undo the set", so the set number still advances.
    pub fn skip_rest(&mut self) -> Option<Event> {
        if self.phase != Phase::Resting || self.paused {
            return None;
        }
        let clock = Arc::clone(&self.clock);
        self.total_rest_secs += self.rest.rested_secs(&*clock);
        self.rest.skip();
        self.phase = Phase::Active;
        self.current_set_number += 1;
        Some(Event::RestSkipped {
            set_number: self.current_set_number,
            at: clock.now(),
        })
    }

    /// Extend the current rest and permanently raise the configured default
    /// by the same amount. No-op outside `Resting`.
    pub fn add_rest_time(&mut self, secs: u32) -> Option<Event> {
        if self.phase != Phase::Resting || secs == 0 {
            return None;
        }
        let clock = Arc::clone(&self.clock);
        self.rest.add_time(u64::from(secs));
        self.config.rest_seconds = self.config.rest_seconds.saturating_add(secs);
        Some(Event::RestExtended {
            added_secs: u64::from(secs),
            remaining_secs: self.rest.remaining_secs(&*clock),
            rest_secs: self.config.rest_seconds,
            at: clock.now(),
        })
    }

    /// Freeze both timers, preserving which phase was paused.
    pub fn pause(&mut self) -> Option<Event> {
        if self.paused || !matches!(self.phase, Phase::Active | Phase::Resting) {
            return None;
        }
        let clock = Arc::clone(&self.clock);
        self.paused = true;
        self.elapsed.pause(&*clock);
        if self.phase == Phase::Resting {
            self.rest.pause(&*clock);
        }
        Some(Event::WorkoutPaused {
            resting: self.phase == Phase::Resting,
            at: clock.now(),
        })
    }

    /// Resume from the frozen state.
    pub fn resume(&mut self) -> Option<Event> {
        if !self.paused {
            return None;
        }
        let clock = Arc::clone(&self.clock);
        self.paused = false;
        self.elapsed.resume(&*clock);
        if self.phase == Phase::Resting {
            self.rest.resume(&*clock);
        }
        Some(Event::WorkoutResumed {
            resting: self.phase == Phase::Resting,
            at: clock.now(),
        })
    }

    /// Active|Resting -> Summary, or straight back to Setup when no set was
    /// completed. Both timers are cancelled with the transition so no late
    /// tick can resurrect the session.
    pub fn end_workout(&mut self) -> Option<Event> {
        if !matches!(self.phase, Phase::Active | Phase::Resting) {
            return None;
        }
        let clock = Arc::clone(&self.clock);
        if self.phase == Phase::Resting {
            self.total_rest_secs += self.rest.rested_secs(&*clock);
        }
        self.rest.skip();
        let elapsed_secs = self.elapsed.elapsed_secs(&*clock);
        self.elapsed.stop();
        self.paused = false;

        let at = clock.now();
        if self.completed_sets.is_empty() {
            self.reset_to_setup();
            return Some(Event::WorkoutDiscarded { at });
        }

        let summary = SessionSummary {
            total_reps: self.completed_reps(),
            elapsed_secs,
            sets_completed: self.completed_sets.len() as u32,
        };
        self.phase = Phase::Summary;
        self.ended_at = Some(at);
        self.summary = Some(summary);
        Some(Event::WorkoutEnded { summary, at })
    }

    /// Summary -> Setup, ready for the next session.
    pub fn dismiss_summary(&mut self) -> Option<Event> {
        if self.phase != Phase::Summary {
            return None;
        }
        let at = self.clock.now();
        self.reset_to_setup();
        Some(Event::SummaryDismissed { at })
    }

    fn reset_to_setup(&mut self) {
        self.phase = Phase::Setup;
        self.paused = false;
        self.current_set_number = 1;
        self.completed_sets.clear();
        self.started_at = None;
        self.ended_at = None;
        self.total_rest_secs = 0;
        self.summary = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn session(clock: &Arc<ManualClock>) -> WorkoutSession {
        WorkoutSession::with_clock(
            WorkoutConfig::default(),
            Arc::clone(clock) as SharedClock,
        )
    }

    fn manual() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(1_700_000_000_000))
    }

    #[test]
    fn start_resets_counters_and_elapsed() {
        let clock = manual();
        let mut s = session(&clock);
        assert!(s.start_workout().is_some());
        assert_eq!(s.phase(), Phase::Active);
        assert_eq!(s.current_set_number(), 1);
        assert_eq!(s.elapsed_secs(), 0);

        clock.advance_secs(42);
        assert_eq!(s.elapsed_secs(), 42);
    }

    #[test]
    fn start_rejects_invalid_config() {
        let clock = manual();
        let mut s = WorkoutSession::with_clock(
            WorkoutConfig {
                rest_seconds: 0,
                ..WorkoutConfig::default()
            },
            Arc::clone(&clock) as SharedClock,
        );
        assert!(s.start_workout().is_none());
        assert_eq!(s.phase(), Phase::Setup);
    }

    #[test]
    fn complete_set_logs_and_starts_rest() {
        let clock = manual();
        let mut s = session(&clock);
        s.start_workout();
        let event = s.complete_set(10).unwrap();
        assert!(matches!(
            event,
            Event::SetCompleted {
                set_number: 1,
                reps: 10,
                rest_secs: 60,
                upcoming_set: 2,
                ..
            }
        ));
        assert_eq!(s.phase(), Phase::Resting);
        assert_eq!(s.completed_sets().len(), 1);
        assert_eq!(s.rest_remaining_secs(), 60);
    }

    #[test]
    fn natural_rest_completion_advances_set_number() {
        let clock = manual();
        let mut s = session(&clock);
        s.start_workout();
        s.complete_set(10);

        clock.advance_secs(60);
        let event = s.tick().unwrap();
        assert!(matches!(event, Event::RestCompleted { set_number: 2, .. }));
        assert_eq!(s.phase(), Phase::Active);
        assert_eq!(s.current_set_number(), 2);
        assert!(s.tick().is_none());
    }

    #[test]
    fn skip_advances_without_completion_cue() {
        let clock = manual();
        let mut s = session(&clock);
        s.start_workout();
        s.complete_set(10);
        clock.advance_secs(5);

        let event = s.skip_rest().unwrap();
        assert!(matches!(event, Event::RestSkipped { set_number: 2, .. }));
        assert_eq!(s.current_set_number(), 2);
        assert_eq!(s.phase(), Phase::Active);

        // The cancelled countdown never fires later.
        clock.advance_secs(120);
        assert!(s.tick().is_none());
    }

    #[test]
    fn skip_outside_resting_is_noop() {
        let clock = manual();
        let mut s = session(&clock);
        assert!(s.skip_rest().is_none());
        s.start_workout();
        assert!(s.skip_rest().is_none());
        assert_eq!(s.current_set_number(), 1);
    }

    #[test]
    fn add_rest_time_raises_remaining_and_default() {
        let clock = manual();
        let mut s = session(&clock);
        s.start_workout();
        s.complete_set(10);
        clock.advance_secs(30);

        let event = s.add_rest_time(10).unwrap();
        assert!(matches!(
            event,
            Event::RestExtended {
                added_secs: 10,
                remaining_secs: 40,
                rest_secs: 70,
                ..
            }
        ));
        assert_eq!(s.rest_remaining_secs(), 40);
        assert_eq!(s.config().rest_seconds, 70);
    }

    #[test]
    fn add_rest_time_outside_resting_is_noop() {
        let clock = manual();
        let mut s = session(&clock);
        s.start_workout();
        assert!(s.add_rest_time(10).is_none());
        assert_eq!(s.config().rest_seconds, 60);
        assert_eq!(s.rest_remaining_secs(), 0);
    }

    #[test]
    fn pause_freezes_both_timers() {
        let clock = manual();
        let mut s = session(&clock);
        s.start_workout();
        clock.advance_secs(100);
        s.complete_set(10);
        clock.advance_secs(20);

        let before_elapsed = s.elapsed_secs();
        assert!(s.pause().is_some());
        assert!(s.pause().is_none());

        clock.advance_secs(600);
        assert_eq!(s.elapsed_secs(), before_elapsed);
        assert_eq!(s.rest_remaining_secs(), 40);
        assert!(s.tick().is_none());

        assert!(s.resume().is_some());
        clock.advance_secs(10);
        assert_eq!(s.elapsed_secs(), before_elapsed + 10);
        assert_eq!(s.rest_remaining_secs(), 30);
    }

    #[test]
    fn resume_without_pause_is_noop() {
        let clock = manual();
        let mut s = session(&clock);
        s.start_workout();
        assert!(s.resume().is_none());
    }

    #[test]
    fn goal_progress_is_clamped_and_advisory() {
        let clock = manual();
        let mut s = session(&clock);
        s.set_total_reps_goal(20);
        s.start_workout();
        s.complete_set(15);
        s.skip_rest();
        assert!((s.progress_percent() - 0.75).abs() < f64::EPSILON);
        assert!(!s.is_goal_complete());

        s.complete_set(50);
        assert!((s.progress_percent() - 1.0).abs() < f64::EPSILON);
        assert!(s.is_goal_complete());
        // Reaching the goal never auto-ends.
        assert_eq!(s.phase(), Phase::Resting);
    }

    #[test]
    fn end_with_sets_produces_summary_and_record() {
        let clock = manual();
        let mut s = session(&clock);
        s.start_workout();
        clock.advance_secs(60);
        s.complete_set(10);
        clock.advance_secs(30);
        s.skip_rest();
        clock.advance_secs(60);
        s.complete_set(8);

        let event = s.end_workout().unwrap();
        let summary = match event {
            Event::WorkoutEnded { summary, .. } => summary,
            other => panic!("expected WorkoutEnded, got {other:?}"),
        };
        assert_eq!(summary.total_reps, 18);
        assert_eq!(summary.sets_completed, 2);
        assert_eq!(summary.elapsed_secs, 150);
        assert_eq!(s.phase(), Phase::Summary);

        let record = s.session_record().unwrap();
        assert_eq!(record.sets.len(), 2);
        assert_eq!(record.total_reps(), 18);
        // Only the 30s of skipped rest; the second rest had just begun.
        assert_eq!(record.total_rest_secs, 30);

        assert!(s.dismiss_summary().is_some());
        assert_eq!(s.phase(), Phase::Setup);
        assert!(s.session_record().is_none());
    }

    #[test]
    fn end_without_sets_discards() {
        let clock = manual();
        let mut s = session(&clock);
        s.start_workout();
        clock.advance_secs(30);
        let event = s.end_workout().unwrap();
        assert!(matches!(event, Event::WorkoutDiscarded { .. }));
        assert_eq!(s.phase(), Phase::Setup);
        assert!(s.session_record().is_none());
    }

    #[test]
    fn ending_mid_rest_cancels_the_countdown() {
        let clock = manual();
        let mut s = session(&clock);
        s.start_workout();
        s.complete_set(10);
        clock.advance_secs(10);
        s.end_workout();
        assert_eq!(s.phase(), Phase::Summary);

        // A late tick after the transition changes nothing.
        clock.advance_secs(120);
        assert!(s.tick().is_none());
        assert_eq!(s.phase(), Phase::Summary);
        assert_eq!(s.session_record().unwrap().total_rest_secs, 10);
    }

    #[test]
    fn late_poll_does_not_inflate_recorded_rest() {
        let clock = manual();
        let mut s = session(&clock);
        s.start_workout();
        s.complete_set(10);

        // First poll arrives minutes after the 60s countdown expired.
        clock.advance_secs(600);
        let event = s.tick().unwrap();
        assert!(matches!(event, Event::RestCompleted { .. }));

        s.complete_set(10);
        s.end_workout();
        assert_eq!(s.session_record().unwrap().total_rest_secs, 60);
    }

    #[test]
    fn config_edits_only_in_setup() {
        let clock = manual();
        let mut s = session(&clock);
        s.set_rest_seconds(90);
        assert_eq!(s.config().rest_seconds, 90);
        s.set_rest_seconds(0);
        assert_eq!(s.config().rest_seconds, 90);

        s.start_workout();
        s.set_rest_seconds(30);
        assert_eq!(s.config().rest_seconds, 90);
    }

    #[test]
    fn defensive_noops_on_wrong_phase() {
        let clock = manual();
        let mut s = session(&clock);
        assert!(s.complete_set(10).is_none());
        assert!(s.end_workout().is_none());
        assert!(s.pause().is_none());
        assert!(s.dismiss_summary().is_none());
        assert!(s.tick().is_none());
        assert_eq!(s.phase(), Phase::Setup);
    }

    #[test]
    fn serialized_session_restores_state() {
        let clock = manual();
        let mut s = session(&clock);
        s.start_workout();
        s.complete_set(10);

        let json = serde_json::to_string(&s).unwrap();
        let restored: WorkoutSession = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.phase(), Phase::Resting);
        assert_eq!(restored.completed_reps(), 10);
        assert_eq!(restored.current_set_number(), 1);
    }
}
