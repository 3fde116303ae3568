//! Published state changes.
//!
//! Every successful session transition produces one `Event`. The UI polls
//! or subscribes and renders the published state; it never inspects the
//! session's internals.
//!
//! The rest-timer variants double as the external notification scheduler's
//! hooks: `SetCompleted` (carrying the rest duration and upcoming set
//! number) and `RestExtended` arm or re-arm a mirrored background alert,
//! while `RestCompleted`, `RestSkipped`, `WorkoutPaused` and the
//! end-of-workout variants resolve it. Core never depends on that alert
//! being delivered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::{Phase, SessionSummary};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    WorkoutStarted {
        set_number: u32,
        goal_reps: u32,
        at: DateTime<Utc>,
    },
    /// A set was logged and the rest countdown armed.
    SetCompleted {
        set_number: u32,
        reps: u32,
        rest_secs: u64,
        upcoming_set: u32,
        at: DateTime<Utc>,
    },
    /// Once-per-second cue while rest remaining is in the final stretch.
    RestCountdownTick {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Rest ran down naturally; the next set is up.
    RestCompleted {
        set_number: u32,
        at: DateTime<Utc>,
    },
    /// Rest was skipped; advances the set number without the completion cue.
    RestSkipped {
        set_number: u32,
        at: DateTime<Utc>,
    },
    RestExtended {
        added_secs: u64,
        remaining_secs: u64,
        /// New configured default after the permanent raise.
        rest_secs: u32,
        at: DateTime<Utc>,
    },
    WorkoutPaused {
        resting: bool,
        at: DateTime<Utc>,
    },
    WorkoutResumed {
        resting: bool,
        at: DateTime<Utc>,
    },
    WorkoutEnded {
        summary: SessionSummary,
        at: DateTime<Utc>,
    },
    /// Ended with zero completed sets: nothing recorded, no summary shown.
    WorkoutDiscarded {
        at: DateTime<Utc>,
    },
    SummaryDismissed {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        paused: bool,
        set_number: u32,
        sets_completed: u32,
        completed_reps: u32,
        goal_reps: u32,
        progress_pct: f64,
        goal_complete: bool,
        elapsed_secs: u64,
        rest_remaining_secs: u64,
        at: DateTime<Utc>,
    },
}
