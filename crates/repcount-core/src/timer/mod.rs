//! Drift-corrected timer primitives.
//!
//! `DriftTimer` is the shared base: it computes elapsed/remaining time from
//! a start snapshot plus an accumulated offset. `RestTimer` (bounded
//! countdown between sets), `ElapsedTimer` (unbounded count-up for the
//! whole workout), and `IntervalTimer` (work/rest rounds for interval
//! training) specialize it.

mod drift;
mod elapsed;
mod interval;
mod rest;

pub use drift::DriftTimer;
pub use elapsed::ElapsedTimer;
pub use interval::{IntervalPhase, IntervalPreset, IntervalTick, IntervalTimer};
pub use rest::{RestTick, RestTimer, COUNTDOWN_CUE_SECS};
