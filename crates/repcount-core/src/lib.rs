//! # RepCount Core Library
//!
//! Core business logic for the RepCount workout tracker: the session
//! state machine, drift-corrected rest/elapsed timers, history and config
//! storage, and the best-effort peer sync channel. The CLI binary and any
//! GUI host are thin layers over this library.
//!
//! ## Architecture
//!
//! - **Timers**: wall-clock-based primitives that compute elapsed/remaining
//!   time from clock snapshots; the caller polls `tick()` periodically and
//!   the values stay correct no matter how irregular the polls are
//! - **Session**: a synchronous state machine (`Setup -> Active -> Resting
//!   -> Summary`) owned by a single execution context; every transition
//!   publishes an [`Event`]
//! - **Storage**: SQLite-backed append-only history and a whole-value TOML
//!   config
//! - **Sync**: durable last-write-wins settings slot plus an
//!   order-preserving outbox toward the paired device, behind an injected
//!   [`PeerTransport`]
//!
//! ## Key Components
//!
//! - [`WorkoutSession`]: central state machine
//! - [`RestTimer`] / [`ElapsedTimer`]: countdown and count-up timers
//! - [`IntervalTimer`]: work/rest round timer for interval training
//! - [`HistoryStore`] / [`ConfigStore`]: persistence
//! - [`PeerSyncChannel`]: companion-device sync

pub mod clock;
pub mod error;
pub mod events;
pub mod session;
pub mod storage;
pub mod sync;
pub mod timer;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use error::{ConfigError, CoreError, HistoryError, SyncError};
pub use events::Event;
pub use session::{CompletedSet, Phase, SessionSummary, WorkoutSession};
pub use storage::{ConfigStore, HistoryStore, SessionRecord, WorkoutConfig};
pub use sync::{apply_incoming, Applied, Delivery, PeerSyncChannel, PeerTransport, SyncPayload};
pub use timer::{
    DriftTimer, ElapsedTimer, IntervalPhase, IntervalPreset, IntervalTick, IntervalTimer,
    RestTick, RestTimer,
};
