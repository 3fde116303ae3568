//! Best-effort channel to the paired device.
//!
//! Two delivery disciplines, per payload kind:
//! - settings: a durable last-write-wins "latest state" slot, always
//!   updated regardless of reachability. A later snapshot overwrites an
//!   undelivered earlier one.
//! - completed sessions: a durable order-preserving FIFO outbox. Each
//!   session is a distinct history entry and is never coalesced.
//!
//! Senders never wait on reachability; an unreachable peer degrades to the
//! durable fallback and `flush()` drains it later. The channel and its
//! transport are constructed and injected by the owning process -- there is
//! no ambient singleton.

use std::collections::VecDeque;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, SyncError};
use crate::storage::{ConfigStore, HistoryStore, SessionRecord, WorkoutConfig};
use crate::sync::types::SyncPayload;

/// Transport seam between paired devices. Implementations decide what
/// "reachable" and "send" mean (in-process pair, directory drop, ...).
pub trait PeerTransport {
    fn is_reachable(&self) -> bool;

    /// Attempt immediate delivery.
    ///
    /// # Errors
    /// Returns an error when the payload cannot be handed to the peer.
    fn send(&mut self, payload: &SyncPayload) -> Result<(), SyncError>;
}

/// How a send resolved from the caller's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Handed to the peer immediately.
    Sent,
    /// Peer unreachable; retained durably for later delivery.
    Queued,
}

/// What the receiver did with an incoming payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    ConfigUpdated(WorkoutConfig),
    SessionRecorded(i64),
    /// Redelivery of an already-recorded session payload.
    DuplicateIgnored,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ChannelState {
    latest_config: Option<SyncPayload>,
    outbox: VecDeque<SyncPayload>,
}

/// Sender half of the peer link.
pub struct PeerSyncChannel<T: PeerTransport> {
    transport: T,
    state: ChannelState,
    /// Durable copy of the slot + outbox. `None` keeps the channel
    /// in-memory (tests, embedded hosts with their own persistence).
    state_file: Option<PathBuf>,
}

impl<T: PeerTransport> PeerSyncChannel<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: ChannelState::default(),
            state_file: None,
        }
    }

    /// Channel whose slot and outbox survive process restarts.
    ///
    /// # Errors
    /// Returns an error if an existing state file cannot be parsed.
    pub fn with_state_file(transport: T, path: PathBuf) -> Result<Self, SyncError> {
        let state = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ChannelState::default(),
            Err(e) => return Err(SyncError::Io(e)),
        };
        Ok(Self {
            transport,
            state,
            state_file: Some(path),
        })
    }

    /// Send a settings snapshot. The durable slot is updated first
    /// (last-write-wins), then immediate delivery is attempted.
    ///
    /// # Errors
    /// Only persistence of the durable slot can fail; an unreachable peer
    /// resolves to `Delivery::Queued`.
    pub fn send_config(&mut self, config: &WorkoutConfig) -> Result<Delivery, SyncError> {
        let payload = SyncPayload::settings(config);
        self.state.latest_config = Some(payload.clone());
        self.persist()?;

        if self.transport.is_reachable() && self.transport.send(&payload).is_ok() {
            Ok(Delivery::Sent)
        } else {
            Ok(Delivery::Queued)
        }
    }

    /// Send a completed session. Unreachable peers enqueue it for
    /// guaranteed, order-preserving eventual delivery.
    ///
    /// # Errors
    /// Only persistence of the outbox can fail.
    pub fn send_completed_session(
        &mut self,
        record: &SessionRecord,
        config: &WorkoutConfig,
    ) -> Result<Delivery, SyncError> {
        let payload = SyncPayload::workout_complete(record, config);
        if self.transport.is_reachable() && self.transport.send(&payload).is_ok() {
            return Ok(Delivery::Sent);
        }
        self.state.outbox.push_back(payload);
        self.persist()?;
        Ok(Delivery::Queued)
    }

    /// Drain pending state to a now-reachable peer: the latest settings
    /// slot first, then the session outbox in order. Stops at the first
    /// failed send. Returns the number of payloads delivered.
    ///
    /// # Errors
    /// Only persistence of the drained outbox can fail.
    pub fn flush(&mut self) -> Result<usize, SyncError> {
        if !self.transport.is_reachable() {
            return Ok(0);
        }
        let mut delivered = 0;

        if let Some(payload) = self.state.latest_config.clone() {
            if self.transport.send(&payload).is_err() {
                return Ok(delivered);
            }
            // The slot stays: it is "latest known state", not a queue entry.
            delivered += 1;
        }

        while let Some(payload) = self.state.outbox.front() {
            if self.transport.send(payload).is_err() {
                break;
            }
            self.state.outbox.pop_front();
            delivered += 1;
        }
        self.persist()?;
        Ok(delivered)
    }

    pub fn pending_sessions(&self) -> usize {
        self.state.outbox.len()
    }

    pub fn latest_config(&self) -> Option<&SyncPayload> {
        self.state.latest_config.as_ref()
    }

    pub fn is_reachable(&self) -> bool {
        self.transport.is_reachable()
    }

    fn persist(&self) -> Result<(), SyncError> {
        if let Some(path) = &self.state_file {
            let data = serde_json::to_string_pretty(&self.state)?;
            std::fs::write(path, data)?;
        }
        Ok(())
    }
}

/// Receiver side: apply an incoming payload to the local stores.
///
/// Settings overwrite the whole local config and persist it. Completed
/// sessions are appended to history exactly once per distinct payload id.
///
/// # Errors
/// Returns an error if the local store write fails.
pub fn apply_incoming(
    payload: &SyncPayload,
    config_store: &ConfigStore,
    history: &HistoryStore,
) -> Result<Applied, CoreError> {
    match payload {
        SyncPayload::Settings {
            target_reps,
            rest_seconds,
            target_total_reps,
        } => {
            let config = WorkoutConfig {
                reps_per_set: *target_reps,
                rest_seconds: *rest_seconds,
                total_reps_goal: *target_total_reps,
            };
            config_store.save(&config)?;
            Ok(Applied::ConfigUpdated(config))
        }
        SyncPayload::WorkoutComplete { .. } => {
            let (id, record) = payload.to_session_record().ok_or_else(|| {
                SyncError::Transport("workoutComplete payload has out-of-range timestamps".into())
            })?;
            match history.append_synced(&id.to_string(), &record)? {
                Some(row_id) => Ok(Applied::SessionRecorded(row_id)),
                None => Ok(Applied::DuplicateIgnored),
            }
        }
    }
}
