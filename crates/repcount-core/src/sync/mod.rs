//! Best-effort peer synchronization between paired devices.
//!
//! Carries settings snapshots (last-write-wins) and completed-session
//! summaries (order-preserving, never coalesced) to the companion device,
//! tolerating the peer being unreachable.

mod channel;
mod types;

pub use channel::{apply_incoming, Applied, Delivery, PeerSyncChannel, PeerTransport};
pub use types::SyncPayload;
