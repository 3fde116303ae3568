use std::path::{Path, PathBuf};

use clap::Subcommand;
use repcount_core::storage::data_dir;
use repcount_core::{
    apply_incoming, Applied, ConfigStore, Delivery, HistoryStore, PeerSyncChannel, PeerTransport,
    SessionRecord, SyncError, SyncPayload, WorkoutConfig,
};

const STATE_FILE: &str = "peer_sync.json";

#[derive(Subcommand)]
pub enum SyncAction {
    /// Send the current settings to the peer
    SendConfig,
    /// Send the most recent history entry to the peer
    SendLast,
    /// Deliver any queued payloads to a reachable peer
    Flush,
    /// Apply payloads dropped into an inbox directory
    Recv {
        /// Directory to read payload files from
        #[arg(long)]
        inbox: PathBuf,
    },
    /// Show reachability and queue depth
    Status,
}

/// File-drop transport: the peer's inbox is a directory. Reachable means
/// the directory exists; sending writes one JSON file per payload. Names
/// lead with the timestamp so lexical order is arrival order, and end in
/// a random suffix so concurrent senders never overwrite each other.
pub struct DirTransport {
    dir: PathBuf,
}

impl DirTransport {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl PeerTransport for DirTransport {
    fn is_reachable(&self) -> bool {
        self.dir.is_dir()
    }

    fn send(&mut self, payload: &SyncPayload) -> Result<(), SyncError> {
        if !self.is_reachable() {
            return Err(SyncError::Unreachable);
        }
        let stamp = chrono::Utc::now().timestamp_millis();
        let name = format!("{stamp}-{}.json", uuid::Uuid::new_v4());
        let data = serde_json::to_string_pretty(payload)?;
        std::fs::write(self.dir.join(name), data)?;
        Ok(())
    }
}

fn peer_dir() -> Option<PathBuf> {
    std::env::var("REPCOUNT_PEER_DIR").ok().map(PathBuf::from)
}

fn open_channel() -> Result<PeerSyncChannel<DirTransport>, Box<dyn std::error::Error>> {
    let dir = peer_dir().ok_or("no peer configured (set REPCOUNT_PEER_DIR)")?;
    let state_file = data_dir()?.join(STATE_FILE);
    Ok(PeerSyncChannel::with_state_file(
        DirTransport::new(dir),
        state_file,
    )?)
}

/// Hand a just-finished workout to the peer channel, if one is configured.
/// An unreachable peer queues durably; channel errors only warn, the
/// workout itself is already safe in local history.
pub fn forward_completed_session(record: &SessionRecord, config: &WorkoutConfig) {
    if peer_dir().is_none() {
        return;
    }
    match open_channel() {
        Ok(mut channel) => match channel.send_completed_session(record, config) {
            Ok(Delivery::Sent) => println!("synced workout to peer"),
            Ok(Delivery::Queued) => println!("peer unreachable, workout queued for sync"),
            Err(e) => eprintln!("warning: peer sync failed: {e}"),
        },
        Err(e) => eprintln!("warning: peer sync unavailable: {e}"),
    }
}

/// Refresh the peer's settings snapshot, if a peer is configured.
pub fn forward_config(config: &WorkoutConfig) {
    if peer_dir().is_none() {
        return;
    }
    match open_channel() {
        Ok(mut channel) => match channel.send_config(config) {
            Ok(Delivery::Sent) => println!("synced settings to peer"),
            Ok(Delivery::Queued) => println!("peer unreachable, settings queued for sync"),
            Err(e) => eprintln!("warning: peer sync failed: {e}"),
        },
        Err(e) => eprintln!("warning: peer sync unavailable: {e}"),
    }
}

fn recv(inbox: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config_store = ConfigStore::open()?;
    let history = HistoryStore::open()?;

    let mut entries: Vec<PathBuf> = std::fs::read_dir(inbox)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    // File names are timestamped, so lexical order is arrival order.
    entries.sort();

    for path in entries {
        let content = std::fs::read_to_string(&path)?;
        let payload: SyncPayload = serde_json::from_str(&content)?;
        match apply_incoming(&payload, &config_store, &history)? {
            Applied::ConfigUpdated(config) => {
                println!(
                    "settings updated: {} reps/set, {}s rest, goal {}",
                    config.reps_per_set, config.rest_seconds, config.total_reps_goal
                );
            }
            Applied::SessionRecorded(_) => println!("workout recorded from peer"),
            Applied::DuplicateIgnored => println!("duplicate workout ignored"),
        }
        std::fs::remove_file(&path)?;
    }
    Ok(())
}

pub fn run(action: SyncAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SyncAction::SendConfig => {
            let config = ConfigStore::open()?.load_or_default();
            let mut channel = open_channel()?;
            match channel.send_config(&config)? {
                Delivery::Sent => println!("settings sent"),
                Delivery::Queued => println!("peer unreachable, settings queued"),
            }
        }
        SyncAction::SendLast => {
            let history = HistoryStore::open()?;
            let config = ConfigStore::open()?.load_or_default();
            let record = history
                .read_all()?
                .into_iter()
                .next()
                .ok_or("history is empty")?;
            let mut channel = open_channel()?;
            match channel.send_completed_session(&record, &config)? {
                Delivery::Sent => println!("workout sent"),
                Delivery::Queued => println!("peer unreachable, workout queued"),
            }
        }
        SyncAction::Flush => {
            let mut channel = open_channel()?;
            let delivered = channel.flush()?;
            println!(
                "delivered {delivered} payload(s), {} still queued",
                channel.pending_sessions()
            );
        }
        SyncAction::Recv { inbox } => recv(&inbox)?,
        SyncAction::Status => {
            let channel = open_channel()?;
            println!(
                "peer reachable: {}, queued sessions: {}",
                channel.is_reachable(),
                channel.pending_sessions()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use repcount_core::WorkoutConfig;

    #[test]
    fn concurrent_senders_never_overwrite_queued_payloads() {
        let inbox = tempfile::TempDir::new().unwrap();
        let payload = SyncPayload::settings(&WorkoutConfig::default());

        // Two independent transports, as two processes would have, sending
        // within the same millisecond.
        let mut first = DirTransport::new(inbox.path().to_path_buf());
        let mut second = DirTransport::new(inbox.path().to_path_buf());
        first.send(&payload).unwrap();
        second.send(&payload).unwrap();

        let files: Vec<_> = std::fs::read_dir(inbox.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn unreachable_inbox_refuses_to_send() {
        let inbox = tempfile::TempDir::new().unwrap();
        let gone = inbox.path().join("missing");
        let mut transport = DirTransport::new(gone);
        assert!(!transport.is_reachable());
        let payload = SyncPayload::settings(&WorkoutConfig::default());
        assert!(matches!(
            transport.send(&payload),
            Err(SyncError::Unreachable)
        ));
    }
}
