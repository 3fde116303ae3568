//! SQLite-backed append-only workout history.
//!
//! Stores completed sessions with their per-set rep counts, plus a small
//! key-value table the CLI uses to persist the serialized session state
//! machine between invocations.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::data_dir;
use crate::error::HistoryError;
use crate::session::CompletedSet;

/// One completed workout as stored in history.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SessionRecord {
    pub sets: Vec<CompletedSet>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Seconds spent resting across the whole session.
    pub total_rest_secs: u64,
}

impl SessionRecord {
    pub fn total_reps(&self) -> u32 {
        self.sets.iter().map(|s| s.reps).sum()
    }
}

/// Append-only log of completed sessions.
pub struct HistoryStore {
    conn: Connection,
}

impl HistoryStore {
    /// Open the store at `~/.config/repcount/history.db`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, HistoryError> {
        let path = data_dir()
            .map_err(|e| HistoryError::QueryFailed(e.to_string()))?
            .join("history.db");
        Self::open_at(&path)
    }

    /// Open at an explicit path (tests, tools).
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &std::path::Path) -> Result<Self, HistoryError> {
        let conn = Connection::open(path).map_err(|source| HistoryError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, HistoryError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), HistoryError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                source_id       TEXT UNIQUE,
                started_at      TEXT NOT NULL,
                completed_at    TEXT NOT NULL,
                total_rest_secs INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS sets (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id   INTEGER NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
                set_index    INTEGER NOT NULL,
                reps         INTEGER NOT NULL,
                completed_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_completed_at ON sessions(completed_at);
            CREATE INDEX IF NOT EXISTS idx_sets_session_id ON sets(session_id);",
        )?;
        Ok(())
    }

    /// Append a locally completed session.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn append(&self, record: &SessionRecord) -> Result<i64, HistoryError> {
        self.insert(None, record)
    }

    /// Append a session received from the peer, deduplicated by payload
    /// identity. Returns `None` when `source_id` was already recorded
    /// (redelivery of the same payload).
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn append_synced(
        &self,
        source_id: &str,
        record: &SessionRecord,
    ) -> Result<Option<i64>, HistoryError> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM sessions WHERE source_id = ?1",
                params![source_id],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Ok(None);
        }
        self.insert(Some(source_id), record).map(Some)
    }

    fn insert(&self, source_id: Option<&str>, record: &SessionRecord) -> Result<i64, HistoryError> {
        self.conn.execute(
            "INSERT INTO sessions (source_id, started_at, completed_at, total_rest_secs)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                source_id,
                record.started_at.to_rfc3339(),
                record.completed_at.to_rfc3339(),
                record.total_rest_secs,
            ],
        )?;
        let session_id = self.conn.last_insert_rowid();
        for (index, set) in record.sets.iter().enumerate() {
            self.conn.execute(
                "INSERT INTO sets (session_id, set_index, reps, completed_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    session_id,
                    index as i64,
                    set.reps,
                    set.completed_at.to_rfc3339()
                ],
            )?;
        }
        Ok(session_id)
    }

    /// All recorded sessions, most recent first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn read_all(&self) -> Result<Vec<SessionRecord>, HistoryError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, started_at, completed_at, total_rest_secs
             FROM sessions
             ORDER BY completed_at DESC, id DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, u64>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, started_at, completed_at, total_rest_secs) = row?;
            records.push(SessionRecord {
                sets: self.sets_for(id)?,
                started_at: parse_timestamp(&started_at)?,
                completed_at: parse_timestamp(&completed_at)?,
                total_rest_secs,
            });
        }
        Ok(records)
    }

    fn sets_for(&self, session_id: i64) -> Result<Vec<CompletedSet>, HistoryError> {
        let mut stmt = self.conn.prepare(
            "SELECT reps, completed_at FROM sets WHERE session_id = ?1 ORDER BY set_index",
        )?;
        let rows = stmt.query_map(params![session_id], |row| {
            Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut sets = Vec::new();
        for row in rows {
            let (reps, completed_at) = row?;
            sets.push(CompletedSet {
                reps,
                completed_at: parse_timestamp(&completed_at)?,
            });
        }
        Ok(sets)
    }

    /// Delete all history.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub fn clear(&self) -> Result<(), HistoryError> {
        self.conn.execute_batch("DELETE FROM sets; DELETE FROM sessions;")?;
        Ok(())
    }

    /// Get a value from the kv store.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, HistoryError> {
        let result = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(result)
    }

    /// Set a value in the kv store.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), HistoryError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, HistoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| HistoryError::QueryFailed(format!("bad timestamp '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(reps: &[u32]) -> SessionRecord {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        SessionRecord {
            sets: reps
                .iter()
                .map(|&reps| CompletedSet {
                    reps,
                    completed_at: at,
                })
                .collect(),
            started_at: at,
            completed_at: at + chrono::Duration::minutes(20),
            total_rest_secs: 120,
        }
    }

    #[test]
    fn append_and_read_back() {
        let store = HistoryStore::open_memory().unwrap();
        store.append(&record(&[10, 8])).unwrap();

        let all = store.read_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].sets.len(), 2);
        assert_eq!(all[0].total_reps(), 18);
        assert_eq!(all[0].total_rest_secs, 120);
    }

    #[test]
    fn read_all_is_most_recent_first() {
        let store = HistoryStore::open_memory().unwrap();
        let mut older = record(&[5]);
        let mut newer = record(&[10]);
        older.completed_at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        newer.completed_at = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        store.append(&older).unwrap();
        store.append(&newer).unwrap();

        let all = store.read_all().unwrap();
        assert_eq!(all[0].total_reps(), 10);
        assert_eq!(all[1].total_reps(), 5);
    }

    #[test]
    fn synced_append_deduplicates() {
        let store = HistoryStore::open_memory().unwrap();
        let rec = record(&[10, 10]);
        assert!(store.append_synced("peer-abc", &rec).unwrap().is_some());
        assert!(store.append_synced("peer-abc", &rec).unwrap().is_none());
        assert_eq!(store.read_all().unwrap().len(), 1);
    }

    #[test]
    fn clear_empties_history() {
        let store = HistoryStore::open_memory().unwrap();
        store.append(&record(&[10])).unwrap();
        store.clear().unwrap();
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn kv_store() {
        let store = HistoryStore::open_memory().unwrap();
        assert!(store.kv_get("session").unwrap().is_none());
        store.kv_set("session", "{}").unwrap();
        assert_eq!(store.kv_get("session").unwrap().unwrap(), "{}");
    }
}
