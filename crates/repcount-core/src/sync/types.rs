//! Wire payloads exchanged between paired devices.
//!
//! The schema is transport-agnostic JSON, tagged by `type`:
//! `settings` snapshots and `workoutComplete` summaries. Completed
//! sessions carry a generated `id` so the receiver can deduplicate
//! redelivered payloads.

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::{SessionRecord, WorkoutConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SyncPayload {
    #[serde(rename_all = "camelCase")]
    Settings {
        target_reps: u32,
        rest_seconds: u32,
        target_total_reps: u32,
    },
    #[serde(rename_all = "camelCase")]
    WorkoutComplete {
        /// Payload identity for receiver-side dedup.
        id: Uuid,
        /// Rep counts in set order.
        sets: Vec<u32>,
        target_reps: u32,
        rest_seconds: u32,
        /// Epoch seconds.
        start_time: i64,
        /// Epoch seconds.
        end_time: i64,
    },
}

impl SyncPayload {
    pub fn settings(config: &WorkoutConfig) -> Self {
        SyncPayload::Settings {
            target_reps: config.reps_per_set,
            rest_seconds: config.rest_seconds,
            target_total_reps: config.total_reps_goal,
        }
    }

    pub fn workout_complete(record: &SessionRecord, config: &WorkoutConfig) -> Self {
        SyncPayload::WorkoutComplete {
            id: Uuid::new_v4(),
            sets: record.sets.iter().map(|s| s.reps).collect(),
            target_reps: config.reps_per_set,
            rest_seconds: config.rest_seconds,
            start_time: record.started_at.timestamp(),
            end_time: record.completed_at.timestamp(),
        }
    }

    /// Rebuild a local history record from a received completed-session
    /// payload. Per-set timestamps are not carried on the wire, so each
    /// set is stamped with the session end time.
    pub fn to_session_record(&self) -> Option<(Uuid, SessionRecord)> {
        let SyncPayload::WorkoutComplete {
            id,
            sets,
            start_time,
            end_time,
            ..
        } = self
        else {
            return None;
        };
        let started_at = Utc.timestamp_opt(*start_time, 0).single()?;
        let completed_at = Utc.timestamp_opt(*end_time, 0).single()?;
        Some((
            *id,
            SessionRecord {
                sets: sets
                    .iter()
                    .map(|&reps| crate::session::CompletedSet {
                        reps,
                        completed_at,
                    })
                    .collect(),
                started_at,
                completed_at,
                total_rest_secs: 0,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_payload_matches_wire_schema() {
        let payload = SyncPayload::settings(&WorkoutConfig::default());
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "settings");
        assert_eq!(json["targetReps"], 10);
        assert_eq!(json["restSeconds"], 60);
        assert_eq!(json["targetTotalReps"], 100);
    }

    #[test]
    fn workout_complete_roundtrips_through_wire_json() {
        let record = SessionRecord {
            sets: vec![
                crate::session::CompletedSet {
                    reps: 10,
                    completed_at: Utc::now(),
                },
                crate::session::CompletedSet {
                    reps: 8,
                    completed_at: Utc::now(),
                },
            ],
            started_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            completed_at: Utc.timestamp_opt(1_700_000_900, 0).unwrap(),
            total_rest_secs: 60,
        };
        let payload = SyncPayload::workout_complete(&record, &WorkoutConfig::default());

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "workoutComplete");
        assert_eq!(json["sets"], serde_json::json!([10, 8]));
        assert_eq!(json["startTime"], 1_700_000_000i64);
        assert_eq!(json["endTime"], 1_700_000_900i64);

        let parsed: SyncPayload = serde_json::from_value(json).unwrap();
        let (_, rebuilt) = parsed.to_session_record().unwrap();
        assert_eq!(rebuilt.total_reps(), 18);
        assert_eq!(rebuilt.started_at, record.started_at);
        assert_eq!(rebuilt.completed_at, record.completed_at);
    }
}
