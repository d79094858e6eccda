//! JSON wire format for persisted learner data.
//!
//! Sets travel as sorted arrays and are deduplicated again on load. The
//! stored `level` is written for readers of the raw value only; decoding
//! always derives it from `experience`.

use chrono::{DateTime, Utc};
use curve_core::model::{AchievementId, ModuleId, ProgressRecord, SessionLog, StudySession};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current schema version written by [`encode_progress`] and
/// [`encode_session_log`].
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodecError {
    #[error("malformed stored value: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("stored schema version {found} is newer than supported version {}", SCHEMA_VERSION)]
    UnsupportedVersion { found: u32 },
}

fn default_version() -> u32 {
    SCHEMA_VERSION
}

/// Persisted shape of a [`ProgressRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedProgress {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub completed_modules: Vec<String>,
    #[serde(default)]
    pub experience: u64,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub current_module: Option<String>,
    #[serde(default)]
    pub unlocked_achievements: Vec<String>,
}

impl PersistedProgress {
    #[must_use]
    pub fn from_record(record: &ProgressRecord) -> Self {
        Self {
            version: SCHEMA_VERSION,
            completed_modules: record
                .completed_modules()
                .iter()
                .map(|id| id.as_str().to_owned())
                .collect(),
            experience: record.experience(),
            level: record.level(),
            current_module: record.current_module().map(|id| id.as_str().to_owned()),
            unlocked_achievements: record
                .unlocked_achievements()
                .iter()
                .map(|id| id.as_str().to_owned())
                .collect(),
        }
    }

    /// Convert back into a domain record.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::UnsupportedVersion` for records written by a newer schema.
    pub fn into_record(self) -> Result<ProgressRecord, CodecError> {
        if self.version > SCHEMA_VERSION {
            return Err(CodecError::UnsupportedVersion {
                found: self.version,
            });
        }
        Ok(ProgressRecord::from_persisted(
            self.completed_modules.into_iter().map(ModuleId::new),
            self.unlocked_achievements
                .into_iter()
                .map(AchievementId::new),
            self.experience,
            self.current_module.map(ModuleId::new),
        ))
    }
}

/// Persisted shape of one [`StudySession`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    pub started_at: DateTime<Utc>,
    pub minutes: u32,
    #[serde(default)]
    pub module_id: Option<String>,
}

/// Persisted shape of a [`SessionLog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSessionLog {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub sessions: Vec<PersistedSession>,
}

impl PersistedSessionLog {
    #[must_use]
    pub fn from_log(log: &SessionLog) -> Self {
        Self {
            version: SCHEMA_VERSION,
            sessions: log
                .sessions()
                .iter()
                .map(|session| PersistedSession {
                    started_at: session.started_at(),
                    minutes: session.minutes(),
                    module_id: session.module_id().map(|id| id.as_str().to_owned()),
                })
                .collect(),
        }
    }

    /// Convert back into a domain log. Entries that fail validation are dropped.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::UnsupportedVersion` for logs written by a newer schema.
    pub fn into_log(self) -> Result<SessionLog, CodecError> {
        if self.version > SCHEMA_VERSION {
            return Err(CodecError::UnsupportedVersion {
                found: self.version,
            });
        }
        let mut sessions = Vec::with_capacity(self.sessions.len());
        for entry in self.sessions {
            let module_id = entry.module_id.map(ModuleId::new);
            match StudySession::new(entry.started_at, entry.minutes, module_id) {
                Ok(session) => sessions.push(session),
                Err(err) => {
                    tracing::warn!(
                        started_at = %entry.started_at,
                        error = %err,
                        "dropping invalid study session"
                    );
                }
            }
        }
        Ok(SessionLog::new(sessions))
    }
}

/// Serialize a progress record for storage.
///
/// # Errors
///
/// Returns `CodecError::Malformed` if serialization fails.
pub fn encode_progress(record: &ProgressRecord) -> Result<String, CodecError> {
    Ok(serde_json::to_string(&PersistedProgress::from_record(record))?)
}

/// Parse a stored progress record.
///
/// # Errors
///
/// Returns `CodecError` if the value is not a valid record or uses a newer schema.
pub fn decode_progress(raw: &str) -> Result<ProgressRecord, CodecError> {
    serde_json::from_str::<PersistedProgress>(raw)?.into_record()
}

/// Serialize a session log for storage.
///
/// # Errors
///
/// Returns `CodecError::Malformed` if serialization fails.
pub fn encode_session_log(log: &SessionLog) -> Result<String, CodecError> {
    Ok(serde_json::to_string(&PersistedSessionLog::from_log(log))?)
}

/// Parse a stored session log.
///
/// # Errors
///
/// Returns `CodecError` if the value is not a valid log or uses a newer schema.
pub fn decode_session_log(raw: &str) -> Result<SessionLog, CodecError> {
    serde_json::from_str::<PersistedSessionLog>(raw)?.into_log()
}

#[cfg(test)]
mod tests {
    use super::*;
    use curve_core::time::fixed_now;

    fn sample_record() -> ProgressRecord {
        let mut record = ProgressRecord::default();
        record.complete_module(ModuleId::new("react-hooks"));
        record.complete_module(ModuleId::new("js-basics"));
        record.unlock_achievement(AchievementId::new("first-steps"));
        record.add_experience(1_250);
        record.set_current_module(Some(ModuleId::new("react-context")));
        record
    }

    #[test]
    fn progress_round_trip_preserves_sets_and_level() {
        let record = sample_record();
        let decoded = decode_progress(&encode_progress(&record).unwrap()).unwrap();
        assert_eq!(decoded, record);
        assert_eq!(decoded.level(), 3);
    }

    #[test]
    fn wire_shape_uses_camel_case_sorted_arrays() {
        let raw = encode_progress(&sample_record()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["completedModules"], serde_json::json!(["js-basics", "react-hooks"]));
        assert_eq!(value["experience"], 1_250);
        assert_eq!(value["level"], 3);
        assert_eq!(value["currentModule"], "react-context");
        assert_eq!(value["unlockedAchievements"], serde_json::json!(["first-steps"]));
    }

    #[test]
    fn decode_deduplicates_and_recomputes_level() {
        let raw = r#"{
            "completedModules": ["js-basics", "js-basics", "js-async"],
            "experience": 600,
            "level": 42,
            "currentModule": null
        }"#;
        let record = decode_progress(raw).unwrap();
        assert_eq!(record.completed_modules().len(), 2);
        assert_eq!(record.level(), 2);
        assert!(record.unlocked_achievements().is_empty());
    }

    #[test]
    fn decode_rejects_garbage_and_future_versions() {
        assert!(matches!(decode_progress("not json"), Err(CodecError::Malformed(_))));
        assert!(matches!(
            decode_progress(r#"{"experience": -5}"#),
            Err(CodecError::Malformed(_))
        ));
        assert!(matches!(
            decode_progress(r#"{"version": 2, "experience": 5}"#),
            Err(CodecError::UnsupportedVersion { found: 2 })
        ));
    }

    #[test]
    fn session_log_round_trip_drops_invalid_entries() {
        let mut log = SessionLog::default();
        log.push(StudySession::new(fixed_now(), 25, Some(ModuleId::new("js-basics"))).unwrap());
        let decoded = decode_session_log(&encode_session_log(&log).unwrap()).unwrap();
        assert_eq!(decoded, log);

        let raw = r#"{"version":1,"sessions":[
            {"startedAt":"2023-11-14T22:13:20Z","minutes":0},
            {"startedAt":"2023-11-14T22:13:20Z","minutes":10,"moduleId":null}
        ]}"#;
        let decoded = decode_session_log(raw).unwrap();
        assert_eq!(decoded.sessions().len(), 1);
        assert_eq!(decoded.total_minutes(), 10);
    }
}
