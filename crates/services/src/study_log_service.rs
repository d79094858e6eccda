use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use curve_core::Clock;
use curve_core::model::{ModuleId, SessionLog, StudySession, StudySessionError};
use storage::codec::{decode_session_log, encode_session_log};
use storage::repository::{KeyValueStore, Keyspace};

use crate::persist::{Durability, load, lock};

/// Records study sessions and derives streaks from them.
///
/// Persistence follows the same best-effort write-through rules as
/// [`crate::ProgressStore`].
pub struct StudyLogService {
    clock: Clock,
    kv: Arc<dyn KeyValueStore>,
    key: String,
    log: Mutex<SessionLog>,
    write_gate: tokio::sync::Mutex<()>,
    durability: Durability,
}

impl StudyLogService {
    pub async fn initialize(clock: Clock, kv: Arc<dyn KeyValueStore>, keyspace: &Keyspace) -> Self {
        let key = keyspace.sessions();
        let (log, durability) = load(kv.as_ref(), &key, decode_session_log).await;

        Self {
            clock,
            kv,
            key,
            log: Mutex::new(log),
            write_gate: tokio::sync::Mutex::new(()),
            durability,
        }
    }

    /// Logs a session that started now.
    ///
    /// # Errors
    ///
    /// Returns `StudySessionError::ZeroMinutes` if `minutes` is zero.
    pub async fn record_session(
        &self,
        minutes: u32,
        module_id: Option<ModuleId>,
    ) -> Result<StudySession, StudySessionError> {
        let session = StudySession::new(self.clock.now(), minutes, module_id)?;

        let _gate = self.write_gate.lock().await;
        let snapshot = {
            let mut log = lock(&self.log);
            log.push(session.clone());
            log.clone()
        };

        match encode_session_log(&snapshot) {
            Ok(raw) => self.durability.write(self.kv.as_ref(), &self.key, &raw).await,
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "could not encode session log");
                self.durability.mark_degraded();
            }
        }
        Ok(session)
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionLog {
        lock(&self.log).clone()
    }

    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Consecutive study days ending today (or yesterday, if nothing is logged yet today).
    #[must_use]
    pub fn current_streak(&self) -> u32 {
        lock(&self.log).current_streak(self.clock.today())
    }

    #[must_use]
    pub fn longest_streak(&self) -> u32 {
        lock(&self.log).longest_streak()
    }

    #[must_use]
    pub fn minutes_on(&self, day: NaiveDate) -> u64 {
        lock(&self.log).minutes_on(day)
    }

    #[must_use]
    pub fn total_minutes(&self) -> u64 {
        lock(&self.log).total_minutes()
    }

    #[must_use]
    pub fn is_durable(&self) -> bool {
        self.durability.is_durable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use curve_core::time::fixed_now;
    use storage::codec::SCHEMA_VERSION;
    use storage::repository::{InMemoryRepository, UnavailableStore};

    use crate::test_support::FailFirstRead;

    #[tokio::test]
    async fn streak_builds_over_consecutive_days() {
        let repo = InMemoryRepository::new();
        let mut clock = Clock::fixed(fixed_now());

        for _ in 0..3 {
            let service =
                StudyLogService::initialize(clock, Arc::new(repo.clone()), &Keyspace::default())
                    .await;
            service.record_session(20, None).await.unwrap();
            clock.advance(Duration::days(1));
        }

        let service =
            StudyLogService::initialize(clock, Arc::new(repo.clone()), &Keyspace::default()).await;
        // Nothing logged yet on the fourth day; the streak still counts.
        assert_eq!(service.current_streak(), 3);
        assert_eq!(service.longest_streak(), 3);
        assert_eq!(service.total_minutes(), 60);

        clock.advance(Duration::days(1));
        let service =
            StudyLogService::initialize(clock, Arc::new(repo), &Keyspace::default()).await;
        assert_eq!(service.current_streak(), 0);
        assert_eq!(service.longest_streak(), 3);
    }

    #[tokio::test]
    async fn minutes_are_grouped_by_day() {
        let clock = Clock::fixed(fixed_now());
        let service = StudyLogService::initialize(
            clock,
            Arc::new(InMemoryRepository::new()),
            &Keyspace::default(),
        )
        .await;
        service
            .record_session(15, Some(ModuleId::new("js-basics")))
            .await
            .unwrap();
        service.record_session(10, None).await.unwrap();

        assert_eq!(service.minutes_on(service.today()), 25);
        assert_eq!(service.snapshot().sessions().len(), 2);
    }

    #[tokio::test]
    async fn zero_minutes_rejected_without_logging() {
        let service = StudyLogService::initialize(
            Clock::fixed(fixed_now()),
            Arc::new(InMemoryRepository::new()),
            &Keyspace::default(),
        )
        .await;
        assert!(service.record_session(0, None).await.is_err());
        assert!(service.snapshot().is_empty());
    }

    #[tokio::test]
    async fn works_without_storage() {
        let service = StudyLogService::initialize(
            Clock::fixed(fixed_now()),
            Arc::new(UnavailableStore),
            &Keyspace::default(),
        )
        .await;
        service.record_session(5, None).await.unwrap();
        assert_eq!(service.current_streak(), 1);
        assert!(!service.is_durable());
    }

    #[tokio::test]
    async fn failed_load_never_overwrites_stored_log() {
        let repo = InMemoryRepository::new();
        let key = Keyspace::default().sessions();
        let mut saved = SessionLog::default();
        saved.push(StudySession::new(fixed_now() - Duration::days(1), 40, None).unwrap());
        let raw = encode_session_log(&saved).unwrap();
        repo.set(&key, &raw).await.unwrap();

        let service = StudyLogService::initialize(
            Clock::fixed(fixed_now()),
            Arc::new(FailFirstRead::new(repo.clone())),
            &Keyspace::default(),
        )
        .await;
        assert!(!service.is_durable());

        service.record_session(15, None).await.unwrap();
        assert_eq!(service.total_minutes(), 15);
        assert_eq!(repo.get(&key).await.unwrap().as_deref(), Some(raw.as_str()));
    }

    #[tokio::test]
    async fn newer_schema_log_is_left_untouched() {
        let repo = InMemoryRepository::new();
        let key = Keyspace::default().sessions();
        let raw = format!(r#"{{"version":{},"sessions":[]}}"#, SCHEMA_VERSION + 1);
        repo.set(&key, &raw).await.unwrap();

        let service = StudyLogService::initialize(
            Clock::fixed(fixed_now()),
            Arc::new(repo.clone()),
            &Keyspace::default(),
        )
        .await;
        service.record_session(15, None).await.unwrap();
        assert!(!service.is_durable());
        assert_eq!(repo.get(&key).await.unwrap(), Some(raw));
    }
}
