use std::sync::Arc;

use curve_core::catalog::builtin_achievements;
use curve_core::model::{AchievementDefinition, Curriculum, ModuleId, StudySession, StudySessionError};
use storage::repository::{KeyValueStore, Keyspace, Storage};

use crate::Clock;
use crate::achievement_service::AchievementService;
use crate::error::AppServicesError;
use crate::learning_service::LearningService;
use crate::overview::ProgressOverview;
use crate::progress_store::ProgressStore;
use crate::study_log_service::StudyLogService;

/// Assembles the app-facing services over one storage backend and namespace.
#[derive(Clone)]
pub struct AppServices {
    kv: Arc<dyn KeyValueStore>,
    keyspace: Keyspace,
    curriculum: Arc<Curriculum>,
    progress: Arc<ProgressStore>,
    study_log: Arc<StudyLogService>,
    achievements: AchievementService,
    learning: LearningService,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage cannot be opened or the built-in
    /// catalog is inconsistent.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        keyspace: Keyspace,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::from_storage(&storage, clock, keyspace).await
    }

    /// Build services over an existing storage handle with the built-in catalog.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Catalog` if the built-in catalog is inconsistent.
    pub async fn from_storage(
        storage: &Storage,
        clock: Clock,
        keyspace: Keyspace,
    ) -> Result<Self, AppServicesError> {
        let curriculum = Arc::new(Curriculum::builtin()?);
        let kv = Arc::clone(&storage.kv);

        let progress = Arc::new(ProgressStore::initialize(Arc::clone(&kv), &keyspace).await);
        let study_log =
            Arc::new(StudyLogService::initialize(clock, Arc::clone(&kv), &keyspace).await);
        let achievements = AchievementService::new(
            builtin_achievements(),
            Arc::clone(&curriculum),
            Arc::clone(&progress),
            Arc::clone(&study_log),
        );
        let learning = LearningService::new(
            Arc::clone(&curriculum),
            Arc::clone(&progress),
            achievements.clone(),
        );

        Ok(Self {
            kv,
            keyspace,
            curriculum,
            progress,
            study_log,
            achievements,
            learning,
        })
    }

    #[must_use]
    pub fn keyspace(&self) -> &Keyspace {
        &self.keyspace
    }

    #[must_use]
    pub fn curriculum(&self) -> Arc<Curriculum> {
        Arc::clone(&self.curriculum)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressStore> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn study_log(&self) -> Arc<StudyLogService> {
        Arc::clone(&self.study_log)
    }

    #[must_use]
    pub fn achievements(&self) -> &AchievementService {
        &self.achievements
    }

    #[must_use]
    pub fn learning(&self) -> &LearningService {
        &self.learning
    }

    /// Whether both the progress record and the session log reach durable storage.
    #[must_use]
    pub fn is_durable(&self) -> bool {
        self.progress.is_durable() && self.study_log.is_durable()
    }

    /// Logs a study session started now and unlocks any streak achievements
    /// it completes.
    ///
    /// # Errors
    ///
    /// Returns `StudySessionError` if the session is empty.
    pub async fn record_study(
        &self,
        minutes: u32,
        module: Option<ModuleId>,
    ) -> Result<(StudySession, Vec<AchievementDefinition>), StudySessionError> {
        let session = self.study_log.record_session(minutes, module).await?;
        let unlocked = self.achievements.evaluate().await;
        Ok((session, unlocked))
    }

    #[must_use]
    pub fn overview(&self) -> ProgressOverview {
        ProgressOverview::build(
            &self.progress.snapshot(),
            &self.curriculum,
            &self.study_log.snapshot(),
            self.study_log.today(),
            self.achievements.definitions(),
        )
    }

    /// Deletes everything stored under this namespace. Services built before
    /// the call keep their in-memory state.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend rejects the deletion.
    pub async fn clear_storage(&self) -> Result<(), storage::repository::StorageError> {
        self.kv.remove(&self.keyspace.progress()).await?;
        self.kv.remove(&self.keyspace.sessions()).await?;
        Ok(())
    }
}
