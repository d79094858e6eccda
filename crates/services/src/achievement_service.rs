use std::sync::Arc;

use curve_core::model::{AchievementContext, AchievementDefinition, Curriculum};

use crate::progress_store::ProgressStore;
use crate::study_log_service::StudyLogService;

/// Checks achievement conditions and unlocks the ones that are met.
#[derive(Clone)]
pub struct AchievementService {
    definitions: Arc<[AchievementDefinition]>,
    curriculum: Arc<Curriculum>,
    progress: Arc<ProgressStore>,
    study_log: Arc<StudyLogService>,
}

impl AchievementService {
    #[must_use]
    pub fn new(
        definitions: Vec<AchievementDefinition>,
        curriculum: Arc<Curriculum>,
        progress: Arc<ProgressStore>,
        study_log: Arc<StudyLogService>,
    ) -> Self {
        Self {
            definitions: definitions.into(),
            curriculum,
            progress,
            study_log,
        }
    }

    #[must_use]
    pub fn definitions(&self) -> &[AchievementDefinition] {
        &self.definitions
    }

    /// Every definition paired with whether it is unlocked.
    #[must_use]
    pub fn statuses(&self) -> Vec<(AchievementDefinition, bool)> {
        let record = self.progress.snapshot();
        self.definitions
            .iter()
            .map(|definition| (definition.clone(), record.has_achievement(definition.id())))
            .collect()
    }

    /// Unlocks every satisfied achievement and grants its reward.
    ///
    /// Rewards can satisfy further achievements (e.g. a level threshold), so
    /// evaluation repeats until nothing new unlocks. Returns the newly
    /// unlocked definitions in unlock order.
    pub async fn evaluate(&self) -> Vec<AchievementDefinition> {
        let mut unlocked = Vec::new();
        loop {
            let record = self.progress.snapshot();
            let ctx = AchievementContext {
                record: &record,
                curriculum: &self.curriculum,
                current_streak: self.study_log.current_streak(),
            };
            let pending: Vec<AchievementDefinition> = self
                .definitions
                .iter()
                .filter(|definition| !record.has_achievement(definition.id()))
                .filter(|definition| definition.is_satisfied(&ctx))
                .cloned()
                .collect();

            if pending.is_empty() {
                break;
            }

            for definition in pending {
                if self.progress.unlock_achievement(definition.id()).await {
                    tracing::info!(achievement = %definition.id(), "achievement unlocked");
                    self.progress
                        .add_experience(u64::from(definition.xp_reward()))
                        .await;
                    unlocked.push(definition);
                }
            }
        }
        unlocked
    }
}
