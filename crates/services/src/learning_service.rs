use std::sync::Arc;

use curve_core::level::QUIZ_ANSWER_XP;
use curve_core::model::{
    AchievementDefinition, Curriculum, ModuleDefinition, ModuleFilter, ModuleId, ModuleStatus,
    missing_prerequisites,
};

use crate::achievement_service::AchievementService;
use crate::error::LearningError;
use crate::progress_store::ProgressStore;

/// XP and level change caused by one learner action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardOutcome {
    pub xp_awarded: u64,
    pub level_before: u32,
    pub level_after: u32,
    pub unlocked: Vec<AchievementDefinition>,
}

impl RewardOutcome {
    #[must_use]
    pub fn leveled_up(&self) -> bool {
        self.level_after > self.level_before
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub module: ModuleId,
    /// `false` when the module had already been completed; no XP is awarded then.
    pub newly_completed: bool,
    pub reward: RewardOutcome,
}

/// A module as the module list shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleView {
    pub definition: ModuleDefinition,
    pub status: ModuleStatus,
    pub missing_prerequisites: Vec<ModuleId>,
}

/// Learner-facing flows over the curriculum: opening, finishing and quizzing.
///
/// Lock gating happens here, not in [`ProgressStore`]: opening a locked
/// module is refused, but completion is always recorded.
#[derive(Clone)]
pub struct LearningService {
    curriculum: Arc<Curriculum>,
    progress: Arc<ProgressStore>,
    achievements: AchievementService,
}

impl LearningService {
    #[must_use]
    pub fn new(
        curriculum: Arc<Curriculum>,
        progress: Arc<ProgressStore>,
        achievements: AchievementService,
    ) -> Self {
        Self {
            curriculum,
            progress,
            achievements,
        }
    }

    #[must_use]
    pub fn curriculum(&self) -> &Curriculum {
        &self.curriculum
    }

    /// Modules matching `filter`, with their status for the current record.
    #[must_use]
    pub fn modules(&self, filter: &ModuleFilter) -> Vec<ModuleView> {
        let record = self.progress.snapshot();
        self.curriculum
            .filter(filter, &record)
            .into_iter()
            .map(|(definition, status)| ModuleView {
                missing_prerequisites: missing_prerequisites(definition, &record)
                    .into_iter()
                    .cloned()
                    .collect(),
                definition: definition.clone(),
                status,
            })
            .collect()
    }

    /// Marks `id` as the module in progress.
    ///
    /// # Errors
    ///
    /// Returns `LearningError::UnknownModule` if the catalog has no such module.
    /// Returns `LearningError::Locked` if prerequisites are missing.
    pub async fn start_module(&self, id: &ModuleId) -> Result<(), LearningError> {
        let module = self.module(id)?;
        let record = self.progress.snapshot();
        let missing = missing_prerequisites(module, &record);
        if !missing.is_empty() {
            return Err(LearningError::Locked {
                module: id.clone(),
                missing: missing.into_iter().cloned().collect(),
            });
        }
        self.progress.set_current_module(Some(id.clone())).await;
        Ok(())
    }

    /// Records completion of `id` and awards its XP the first time.
    ///
    /// # Errors
    ///
    /// Returns `LearningError::UnknownModule` if the catalog has no such module.
    pub async fn complete_module(&self, id: &ModuleId) -> Result<CompletionOutcome, LearningError> {
        let xp = u64::from(self.module(id)?.xp());
        let (experience_before, level_before) = self.levels();

        let newly_completed = self.progress.mark_module_complete(id).await;
        if newly_completed {
            self.progress.add_experience(xp).await;
        }
        if self.progress.snapshot().current_module() == Some(id) {
            self.progress.set_current_module(None).await;
        }

        let unlocked = self.achievements.evaluate().await;
        Ok(CompletionOutcome {
            module: id.clone(),
            newly_completed,
            reward: self.outcome(experience_before, level_before, unlocked),
        })
    }

    /// Awards XP for a quiz answer; wrong answers award nothing.
    pub async fn record_quiz_answer(&self, correct: bool) -> RewardOutcome {
        let amount = if correct { QUIZ_ANSWER_XP } else { 0 };
        self.award_experience(amount).await
    }

    /// Grants bonus XP and re-checks achievements.
    pub async fn award_experience(&self, amount: u64) -> RewardOutcome {
        let (experience_before, level_before) = self.levels();
        self.progress.add_experience(amount).await;
        let unlocked = self.achievements.evaluate().await;
        self.outcome(experience_before, level_before, unlocked)
    }

    fn module(&self, id: &ModuleId) -> Result<&ModuleDefinition, LearningError> {
        self.curriculum
            .get(id)
            .ok_or_else(|| LearningError::UnknownModule(id.clone()))
    }

    fn levels(&self) -> (u64, u32) {
        let record = self.progress.snapshot();
        (record.experience(), record.level())
    }

    fn outcome(
        &self,
        experience_before: u64,
        level_before: u32,
        unlocked: Vec<AchievementDefinition>,
    ) -> RewardOutcome {
        let (experience_after, level_after) = self.levels();
        RewardOutcome {
            xp_awarded: experience_after - experience_before,
            level_before,
            level_after,
            unlocked,
        }
    }
}
