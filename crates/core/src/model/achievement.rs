use crate::model::curriculum::Curriculum;
use crate::model::ids::AchievementId;
use crate::model::module::Track;
use crate::model::progress::ProgressRecord;

/// Condition that unlocks an achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AchievementRequirement {
    /// At least this many catalog modules completed.
    ModulesCompleted(usize),
    /// Level reached.
    LevelReached(u32),
    /// Current study streak, in days.
    StreakDays(u32),
    /// Every module of the track completed.
    TrackCompleted(Track),
    /// Total experience earned.
    ExperienceEarned(u64),
}

/// Everything an achievement condition may look at.
#[derive(Debug, Clone, Copy)]
pub struct AchievementContext<'a> {
    pub record: &'a ProgressRecord,
    pub curriculum: &'a Curriculum,
    pub current_streak: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementDefinition {
    id: AchievementId,
    title: String,
    description: String,
    requirement: AchievementRequirement,
    xp_reward: u32,
}

impl AchievementDefinition {
    #[must_use]
    pub fn new(
        id: AchievementId,
        title: impl Into<String>,
        description: impl Into<String>,
        requirement: AchievementRequirement,
        xp_reward: u32,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            requirement,
            xp_reward,
        }
    }

    #[must_use]
    pub fn id(&self) -> &AchievementId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn requirement(&self) -> AchievementRequirement {
        self.requirement
    }

    /// XP granted once, when the achievement unlocks.
    #[must_use]
    pub fn xp_reward(&self) -> u32 {
        self.xp_reward
    }

    #[must_use]
    pub fn is_satisfied(&self, ctx: &AchievementContext<'_>) -> bool {
        match self.requirement {
            AchievementRequirement::ModulesCompleted(count) => {
                ctx.curriculum.completed_count(ctx.record, None) >= count
            }
            AchievementRequirement::LevelReached(level) => ctx.record.level() >= level,
            AchievementRequirement::StreakDays(days) => ctx.current_streak >= days,
            AchievementRequirement::TrackCompleted(track) => {
                ctx.curriculum.is_track_completed(ctx.record, track)
            }
            AchievementRequirement::ExperienceEarned(xp) => ctx.record.experience() >= xp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::ModuleId;
    use crate::model::module::ModuleDefinition;

    fn curriculum() -> Curriculum {
        Curriculum::new(vec![
            ModuleDefinition::new(ModuleId::new("js-basics"), "Basics", Track::JavaScript, vec![], 100, 30)
                .unwrap(),
            ModuleDefinition::new(
                ModuleId::new("react-intro"),
                "Intro",
                Track::React,
                vec![ModuleId::new("js-basics")],
                150,
                30,
            )
            .unwrap(),
        ])
        .unwrap()
    }

    fn achievement(requirement: AchievementRequirement) -> AchievementDefinition {
        AchievementDefinition::new(AchievementId::new("test"), "Test", "", requirement, 0)
    }

    #[test]
    fn module_count_only_counts_catalog_modules() {
        let curriculum = curriculum();
        let mut record = ProgressRecord::default();
        record.complete_module(ModuleId::new("outside-catalog"));
        let first = achievement(AchievementRequirement::ModulesCompleted(1));

        let ctx = AchievementContext {
            record: &record,
            curriculum: &curriculum,
            current_streak: 0,
        };
        assert!(!first.is_satisfied(&ctx));

        record.complete_module(ModuleId::new("js-basics"));
        let ctx = AchievementContext {
            record: &record,
            curriculum: &curriculum,
            current_streak: 0,
        };
        assert!(first.is_satisfied(&ctx));
    }

    #[test]
    fn level_streak_track_and_xp_requirements() {
        let curriculum = curriculum();
        let mut record = ProgressRecord::default();
        record.add_experience(1_000);
        record.complete_module(ModuleId::new("js-basics"));
        let ctx = AchievementContext {
            record: &record,
            curriculum: &curriculum,
            current_streak: 3,
        };

        assert!(achievement(AchievementRequirement::LevelReached(3)).is_satisfied(&ctx));
        assert!(!achievement(AchievementRequirement::LevelReached(4)).is_satisfied(&ctx));
        assert!(achievement(AchievementRequirement::StreakDays(3)).is_satisfied(&ctx));
        assert!(!achievement(AchievementRequirement::StreakDays(7)).is_satisfied(&ctx));
        assert!(achievement(AchievementRequirement::TrackCompleted(Track::JavaScript)).is_satisfied(&ctx));
        assert!(!achievement(AchievementRequirement::TrackCompleted(Track::React)).is_satisfied(&ctx));
        assert!(achievement(AchievementRequirement::ExperienceEarned(1_000)).is_satisfied(&ctx));
    }
}
