use std::collections::BTreeSet;

use crate::level::level_for_xp;
use crate::model::ids::{AchievementId, ModuleId};

/// A learner's gamified progress.
///
/// `level` is not a field: it is derived from `experience` on every read, so
/// the two can never drift apart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressRecord {
    completed_modules: BTreeSet<ModuleId>,
    unlocked_achievements: BTreeSet<AchievementId>,
    experience: u64,
    current_module: Option<ModuleId>,
}

impl ProgressRecord {
    /// Rehydrate a record from persisted parts.
    ///
    /// Duplicate identifiers collapse into their sets.
    #[must_use]
    pub fn from_persisted(
        completed_modules: impl IntoIterator<Item = ModuleId>,
        unlocked_achievements: impl IntoIterator<Item = AchievementId>,
        experience: u64,
        current_module: Option<ModuleId>,
    ) -> Self {
        Self {
            completed_modules: completed_modules.into_iter().collect(),
            unlocked_achievements: unlocked_achievements.into_iter().collect(),
            experience,
            current_module,
        }
    }

    #[must_use]
    pub fn completed_modules(&self) -> &BTreeSet<ModuleId> {
        &self.completed_modules
    }

    #[must_use]
    pub fn unlocked_achievements(&self) -> &BTreeSet<AchievementId> {
        &self.unlocked_achievements
    }

    #[must_use]
    pub fn experience(&self) -> u64 {
        self.experience
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        level_for_xp(self.experience)
    }

    #[must_use]
    pub fn current_module(&self) -> Option<&ModuleId> {
        self.current_module.as_ref()
    }

    #[must_use]
    pub fn is_completed(&self, id: &ModuleId) -> bool {
        self.completed_modules.contains(id)
    }

    #[must_use]
    pub fn has_achievement(&self, id: &AchievementId) -> bool {
        self.unlocked_achievements.contains(id)
    }

    /// Adds a module to the completed set. Returns `false` if it was already there.
    pub fn complete_module(&mut self, id: ModuleId) -> bool {
        self.completed_modules.insert(id)
    }

    /// Adds an achievement to the unlocked set. Returns `false` if it was already there.
    pub fn unlock_achievement(&mut self, id: AchievementId) -> bool {
        self.unlocked_achievements.insert(id)
    }

    /// Adds experience, saturating at `u64::MAX`. Returns the new total.
    pub fn add_experience(&mut self, amount: u64) -> u64 {
        self.experience = self.experience.saturating_add(amount);
        self.experience
    }

    /// Replaces the active module. Returns `false` if nothing changed.
    pub fn set_current_module(&mut self, id: Option<ModuleId>) -> bool {
        if self.current_module == id {
            return false;
        }
        self.current_module = id;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::XP_PER_LEVEL;

    #[test]
    fn default_record_is_empty_level_one() {
        let record = ProgressRecord::default();
        assert!(record.completed_modules().is_empty());
        assert!(record.unlocked_achievements().is_empty());
        assert_eq!(record.experience(), 0);
        assert_eq!(record.level(), 1);
        assert_eq!(record.current_module(), None);
    }

    #[test]
    fn completing_twice_keeps_one_entry() {
        let mut record = ProgressRecord::default();
        assert!(record.complete_module(ModuleId::new("js-basics")));
        assert!(!record.complete_module(ModuleId::new("js-basics")));
        assert_eq!(record.completed_modules().len(), 1);
    }

    #[test]
    fn experience_sums_and_level_follows() {
        let mut record = ProgressRecord::default();
        let amounts = [0, 250, 250, 1, 249, 999];
        let mut expected = 0;
        for amount in amounts {
            let before = record.experience();
            record.add_experience(amount);
            expected += amount;
            assert!(record.experience() >= before);
            assert_eq!(record.experience(), expected);
            assert_eq!(record.level(), level_for_xp(expected));
        }
        assert_eq!(record.level(), u32::try_from(expected / XP_PER_LEVEL).unwrap() + 1);
    }

    #[test]
    fn experience_saturates() {
        let mut record = ProgressRecord::from_persisted([], [], u64::MAX - 1, None);
        record.add_experience(10);
        assert_eq!(record.experience(), u64::MAX);
    }

    #[test]
    fn from_persisted_deduplicates() {
        let record = ProgressRecord::from_persisted(
            [ModuleId::new("js-basics"), ModuleId::new("js-basics")],
            [AchievementId::new("first-steps"), AchievementId::new("first-steps")],
            100,
            Some(ModuleId::new("js-async")),
        );
        assert_eq!(record.completed_modules().len(), 1);
        assert_eq!(record.unlocked_achievements().len(), 1);
        assert_eq!(record.current_module(), Some(&ModuleId::new("js-async")));
    }

    #[test]
    fn set_current_module_reports_changes() {
        let mut record = ProgressRecord::default();
        assert!(!record.set_current_module(None));
        assert!(record.set_current_module(Some(ModuleId::new("react-intro"))));
        assert!(!record.set_current_module(Some(ModuleId::new("react-intro"))));
        assert!(record.set_current_module(None));
    }
}
