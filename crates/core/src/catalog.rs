//! Built-in course content: the JavaScript, React and Next.js tracks and the
//! achievements awarded along the way.

use crate::error::Error;
use crate::model::{
    AchievementDefinition, AchievementId, AchievementRequirement, Curriculum, ModuleDefinition,
    ModuleId, Track,
};

struct ModuleSpec {
    id: &'static str,
    title: &'static str,
    prerequisites: &'static [&'static str],
    xp: u32,
    minutes: u32,
}

const MODULES: &[ModuleSpec] = &[
    ModuleSpec { id: "js-basics", title: "Values, types and variables", prerequisites: &[], xp: 100, minutes: 30 },
    ModuleSpec { id: "js-functions", title: "Functions and closures", prerequisites: &["js-basics"], xp: 120, minutes: 40 },
    ModuleSpec { id: "js-objects", title: "Objects, prototypes and classes", prerequisites: &["js-functions"], xp: 150, minutes: 45 },
    ModuleSpec { id: "js-async", title: "Promises and async/await", prerequisites: &["js-functions"], xp: 200, minutes: 50 },
    ModuleSpec { id: "js-modules", title: "Modules and tooling", prerequisites: &["js-objects"], xp: 120, minutes: 30 },
    ModuleSpec { id: "react-intro", title: "Components and JSX", prerequisites: &["js-modules"], xp: 150, minutes: 40 },
    ModuleSpec { id: "react-props-state", title: "Props and state", prerequisites: &["react-intro"], xp: 180, minutes: 45 },
    ModuleSpec { id: "react-hooks", title: "Hooks", prerequisites: &["react-props-state"], xp: 220, minutes: 60 },
    ModuleSpec { id: "react-context", title: "Context and shared state", prerequisites: &["react-hooks"], xp: 200, minutes: 45 },
    ModuleSpec { id: "next-intro", title: "Pages and the app router", prerequisites: &["react-hooks"], xp: 180, minutes: 40 },
    ModuleSpec { id: "next-routing", title: "Dynamic routes and layouts", prerequisites: &["next-intro"], xp: 200, minutes: 45 },
    ModuleSpec { id: "next-data-fetching", title: "Data fetching and caching", prerequisites: &["next-routing", "js-async"], xp: 250, minutes: 60 },
    ModuleSpec { id: "next-server-components", title: "Server components and actions", prerequisites: &["next-data-fetching", "react-context"], xp: 300, minutes: 60 },
];

impl Curriculum {
    /// The built-in course catalog.
    ///
    /// # Errors
    ///
    /// Returns `Error` if a built-in module definition is inconsistent.
    pub fn builtin() -> Result<Self, Error> {
        let mut modules = Vec::with_capacity(MODULES.len());
        for entry in MODULES {
            let id = ModuleId::new(entry.id);
            let track = Track::of(&id).unwrap_or(Track::JavaScript);
            modules.push(ModuleDefinition::new(
                id,
                entry.title,
                track,
                entry.prerequisites.iter().copied().map(ModuleId::new).collect(),
                entry.xp,
                entry.minutes,
            )?);
        }
        Ok(Curriculum::new(modules)?)
    }
}

/// The built-in achievements, in display order.
#[must_use]
pub fn builtin_achievements() -> Vec<AchievementDefinition> {
    use AchievementRequirement::{
        ExperienceEarned, LevelReached, ModulesCompleted, StreakDays, TrackCompleted,
    };

    [
        ("first-steps", "First steps", "Complete your first module", ModulesCompleted(1), 25),
        ("getting-serious", "Getting serious", "Complete five modules", ModulesCompleted(5), 50),
        ("level-3", "Climbing", "Reach level 3", LevelReached(3), 50),
        ("level-5", "Seasoned", "Reach level 5", LevelReached(5), 100),
        ("xp-1000", "Thousand club", "Earn 1000 XP", ExperienceEarned(1_000), 0),
        ("streak-3", "On a roll", "Study three days in a row", StreakDays(3), 30),
        ("streak-7", "Habit formed", "Study seven days in a row", StreakDays(7), 75),
        ("js-graduate", "JavaScript graduate", "Finish the JavaScript track", TrackCompleted(Track::JavaScript), 100),
        ("react-graduate", "React graduate", "Finish the React track", TrackCompleted(Track::React), 100),
        ("next-graduate", "Next.js graduate", "Finish the Next.js track", TrackCompleted(Track::NextJs), 150),
    ]
    .into_iter()
    .map(|(id, title, description, requirement, xp)| {
        AchievementDefinition::new(AchievementId::new(id), title, description, requirement, xp)
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn builtin_catalog_is_consistent() {
        let curriculum = Curriculum::builtin().unwrap();
        assert_eq!(curriculum.len(), MODULES.len());
        for module in curriculum.modules() {
            assert_eq!(Track::of(module.id()), Some(module.track()));
        }
    }

    #[test]
    fn every_track_has_an_entry_point_chain() {
        let curriculum = Curriculum::builtin().unwrap();
        let roots: Vec<_> = curriculum
            .modules()
            .iter()
            .filter(|m| m.prerequisites().is_empty())
            .map(|m| m.id().as_str())
            .collect();
        assert_eq!(roots, vec!["js-basics"]);
        for track in Track::ALL {
            assert!(curriculum.by_track(track).count() > 0);
        }
    }

    #[test]
    fn achievement_ids_are_unique() {
        let achievements = builtin_achievements();
        let ids: HashSet<_> = achievements.iter().map(|a| a.id().clone()).collect();
        assert_eq!(ids.len(), achievements.len());
    }
}
