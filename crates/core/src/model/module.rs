use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::ModuleId;
use crate::model::progress::ProgressRecord;

//
// ─── TRACK ─────────────────────────────────────────────────────────────────────
//

/// Curriculum track a module belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Track {
    #[serde(rename = "js")]
    JavaScript,
    #[serde(rename = "react")]
    React,
    #[serde(rename = "next")]
    NextJs,
}

impl Track {
    pub const ALL: [Track; 3] = [Track::JavaScript, Track::React, Track::NextJs];

    /// Identifier prefix used by modules of this track.
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Track::JavaScript => "js-",
            Track::React => "react-",
            Track::NextJs => "next-",
        }
    }

    /// Infers the track from a module id prefix.
    #[must_use]
    pub fn of(id: &ModuleId) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|track| id.as_str().starts_with(track.prefix()))
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Track::JavaScript => "JavaScript",
            Track::React => "React",
            Track::NextJs => "Next.js",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown track: {0} (expected js, react or next)")]
pub struct ParseTrackError(String);

impl FromStr for Track {
    type Err = ParseTrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "js" | "javascript" => Ok(Track::JavaScript),
            "react" => Ok(Track::React),
            "next" | "nextjs" | "next.js" | "next-js" => Ok(Track::NextJs),
            other => Err(ParseTrackError(other.to_owned())),
        }
    }
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModuleError {
    #[error("module title cannot be empty")]
    EmptyTitle,

    #[error("module {0} cannot list itself as a prerequisite")]
    SelfPrerequisite(ModuleId),

    #[error("module {module} lists prerequisite {prerequisite} more than once")]
    DuplicatePrerequisite {
        module: ModuleId,
        prerequisite: ModuleId,
    },
}

//
// ─── DEFINITION ────────────────────────────────────────────────────────────────
//

/// Static, read-only description of one lesson in the curriculum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDefinition {
    id: ModuleId,
    title: String,
    track: Track,
    prerequisites: Vec<ModuleId>,
    xp: u32,
    estimated_minutes: u32,
}

impl ModuleDefinition {
    /// Creates a module definition.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError` if the title is blank, or if the prerequisite
    /// list contains the module itself or repeats an entry.
    pub fn new(
        id: ModuleId,
        title: impl Into<String>,
        track: Track,
        prerequisites: Vec<ModuleId>,
        xp: u32,
        estimated_minutes: u32,
    ) -> Result<Self, ModuleError> {
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(ModuleError::EmptyTitle);
        }

        for (index, prerequisite) in prerequisites.iter().enumerate() {
            if *prerequisite == id {
                return Err(ModuleError::SelfPrerequisite(id));
            }
            if prerequisites[..index].contains(prerequisite) {
                return Err(ModuleError::DuplicatePrerequisite {
                    module: id,
                    prerequisite: prerequisite.clone(),
                });
            }
        }

        Ok(Self {
            id,
            title,
            track,
            prerequisites,
            xp,
            estimated_minutes,
        })
    }

    #[must_use]
    pub fn id(&self) -> &ModuleId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn track(&self) -> Track {
        self.track
    }

    #[must_use]
    pub fn prerequisites(&self) -> &[ModuleId] {
        &self.prerequisites
    }

    /// XP granted the first time the module is completed.
    #[must_use]
    pub fn xp(&self) -> u32 {
        self.xp
    }

    #[must_use]
    pub fn estimated_minutes(&self) -> u32 {
        self.estimated_minutes
    }
}

//
// ─── LOCKING ───────────────────────────────────────────────────────────────────
//

/// Returns `true` if any prerequisite of `module` is missing from the record.
///
/// Modules without prerequisites are never locked. Once a module unlocks it
/// stays unlocked, since completed modules are never removed.
#[must_use]
pub fn is_module_locked(module: &ModuleDefinition, record: &ProgressRecord) -> bool {
    module
        .prerequisites()
        .iter()
        .any(|prerequisite| !record.is_completed(prerequisite))
}

/// Prerequisites of `module` that the record has not completed yet, in
/// declaration order.
#[must_use]
pub fn missing_prerequisites<'a>(
    module: &'a ModuleDefinition,
    record: &ProgressRecord,
) -> Vec<&'a ModuleId> {
    module
        .prerequisites()
        .iter()
        .filter(|prerequisite| !record.is_completed(prerequisite))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(id: &str, prerequisites: &[&str]) -> ModuleDefinition {
        ModuleDefinition::new(
            ModuleId::new(id),
            format!("Module {id}"),
            Track::of(&ModuleId::new(id)).unwrap_or(Track::JavaScript),
            prerequisites.iter().map(|p| ModuleId::new(*p)).collect(),
            100,
            30,
        )
        .unwrap()
    }

    fn record_with(completed: &[&str]) -> ProgressRecord {
        let mut record = ProgressRecord::default();
        for id in completed {
            record.complete_module(ModuleId::new(*id));
        }
        record
    }

    #[test]
    fn hooks_locked_without_props_state() {
        let hooks = module("react-hooks", &["react-props-state"]);
        assert!(is_module_locked(&hooks, &ProgressRecord::default()));
    }

    #[test]
    fn hooks_unlocked_after_props_state() {
        let hooks = module("react-hooks", &["react-props-state"]);
        let record = record_with(&["react-props-state"]);
        assert!(!is_module_locked(&hooks, &record));
    }

    #[test]
    fn no_prerequisites_means_unlocked() {
        let basics = module("js-basics", &[]);
        assert!(!is_module_locked(&basics, &ProgressRecord::default()));
    }

    #[test]
    fn unlock_survives_more_completions() {
        let routing = module("next-routing", &["next-intro", "react-hooks"]);
        let mut record = record_with(&["react-hooks"]);
        assert!(is_module_locked(&routing, &record));
        assert_eq!(missing_prerequisites(&routing, &record), vec![&ModuleId::new("next-intro")]);

        record.complete_module(ModuleId::new("next-intro"));
        assert!(!is_module_locked(&routing, &record));

        for extra in ["js-basics", "js-async", "next-data-fetching", "unknown"] {
            record.complete_module(ModuleId::new(extra));
            assert!(!is_module_locked(&routing, &record));
        }
    }

    #[test]
    fn rejects_bad_prerequisite_lists() {
        let err = ModuleDefinition::new(
            ModuleId::new("js-basics"),
            "Basics",
            Track::JavaScript,
            vec![ModuleId::new("js-basics")],
            10,
            10,
        )
        .unwrap_err();
        assert_eq!(err, ModuleError::SelfPrerequisite(ModuleId::new("js-basics")));

        let err = ModuleDefinition::new(
            ModuleId::new("js-async"),
            "Async",
            Track::JavaScript,
            vec![ModuleId::new("js-basics"), ModuleId::new("js-basics")],
            10,
            10,
        )
        .unwrap_err();
        assert!(matches!(err, ModuleError::DuplicatePrerequisite { .. }));

        let err = ModuleDefinition::new(ModuleId::new("js-x"), "  ", Track::JavaScript, vec![], 1, 1)
            .unwrap_err();
        assert_eq!(err, ModuleError::EmptyTitle);
    }

    #[test]
    fn track_from_prefix_and_input() {
        assert_eq!(Track::of(&ModuleId::new("next-routing")), Some(Track::NextJs));
        assert_eq!(Track::of(&ModuleId::new("react-hooks")), Some(Track::React));
        assert_eq!(Track::of(&ModuleId::new("rust-basics")), None);
        assert_eq!("Next.js".parse::<Track>().unwrap(), Track::NextJs);
        assert_eq!("JS".parse::<Track>().unwrap(), Track::JavaScript);
        assert!("vue".parse::<Track>().is_err());
    }
}
