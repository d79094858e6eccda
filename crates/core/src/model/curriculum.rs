use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::ModuleId;
use crate::model::module::{ModuleDefinition, Track, is_module_locked};
use crate::model::progress::ProgressRecord;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CurriculumError {
    #[error("module {0} is defined more than once")]
    DuplicateModule(ModuleId),

    #[error("module {module} requires unknown module {prerequisite}")]
    UnknownPrerequisite {
        module: ModuleId,
        prerequisite: ModuleId,
    },
}

/// How a module appears to the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleStatus {
    Completed,
    InProgress,
    Available,
    Locked,
}

impl ModuleStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ModuleStatus::Completed => "completed",
            ModuleStatus::InProgress => "in progress",
            ModuleStatus::Available => "available",
            ModuleStatus::Locked => "locked",
        }
    }
}

/// Criteria for narrowing the module list. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleFilter {
    pub track: Option<Track>,
    pub status: Option<ModuleStatus>,
    pub search: Option<String>,
}

impl ModuleFilter {
    fn matches_text(&self, module: &ModuleDefinition) -> bool {
        let Some(needle) = self.search.as_deref().map(str::trim) else {
            return true;
        };
        if needle.is_empty() {
            return true;
        }
        let needle = needle.to_lowercase();
        module.id().as_str().to_lowercase().contains(&needle)
            || module.title().to_lowercase().contains(&needle)
    }
}

/// Validated, read-only module catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Curriculum {
    modules: Vec<ModuleDefinition>,
    index: HashMap<ModuleId, usize>,
}

impl Curriculum {
    /// Builds a catalog, preserving the given order.
    ///
    /// # Errors
    ///
    /// Returns `CurriculumError` if an id repeats or a prerequisite names a
    /// module outside the catalog.
    pub fn new(modules: Vec<ModuleDefinition>) -> Result<Self, CurriculumError> {
        let mut index = HashMap::with_capacity(modules.len());
        for (position, module) in modules.iter().enumerate() {
            if index.insert(module.id().clone(), position).is_some() {
                return Err(CurriculumError::DuplicateModule(module.id().clone()));
            }
        }

        for module in &modules {
            if let Some(missing) = module
                .prerequisites()
                .iter()
                .find(|prerequisite| !index.contains_key(*prerequisite))
            {
                return Err(CurriculumError::UnknownPrerequisite {
                    module: module.id().clone(),
                    prerequisite: missing.clone(),
                });
            }
        }

        Ok(Self { modules, index })
    }

    #[must_use]
    pub fn modules(&self) -> &[ModuleDefinition] {
        &self.modules
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &ModuleId) -> Option<&ModuleDefinition> {
        self.index.get(id).map(|position| &self.modules[*position])
    }

    pub fn by_track(&self, track: Track) -> impl Iterator<Item = &ModuleDefinition> + '_ {
        self.modules
            .iter()
            .filter(move |module| module.track() == track)
    }

    /// Display status of `module` for `record`.
    ///
    /// Completion wins over locking. The active module only shows as in
    /// progress while it is unlocked.
    #[must_use]
    pub fn status(&self, module: &ModuleDefinition, record: &ProgressRecord) -> ModuleStatus {
        if record.is_completed(module.id()) {
            ModuleStatus::Completed
        } else if is_module_locked(module, record) {
            ModuleStatus::Locked
        } else if record.current_module() == Some(module.id()) {
            ModuleStatus::InProgress
        } else {
            ModuleStatus::Available
        }
    }

    /// Modules matching `filter`, in catalog order, paired with their status.
    #[must_use]
    pub fn filter<'a>(
        &'a self,
        filter: &ModuleFilter,
        record: &ProgressRecord,
    ) -> Vec<(&'a ModuleDefinition, ModuleStatus)> {
        self.modules
            .iter()
            .filter(|module| filter.track.is_none_or(|track| module.track() == track))
            .filter(|module| filter.matches_text(module))
            .map(|module| (module, self.status(module, record)))
            .filter(|(_, status)| filter.status.is_none_or(|wanted| *status == wanted))
            .collect()
    }

    /// Share of catalog modules (optionally within one track) that are
    /// completed, rounded down to a whole percent. Empty selections report 0.
    ///
    /// Completed ids outside the catalog do not count.
    #[must_use]
    pub fn completion_percent(&self, record: &ProgressRecord, track: Option<Track>) -> u8 {
        let (done, total) = self
            .modules
            .iter()
            .filter(|module| track.is_none_or(|track| module.track() == track))
            .fold((0_usize, 0_usize), |(done, total), module| {
                let done = done + usize::from(record.is_completed(module.id()));
                (done, total + 1)
            });

        if total == 0 {
            return 0;
        }
        u8::try_from(done * 100 / total).unwrap_or(100)
    }

    /// Number of catalog modules the record has completed.
    #[must_use]
    pub fn completed_count(&self, record: &ProgressRecord, track: Option<Track>) -> usize {
        self.modules
            .iter()
            .filter(|module| track.is_none_or(|track| module.track() == track))
            .filter(|module| record.is_completed(module.id()))
            .count()
    }

    /// Sum of module XP rewards, optionally within one track.
    #[must_use]
    pub fn total_xp(&self, track: Option<Track>) -> u64 {
        self.modules
            .iter()
            .filter(|module| track.is_none_or(|track| module.track() == track))
            .map(|module| u64::from(module.xp()))
            .sum()
    }

    /// Whether every module of `track` is completed. Empty tracks never count
    /// as completed.
    #[must_use]
    pub fn is_track_completed(&self, record: &ProgressRecord, track: Track) -> bool {
        let mut modules = self.by_track(track).peekable();
        modules.peek().is_some() && modules.all(|module| record.is_completed(module.id()))
    }
}
