mod achievement;
mod curriculum;
mod ids;
mod module;
mod progress;
mod session;

pub use ids::{AchievementId, ModuleId, ParseIdError};

pub use achievement::{AchievementContext, AchievementDefinition, AchievementRequirement};
pub use curriculum::{Curriculum, CurriculumError, ModuleFilter, ModuleStatus};
pub use module::{
    ModuleDefinition, ModuleError, ParseTrackError, Track, is_module_locked,
    missing_prerequisites,
};
pub use progress::ProgressRecord;
pub use session::{SessionLog, StudySession, StudySessionError, current_streak, longest_streak};
