#![forbid(unsafe_code)]

pub mod achievement_service;
pub mod app_services;
pub mod error;
pub mod learning_service;
pub mod overview;
mod persist;
pub mod progress_store;
pub mod study_log_service;
#[cfg(test)]
mod test_support;

pub use curve_core::Clock;

pub use achievement_service::AchievementService;
pub use app_services::AppServices;
pub use error::{AppServicesError, LearningError};
pub use learning_service::{CompletionOutcome, LearningService, ModuleView, RewardOutcome};
pub use overview::{ProgressOverview, TrackProgress};
pub use progress_store::{ProgressEvent, ProgressListener, ProgressStore, Subscription};
pub use study_log_service::StudyLogService;
