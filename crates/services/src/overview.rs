use chrono::NaiveDate;
use serde::Serialize;

use curve_core::level::{level_progress_percent, xp_into_level, xp_to_next_level};
use curve_core::model::{
    AchievementDefinition, Curriculum, ModuleId, ProgressRecord, SessionLog, Track,
};

/// Completion of one curriculum track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackProgress {
    pub track: Track,
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
}

/// Dashboard snapshot of a learner's progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressOverview {
    pub level: u32,
    pub experience: u64,
    pub xp_into_level: u64,
    pub xp_to_next_level: u64,
    pub level_progress_percent: u8,
    pub modules_completed: usize,
    pub modules_total: usize,
    pub completion_percent: u8,
    pub tracks: Vec<TrackProgress>,
    pub current_module: Option<ModuleId>,
    pub achievements_unlocked: usize,
    pub achievements_total: usize,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_minutes: u64,
}

impl ProgressOverview {
    #[must_use]
    pub fn build(
        record: &ProgressRecord,
        curriculum: &Curriculum,
        sessions: &SessionLog,
        today: NaiveDate,
        achievements: &[AchievementDefinition],
    ) -> Self {
        let xp = record.experience();
        let tracks = Track::ALL
            .into_iter()
            .map(|track| TrackProgress {
                track,
                completed: curriculum.completed_count(record, Some(track)),
                total: curriculum.by_track(track).count(),
                percent: curriculum.completion_percent(record, Some(track)),
            })
            .collect();

        Self {
            level: record.level(),
            experience: xp,
            xp_into_level: xp_into_level(xp),
            xp_to_next_level: xp_to_next_level(xp),
            level_progress_percent: level_progress_percent(xp),
            modules_completed: curriculum.completed_count(record, None),
            modules_total: curriculum.len(),
            completion_percent: curriculum.completion_percent(record, None),
            tracks,
            current_module: record.current_module().cloned(),
            // Ids outside the catalog may sit in stored data; they don't count.
            achievements_unlocked: achievements
                .iter()
                .filter(|definition| record.has_achievement(definition.id()))
                .count(),
            achievements_total: achievements.len(),
            current_streak: sessions.current_streak(today),
            longest_streak: sessions.longest_streak(),
            total_minutes: sessions.total_minutes(),
        }
    }
}
