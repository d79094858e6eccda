use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::model::ids::ModuleId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StudySessionError {
    #[error("study session must last at least one minute")]
    ZeroMinutes,
}

/// One recorded study sitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudySession {
    started_at: DateTime<Utc>,
    minutes: u32,
    module_id: Option<ModuleId>,
}

impl StudySession {
    /// Creates a study session.
    ///
    /// # Errors
    ///
    /// Returns `StudySessionError::ZeroMinutes` if `minutes` is zero.
    pub fn new(
        started_at: DateTime<Utc>,
        minutes: u32,
        module_id: Option<ModuleId>,
    ) -> Result<Self, StudySessionError> {
        if minutes == 0 {
            return Err(StudySessionError::ZeroMinutes);
        }
        Ok(Self {
            started_at,
            minutes,
            module_id,
        })
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    #[must_use]
    pub fn module_id(&self) -> Option<&ModuleId> {
        self.module_id.as_ref()
    }

    /// Calendar day (UTC) the session counts towards.
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.started_at.date_naive()
    }
}

/// Append-only log of study sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionLog {
    sessions: Vec<StudySession>,
}

impl SessionLog {
    #[must_use]
    pub fn new(sessions: Vec<StudySession>) -> Self {
        Self { sessions }
    }

    #[must_use]
    pub fn sessions(&self) -> &[StudySession] {
        &self.sessions
    }

    pub fn push(&mut self, session: StudySession) {
        self.sessions.push(session);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Distinct days with at least one session.
    #[must_use]
    pub fn study_days(&self) -> BTreeSet<NaiveDate> {
        self.sessions.iter().map(StudySession::day).collect()
    }

    #[must_use]
    pub fn minutes_on(&self, day: NaiveDate) -> u64 {
        self.sessions
            .iter()
            .filter(|session| session.day() == day)
            .map(|session| u64::from(session.minutes))
            .sum()
    }

    #[must_use]
    pub fn total_minutes(&self) -> u64 {
        self.sessions
            .iter()
            .map(|session| u64::from(session.minutes))
            .sum()
    }

    #[must_use]
    pub fn current_streak(&self, today: NaiveDate) -> u32 {
        current_streak(&self.study_days(), today)
    }

    #[must_use]
    pub fn longest_streak(&self) -> u32 {
        longest_streak(&self.study_days())
    }
}

/// Consecutive study days ending today.
///
/// A day without study yet does not break the streak until it is over: when
/// nothing is logged today, the run ending yesterday is counted.
#[must_use]
pub fn current_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut cursor = if days.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) if days.contains(&yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut streak = 0_u32;
    while days.contains(&cursor) {
        streak = streak.saturating_add(1);
        match cursor.pred_opt() {
            Some(previous) => cursor = previous,
            None => break,
        }
    }
    streak
}

/// Longest run of consecutive study days anywhere in the set.
#[must_use]
pub fn longest_streak(days: &BTreeSet<NaiveDate>) -> u32 {
    let mut longest = 0_u32;
    let mut run = 0_u32;
    let mut previous: Option<NaiveDate> = None;

    for day in days {
        run = match previous.and_then(|d| d.succ_opt()) {
            Some(expected) if expected == *day => run.saturating_add(1),
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(*day);
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn day(offset: i64) -> NaiveDate {
        (fixed_now() + Duration::days(offset)).date_naive()
    }

    fn days(offsets: &[i64]) -> BTreeSet<NaiveDate> {
        offsets.iter().map(|o| day(*o)).collect()
    }

    #[test]
    fn empty_log_has_no_streak() {
        let log = SessionLog::default();
        assert_eq!(log.current_streak(day(0)), 0);
        assert_eq!(log.longest_streak(), 0);
    }

    #[test]
    fn streak_counts_back_from_today() {
        assert_eq!(current_streak(&days(&[-2, -1, 0]), day(0)), 3);
        assert_eq!(current_streak(&days(&[-5, -2, -1, 0]), day(0)), 3);
    }

    #[test]
    fn streak_survives_until_today_ends() {
        assert_eq!(current_streak(&days(&[-3, -2, -1]), day(0)), 3);
    }

    #[test]
    fn missed_day_resets_streak() {
        assert_eq!(current_streak(&days(&[-4, -3, -2]), day(0)), 0);
    }

    #[test]
    fn longest_streak_finds_best_run() {
        assert_eq!(longest_streak(&days(&[-10, -9, -8, -7, -3, -2, 0])), 4);
        assert_eq!(longest_streak(&days(&[0])), 1);
    }

    #[test]
    fn multiple_sessions_per_day_count_once() {
        let now = fixed_now();
        let mut log = SessionLog::default();
        log.push(StudySession::new(now, 20, None).unwrap());
        log.push(StudySession::new(now + Duration::minutes(30), 15, None).unwrap());
        log.push(
            StudySession::new(now - Duration::days(1), 10, Some(ModuleId::new("js-basics")))
                .unwrap(),
        );

        assert_eq!(log.current_streak(now.date_naive()), 2);
        assert_eq!(log.minutes_on(now.date_naive()), 35);
        assert_eq!(log.total_minutes(), 45);
        assert_eq!(log.study_days().len(), 2);
    }

    #[test]
    fn zero_minute_session_rejected() {
        assert_eq!(
            StudySession::new(fixed_now(), 0, None).unwrap_err(),
            StudySessionError::ZeroMinutes
        );
    }
}
