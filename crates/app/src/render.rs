use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;

use curve_core::model::{AchievementDefinition, AchievementId, ModuleId, ModuleStatus, Track};
use services::{CompletionOutcome, ModuleView, ProgressOverview, RewardOutcome};

use crate::cli::OutputFormat;

/// Command result printable as text or JSON.
pub trait Report: Serialize {
    fn to_text(&self) -> String;
}

pub fn emit(format: OutputFormat, report: &impl Report) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => print!("{}", report.to_text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}

fn plural(n: u64, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
pub struct StatusReport {
    #[serde(flatten)]
    pub overview: ProgressOverview,
    pub durable: bool,
}

impl Report for StatusReport {
    fn to_text(&self) -> String {
        let o = &self.overview;
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Level {} · {} XP ({}/{} to level {}, {}%)",
            o.level,
            o.experience,
            o.xp_into_level,
            o.xp_into_level + o.xp_to_next_level,
            o.level.saturating_add(1),
            o.level_progress_percent
        );
        let _ = writeln!(
            out,
            "Modules: {}/{} ({}%)",
            o.modules_completed, o.modules_total, o.completion_percent
        );
        for track in &o.tracks {
            let _ = writeln!(
                out,
                "  {:<12} {}/{} ({}%)",
                track.track.label(),
                track.completed,
                track.total,
                track.percent
            );
        }
        match &o.current_module {
            Some(id) => {
                let _ = writeln!(out, "Current module: {id}");
            }
            None => out.push_str("Current module: none\n"),
        }
        let _ = writeln!(
            out,
            "Achievements: {}/{}",
            o.achievements_unlocked, o.achievements_total
        );
        let _ = writeln!(
            out,
            "Streak: {} (longest {}), {} studied",
            plural(o.current_streak.into(), "day", "days"),
            o.longest_streak,
            plural(o.total_minutes, "minute", "minutes")
        );
        if !self.durable {
            out.push_str("Storage unavailable: progress is kept in memory only.\n");
        }
        out
    }
}

//
// ─── MODULES ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
pub struct ModuleRow {
    pub id: ModuleId,
    pub title: String,
    pub track: Track,
    pub status: ModuleStatus,
    pub xp: u32,
    pub estimated_minutes: u32,
    pub missing_prerequisites: Vec<ModuleId>,
}

impl From<ModuleView> for ModuleRow {
    fn from(view: ModuleView) -> Self {
        let definition = view.definition;
        Self {
            id: definition.id().clone(),
            title: definition.title().to_owned(),
            track: definition.track(),
            status: view.status,
            xp: definition.xp(),
            estimated_minutes: definition.estimated_minutes(),
            missing_prerequisites: view.missing_prerequisites,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModuleListReport {
    pub modules: Vec<ModuleRow>,
}

fn status_marker(status: ModuleStatus) -> &'static str {
    match status {
        ModuleStatus::Completed => "[x]",
        ModuleStatus::InProgress => "[>]",
        ModuleStatus::Available => "[ ]",
        ModuleStatus::Locked => "[-]",
    }
}

impl Report for ModuleListReport {
    fn to_text(&self) -> String {
        if self.modules.is_empty() {
            return "No modules match.\n".to_owned();
        }
        let mut out = String::new();
        for row in &self.modules {
            let _ = write!(
                out,
                "{} {:<24} {} ({} XP, {} min)",
                status_marker(row.status),
                row.id,
                row.title,
                row.xp,
                row.estimated_minutes
            );
            if !row.missing_prerequisites.is_empty() {
                let missing: Vec<&str> =
                    row.missing_prerequisites.iter().map(ModuleId::as_str).collect();
                let _ = write!(out, " needs {}", missing.join(", "));
            }
            out.push('\n');
        }
        out
    }
}

//
// ─── REWARDS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
pub struct AchievementRow {
    pub id: AchievementId,
    pub title: String,
    pub description: String,
    pub xp_reward: u32,
    pub unlocked: bool,
}

impl AchievementRow {
    #[must_use]
    pub fn new(definition: &AchievementDefinition, unlocked: bool) -> Self {
        Self {
            id: definition.id().clone(),
            title: definition.title().to_owned(),
            description: definition.description().to_owned(),
            xp_reward: definition.xp_reward(),
            unlocked,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RewardReport {
    pub xp_awarded: u64,
    pub level: u32,
    pub leveled_up: bool,
    pub unlocked: Vec<AchievementRow>,
}

impl From<RewardOutcome> for RewardReport {
    fn from(outcome: RewardOutcome) -> Self {
        Self {
            xp_awarded: outcome.xp_awarded,
            level: outcome.level_after,
            leveled_up: outcome.leveled_up(),
            unlocked: unlocked_rows(&outcome.unlocked),
        }
    }
}

fn unlocked_rows(definitions: &[AchievementDefinition]) -> Vec<AchievementRow> {
    definitions
        .iter()
        .map(|definition| AchievementRow::new(definition, true))
        .collect()
}

fn write_unlocked(out: &mut String, unlocked: &[AchievementRow]) {
    for row in unlocked {
        let _ = writeln!(
            out,
            "Achievement unlocked: {} (+{} XP)",
            row.title, row.xp_reward
        );
    }
}

impl Report for RewardReport {
    fn to_text(&self) -> String {
        let mut out = format!("+{} XP, level {}\n", self.xp_awarded, self.level);
        write_unlocked(&mut out, &self.unlocked);
        out
    }
}

#[derive(Debug, Serialize)]
pub struct CompletionReport {
    pub module: ModuleId,
    pub newly_completed: bool,
    #[serde(flatten)]
    pub reward: RewardReport,
}

impl From<CompletionOutcome> for CompletionReport {
    fn from(outcome: CompletionOutcome) -> Self {
        Self {
            module: outcome.module,
            newly_completed: outcome.newly_completed,
            reward: outcome.reward.into(),
        }
    }
}

impl Report for CompletionReport {
    fn to_text(&self) -> String {
        if !self.newly_completed {
            return format!("{} was already completed.\n", self.module);
        }
        format!("Completed {}. {}", self.module, self.reward.to_text())
    }
}

#[derive(Debug, Serialize)]
pub struct StartReport {
    pub module: ModuleId,
    pub title: String,
}

impl Report for StartReport {
    fn to_text(&self) -> String {
        format!("Started {} ({}).\n", self.title, self.module)
    }
}

#[derive(Debug, Serialize)]
pub struct UnlockReport {
    pub achievement: AchievementId,
    pub newly_unlocked: bool,
}

impl Report for UnlockReport {
    fn to_text(&self) -> String {
        if self.newly_unlocked {
            format!("Unlocked {}.\n", self.achievement)
        } else {
            format!("{} was already unlocked.\n", self.achievement)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AchievementListReport {
    pub achievements: Vec<AchievementRow>,
}

impl Report for AchievementListReport {
    fn to_text(&self) -> String {
        let mut out = String::new();
        for row in &self.achievements {
            let marker = if row.unlocked { "[x]" } else { "[ ]" };
            let _ = writeln!(
                out,
                "{marker} {:<16} {}: {} (+{} XP)",
                row.id, row.title, row.description, row.xp_reward
            );
        }
        out
    }
}

//
// ─── STUDY LOG ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
pub struct StudyReport {
    pub started_at: DateTime<Utc>,
    pub minutes: u32,
    pub module: Option<ModuleId>,
    pub current_streak: u32,
    pub unlocked: Vec<AchievementRow>,
}

impl StudyReport {
    #[must_use]
    pub fn new(
        session: &curve_core::model::StudySession,
        current_streak: u32,
        unlocked: &[AchievementDefinition],
    ) -> Self {
        Self {
            started_at: session.started_at(),
            minutes: session.minutes(),
            module: session.module_id().cloned(),
            current_streak,
            unlocked: unlocked_rows(unlocked),
        }
    }
}

impl Report for StudyReport {
    fn to_text(&self) -> String {
        let mut out = format!(
            "Logged {}",
            plural(self.minutes.into(), "minute", "minutes")
        );
        if let Some(module) = &self.module {
            let _ = write!(out, " on {module}");
        }
        let _ = writeln!(
            out,
            ". Streak: {}.",
            plural(self.current_streak.into(), "day", "days")
        );
        write_unlocked(&mut out, &self.unlocked);
        out
    }
}

#[derive(Debug, Serialize)]
pub struct StreakReport {
    pub current: u32,
    pub longest: u32,
    pub minutes_today: u64,
    pub total_minutes: u64,
}

impl Report for StreakReport {
    fn to_text(&self) -> String {
        format!(
            "Current streak: {}\nLongest streak: {}\nToday: {}\nTotal: {}\n",
            plural(self.current.into(), "day", "days"),
            plural(self.longest.into(), "day", "days"),
            plural(self.minutes_today, "minute", "minutes"),
            plural(self.total_minutes, "minute", "minutes"),
        )
    }
}

#[derive(Debug, Serialize)]
pub struct ResetReport {
    pub namespace: String,
}

impl Report for ResetReport {
    fn to_text(&self) -> String {
        format!("Cleared stored progress for namespace {}.\n", self.namespace)
    }
}
