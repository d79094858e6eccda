use clap::{Args, Parser, Subcommand, ValueEnum};
use curve_core::model::{AchievementId, ModuleId, ModuleStatus, Track};
use storage::repository::Keyspace;

pub const DEFAULT_DB_URL: &str = "sqlite://learning-curve.sqlite3";

/// Track progress through the Learning Curve curriculum.
#[derive(Debug, Parser)]
#[command(name = "curve", version, about)]
pub struct Cli {
    /// `SQLite` database URL or file path
    #[arg(long = "db", env = "CURVE_DB_URL", default_value = DEFAULT_DB_URL, global = true)]
    pub db_url: String,

    /// Storage namespace; separate namespaces keep separate learners apart
    #[arg(long, env = "CURVE_NAMESPACE", default_value = Keyspace::DEFAULT_NAMESPACE, global = true)]
    pub namespace: String,

    /// Log filter used when `RUST_LOG` is not set
    #[arg(long, env = "CURVE_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Level, XP, completion and streak summary
    Status,
    /// List curriculum modules
    Modules {
        #[arg(long)]
        track: Option<Track>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        /// Case-insensitive match on id or title
        #[arg(long)]
        search: Option<String>,
    },
    /// Open a module; refused while prerequisites are missing
    Start { module: ModuleId },
    /// Mark a module complete and collect its XP
    Complete { module: ModuleId },
    /// Grant bonus XP
    Xp { amount: u64 },
    /// Record a quiz answer
    Quiz {
        #[command(flatten)]
        answer: QuizAnswer,
    },
    /// Unlock an achievement by id (no XP reward)
    Unlock { achievement: AchievementId },
    /// List achievements and whether they are unlocked
    Achievements,
    /// Log a study session that started now
    Study {
        #[arg(long)]
        minutes: u32,
        #[arg(long)]
        module: Option<ModuleId>,
    },
    /// Current and longest study streak
    Streak,
    /// Delete all stored progress for the namespace
    Reset,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct QuizAnswer {
    #[arg(long)]
    pub correct: bool,
    #[arg(long)]
    pub wrong: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Completed,
    InProgress,
    Available,
    Locked,
}

impl From<StatusArg> for ModuleStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Completed => ModuleStatus::Completed,
            StatusArg::InProgress => ModuleStatus::InProgress,
            StatusArg::Available => ModuleStatus::Available,
            StatusArg::Locked => ModuleStatus::Locked,
        }
    }
}
