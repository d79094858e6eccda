mod cli;
mod render;

use anyhow::{Context, bail};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use curve_core::model::ModuleFilter;
use services::{AppServices, Clock, LearningError, Subscription};
use storage::repository::{Keyspace, Storage};

use cli::{Cli, Command, OutputFormat};
use render::{
    AchievementListReport, AchievementRow, CompletionReport, ModuleListReport, ModuleRow,
    ResetReport, RewardReport, StartReport, StatusReport, StreakReport, StudyReport, UnlockReport,
    emit,
};

fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:"
        || trimmed.starts_with("sqlite://")
        || trimmed.starts_with("sqlite:file:")
    {
        return trimmed.to_owned();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Creates the database file and its parent directories so a first run works
/// without any setup. In-memory URLs are left alone.
fn prepare_sqlite_file(db_url: &str) -> anyhow::Result<()> {
    let Some(path) = db_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid --db value: {db_url}");
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("creating {}", path.display()))?;
    }

    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn open_storage(db_url: &str) -> anyhow::Result<Storage> {
    prepare_sqlite_file(db_url)?;
    Ok(Storage::sqlite(db_url).await?)
}

/// Opens the configured database, falling back to memory when it cannot be
/// used. The flag is `false` in that case.
async fn open_services(db_url: &str, keyspace: Keyspace) -> anyhow::Result<(AppServices, bool)> {
    let (storage, on_disk) = match open_storage(db_url).await {
        Ok(storage) => (storage, true),
        Err(err) => {
            tracing::warn!(db = %db_url, error = %format!("{err:#}"), "database unavailable; progress will not be saved");
            (Storage::in_memory(), false)
        }
    };
    let services = AppServices::from_storage(&storage, Clock::default(), keyspace)
        .await
        .context("loading the built-in curriculum")?;
    Ok((services, on_disk))
}

fn announce_level_ups(app: &AppServices) -> Subscription {
    app.progress().subscribe(|event, record| {
        if event.leveled_up() {
            println!("Level up! You reached level {}.", record.level());
        }
    })
}

async fn execute(
    app: &AppServices,
    command: Command,
    format: OutputFormat,
    on_disk: bool,
) -> anyhow::Result<()> {
    match command {
        Command::Status => emit(
            format,
            &StatusReport {
                overview: app.overview(),
                durable: on_disk && app.is_durable(),
            },
        ),
        Command::Modules {
            track,
            status,
            search,
        } => {
            let filter = ModuleFilter {
                track,
                status: status.map(Into::into),
                search,
            };
            let modules = app
                .learning()
                .modules(&filter)
                .into_iter()
                .map(ModuleRow::from)
                .collect();
            emit(format, &ModuleListReport { modules })
        }
        Command::Start { module } => {
            app.learning().start_module(&module).await?;
            let title = app
                .curriculum()
                .get(&module)
                .map(|definition| definition.title().to_owned())
                .unwrap_or_default();
            emit(format, &StartReport { module, title })
        }
        Command::Complete { module } => {
            let outcome = app.learning().complete_module(&module).await?;
            emit(format, &CompletionReport::from(outcome))
        }
        Command::Xp { amount } => {
            let outcome = app.learning().award_experience(amount).await;
            emit(format, &RewardReport::from(outcome))
        }
        Command::Quiz { answer } => {
            let outcome = app.learning().record_quiz_answer(answer.correct).await;
            emit(format, &RewardReport::from(outcome))
        }
        Command::Unlock { achievement } => {
            let known = app
                .achievements()
                .definitions()
                .iter()
                .any(|definition| definition.id() == &achievement);
            if !known {
                bail!("unknown achievement: {achievement}");
            }
            let newly_unlocked = app.progress().unlock_achievement(&achievement).await;
            emit(
                format,
                &UnlockReport {
                    achievement,
                    newly_unlocked,
                },
            )
        }
        Command::Achievements => {
            let achievements = app
                .achievements()
                .statuses()
                .iter()
                .map(|(definition, unlocked)| AchievementRow::new(definition, *unlocked))
                .collect();
            emit(format, &AchievementListReport { achievements })
        }
        Command::Study { minutes, module } => {
            if let Some(id) = module.as_ref().filter(|id| app.curriculum().get(id).is_none()) {
                return Err(LearningError::UnknownModule(id.clone()).into());
            }
            let (session, unlocked) = app.record_study(minutes, module).await?;
            let streak = app.study_log().current_streak();
            emit(format, &StudyReport::new(&session, streak, &unlocked))
        }
        Command::Streak => {
            let log = app.study_log();
            emit(
                format,
                &StreakReport {
                    current: log.current_streak(),
                    longest: log.longest_streak(),
                    minutes_today: log.minutes_on(log.today()),
                    total_minutes: log.total_minutes(),
                },
            )
        }
        Command::Reset => {
            app.clear_storage()
                .await
                .context("clearing stored progress")?;
            emit(
                format,
                &ResetReport {
                    namespace: app.keyspace().namespace().to_owned(),
                },
            )
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let db_url = normalize_sqlite_url(&cli.db_url);
    let keyspace = Keyspace::new(cli.namespace.trim());
    if keyspace.namespace().is_empty() {
        bail!("--namespace cannot be blank");
    }

    let (app, on_disk) = open_services(&db_url, keyspace).await?;
    tracing::debug!(db = %db_url, namespace = %app.keyspace().namespace(), on_disk, "services ready");

    let _level_ups = (cli.format == OutputFormat::Text).then(|| announce_level_ups(&app));
    execute(&app, cli.command, cli.format, on_disk).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    if let Err(err) = run(cli).await {
        eprintln!("error: {err:#}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_explicit_urls() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/curve.sqlite3"),
            "sqlite:///tmp/curve.sqlite3"
        );
        assert_eq!(
            normalize_sqlite_url(" sqlite:file:memdb?mode=memory&cache=shared "),
            "sqlite:file:memdb?mode=memory&cache=shared"
        );
    }

    #[test]
    fn resolves_relative_paths_against_working_dir() {
        let cwd = std::env::current_dir().unwrap();
        let expected = format!("sqlite://{}", cwd.join("data/curve.sqlite3").display());
        assert_eq!(normalize_sqlite_url("data/curve.sqlite3"), expected);
        assert_eq!(normalize_sqlite_url("sqlite:data/curve.sqlite3"), expected);
        assert_eq!(
            normalize_sqlite_url("/var/lib/curve.sqlite3"),
            "sqlite:///var/lib/curve.sqlite3"
        );
    }

    #[test]
    fn prepare_skips_memory_urls_and_rejects_empty_paths() {
        assert!(prepare_sqlite_file("sqlite::memory:").is_ok());
        assert!(prepare_sqlite_file("sqlite://").is_err());
    }

    #[tokio::test]
    async fn falls_back_to_memory_when_database_cannot_open() {
        let (app, on_disk) = open_services("sqlite://", Keyspace::default())
            .await
            .unwrap();
        assert!(!on_disk);
        assert!(app.is_durable());
        execute(&app, Command::Xp { amount: 40 }, OutputFormat::Json, on_disk)
            .await
            .unwrap();
        assert_eq!(app.progress().experience(), 40);
    }

    #[tokio::test]
    async fn study_rejects_unknown_module() {
        let (app, _) = open_services("sqlite::memory:", Keyspace::default())
            .await
            .unwrap();
        let err = execute(
            &app,
            Command::Study {
                minutes: 10,
                module: Some(curve_core::model::ModuleId::new("rust-basics")),
            },
            OutputFormat::Json,
            true,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("rust-basics"));
        assert_eq!(app.study_log().total_minutes(), 0);
    }
}
