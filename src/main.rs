use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::Level;

use linker_settings::LoggingSettings;
use linker_store::Database;
use linker_tasks::{find_subtask, subtasks, LinkerOptions, TaskContext, TaskData};
use linker_telemetry::{init_telemetry, TelemetryConfig};

#[derive(Parser)]
#[command(name = "linker", about = "Link pull requests to the issues they reference")]
struct Cli {
    /// Settings file (default: ~/.linker/settings.json)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// SQLite domain database, overrides `database.path`
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the LinkPrToIssue sub-task for one project
    Link {
        #[arg(long)]
        project: Option<String>,
        /// Issue reference pattern (default: #\d+)
        #[arg(long)]
        regex: Option<String>,
        #[arg(long)]
        batch_size: Option<usize>,
        #[arg(long)]
        page_size: Option<usize>,
    },
    /// List registered sub-tasks as JSON
    Subtasks,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = match &cli.settings {
        Some(path) => linker_settings::load_settings_from_path(path),
        None => linker_settings::load_settings(),
    }
    .context("loading settings")?;
    let settings = loaded.settings;

    let _telemetry = init_telemetry(telemetry_config(&settings.logging)?);
    for rejected in &loaded.rejected {
        rejected.log();
    }

    match cli.command {
        Command::Subtasks => {
            let all: Vec<_> = subtasks().collect();
            println!("{}", serde_json::to_string_pretty(&all)?);
        }
        Command::Link {
            project,
            regex,
            batch_size,
            page_size,
        } => {
            let options = LinkerOptions {
                project_name: project
                    .or_else(|| settings.linker.project_name.clone())
                    .unwrap_or_default(),
                pr_to_issue_regexp: regex.or_else(|| settings.linker.pr_to_issue_regexp.clone()),
            };
            let data = TaskData::prepare(options)?;

            let db_path = cli
                .db
                .unwrap_or_else(|| PathBuf::from(&settings.database.path));
            let db = open_database(&db_path)?;

            let cancel = CancellationToken::new();
            watch_ctrl_c(cancel.clone());

            let ctx = TaskContext::new(db)
                .with_cancel(cancel)
                .with_batch_size(batch_size.unwrap_or(settings.linker.batch_size))
                .with_page_size(page_size.unwrap_or(settings.linker.page_size))
                .with_progress_interval(settings.linker.progress_interval);

            let meta = find_subtask("LinkPrToIssue").context("LinkPrToIssue is not registered")?;
            tracing::info!(subtask = meta.name, project = %data.options.project_name, "starting");

            let summary = tokio::task::spawn_blocking(move || meta.run(&ctx, &data))
                .await
                .context("sub-task panicked")??;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

fn open_database(path: &Path) -> anyhow::Result<Database> {
    Database::open(path).with_context(|| format!("opening database {}", path.display()))
}

/// Cancel `token` on the first Ctrl-C. The run stops before its next record.
fn watch_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling");
            token.cancel();
        }
    });
}

/// Settings validation already rejects unknown levels; this only converts.
fn telemetry_config(logging: &LoggingSettings) -> anyhow::Result<TelemetryConfig> {
    let log_level = parse_level(&logging.level).context("logging.level")?;
    let module_levels = logging
        .module_levels
        .iter()
        .map(|(module, level)| {
            let level = parse_level(level)
                .with_context(|| format!("logging.moduleLevels.{module}"))?;
            Ok((module.clone(), level))
        })
        .collect::<anyhow::Result<_>>()?;
    Ok(TelemetryConfig {
        log_level,
        module_levels,
        json: logging.json,
    })
}

fn parse_level(level: &str) -> anyhow::Result<Level> {
    Level::from_str(level.trim()).map_err(|_| anyhow::anyhow!("invalid log level {level:?}"))
}
