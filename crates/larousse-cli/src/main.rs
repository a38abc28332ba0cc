use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use larousse_acquire::config::{DEFAULT_ROOT_DIR, SITE_ORIGIN};
use larousse_acquire::{events, ChromiumRenderer, EntryWorker, Reporter, RunHandle, SnapshotConfig};
use larousse_model::{Direction, EntryRequest, RunReport, SnapshotError};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "larousse")]
#[command(about = "Save Larousse dictionary entries as self-contained offline pages")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_HASH"), ")"))]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "info", value_enum)]
    log_level: LogLevel,

    /// Use UTC timestamps instead of local time
    #[arg(long, global = true)]
    utc: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Subcommand)]
enum Commands {
    /// Snapshot a single entry
    Snapshot {
        /// Headword (e.g., "chat") or full entry URL
        input: String,

        #[command(flatten)]
        run: RunArgs,

        /// Print the run report as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Read one headword or URL per line and snapshot each in the background
    Interactive {
        #[command(flatten)]
        run: RunArgs,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Dictionary to look words up in
    #[arg(short, long, value_enum, default_value = "francais-anglais")]
    direction: DirectionArg,

    /// Directory receiving one folder per entry
    #[arg(short = 'O', long, env = "LAROUSSE_ROOT", default_value = DEFAULT_ROOT_DIR)]
    root: PathBuf,

    /// Site origin for entry URLs and relative assets
    #[arg(long, default_value = SITE_ORIGIN)]
    origin: String,

    /// Chrome/Chromium executable (auto-detected when omitted)
    #[arg(long, env = "CHROME_PATH")]
    chrome: Option<PathBuf>,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum DirectionArg {
    /// French → English
    FrancaisAnglais,
    /// English → French
    AnglaisFrancais,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::FrancaisAnglais => Direction::FrancaisAnglais,
            DirectionArg::AnglaisFrancais => Direction::AnglaisFrancais,
        }
    }
}

impl RunArgs {
    fn config(&self) -> SnapshotConfig {
        let mut config = SnapshotConfig::default()
            .with_root(&self.root)
            .with_origin(&self.origin);
        config.chrome_path = self.chrome.clone();
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Map log level, suppressing noisy HTML-parsing and browser crates
    let level = match cli.log_level {
        LogLevel::Error => "error",
        LogLevel::Warn  => "warn",
        LogLevel::Info  => "info,chromiumoxide=warn",
        LogLevel::Debug => "debug,selectors=warn,html5ever=warn,chromiumoxide=info",
        LogLevel::Trace => "trace,selectors=warn,html5ever=warn",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Timestamp format: 2026-02-14 19:44:09.123 -08:00
    let time_format = "%Y-%m-%d %H:%M:%S%.3f %:z";

    if cli.utc {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoUtc::new(time_format.to_string()))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(time_format.to_string()))
            .init();
    }

    match cli.command {
        Commands::Snapshot { input, run, json } => {
            let config = run.config();
            let renderer = ChromiumRenderer::new(&config);
            let request = EntryRequest::new(input.trim(), run.direction.into());
            tracing::debug!(input = %request.input, direction = %request.direction, root = %config.root_dir.display(), "Starting snapshot");

            let report = larousse_acquire::run_entry(&request, &config, &renderer, &Reporter::tracing()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
        Commands::Interactive { run } => {
            let config = run.config();
            let renderer = Arc::new(ChromiumRenderer::new(&config));
            let worker = EntryWorker::new(config, renderer);
            interactive(&worker, run.direction.into()).await?;
        }
    }

    Ok(())
}

/// Line-oriented front end: each non-empty line starts a run unless one is
/// already in progress.
async fn interactive(worker: &EntryWorker, direction: Direction) -> Result<()> {
    tracing::info!(direction = %direction, "Enter a headword or entry URL per line (Ctrl-D to quit)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut current = None;

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match worker.submit(EntryRequest::new(input, direction)) {
            Ok(handle) => current = Some(tokio::spawn(watch(handle))),
            Err(SnapshotError::Busy) => {
                tracing::warn!(input = %input, "A snapshot is still running; try again when it finishes");
            }
            Err(e) => tracing::error!("{e}"),
        }
    }

    // Let an in-flight run finish before exiting.
    if let Some(task) = current {
        if let Err(e) = task.await {
            tracing::error!("Snapshot watcher failed: {e}");
        }
    }

    Ok(())
}

/// Print a run's progress lines as they arrive, then its outcome.
async fn watch(mut handle: RunHandle) {
    while let Some(event) = handle.events.recv().await {
        events::log_event(&event);
    }

    match handle.finish().await {
        Ok(report) => log_report(&report),
        Err(e) => tracing::error!("{e}"),
    }
}

fn log_report(report: &RunReport) {
    tracing::info!(
        entry = %report.target.display_name,
        path = %report.html_file.display(),
        css = report.css.localized,
        js = report.js.localized,
        audio = report.audio.localized,
        failed = report.css.failed + report.js.failed + report.audio.failed,
        "Snapshot complete"
    );
}
