//! CLI entry point for the mediafetch tool.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;
use mediafetch_core::config::load_default_file_config;
use mediafetch_core::{
    BatchScheduler, FileConfig, InsecureFallback, NullSink, ProgressSink, SchedulerConfig,
    TaskOutcome,
};
use tracing::{debug, info, warn};

mod cli;
mod view;

use cli::Args;
use view::ConsoleSink;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (warn)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let loaded = load_default_file_config()?;
    if loaded.config.is_some() {
        debug!(path = ?loaded.path, "loaded config file");
    }
    let file_config = loaded.config.unwrap_or_default();

    // Read links: from positional args or stdin
    let links = if args.links.is_empty() {
        if io::stdin().is_terminal() {
            info!("No input provided. Pipe links via stdin or pass as arguments.");
            info!("Example: mediafetch 'https://example.com/A.Movie.2020.mkv'");
            return Ok(());
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToString::to_string)
            .collect()
    } else {
        args.links.clone()
    };

    if links.is_empty() {
        info!("No links found in input");
        return Ok(());
    }

    let config = scheduler_config(&args, &file_config);
    info!(
        count = links.len(),
        concurrency = config.concurrency,
        root = %config.library_root.display(),
        "starting downloads"
    );

    let sink: Arc<dyn ProgressSink> = if args.no_progress || args.quiet {
        Arc::new(NullSink)
    } else {
        Arc::new(ConsoleSink::new())
    };
    let scheduler = BatchScheduler::new(config, sink);
    let result = scheduler.run(&links).await;

    for (link, outcome) in result.outcomes() {
        match outcome {
            TaskOutcome::Completed { path, .. } => {
                println!("ok       {link} -> {}", path.display());
            }
            TaskOutcome::Skipped { message } => {
                println!("skipped  {link}: {message}");
            }
            TaskOutcome::Failed { message } => {
                warn!(link = %link, "download failed");
                println!("failed   {link}: {message}");
            }
        }
    }
    println!("{}", result.summary());

    if result.failed() > 0 {
        bail!("{} of {} downloads failed", result.failed(), links.len());
    }
    Ok(())
}

/// Merges CLI flags over file config over built-in defaults.
fn scheduler_config(args: &Args, file: &FileConfig) -> SchedulerConfig {
    let library_root = args
        .library_root
        .clone()
        .or_else(|| file.library_root.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let mut config = SchedulerConfig::new(library_root);

    if let Some(concurrency) = args.concurrency.or(file.concurrency) {
        config.concurrency = usize::from(concurrency);
    }
    if let Some(secs) = args.progress_interval.or(file.progress_interval_secs) {
        config.progress_interval = Duration::from_secs(secs);
    }
    if let Some(secs) = args.connect_timeout.or(file.connect_timeout_secs) {
        config.connect_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = args.read_timeout.or(file.read_timeout_secs) {
        config.read_timeout = Duration::from_secs(secs);
    }
    if args.insecure_fallback || file.insecure_fallback == Some(true) {
        config.fallback = InsecureFallback::Enabled;
    }
    config
}
