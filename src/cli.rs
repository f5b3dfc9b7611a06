//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Batch download and organize movies and TV episodes.
///
/// Mediafetch takes a list of direct download links, recognizes each file
/// as a movie or an episode from its name, and streams it into a
/// structured media library with live per-file progress.
#[derive(Parser, Debug)]
#[command(name = "mediafetch")]
#[command(author, version, about)]
pub struct Args {
    /// Download links (reads one link per line from stdin when omitted)
    pub links: Vec<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Root directory of the media library (default: current directory)
    #[arg(short = 'o', long)]
    pub library_root: Option<PathBuf>,

    /// Maximum concurrent downloads (1-20)
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u8).range(1..=20))]
    pub concurrency: Option<u8>,

    /// Seconds between progress updates per file (1-3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub progress_interval: Option<u64>,

    /// Connection establishment timeout in seconds (1-3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: Option<u64>,

    /// Stalled-read timeout during a transfer in seconds (1-3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub read_timeout: Option<u64>,

    /// Retry once over plain HTTP when an HTTPS certificate is rejected
    #[arg(long)]
    pub insecure_fallback: bool,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,
}
