//! HTTP transfer engine and batch scheduling for media downloads.
//!
//! This module owns everything between a validated link and a finished file
//! on disk:
//!
//! - Streaming transfers (memory-efficient for multi-gigabyte files)
//! - A HEAD-based remote size probe that fails soft to "unknown"
//! - Wall-clock throttled progress notifications per task
//! - A semaphore-bounded batch scheduler with per-link failure isolation
//! - An opt-in, narrowly scoped HTTPS→HTTP fallback for a trusted LAN
//!   source with an expired certificate (disabled by default)
//!
//! # Example
//!
//! ```no_run
//! use mediafetch_core::download::{BatchScheduler, NullSink, SchedulerConfig};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let config = SchedulerConfig::new(PathBuf::from("/library"));
//! let scheduler = BatchScheduler::new(config, Arc::new(NullSink));
//! let result = scheduler
//!     .run(&["https://example.com/A.Movie.2020.mkv".to_string()])
//!     .await;
//! println!("{}", result.summary());
//! # }
//! ```

mod client;
mod error;
mod probe;
mod progress;
mod scheduler;
mod transfer;

pub use client::{CONNECT_TIMEOUT_SECS, HttpClient, InsecureFallback, READ_TIMEOUT_SECS};
pub use error::TransferError;
pub use probe::probe_size;
pub use progress::{NullSink, ProgressSample, ProgressSink, Throttle};
pub use scheduler::{
    BatchResult, BatchScheduler, DEFAULT_CONCURRENCY, DownloadRequest, SchedulerConfig,
    TaskOutcome,
};
pub use transfer::{DEFAULT_PROGRESS_INTERVAL, TransferOptions, transfer};
