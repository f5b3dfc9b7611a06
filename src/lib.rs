//! Mediafetch Core Library
//!
//! This library provides the core functionality for the mediafetch tool,
//! which takes a batch of download links, classifies each as a movie or a
//! TV episode from its filename, and fetches the file into a structured
//! local media library, reporting live progress per link.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`classify`] - Filename heuristics for movie/episode detection
//! - [`library`] - Destination path layout (`Movies/` and `Shows/` trees)
//! - [`storage`] - Pre-flight directory/space checks and existence reconciliation
//! - [`download`] - HTTP transfer engine and the bounded batch scheduler
//! - [`config`] - Optional file configuration with CLI overrides

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod classify;
pub mod config;
pub mod download;
pub mod library;
pub mod storage;
#[cfg(test)]
pub mod test_support;

// Re-export commonly used types
pub use classify::{MediaClass, classify};
pub use config::FileConfig;
pub use download::{
    BatchResult, BatchScheduler, DEFAULT_CONCURRENCY, DEFAULT_PROGRESS_INTERVAL, DownloadRequest,
    HttpClient, InsecureFallback, NullSink, ProgressSample, ProgressSink, SchedulerConfig,
    TaskOutcome, TransferError, TransferOptions, probe_size, transfer,
};
pub use library::{destination_dir, filename_from_url, plan_request};
pub use storage::{DecisionReason, ExistenceDecision, StorageError, prepare, reconcile};
