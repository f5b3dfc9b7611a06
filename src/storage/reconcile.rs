//! Existence reconciliation: skip, overwrite, or block before transferring.
//!
//! Resubmitted links are common (a batch gets retried after a partial
//! failure, or the same link is pasted twice on different days). Comparing
//! the candidate file's size against the remote size decides whether the
//! transfer can be skipped entirely, must overwrite a stale partial, or is
//! blocked outright by a path conflict.

use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, warn};

use super::human_size;

/// Why a reconciliation decision came out the way it did.
///
/// Exactly one reason accompanies each decision; the variants are mutually
/// exclusive and carry the sizes needed for the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionReason {
    /// The candidate path exists and is a directory; the task is blocked.
    PathIsDirectory,
    /// A file of exactly the remote size already exists; skip the transfer.
    AlreadyComplete {
        /// Size of the local (and remote) file in bytes.
        size: u64,
    },
    /// A file exists but its size differs from the remote size; overwrite.
    SizeMismatchOverwrite {
        /// Local file size in bytes.
        local: u64,
        /// Remote size, when known.
        remote: Option<u64>,
    },
    /// Nothing exists yet and the containing directory had to be created.
    DirectoryCreated,
    /// Nothing exists yet and the containing directory is present.
    Fresh,
    /// An unexpected I/O error occurred while inspecting the path.
    UnknownError,
}

/// Outcome of comparing a candidate local file against the remote size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistenceDecision {
    /// The decision class.
    pub reason: DecisionReason,
}

impl ExistenceDecision {
    fn new(reason: DecisionReason) -> Self {
        Self { reason }
    }

    /// Whether the transfer should go ahead.
    #[must_use]
    pub fn proceed(&self) -> bool {
        matches!(
            self.reason,
            DecisionReason::SizeMismatchOverwrite { .. }
                | DecisionReason::DirectoryCreated
                | DecisionReason::Fresh
        )
    }

    /// Human-readable message for the requester, scoped to one link.
    #[must_use]
    pub fn message(&self, file_name: &str) -> String {
        match &self.reason {
            DecisionReason::PathIsDirectory => {
                format!("The destination path for {file_name} is a directory, not a file.")
            }
            DecisionReason::AlreadyComplete { size } => format!(
                "File already exists: {file_name} ({}). Skipping download.",
                human_size(*size)
            ),
            DecisionReason::SizeMismatchOverwrite { local, remote } => {
                let remote = remote.map_or_else(|| "unknown".to_string(), human_size);
                format!(
                    "File exists but size differs (local {}, remote {remote}). Overwriting.",
                    human_size(*local)
                )
            }
            DecisionReason::DirectoryCreated => {
                "Destination directory created. Proceeding with download.".to_string()
            }
            DecisionReason::Fresh => "Proceeding with download.".to_string(),
            DecisionReason::UnknownError => {
                format!("Could not check the destination for {file_name}.")
            }
        }
    }
}

/// Decides whether a transfer to `candidate` should run, be skipped, or is
/// blocked.
///
/// The decision is a pure function of four facts: whether the path exists,
/// whether it is a directory, the local size, and the remote size. An
/// unknown remote size never compares equal to anything — it can never by
/// itself justify skipping a download. When the candidate and its containing
/// directory are both absent, the directory is created as a side effect so
/// the later precondition step cannot race against a missing parent.
pub async fn reconcile(candidate: &Path, remote_size: Option<u64>) -> ExistenceDecision {
    match tokio::fs::metadata(candidate).await {
        Ok(meta) if meta.is_dir() => {
            warn!(path = %candidate.display(), "candidate path is a directory");
            ExistenceDecision::new(DecisionReason::PathIsDirectory)
        }
        Ok(meta) => {
            let local = meta.len();
            if remote_size == Some(local) {
                debug!(path = %candidate.display(), size = local, "file already complete");
                ExistenceDecision::new(DecisionReason::AlreadyComplete { size: local })
            } else {
                debug!(
                    path = %candidate.display(),
                    local,
                    remote = ?remote_size,
                    "file exists with differing size"
                );
                ExistenceDecision::new(DecisionReason::SizeMismatchOverwrite {
                    local,
                    remote: remote_size,
                })
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let Some(parent) = candidate.parent() else {
                return ExistenceDecision::new(DecisionReason::Fresh);
            };
            match tokio::fs::metadata(parent).await {
                Ok(_) => ExistenceDecision::new(DecisionReason::Fresh),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    if let Err(e) = tokio::fs::create_dir_all(parent).await {
                        warn!(
                            path = %parent.display(),
                            error = %e,
                            "failed to create containing directory"
                        );
                        return ExistenceDecision::new(DecisionReason::UnknownError);
                    }
                    debug!(path = %parent.display(), "created containing directory");
                    ExistenceDecision::new(DecisionReason::DirectoryCreated)
                }
                Err(e) => {
                    warn!(path = %parent.display(), error = %e, "failed to stat containing directory");
                    ExistenceDecision::new(DecisionReason::UnknownError)
                }
            }
        }
        Err(e) => {
            warn!(path = %candidate.display(), error = %e, "failed to stat candidate path");
            ExistenceDecision::new(DecisionReason::UnknownError)
        }
    }
}
