//! Batch admission and bounded-concurrency execution.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{error, info};
use url::Url;

use super::client::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::progress::ProgressSink;
use super::transfer::{DEFAULT_PROGRESS_INTERVAL, TransferOptions, transfer};
use super::{HttpClient, InsecureFallback, probe_size};
use crate::library::plan_request;
use crate::storage::{DecisionReason, human_size, prepare, reconcile};

/// Default number of transfers allowed in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 3;

/// One admitted download: a validated URL and where its file belongs.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    /// Source of the file.
    pub url: Url,
    /// Directory the file lands in.
    pub destination_dir: PathBuf,
    /// File name within the destination directory.
    pub file_name: String,
}

/// Terminal state of one task in a batch.
#[derive(Debug)]
pub enum TaskOutcome {
    /// The file was transferred and verified.
    Completed {
        /// Where the file was written.
        path: PathBuf,
        /// Bytes written.
        bytes: u64,
    },
    /// An identical file was already present; nothing was transferred.
    Skipped {
        /// User-facing explanation.
        message: String,
    },
    /// The task aborted. Sibling tasks are unaffected.
    Failed {
        /// User-facing explanation.
        message: String,
    },
}

/// Per-link outcomes for one batch, in submission order.
#[derive(Debug)]
pub struct BatchResult {
    outcomes: Vec<(String, TaskOutcome)>,
}

impl BatchResult {
    /// The `(link, outcome)` pairs in submission order.
    #[must_use]
    pub fn outcomes(&self) -> &[(String, TaskOutcome)] {
        &self.outcomes
    }

    /// Number of tasks that transferred a file.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, TaskOutcome::Completed { .. }))
    }

    /// Number of tasks skipped because the file was already present.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, TaskOutcome::Skipped { .. }))
    }

    /// Number of tasks that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, TaskOutcome::Failed { .. }))
    }

    /// One-line batch summary.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} completed, {} skipped, {} failed",
            self.completed(),
            self.skipped(),
            self.failed()
        )
    }

    fn count(&self, pred: impl Fn(&TaskOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// Settings shared by every task the scheduler runs.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Root of the media library tree.
    pub library_root: PathBuf,
    /// Maximum transfers in flight at once. Values below one are treated
    /// as one.
    pub concurrency: usize,
    /// Minimum time between progress notifications per task.
    pub progress_interval: Duration,
    /// Connection establishment budget.
    pub connect_timeout: Duration,
    /// Stalled-read budget during a transfer.
    pub read_timeout: Duration,
    /// Whether HTTPS certificate failures may retry over plain HTTP.
    pub fallback: InsecureFallback,
}

impl SchedulerConfig {
    /// Defaults for everything except the library root.
    #[must_use]
    pub fn new(library_root: PathBuf) -> Self {
        Self {
            library_root,
            concurrency: DEFAULT_CONCURRENCY,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(READ_TIMEOUT_SECS),
            fallback: InsecureFallback::default(),
        }
    }
}

/// Runs batches of download links under a shared concurrency limit.
///
/// Admission (URL parsing and destination planning) happens inline and in
/// order; transfers run on spawned tasks gated by a semaphore, so at most
/// `concurrency` files stream at once while the rest wait. One scheduler
/// can serve many batches; the limit spans all of them.
pub struct BatchScheduler {
    client: HttpClient,
    semaphore: Arc<Semaphore>,
    library_root: PathBuf,
    progress_interval: Duration,
    sink: Arc<dyn ProgressSink>,
}

impl BatchScheduler {
    /// Creates a scheduler from settings and a progress sink.
    #[must_use]
    pub fn new(config: SchedulerConfig, sink: Arc<dyn ProgressSink>) -> Self {
        let client = HttpClient::with_timeouts(
            config.fallback,
            config.connect_timeout,
            config.read_timeout,
        );
        Self {
            client,
            semaphore: Arc::new(Semaphore::new(config.concurrency.max(1))),
            library_root: config.library_root,
            progress_interval: config.progress_interval,
            sink,
        }
    }

    /// Runs every link in the batch to a terminal outcome.
    ///
    /// Never short-circuits: a malformed link, a full disk, or a failed
    /// transfer settles its own slot and the rest of the batch keeps going.
    pub async fn run(&self, links: &[String]) -> BatchResult {
        info!(count = links.len(), "starting batch");

        let mut slots: Vec<Option<TaskOutcome>> = Vec::with_capacity(links.len());
        let mut handles = Vec::new();

        for (task_id, link) in links.iter().enumerate() {
            slots.push(None);
            let request = match self.admit(link) {
                Ok(request) => request,
                Err(outcome) => {
                    if let TaskOutcome::Failed { message } = &outcome {
                        self.sink.status(task_id, message).await;
                    }
                    slots[task_id] = Some(outcome);
                    continue;
                }
            };

            let semaphore = Arc::clone(&self.semaphore);
            let client = self.client.clone();
            let sink = Arc::clone(&self.sink);
            let progress_interval = self.progress_interval;
            let handle = tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return TaskOutcome::Failed {
                            message: "scheduler shut down".to_string(),
                        };
                    }
                };
                run_one(&client, request, progress_interval, task_id, &sink).await
            });
            handles.push((task_id, handle));
        }

        for (task_id, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(task_id, error = %e, "task aborted unexpectedly");
                    TaskOutcome::Failed {
                        message: "internal error while downloading".to_string(),
                    }
                }
            };
            slots[task_id] = Some(outcome);
        }

        let outcomes = links
            .iter()
            .cloned()
            .zip(slots.into_iter().map(|slot| {
                slot.unwrap_or(TaskOutcome::Failed {
                    message: "task never ran".to_string(),
                })
            }))
            .collect();
        let result = BatchResult { outcomes };
        info!(summary = %result.summary(), "batch finished");
        result
    }

    /// Validates one link and plans its destination, without touching the
    /// network.
    fn admit(&self, link: &str) -> Result<DownloadRequest, TaskOutcome> {
        let url = Url::parse(link).map_err(|_| TaskOutcome::Failed {
            message: format!("Not a valid URL: {link}"),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(TaskOutcome::Failed {
                message: format!("Unsupported URL scheme: {}", url.scheme()),
            });
        }
        plan_request(&self.library_root, &url).ok_or_else(|| TaskOutcome::Failed {
            message: format!("Could not recognize a movie or episode name in: {link}"),
        })
    }
}

async fn run_one(
    client: &HttpClient,
    request: DownloadRequest,
    progress_interval: Duration,
    task_id: usize,
    sink: &Arc<dyn ProgressSink>,
) -> TaskOutcome {
    let remote_size = probe_size(client, &request.url).await;
    let announced = remote_size.map_or_else(|| "size unknown".to_string(), human_size);
    sink.status(
        task_id,
        &format!("Starting download: {} ({announced})", request.file_name),
    )
    .await;

    let candidate = request.destination_dir.join(&request.file_name);
    let decision = reconcile(&candidate, remote_size).await;
    sink.status(task_id, &decision.message(&request.file_name)).await;
    if !decision.proceed() {
        let message = decision.message(&request.file_name);
        return match decision.reason {
            DecisionReason::AlreadyComplete { .. } => TaskOutcome::Skipped { message },
            _ => TaskOutcome::Failed { message },
        };
    }

    if let Err(e) = prepare(&request.destination_dir, remote_size).await {
        let message = format!("Download failed: {e}");
        sink.status(task_id, &message).await;
        return TaskOutcome::Failed { message };
    }

    let options = TransferOptions {
        expected_size: remote_size,
        progress_interval,
    };
    match transfer(client, &request.url, &candidate, &options, task_id, sink.as_ref()).await {
        Ok(bytes) => {
            sink.status(
                task_id,
                &format!("Download complete: {} ({})", request.file_name, human_size(bytes)),
            )
            .await;
            TaskOutcome::Completed {
                path: candidate,
                bytes,
            }
        }
        Err(e) => {
            let message = format!("Download failed: {e}");
            sink.status(task_id, &message).await;
            TaskOutcome::Failed { message }
        }
    }
}
