//! Streaming transfer of one file to disk.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Response;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument, warn};
use url::Url;

use super::client::classify_request_error;
use super::progress::{ProgressSample, ProgressSink, Throttle};
use super::{HttpClient, TransferError};

/// Default interval between progress notifications.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(3);

/// Knobs for a single transfer.
#[derive(Debug, Clone)]
pub struct TransferOptions {
    /// Size the server advertised, when the probe succeeded.
    pub expected_size: Option<u64>,
    /// Minimum time between progress notifications.
    pub progress_interval: Duration,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            expected_size: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// Streams `url` to `destination`, reporting throttled progress to `sink`.
///
/// Bytes are written through a buffered writer as they arrive; the whole
/// body is never held in memory. A final 100% progress update is always
/// delivered when the stream ends cleanly, even if the throttle window has
/// not elapsed. Returns the number of bytes written.
///
/// On any mid-stream failure the partially written file is removed so a
/// later run sees a clean slate. Removal is best-effort; a leftover partial
/// is caught by the size comparison on the next attempt.
///
/// # Errors
///
/// Returns [`TransferError::Network`], [`TransferError::Timeout`], or
/// [`TransferError::HttpStatus`] for request failures,
/// [`TransferError::Io`] when the file cannot be written, and
/// [`TransferError::Incomplete`] when the stream ends cleanly short of the
/// advertised size.
#[instrument(skip_all, fields(url = %url, path = %destination.display()))]
pub async fn transfer(
    client: &HttpClient,
    url: &Url,
    destination: &Path,
    options: &TransferOptions,
    task_id: usize,
    sink: &dyn ProgressSink,
) -> Result<u64, TransferError> {
    let response = client.get(url).await?;

    let written = match stream_to_file(response, url, destination, options, task_id, sink).await {
        Ok(written) => written,
        Err(e) => {
            discard_partial(destination).await;
            return Err(e);
        }
    };

    // The final update always reports completion; the size check below
    // still decides whether the transfer actually succeeded.
    let final_sample = ProgressSample {
        percent: Some(100),
        bytes: written,
    };
    sink.progress(task_id, &display_name(destination), final_sample)
        .await;

    if let Some(expected) = options.expected_size
        && written != expected
    {
        warn!(expected, written, "transfer ended short of advertised size");
        return Err(TransferError::incomplete(destination, expected, written));
    }

    debug!(bytes = written, "transfer complete");
    Ok(written)
}

async fn stream_to_file(
    response: Response,
    url: &Url,
    destination: &Path,
    options: &TransferOptions,
    task_id: usize,
    sink: &dyn ProgressSink,
) -> Result<u64, TransferError> {
    let file = File::create(destination)
        .await
        .map_err(|e| TransferError::io(destination, e))?;
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut throttle = Throttle::new(options.progress_interval);
    let mut written: u64 = 0;
    let name = display_name(destination);

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| classify_request_error(url, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| TransferError::io(destination, e))?;
        written += chunk.len() as u64;

        if throttle.ready() {
            sink.progress(
                task_id,
                &name,
                ProgressSample::new(written, options.expected_size),
            )
            .await;
        }
    }

    writer
        .flush()
        .await
        .map_err(|e| TransferError::io(destination, e))?;
    Ok(written)
}

async fn discard_partial(destination: &Path) {
    if let Err(e) = tokio::fs::remove_file(destination).await {
        warn!(
            path = %destination.display(),
            error = %e,
            "could not remove partial file"
        );
    } else {
        debug!(path = %destination.display(), "removed partial file");
    }
}

fn display_name(destination: &Path) -> String {
    destination
        .file_name()
        .map_or_else(|| destination.display().to_string(), |n| n.to_string_lossy().into_owned())
}
