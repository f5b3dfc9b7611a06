//! Remote size probe via HTTP HEAD.

use std::time::Duration;

use reqwest::header::CONTENT_LENGTH;
use tracing::{debug, warn};
use url::Url;

use super::HttpClient;

/// Overall wall-clock budget for one probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(60);

/// Asks the server for the file size with a HEAD request.
///
/// The probe is advisory: any failure (network, timeout, non-success
/// status, or a missing, unparseable, or zero `Content-Length` header)
/// yields `None` and the download proceeds with an unknown size. Callers
/// decide what an unknown size means for their own checks.
pub async fn probe_size(client: &HttpClient, url: &Url) -> Option<u64> {
    let response = match tokio::time::timeout(PROBE_TIMEOUT, client.head(url)).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            warn!(url = %url, error = %e, "size probe failed");
            return None;
        }
        Err(_) => {
            warn!(url = %url, "size probe timed out");
            return None;
        }
    };

    let size = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|&size| size > 0);

    match size {
        Some(size) => debug!(url = %url, size, "size probe succeeded"),
        None => warn!(url = %url, "server did not report a usable content length"),
    }
    size
}
