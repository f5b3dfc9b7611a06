//! HTTP client construction and the transport-level fallback policy.

use std::time::Duration;

use reqwest::{Client, Method, Response};
use tracing::warn;
use url::Url;

use super::TransferError;

/// Seconds allowed for establishing a connection (including TLS).
pub const CONNECT_TIMEOUT_SECS: u64 = 60;

/// Seconds a body read may stall before the transfer is aborted. Generous
/// because a single chunk of a multi-gigabyte file can take a while on a
/// congested link.
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Whether a failed HTTPS connection may be retried once over plain HTTP.
///
/// Some self-hosted sources sit behind certificates that have expired and
/// will never be renewed. Retrying over HTTP trades transport security for
/// availability, so it only happens when the operator has opted in, and
/// only when the failure is classified as a certificate problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsecureFallback {
    /// Never downgrade. Certificate failures surface as errors.
    #[default]
    Disabled,
    /// Retry once over `http://` when HTTPS fails with a certificate error.
    Enabled,
}

impl InsecureFallback {
    /// Whether the downgrade retry is allowed.
    #[must_use]
    pub fn is_enabled(self) -> bool {
        matches!(self, Self::Enabled)
    }
}

/// Classifies a client error as a TLS certificate failure.
///
/// The client library exposes no typed certificate error, so after the
/// `is_connect()` gate this falls back to inspecting each error in the
/// source chain for a certificate mention. The top-level message is never
/// matched, only the transport errors underneath it, which keeps wrapping
/// layers from faking the cause — but it is a textual inspection, not a
/// typed one.
fn is_certificate_failure(error: &reqwest::Error) -> bool {
    error.is_connect() && chain_mentions_certificate(error)
}

fn chain_mentions_certificate(error: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = error.source();
    while let Some(inner) = source {
        if inner.to_string().to_ascii_lowercase().contains("certificate") {
            return true;
        }
        source = inner.source();
    }
    false
}

/// Rewrites an `https://` URL to `http://`; returns `None` for any other
/// scheme.
fn downgraded(url: &Url) -> Option<Url> {
    if url.scheme() != "https" {
        return None;
    }
    let mut plain = url.clone();
    plain.set_scheme("http").ok()?;
    Some(plain)
}

/// Thin wrapper around [`reqwest::Client`] with the timeouts and fallback
/// behavior every request in this crate shares.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    fallback: InsecureFallback,
}

impl HttpClient {
    /// Creates a client with the default timeouts.
    #[must_use]
    pub fn new(fallback: InsecureFallback) -> Self {
        Self::with_timeouts(
            fallback,
            Duration::from_secs(CONNECT_TIMEOUT_SECS),
            Duration::from_secs(READ_TIMEOUT_SECS),
        )
    }

    /// Creates a client with explicit connect and read timeouts.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_timeouts(
        fallback: InsecureFallback,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .read_timeout(read_timeout)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client, fallback }
    }

    /// Sends a HEAD request, downgrading once if the policy allows.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Network`], [`TransferError::Timeout`], or
    /// [`TransferError::HttpStatus`] when the request fails.
    pub async fn head(&self, url: &Url) -> Result<Response, TransferError> {
        self.request(Method::HEAD, url).await
    }

    /// Sends a GET request, downgrading once if the policy allows.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Network`], [`TransferError::Timeout`], or
    /// [`TransferError::HttpStatus`] when the request fails.
    pub async fn get(&self, url: &Url) -> Result<Response, TransferError> {
        self.request(Method::GET, url).await
    }

    async fn request(&self, method: Method, url: &Url) -> Result<Response, TransferError> {
        match self.send(method.clone(), url).await {
            Ok(response) => Ok(response),
            Err(e) if self.fallback.is_enabled() && is_certificate_failure(&e) => {
                let Some(plain) = downgraded(url) else {
                    return Err(TransferError::network(url.clone(), e));
                };
                warn!(
                    url = %url,
                    "certificate failure, retrying over plain HTTP"
                );
                self.send(method, &plain)
                    .await
                    .map_err(|e| classify_request_error(&plain, e))
            }
            Err(e) => Err(classify_request_error(url, e)),
        }
    }

    async fn send(&self, method: Method, url: &Url) -> Result<Response, reqwest::Error> {
        let response = self.client.request(method, url.clone()).send().await?;
        response.error_for_status()
    }
}

/// Maps a raw client error onto the transfer error taxonomy.
pub(super) fn classify_request_error(url: &Url, error: reqwest::Error) -> TransferError {
    if error.is_timeout() {
        return TransferError::timeout(url.clone());
    }
    if let Some(status) = error.status() {
        return TransferError::http_status(url.clone(), status);
    }
    TransferError::network(url.clone(), error)
}
