//! Error types for HTTP transfers.

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Errors that can occur while probing or transferring a single file.
///
/// Each variant aborts exactly one task; sibling tasks in the same batch
/// are unaffected.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Sending the request or reading the body failed.
    #[error("request to {url} failed: {source}")]
    Network {
        /// The URL that was being fetched.
        url: Url,
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The request did not complete within the allotted time.
    #[error("request to {url} timed out")]
    Timeout {
        /// The URL that was being fetched.
        url: Url,
    },

    /// The server answered with a non-success status code.
    #[error("server returned {status} for {url}")]
    HttpStatus {
        /// The URL that was being fetched.
        url: Url,
        /// The status code the server returned.
        status: reqwest::StatusCode,
    },

    /// Writing the downloaded bytes to disk failed.
    #[error("could not write {path}: {source}")]
    Io {
        /// The file that was being written.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The stream ended cleanly but delivered fewer or more bytes than the
    /// server advertised.
    #[error("incomplete transfer of {path}: expected {expected} bytes, wrote {actual}")]
    Incomplete {
        /// The file that was written.
        path: PathBuf,
        /// Bytes the server advertised.
        expected: u64,
        /// Bytes actually written.
        actual: u64,
    },
}

impl TransferError {
    /// Creates a network error.
    pub fn network(url: Url, source: reqwest::Error) -> Self {
        Self::Network { url, source }
    }

    /// Creates a timeout error.
    pub fn timeout(url: Url) -> Self {
        Self::Timeout { url }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: Url, status: reqwest::StatusCode) -> Self {
        Self::HttpStatus { url, status }
    }

    /// Creates a disk write error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an incomplete-transfer error.
    pub fn incomplete(path: impl Into<PathBuf>, expected: u64, actual: u64) -> Self {
        Self::Incomplete {
            path: path.into(),
            expected,
            actual,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let url = Url::parse("https://example.com/file.mkv").unwrap();
        let error = TransferError::timeout(url);
        assert!(error.to_string().contains("example.com/file.mkv"));
        assert!(error.to_string().contains("timed out"));
    }

    #[test]
    fn test_http_status_display() {
        let url = Url::parse("https://example.com/file.mkv").unwrap();
        let error = TransferError::http_status(url, reqwest::StatusCode::NOT_FOUND);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected status in: {msg}");
    }

    #[test]
    fn test_incomplete_display() {
        let error = TransferError::incomplete("/library/file.mkv", 100, 60);
        let msg = error.to_string();
        assert!(msg.contains("expected 100"), "Bad message: {msg}");
        assert!(msg.contains("wrote 60"), "Bad message: {msg}");
    }
}
