//! Pre-flight storage checks for downloads.
//!
//! Before any bytes move, two questions get answered here:
//! whether the destination directory is usable and has room
//! ([`prepare`]), and whether the file is already present in some form
//! ([`reconcile`]). Both are cheap filesystem operations that run once per
//! task, ahead of the transfer.

mod error;
mod prepare;
mod reconcile;

pub use error::StorageError;
pub use prepare::prepare;
pub use reconcile::{DecisionReason, ExistenceDecision, reconcile};

/// Formats a byte count for user-facing messages (MB below 1 GiB, GB above).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn human_size(bytes: u64) -> String {
    const GIB: u64 = 1024 * 1024 * 1024;
    if bytes >= GIB {
        format!("{:.2} GB", bytes as f64 / GIB as f64)
    } else {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::human_size;

    #[test]
    fn test_human_size_megabytes() {
        assert_eq!(human_size(1_048_576), "1.00 MB");
        assert_eq!(human_size(1_572_864), "1.50 MB");
    }

    #[test]
    fn test_human_size_gigabytes() {
        assert_eq!(human_size(2 * 1024 * 1024 * 1024), "2.00 GB");
    }

    #[test]
    fn test_human_size_zero() {
        assert_eq!(human_size(0), "0.00 MB");
    }
}
