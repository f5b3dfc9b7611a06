//! Destination directory preparation and free-space validation.

use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, warn};

use super::StorageError;

/// Ensures `dir` exists, is a directory, and has room for `expected_size`.
///
/// Missing directories (including parents) are created. The free-space
/// comparison is skipped when the expected size is unknown — an unknown
/// size cannot be compared against anything, and the caller has already
/// warned the user about the uncertainty. Safe to call repeatedly for the
/// same directory.
///
/// # Errors
///
/// Returns [`StorageError::NotADirectory`] when the path exists as a file,
/// [`StorageError::Create`] when directory creation fails,
/// [`StorageError::SpaceQuery`] when the filesystem cannot report free
/// space, and [`StorageError::InsufficientSpace`] when it can but the
/// expected size does not fit.
pub async fn prepare(dir: &Path, expected_size: Option<u64>) -> Result<(), StorageError> {
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(StorageError::not_a_directory(dir)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| StorageError::create(dir, e))?;
            debug!(path = %dir.display(), "created destination directory");
        }
        Err(e) => return Err(StorageError::create(dir, e)),
    }

    let Some(needed) = expected_size else {
        warn!(path = %dir.display(), "expected size unknown, skipping free-space check");
        return Ok(());
    };

    let available =
        fs2::available_space(dir).map_err(|e| StorageError::space_query(dir, e))?;
    if available < needed {
        return Err(StorageError::insufficient_space(dir, needed, available));
    }

    debug!(
        path = %dir.display(),
        needed,
        available,
        "destination ready"
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_prepare_creates_missing_directory_tree() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("Movies").join("A Movie");

        prepare(&dir, Some(1024)).await.unwrap();

        assert!(dir.is_dir());
    }

    #[tokio::test]
    async fn test_prepare_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("Shows").join("B").join("S01");

        prepare(&dir, Some(1024)).await.unwrap();
        prepare(&dir, Some(1024)).await.unwrap();

        assert!(dir.is_dir());
    }

    #[tokio::test]
    async fn test_prepare_rejects_file_at_destination() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("occupied");
        std::fs::write(&file, b"data").unwrap();

        let result = prepare(&file, Some(1024)).await;

        assert!(matches!(result, Err(StorageError::NotADirectory { .. })));
    }

    #[tokio::test]
    async fn test_prepare_fails_when_expected_size_exceeds_free_space() {
        let temp = TempDir::new().unwrap();

        // No filesystem has u64::MAX bytes free.
        let result = prepare(temp.path(), Some(u64::MAX)).await;

        match result {
            Err(StorageError::InsufficientSpace { needed, .. }) => {
                assert_eq!(needed, u64::MAX);
            }
            other => panic!("Expected InsufficientSpace, got: {other:?}"),
        }
        // The check must not leave any partial file behind.
        assert!(std::fs::read_dir(temp.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_prepare_skips_space_check_for_unknown_size() {
        let temp = TempDir::new().unwrap();

        prepare(temp.path(), None).await.unwrap();
    }
}
