//! Seed-image bootstrap
//!
//! On first launch the application materializes a pre-built, pre-seeded
//! database image into its writable storage. The copy happens exactly once:
//! if the target file already exists, bootstrap is a no-op. A failed copy
//! surfaces as [`StoreError::Bootstrap`] and leaves no partial file behind.

use crate::error::StoreError;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read};
use std::path::Path;
use tracing::info;

/// Copy a seed image into place if no database file exists yet
///
/// Returns `true` if the seed was copied, `false` if the target already
/// existed. Parent directories are created as needed.
pub fn materialize_seed<R: Read>(path: &Path, seed: R) -> Result<bool, StoreError> {
    if path.exists() {
        return Ok(false);
    }

    match copy_seed(path, seed) {
        Ok(bytes) => {
            info!("materialized seed database ({} bytes) at {}", bytes, path.display());
            Ok(true)
        }
        Err(source) => {
            // Never leave a truncated database behind
            let _ = fs::remove_file(path);
            Err(StoreError::Bootstrap {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

fn copy_seed<R: Read>(path: &Path, mut seed: R) -> io::Result<u64> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut out = BufWriter::new(File::create(path)?);
    io::copy(&mut seed, &mut out)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "seed unreadable"))
        }
    }

    #[test]
    fn test_materialize_copies_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.sqlite3");
        let seed: &[u8] = b"not a real database, but byte-exact";

        let copied = materialize_seed(&path, seed).unwrap();
        assert!(copied);
        assert_eq!(fs::read(&path).unwrap(), seed);
    }

    #[test]
    fn test_materialize_is_noop_when_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.sqlite3");
        fs::write(&path, b"existing contents").unwrap();

        let copied = materialize_seed(&path, &b"seed bytes"[..]).unwrap();
        assert!(!copied);
        assert_eq!(fs::read(&path).unwrap(), b"existing contents");
    }

    #[test]
    fn test_materialize_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/data/shop.sqlite3");

        let copied = materialize_seed(&path, &b"seed"[..]).unwrap();
        assert!(copied);
        assert!(path.exists());
    }

    #[test]
    fn test_failed_copy_surfaces_error_and_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.sqlite3");

        let err = materialize_seed(&path, FailingReader).unwrap_err();
        assert!(matches!(err, StoreError::Bootstrap { .. }));
        assert!(!path.exists());
    }
}
