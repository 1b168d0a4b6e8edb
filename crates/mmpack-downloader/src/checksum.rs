//! SHA-256 verification of downloaded or on-disk artifacts.

use std::fs::File;
use std::path::Path;

use mmpack_core::error::{Error, Result};
use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest of the file at `path`.
pub fn hash_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).map_err(|e| Error::io(path, e))?;
    Ok(hex::encode(hasher.finalize()))
}

/// Verify that `path`'s SHA-256 matches `expected` (case-insensitive
/// hex). Returns [`Error::Integrity`] naming `name` on mismatch.
pub fn verify_file(path: &Path, name: &str, expected: &str) -> Result<()> {
    let actual = hash_file(path)?;
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(Error::Integrity {
            name: name.to_string(),
            expected: expected.to_string(),
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_hash_verifies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f");
        std::fs::write(&path, b"hello").unwrap();
        let digest = hash_file(&path).unwrap();
        verify_file(&path, "f", &digest).unwrap();
    }

    #[test]
    fn mismatched_hash_is_integrity_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f");
        std::fs::write(&path, b"hello").unwrap();
        let err = verify_file(&path, "f", "deadbeef").unwrap_err();
        assert!(matches!(err, Error::Integrity { .. }));
    }
}
