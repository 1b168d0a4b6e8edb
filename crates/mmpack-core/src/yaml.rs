//! Thin YAML (de)serialization helpers.
//!
//! Every persisted format in mmpack — repository indices, the
//! configuration file, the installed-package list — is YAML, so this
//! module centralizes parse/emit error wrapping instead of scattering
//! `serde_yaml` calls (and their error conversions) across crates.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

/// Parse a YAML document from a string.
pub fn from_str<T: DeserializeOwned>(raw: &str) -> Result<T> {
    serde_yaml::from_str(raw).map_err(|source| Error::Metadata {
        message: source.to_string(),
    })
}

/// Parse a YAML document, reading the file first and attributing I/O
/// failures to `path`.
pub fn from_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::io(path, source))?;
    from_str(&raw)
}

/// Serialize a value to a YAML string.
pub fn to_string<T: Serialize>(value: &T) -> Result<String> {
    serde_yaml::to_string(value).map_err(|source| Error::Metadata {
        message: source.to_string(),
    })
}

/// Serialize a value and write it atomically to `path`: the document is
/// written to a temp file in the same directory, then renamed over the
/// destination, so a crash mid-write never leaves a truncated file.
pub fn write_file_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let raw = to_string(value)?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|source| Error::io(dir, source))?;

    let tmp = dir.join(format!(
        ".{}.tmp",
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("mmpack-yaml")
    ));
    std::fs::write(&tmp, raw).map_err(|source| Error::io(&tmp, source))?;
    std::fs::rename(&tmp, path).map_err(|source| Error::io(path, source))?;
    Ok(())
}
