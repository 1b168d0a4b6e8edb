//! Environment variable overrides.

use std::path::PathBuf;

/// The environment variable that overrides `default-prefix`.
pub const MMPACK_PREFIX: &str = "MMPACK_PREFIX";

/// Read `MMPACK_PREFIX` from the environment, if set and non-empty.
#[must_use]
pub fn prefix_override() -> Option<PathBuf> {
    std::env::var_os(MMPACK_PREFIX)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
