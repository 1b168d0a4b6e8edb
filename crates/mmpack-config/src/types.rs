//! The parsed shape of mmpack's YAML configuration file.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One `short-name: url` entry from the `repositories` sequence. Parsed
/// as a single-key map because that's the on-disk shape the
/// configuration file uses; [`RawConfig::repositories`] flattens the
/// sequence into `(name, url)` pairs in file order.
pub type RepositoryEntry = BTreeMap<String, String>;

/// The configuration file's recognized top-level keys. Unknown keys are
/// silently ignored (no `deny_unknown_fields`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConfig {
    /// Ordered `short-name: url` repository entries.
    #[serde(default)]
    pub repositories: Vec<RepositoryEntry>,

    /// Default prefix used when no `--prefix`/`MMPACK_PREFIX` is given.
    #[serde(default, rename = "default-prefix")]
    pub default_prefix: Option<PathBuf>,
}

impl RawConfig {
    /// Flatten `repositories` into `(name, url)` pairs, preserving the
    /// sequence's file order (which becomes `repo_index`). Each entry is
    /// documented as a single `name: url` map; an entry with more than
    /// one key contributes only one pair, tolerated rather than
    /// rejected.
    #[must_use]
    pub fn repository_pairs(&self) -> Vec<(String, String)> {
        self.repositories
            .iter()
            .filter_map(|entry| entry.iter().next())
            .map(|(name, url)| (name.clone(), url.clone()))
            .collect()
    }
}
