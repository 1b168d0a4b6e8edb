//! The set of currently-installed packages.

use std::collections::HashMap;
use std::path::Path;

use mmpack_core::error::Result;
use mmpack_index::{BinIndex, Pkg};

/// Mapping of package name to its currently-installed record, plus
/// reverse-dependency lookups computed on demand by scanning the
/// installed set (correct even when dependencies are circular, since it
/// never needs to walk a cycle to completion).
#[derive(Debug, Default, Clone, serde::Serialize, serde::Deserialize)]
pub struct InstallState {
    by_name: HashMap<String, Pkg>,
}

impl InstallState {
    /// An empty install state (nothing installed).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a previously persisted installed-package list.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let records: Vec<Pkg> = mmpack_core::yaml::from_file(path)?;
        let mut state = Self::new();
        for pkg in records {
            state.add(pkg);
        }
        Ok(state)
    }

    /// Persist the installed-package list atomically (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        let records: Vec<&Pkg> = self.by_name.values().collect();
        mmpack_core::yaml::write_file_atomic(path, &records)
    }

    /// The installed record for `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Pkg> {
        self.by_name.get(name)
    }

    /// Register `pkg` as installed, replacing any prior record under the
    /// same name.
    pub fn add(&mut self, pkg: Pkg) {
        self.by_name.insert(pkg.name.clone(), pkg);
    }

    /// Remove `name` from the installed set, returning its prior record.
    pub fn remove(&mut self, name: &str) -> Option<Pkg> {
        self.by_name.remove(name)
    }

    /// Iterate over every installed package.
    pub fn iter(&self) -> impl Iterator<Item = &Pkg> {
        self.by_name.values()
    }

    /// How many packages are currently installed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// True if nothing is installed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Names of every installed package whose declared dependencies
    /// reference `name`.
    #[must_use]
    pub fn rdeps(&self, name: &str) -> Vec<String> {
        self.by_name
            .values()
            .filter(|pkg| pkg.deps.iter().any(|dep| dep.name == name))
            .map(|pkg| pkg.name.clone())
            .collect()
    }

    /// Dense `name_id -> Pkg` lookup table for the solver, built against
    /// `index`'s current interning. Installed packages whose name the
    /// index has never seen are skipped (nothing in the index can
    /// reference their id).
    #[must_use]
    pub fn fill_lookup_table(&self, index: &BinIndex) -> HashMap<usize, Pkg> {
        self.by_name
            .values()
            .filter_map(|pkg| index.name_id(&pkg.name).map(|id| (id, pkg.clone())))
            .collect()
    }

    /// A deep copy, used by the remove planner to simulate removals
    /// without touching the real install state.
    #[must_use]
    pub fn copy(&self) -> Self {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmpack_core::version::Version;
    use mmpack_index::RawDep;

    fn pkg(name: &str, deps: &[&str]) -> Pkg {
        Pkg {
            name_id: 0,
            name: name.to_string(),
            version: Version::new("1.0.0"),
            source: String::new(),
            filename: String::new(),
            sha256: String::new(),
            repo_index: 0,
            sysdeps: Vec::new(),
            deps: deps
                .iter()
                .map(|d| RawDep {
                    name: (*d).to_string(),
                    min_version: "any".to_string(),
                    max_version: "any".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn rdeps_finds_dependents() {
        let mut state = InstallState::new();
        state.add(pkg("a", &[]));
        state.add(pkg("b", &["a"]));
        let rdeps = state.rdeps("a");
        assert_eq!(rdeps, vec!["b".to_string()]);
    }

    #[test]
    fn remove_then_get_returns_none() {
        let mut state = InstallState::new();
        state.add(pkg("a", &[]));
        state.remove("a");
        assert!(state.get("a").is_none());
    }

    #[test]
    fn copy_is_independent_of_original() {
        let mut state = InstallState::new();
        state.add(pkg("a", &[]));
        let mut copy = state.copy();
        copy.remove("a");
        assert!(state.get("a").is_some());
        assert!(copy.get("a").is_none());
    }
}
