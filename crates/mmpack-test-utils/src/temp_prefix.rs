//! Throwaway install prefixes for solver, archive and CLI tests.

use std::fs;
use std::path::{Path, PathBuf};

use mmpack_core::error::Result;
use mmpack_index::Pkg;
use mmpack_solver::install_state::InstallState;
use tempfile::TempDir;

/// A temporary directory standing in for an mmpack install prefix. Its
/// `var/lib/mmpack/metadata` layout is created on demand by the archive
/// crate; this wrapper only manages the root and the installed-list
/// file most tests read or write directly.
#[derive(Debug)]
pub struct TempPrefix {
    dir: TempDir,
}

impl TempPrefix {
    /// Create an empty prefix.
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().map_err(|e| mmpack_core::error::Error::io(".", e))?;
        Ok(Self { dir })
    }

    /// Root directory of the prefix.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path to the installed-package list, whether or not it exists yet.
    #[must_use]
    pub fn installed_list_path(&self) -> PathBuf {
        self.dir.path().join("var/lib/mmpack/installed.yaml")
    }

    /// Seed the prefix with an installed-package list containing `pkgs`.
    pub fn seed_installed(&self, pkgs: impl IntoIterator<Item = Pkg>) -> Result<()> {
        let mut state = InstallState::new();
        for pkg in pkgs {
            state.add(pkg);
        }
        let path = self.installed_list_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| mmpack_core::error::Error::io(parent, e))?;
        }
        state.save(&path)
    }

    /// Load the prefix's current installed-package list.
    pub fn load_installed(&self) -> Result<InstallState> {
        InstallState::load(&self.installed_list_path())
    }

    /// True if a regular file exists at `relative_path` under the prefix.
    #[must_use]
    pub fn has_file(&self, relative_path: &str) -> bool {
        self.dir.path().join(relative_path).is_file()
    }

    /// Prevent cleanup on drop, returning the path for manual inspection.
    #[must_use]
    pub fn persist(self) -> PathBuf {
        self.dir.into_path()
    }
}

impl Default for TempPrefix {
    fn default() -> Self {
        Self::new().expect("failed to create temp prefix")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::PkgFixture;

    #[test]
    fn seed_then_load_round_trips() {
        let prefix = TempPrefix::new().unwrap();
        prefix.seed_installed([PkgFixture::new("foo", "1.0.0").build()]).unwrap();

        let state = prefix.load_installed().unwrap();
        assert!(state.get("foo").is_some());
    }

    #[test]
    fn fresh_prefix_has_no_installed_list() {
        let prefix = TempPrefix::new().unwrap();
        let state = prefix.load_installed().unwrap();
        assert!(state.is_empty());
    }
}
