//! Compiled dependency records.
//!
//! A `CompDep` list is logically a flat, append-only sequence the solver
//! walks forward-only without per-node allocation. This crate
//! represents that as a plain `Vec<CompDep>` rather than a buffer of
//! fixed records linked by byte offsets: iteration stays forward-only
//! and lists are still built once and never mutated, which is the only
//! contract that matters to callers. A `CompDep` whose `pkgs` is empty
//! is the `Vec` analogue of an empty candidate count.

use crate::pkg::Pkg;

/// A single `(name, version-range)` constraint resolved against a
/// [`crate::index::BinIndex`] into its ordered list of matching
/// candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompDep {
    /// Name-id of the constrained package.
    pub pkgname_id: usize,
    /// Name of the constrained package, for diagnostics.
    pub pkgname: String,
    /// Matching candidates, in the index's selection order (highest
    /// version first, ties broken by ascending `repo_index`).
    pub pkgs: Vec<Pkg>,
}

impl CompDep {
    /// An empty, unsatisfiable compiled dependency for `pkgname` — no
    /// candidate matched the constraint.
    #[must_use]
    pub fn empty(pkgname_id: usize, pkgname: impl Into<String>) -> Self {
        Self {
            pkgname_id,
            pkgname: pkgname.into(),
            pkgs: Vec::new(),
        }
    }

    /// True iff no candidate satisfies this constraint.
    #[must_use]
    pub fn is_unsatisfiable(&self) -> bool {
        self.pkgs.is_empty()
    }

    /// True iff `pkg` is one of this constraint's resolved candidates.
    #[must_use]
    pub fn pkg_match(&self, pkg: &Pkg) -> bool {
        pkg.name_id == self.pkgname_id && self.pkgs.iter().any(|p| p.version == pkg.version)
    }
}
