//! The in-memory binary index: a name-indexed package catalog.

use std::cmp::Ordering;

use mmpack_core::error::{Error, Result};
use mmpack_core::version::{Version, VersionConstraint};

use crate::compdep::CompDep;
use crate::pkg::{NameTable, Pkg, RawDep};

/// Name-indexed catalog of available packages, merged from however many
/// repositories are configured. Within a name, candidates are kept
/// sorted in the index's preferred selection order: decreasing version,
/// ties broken by ascending `repo_index` (earlier-configured repository
/// wins).
#[derive(Debug, Default, Clone)]
pub struct BinIndex {
    names: NameTable,
    by_name_id: Vec<Vec<Pkg>>,
}

impl BinIndex {
    /// An empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one repository's YAML catalog document and merge its
    /// records into the index, stamping each with `repo_index`.
    pub fn load_str(&mut self, repo_index: usize, yaml: &str) -> Result<()> {
        let records: Vec<Pkg> = mmpack_core::yaml::from_str(yaml)?;
        for mut pkg in records {
            pkg.repo_index = repo_index;
            self.insert(pkg);
        }
        Ok(())
    }

    /// Insert or replace a single package record.
    pub fn insert(&mut self, mut pkg: Pkg) {
        let id = self.names.intern(&pkg.name);
        pkg.name_id = id;
        if self.by_name_id.len() <= id {
            self.by_name_id.resize_with(id + 1, Vec::new);
        }
        let bucket = &mut self.by_name_id[id];
        bucket.retain(|p| p.version != pkg.version || p.repo_index != pkg.repo_index);
        bucket.push(pkg);
        bucket.sort_by(|a, b| match b.version.cmp(&a.version) {
            Ordering::Equal => a.repo_index.cmp(&b.repo_index),
            other => other,
        });
    }

    /// The name-id for `name`, if any package has been loaded under it.
    #[must_use]
    pub fn name_id(&self, name: &str) -> Option<usize> {
        self.names.id_of(name)
    }

    /// All candidates known under `name`, in selection order.
    #[must_use]
    pub fn candidates(&self, name: &str) -> &[Pkg] {
        match self.names.id_of(name) {
            Some(id) => self.by_name_id.get(id).map_or(&[], Vec::as_slice),
            None => &[],
        }
    }

    /// Highest-priority candidate for `name` within `range`, or `None`
    /// if the name is unknown or no candidate matches.
    #[must_use]
    pub fn get_latest(&self, name: &str, range: &VersionConstraint) -> Option<Pkg> {
        self.candidates(name)
            .iter()
            .find(|pkg| range.matches(&pkg.version))
            .cloned()
    }

    /// Resolve a single raw dependency constraint into a [`CompDep`].
    /// Fails only when `raw_dep.name` is unknown to the index; a known
    /// name with no matching version yields an empty, `is_unsatisfiable`
    /// `CompDep` rather than an error.
    pub fn compile_dep(&self, raw_dep: &RawDep) -> Result<CompDep> {
        let Some(id) = self.names.id_of(&raw_dep.name) else {
            return Err(Error::UnknownPackage {
                name: raw_dep.name.clone(),
            });
        };
        let range = VersionConstraint::from_raw(&raw_dep.min_version, &raw_dep.max_version);
        let pkgs: Vec<Pkg> = self
            .candidates(&raw_dep.name)
            .iter()
            .filter(|pkg| range.matches(&pkg.version))
            .cloned()
            .collect();
        Ok(CompDep {
            pkgname_id: id,
            pkgname: raw_dep.name.clone(),
            pkgs,
        })
    }

    /// Resolve every dependency `pkg` declares into its list of
    /// [`CompDep`]s, in declaration order. Empty if `pkg` has no
    /// dependencies.
    pub fn compile_pkgdeps(&self, pkg: &Pkg) -> Result<Vec<CompDep>> {
        pkg.deps.iter().map(|dep| self.compile_dep(dep)).collect()
    }

    /// A version known to be interned, used by tests and fixtures that
    /// want a stable reference point rather than constructing a
    /// `Version` ad hoc.
    #[must_use]
    pub fn highest_version(&self, name: &str) -> Option<Version> {
        self.candidates(name).first().map(|pkg| pkg.version.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkg(name: &str, version: &str, repo_index: usize) -> Pkg {
        Pkg {
            name_id: 0,
            name: name.to_string(),
            version: Version::new(version),
            source: String::new(),
            filename: format!("{name}-{version}.mpk"),
            sha256: "deadbeef".to_string(),
            repo_index,
            sysdeps: Vec::new(),
            deps: Vec::new(),
        }
    }

    #[test]
    fn candidates_sort_by_decreasing_version() {
        let mut index = BinIndex::new();
        index.insert(pkg("foo", "1.0.0", 0));
        index.insert(pkg("foo", "2.0.0", 0));
        index.insert(pkg("foo", "1.5.0", 0));
        let versions: Vec<_> = index
            .candidates("foo")
            .iter()
            .map(|p| p.version.to_string())
            .collect();
        assert_eq!(versions, vec!["2.0.0", "1.5.0", "1.0.0"]);
    }

    #[test]
    fn ties_on_version_break_by_repo_index() {
        let mut index = BinIndex::new();
        index.insert(pkg("foo", "1.0.0", 2));
        index.insert(pkg("foo", "1.0.0", 0));
        index.insert(pkg("foo", "1.0.0", 1));
        let repo_order: Vec<_> = index.candidates("foo").iter().map(|p| p.repo_index).collect();
        assert_eq!(repo_order, vec![0, 1, 2]);
    }

    #[test]
    fn compile_dep_unknown_name_is_an_error() {
        let index = BinIndex::new();
        let dep = RawDep {
            name: "missing".to_string(),
            min_version: "any".to_string(),
            max_version: "any".to_string(),
        };
        assert!(index.compile_dep(&dep).is_err());
    }

    #[test]
    fn compile_dep_known_name_no_match_is_empty_not_error() {
        let mut index = BinIndex::new();
        index.insert(pkg("foo", "1.0.0", 0));
        let dep = RawDep {
            name: "foo".to_string(),
            min_version: "2.0.0".to_string(),
            max_version: "3.0.0".to_string(),
        };
        let cd = index.compile_dep(&dep).unwrap();
        assert!(cd.is_unsatisfiable());
    }

    #[test]
    fn get_latest_respects_range() {
        let mut index = BinIndex::new();
        index.insert(pkg("foo", "1.0.0", 0));
        index.insert(pkg("foo", "2.0.0", 0));
        let range = VersionConstraint::from_raw("any", "1.5.0");
        let latest = index.get_latest("foo", &range).unwrap();
        assert_eq!(latest.version.to_string(), "1.0.0");
    }

    mod version_match_property {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Spec property 6: only versions within `[min, max]` show up
            /// in a `CompDep` built from that range, and `any`/`any`
            /// pulls in every candidate regardless of how many there are.
            #[test]
            fn prop_compiled_dep_contains_exactly_matching_versions(
                versions in prop::collection::vec(0u32..50, 1..15),
                min in 0u32..50,
                max in 0u32..50,
            ) {
                let (min, max) = if min <= max { (min, max) } else { (max, min) };
                let mut index = BinIndex::new();
                for (i, v) in versions.iter().enumerate() {
                    index.insert(pkg("foo", &v.to_string(), i));
                }

                let dep = RawDep {
                    name: "foo".to_string(),
                    min_version: min.to_string(),
                    max_version: max.to_string(),
                };
                let cd = index.compile_dep(&dep).unwrap();

                let expected: std::collections::HashSet<u32> =
                    versions.iter().copied().filter(|v| *v >= min && *v <= max).collect();
                let actual: std::collections::HashSet<u32> =
                    cd.pkgs.iter().map(|p| p.version.to_string().parse().unwrap()).collect();
                prop_assert_eq!(actual, expected);
            }

            /// `any`/`any` always yields every candidate under the name.
            #[test]
            fn prop_any_range_compiles_to_every_candidate(versions in prop::collection::vec(0u32..50, 1..15)) {
                let mut index = BinIndex::new();
                for (i, v) in versions.iter().enumerate() {
                    index.insert(pkg("foo", &v.to_string(), i));
                }
                let dep = RawDep {
                    name: "foo".to_string(),
                    min_version: "any".to_string(),
                    max_version: "any".to_string(),
                };
                let cd = index.compile_dep(&dep).unwrap();
                prop_assert_eq!(cd.pkgs.len(), index.candidates("foo").len());
            }
        }
    }
}
