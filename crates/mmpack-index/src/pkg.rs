//! Package records and name interning.

use mmpack_core::version::Version;

/// A raw, uninterned dependency constraint as declared in a package's
/// metadata: `(name, min_version, max_version)`, with `"any"` meaning
/// unrestricted on either side.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RawDep {
    /// Name of the depended-on package.
    pub name: String,
    /// Inclusive lower bound, or `"any"`.
    pub min_version: String,
    /// Inclusive upper bound, or `"any"`.
    pub max_version: String,
}

/// A single package record, immutable after the index is loaded.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Pkg {
    /// Dense id assigned by the [`NameTable`] this package belongs to.
    #[serde(skip)]
    pub name_id: usize,
    /// Package name.
    pub name: String,
    /// Package version.
    pub version: Version,
    /// Upstream source package name, used only to name the companion
    /// source archive `mmpack source` fetches (`<source>_<version>_src.tar.gz`).
    /// Archives themselves are always fetched from the repository named
    /// by `repo_index`, not from this field.
    pub source: String,
    /// Archive filename within the repository.
    pub filename: String,
    /// Hex-encoded SHA-256 digest of the archive.
    pub sha256: String,
    /// Index of the repository (in the configured repository list) this
    /// record came from. Used as a selection tie-break.
    #[serde(default)]
    pub repo_index: usize,
    /// OS-level prerequisites this package assumes are already present.
    #[serde(default)]
    pub sysdeps: Vec<String>,
    /// Raw, uninterned dependency constraints.
    #[serde(default, alias = "depends")]
    pub deps: Vec<RawDep>,
}

impl Pkg {
    /// The `(name, version)` pair most error messages and tests key on.
    #[must_use]
    pub fn key(&self) -> (&str, &Version) {
        (&self.name, &self.version)
    }
}

/// Dense name→id interning table. Every name is assigned exactly once;
/// ids never change for the table's lifetime, so they're safe to use as
/// array indices into solver lookup tables.
#[derive(Debug, Default, Clone)]
pub struct NameTable {
    names: Vec<String>,
    by_name: std::collections::HashMap<String, usize>,
}

impl NameTable {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an existing id without allocating one.
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Return `name`'s id, interning it if this is the first time it's
    /// been seen.
    pub fn intern(&mut self, name: &str) -> usize {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = self.names.len();
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// The name a given id was assigned to.
    #[must_use]
    pub fn name(&self, id: usize) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// How many distinct names have been interned so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True if no name has been interned yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_name_twice_returns_same_id() {
        let mut table = NameTable::new();
        let a = table.intern("foo");
        let b = table.intern("foo");
        assert_eq!(a, b);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn distinct_names_get_distinct_ids() {
        let mut table = NameTable::new();
        let a = table.intern("foo");
        let b = table.intern("bar");
        assert_ne!(a, b);
        assert_eq!(table.name(a), Some("foo"));
        assert_eq!(table.name(b), Some("bar"));
    }
}
