//! Pre-built package and index fixtures for solver and archive tests.

use mmpack_core::version::Version;
use mmpack_index::{BinIndex, Pkg, RawDep};

/// A builder for a single [`Pkg`] record, with sensible defaults for the
/// fields a test rarely cares about (filename, checksum, repo index).
#[derive(Debug, Clone)]
pub struct PkgFixture {
    pkg: Pkg,
}

impl PkgFixture {
    /// Start a fixture for `name` at `version`, no dependencies, no
    /// sysdeps, hosted on repository index 0.
    #[must_use]
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            pkg: Pkg {
                name_id: 0,
                name: name.to_string(),
                version: Version::new(version),
                source: name.to_string(),
                filename: format!("{name}_{version}_amd64.mpk"),
                sha256: "0".repeat(64),
                repo_index: 0,
                sysdeps: Vec::new(),
                deps: Vec::new(),
            },
        }
    }

    /// Depend on `name` within `[min_version, max_version]` (pass `"any"`
    /// for an unbounded side).
    #[must_use]
    pub fn depends_on(mut self, name: &str, min_version: &str, max_version: &str) -> Self {
        self.pkg.deps.push(RawDep {
            name: name.to_string(),
            min_version: min_version.to_string(),
            max_version: max_version.to_string(),
        });
        self
    }

    /// Require an OS-level prerequisite.
    #[must_use]
    pub fn sysdep(mut self, name: &str) -> Self {
        self.pkg.sysdeps.push(name.to_string());
        self
    }

    /// Attribute this record to a specific repository index.
    #[must_use]
    pub fn repo_index(mut self, repo_index: usize) -> Self {
        self.pkg.repo_index = repo_index;
        self
    }

    /// Override the generated sha256 (defaults to all zeros).
    #[must_use]
    pub fn sha256(mut self, sha256: &str) -> Self {
        self.pkg.sha256 = sha256.to_string();
        self
    }

    /// Finish, yielding the built [`Pkg`].
    #[must_use]
    pub fn build(self) -> Pkg {
        self.pkg
    }
}

/// Build a [`BinIndex`] from a list of fixtures, interning every record
/// under repository index 0 unless the fixture says otherwise.
#[must_use]
pub fn index_of(pkgs: impl IntoIterator<Item = PkgFixture>) -> BinIndex {
    let mut index = BinIndex::new();
    for fixture in pkgs {
        index.insert(fixture.build());
    }
    index
}

/// A small, hand-checkable dependency graph used across solver tests:
/// `app` depends on `lib` (`>=1.0.0`), which has two versions, `2.0.0`
/// being newer but requiring a `sysdep` the host may not provide.
#[must_use]
pub fn small_graph_index() -> BinIndex {
    index_of([
        PkgFixture::new("app", "1.0.0").depends_on("lib", "1.0.0", "any"),
        PkgFixture::new("lib", "1.0.0"),
        PkgFixture::new("lib", "2.0.0").sysdep("libssl"),
    ])
}
