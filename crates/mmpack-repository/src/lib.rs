//! Repository registry: the ordered list of configured repositories,
//! index fetch, and the on-disk index cache that lets `BinIndex` be
//! rebuilt without a network round trip.
//!
//! Grounded on the original `mmpack-update.c` flow: each configured
//! repository contributes one YAML index document, downloaded and
//! merged in configuration order (order becomes `repo_index`).

use std::path::{Path, PathBuf};

use mmpack_core::error::Result;
use mmpack_downloader::Downloader;
use mmpack_index::BinIndex;
use tracing::info;

/// One configured repository: a short name and the base URL its index
/// and archives are served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Short name, as it appears in the config file's `repositories` map.
    pub name: String,
    /// Base URL. The index document is fetched from `<url>/index.yaml`.
    pub url: String,
}

/// The ordered list of configured repositories, plus the on-disk cache
/// directory their fetched indices are written under.
#[derive(Debug, Clone)]
pub struct RepositoryManager {
    repos: Vec<Repository>,
    cache_dir: PathBuf,
}

impl RepositoryManager {
    /// Build a manager over `repos` (in configured order — that order
    /// becomes each package's `repo_index`) caching fetched indices
    /// under `cache_dir`.
    #[must_use]
    pub fn new(repos: Vec<Repository>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            repos,
            cache_dir: cache_dir.into(),
        }
    }

    /// The configured repositories, in order.
    #[must_use]
    pub fn repositories(&self) -> &[Repository] {
        &self.repos
    }

    /// The base URL of the repository a package's `repo_index` points
    /// at — where its archive and (for `mmpack source`) companion
    /// source tarball are served from. `None` if `repo_index` is out of
    /// range (a package loaded from an index whose repository has since
    /// been removed from the configuration).
    #[must_use]
    pub fn base_url(&self, repo_index: usize) -> Option<&str> {
        self.repos.get(repo_index).map(|r| r.url.as_str())
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{name}.yaml"))
    }

    /// Re-fetch every repository's index via `downloader` and rewrite
    /// its on-disk cache entry (`mmpack update`).
    pub fn update(&self, downloader: &Downloader) -> Result<()> {
        std::fs::create_dir_all(&self.cache_dir).map_err(|e| mmpack_core::error::Error::io(&self.cache_dir, e))?;
        for repo in &self.repos {
            let url = format!("{}/index.yaml", repo.url.trim_end_matches('/'));
            info!(repo = %repo.name, url, "fetching repository index");
            let body = downloader.fetch_text(&url)?;
            let dest = self.cache_path(&repo.name);
            std::fs::write(&dest, &body).map_err(|e| mmpack_core::error::Error::io(&dest, e))?;
        }
        Ok(())
    }

    /// Build a [`BinIndex`] from the cached index documents, without
    /// touching the network. A repository with no cached index yet
    /// (never `update`d) is silently skipped.
    pub fn load_index(&self) -> Result<BinIndex> {
        let mut index = BinIndex::new();
        for (repo_index, repo) in self.repos.iter().enumerate() {
            let path = self.cache_path(&repo.name);
            if !path.exists() {
                continue;
            }
            let yaml = std::fs::read_to_string(&path).map_err(|e| mmpack_core::error::Error::io(&path, e))?;
            index.load_str(repo_index, &yaml)?;
        }
        Ok(index)
    }
}
