//! Resolved run-time context shared by every subcommand: the prefix,
//! loaded configuration, repository manager and a blocking downloader.

use std::path::{Path, PathBuf};

use mmpack_config::Config;
use mmpack_core::error::Result;
use mmpack_downloader::Downloader;
use mmpack_repository::RepositoryManager;
use mmpack_solver::install_state::InstallState;

/// Where mmpack keeps its own state inside a prefix, and where
/// downloaded archives are cached before extraction.
#[derive(Debug, Clone)]
pub struct Context {
    /// The filesystem root packages are installed into.
    pub prefix: PathBuf,
    /// Parsed configuration file.
    pub config: Config,
    /// Repository registry + index cache, rooted at
    /// `<prefix>/var/lib/mmpack/index`.
    pub repositories: RepositoryManager,
    /// Blocking HTTP client shared across downloads.
    pub downloader: Downloader,
}

impl Context {
    /// Build a context: load the config file, resolve the effective
    /// prefix (CLI flag > `MMPACK_PREFIX` > config > built-in default),
    /// and wire up the repository manager against that prefix's index
    /// cache.
    pub fn new(config_path: &Path, cli_prefix: Option<PathBuf>) -> Result<Self> {
        let config = Config::load(config_path)?;
        let prefix = config.resolve_prefix(cli_prefix);
        let index_cache = prefix.join("var/lib/mmpack/index");
        let repositories = RepositoryManager::new(config.repositories.clone(), index_cache);
        let downloader = Downloader::new()?;
        Ok(Self {
            prefix,
            config,
            repositories,
            downloader,
        })
    }

    /// Path to the persisted installed-package list.
    #[must_use]
    pub fn installed_list_path(&self) -> PathBuf {
        self.prefix.join("var/lib/mmpack/installed.yaml")
    }

    /// Path archives are cached under before extraction.
    #[must_use]
    pub fn archive_cache_dir(&self) -> PathBuf {
        self.prefix.join("var/cache/mmpack")
    }

    /// Load the current install state from disk.
    pub fn load_install_state(&self) -> Result<InstallState> {
        InstallState::load(&self.installed_list_path())
    }
}
