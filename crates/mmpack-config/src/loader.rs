//! Loading the configuration file and resolving the effective prefix.

use std::path::{Path, PathBuf};

use mmpack_core::error::{Error, Result};
use mmpack_repository::Repository;

use crate::env;
use crate::types::RawConfig;

/// mmpack's resolved configuration: the repository list (in
/// configuration order) and whatever `default-prefix` the file named.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Configured repositories, in file order (`repo_index` follows
    /// this order once loaded into a `BinIndex`).
    pub repositories: Vec<Repository>,
    /// `default-prefix` key, if the config file set one.
    pub default_prefix: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `path`. A missing file is not an error
    /// (an empty [`Config`] is returned); an unreadable or malformed
    /// file is.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let parsed: RawConfig = serde_yaml::from_str(&raw).map_err(|e| Error::Config {
            message: format!("{}: {e}", path.display()),
        })?;
        Ok(Self {
            repositories: parsed
                .repository_pairs()
                .into_iter()
                .map(|(name, url)| Repository { name, url })
                .collect(),
            default_prefix: parsed.default_prefix,
        })
    }

    /// Resolve the effective prefix by precedence: CLI flag >
    /// `MMPACK_PREFIX` env > `default-prefix` config key > a built-in
    /// default under the user's home directory.
    #[must_use]
    pub fn resolve_prefix(&self, cli_prefix: Option<PathBuf>) -> PathBuf {
        cli_prefix
            .or_else(env::prefix_override)
            .or_else(|| self.default_prefix.clone())
            .unwrap_or_else(builtin_default_prefix)
    }
}

fn builtin_default_prefix() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".local/mmpack"),
        |dirs| dirs.home_dir().join(".local/mmpack"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("missing.yaml")).unwrap();
        assert!(config.repositories.is_empty());
        assert!(config.default_prefix.is_none());
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "not: [valid yaml").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "some-unknown-key: 42\ndefault-prefix: /opt/mmpack\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.default_prefix, Some(PathBuf::from("/opt/mmpack")));
    }

    #[test]
    fn repositories_preserve_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "repositories:\n  - main: https://repo.example/main\n  - extra: https://repo.example/extra\n",
        )
        .unwrap();
        let config = Config::load(&path).unwrap();
        let names: Vec<_> = config.repositories.iter().map(|r| r.name.clone()).collect();
        assert_eq!(names, vec!["main".to_string(), "extra".to_string()]);
    }

    #[test]
    fn cli_prefix_wins_over_config_default() {
        let config = Config {
            repositories: Vec::new(),
            default_prefix: Some(PathBuf::from("/from/config")),
        };
        let resolved = config.resolve_prefix(Some(PathBuf::from("/from/cli")));
        assert_eq!(resolved, PathBuf::from("/from/cli"));
    }

    #[test]
    fn config_default_wins_over_builtin() {
        unsafe {
            std::env::remove_var(env::MMPACK_PREFIX);
        }
        let config = Config {
            repositories: Vec::new(),
            default_prefix: Some(PathBuf::from("/from/config")),
        };
        assert_eq!(config.resolve_prefix(None), PathBuf::from("/from/config"));
    }
}
