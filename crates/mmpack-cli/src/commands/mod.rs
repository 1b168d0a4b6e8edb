//! CLI subcommands.

pub mod download;
pub mod install;
pub mod list;
pub mod remove;
pub mod source;
pub mod update;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// mmpack — a relocatable binary package manager.
#[derive(Parser, Debug)]
#[command(name = "mmpack", version, about = "A relocatable binary package manager")]
pub struct Cli {
    /// Filesystem root packages are installed into. Overrides
    /// `MMPACK_PREFIX` and the config file's `default-prefix`.
    #[arg(long, global = true, value_name = "PATH")]
    pub prefix: Option<PathBuf>,

    /// Path to the YAML configuration file.
    #[arg(long, global = true, value_name = "PATH", default_value = "mmpack-config.yaml")]
    pub config: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all but error-level logging.
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Split a `pkgname[=version]` CLI argument into its name and optional
/// pinned version.
#[must_use]
pub fn parse_pkg_spec(spec: &str) -> (String, Option<String>) {
    spec.split_once('=')
        .map_or_else(|| (spec.to_string(), None), |(name, version)| (name.to_string(), Some(version.to_string())))
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install one or more packages.
    Install(install::InstallArgs),
    /// Remove one or more packages.
    Remove(remove::RemoveArgs),
    /// Refresh configured repositories' indices.
    Update(update::UpdateArgs),
    /// Fetch a package's archive without installing it.
    Download(download::DownloadArgs),
    /// Fetch a package's matching source archive.
    Source(source::SourceArgs),
    /// List currently installed packages.
    List(list::ListArgs),
}
