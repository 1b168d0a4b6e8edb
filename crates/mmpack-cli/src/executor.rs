//! The executor: applies an [`ActionStack`] to a prefix.
//!
//! Grounded on `mmpack-install.c`/`mmpack-remove.c`/`pkg-fs-utils.c`:
//! for each action in order, download+verify+extract (install) or
//! read-sha256sums+unlink+unregister (remove). A single pre-flight
//! sysdep check runs before any action executes; the installed-package
//! list is rewritten only once every action has succeeded, so a crash
//! partway through never corrupts the persisted view (individual
//! extracted/unlinked files may remain, but a later idempotent
//! reinstall or re-remove cleans them up).

use std::path::Path;

use mmpack_archive::Compression;
use mmpack_core::error::{Error, Result};
use mmpack_core::sysdeps::{self, HostSysdepChecker};
use mmpack_downloader::progress::ProgressSink;
use mmpack_downloader::Downloader;
use mmpack_repository::RepositoryManager;
use mmpack_solver::{Action, ActionKind, ActionStack, InstallState};
use tracing::{info, warn};

/// Temporarily `chdir`s into the prefix for the duration of an
/// apply-stack call, restoring the previous working directory on every
/// exit path (including panics, via `Drop`). Per spec, the prefix is
/// the exclusive working directory of the process while actions apply.
struct PrefixGuard {
    previous: std::path::PathBuf,
}

impl PrefixGuard {
    fn enter(prefix: &Path) -> Result<Self> {
        let previous = std::env::current_dir().map_err(|e| Error::io(".", e))?;
        std::env::set_current_dir(prefix).map_err(|e| Error::io(prefix, e))?;
        Ok(Self { previous })
    }
}

impl Drop for PrefixGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.previous);
    }
}

/// Apply every action in `stack`, in order, against `prefix`. Mutates
/// `state` as it goes and persists it atomically only on full success.
pub fn apply(
    stack: &ActionStack,
    prefix: &Path,
    downloader: &Downloader,
    repositories: &RepositoryManager,
    cache_dir: &Path,
    state: &mut InstallState,
    installed_list_path: &Path,
    progress: &dyn ProgressSink,
) -> Result<()> {
    check_sysdeps(stack)?;
    std::fs::create_dir_all(prefix).map_err(|e| Error::io(prefix, e))?;
    let _guard = PrefixGuard::enter(prefix)?;

    for action in stack.actions() {
        crate::output::announce(action.kind, &action.pkg.name, action.pkg.version.as_str());
        let result = match action.kind {
            ActionKind::InstallPkg => install_one(action, prefix, downloader, repositories, cache_dir, progress)
                .map(|()| state.add(action.pkg.clone())),
            ActionKind::RemovePkg => remove_one(action, prefix).map(|()| state.remove(&action.pkg.name)).map(|_| ()),
        };
        crate::output::announce_result(result.is_ok());
        result?;
    }

    state.save(installed_list_path)
}

fn check_sysdeps(stack: &ActionStack) -> Result<()> {
    let names: Vec<String> = stack
        .actions()
        .iter()
        .filter(|a| a.kind == ActionKind::InstallPkg)
        .flat_map(|a| a.pkg.sysdeps.clone())
        .collect();
    if names.is_empty() {
        return Ok(());
    }
    let missing = sysdeps::missing(&HostSysdepChecker, names);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::MissingSysDeps { missing })
    }
}

fn install_one(
    action: &Action,
    prefix: &Path,
    downloader: &Downloader,
    repositories: &RepositoryManager,
    cache_dir: &Path,
    progress: &dyn ProgressSink,
) -> Result<()> {
    let pkg = &action.pkg;
    info!(name = %pkg.name, version = %pkg.version, "installing");

    let cached = cache_dir.join(&pkg.filename);
    if !cached.exists() || mmpack_downloader::checksum::hash_file(&cached).ok().as_deref() != Some(pkg.sha256.as_str())
    {
        let base = repositories.base_url(pkg.repo_index).ok_or_else(|| Error::Metadata {
            message: format!("'{}' references an unknown repository index {}", pkg.name, pkg.repo_index),
        })?;
        let url = format!("{}/{}", base.trim_end_matches('/'), pkg.filename);
        downloader.download_verified(&url, &cached, &pkg.name, &pkg.sha256, progress)?;
    }

    let compression = Compression::from_filename(&pkg.filename);
    mmpack_archive::extract_package(&cached, prefix, &pkg.name, compression)?;
    Ok(())
}

fn remove_one(action: &Action, prefix: &Path) -> Result<()> {
    let pkg = &action.pkg;
    info!(name = %pkg.name, version = %pkg.version, "removing");

    let entries = mmpack_archive::read_sha256sums(prefix, &pkg.name)?;
    for entry in &entries {
        if entry.is_dir() {
            continue;
        }
        let path = prefix.join(&entry.path);
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "already absent, skipping");
            }
            Err(e) => return Err(Error::io(&path, e)),
        }
    }
    mmpack_archive::remove_metadata(prefix, &pkg.name)?;
    Ok(())
}
