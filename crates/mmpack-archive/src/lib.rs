//! `.mpk` archive extraction and packing.
//!
//! An `.mpk` is a gzip- or zstd-compressed tar stream (the idiomatic
//! stand-in this workspace uses for "any format libarchive would
//! accept"). Entries begin with `./`. Everything under
//! `MMPACK/` is package metadata rather than installed content:
//! `MMPACK/info` and the bare `MMPACK/` directory entry are never
//! extracted; every other `MMPACK/<x>` file is redirected to
//! `var/lib/mmpack/metadata/<pkgname>.<x>`. All other entries land at
//! their literal path under the prefix. A pre-existing file at a target
//! path is unlinked before extraction.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use mmpack_core::error::{Error, Result};
use sha2::{Digest, Sha256};
use tar::{Archive, EntryType};
use tracing::{debug, warn};

/// Compression envelope wrapping the tar stream inside an `.mpk`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// gzip-compressed tar.
    Gzip,
    /// zstd-compressed tar.
    Zstd,
}

impl Compression {
    /// Guess the compression from a filename's extension.
    #[must_use]
    pub fn from_filename(name: &str) -> Self {
        if name.ends_with(".tar.zst") || name.ends_with(".mpk.zst") {
            Self::Zstd
        } else {
            Self::Gzip
        }
    }
}

/// Relative path (under the prefix) plus the hex SHA-256 of the file
/// mmpack wrote there. Directories are not hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path relative to the prefix root, as it appears in `sha256sums`.
    pub path: String,
    /// Hex-encoded SHA-256 digest, absent for directories.
    pub sha256: Option<String>,
}

/// Relative path inside the prefix for a package's metadata file.
fn metadata_path(prefix: &Path, pkgname: &str, basename: &str) -> PathBuf {
    prefix
        .join("var/lib/mmpack/metadata")
        .join(format!("{pkgname}.{basename}"))
}

/// Extract `mpk_path` (a package named `pkgname`) into `prefix`,
/// applying `MMPACK/` metadata redirection, and write the resulting
/// `sha256sums` metadata file. Returns the list of regular-file records
/// written (directories and symlinks excluded), in archive order.
pub fn extract_package(
    mpk_path: &Path,
    prefix: &Path,
    pkgname: &str,
    compression: Compression,
) -> Result<Vec<FileRecord>> {
    let file = File::open(mpk_path).map_err(|e| Error::io(mpk_path, e))?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();

    match compression {
        Compression::Gzip => {
            let decoder = flate2::read::GzDecoder::new(reader);
            extract_entries(Archive::new(decoder), prefix, pkgname, &mut records)?;
        }
        Compression::Zstd => {
            let decoder = zstd::stream::read::Decoder::new(reader)
                .map_err(|e| Error::io(mpk_path, e))?;
            extract_entries(Archive::new(decoder), prefix, pkgname, &mut records)?;
        }
    }

    write_sha256sums(prefix, pkgname, &records)?;
    Ok(records)
}

fn extract_entries<R: Read>(
    mut archive: Archive<R>,
    prefix: &Path,
    pkgname: &str,
    records: &mut Vec<FileRecord>,
) -> Result<()> {
    let entries = archive
        .entries()
        .map_err(|e| Error::Metadata { message: e.to_string() })?;

    for entry in entries {
        let mut entry = entry.map_err(|e| Error::Metadata { message: e.to_string() })?;
        let raw_path = entry
            .path()
            .map_err(|e| Error::Metadata { message: e.to_string() })?
            .to_path_buf();
        let rel = strip_leading_dot(&raw_path);
        if rel.as_os_str().is_empty() {
            continue;
        }

        if let Some(redirect) = mmpack_redirect(&rel, pkgname) {
            let Some(target_rel) = redirect else { continue };
            let target = prefix.join(&target_rel);
            write_regular_file(&mut entry, &target)?;
            let sha256 = hash_file(&target)?;
            records.push(FileRecord {
                path: target_rel.to_string_lossy().replace('\\', "/"),
                sha256: Some(sha256),
            });
            continue;
        }

        let target = prefix.join(&rel);
        match entry.header().entry_type() {
            EntryType::Directory => {
                fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
                let mut perms = fs::metadata(&target)
                    .map_err(|e| Error::io(&target, e))?
                    .permissions();
                set_unix_mode(&mut perms, 0o777);
                let _ = fs::set_permissions(&target, perms);
                records.push(FileRecord {
                    path: format!("{}/", rel.to_string_lossy().replace('\\', "/")),
                    sha256: None,
                });
            }
            EntryType::Symlink => {
                let link_target = entry
                    .link_name()
                    .map_err(|e| Error::Metadata { message: e.to_string() })?
                    .ok_or_else(|| Error::Metadata {
                        message: format!("symlink entry {} has no target", rel.display()),
                    })?
                    .into_owned();
                remove_existing(&target)?;
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
                }
                symlink(&link_target, &target)?;
            }
            _ => {
                write_regular_file(&mut entry, &target)?;
                let mode = entry.header().mode().unwrap_or(0o644);
                apply_mode(&target, mode)?;
                let sha256 = hash_file(&target)?;
                records.push(FileRecord {
                    path: rel.to_string_lossy().replace('\\', "/"),
                    sha256: Some(sha256),
                });
            }
        }
    }
    Ok(())
}

/// Strip the archive's `./` path prefix.
fn strip_leading_dot(path: &Path) -> PathBuf {
    path.strip_prefix(".").map_or_else(|_| path.to_path_buf(), Path::to_path_buf)
}

/// `None` if this isn't an `MMPACK/` entry at all. `Some(None)` if it is
/// one that's never extracted (`MMPACK/` itself, `MMPACK/info`).
/// `Some(Some(path))` with the redirected destination otherwise.
fn mmpack_redirect(rel: &Path, pkgname: &str) -> Option<Option<PathBuf>> {
    let mut components = rel.components();
    let first = components.next()?;
    if first.as_os_str() != "MMPACK" {
        return None;
    }
    let rest: PathBuf = components.collect();
    if rest.as_os_str().is_empty() {
        return Some(None);
    }
    if rest == Path::new("info") {
        return Some(None);
    }
    let basename = rest.to_string_lossy();
    Some(Some(
        Path::new("var/lib/mmpack/metadata").join(format!("{pkgname}.{basename}")),
    ))
}

fn write_regular_file<R: Read>(entry: &mut tar::Entry<'_, R>, target: &Path) -> Result<()> {
    remove_existing(target)?;
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    let mut out = File::create(target).map_err(|e| Error::io(target, e))?;
    std::io::copy(entry, &mut out).map_err(|e| Error::io(target, e))?;
    Ok(())
}

fn remove_existing(target: &Path) -> Result<()> {
    match fs::symlink_metadata(target) {
        Ok(_) => fs::remove_file(target).map_err(|e| Error::io(target, e)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io(target, e)),
    }
}

fn hash_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).map_err(|e| Error::io(path, e))?;
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| Error::io(path, e))
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

#[cfg(unix)]
fn set_unix_mode(perms: &mut fs::Permissions, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    perms.set_mode(mode);
}

#[cfg(not(unix))]
fn set_unix_mode(_perms: &mut fs::Permissions, _mode: u32) {}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link).map_err(|e| Error::io(link, e))
}

#[cfg(not(unix))]
fn symlink(target: &Path, link: &Path) -> Result<()> {
    std::os::windows::fs::symlink_file(target, link).map_err(|e| Error::io(link, e))
}

/// Write `var/lib/mmpack/metadata/<pkgname>.sha256sums`. One line per
/// regular file or directory: `<relative-path>: sha256 <64-hex-chars>`
/// for files, `<relative-path>/:` (no hash) for directories. Paths
/// longer than 512 bytes are a format error.
fn write_sha256sums(prefix: &Path, pkgname: &str, records: &[FileRecord]) -> Result<()> {
    let path = metadata_path(prefix, pkgname, "sha256sums");
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    let mut out = String::new();
    for record in records {
        if record.path.len() > 512 {
            return Err(Error::Metadata {
                message: format!("path '{}' exceeds 512 bytes", record.path),
            });
        }
        match &record.sha256 {
            Some(sha256) => out.push_str(&format!("{}: sha256 {sha256}\n", record.path)),
            None => out.push_str(&format!("{}:\n", record.path)),
        }
    }
    fs::write(&path, out).map_err(|e| Error::io(&path, e))
}

/// A single parsed line of a `sha256sums` file: a relative path, and the
/// digest if the entry is a regular file (directories have none).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sha256Entry {
    /// Path relative to the prefix root.
    pub path: String,
    /// Hex digest, `None` for directory entries (trailing `/`).
    pub sha256: Option<String>,
}

impl Sha256Entry {
    /// True if this entry denotes a directory (trailing `/`), which the
    /// executor skips during removal.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.path.ends_with('/')
    }
}

/// Read and parse `var/lib/mmpack/metadata/<pkgname>.sha256sums`.
pub fn read_sha256sums(prefix: &Path, pkgname: &str) -> Result<Vec<Sha256Entry>> {
    let path = metadata_path(prefix, pkgname, "sha256sums");
    let raw = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
    let mut entries = Vec::new();
    for line in raw.lines() {
        if line.is_empty() {
            continue;
        }
        let Some((path_part, rest)) = line.split_once(':') else {
            return Err(Error::Metadata {
                message: format!("malformed sha256sums line: {line}"),
            });
        };
        if path_part.len() > 512 {
            return Err(Error::Metadata {
                message: format!("path '{path_part}' exceeds 512 bytes"),
            });
        }
        let rest = rest.trim();
        let sha256 = if rest.is_empty() {
            None
        } else {
            Some(
                rest.strip_prefix("sha256 ")
                    .ok_or_else(|| Error::Metadata {
                        message: format!("malformed sha256sums line: {line}"),
                    })?
                    .to_string(),
            )
        };
        entries.push(Sha256Entry {
            path: path_part.to_string(),
            sha256,
        });
    }
    Ok(entries)
}

/// Remove the metadata directory entry for `pkgname` (all
/// `var/lib/mmpack/metadata/<pkgname>.*` files), used once the
/// executor has finished unlinking installed content.
pub fn remove_metadata(prefix: &Path, pkgname: &str) -> Result<()> {
    let dir = prefix.join("var/lib/mmpack/metadata");
    if !dir.exists() {
        return Ok(());
    }
    let prefix_name = format!("{pkgname}.");
    for entry in fs::read_dir(&dir).map_err(|e| Error::io(&dir, e))? {
        let entry = entry.map_err(|e| Error::io(&dir, e))?;
        if entry
            .file_name()
            .to_str()
            .is_some_and(|n| n.starts_with(&prefix_name))
        {
            let _ = fs::remove_file(entry.path());
        }
    }
    Ok(())
}

/// Pack `src_dir` (optionally preceded by an `MMPACK/` metadata tree) into
/// an `.mpk` archive at `dest_path`, used by test fixtures to build
/// archives without depending on a real repository. Entries are written
/// with the `./` prefix the extractor expects.
pub fn pack(src_dir: &Path, dest_path: &Path, compression: Compression) -> Result<()> {
    let file = File::create(dest_path).map_err(|e| Error::io(dest_path, e))?;
    match compression {
        Compression::Gzip => {
            let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            pack_entries(src_dir, encoder)
        }
        Compression::Zstd => {
            let encoder = zstd::stream::write::Encoder::new(file, 0)
                .map_err(|e| Error::io(dest_path, e))?
                .auto_finish();
            pack_entries(src_dir, encoder)
        }
    }
}

fn pack_entries<W: Write>(src_dir: &Path, writer: W) -> Result<()> {
    let mut builder = tar::Builder::new(writer);
    for entry in walkdir::WalkDir::new(src_dir).min_depth(1) {
        let entry = entry.map_err(|e| Error::Metadata { message: e.to_string() })?;
        let rel = entry
            .path()
            .strip_prefix(src_dir)
            .expect("walkdir yields children of src_dir");
        let archive_path = Path::new(".").join(rel);
        if entry.file_type().is_dir() {
            builder
                .append_dir(&archive_path, entry.path())
                .map_err(|e| Error::io(entry.path(), e))?;
        } else {
            let mut file = File::open(entry.path()).map_err(|e| Error::io(entry.path(), e))?;
            builder
                .append_file(&archive_path, &mut file)
                .map_err(|e| Error::io(entry.path(), e))?;
        }
    }
    builder
        .finish()
        .map_err(|e| Error::Metadata { message: e.to_string() })?;
    Ok(())
}
