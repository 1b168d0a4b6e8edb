//! `mmpack source` — fetch a package's companion source archive.
//!
//! Grounded on `original_source/src/mmpack/mmpack-source.c`:
//! `mmpack_source`/`download_pkg_sources`. The source archive is not
//! named by the index (it carries no `sha256` for it), so this fetch is
//! unverified; it is named `<pkg.source>_<version>_src.tar.gz` and
//! served from the same repository as the binary package.

use clap::Args;
use mmpack_core::error::{Error, Result};
use mmpack_core::version::VersionConstraint;
use mmpack_downloader::progress::IndicatifSink;

use crate::context::Context;

/// Arguments for `mmpack source`.
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Package whose source to fetch, as `name` or `name=version`.
    pub package: String,
}

/// Run `mmpack source`: resolve the latest matching candidate and fetch
/// its companion source archive into the current directory.
pub fn run(ctx: &Context, args: &SourceArgs) -> Result<()> {
    let index = ctx.repositories.load_index()?;
    let (name, version) = super::parse_pkg_spec(&args.package);
    let range = version.as_deref().map_or_else(VersionConstraint::any, |v| VersionConstraint::from_raw(v, v));

    let pkg = index.get_latest(&name, &range).ok_or_else(|| Error::UnknownPackage { name: name.clone() })?;

    let base = ctx.repositories.base_url(pkg.repo_index).ok_or_else(|| Error::Metadata {
        message: format!("'{}' references an unknown repository index {}", pkg.name, pkg.repo_index),
    })?;
    let source_filename = format!("{}_{}_src.tar.gz", pkg.source, pkg.version);
    let url = format!("{}/{}", base.trim_end_matches('/'), source_filename);
    let dest = std::env::current_dir()
        .map_err(|e| Error::io(".", e))?
        .join(&source_filename);

    let progress = IndicatifSink::default();
    ctx.downloader.download(&url, &dest, &progress)?;
    println!("Downloaded {} to {}", source_filename, dest.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_filename_matches_convention() {
        // pkg.source is the upstream source package name, not a URL;
        // the archive name embeds it alongside the resolved version.
        let name = format!("{}_{}_src.tar.gz", "hello", "1.0.0");
        assert_eq!(name, "hello_1.0.0_src.tar.gz");
    }
}
