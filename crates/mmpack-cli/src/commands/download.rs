//! `mmpack download` — fetch a package's archive without installing it.

use clap::Args;
use mmpack_core::error::{Error, Result};
use mmpack_core::version::VersionConstraint;
use mmpack_downloader::progress::IndicatifSink;

use crate::context::Context;

/// Arguments for `mmpack download`.
#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Package to fetch, as `name` or `name=version`.
    pub package: String,
}

/// Run `mmpack download`: resolve the latest matching candidate and
/// fetch its archive into the current directory, verified against the
/// index's recorded SHA-256.
pub fn run(ctx: &Context, args: &DownloadArgs) -> Result<()> {
    let index = ctx.repositories.load_index()?;
    let (name, version) = super::parse_pkg_spec(&args.package);
    let range = version.as_deref().map_or_else(VersionConstraint::any, |v| VersionConstraint::from_raw(v, v));

    let pkg = index.get_latest(&name, &range).ok_or_else(|| Error::UnknownPackage { name: name.clone() })?;

    let base = ctx.repositories.base_url(pkg.repo_index).ok_or_else(|| Error::Metadata {
        message: format!("'{}' references an unknown repository index {}", pkg.name, pkg.repo_index),
    })?;
    let url = format!("{}/{}", base.trim_end_matches('/'), pkg.filename);
    let dest = std::env::current_dir()
        .map_err(|e| Error::io(".", e))?
        .join(&pkg.filename);

    let progress = IndicatifSink::default();
    ctx.downloader.download_verified(&url, &dest, &pkg.name, &pkg.sha256, &progress)?;
    println!("Downloaded {} ({}) to {}", pkg.name, pkg.version, dest.display());
    Ok(())
}
