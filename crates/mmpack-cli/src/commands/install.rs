//! `mmpack install`

use clap::Args;
use mmpack_core::error::Result;
use mmpack_downloader::progress::IndicatifSink;
use mmpack_solver::request::{compdeps_from_reqlist, PkgRequest};

use crate::context::Context;

/// Arguments for `mmpack install`.
#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Packages to install, as `name` or `name=version`.
    #[arg(required = true)]
    pub packages: Vec<String>,

    /// Skip the confirmation prompt.
    #[arg(short = 'y', long = "assume-yes")]
    pub assume_yes: bool,
}

/// Run `mmpack install`.
pub fn run(ctx: &Context, args: &InstallArgs) -> Result<()> {
    let index = ctx.repositories.load_index()?;
    let mut state = ctx.load_install_state()?;

    let requests: Vec<PkgRequest> = args
        .packages
        .iter()
        .map(|spec| {
            let (name, version) = super::parse_pkg_spec(spec);
            version.map_or_else(|| PkgRequest::any(name.clone()), |v| PkgRequest::pinned(name, v))
        })
        .collect();

    let compiled = compdeps_from_reqlist(&index, &requests)?;
    let stack = mmpack_solver::solve(&index, &state, compiled)?;

    crate::output::confirm(&stack, requests.len(), args.assume_yes)?;
    if stack.is_empty() {
        return Ok(());
    }

    let progress = IndicatifSink::default();
    crate::executor::apply(
        &stack,
        &ctx.prefix,
        &ctx.downloader,
        &ctx.repositories,
        &ctx.archive_cache_dir(),
        &mut state,
        &ctx.installed_list_path(),
        &progress,
    )
}
