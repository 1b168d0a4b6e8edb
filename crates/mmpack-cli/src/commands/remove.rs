//! `mmpack remove`

use clap::Args;
use mmpack_core::error::Result;
use mmpack_downloader::progress::NullSink;

use crate::context::Context;

/// Arguments for `mmpack remove`.
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Packages to remove, by name.
    #[arg(required = true)]
    pub packages: Vec<String>,

    /// Skip the confirmation prompt.
    #[arg(short = 'y', long = "assume-yes")]
    pub assume_yes: bool,
}

/// Run `mmpack remove`.
pub fn run(ctx: &Context, args: &RemoveArgs) -> Result<()> {
    let mut state = ctx.load_install_state()?;
    let stack = mmpack_solver::remove::plan_removal(&state, &args.packages);

    crate::output::confirm(&stack, args.packages.len(), args.assume_yes)?;
    if stack.is_empty() {
        return Ok(());
    }

    crate::executor::apply(
        &stack,
        &ctx.prefix,
        &ctx.downloader,
        &ctx.repositories,
        &ctx.archive_cache_dir(),
        &mut state,
        &ctx.installed_list_path(),
        &NullSink,
    )
}
