//! `mmpack list` — print the currently-installed package set.
//!
//! Not among install/remove/update/download/source, but trivial: it
//! reads straight off [`mmpack_solver::InstallState`] with no new
//! subsystem, in the same spirit as `mmpack-list.c`'s plain iteration
//! over the installed list.

use clap::Args;
use mmpack_core::error::Result;

use crate::context::Context;

/// Arguments for `mmpack list`.
#[derive(Args, Debug)]
pub struct ListArgs {}

/// Run `mmpack list`: print every installed package, one per line, name
/// and version, sorted alphabetically for stable output.
pub fn run(ctx: &Context, _args: &ListArgs) -> Result<()> {
    let state = ctx.load_install_state()?;
    let mut pkgs: Vec<_> = state.iter().collect();
    pkgs.sort_by(|a, b| a.name.cmp(&b.name));

    if pkgs.is_empty() {
        println!("No packages installed.");
        return Ok(());
    }

    for pkg in pkgs {
        println!("{} ({})", pkg.name, pkg.version);
    }
    Ok(())
}
