//! `mmpack update`

use clap::Args;
use mmpack_core::error::Result;

use crate::context::Context;

/// Arguments for `mmpack update`.
#[derive(Args, Debug)]
pub struct UpdateArgs {}

/// Run `mmpack update`: refresh every configured repository's index.
pub fn run(ctx: &Context, _args: &UpdateArgs) -> Result<()> {
    for repo in ctx.repositories.repositories() {
        println!("Updating {}...", repo.name);
    }
    ctx.repositories.update(&ctx.downloader)
}
