//! mmpack — a relocatable binary package manager.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod commands;
mod context;
mod executor;
mod output;

use std::process::ExitCode;

use clap::Parser;
use commands::{Cli, Commands};
use context::Context;
use tracing::Level;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 if cli.quiet => Level::ERROR,
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let ctx = match Context::new(&cli.config, cli.prefix.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("mmpack: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run_command(&cli, &ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("mmpack: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_command(cli: &Cli, ctx: &Context) -> mmpack_core::error::Result<()> {
    match &cli.command {
        Commands::Install(args) => commands::install::run(ctx, args),
        Commands::Remove(args) => commands::remove::run(ctx, args),
        Commands::Update(args) => commands::update::run(ctx, args),
        Commands::Download(args) => commands::download::run(ctx, args),
        Commands::Source(args) => commands::source::run(ctx, args),
        Commands::List(args) => commands::list::run(ctx, args),
    }
}
