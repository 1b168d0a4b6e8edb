//! Pre-execution plan printing, confirmation prompt, and per-package
//! progress — the user-visible side of the executor contract.

use console::style;
use dialoguer::Confirm;
use mmpack_core::error::{Error, Result};
use mmpack_solver::{ActionKind, ActionStack};

/// Print the action stack and, unless `assume_yes` is set or no
/// confirmation is needed (empty stack, or exactly the packages the
/// user requested with no extra dependency/conflict resolution),
/// prompt the user. Returns `Err(Error::Denied)` on a "no" answer.
pub fn confirm(stack: &ActionStack, num_requested: usize, assume_yes: bool) -> Result<()> {
    if stack.is_empty() {
        println!("Nothing to do.");
        return Ok(());
    }

    println!("{stack}");

    if assume_yes || !stack.needs_confirmation(num_requested) {
        return Ok(());
    }

    let proceed = Confirm::new()
        .with_prompt("Proceed?")
        .default(true)
        .interact()
        .unwrap_or(false);

    if proceed {
        Ok(())
    } else {
        Err(Error::Denied)
    }
}

/// One-line progress line for a single action, printed as the executor
/// reaches it.
pub fn announce(kind: ActionKind, name: &str, version: &str) {
    let verb = match kind {
        ActionKind::InstallPkg => "Installing",
        ActionKind::RemovePkg => "Removing",
    };
    print!("{verb} {} ({version})... ", style(name).bold());
}

/// Print the outcome of the action [`announce`]d just before.
pub fn announce_result(ok: bool) {
    if ok {
        println!("{}", style("OK").green());
    } else {
        println!("{}", style("Failed!").red());
    }
}
