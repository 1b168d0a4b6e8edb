//! Reverse-dependency closure for `mmpack remove`.

use tracing::warn;

use crate::action_stack::{Action, ActionStack};
use crate::install_state::InstallState;

/// Plan the removal of `names` against `state`. Packages named but not
/// currently installed produce a warning, not an error. The returned
/// stack is in reverse-topological order: dependents are removed before
/// the packages they depend on.
#[must_use]
pub fn plan_removal(state: &InstallState, names: &[String]) -> ActionStack {
    let mut scratch = state.copy();
    let mut actions = Vec::new();
    for name in names {
        remove_one(&mut scratch, name, &mut actions);
    }
    ActionStack::from_actions(actions)
}

/// Recursive step: remove `name` and everything that depends on it from
/// `state`, appending actions in dependents-first order.
fn remove_one(state: &mut InstallState, name: &str, actions: &mut Vec<Action>) {
    let Some(pkg) = state.get(name).cloned() else {
        warn!(name, "requested package is not installed, skipping");
        return;
    };

    // Mark removed before recursing so a reverse-dependency cycle that
    // loops back to `name` short-circuits here instead of recursing
    // forever.
    state.remove(name);

    for rdep in state.rdeps(name) {
        remove_one(state, &rdep, actions);
    }

    actions.push(Action::remove(pkg));
}
