//! The ordered plan handed from solver/remove-planner to the executor.

use std::fmt;
use std::path::PathBuf;

use mmpack_index::Pkg;

/// What an [`Action`] does to the installed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Install `pkg`, fetching and extracting its archive if needed.
    InstallPkg,
    /// Remove `pkg`, using its recorded `sha256sums` file list.
    RemovePkg,
}

/// A single planned install or removal.
#[derive(Debug, Clone)]
pub struct Action {
    /// Whether this installs or removes `pkg`.
    pub kind: ActionKind,
    /// The package involved.
    pub pkg: Pkg,
    /// Filled in by the executor once the archive has been
    /// downloaded/located; `None` before that point.
    pub pathname: Option<PathBuf>,
}

impl Action {
    /// An install action for `pkg`, with no archive path resolved yet.
    #[must_use]
    pub fn install(pkg: Pkg) -> Self {
        Self {
            kind: ActionKind::InstallPkg,
            pkg,
            pathname: None,
        }
    }

    /// A removal action for `pkg`.
    #[must_use]
    pub fn remove(pkg: Pkg) -> Self {
        Self {
            kind: ActionKind::RemovePkg,
            pkg,
            pathname: None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.kind {
            ActionKind::InstallPkg => "INSTALL",
            ActionKind::RemovePkg => "REMOVE",
        };
        write!(f, "{verb}: {} ({})", self.pkg.name, self.pkg.version)
    }
}

/// An ordered, growable plan of actions, consumed strictly in order by
/// the executor.
#[derive(Debug, Clone, Default)]
pub struct ActionStack {
    actions: Vec<Action>,
}

impl ActionStack {
    /// An empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a stack from an already-ordered list of actions.
    #[must_use]
    pub fn from_actions(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    /// Append one action.
    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// The actions, in application order.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// How many actions this stack holds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// True if the stack has no actions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Whether a confirmation prompt should be shown before executing.
    ///
    /// Mirrors `confirm_action_stack_if_needed`: nothing to confirm when
    /// the stack is empty, and no prompt needed when the stack is
    /// exactly the set of packages the user asked for (no extra
    /// dependencies pulled in, no conflicts resolved).
    #[must_use]
    pub fn needs_confirmation(&self, num_requested: usize) -> bool {
        !self.is_empty() && self.actions.len() != num_requested
    }
}

impl fmt::Display for ActionStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.actions.is_empty() {
            return write!(f, "Nothing to do.");
        }
        for (i, action) in self.actions.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{action}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmpack_core::version::Version;

    fn pkg(name: &str) -> Pkg {
        Pkg {
            name_id: 0,
            name: name.to_string(),
            version: Version::new("1.0.0"),
            source: String::new(),
            filename: String::new(),
            sha256: String::new(),
            repo_index: 0,
            sysdeps: Vec::new(),
            deps: Vec::new(),
        }
    }

    #[test]
    fn empty_stack_never_needs_confirmation() {
        let stack = ActionStack::new();
        assert!(!stack.needs_confirmation(0));
        assert_eq!(stack.to_string(), "Nothing to do.");
    }

    #[test]
    fn exact_match_to_request_count_skips_confirmation() {
        let mut stack = ActionStack::new();
        stack.push(Action::install(pkg("a")));
        assert!(!stack.needs_confirmation(1));
    }

    #[test]
    fn extra_actions_beyond_request_need_confirmation() {
        let mut stack = ActionStack::new();
        stack.push(Action::install(pkg("a")));
        stack.push(Action::install(pkg("b")));
        assert!(stack.needs_confirmation(1));
    }

    #[test]
    fn display_lists_install_and_remove() {
        let mut stack = ActionStack::new();
        stack.push(Action::install(pkg("a")));
        stack.push(Action::remove(pkg("b")));
        let rendered = stack.to_string();
        assert!(rendered.contains("INSTALL: a (1.0.0)"));
        assert!(rendered.contains("REMOVE: b (1.0.0)"));
    }
}
