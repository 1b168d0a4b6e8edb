//! System-dependency presence checks.
//!
//! Some packages declare OS-level prerequisites ("sysdeps") that mmpack
//! itself does not install — e.g. a shared library expected to already be
//! provided by the distribution's own package manager. Before an action
//! stack is applied, the union of `sysdeps` across every `INSTALL_PKG`
//! action must be checked, grounded on `check_new_sysdeps` /
//! `check_sysdeps_installed` in the original `pkg-fs-utils.c`: collect
//! the set first, then query the host's package database once per name.

use std::process::Command;

/// Query backend used to decide whether a named system dependency is
/// present. Kept as a narrow trait so tests can supply a fake backend
/// without shelling out.
pub trait SysdepChecker {
    /// Return true if `name` is known to be installed on the host.
    fn is_installed(&self, name: &str) -> bool;
}

/// Default backend: tries `dpkg -s` then `rpm -q`. Names it cannot
/// classify (neither package manager is present, or both report
/// "unknown") are treated as present rather than blocking unrelated
/// installs, matching the executor's fail-open stance on this
/// best-effort check.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostSysdepChecker;

impl SysdepChecker for HostSysdepChecker {
    fn is_installed(&self, name: &str) -> bool {
        if let Ok(status) = Command::new("dpkg").args(["-s", name]).status() {
            return status.success();
        }
        if let Ok(status) = Command::new("rpm").args(["-q", name]).status() {
            return status.success();
        }
        true
    }
}

/// Return the subset of `names` that the checker reports as missing,
/// deduplicated and in first-seen order.
pub fn missing<C: SysdepChecker>(checker: &C, names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for name in names {
        if !seen.insert(name.clone()) {
            continue;
        }
        if !checker.is_installed(&name) {
            out.push(name);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeChecker {
        present: Vec<&'static str>,
    }

    impl SysdepChecker for FakeChecker {
        fn is_installed(&self, name: &str) -> bool {
            self.present.contains(&name)
        }
    }

    #[test]
    fn missing_reports_only_absent_names() {
        let checker = FakeChecker {
            present: vec!["libfoo"],
        };
        let result = missing(
            &checker,
            ["libfoo".to_string(), "libbar".to_string()],
        );
        assert_eq!(result, vec!["libbar".to_string()]);
    }

    #[test]
    fn missing_deduplicates_names() {
        let checker = FakeChecker { present: vec![] };
        let result = missing(
            &checker,
            ["libbar".to_string(), "libbar".to_string()],
        );
        assert_eq!(result, vec!["libbar".to_string()]);
    }
}
