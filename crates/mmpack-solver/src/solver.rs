//! The backtracking solver: turns a compiled dependency list into an
//! ordered sequence of STAGE/INSTALL operations.
//!
//! This is a direct port of the five-state search (VALIDATION →
//! SELECTION → INSTALL_DEPS → NEXT, with BACKTRACK on contradiction or
//! exhaustion) described for the reference implementation. The source
//! threads bare pointers through growing arenas with an intrusive
//! `prev_snapshot_size` chain; here each `Op` carries the prior lookup-table
//! value it overwrote, so undo is a direct replay instead of arena
//! bookkeeping — a safe substitute for the same rewindability contract
//! (truncate `ops_stack` to a saved length, restore `proc_stack` and the
//! current frame, bump `ipkg`, retry).

use std::collections::HashMap;
use std::rc::Rc;

use mmpack_core::error::{Error, Result};
use mmpack_index::{BinIndex, CompDep, Pkg};

use crate::action_stack::{Action, ActionStack};
use crate::install_state::InstallState;

/// A single committed or tentative change to the lookup tables, enough
/// on its own to be undone during backtrack and, for `Install`, to be
/// replayed into the final action stack. This implementation never
/// emits a `REMOVE` op: the displaced-install ambiguity noted for the
/// VALIDATION step means an installed-but-mismatched package is always
/// staged over, never explicitly removed first (removal planning for
/// `mmpack remove` is a separate, unrelated traversal in `remove.rs`).
#[derive(Debug, Clone)]
enum Op {
    Stage {
        name_id: usize,
        prev: Option<Pkg>,
    },
    Install {
        name_id: usize,
        pkg: Pkg,
        prev: Option<Pkg>,
    },
}

/// One active dependency-list walk. `deps` is shared (via `Rc`) between
/// a frame and any decision snapshot that captured it, so backtracking
/// never needs to re-walk or re-clone the underlying `CompDep` list.
#[derive(Debug, Clone)]
struct Frame {
    deps: Rc<[CompDep]>,
    dep_idx: usize,
    ipkg: usize,
}

impl Frame {
    fn new(deps: Vec<CompDep>) -> Self {
        Self {
            deps: deps.into(),
            dep_idx: 0,
            ipkg: 0,
        }
    }

    fn current_dep(&self) -> Option<&CompDep> {
        self.deps.get(self.dep_idx)
    }
}

/// A decision snapshot: everything needed to retry the alternative
/// candidate at a SELECTION point.
#[derive(Debug, Clone)]
struct Snapshot {
    ops_len: usize,
    proc_stack: Vec<Frame>,
    current: Frame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Validation,
    Selection,
    InstallDeps,
    Next,
    Backtrack,
}

/// Run the solver: given the compiled dependency list for a user
/// request, produce an ordered action stack, or `Unsatisfiable` if no
/// combination of candidates satisfies every constraint.
pub fn solve(index: &BinIndex, install_state: &InstallState, initial_deps: Vec<CompDep>) -> Result<ActionStack> {
    if initial_deps.is_empty() {
        return Ok(ActionStack::new());
    }

    let mut inst_lut: HashMap<usize, Pkg> = install_state.fill_lookup_table(index);
    let mut stage_lut: HashMap<usize, Pkg> = HashMap::new();
    let mut ops_stack: Vec<Op> = Vec::new();
    let mut decision_stack: Vec<Snapshot> = Vec::new();
    let mut proc_stack: Vec<Frame> = Vec::new();
    let mut current = Frame::new(initial_deps);
    let mut state = State::Validation;

    loop {
        state = match state {
            State::Validation => step_validation(&current, &stage_lut, &inst_lut),
            State::Selection => {
                step_selection(&mut current, &mut stage_lut, &mut ops_stack, &mut decision_stack, &mut proc_stack)
            }
            State::InstallDeps => step_install_deps(
                index,
                &mut current,
                &stage_lut,
                &mut proc_stack,
            )?,
            State::Next => step_next(&mut current, &mut proc_stack, &mut ops_stack, &mut inst_lut),
            State::Backtrack => {
                match backtrack(&mut decision_stack, &mut ops_stack, &mut stage_lut, &mut inst_lut) {
                    Some((new_current, new_proc_stack)) => {
                        current = new_current;
                        proc_stack = new_proc_stack;
                        State::Validation
                    }
                    None => return Err(Error::Unsatisfiable),
                }
            }
        };

        if state == State::Next && current.dep_idx >= current.deps.len() && proc_stack.is_empty() {
            return Ok(finalize(ops_stack));
        }
    }
}

/// VALIDATION: decide whether the current dependency is already
/// satisfied, needs a fresh selection, or contradicts an earlier
/// decision.
fn step_validation(current: &Frame, stage_lut: &HashMap<usize, Pkg>, inst_lut: &HashMap<usize, Pkg>) -> State {
    let Some(dep) = current.current_dep() else {
        return State::Next;
    };

    if dep.is_unsatisfiable() {
        return State::Backtrack;
    }

    if let Some(staged) = stage_lut.get(&dep.pkgname_id) {
        return if dep.pkg_match(staged) {
            State::Next
        } else {
            State::Backtrack
        };
    }

    if let Some(installed) = inst_lut.get(&dep.pkgname_id) {
        if dep.pkg_match(installed) {
            return State::Next;
        }
        // Ambiguity preserved as specified: an installed-but-mismatched
        // package proceeds straight to SELECTION, with no REMOVE ever
        // queued for the displaced version.
    }

    State::Selection
}

/// SELECTION: save a decision snapshot if an untried alternative
/// remains, then stage the current candidate.
fn step_selection(
    current: &mut Frame,
    stage_lut: &mut HashMap<usize, Pkg>,
    ops_stack: &mut Vec<Op>,
    decision_stack: &mut Vec<Snapshot>,
    proc_stack: &mut [Frame],
) -> State {
    let dep = current.current_dep().expect("validated non-empty dep list");

    if current.ipkg >= dep.pkgs.len() {
        return State::Backtrack;
    }

    if current.ipkg < dep.pkgs.len() - 1 {
        decision_stack.push(Snapshot {
            ops_len: ops_stack.len(),
            proc_stack: proc_stack.to_vec(),
            current: current.clone(),
        });
    }

    let pkg = dep.pkgs[current.ipkg].clone();
    let name_id = dep.pkgname_id;
    let prev = stage_lut.insert(name_id, pkg.clone());
    ops_stack.push(Op::Stage { name_id, prev });

    State::InstallDeps
}

/// INSTALL_DEPS: resolve the staged candidate's own dependencies. If it
/// has none, commit it immediately; otherwise descend into a child
/// frame walking its dependency list.
fn step_install_deps(
    index: &BinIndex,
    current: &mut Frame,
    stage_lut: &HashMap<usize, Pkg>,
    proc_stack: &mut Vec<Frame>,
) -> Result<State> {
    let dep = current.current_dep().expect("validated non-empty dep list");
    let pkg = stage_lut
        .get(&dep.pkgname_id)
        .expect("just staged in SELECTION")
        .clone();

    let child_deps = match index.compile_pkgdeps(&pkg) {
        Ok(deps) => deps,
        // A selected candidate declaring a dependency on an unknown
        // name is this branch's failure, not a hard abort: let the
        // solver try another candidate.
        Err(Error::UnknownPackage { .. }) => return Ok(State::Backtrack),
        Err(other) => return Err(other),
    };

    // Always push and descend, even when `child_deps` is empty: NEXT's
    // pop-and-finalize step is what commits this package's INSTALL, and
    // it only runs when a frame is popped off `proc_stack`.
    proc_stack.push(current.clone());
    *current = Frame::new(child_deps);
    Ok(State::Validation)
}

/// NEXT: advance past the current dependency entry; when a frame's
/// entire list is exhausted, finalize the parent's staged package (or
/// terminate if none remains).
fn step_next(
    current: &mut Frame,
    proc_stack: &mut Vec<Frame>,
    ops_stack: &mut Vec<Op>,
    inst_lut: &mut HashMap<usize, Pkg>,
) -> State {
    current.dep_idx += 1;

    if current.dep_idx < current.deps.len() {
        // A sibling dependency always starts its own SELECTION from
        // candidate 0, even if an earlier dependency in this same frame
        // left `ipkg` advanced by a backtrack. The backtrack-resume path
        // (the `Backtrack` arm) restores its own saved `ipkg` directly
        // and never passes through here, so this reset can't clobber it.
        current.ipkg = 0;
        return State::Validation;
    }

    let Some(parent) = proc_stack.pop() else {
        return State::Next;
    };

    let dep = parent
        .current_dep()
        .expect("parent frame was mid-selection when it pushed a child");
    let name_id = dep.pkgname_id;
    let pkg = dep.pkgs[parent.ipkg].clone();
    let prev = inst_lut.insert(name_id, pkg.clone());
    ops_stack.push(Op::Install { name_id, pkg, prev });

    *current = parent;
    State::Next
}

/// BACKTRACK: pop the most recent decision snapshot, undo everything
/// recorded since, and retry with the next candidate. Returns `None` if
/// there is no snapshot left, meaning the request is unsatisfiable.
fn backtrack(
    decision_stack: &mut Vec<Snapshot>,
    ops_stack: &mut Vec<Op>,
    stage_lut: &mut HashMap<usize, Pkg>,
    inst_lut: &mut HashMap<usize, Pkg>,
) -> Option<(Frame, Vec<Frame>)> {
    let snapshot = decision_stack.pop()?;

    for op in ops_stack.drain(snapshot.ops_len..).rev() {
        match op {
            Op::Stage { name_id, prev } => {
                set_or_remove(stage_lut, name_id, prev);
            }
            Op::Install { name_id, prev, .. } => {
                set_or_remove(inst_lut, name_id, prev);
            }
        }
    }

    let mut current = snapshot.current;
    current.ipkg += 1;
    Some((current, snapshot.proc_stack))
}

fn set_or_remove(table: &mut HashMap<usize, Pkg>, name_id: usize, prev: Option<Pkg>) {
    match prev {
        Some(pkg) => {
            table.insert(name_id, pkg);
        }
        None => {
            table.remove(&name_id);
        }
    }
}

/// Walk the committed ops log bottom-to-top, discarding STAGE entries
/// and mapping INSTALL into the action stack. Order is preserved: a
/// package is only committed after its own dependency sub-walk has
/// returned, which makes install order topological.
fn finalize(ops_stack: Vec<Op>) -> ActionStack {
    let actions = ops_stack
        .into_iter()
        .filter_map(|op| match op {
            Op::Stage { .. } => None,
            Op::Install { pkg, .. } => Some(Action::install(pkg)),
        })
        .collect();
    ActionStack::from_actions(actions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmpack_core::version::Version;
    use mmpack_index::RawDep;

    fn any_dep(name: &str) -> RawDep {
        RawDep {
            name: name.to_string(),
            min_version: "any".to_string(),
            max_version: "any".to_string(),
        }
    }

    fn range_dep(name: &str, min: &str, max: &str) -> RawDep {
        RawDep {
            name: name.to_string(),
            min_version: min.to_string(),
            max_version: max.to_string(),
        }
    }

    fn pkg(name: &str, version: &str, deps: Vec<RawDep>) -> Pkg {
        Pkg {
            name_id: 0,
            name: name.to_string(),
            version: Version::new(version),
            source: String::new(),
            filename: String::new(),
            sha256: String::new(),
            repo_index: 0,
            sysdeps: Vec::new(),
            deps,
        }
    }

    fn install_order(stack: &ActionStack) -> Vec<String> {
        stack
            .actions()
            .iter()
            .map(|a| format!("{}-{}", a.pkg.name, a.pkg.version))
            .collect()
    }

    #[test]
    fn s1_linear_chain() {
        let mut index = BinIndex::new();
        index.insert(pkg("C", "1", vec![]));
        index.insert(pkg("B", "1", vec![any_dep("C")]));
        index.insert(pkg("A", "1", vec![any_dep("B")]));

        let state = InstallState::new();
        let deps = crate::request::compdeps_from_reqlist(&index, &[crate::request::PkgRequest::any("A")]).unwrap();
        let stack = solve(&index, &state, deps).unwrap();

        assert_eq!(install_order(&stack), vec!["C-1", "B-1", "A-1"]);
    }

    #[test]
    fn s2_already_satisfied_skips_installed() {
        let mut index = BinIndex::new();
        index.insert(pkg("C", "1", vec![]));
        index.insert(pkg("B", "1", vec![any_dep("C")]));
        index.insert(pkg("A", "1", vec![any_dep("B")]));

        let mut state = InstallState::new();
        state.add(pkg("C", "1", vec![]));
        let deps = crate::request::compdeps_from_reqlist(&index, &[crate::request::PkgRequest::any("A")]).unwrap();
        let stack = solve(&index, &state, deps).unwrap();

        assert_eq!(install_order(&stack), vec!["B-1", "A-1"]);
    }

    #[test]
    fn s3_installed_mismatch_is_staged_over_not_backtracked() {
        // Index shape from the scenario this pins down: A-1 depends on
        // B (unconstrained, so B-2 is tried before B-1 per the
        // decreasing-version selection order); B-2 depends on C==1,
        // B-1 depends on C==2; C-2 is already installed.
        //
        // A naive "remove-then-reinstall" reading would expect the B-2
        // branch to conflict on C and backtrack to B-1 (which matches
        // the installed C-2). But the VALIDATION ambiguity this solver
        // faithfully reproduces (see `installed_mismatch_has_no_remove`)
        // means an installed-but-mismatched package is staged over
        // directly, with no REMOVE and no backtrack: the B-2 branch
        // succeeds by staging C-1 over the installed C-2.
        let mut index = BinIndex::new();
        index.insert(pkg("C", "1", vec![]));
        index.insert(pkg("C", "2", vec![]));
        index.insert(pkg("B", "2", vec![range_dep("C", "1", "1")]));
        index.insert(pkg("B", "1", vec![range_dep("C", "2", "2")]));
        index.insert(pkg("A", "1", vec![any_dep("B")]));

        let mut state = InstallState::new();
        state.add(pkg("C", "2", vec![]));
        let deps = crate::request::compdeps_from_reqlist(&index, &[crate::request::PkgRequest::any("A")]).unwrap();
        let stack = solve(&index, &state, deps).unwrap();

        assert_eq!(install_order(&stack), vec!["C-1", "B-2", "A-1"]);
    }

    #[test]
    fn s4_unsatisfiable_request_errors() {
        let mut index = BinIndex::new();
        index.insert(pkg("B", "2", vec![]));
        index.insert(pkg("A", "1", vec![range_dep("B", "1", "1")]));

        let state = InstallState::new();
        let err = crate::request::compdeps_from_reqlist(&index, &[crate::request::PkgRequest::any("A")])
            .and_then(|deps| solve(&index, &state, deps));
        assert!(err.is_err());
    }

    #[test]
    fn s3b_backtrack_on_staged_conflict_then_resolves() {
        // A depends on B (unconstrained: B-2 tried before B-1). B-2 pulls
        // in D==2, but only D-1 exists, so B-2's own subtree is
        // unsatisfiable and forces a backtrack all the way back to B's
        // decision point — with nothing installed yet, so this is a pure
        // staged-conflict backtrack, not the displaced-install ambiguity
        // `s3` pins down. B-1 pulls in C (unconstrained) instead, which
        // resolves cleanly.
        let mut index = BinIndex::new();
        index.insert(pkg("D", "1", vec![]));
        index.insert(pkg("C", "1", vec![]));
        index.insert(pkg("B", "2", vec![range_dep("D", "2", "2")]));
        index.insert(pkg("B", "1", vec![any_dep("C")]));
        index.insert(pkg("A", "1", vec![any_dep("B")]));

        let state = InstallState::new();
        let deps = crate::request::compdeps_from_reqlist(&index, &[crate::request::PkgRequest::any("A")]).unwrap();
        let stack = solve(&index, &state, deps).unwrap();

        assert_eq!(install_order(&stack), vec!["C-1", "B-1", "A-1"]);
    }

    #[test]
    fn sibling_dependency_resets_ipkg_after_earlier_backtrack() {
        // Regression for the stale-ipkg bug: P depends on [Q, R] in one
        // frame. Q has candidates [Q-2, Q-1]; Q-2 pulls in Z==2, which
        // nothing satisfies (only Z-1 exists), forcing a backtrack within
        // Q's own subtree that leaves Q's frame at ipkg=1 when it resumes
        // at Q-1. R has a single candidate. If the frame carried that
        // stale ipkg=1 into R's SELECTION, R would wrongly look
        // exhausted and the whole request would misreport Unsatisfiable
        // even though {Q-1, R-1} is a valid solution.
        let mut index = BinIndex::new();
        index.insert(pkg("Z", "1", vec![]));
        index.insert(pkg("Q", "2", vec![range_dep("Z", "2", "2")]));
        index.insert(pkg("Q", "1", vec![]));
        index.insert(pkg("R", "1", vec![]));
        index.insert(pkg("P", "1", vec![any_dep("Q"), any_dep("R")]));

        let state = InstallState::new();
        let deps = crate::request::compdeps_from_reqlist(&index, &[crate::request::PkgRequest::any("P")]).unwrap();
        let stack = solve(&index, &state, deps).unwrap();

        assert_eq!(install_order(&stack), vec!["Q-1", "R-1", "P-1"]);
    }

    #[test]
    fn idempotent_when_already_installed_at_matching_version() {
        let mut index = BinIndex::new();
        index.insert(pkg("A", "1", vec![]));

        let mut state = InstallState::new();
        state.add(pkg("A", "1", vec![]));
        let deps = crate::request::compdeps_from_reqlist(&index, &[crate::request::PkgRequest::any("A")]).unwrap();
        let stack = solve(&index, &state, deps).unwrap();

        assert!(stack.is_empty());
    }

    #[test]
    fn installed_mismatch_has_no_remove() {
        // Displaced-install ambiguity: staging a different version over
        // an installed one never emits a REMOVE for the displaced
        // package.
        let mut index = BinIndex::new();
        index.insert(pkg("A", "2", vec![]));

        let mut state = InstallState::new();
        state.add(pkg("A", "1", vec![]));
        let deps = crate::request::compdeps_from_reqlist(&index, &[crate::request::PkgRequest::any("A")]).unwrap();
        let stack = solve(&index, &state, deps).unwrap();

        assert_eq!(stack.len(), 1);
        assert_eq!(stack.actions()[0].kind, crate::action_stack::ActionKind::InstallPkg);
        assert_eq!(stack.actions()[0].pkg.version.to_string(), "2");
    }

    /// Backtrack soundness (spec property 4): replaying a random walk of
    /// STAGE/INSTALL ops and then undoing back to an earlier size must
    /// restore `inst_lut`/`stage_lut` to exactly what they were when
    /// `ops_stack` last had that size. Exercised directly against the
    /// `Op`/`set_or_remove` machinery `backtrack` itself uses, rather than
    /// through a full `solve()` call, so the walk can be arbitrary instead
    /// of constrained to a satisfiable dependency graph.
    mod backtrack_soundness {
        use super::*;
        use proptest::prelude::*;

        fn fake_pkg(name_id: usize, tag: u32) -> Pkg {
            pkg(&format!("n{name_id}"), &tag.to_string(), vec![])
        }

        /// One step of the random walk: stage or install a name at a
        /// fresh version tag, keyed to a small pool of name ids so
        /// staging/installing the same name repeatedly (overwriting a
        /// prior value) is exercised too.
        #[derive(Debug, Clone, Copy)]
        enum Step {
            Stage { name_id: usize, tag: u32 },
            Install { name_id: usize, tag: u32 },
        }

        fn step_strategy() -> impl Strategy<Value = Step> {
            prop_oneof![
                (0usize..4, any::<u32>()).prop_map(|(name_id, tag)| Step::Stage { name_id, tag }),
                (0usize..4, any::<u32>()).prop_map(|(name_id, tag)| Step::Install { name_id, tag }),
            ]
        }

        proptest! {
            #[test]
            fn prop_undo_restores_prior_tables(steps in prop::collection::vec(step_strategy(), 1..40), truncate_at in 0usize..40) {
                let mut ops_stack: Vec<Op> = Vec::new();
                let mut stage_lut: HashMap<usize, Pkg> = HashMap::new();
                let mut inst_lut: HashMap<usize, Pkg> = HashMap::new();

                // Snapshot both tables at every ops_stack length reached.
                let mut snapshots: Vec<(HashMap<usize, Pkg>, HashMap<usize, Pkg>)> =
                    vec![(stage_lut.clone(), inst_lut.clone())];

                for step in &steps {
                    match *step {
                        Step::Stage { name_id, tag } => {
                            let pkg = fake_pkg(name_id, tag);
                            let prev = stage_lut.insert(name_id, pkg.clone());
                            ops_stack.push(Op::Stage { name_id, prev });
                        }
                        Step::Install { name_id, tag } => {
                            let pkg = fake_pkg(name_id, tag);
                            let prev = inst_lut.insert(name_id, pkg.clone());
                            ops_stack.push(Op::Install { name_id, pkg, prev });
                        }
                    }
                    snapshots.push((stage_lut.clone(), inst_lut.clone()));
                }

                let target_len = truncate_at.min(ops_stack.len());

                for op in ops_stack.drain(target_len..).rev() {
                    match op {
                        Op::Stage { name_id, prev } => set_or_remove(&mut stage_lut, name_id, prev),
                        Op::Install { name_id, prev, .. } => set_or_remove(&mut inst_lut, name_id, prev),
                    }
                }

                let (expected_stage, expected_inst) = &snapshots[target_len];
                prop_assert_eq!(&stage_lut, expected_stage);
                prop_assert_eq!(&inst_lut, expected_inst);
            }
        }
    }
}
