// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Dependency-gated topological rewrite scheduler.
//!
//! Ordering invariant:
//! - A commit is dequeued only after every one of its in-graph parents has a
//!   recorded rewritten identity. Single-parent children are enqueued
//!   directly; merge children are gated through a pending table whose
//!   waiting sets shrink as parents complete.
//! - Processing order among independent branches is unconstrained; the final
//!   rewrite map is order-independent because each commit's new parent list
//!   reads only entries already present when it is dequeued.

use std::collections::{BTreeMap, BTreeSet};

use graft_odb::{CommitId, CommitStore, OdbError};
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;
use tracing::{debug, trace};

use crate::reverse::ReverseGraph;
use crate::signed::SignedVariantIndex;

/// Errors emitted by the rewrite scheduler.
///
/// Every variant is fatal: the input graph is assumed static and internally
/// consistent, so there is no transient/retryable class and no
/// partial-success mode. A run either produces a complete
/// [`RewriteOutcome`] or aborts with no usable output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    /// A referenced commit identity is absent from the store.
    #[error(transparent)]
    Odb(#[from] OdbError),
    /// The rewrite target is not part of the reverse graph.
    #[error("[REWRITE_TARGET_OUTSIDE_GRAPH] {0}")]
    TargetOutsideGraph(CommitId),
    /// A child link referenced a commit the reverse graph never visited.
    ///
    /// Children are recorded only for visited commits, so this signals a
    /// corrupted graph, not bad caller input.
    #[error("[REWRITE_MISSING_REVERSE_NODE] {0}")]
    MissingReverseNode(CommitId),
    /// A commit was about to be recorded in the rewrite map twice.
    #[error("[REWRITE_ALREADY_REWRITTEN] {0}")]
    AlreadyRewritten(CommitId),
    /// A single-parent child was enqueued by a commit that is not its parent.
    #[error("[REWRITE_UNEXPECTED_PARENT] child {child} scheduled by non-parent {parent}")]
    UnexpectedParent {
        /// Child whose sole parent did not match.
        child: CommitId,
        /// Commit that attempted to schedule it.
        parent: CommitId,
    },
    /// The work queue drained while merge commits were still waiting.
    ///
    /// A residual waiting set indicates an unreachable parent or a bug in
    /// graph construction (or a true cycle, which the design assumes cannot
    /// occur).
    #[error("[REWRITE_RESIDUAL_PENDING] {count} commit(s) still waiting after drain")]
    ResidualPending {
        /// Number of commits left in the pending table.
        count: usize,
    },
}

/// Result of a completed history rewrite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteOutcome {
    /// Complete mapping from original identity to rewritten identity, one
    /// entry per rewritten commit, in ascending key order.
    pub rewritten: BTreeMap<CommitId, CommitId>,
    /// Labels of the start points whose ancestry was touched by the rewrite
    /// (reporting only; the target itself does not contribute).
    pub touched_labels: BTreeSet<String>,
}

/// A merge commit awaiting rewrite: the set of true parents whose rewritten
/// identities are not yet known. Removal is the sole mutation; the entry is
/// dropped the instant the set empties.
struct PendingCommit {
    waiting_on: BTreeSet<CommitId>,
}

/// Re-parents `target` and transitively rewrites every descendant reachable
/// through `graph`'s child links.
///
/// The target is rewritten first with `new_parents` (its true parents are
/// discarded; content and metadata are preserved). Each descendant is then
/// rewritten once every parent inside the rewritten subgraph is recorded:
/// its new parent list substitutes rewritten identities where known and
/// keeps parents outside the subgraph unchanged. If a freshly rewritten
/// identity matches a key in `signed`, the pre-existing signed identity is
/// recorded instead.
///
/// The scheduler owns its work stack, pending table, and result map as
/// locals, so the routine is re-entrant; output is deterministic regardless
/// of processing order among independent branches.
///
/// # Errors
///
/// Returns [`RewriteError::TargetOutsideGraph`] if `target` was never
/// visited, [`RewriteError::Odb`] on a missing commit, and a consistency
/// variant ([`RewriteError::AlreadyRewritten`],
/// [`RewriteError::UnexpectedParent`], [`RewriteError::MissingReverseNode`],
/// [`RewriteError::ResidualPending`]) if the graph violates its invariants.
pub fn rewrite_history<S: CommitStore + ?Sized>(
    store: &mut S,
    graph: &ReverseGraph,
    signed: &SignedVariantIndex,
    target: CommitId,
    new_parents: Vec<CommitId>,
) -> Result<RewriteOutcome, RewriteError> {
    let target_node = graph
        .node(target)
        .ok_or(RewriteError::TargetOutsideGraph(target))?;

    // Commits that will be rewritten: the target plus everything reachable
    // from it through child links. A merge parent outside this set is never
    // rewritten and must not be waited on — it stays in the new parent list
    // unchanged.
    let reachable = descendants_of(graph, target)?;

    let mut rewritten: FxHashMap<CommitId, CommitId> = FxHashMap::default();
    let mut pending: FxHashMap<CommitId, PendingCommit> = FxHashMap::default();
    let mut queue: Vec<CommitId> = Vec::new();
    let mut touched: BTreeSet<String> = BTreeSet::new();

    let new_target = store.create_with_parents(target, new_parents)?;
    debug!(old = %target, new = %new_target, "rewrote target");
    rewritten.insert(target, new_target);

    for child in &target_node.children {
        schedule_child(
            store,
            target,
            *child,
            &reachable,
            &rewritten,
            &mut pending,
            &mut queue,
        )?;
    }

    while let Some(id) = queue.pop() {
        let node = graph
            .node(id)
            .ok_or(RewriteError::MissingReverseNode(id))?;
        touched.insert(node.label.clone());

        let true_parents = store.parents(id)?;
        // Substitute rewritten identities; parents outside the traversed
        // subgraph stay as-is.
        let parent_list: Vec<CommitId> = true_parents
            .iter()
            .map(|p| rewritten.get(p).copied().unwrap_or(*p))
            .collect();

        let fresh = store.create_with_parents(id, parent_list)?;
        let final_id = match signed.lookup(fresh) {
            Some(signed_id) => {
                debug!(unsigned = %fresh, signed = %signed_id, "substituted signed variant");
                signed_id
            }
            None => fresh,
        };
        if rewritten.insert(id, final_id).is_some() {
            return Err(RewriteError::AlreadyRewritten(id));
        }
        debug!(old = %id, new = %final_id, "rewrote commit");

        for child in &node.children {
            schedule_child(
                store,
                id,
                *child,
                &reachable,
                &rewritten,
                &mut pending,
                &mut queue,
            )?;
        }
    }

    if !pending.is_empty() {
        return Err(RewriteError::ResidualPending {
            count: pending.len(),
        });
    }

    Ok(RewriteOutcome {
        rewritten: rewritten.into_iter().collect(),
        touched_labels: touched,
    })
}

/// Collects the target and every commit reachable from it via child links.
fn descendants_of(graph: &ReverseGraph, target: CommitId) -> Result<FxHashSet<CommitId>, RewriteError> {
    let mut seen: FxHashSet<CommitId> = FxHashSet::default();
    seen.insert(target);
    let mut stack = vec![target];
    while let Some(id) = stack.pop() {
        let node = graph
            .node(id)
            .ok_or(RewriteError::MissingReverseNode(id))?;
        for child in &node.children {
            if seen.insert(*child) {
                stack.push(*child);
            }
        }
    }
    Ok(seen)
}

/// Applies the waiting-set gate to one child of a just-rewritten commit.
///
/// A single-parent child (whose parent must be `current`) is enqueued
/// directly. A merge child is registered in the pending table on first
/// sight, waiting on its not-yet-rewritten parents inside `reachable`; on
/// later sightings `current` is removed from its waiting set. The child is
/// enqueued the moment its waiting set is empty.
fn schedule_child<S: CommitStore + ?Sized>(
    store: &S,
    current: CommitId,
    child: CommitId,
    reachable: &FxHashSet<CommitId>,
    rewritten: &FxHashMap<CommitId, CommitId>,
    pending: &mut FxHashMap<CommitId, PendingCommit>,
    queue: &mut Vec<CommitId>,
) -> Result<(), RewriteError> {
    let child_parents = store.parents(child)?;
    if child_parents.len() == 1 {
        if child_parents[0] != current {
            return Err(RewriteError::UnexpectedParent {
                child,
                parent: current,
            });
        }
        queue.push(child);
        return Ok(());
    }

    if let Some(entry) = pending.get_mut(&child) {
        entry.waiting_on.remove(&current);
        trace!(child = %child, waiting = entry.waiting_on.len(), "merge child gate decremented");
        if entry.waiting_on.is_empty() {
            pending.remove(&child);
            queue.push(child);
        }
        return Ok(());
    }

    let waiting_on: BTreeSet<CommitId> = child_parents
        .into_iter()
        .filter(|p| reachable.contains(p) && !rewritten.contains_key(p))
        .collect();
    trace!(child = %child, waiting = waiting_on.len(), "merge child registered");
    if waiting_on.is_empty() {
        // Every other parent is already recorded or lies outside the
        // rewritten subgraph.
        queue.push(child);
    } else {
        pending.insert(child, PendingCommit { waiting_on });
    }
    Ok(())
}
