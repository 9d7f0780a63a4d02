// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Child-pointing ancestry view of the commit DAG.
//!
//! [`ReverseGraph::build`] walks backward (parent-following) from a set of
//! start points and records, for every visited commit, its forward-pointing
//! children and the start label that first discovered it. The rewrite
//! scheduler then drives forward along the child links.

use std::collections::BTreeMap;

use graft_odb::{CommitId, CommitStore, OdbError};
use thiserror::Error;

/// A (start identity, label) pair naming an entry point into the DAG.
///
/// Labels are reporting-only branch names; they carry no semantics inside the
/// engine beyond the touched-label set in the rewrite outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartPoint {
    /// Tip commit to explore backward from.
    pub id: CommitId,
    /// Human-readable label for this entry point.
    pub label: String,
}

impl StartPoint {
    /// Convenience constructor.
    pub fn new(id: CommitId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// One commit in the reverse graph: its discovering label and its children.
///
/// Immutable after construction. Every identity in `children` has this
/// commit among its parents in the underlying store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseNode {
    /// Commit identity.
    pub id: CommitId,
    /// Label of the start point whose traversal first discovered this commit.
    pub label: String,
    /// Forward-pointing child identities, duplicate-free.
    pub children: Vec<CommitId>,
}

/// Errors produced while building the reverse graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A referenced parent identity is absent from the store. Fatal.
    #[error(transparent)]
    Odb(#[from] OdbError),
    /// A parent already listed the visiting commit as a child.
    ///
    /// The no-revisit policy guarantees each commit's parent edges are walked
    /// exactly once, so a duplicate means the input is not a well-formed DAG
    /// (e.g. a commit listing the same parent twice). Fatal.
    #[error("[GRAPH_DUPLICATE_CHILD_EDGE] {parent} already lists child {child}")]
    DuplicateChildEdge {
        /// Parent commit holding the duplicate edge.
        parent: CommitId,
        /// Child commit that was about to be appended again.
        child: CommitId,
    },
}

/// Child-pointing view of the ancestry DAG rooted at one or more start points.
///
/// Backed by a `BTreeMap` so iteration is in ascending [`CommitId`] order.
#[derive(Debug, Clone, Default)]
pub struct ReverseGraph {
    nodes: BTreeMap<CommitId, ReverseNode>,
}

impl ReverseGraph {
    /// Builds the reverse graph for the ancestry of `starts`.
    ///
    /// Maintains a work stack seeded with one node per start point. Popping a
    /// commit walks its parents: a known parent gains the commit as a child;
    /// an unknown parent is created (inheriting the commit's label, child
    /// list `[commit]`) and pushed. Terminates when the stack drains — DAG
    /// finiteness plus the already-known check guarantee no revisits.
    ///
    /// Label policy for shared ancestry: the **first** start point in the
    /// input list wins. The stack is seeded in reverse input order, so the
    /// first start's ancestry is fully explored before any later start is
    /// popped. Deterministic for a fixed input list.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Odb`] if a referenced parent is absent from the
    /// store, or [`GraphError::DuplicateChildEdge`] if a parent already lists
    /// the visiting commit (malformed DAG).
    pub fn build<S: CommitStore + ?Sized>(
        store: &S,
        starts: &[StartPoint],
    ) -> Result<Self, GraphError> {
        let mut nodes: BTreeMap<CommitId, ReverseNode> = BTreeMap::new();
        let mut seeded: Vec<CommitId> = Vec::with_capacity(starts.len());
        for start in starts {
            if nodes.contains_key(&start.id) {
                continue;
            }
            nodes.insert(
                start.id,
                ReverseNode {
                    id: start.id,
                    label: start.label.clone(),
                    children: Vec::new(),
                },
            );
            seeded.push(start.id);
        }

        // Reverse seed order: first start point explored first (label policy).
        let mut stack: Vec<CommitId> = seeded;
        stack.reverse();

        while let Some(id) = stack.pop() {
            let label = match nodes.get(&id) {
                Some(node) => node.label.clone(),
                None => continue,
            };
            for parent in store.parents(id)? {
                if let Some(known) = nodes.get_mut(&parent) {
                    if known.children.contains(&id) {
                        return Err(GraphError::DuplicateChildEdge { parent, child: id });
                    }
                    known.children.push(id);
                } else {
                    nodes.insert(
                        parent,
                        ReverseNode {
                            id: parent,
                            label: label.clone(),
                            children: vec![id],
                        },
                    );
                    stack.push(parent);
                }
            }
        }

        Ok(Self { nodes })
    }

    /// Returns the reverse node for `id` when it was visited.
    pub fn node(&self, id: CommitId) -> Option<&ReverseNode> {
        self.nodes.get(&id)
    }

    /// Returns `true` if `id` was visited by the backward walk.
    #[must_use]
    pub fn contains(&self, id: CommitId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of commits in the reverse graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no commits were visited.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all reverse nodes in ascending [`CommitId`] order.
    pub fn iter(&self) -> impl Iterator<Item = &ReverseNode> {
        self.nodes.values()
    }

    /// Iterate over all visited identities in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = CommitId> + '_ {
        self.nodes.keys().copied()
    }
}
