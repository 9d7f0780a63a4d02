// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory commit object database.
//!
//! [`MemoryOdb`] backs the rewrite engine in tests and embedders that build
//! their graph programmatically. Commits live in a `BTreeMap` so iteration
//! order (were it ever exposed) stays deterministic.

use std::collections::BTreeMap;

use crate::{Commit, CommitId, CommitStore, OdbError};

/// In-memory content-addressed commit store.
///
/// Inserts are idempotent: a commit's key is its own identity, so storing the
/// same record twice is a no-op that returns the same [`CommitId`].
#[derive(Debug, Clone, Default)]
pub struct MemoryOdb {
    commits: BTreeMap<CommitId, Commit>,
}

impl MemoryOdb {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            commits: BTreeMap::new(),
        }
    }

    /// Stores `commit` under its computed identity and returns that identity.
    pub fn insert(&mut self, commit: Commit) -> CommitId {
        let id = commit.id();
        self.commits.entry(id).or_insert(commit);
        id
    }

    /// Number of commits currently stored.
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    /// Returns `true` if no commits are stored.
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// Check existence without resolving.
    #[must_use]
    pub fn contains(&self, id: CommitId) -> bool {
        self.commits.contains_key(&id)
    }
}

impl CommitStore for MemoryOdb {
    fn resolve(&self, id: CommitId) -> Result<&Commit, OdbError> {
        self.commits.get(&id).ok_or(OdbError::CommitNotFound(id))
    }

    fn parents(&self, id: CommitId) -> Result<Vec<CommitId>, OdbError> {
        Ok(self.resolve(id)?.parents.clone())
    }

    fn create_with_parents(
        &mut self,
        id: CommitId,
        new_parents: Vec<CommitId>,
    ) -> Result<CommitId, OdbError> {
        let mut rewritten = self.resolve(id)?.clone();
        rewritten.parents = new_parents;
        rewritten.signature = None;
        Ok(self.insert(rewritten))
    }
}
