// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Signed-variant index: unsigned identity → signed identity.
//!
//! When the rewrite scheduler re-creates a commit whose unsigned form is
//! byte-identical to a signed commit already present in the traversed
//! history, it records the signed identity instead of the fresh unsigned one.
//! This index is the lookup table making that substitution O(log n).

use std::collections::BTreeMap;

use graft_odb::{CommitId, CommitStore, OdbError};
use tracing::debug;

use crate::reverse::ReverseGraph;

/// Mapping from "identity a commit would have without its signature" to the
/// identity of the original signed commit.
///
/// Built once before rewriting begins, read-only afterwards. A signed
/// identity is never itself a key unless the unsigned twin was re-signed,
/// so substitution is idempotent.
#[derive(Debug, Clone, Default)]
pub struct SignedVariantIndex {
    index: BTreeMap<CommitId, CommitId>,
}

impl SignedVariantIndex {
    /// Scans every commit in `graph` and records an entry for each signed one.
    ///
    /// The unsigned identity is derived through the same rewrite primitive
    /// the scheduler uses — `create_with_parents` with the commit's own true
    /// parents — which persists the unsigned twin as an idempotent
    /// content-addressed put. Single pass, order-independent.
    ///
    /// # Errors
    ///
    /// Returns [`OdbError::CommitNotFound`] if a graph identity is absent
    /// from the store.
    pub fn build<S: CommitStore + ?Sized>(
        store: &mut S,
        graph: &ReverseGraph,
    ) -> Result<Self, OdbError> {
        let mut index = BTreeMap::new();
        for id in graph.ids().collect::<Vec<_>>() {
            let commit = store.resolve(id)?;
            if !commit.is_signed() {
                continue;
            }
            let parents = commit.parents.clone();
            // Same parents, no signature: exactly the unsigned twin.
            let unsigned = store.create_with_parents(id, parents)?;
            debug!(signed = %id, unsigned = %unsigned, "indexed signed variant");
            index.insert(unsigned, id);
        }
        Ok(Self { index })
    }

    /// Returns the signed identity whose unsigned form is `unsigned`, if any.
    pub fn lookup(&self, unsigned: CommitId) -> Option<CommitId> {
        self.index.get(&unsigned).copied()
    }

    /// Number of signed variants indexed.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if no signed commits were found.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
