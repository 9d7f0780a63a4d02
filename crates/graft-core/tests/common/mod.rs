// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code)]

use graft_odb::{Commit, CommitId, MemoryOdb, PersonStamp};

/// Fixed author/committer metadata so identities depend only on the graph
/// shape under test.
pub fn stamp(name: &str) -> PersonStamp {
    PersonStamp {
        name: name.to_owned(),
        email: format!("{name}@example.com"),
        time_secs: 1_700_000_000,
        tz_offset_minutes: 60,
    }
}

/// Builds an unsigned commit over a synthetic tree hash.
pub fn commit(tree_byte: u8, parents: Vec<CommitId>) -> Commit {
    Commit {
        tree: [tree_byte; 32],
        parents,
        author: stamp("ada"),
        committer: stamp("grace"),
        message: format!("tree {tree_byte:02x}"),
        signature: None,
    }
}

/// Builds a signed commit over a synthetic tree hash.
pub fn signed_commit(tree_byte: u8, parents: Vec<CommitId>, sig: &[u8]) -> Commit {
    let mut c = commit(tree_byte, parents);
    c.signature = Some(sig.to_vec());
    c
}

/// Inserts an unsigned commit and returns its identity.
pub fn put(store: &mut MemoryOdb, tree_byte: u8, parents: Vec<CommitId>) -> CommitId {
    store.insert(commit(tree_byte, parents))
}

/// Builds the linear chain `A <- B <- C` and returns `(store, a, b, c)`.
pub fn linear_chain() -> (MemoryOdb, CommitId, CommitId, CommitId) {
    let mut store = MemoryOdb::new();
    let a = put(&mut store, 1, vec![]);
    let b = put(&mut store, 2, vec![a]);
    let c = put(&mut store, 3, vec![b]);
    (store, a, b, c)
}

/// Builds the diamond `A <- {B, C} <- D` (D merges B and C, in that order)
/// on top of a spare root, and returns `(store, a, b, c, d)`. `A` keeps a
/// parent so re-rooting it actually changes identities.
pub fn diamond() -> (MemoryOdb, CommitId, CommitId, CommitId, CommitId) {
    let mut store = MemoryOdb::new();
    let pre = put(&mut store, 0x40, vec![]);
    let a = put(&mut store, 1, vec![pre]);
    let b = put(&mut store, 2, vec![a]);
    let c = put(&mut store, 3, vec![a]);
    let d = put(&mut store, 4, vec![b, c]);
    (store, a, b, c, d)
}
