// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used)]
use graft_core::{rewrite_history, ReverseGraph, SignedVariantIndex, StartPoint};
use graft_odb::{CommitStore, MemoryOdb};

mod common;
use common::{commit, put, signed_commit};

#[test]
fn index_maps_unsigned_identity_to_signed_commit() {
    let mut store = MemoryOdb::new();
    let root = put(&mut store, 1, vec![]);
    let signed = store.insert(signed_commit(5, vec![root], b"gpgsig"));
    let expected_unsigned = store.resolve(signed).unwrap().unsigned_id();

    let graph = ReverseGraph::build(&store, &[StartPoint::new(signed, "signed")]).unwrap();
    let index = SignedVariantIndex::build(&mut store, &graph).unwrap();

    assert_eq!(index.len(), 1);
    assert_eq!(index.lookup(expected_unsigned), Some(signed));
    // Building the index persisted the unsigned twin (content-addressed put).
    assert!(store.contains(expected_unsigned));
}

#[test]
fn signed_identity_is_not_itself_a_key() {
    // Substitution idempotence: looking up the signed identity is a no-op.
    let mut store = MemoryOdb::new();
    let root = put(&mut store, 1, vec![]);
    let signed = store.insert(signed_commit(5, vec![root], b"gpgsig"));

    let graph = ReverseGraph::build(&store, &[StartPoint::new(signed, "signed")]).unwrap();
    let index = SignedVariantIndex::build(&mut store, &graph).unwrap();
    assert_eq!(index.lookup(signed), None);
}

#[test]
fn unsigned_history_yields_empty_index() {
    let (mut store, _a, _b, c) = common::linear_chain();
    let graph = ReverseGraph::build(&store, &[StartPoint::new(c, "main")]).unwrap();
    let index = SignedVariantIndex::build(&mut store, &graph).unwrap();
    assert!(index.is_empty());
    assert_eq!(index.len(), 0);
}

#[test]
fn rewritten_descendant_is_recorded_under_the_signed_identity() {
    // Reference history: r <- g (signed). Working history: q <- t <- w, where
    // t matches r except for its parent and w matches g's content. Re-rooting
    // t makes t' identical to r, so w' recomputes to g's unsigned twin and
    // must be recorded as g itself.
    let mut store = MemoryOdb::new();
    let r = put(&mut store, 1, vec![]);
    let g = store.insert(signed_commit(5, vec![r], b"gpgsig"));

    let q = put(&mut store, 7, vec![]);
    let t = put(&mut store, 1, vec![q]);
    let w = store.insert(commit(5, vec![t]));

    let graph = ReverseGraph::build(
        &store,
        &[StartPoint::new(g, "signed"), StartPoint::new(w, "work")],
    )
    .unwrap();
    let index = SignedVariantIndex::build(&mut store, &graph).unwrap();
    let outcome = rewrite_history(&mut store, &graph, &index, t, vec![]).unwrap();

    // t' collapses onto r; w' collapses onto g's unsigned twin and gets the
    // signed identity substituted in.
    assert_eq!(outcome.rewritten[&t], r);
    assert_eq!(outcome.rewritten[&w], g);
    assert!(store.resolve(g).unwrap().is_signed());
}

#[test]
fn substitution_applies_only_on_exact_content_match() {
    // Same shape as above, but w's tree differs from g's: no substitution.
    let mut store = MemoryOdb::new();
    let r = put(&mut store, 1, vec![]);
    let g = store.insert(signed_commit(5, vec![r], b"gpgsig"));

    let q = put(&mut store, 7, vec![]);
    let t = put(&mut store, 1, vec![q]);
    let w = store.insert(commit(6, vec![t]));

    let graph = ReverseGraph::build(
        &store,
        &[StartPoint::new(g, "signed"), StartPoint::new(w, "work")],
    )
    .unwrap();
    let index = SignedVariantIndex::build(&mut store, &graph).unwrap();
    let outcome = rewrite_history(&mut store, &graph, &index, t, vec![]).unwrap();

    let w_new = outcome.rewritten[&w];
    assert_ne!(w_new, g);
    assert!(!store.resolve(w_new).unwrap().is_signed());
    assert_eq!(store.resolve(w_new).unwrap().parents, vec![r]);
}
