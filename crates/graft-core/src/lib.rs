// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! graft-core: deterministic commit-DAG history rewriting engine.
//!
//! Graft re-parents one commit in an immutable, content-addressed DAG and
//! transitively re-creates every descendant reachable from a set of branch
//! tips, preserving all content and metadata while updating parent links.
//! Merge commits are gated on all of their predecessors; where a signed
//! variant of a freshly rewritten commit already exists in the traversed
//! history, the signed identity is substituted for the unsigned one.
//!
//! The engine is store-agnostic: it drives any [`graft_odb::CommitStore`]
//! through `resolve`/`parents`/`create_with_parents` and never touches tree
//! content. Its sole output is the [`RewriteOutcome`]: the complete mapping
//! from original to rewritten identity plus the set of start-point labels
//! whose ancestry was touched.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::suboptimal_flops,
    clippy::redundant_pub_crate,
    clippy::many_single_char_names,
    clippy::module_name_repetitions,
    clippy::use_self
)]

mod reverse;
mod rewrite;
mod signed;

// Re-exports for stable public API
/// Child-pointing ancestry view and its builder.
pub use reverse::{GraphError, ReverseGraph, ReverseNode, StartPoint};
/// Dependency-gated topological rewrite.
pub use rewrite::{rewrite_history, RewriteError, RewriteOutcome};
/// Unsigned-identity to signed-identity index.
pub use signed::SignedVariantIndex;
