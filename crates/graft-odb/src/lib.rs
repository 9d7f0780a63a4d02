// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Content-addressed commit object database for Graft.
//!
//! `graft-odb` provides the [`CommitStore`] trait for commit storage keyed by
//! BLAKE3 identity, plus [`MemoryOdb`] as the in-memory implementation. A
//! [`Commit`] is an immutable record (tree, parents, author, committer,
//! message, optional signature) whose identity is a pure function of every
//! field: changing the parent list or stripping the signature yields a
//! different, deterministic identity.
//!
//! # Hash Domain Policy
//!
//! Commit identity is `BLAKE3(b"commit:" || canonical encoding)`. The
//! canonical encoding fixes field order, uses 8-byte little-endian length
//! prefixes for variable-length fields, and a one-byte presence tag for the
//! optional signature. Changing any of these rules is a breaking change to
//! commit identity.
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

mod memory;
pub use memory::MemoryOdb;

use blake3::Hasher;

/// Canonical 256-bit hash used for commit and tree identities.
pub type Hash = [u8; 32];

/// A 32-byte BLAKE3 commit identity.
///
/// Thin newtype over `[u8; 32]`. The inner bytes are public for zero-cost
/// access; the `Display` impl renders lowercase hex for logging and error
/// messages.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct CommitId(pub Hash);

impl CommitId {
    /// View the identity as a byte slice.
    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }
}

impl std::fmt::Display for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Author or committer metadata attached to a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonStamp {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Seconds since the Unix epoch.
    pub time_secs: i64,
    /// Timezone offset east of UTC, in minutes.
    pub tz_offset_minutes: i32,
}

impl PersonStamp {
    /// Renders the timezone offset in `±HHMM` form (e.g. `+0200`, `-0430`).
    pub fn tz_string(&self) -> String {
        let sign = if self.tz_offset_minutes < 0 { '-' } else { '+' };
        let abs = self.tz_offset_minutes.unsigned_abs();
        format!("{sign}{:02}{:02}", abs / 60, abs % 60)
    }

    fn hash_into(&self, hasher: &mut Hasher) {
        hash_bytes(hasher, self.name.as_bytes());
        hash_bytes(hasher, self.email.as_bytes());
        hasher.update(&self.time_secs.to_le_bytes());
        hasher.update(&self.tz_offset_minutes.to_le_bytes());
    }
}

/// An immutable, content-addressed commit record.
///
/// Identity is a pure function of all fields (see [`Commit::id`]). The engine
/// never mutates a commit; a rewrite creates a new record with a replacement
/// parent list via [`CommitStore::create_with_parents`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Opaque content (tree) hash. Rewrites never touch it.
    pub tree: Hash,
    /// Ordered parent identities.
    pub parents: Vec<CommitId>,
    /// Author metadata.
    pub author: PersonStamp,
    /// Committer metadata.
    pub committer: PersonStamp,
    /// Free-form commit message.
    pub message: String,
    /// Optional signature blob over the rest of the record.
    pub signature: Option<Vec<u8>>,
}

impl Commit {
    /// Computes this commit's deterministic identity.
    ///
    /// Encoding: domain prefix `b"commit:"`, tree hash, parent count (u64 LE)
    /// followed by raw 32-byte parent ids, author, committer, length-prefixed
    /// message, then a presence tag (`0`/`1`) and length-prefixed signature
    /// bytes when present.
    pub fn id(&self) -> CommitId {
        let mut hasher = Hasher::new();
        hasher.update(b"commit:");
        hasher.update(&self.tree);
        hasher.update(&(self.parents.len() as u64).to_le_bytes());
        for parent in &self.parents {
            hasher.update(&parent.0);
        }
        self.author.hash_into(&mut hasher);
        self.committer.hash_into(&mut hasher);
        hash_bytes(&mut hasher, self.message.as_bytes());
        match &self.signature {
            None => {
                hasher.update(&[0u8]);
            }
            Some(sig) => {
                hasher.update(&[1u8]);
                hash_bytes(&mut hasher, sig);
            }
        }
        CommitId(hasher.finalize().into())
    }

    /// Returns `true` if this commit carries a signature.
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Identity this commit would have with its signature stripped and all
    /// other fields unchanged.
    ///
    /// For an unsigned commit this equals [`Commit::id`].
    pub fn unsigned_id(&self) -> CommitId {
        if self.signature.is_none() {
            return self.id();
        }
        let mut stripped = self.clone();
        stripped.signature = None;
        stripped.id()
    }
}

fn hash_bytes(hasher: &mut Hasher, bytes: &[u8]) {
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

/// Errors that can occur during object database operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OdbError {
    /// A referenced commit identity is absent from the store.
    ///
    /// Always fatal: the graph is assumed internally consistent, so a missing
    /// commit indicates a caller precondition violation, never a transient
    /// condition.
    #[error("[ODB_COMMIT_NOT_FOUND] {0}")]
    CommitNotFound(CommitId),
}

/// Content-addressed commit store.
///
/// Implementations persist immutable commits keyed by their identity. The
/// trait is intentionally synchronous and object-safe; the rewrite engine is
/// single-threaded and drives it through `&mut`.
pub trait CommitStore {
    /// Looks up a commit by identity.
    ///
    /// # Errors
    ///
    /// Returns [`OdbError::CommitNotFound`] if `id` is absent.
    fn resolve(&self, id: CommitId) -> Result<&Commit, OdbError>;

    /// Returns the ordered parent identities of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`OdbError::CommitNotFound`] if `id` is absent.
    fn parents(&self, id: CommitId) -> Result<Vec<CommitId>, OdbError>;

    /// Persists a new commit identical to `id` in tree, message, author, and
    /// committer, but with the given parent list and **no signature**, and
    /// returns its deterministic identity.
    ///
    /// Content-addressed put: calling twice with the same inputs stores one
    /// record and returns the same identity.
    ///
    /// # Errors
    ///
    /// Returns [`OdbError::CommitNotFound`] if `id` is absent.
    fn create_with_parents(
        &mut self,
        id: CommitId,
        new_parents: Vec<CommitId>,
    ) -> Result<CommitId, OdbError>;
}
