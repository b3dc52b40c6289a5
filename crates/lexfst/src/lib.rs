//! Minimal acyclic finite state transducers for term dictionaries.
//!
//! An [`Fst`] maps an ordered set of string keys to outputs. It is built
//! once from sorted `(key, output)` pairs by [`FstBuilder`], which shares
//! both prefixes and suffixes, and can then be queried by exact key or
//! restricted by any [`DfaMatcher`] (exact sequence, prefix, compiled
//! wildcard or edit-distance automaton) without decoding the whole
//! structure.
//!
//! # Architecture
//!
//! - [`output`] -- Output monoids accumulated along a path
//! - [`transition`] -- In-memory transitions and raw on-disk records
//! - [`fst`] -- Immutable transducer runtime and pattern enumeration
//! - [`config`] -- Builder configuration
//! - [`builder`] -- Online minimal transducer construction
//! - [`varint`] -- Unsigned LEB128 integers
//! - [`codec`] -- Raw and compressed serialization

pub mod builder;
pub mod codec;
pub mod config;
pub mod fst;
pub mod output;
pub mod transition;
pub mod varint;

pub use builder::{BuildStats, FstBuilder};
pub use codec::Codec;
pub use config::BuilderConfig;
pub use fst::{Fst, Matches, StateDef};
pub use output::{Output, PushableOutput};
pub use transition::Transition;

pub use lexfst_automata::{
    AnyMatcher, AutomatonMatcher, DfaMatcher, MatcherConfig, SequenceMatcher, StateId,
};

/// Error type for building, loading and validating transducers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FstError {
    #[error("buffer too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },
    #[error("state id mismatch: expected {expected}, found {actual}")]
    StateIdMismatch { expected: u32, actual: u32 },
    #[error("corrupt transducer data: {0}")]
    Corrupt(String),
    #[error("keys must be strictly ascending: {current:?} follows {previous:?}")]
    OutOfOrder { previous: String, current: String },
    #[error("duplicate key {0:?}")]
    DuplicateKey(String),
    #[error("empty keys cannot be stored")]
    EmptyKey,
    #[error("key of {length} characters exceeds the maximum of {max}")]
    KeyTooLong { length: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, FstError>;
