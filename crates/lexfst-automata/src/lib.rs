//! Automaton layer for pattern queries over term dictionaries.
//!
//! This crate provides the primitives a query compiler uses to turn a pattern
//! (wildcard, bounded edit distance) into something that can drive a
//! restricted traversal of a sorted dictionary.
//!
//! # Architecture
//!
//! - [`range`] -- Closed code point intervals and the `disjoin` partitioning
//! - [`nfa`] -- Nondeterministic automata with epsilon transitions and combinators
//! - [`determinize`] -- Subset construction from [`nfa::Nfa`] to [`dfa::Dfa`]
//! - [`dfa`] -- Immutable flat deterministic automaton
//! - [`matcher`] -- Backtracking traversal contract and the shipped matchers

pub mod determinize;
pub mod dfa;
pub mod matcher;
pub mod nfa;
pub mod range;

pub use dfa::Dfa;
pub use matcher::{AnyMatcher, AutomatonMatcher, DfaMatcher, MatcherConfig, SequenceMatcher};
pub use nfa::Nfa;
pub use range::{CharRange, disjoin};

/// Dense automaton state identifier. State 0 is always the initial state.
pub type StateId = u32;

/// Error type for automaton construction and matcher misuse.
///
/// Both variants signal programming errors rather than ordinary search
/// outcomes; a dead-end transition is reported through `bool`/`Option`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AutomataError {
    #[error("invalid range: end {end} is below start {start}")]
    InvalidRange { start: u32, end: u32 },
    #[error("pop called without a matching successful next")]
    PopWithoutNext,
}
