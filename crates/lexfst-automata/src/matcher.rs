// Backtracking traversal matchers.
//
// A matcher is driven by a depth-first walk over some external trie or
// transducer: `next` before descending into a child, `pop` after returning
// from it. Each traversal owns its matcher; matchers are never shared.

use crate::dfa::Dfa;
use crate::{AutomataError, StateId};

/// Push/undo contract for restricting a depth-first traversal.
pub trait DfaMatcher<S> {
    /// Rewind to the start configuration.
    fn reset(&mut self);

    /// Try to consume `symbol`. On success the new configuration is pushed
    /// and `true` is returned; on failure nothing changes.
    fn next(&mut self, symbol: S) -> bool;

    /// Whether the current configuration is accepting.
    fn is_final(&self) -> bool;

    /// Undo exactly one earlier successful [`DfaMatcher::next`].
    fn pop(&mut self) -> Result<(), AutomataError>;
}

impl<S, M> DfaMatcher<S> for &mut M
where
    M: DfaMatcher<S> + ?Sized,
{
    fn reset(&mut self) {
        (**self).reset();
    }

    fn next(&mut self, symbol: S) -> bool {
        (**self).next(symbol)
    }

    fn is_final(&self) -> bool {
        (**self).is_final()
    }

    fn pop(&mut self) -> Result<(), AutomataError> {
        (**self).pop()
    }
}

/// Matcher configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatcherConfig {
    /// Expected maximum traversal depth, i.e. the longest key. Used to size
    /// the per-depth state stack up front; deeper traversals still work but
    /// reallocate.
    pub max_depth: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self { max_depth: 256 }
    }
}

/// Which configurations of a [`SequenceMatcher`] are accepting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceMode {
    /// Only the whole sequence.
    Exact,
    /// Every prefix of the sequence, including the empty one.
    PrefixesOf,
    /// The whole sequence followed by anything.
    StartsWith,
}

/// Matches a fixed symbol sequence.
#[derive(Debug, Clone)]
pub struct SequenceMatcher<S = char> {
    sequence: Vec<S>,
    mode: SequenceMode,
    depth: usize,
}

impl<S: Copy + PartialEq> SequenceMatcher<S> {
    pub fn new<I>(sequence: I, mode: SequenceMode) -> Self
    where
        I: IntoIterator<Item = S>,
    {
        Self {
            sequence: sequence.into_iter().collect(),
            mode,
            depth: 0,
        }
    }

    pub fn exact<I: IntoIterator<Item = S>>(sequence: I) -> Self {
        Self::new(sequence, SequenceMode::Exact)
    }

    /// Accepts any prefix of `sequence`; used to find all dictionary keys
    /// that are prefixes of a given input.
    pub fn prefixes_of<I: IntoIterator<Item = S>>(sequence: I) -> Self {
        Self::new(sequence, SequenceMode::PrefixesOf)
    }

    /// Accepts anything that starts with `sequence`.
    pub fn starts_with<I: IntoIterator<Item = S>>(sequence: I) -> Self {
        Self::new(sequence, SequenceMode::StartsWith)
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl<S: Copy + PartialEq> DfaMatcher<S> for SequenceMatcher<S> {
    fn reset(&mut self) {
        self.depth = 0;
    }

    fn next(&mut self, symbol: S) -> bool {
        if self.depth < self.sequence.len() {
            if self.sequence[self.depth] != symbol {
                return false;
            }
        } else if self.mode != SequenceMode::StartsWith {
            return false;
        }
        self.depth += 1;
        true
    }

    fn is_final(&self) -> bool {
        match self.mode {
            SequenceMode::Exact => self.depth == self.sequence.len(),
            SequenceMode::PrefixesOf => self.depth <= self.sequence.len(),
            SequenceMode::StartsWith => self.depth >= self.sequence.len(),
        }
    }

    fn pop(&mut self) -> Result<(), AutomataError> {
        if self.depth == 0 {
            return Err(AutomataError::PopWithoutNext);
        }
        self.depth -= 1;
        Ok(())
    }
}

/// Accepts every sequence; drives a full enumeration.
#[derive(Debug, Clone, Default)]
pub struct AnyMatcher {
    depth: usize,
}

impl AnyMatcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S> DfaMatcher<S> for AnyMatcher {
    fn reset(&mut self) {
        self.depth = 0;
    }

    fn next(&mut self, _symbol: S) -> bool {
        self.depth += 1;
        true
    }

    fn is_final(&self) -> bool {
        true
    }

    fn pop(&mut self) -> Result<(), AutomataError> {
        if self.depth == 0 {
            return Err(AutomataError::PopWithoutNext);
        }
        self.depth -= 1;
        Ok(())
    }
}

/// Drives a traversal with a compiled [`Dfa`].
///
/// The DFA state reached at each depth is kept on an explicit stack, so
/// `pop` is a constant-time truncation no matter how deep the traversal is.
#[derive(Debug, Clone)]
pub struct AutomatonMatcher<'a> {
    dfa: &'a Dfa,
    states: Vec<StateId>,
}

impl<'a> AutomatonMatcher<'a> {
    pub fn new(dfa: &'a Dfa) -> Self {
        Self::with_config(dfa, MatcherConfig::default())
    }

    pub fn with_config(dfa: &'a Dfa, config: MatcherConfig) -> Self {
        let mut states = Vec::with_capacity(config.max_depth + 1);
        states.push(dfa.initial());
        Self { dfa, states }
    }

    /// DFA state of the current configuration.
    #[inline]
    pub fn current(&self) -> StateId {
        self.states[self.states.len() - 1]
    }

    pub fn depth(&self) -> usize {
        self.states.len() - 1
    }
}

impl DfaMatcher<char> for AutomatonMatcher<'_> {
    fn reset(&mut self) {
        self.states.truncate(1);
    }

    fn next(&mut self, symbol: char) -> bool {
        match self.dfa.next_char(self.current(), symbol) {
            Some(target) => {
                self.states.push(target);
                true
            }
            None => false,
        }
    }

    fn is_final(&self) -> bool {
        self.dfa.is_final(self.current())
    }

    fn pop(&mut self) -> Result<(), AutomataError> {
        if self.states.len() <= 1 {
            return Err(AutomataError::PopWithoutNext);
        }
        self.states.pop();
        Ok(())
    }
}
