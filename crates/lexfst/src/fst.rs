// Immutable transducer runtime: lookup and pattern-restricted enumeration.

use log::warn;

use crate::output::Output;
use crate::transition::Transition;
use crate::{AnyMatcher, DfaMatcher, FstError, Result, StateId};

/// States with at least this many transitions are searched by bisection.
pub const BINARY_SEARCH_THRESHOLD: usize = 8;

/// One state handed to [`Fst::from_states`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDef<T> {
    pub is_final: bool,
    /// Outgoing transitions, strictly ascending by input symbol.
    pub transitions: Vec<Transition<T>>,
}

/// Immutable finite state transducer.
///
/// The transitions of all states live in one arena; `offsets[s]..offsets[s
/// + 1]` is the slice belonging to state `s`, sorted by input symbol. An
/// `Fst` is never mutated after construction and can be shared freely
/// between threads; every traversal brings its own matcher.
#[derive(Clone, PartialEq, Eq)]
pub struct Fst<T> {
    initial: StateId,
    offsets: Vec<u32>,
    transitions: Vec<Transition<T>>,
    finals: Vec<bool>,
}

impl<T> std::fmt::Debug for Fst<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fst")
            .field("initial", &self.initial)
            .field("state_count", &self.state_count())
            .field("transition_count", &self.transitions.len())
            .finish()
    }
}

impl<T> Fst<T> {
    /// Assemble a transducer from per-state definitions, validating that the
    /// initial state and every target exist and that each state's symbols
    /// are strictly ascending.
    pub fn from_states(initial: StateId, states: Vec<StateDef<T>>) -> Result<Self> {
        let count = states.len();
        if (initial as usize) >= count {
            return Err(FstError::Corrupt(format!(
                "initial state {initial} out of range for {count} states"
            )));
        }
        for (id, state) in states.iter().enumerate() {
            for (i, t) in state.transitions.iter().enumerate() {
                if (t.target as usize) >= count {
                    return Err(FstError::Corrupt(format!(
                        "state {id} targets missing state {}",
                        t.target
                    )));
                }
                if i > 0 && state.transitions[i - 1].input >= t.input {
                    return Err(FstError::Corrupt(format!(
                        "transitions of state {id} are not strictly ascending"
                    )));
                }
            }
        }
        Ok(Self::from_states_unchecked(initial, states))
    }

    /// Assemble without validation. The caller guarantees the invariants
    /// checked by [`Fst::from_states`].
    pub(crate) fn from_states_unchecked(initial: StateId, states: Vec<StateDef<T>>) -> Self {
        let mut offsets = Vec::with_capacity(states.len() + 1);
        let mut finals = Vec::with_capacity(states.len());
        let mut transitions = Vec::with_capacity(states.iter().map(|s| s.transitions.len()).sum());
        offsets.push(0);
        for state in states {
            finals.push(state.is_final);
            transitions.extend(state.transitions);
            offsets.push(transitions.len() as u32);
        }
        Self {
            initial,
            offsets,
            transitions,
            finals,
        }
    }

    #[inline]
    pub fn initial(&self) -> StateId {
        self.initial
    }

    #[inline]
    pub fn state_count(&self) -> usize {
        self.finals.len()
    }

    #[inline]
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    #[inline]
    pub fn is_final(&self, state: StateId) -> bool {
        self.finals.get(state as usize).copied().unwrap_or(false)
    }

    #[inline]
    fn bounds(&self, state: StateId) -> (usize, usize) {
        let s = state as usize;
        (self.offsets[s] as usize, self.offsets[s + 1] as usize)
    }

    /// Outgoing transitions of `state`, ascending by input symbol. Unknown
    /// states have none.
    pub fn transitions(&self, state: StateId) -> &[Transition<T>] {
        if (state as usize) >= self.state_count() {
            return &[];
        }
        let (start, end) = self.bounds(state);
        &self.transitions[start..end]
    }

    /// Follow the transition labelled `symbol`, returning its target and
    /// output, or `None` if `state` has no such transition.
    pub fn try_move(&self, state: StateId, symbol: char) -> Option<(StateId, &T)> {
        let transitions = self.transitions(state);
        let found = if transitions.len() < BINARY_SEARCH_THRESHOLD {
            transitions.iter().find(|t| t.input == symbol)
        } else {
            transitions
                .binary_search_by_key(&symbol, |t| t.input)
                .ok()
                .map(|i| &transitions[i])
        };
        found.map(|t| (t.target, &t.output))
    }

    /// Walk `key` from the initial state, folding transition outputs into
    /// `init` with `aggregate`. Returns `None` if a transition is missing or
    /// the walk ends in a non-final state.
    pub fn try_match_with<A, F>(&self, key: &str, init: A, mut aggregate: F) -> Option<A>
    where
        F: FnMut(A, &T) -> A,
    {
        let mut state = self.initial;
        let mut acc = init;
        for c in key.chars() {
            let (next, output) = self.try_move(state, c)?;
            acc = aggregate(acc, output);
            state = next;
        }
        self.is_final(state).then_some(acc)
    }
}

impl<T: Output> Fst<T> {
    /// Look up `key`, returning its accumulated output.
    pub fn try_match(&self, key: &str) -> Option<T> {
        self.try_match_with(key, T::zero(), |acc, output| acc.aggregate(output))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.try_match(key).is_some()
    }

    /// Enumerate, in ascending order, every key that the matcher accepts,
    /// with its output.
    ///
    /// Only the part of the transducer the matcher lets through is visited.
    /// The matcher is reset first; pass `&mut matcher` to keep ownership.
    pub fn matches<M: DfaMatcher<char>>(&self, mut matcher: M) -> Matches<'_, T, M> {
        matcher.reset();
        let (next, end) = self.bounds(self.initial);
        Matches {
            fst: self,
            matcher,
            path: Vec::new(),
            stack: vec![Frame {
                state: self.initial,
                next,
                end,
                output: T::zero(),
                visited: false,
            }],
        }
    }

    /// Every key with its output, in ascending order.
    pub fn keys(&self) -> Matches<'_, T, AnyMatcher> {
        self.matches(AnyMatcher::new())
    }

    /// Number of keys. Walks the whole transducer.
    pub fn len(&self) -> usize {
        self.keys().count()
    }

    pub fn is_empty(&self) -> bool {
        self.keys().next().is_none()
    }
}

struct Frame<T> {
    state: StateId,
    next: usize,
    end: usize,
    output: T,
    visited: bool,
}

/// Lazy depth-first enumeration produced by [`Fst::matches`].
///
/// The walk keeps its own stack instead of recursing, so key length does not
/// bound the call stack. Dropping the iterator early is the way to cap a
/// large enumeration.
pub struct Matches<'f, T, M> {
    fst: &'f Fst<T>,
    matcher: M,
    path: Vec<char>,
    stack: Vec<Frame<T>>,
}

impl<T: Output, M: DfaMatcher<char>> Iterator for Matches<'_, T, M> {
    type Item = (String, T);

    fn next(&mut self) -> Option<Self::Item> {
        let fst = self.fst;
        loop {
            let frame = self.stack.last_mut()?;

            if !frame.visited {
                frame.visited = true;
                if fst.is_final(frame.state) && self.matcher.is_final() {
                    return Some((self.path.iter().collect(), frame.output.clone()));
                }
            }

            if frame.next < frame.end {
                let t = &fst.transitions[frame.next];
                frame.next += 1;
                if self.matcher.next(t.input) {
                    let output = frame.output.aggregate(&t.output);
                    let (next, end) = fst.bounds(t.target);
                    self.path.push(t.input);
                    self.stack.push(Frame {
                        state: t.target,
                        next,
                        end,
                        output,
                        visited: false,
                    });
                }
                continue;
            }

            self.stack.pop();
            if !self.stack.is_empty() {
                self.path.pop();
                if let Err(err) = self.matcher.pop() {
                    warn!("matcher rejected pop during traversal: {err}");
                    self.stack.clear();
                    return None;
                }
            }
        }
    }
}
