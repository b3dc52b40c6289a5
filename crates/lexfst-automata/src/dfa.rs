// Flat deterministic automaton produced by subset construction.

use crate::StateId;
use crate::range::CharRange;

/// One DFA state: disjoint outgoing ranges and a finality flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DfaState {
    pub(crate) arcs: Vec<(CharRange, StateId)>,
    pub(crate) is_final: bool,
}

impl DfaState {
    pub(crate) fn new(is_final: bool) -> Self {
        Self {
            arcs: Vec::new(),
            is_final,
        }
    }

    /// Outgoing `(range, target)` pairs, ascending by range.
    pub fn arcs(&self) -> &[(CharRange, StateId)] {
        &self.arcs
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }
}

/// Deterministic automaton over code points.
///
/// Built only by [`crate::Nfa::determinize`] and immutable afterwards. The
/// ranges leaving each state are pairwise disjoint, which is what makes the
/// first-match lookup in [`Dfa::next`] correct. State 0 is the initial state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    states: Vec<DfaState>,
}

impl Dfa {
    pub(crate) fn from_states(states: Vec<DfaState>) -> Self {
        debug_assert!(!states.is_empty());
        Self { states }
    }

    #[inline]
    pub fn initial(&self) -> StateId {
        0
    }

    #[inline]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn state(&self, state: StateId) -> Option<&DfaState> {
        self.states.get(state as usize)
    }

    /// Follow the arc containing `symbol`, or `None` if there is none.
    #[inline]
    pub fn next(&self, state: StateId, symbol: u32) -> Option<StateId> {
        let state = self.states.get(state as usize)?;
        state
            .arcs
            .iter()
            .find(|(range, _)| range.contains(symbol))
            .map(|&(_, target)| target)
    }

    #[inline]
    pub fn next_char(&self, state: StateId, c: char) -> Option<StateId> {
        self.next(state, c as u32)
    }

    #[inline]
    pub fn is_final(&self, state: StateId) -> bool {
        self.states
            .get(state as usize)
            .is_some_and(|s| s.is_final)
    }

    /// Run the whole input from the initial state.
    pub fn accepts(&self, input: &str) -> bool {
        let mut state = self.initial();
        for c in input.chars() {
            match self.next_char(state, c) {
                Some(next) => state = next,
                None => return false,
            }
        }
        self.is_final(state)
    }

    /// Total number of arcs across all states.
    pub fn arc_count(&self) -> usize {
        self.states.iter().map(|s| s.arcs.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_state_dfa() -> Dfa {
        // 0 -[a-c]-> 1(final), 1 -[x]-> 0
        let mut s0 = DfaState::new(false);
        s0.arcs.push((CharRange::between('a', 'c').unwrap(), 1));
        let mut s1 = DfaState::new(true);
        s1.arcs.push((CharRange::single('x'), 0));
        Dfa::from_states(vec![s0, s1])
    }

    #[test]
    fn next_follows_containing_range() {
        let dfa = two_state_dfa();
        assert_eq!(dfa.next_char(0, 'b'), Some(1));
        assert_eq!(dfa.next_char(0, 'd'), None);
        assert_eq!(dfa.next_char(1, 'x'), Some(0));
    }

    #[test]
    fn out_of_range_state() {
        let dfa = two_state_dfa();
        assert_eq!(dfa.next(7, 'a' as u32), None);
        assert!(!dfa.is_final(7));
    }

    #[test]
    fn accepts_runs_whole_input() {
        let dfa = two_state_dfa();
        assert!(dfa.accepts("a"));
        assert!(dfa.accepts("cxb"));
        assert!(!dfa.accepts("cx"));
        assert!(!dfa.accepts(""));
        assert_eq!(dfa.arc_count(), 2);
    }
}
