// Subset construction: NFA -> DFA.

use hashbrown::HashMap;
use log::debug;

use crate::StateId;
use crate::dfa::{Dfa, DfaState};
use crate::nfa::Nfa;
use crate::range::{CharRange, disjoin};

impl Nfa {
    /// Convert this automaton into an equivalent [`Dfa`].
    ///
    /// See [`determinize`].
    pub fn determinize(&self) -> Dfa {
        determinize(self)
    }
}

/// Subset construction over epsilon-closed state sets.
///
/// Each DFA state stands for one epsilon-closed subset of NFA states, keyed
/// by its sorted id list so that equal subsets reached along different paths
/// share one DFA state. For every subset the outgoing ranges of all members
/// are [`disjoin`]ed, so the alphabet is split only where some transition
/// actually distinguishes symbols, never per code point. Neighbouring pieces
/// that lead to the same subset are merged back into one arc.
///
/// The result is not Hopcroft-minimized.
pub fn determinize(nfa: &Nfa) -> Dfa {
    let mut subset_ids: HashMap<Vec<StateId>, StateId> = HashMap::new();
    let mut states: Vec<DfaState> = Vec::new();
    let mut worklist: Vec<(StateId, Vec<StateId>)> = Vec::new();

    let initial = nfa.epsilon_closure([0]);
    states.push(DfaState::new(nfa.contains_final(&initial)));
    subset_ids.insert(initial.clone(), 0);
    worklist.push((0, initial));

    while let Some((id, subset)) = worklist.pop() {
        let moves: Vec<(CharRange, StateId)> =
            subset.iter().flat_map(|&s| nfa.range_arcs(s)).collect();
        let pieces = disjoin(moves.iter().map(|&(range, _)| range));

        let mut arcs: Vec<(CharRange, StateId)> = Vec::with_capacity(pieces.len());
        for piece in pieces {
            // Each piece is either inside or disjoint from every move range.
            let targets = moves
                .iter()
                .filter(|(range, _)| range.covers(&piece))
                .map(|&(_, to)| to);
            let next = nfa.epsilon_closure(targets);

            let target = match subset_ids.get(&next) {
                Some(&existing) => existing,
                None => {
                    let new_id = states.len() as StateId;
                    states.push(DfaState::new(nfa.contains_final(&next)));
                    subset_ids.insert(next.clone(), new_id);
                    worklist.push((new_id, next));
                    new_id
                }
            };

            match arcs.last_mut() {
                Some((prev, prev_target))
                    if *prev_target == target && prev.end() + 1 == piece.start() =>
                {
                    *prev = CharRange::new(prev.start(), piece.end())
                        .unwrap_or(*prev);
                }
                _ => arcs.push((piece, target)),
            }
        }
        states[id as usize].arcs = arcs;
    }

    debug!(
        "determinized {} NFA states into {} DFA states",
        nfa.state_count(),
        states.len()
    );
    Dfa::from_states(states)
}
