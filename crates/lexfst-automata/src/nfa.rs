// Nondeterministic finite automata with epsilon transitions.

use crate::StateId;
use crate::range::CharRange;

/// Transition label: either a zero-width epsilon move or a code point range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Epsilon,
    Range(CharRange),
}

/// A single NFA transition, as reported by [`Nfa::transitions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NfaTransition {
    pub from: StateId,
    pub to: StateId,
    pub label: Label,
}

/// Nondeterministic automaton over code points.
///
/// States are dense ids `0..state_count()`, with 0 as the initial state.
/// Outgoing transitions are stored per source state; finality is a flag per
/// state.
///
/// The combinators ([`Nfa::any_of`], [`Nfa::concat`], [`Nfa::star`], ...)
/// take their operands by reference and return a fresh automaton. Operands
/// are copied in at an id offset, so the embedded transitions never need to
/// be rewritten beyond the offset and no state is shared between automata.
#[derive(Debug, Clone)]
pub struct Nfa {
    arcs: Vec<Vec<(Label, StateId)>>,
    finals: Vec<bool>,
}

impl Nfa {
    fn with_states(count: usize) -> Self {
        Self {
            arcs: vec![Vec::new(); count],
            finals: vec![false; count],
        }
    }

    /// Automaton accepting no string at all.
    pub fn empty_language() -> Self {
        Self::with_states(1)
    }

    /// Automaton accepting only the empty string.
    pub fn epsilon() -> Self {
        let mut nfa = Self::with_states(1);
        nfa.finals[0] = true;
        nfa
    }

    /// Automaton accepting any single character in `range`.
    pub fn range(range: CharRange) -> Self {
        let mut nfa = Self::with_states(2);
        nfa.add_transition(0, 1, Label::Range(range));
        nfa.finals[1] = true;
        nfa
    }

    /// Automaton accepting exactly the character `c`.
    pub fn symbol(c: char) -> Self {
        Self::range(CharRange::single(c))
    }

    /// Automaton accepting any single character.
    pub fn any() -> Self {
        Self::range(CharRange::ANY)
    }

    /// Automaton accepting exactly `text`.
    pub fn sequence(text: &str) -> Self {
        let mut nfa = Self::with_states(1);
        let mut last = 0;
        for c in text.chars() {
            let next = nfa.new_state();
            nfa.add_transition(last, next, Label::Range(CharRange::single(c)));
            last = next;
        }
        nfa.finals[last as usize] = true;
        nfa
    }

    #[inline]
    pub fn state_count(&self) -> usize {
        self.arcs.len()
    }

    /// Allocate a fresh non-final state. Its id is one past the largest
    /// existing id.
    pub fn new_state(&mut self) -> StateId {
        let id = self.arcs.len() as StateId;
        self.arcs.push(Vec::new());
        self.finals.push(false);
        id
    }

    /// Add a transition between two existing states.
    ///
    /// # Panics
    ///
    /// Panics if either state id is out of range.
    pub fn add_transition(&mut self, from: StateId, to: StateId, label: Label) {
        assert!(
            (to as usize) < self.arcs.len(),
            "transition target {to} out of range"
        );
        self.arcs[from as usize].push((label, to));
    }

    pub fn add_epsilon(&mut self, from: StateId, to: StateId) {
        self.add_transition(from, to, Label::Epsilon);
    }

    pub fn set_final(&mut self, state: StateId, is_final: bool) {
        self.finals[state as usize] = is_final;
    }

    #[inline]
    pub fn is_final(&self, state: StateId) -> bool {
        self.finals.get(state as usize).copied().unwrap_or(false)
    }

    /// Final states in ascending id order.
    pub fn final_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.finals
            .iter()
            .enumerate()
            .filter(|(_, f)| **f)
            .map(|(i, _)| i as StateId)
    }

    /// All transitions, grouped by source state.
    pub fn transitions(&self) -> impl Iterator<Item = NfaTransition> + '_ {
        self.arcs.iter().enumerate().flat_map(|(from, arcs)| {
            arcs.iter().map(move |&(label, to)| NfaTransition {
                from: from as StateId,
                to,
                label,
            })
        })
    }

    /// Non-epsilon transitions leaving `state`.
    pub(crate) fn range_arcs(&self, state: StateId) -> impl Iterator<Item = (CharRange, StateId)> + '_ {
        self.arcs[state as usize].iter().filter_map(|&(label, to)| match label {
            Label::Range(r) => Some((r, to)),
            Label::Epsilon => None,
        })
    }

    /// Copy `other` into `self` with all ids shifted past the existing
    /// states. Returns the offset, which is also the id of `other`'s initial
    /// state inside `self`. Finality is not copied.
    fn embed(&mut self, other: &Nfa) -> StateId {
        let offset = self.arcs.len() as StateId;
        for arcs in &other.arcs {
            self.arcs
                .push(arcs.iter().map(|&(label, to)| (label, to + offset)).collect());
            self.finals.push(false);
        }
        offset
    }

    /// Union: a new initial state with epsilon moves into copies of `a` and `b`.
    pub fn any_of(a: &Nfa, b: &Nfa) -> Nfa {
        let mut nfa = Self::with_states(1);
        let oa = nfa.embed(a);
        let ob = nfa.embed(b);
        nfa.add_epsilon(0, oa);
        nfa.add_epsilon(0, ob);
        for f in a.final_states() {
            nfa.finals[(f + oa) as usize] = true;
        }
        for f in b.final_states() {
            nfa.finals[(f + ob) as usize] = true;
        }
        nfa
    }

    /// Union of any number of automata. An empty input yields
    /// [`Nfa::empty_language`].
    pub fn union_all<'a, I>(parts: I) -> Nfa
    where
        I: IntoIterator<Item = &'a Nfa>,
    {
        let mut nfa = Self::with_states(1);
        for part in parts {
            let offset = nfa.embed(part);
            nfa.add_epsilon(0, offset);
            for f in part.final_states() {
                nfa.finals[(f + offset) as usize] = true;
            }
        }
        nfa
    }

    /// Concatenation: `a`'s final states lead by epsilon into `b`; only
    /// `b`'s final states remain final.
    pub fn concat(a: &Nfa, b: &Nfa) -> Nfa {
        let mut nfa = a.clone();
        nfa.finals.iter_mut().for_each(|f| *f = false);
        let ob = nfa.embed(b);
        for f in a.final_states() {
            nfa.add_epsilon(f, ob);
        }
        for f in b.final_states() {
            nfa.finals[(f + ob) as usize] = true;
        }
        nfa
    }

    /// Kleene star: zero or more repetitions of `a`.
    ///
    /// A dedicated accepting hub becomes the initial state. It enters `a` by
    /// epsilon and every final state of `a` returns to it, so only complete
    /// words of `a` can be chained.
    pub fn star(a: &Nfa) -> Nfa {
        let mut nfa = Self::with_states(1);
        let oa = nfa.embed(a);
        nfa.add_epsilon(0, oa);
        for f in a.final_states() {
            nfa.add_epsilon(f + oa, 0);
        }
        nfa.finals[0] = true;
        nfa
    }

    /// One or more repetitions of `a`.
    pub fn plus(a: &Nfa) -> Nfa {
        Self::concat(a, &Self::star(a))
    }

    /// Zero or one occurrence of `a`.
    pub fn optional(a: &Nfa) -> Nfa {
        Self::any_of(a, &Self::epsilon())
    }

    /// Levenshtein automaton accepting every string within `max_edits`
    /// insertions, deletions or substitutions of `word`.
    ///
    /// State `(i, e)` means "consumed `i` characters of `word` using `e`
    /// edits" and has id `i * (max_edits + 1) + e`, so `(0, 0)` is state 0.
    pub fn within_edit_distance(word: &str, max_edits: u32) -> Nfa {
        let chars: Vec<char> = word.chars().collect();
        let width = max_edits as usize + 1;
        let id = |i: usize, e: usize| (i * width + e) as StateId;
        let mut nfa = Self::with_states((chars.len() + 1) * width);

        for i in 0..=chars.len() {
            for e in 0..width {
                let can_edit = e + 1 < width;
                if i < chars.len() {
                    nfa.add_transition(id(i, e), id(i + 1, e), Label::Range(CharRange::single(chars[i])));
                    if can_edit {
                        // substitution and deletion
                        nfa.add_transition(id(i, e), id(i + 1, e + 1), Label::Range(CharRange::ANY));
                        nfa.add_epsilon(id(i, e), id(i + 1, e + 1));
                    }
                }
                if can_edit {
                    // insertion
                    nfa.add_transition(id(i, e), id(i, e + 1), Label::Range(CharRange::ANY));
                }
            }
        }
        for e in 0..width {
            nfa.finals[id(chars.len(), e) as usize] = true;
        }
        nfa
    }

    /// Epsilon closure of `seeds`, as a sorted, deduplicated id list.
    pub fn epsilon_closure<I>(&self, seeds: I) -> Vec<StateId>
    where
        I: IntoIterator<Item = StateId>,
    {
        let mut seen = vec![false; self.arcs.len()];
        let mut stack = Vec::new();
        for s in seeds {
            if !seen[s as usize] {
                seen[s as usize] = true;
                stack.push(s);
            }
        }
        while let Some(s) = stack.pop() {
            for &(label, to) in &self.arcs[s as usize] {
                if label == Label::Epsilon && !seen[to as usize] {
                    seen[to as usize] = true;
                    stack.push(to);
                }
            }
        }
        seen.iter()
            .enumerate()
            .filter(|(_, s)| **s)
            .map(|(i, _)| i as StateId)
            .collect()
    }

    /// Whether any state of `subset` is final.
    pub(crate) fn contains_final(&self, subset: &[StateId]) -> bool {
        subset.iter().any(|&s| self.is_final(s))
    }

    /// Run the automaton directly, tracking the set of active states.
    pub fn accepts(&self, input: &str) -> bool {
        let mut current = self.epsilon_closure([0]);
        for c in input.chars() {
            let symbol = c as u32;
            let targets: Vec<StateId> = current
                .iter()
                .flat_map(|&s| self.range_arcs(s))
                .filter(|(r, _)| r.contains(symbol))
                .map(|(_, to)| to)
                .collect();
            if targets.is_empty() {
                return false;
            }
            current = self.epsilon_closure(targets);
        }
        self.contains_final(&current)
    }
}
