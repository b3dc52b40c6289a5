// Online construction of minimal acyclic transducers from sorted input.
//
// Keys arrive in ascending order. The path of the most recent key is kept as
// a stack of mutable draft nodes, one per depth. When the next key diverges
// at some depth, every draft below the divergence point can no longer
// change: it is frozen, deduplicated against all previously frozen nodes and
// replaced by an arena index. Frozen nodes are never touched again.

use std::hash::BuildHasher;

use hashbrown::{DefaultHashBuilder, HashTable};
use log::{debug, trace};

use crate::config::BuilderConfig;
use crate::fst::{Fst, StateDef};
use crate::output::PushableOutput;
use crate::transition::Transition;
use crate::{FstError, Result, StateId};

/// Arc of a frozen node, or a closed arc of a draft node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FrozenArc<T> {
    input: char,
    output: T,
    target: u32,
}

/// Immutable node in the builder's arena. Equality covers finality and every
/// arc including its output, which is the identity used for sharing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FrozenNode<T> {
    is_final: bool,
    arcs: Box<[FrozenArc<T>]>,
}

/// The arc from a draft node to the next draft on the current path. Its
/// target is implicit (the draft one level deeper) until that draft freezes.
#[derive(Debug, Clone)]
struct OpenArc<T> {
    input: char,
    output: T,
}

#[derive(Debug, Clone)]
struct DraftNode<T> {
    arcs: Vec<FrozenArc<T>>,
    open: Option<OpenArc<T>>,
    is_final: bool,
}

impl<T> Default for DraftNode<T> {
    fn default() -> Self {
        Self {
            arcs: Vec::new(),
            open: None,
            is_final: false,
        }
    }
}

impl<T> DraftNode<T> {
    /// Attach the frozen child to the open arc.
    fn close(&mut self, target: u32) {
        if let Some(open) = self.open.take() {
            self.arcs.push(FrozenArc {
                input: open.input,
                output: open.output,
                target,
            });
        }
    }
}

/// Counters collected while building.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Keys inserted.
    pub keys: usize,
    /// Distinct frozen nodes, i.e. states of the result.
    pub states: usize,
    /// Freezes answered by an existing equal node.
    pub dedup_hits: usize,
    /// Longest key seen, in characters.
    pub max_key_length: usize,
}

/// Builds an [`Fst`] from `(key, output)` pairs in strictly ascending key
/// order.
///
/// Prefixes are shared through the draft path and suffixes through the
/// dedup table, giving the minimal acyclic transducer for the input. Outputs
/// are pushed toward the root along shared prefixes so that nodes whose
/// suffix outputs agree can be merged. Building is one-shot: [`finish`]
/// consumes the builder.
///
/// ```
/// use lexfst::FstBuilder;
///
/// let mut builder = FstBuilder::new();
/// builder.insert("cat", 5).unwrap();
/// builder.insert("dog", 9).unwrap();
/// let fst = builder.finish();
/// assert_eq!(fst.try_match("dog"), Some(9));
/// assert_eq!(fst.try_match("cow"), None);
/// ```
///
/// [`finish`]: FstBuilder::finish
pub struct FstBuilder<T = i32> {
    config: BuilderConfig,
    drafts: Vec<DraftNode<T>>,
    previous: Vec<char>,
    frozen: Vec<FrozenNode<T>>,
    dedup: HashTable<u32>,
    hasher: DefaultHashBuilder,
    stats: BuildStats,
}

impl<T: PushableOutput> Default for FstBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PushableOutput> FstBuilder<T> {
    pub fn new() -> Self {
        Self::with_config(BuilderConfig::default())
    }

    pub fn with_config(config: BuilderConfig) -> Self {
        let mut drafts = Vec::with_capacity(config.max_key_length + 1);
        drafts.push(DraftNode::default());
        Self {
            config,
            drafts,
            previous: Vec::new(),
            frozen: Vec::new(),
            dedup: HashTable::new(),
            hasher: DefaultHashBuilder::default(),
            stats: BuildStats::default(),
        }
    }

    /// Build in one call from pairs already in ascending key order.
    pub fn build<I, K>(pairs: I) -> Result<Fst<T>>
    where
        I: IntoIterator<Item = (K, T)>,
        K: AsRef<str>,
    {
        let mut builder = Self::new();
        for (key, output) in pairs {
            builder.insert(key.as_ref(), output)?;
        }
        Ok(builder.finish())
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Add the next key.
    ///
    /// Fails if `key` is empty, too long, equal to the previous key or
    /// sorts before it. A failed insert leaves the builder unchanged.
    pub fn insert(&mut self, key: &str, output: T) -> Result<()> {
        let current: Vec<char> = key.chars().collect();
        if current.is_empty() {
            return Err(FstError::EmptyKey);
        }
        if current.len() > self.config.max_key_length {
            return Err(FstError::KeyTooLong {
                length: current.len(),
                max: self.config.max_key_length,
            });
        }
        if self.stats.keys > 0 {
            match current.cmp(&self.previous) {
                std::cmp::Ordering::Less => {
                    return Err(FstError::OutOfOrder {
                        previous: self.previous.iter().collect(),
                        current: key.to_string(),
                    });
                }
                std::cmp::Ordering::Equal => {
                    return Err(FstError::DuplicateKey(key.to_string()));
                }
                std::cmp::Ordering::Greater => {}
            }
        }

        let common = common_prefix_len(&self.previous, &current);
        trace!("insert {key:?}: shares {common} characters with previous key");

        // The previous key's suffix below the shared prefix is complete.
        self.freeze_path(common);

        let remaining = self.push_outputs(common, output);

        // Fresh drafts for the new suffix.
        while self.drafts.len() <= current.len() {
            self.drafts.push(DraftNode::default());
        }
        for depth in common + 1..=current.len() {
            self.drafts[depth] = DraftNode::default();
            self.drafts[depth - 1].open = Some(OpenArc {
                input: current[depth - 1],
                output: T::zero(),
            });
        }
        self.drafts[current.len()].is_final = true;

        // Whatever the shared arcs did not absorb goes on the first new arc.
        // `current` sorts after `previous`, so it is never a prefix of it and
        // that arc always exists.
        if let Some(open) = self.drafts[common].open.as_mut() {
            open.output = remaining;
        }

        self.stats.keys += 1;
        self.stats.max_key_length = self.stats.max_key_length.max(current.len());
        self.previous = current;
        Ok(())
    }

    /// Redistribute outputs along the `common` shared arcs of the current
    /// path and return the part of `output` still unassigned.
    ///
    /// Each shared arc keeps the smaller of its output and what is left of
    /// the new key's output; the difference moves onto every arc leaving the
    /// arc's target, so other keys through that target keep their totals.
    /// When a shorter key ends at the target, nothing can be moved below it
    /// and the arc keeps its output unchanged, which may leave the remainder
    /// negative.
    fn push_outputs(&mut self, common: usize, output: T) -> T {
        let mut remaining = output;
        for depth in 1..=common {
            let target_is_final = self.drafts[depth].is_final;
            let Some(arc) = self.drafts[depth - 1].open.as_mut() else {
                break;
            };
            let existing = arc.output.clone();
            let kept = if target_is_final {
                existing.clone()
            } else {
                existing.common(&remaining)
            };
            let residue = existing.subtract(&kept);
            remaining = remaining.subtract(&kept);
            arc.output = kept;

            if residue != T::zero() {
                let target = &mut self.drafts[depth];
                for a in target.arcs.iter_mut() {
                    a.output = residue.aggregate(&a.output);
                }
                if let Some(open) = target.open.as_mut() {
                    open.output = residue.aggregate(&open.output);
                }
            }
        }
        remaining
    }

    /// Freeze drafts from the end of the previous key up to (excluding)
    /// `depth`, wiring each into its parent's open arc.
    fn freeze_path(&mut self, depth: usize) {
        for d in (depth + 1..=self.previous.len()).rev() {
            let id = self.freeze(d);
            self.drafts[d - 1].close(id);
        }
    }

    /// Turn the draft at `depth` into a frozen node, reusing an equal node
    /// if one exists.
    fn freeze(&mut self, depth: usize) -> u32 {
        let draft = std::mem::take(&mut self.drafts[depth]);
        debug_assert!(draft.open.is_none(), "freezing a draft with an open arc");
        let node = FrozenNode {
            is_final: draft.is_final,
            arcs: draft.arcs.into_boxed_slice(),
        };

        if !self.config.minimize {
            return self.push_frozen(node);
        }

        let hash = self.hasher.hash_one(&node);
        if let Some(&id) = self
            .dedup
            .find(hash, |&id| self.frozen[id as usize] == node)
        {
            self.stats.dedup_hits += 1;
            return id;
        }
        let id = self.push_frozen(node);
        self.dedup
            .insert_unique(hash, id, |&id| self.hasher.hash_one(&self.frozen[id as usize]));
        id
    }

    fn push_frozen(&mut self, node: FrozenNode<T>) -> u32 {
        let id = self.frozen.len() as u32;
        self.frozen.push(node);
        id
    }

    /// Freeze what is left and emit the transducer.
    pub fn finish(self) -> Fst<T> {
        self.finish_with_stats().0
    }

    /// Like [`FstBuilder::finish`], also returning the build counters.
    pub fn finish_with_stats(mut self) -> (Fst<T>, BuildStats) {
        self.freeze_path(0);
        let root = self.freeze(0);
        let fst = self.emit(root);
        self.stats.states = fst.state_count();
        debug!(
            "built transducer: {} keys, {} states, {} transitions, {} shared suffixes",
            self.stats.keys,
            self.stats.states,
            fst.transition_count(),
            self.stats.dedup_hits
        );
        (fst, self.stats)
    }

    /// Renumber the frozen graph in depth-first pre-order from `root`, so
    /// the initial state is 0, and copy it into an [`Fst`].
    fn emit(&self, root: u32) -> Fst<T> {
        const UNASSIGNED: StateId = StateId::MAX;
        let mut new_ids = vec![UNASSIGNED; self.frozen.len()];
        let mut order: Vec<u32> = Vec::with_capacity(self.frozen.len());
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            if new_ids[node as usize] != UNASSIGNED {
                continue;
            }
            new_ids[node as usize] = order.len() as StateId;
            order.push(node);
            // Reversed so the smallest symbol is visited first.
            for arc in self.frozen[node as usize].arcs.iter().rev() {
                if new_ids[arc.target as usize] == UNASSIGNED {
                    stack.push(arc.target);
                }
            }
        }

        let states = order
            .iter()
            .map(|&node| {
                let node = &self.frozen[node as usize];
                StateDef {
                    is_final: node.is_final,
                    transitions: node
                        .arcs
                        .iter()
                        .map(|a| Transition::new(a.input, a.output.clone(), new_ids[a.target as usize]))
                        .collect(),
                }
            })
            .collect();
        Fst::from_states_unchecked(0, states)
    }
}

fn common_prefix_len(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(pairs: &[(&str, i32)]) -> Fst<i32> {
        FstBuilder::build(pairs.iter().map(|&(k, v)| (k, v))).unwrap()
    }

    fn assert_all(fst: &Fst<i32>, pairs: &[(&str, i32)]) {
        for &(k, v) in pairs {
            assert_eq!(fst.try_match(k), Some(v), "key {k:?}");
        }
    }

    const ABILITY: &[(&str, i32)] = &[("a", 4), ("ab", 3134), ("abilities", 7488), ("ability", 1580)];

    #[test]
    fn ability_scenario() {
        let fst = build(ABILITY);
        assert_eq!(fst.try_match("ab"), Some(3134));
        assert_eq!(fst.try_match("abc"), None);
        assert_eq!(fst.try_match("abil"), None);
        assert_all(&fst, ABILITY);
    }

    #[test]
    fn prefix_key_with_larger_output() {
        let pairs = [("a", 10), ("ab", 3), ("abc", 1), ("abd", 20)];
        let fst = build(&pairs);
        assert_all(&fst, &pairs);
    }

    #[test]
    fn negative_and_zero_outputs() {
        let pairs = [("apple", -5), ("apply", 0), ("banana", i32::MIN), ("band", i32::MAX)];
        let fst = build(&pairs);
        assert_all(&fst, &pairs);
    }

    #[test]
    fn empty_builder_yields_empty_fst() {
        let fst = FstBuilder::<i32>::new().finish();
        assert_eq!(fst.state_count(), 1);
        assert!(fst.is_empty());
        assert_eq!(fst.try_match("a"), None);
    }

    #[test]
    fn reject_out_of_order() {
        let mut builder = FstBuilder::new();
        builder.insert("b", 1).unwrap();
        let err = builder.insert("a", 2).unwrap_err();
        assert_eq!(
            err,
            FstError::OutOfOrder {
                previous: "b".to_string(),
                current: "a".to_string()
            }
        );
        // The builder is still usable after the rejected key.
        builder.insert("c", 3).unwrap();
        let fst = builder.finish();
        assert_eq!(fst.try_match("b"), Some(1));
        assert_eq!(fst.try_match("c"), Some(3));
    }

    #[test]
    fn reject_duplicate_and_empty() {
        let mut builder = FstBuilder::new();
        builder.insert("a", 1).unwrap();
        assert_eq!(builder.insert("a", 1), Err(FstError::DuplicateKey("a".to_string())));
        assert_eq!(builder.insert("", 1), Err(FstError::EmptyKey));
    }

    #[test]
    fn reject_long_key() {
        let mut builder = FstBuilder::with_config(BuilderConfig::default().with_max_key_length(3));
        builder.insert("abc", 1).unwrap();
        assert_eq!(
            builder.insert("abcd", 1),
            Err(FstError::KeyTooLong { length: 4, max: 3 })
        );
    }

    #[test]
    fn shared_suffixes_are_merged() {
        // All four keys end in "ing"; with equal outputs the suffix is shared.
        let pairs = [("bring", 1), ("king", 1), ("ring", 1), ("sing", 1)];
        let mut builder = FstBuilder::new();
        for &(k, v) in &pairs {
            builder.insert(k, v).unwrap();
        }
        let (fst, stats) = builder.finish_with_stats();
        assert_all(&fst, &pairs);
        assert!(stats.dedup_hits > 0);
        // root, b, br, then the shared "ing" chain: i, n, g(final)
        assert_eq!(fst.state_count(), 6);
    }

    #[test]
    fn minimized_not_larger_than_trie() {
        let pairs = [
            ("cat", 1),
            ("cats", 2),
            ("dog", 3),
            ("dogs", 4),
            ("frog", 5),
            ("frogs", 6),
        ];
        let minimal = build(&pairs);
        let mut trie_builder = FstBuilder::with_config(BuilderConfig::default().with_minimize(false));
        for &(k, v) in &pairs {
            trie_builder.insert(k, v).unwrap();
        }
        let trie = trie_builder.finish();
        assert_all(&minimal, &pairs);
        assert_all(&trie, &pairs);
        assert!(minimal.state_count() < trie.state_count());
        // The trie has one state per distinct prefix, including the root.
        assert_eq!(trie.state_count(), 14);
    }

    #[test]
    fn no_two_states_are_equal() {
        let pairs = [
            ("aa", 1),
            ("ab", 1),
            ("ba", 1),
            ("bb", 1),
            ("ca", 2),
            ("cb", 1),
        ];
        let fst = build(&pairs);
        assert_all(&fst, &pairs);
        for a in 0..fst.state_count() as StateId {
            for b in a + 1..fst.state_count() as StateId {
                let same = fst.is_final(a) == fst.is_final(b) && fst.transitions(a) == fst.transitions(b);
                assert!(!same, "states {a} and {b} are duplicates");
            }
        }
    }

    #[test]
    fn initial_state_is_zero_and_ordered() {
        let fst = build(ABILITY);
        assert_eq!(fst.initial(), 0);
        for s in 0..fst.state_count() as StateId {
            let ts = fst.transitions(s);
            assert!(ts.windows(2).all(|w| w[0].input < w[1].input));
        }
    }

    #[test]
    fn keys_enumerate_in_input_order() {
        let fst = build(ABILITY);
        let keys: Vec<(String, i32)> = fst.keys().collect();
        let expected: Vec<(String, i32)> = ABILITY.iter().map(|&(k, v)| (k.to_string(), v)).collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn unicode_keys() {
        let pairs = [("hyvä", 1), ("hyvää", 2), ("äiti", 3), ("öljy", 4)];
        let fst = build(&pairs);
        assert_all(&fst, &pairs);
    }

    #[test]
    fn stats_track_keys() {
        let mut builder = FstBuilder::new();
        builder.insert("ab", 1).unwrap();
        builder.insert("abcd", 2).unwrap();
        assert_eq!(builder.stats().keys, 2);
        assert_eq!(builder.stats().max_key_length, 4);
    }
}
