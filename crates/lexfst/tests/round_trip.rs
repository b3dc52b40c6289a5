//! End-to-end tests: build a dictionary, serialize it with both codecs and
//! query the decoded copies.

use std::collections::BTreeMap;

use lexfst::{Codec, Fst, FstBuilder};
use quickcheck::quickcheck;

const CODECS: [Codec; 2] = [Codec::Raw, Codec::Compressed];

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn dictionary() -> Vec<(&'static str, i32)> {
    vec![
        ("abandon", 11),
        ("ability", 1580),
        ("able", 3),
        ("about", 0),
        ("above", -12),
        ("abstract", 4096),
        ("band", 7),
        ("bandit", 8),
        ("banner", 9),
        ("can", 1),
        ("cannot", 2),
        ("canter", 2),
        ("zebra", 100_000),
        ("\u{e9}t\u{e9}", 42),
        ("\u{fc}ber", 43),
    ]
}

fn sorted(mut pairs: Vec<(&'static str, i32)>) -> Vec<(&'static str, i32)> {
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    pairs
}

fn assert_same_dictionary(fst: &Fst<i32>, pairs: &[(&str, i32)]) {
    for &(key, value) in pairs {
        assert_eq!(fst.try_match(key), Some(value), "key {key:?}");
    }
    let expected: Vec<(String, i32)> = pairs.iter().map(|&(k, v)| (k.to_string(), v)).collect();
    assert_eq!(fst.keys().collect::<Vec<_>>(), expected);
}

// ---------------------------------------------------------------------------
// Fixed dictionary
// ---------------------------------------------------------------------------

#[test]
fn both_codecs_preserve_every_entry() {
    let pairs = sorted(dictionary());
    let fst = FstBuilder::build(pairs.iter().copied()).unwrap();
    assert_same_dictionary(&fst, &pairs);

    for codec in CODECS {
        let bytes = fst.to_bytes(codec);
        let decoded = Fst::from_bytes(&bytes, codec).unwrap();
        assert_same_dictionary(&decoded, &pairs);
        assert_eq!(decoded.len(), pairs.len(), "{codec:?}");
    }
}

#[test]
fn absent_keys_stay_absent() {
    let pairs = sorted(dictionary());
    let fst = FstBuilder::build(pairs.iter().copied()).unwrap();
    for codec in CODECS {
        let decoded = Fst::from_bytes(&fst.to_bytes(codec), codec).unwrap();
        for missing in ["", "a", "ab", "abl", "abilities", "bandits", "cant", "zebras", "\u{e9}"] {
            assert_eq!(decoded.try_match(missing), None, "{codec:?} {missing:?}");
            assert!(!decoded.contains(missing));
        }
    }
}

#[test]
fn reencoding_is_stable() {
    let pairs = sorted(dictionary());
    let fst = FstBuilder::build(pairs.iter().copied()).unwrap();

    let raw = fst.to_bytes(Codec::Raw);
    let raw_again = Fst::from_bytes(&raw, Codec::Raw).unwrap().to_bytes(Codec::Raw);
    assert_eq!(raw, raw_again);

    // Renumbering an already renumbered transducer keeps the order.
    let compressed = fst.to_bytes(Codec::Compressed);
    let decoded = Fst::from_bytes(&compressed, Codec::Compressed).unwrap();
    assert_eq!(decoded.to_bytes(Codec::Compressed), compressed);
}

#[test]
fn codecs_are_not_interchangeable() {
    let fst = FstBuilder::build(sorted(dictionary())).unwrap();
    let raw = fst.to_bytes(Codec::Raw);
    let decoded = Fst::from_bytes(&raw, Codec::Compressed);
    assert!(decoded.map_or(true, |f| f.keys().count() != fst.len()));
}

#[test]
fn compressed_is_smaller() {
    let fst = FstBuilder::build(sorted(dictionary())).unwrap();
    assert!(fst.to_bytes(Codec::Compressed).len() < fst.to_bytes(Codec::Raw).len());
}

#[test]
fn shared_suffixes_survive_round_trip() {
    let words: Vec<String> = ["b", "c", "d", "f", "g", "h", "m", "p", "r", "s"]
        .iter()
        .flat_map(|first| ["ake", "ate", "ave"].map(|rest| format!("{first}{rest}")))
        .collect();
    let pairs: Vec<(&str, i32)> = words.iter().map(|w| (w.as_str(), 1)).collect();
    let fst = FstBuilder::build(pairs.iter().copied()).unwrap();
    // root -> first letter -> 'a' -> {k, t, v} -> 'e' -> final
    assert_eq!(fst.state_count(), 5);

    for codec in CODECS {
        let decoded = Fst::from_bytes(&fst.to_bytes(codec), codec).unwrap();
        assert_eq!(decoded.state_count(), 5);
        assert_eq!(decoded.len(), 30);
        assert_eq!(decoded.try_match("pave"), Some(1));
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn normalize(entries: Vec<(String, i32)>) -> BTreeMap<String, i32> {
    entries.into_iter().filter(|(k, _)| !k.is_empty()).collect()
}

quickcheck! {
    fn prop_round_trip(entries: Vec<(String, i32)>) -> bool {
        let map = normalize(entries);
        let fst = FstBuilder::build(map.iter().map(|(k, v)| (k.as_str(), *v))).unwrap();
        let expected: Vec<(String, i32)> = map.clone().into_iter().collect();

        CODECS.iter().all(|&codec| {
            let Ok(decoded) = Fst::from_bytes(&fst.to_bytes(codec), codec) else {
                return false;
            };
            decoded.keys().collect::<Vec<_>>() == expected
                && map.iter().all(|(k, v)| decoded.try_match(k) == Some(*v))
        })
    }

    fn prop_absent_keys(entries: Vec<(String, i32)>, probes: Vec<String>) -> bool {
        let map = normalize(entries);
        let fst = FstBuilder::build(map.iter().map(|(k, v)| (k.as_str(), *v))).unwrap();
        probes
            .iter()
            .all(|probe| fst.try_match(probe) == map.get(probe).copied())
    }

    fn prop_minimal_never_larger_than_trie(entries: Vec<(String, i32)>) -> bool {
        let map = normalize(entries);
        let minimal = FstBuilder::build(map.iter().map(|(k, v)| (k.as_str(), *v))).unwrap();
        let mut trie = FstBuilder::with_config(lexfst::BuilderConfig::default().with_minimize(false));
        for (k, v) in &map {
            if trie.insert(k, *v).is_err() {
                return false;
            }
        }
        minimal.state_count() <= trie.finish().state_count()
    }
}
