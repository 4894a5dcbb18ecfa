#![cfg(test)]

// Property tests for Map and Set kept inside the crate so they can check
// bin/entry consistency through the crate-private table.

use crate::map::Map;
use crate::set::Set;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::{BuildHasher, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations so shrinking moves toward earlier keys.
#[derive(Clone, Debug)]
enum Op {
    Assign(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    HasValue(i32),
    Iterate,
    Clear,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,6}", 1..=48).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => (idx.clone(), -8i32..8).prop_map(|(i, v)| Op::Assign(i, v)),
            4 => idx.clone().prop_map(Op::Remove),
            2 => idx.clone().prop_map(Op::Get),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,6}".prop_map(|s| s)
            ]
            .prop_map(Op::Contains),
            1 => (idx.clone(), -3i32..3).prop_map(|(i, d)| Op::Mutate(i, d)),
            1 => (-8i32..8).prop_map(Op::HasValue),
            1 => Just(Op::Iterate),
            1 => Just(Op::Clear),
        ];
        proptest::collection::vec(op, 1..200).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run_map_scenario<S: BuildHasher>(
    mut sut: Map<'static, Key, i32, S>,
    pool: Vec<String>,
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<Key, i32> = HashMap::new();
    for op in ops {
        match op {
            Op::Assign(i, v) => {
                let k = key_from(&pool, i);
                prop_assert_eq!(sut.assign(k.clone(), v), model.insert(k, v));
            }
            Op::Remove(i) => {
                let k = key_from(&pool, i);
                prop_assert_eq!(sut.remove(&k), model.remove(&k));
                prop_assert!(!sut.contains_key(&k));
            }
            Op::Get(i) => {
                let k = key_from(&pool, i);
                prop_assert_eq!(sut.get(&k), model.get(&k));
            }
            Op::Contains(s) => {
                prop_assert_eq!(sut.contains_key(s.as_str()), model.contains_key(s.as_str()));
            }
            Op::Mutate(i, d) => {
                let k = key_from(&pool, i);
                if let Some(v) = sut.get_mut(&k) {
                    *v += d;
                }
                if let Some(v) = model.get_mut(&k) {
                    *v += d;
                }
            }
            Op::HasValue(v) => {
                prop_assert_eq!(sut.contains_value(&v), model.values().any(|x| *x == v));
            }
            Op::Iterate => {
                let s_keys: BTreeSet<_> = sut.keys().cloned().collect();
                let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(s_keys, m_keys);
            }
            Op::Clear => {
                sut.clear();
                model.clear();
            }
        }

        sut.assert_consistent();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        for (k, v) in &model {
            prop_assert_eq!(sut.get(k), Some(v));
        }
    }
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `assign` updates in place: previous value returned, length unchanged.
// - Removed keys are absent afterwards; remaining keys are all still found
//   (bin indices stay correct after compaction and backward shifts).
// - Borrowed lookups (`&str` against `Key`) agree with the model.
// - Bins and entries stay consistent through every grow and shrink.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_map_scenario(Map::new(), pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: same invariants as above with every key in one probe run, so
// matches are decided by `Eq` alone and every removal shifts the run.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_map_scenario(Map::with_hasher(ConstBuildHasher), pool, ops)?;
    }
}

// Property: removing every inserted member, in any order, leaves the set
// empty and never loses a member that has not been removed yet.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_set_remove_all_any_order(
        members in proptest::collection::hash_set(0u32..10_000, 0..200),
        seed in any::<u64>(),
    ) {
        let mut sut = Set::new();
        for &m in &members {
            prop_assert!(sut.add(m));
        }
        prop_assert_eq!(sut.len(), members.len());

        let mut order: Vec<u32> = members.iter().copied().collect();
        // Deterministic shuffle from the seed.
        let mut state = seed | 1;
        for i in (1..order.len()).rev() {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            order.swap(i, (state >> 33) as usize % (i + 1));
        }

        let mut remaining: HashSet<u32> = members;
        for m in order {
            prop_assert!(sut.remove(&m));
            remaining.remove(&m);
            prop_assert!(!sut.contains(&m));
            for r in &remaining {
                prop_assert!(sut.contains(r));
            }
            sut.assert_consistent();
        }
        prop_assert!(sut.is_empty());
    }
}
