#![cfg(test)]

// Property tests for Map kept inside the crate so they sit next to the
// layers they exercise. The reference model is an IndexMap, whose insert
// keeps an existing key's position (matching in-place overwrite) and whose
// shift_remove preserves the order of the remainder (matching unlinking).

use crate::Map;
use indexmap::IndexMap;
use proptest::prelude::*;

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys and op lists shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Put(usize, u16),
    Delete(usize),
    Get(usize),
    Clear,
}

fn op_strategy(pool: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        5 => (0..pool, any::<u16>()).prop_map(|(k, v)| Op::Put(k, v)),
        3 => (0..pool).prop_map(Op::Delete),
        3 => (0..pool).prop_map(Op::Get),
        1 => Just(Op::Clear),
    ]
}

fn key(i: usize) -> Vec<u8> {
    format!("k{i}").into_bytes()
}

fn value(v: u16) -> Vec<u8> {
    format!("v{v}").into_bytes()
}

proptest! {
    // Invariants checked against the model after every operation:
    // - len() equals the number of distinct keys present.
    // - get() agrees with the model for the touched key.
    // - keys() agrees with the model's key order (insertion order, with
    //   overwrite-in-place and delete-then-reinsert-at-tail semantics).
    #[test]
    fn prop_map_matches_ordered_model(
        pool in 1usize..=6,
        ops in proptest::collection::vec(op_strategy(6), 1..120),
    ) {
        let mut m = Map::new();
        let mut model: IndexMap<Vec<u8>, Vec<u8>> = IndexMap::new();

        for op in ops {
            match op {
                Op::Put(i, v) => {
                    let (k, v) = (key(i % pool), value(v));
                    m.put(&k, &v).unwrap();
                    model.insert(k, v);
                }
                Op::Delete(i) => {
                    let k = key(i % pool);
                    let removed = m.delete(&k).unwrap();
                    let expected = model.shift_remove(&k);
                    prop_assert_eq!(removed, expected);
                }
                Op::Get(i) => {
                    let k = key(i % pool);
                    prop_assert_eq!(m.get(&k).unwrap(), model.get(&k).cloned());
                }
                Op::Clear => {
                    m.clear().unwrap();
                    model.clear();
                }
            }

            prop_assert_eq!(m.len().unwrap(), model.len() as u64);
            let keys = m.keys().unwrap();
            let expected: Vec<Vec<u8>> = model.keys().cloned().collect();
            prop_assert_eq!(keys, expected);
        }

        // Full-content parity at the end, values included.
        prop_assert_eq!(m.to_map().unwrap(), model);
    }

    // to_map/from_pairs round-trip: rebuilding from a snapshot yields the
    // same snapshot (keys in the same order, same values).
    #[test]
    fn prop_snapshot_round_trips(
        pairs in proptest::collection::vec(
            (proptest::collection::vec(any::<u8>(), 0..8),
             proptest::collection::vec(any::<u8>(), 0..8)),
            0..40,
        ),
    ) {
        let mut m = Map::from_pairs(pairs.iter().map(|(k, v)| (&k[..], &v[..])));
        let snapshot = m.to_map().unwrap();

        let mut rebuilt = Map::from_pairs(snapshot.iter().map(|(k, v)| (&k[..], &v[..])));
        prop_assert_eq!(rebuilt.to_map().unwrap(), snapshot);
    }
}
