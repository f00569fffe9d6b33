use std::collections::BTreeMap;

use avl_bimap::Bimap;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

const N: u32 = 300;

/// Forward and backward maps kept in step with the bimap under test.
#[derive(Default)]
struct Model {
    forward: BTreeMap<u32, u32>,
    backward: BTreeMap<u32, u32>,
}

impl Model {
    fn insert(&mut self, l: u32, r: u32) -> bool {
        if self.forward.contains_key(&l) || self.backward.contains_key(&r) {
            return false;
        }
        self.forward.insert(l, r);
        self.backward.insert(r, l);
        true
    }

    fn remove_left(&mut self, l: u32) -> bool {
        match self.forward.remove(&l) {
            Some(r) => {
                self.backward.remove(&r);
                true
            }
            None => false,
        }
    }

    fn remove_right(&mut self, r: u32) -> bool {
        match self.backward.remove(&r) {
            Some(l) => {
                self.forward.remove(&l);
                true
            }
            None => false,
        }
    }
}

fn assert_matches(bimap: &Bimap<u32, u32>, model: &Model) {
    bimap.validate().unwrap();
    assert_eq!(bimap.len(), model.forward.len());

    let left: Vec<(u32, u32)> = bimap.iter_left().map(|(l, r)| (*l, *r)).collect();
    let expected: Vec<(u32, u32)> = model.forward.iter().map(|(l, r)| (*l, *r)).collect();
    assert_eq!(left, expected);

    let right: Vec<(u32, u32)> = bimap.iter_right().map(|(r, l)| (*r, *l)).collect();
    let expected: Vec<(u32, u32)> = model.backward.iter().map(|(r, l)| (*r, *l)).collect();
    assert_eq!(right, expected);
}

#[test]
fn random_operations_match_model() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut bimap = Bimap::new();
    let mut model = Model::default();

    for _ in 0..5_000 {
        let l = rng.gen_range(0..N);
        let r = rng.gen_range(0..N);
        match rng.gen_range(0..4) {
            0 | 1 => {
                let inserted = model.insert(l, r);
                let pos = bimap.insert(l, r);
                assert_eq!(!pos.is_end(), inserted);
                if inserted {
                    assert_eq!(bimap.value(pos), Some(&l));
                    assert_eq!(bimap.paired(pos), Some(&r));
                }
            }
            2 => assert_eq!(bimap.erase_left_key(&l), model.remove_left(l)),
            _ => assert_eq!(bimap.erase_right_key(&r), model.remove_right(r)),
        }
        assert_eq!(bimap.len(), model.forward.len());
    }
    assert_matches(&bimap, &model);
}

#[test]
fn flip_round_trips_everywhere() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut rights: Vec<u32> = (0..N).collect();
    rights.shuffle(&mut rng);
    let bimap: Bimap<u32, u32> = (0..N).zip(rights.iter().copied()).collect();

    let mut pos = bimap.begin_left();
    while !pos.is_end() {
        assert_eq!(pos.flip().flip(), pos);
        assert_eq!(bimap.value(pos.flip()), bimap.paired(pos));

        let l = *bimap.value(pos).unwrap();
        let r = *bimap.paired(pos).unwrap();
        assert_eq!(bimap.find_right(&r), pos.flip());
        assert_eq!(bimap.at_right(&r), Ok(&l));
        pos = bimap.next(pos);
    }
}

#[test]
fn erase_removes_from_both_sides() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut keys: Vec<u32> = (0..N).collect();
    keys.shuffle(&mut rng);

    let mut bimap: Bimap<u32, u32> = keys.iter().map(|k| (*k, k + N)).collect();
    let mut model = Model::default();
    for k in &keys {
        model.insert(*k, k + N);
    }
    assert_matches(&bimap, &model);

    keys.shuffle(&mut rng);
    for (i, k) in keys.iter().enumerate() {
        let paired = *bimap.at_left(k).unwrap();
        if i % 2 == 0 {
            bimap.erase_left(bimap.find_left(k));
        } else {
            bimap.erase_right(bimap.find_left(k).flip());
        }
        model.remove_left(*k);

        assert!(bimap.find_left(k).is_end());
        assert!(bimap.find_right(&paired).is_end());
        if i % 16 == 0 {
            assert_matches(&bimap, &model);
        }
    }
    assert!(bimap.is_empty());
    assert!(bimap.begin_left().is_end());
    assert!(bimap.begin_right().is_end());
}

#[test]
fn conflicting_inserts_leave_everything_unchanged() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut bimap: Bimap<u32, u32> = (0..N).map(|k| (k, N - k)).collect();
    let before = bimap.clone();

    for _ in 0..1_000 {
        let k = rng.gen_range(0..N);
        let fresh = rng.gen_range(N + 1..2 * N);
        assert!(bimap.insert(k, fresh).is_end());
        assert!(bimap.insert(fresh, N - k).is_end());
    }
    assert_eq!(bimap, before);
    bimap.validate().unwrap();
}

#[test]
fn reverse_iteration_matches_forward() {
    let mut rng = StdRng::seed_from_u64(4);
    let bimap: Bimap<u32, u32> = (0..500)
        .map(|_| (rng.gen_range(0..10_000), rng.gen_range(0..10_000)))
        .collect();

    let forward: Vec<_> = bimap.iter_right().collect();
    let mut backward: Vec<_> = bimap.iter_right().rev().collect();
    backward.reverse();
    assert_eq!(forward, backward);

    let mut pos = bimap.end_right();
    let mut stepped = Vec::new();
    loop {
        pos = bimap.prev(pos);
        match bimap.value(pos) {
            Some(r) => stepped.push(*r),
            None => break,
        }
    }
    stepped.reverse();
    let expected: Vec<u32> = forward.iter().map(|(r, _)| **r).collect();
    assert_eq!(stepped, expected);
}
