//! Fuzz Test - Compares the tree against a reference implementation.
//!
//! Uses `std::collections::BTreeSet` as the known-correct ordered set
//! and checks the full invariant set after every insertion.

use rb_index::{InsertOutcome, Key, RbTree};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;

fn assert_height_bound(tree: &RbTree, op: usize) {
    let n = tree.len() as f64;
    let bound = 2.0 * (n + 1.0).log2();
    assert!(
        tree.height() as f64 <= bound,
        "Height {} exceeds 2*log2(n+1) = {:.2} at op {}",
        tree.height(), bound, op
    );
}

#[test]
fn test_fuzz_against_btreeset() {
    const SEED: u64 = 0xFEEDFACE;
    const OPS: usize = 5_000;

    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let mut tree = RbTree::new();
    let mut reference = BTreeSet::new();

    for i in 0..OPS {
        // Narrow range forces plenty of duplicates
        let key: Key = rng.gen_range(-2_000..2_000);

        let outcome = tree.insert(key);
        let fresh = reference.insert(key);

        assert_eq!(
            outcome.is_inserted(), fresh,
            "Outcome mismatch at op {} for key {}: tree={:?}", i, key, outcome
        );
        assert_eq!(tree.len(), reference.len(), "Length mismatch at op {}", i);

        if let Err(violation) = tree.validate() {
            panic!("Invariant violated at op {} (key {}): {}", i, key, violation);
        }
        assert_height_bound(&tree, i);
    }

    assert!(tree.iter().eq(reference.iter().copied()));
    println!("Fuzz test passed!");
    println!("  Operations: {}", OPS);
    println!("  Final len: {}, height: {}", tree.len(), tree.height());
}

#[test]
fn test_fuzz_membership() {
    const SEED: u64 = 0xBADC0DE;
    const OPS: usize = 20_000;

    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let mut tree = RbTree::new();
    let mut reference = BTreeSet::new();

    for _ in 0..OPS {
        let key: Key = rng.gen_range(-50_000..50_000);
        tree.insert(key);
        reference.insert(key);
    }

    for probe in -50_100..50_100 {
        assert_eq!(
            tree.contains(probe), reference.contains(&probe),
            "Membership mismatch for {}", probe
        );
    }
}

#[test]
fn test_fuzz_sortedness_full_range() {
    const SEED: u64 = 0x12345678;

    for round in 0..20u64 {
        let mut rng = ChaCha8Rng::seed_from_u64(SEED + round);
        let count = rng.gen_range(0..2_000);
        let keys: Vec<Key> = (0..count).map(|_| rng.gen()).collect();

        let tree: RbTree = keys.iter().copied().collect();

        let mut expected = keys.clone();
        expected.sort_unstable();
        expected.dedup();

        assert_eq!(tree.in_order_sequence(), expected, "Round {}", round);
        assert_eq!(tree.min(), expected.first().copied());
        assert_eq!(tree.max(), expected.last().copied());
        assert!(tree.validate().is_ok(), "Round {}", round);
    }
}

#[test]
fn test_fuzz_duplicates_are_idempotent() {
    const SEED: u64 = 0xCAFED00D;

    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let keys: Vec<Key> = (0..3_000).map(|_| rng.gen_range(0..10_000)).collect();

    let once: RbTree = keys.iter().copied().collect();
    let mut twice: RbTree = keys.iter().copied().collect();

    for &key in &keys {
        assert_eq!(twice.insert(key), InsertOutcome::Duplicate);
    }

    assert_eq!(once.len(), twice.len());
    assert_eq!(once.in_order_sequence(), twice.in_order_sequence());
    assert_eq!(once.state_hash(), twice.state_hash());
}
