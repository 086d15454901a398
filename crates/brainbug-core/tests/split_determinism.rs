//! Split reproducibility and partition properties.

use brainbug_core::{
    shuffled_indices, split, CuratedExample, DetectionExample, SplitRatios, DEFAULT_SEED,
};
use std::collections::HashSet;

fn examples(n: usize) -> Vec<CuratedExample> {
    (0..n)
        .map(|i| {
            CuratedExample::Detection(DetectionExample {
                code: format!("buggy_{i}()"),
                label: 1,
                bug_type: "WAV".to_string(),
                bug_description: String::new(),
                fixed_code: format!("fixed_{i}()"),
            })
        })
        .collect()
}

fn codes(xs: &[CuratedExample]) -> Vec<String> {
    xs.iter().map(|e| e.input_code().to_string()).collect()
}

#[test]
fn same_seed_gives_identical_splits() {
    let data = examples(100);
    let a = split(&data, SplitRatios::EIGHTY_TEN_TEN, DEFAULT_SEED).expect("split a");
    let b = split(&data, SplitRatios::EIGHTY_TEN_TEN, DEFAULT_SEED).expect("split b");
    assert_eq!(a, b);
}

#[test]
fn different_seed_changes_assignment() {
    let data = examples(100);
    let a = split(&data, SplitRatios::EIGHTY_TEN_TEN, 1).expect("split a");
    let b = split(&data, SplitRatios::EIGHTY_TEN_TEN, 2).expect("split b");
    assert_ne!(codes(a.test.examples()), codes(b.test.examples()));
}

#[test]
fn splits_partition_the_input() {
    for n in [0usize, 1, 2, 3, 7, 16, 99, 1000] {
        let data = examples(n);
        let set = split(&data, SplitRatios::SEVENTY_FIFTEEN_FIFTEEN, DEFAULT_SEED).expect("split");
        assert_eq!(set.total(), n, "n = {n}");

        let mut seen = HashSet::new();
        for part in set.iter() {
            for code in codes(part.examples()) {
                assert!(seen.insert(code), "duplicate across splits for n = {n}");
            }
        }
        assert_eq!(seen.len(), n);
    }
}

#[test]
fn eighty_ten_ten_on_a_thousand() {
    let set = split(&examples(1000), SplitRatios::EIGHTY_TEN_TEN, DEFAULT_SEED).expect("split");
    assert_eq!((set.train.len(), set.val.len(), set.test.len()), (800, 100, 100));
}

#[test]
fn shuffle_is_a_permutation() {
    let mut idx = shuffled_indices(50, 7);
    assert_ne!(idx, (0..50).collect::<Vec<_>>());
    idx.sort_unstable();
    assert_eq!(idx, (0..50).collect::<Vec<_>>());
}

#[test]
fn bad_ratios_are_rejected_before_splitting() {
    let ratios = SplitRatios {
        train: 0.5,
        val: 0.5,
        test: 0.5,
    };
    assert!(split(&examples(10), ratios, DEFAULT_SEED).is_err());
    assert!(SplitRatios::parse("0.8,0.1").is_err());
    assert!(SplitRatios::parse("0.8,0.1,0.1").is_ok());
}
