//! Property-based tests for the mining core.
//!
//! Covers drift-ratio bounds, arrival-order insensitivity of item supports,
//! and structural consistency of the tree under mixed insert/prune activity.

use proptest::prelude::*;
use rustc_hash::FxHashSet;

use driftmine_core::{drift_ratio, ItemId, PrefixTree, Transaction};

fn arb_item_set() -> impl Strategy<Value = FxHashSet<ItemId>> {
    prop::collection::hash_set(0u32..20, 0..10).prop_map(|s| s.into_iter().collect())
}

/// Small transactions over a tiny alphabet so prefix sharing actually occurs.
fn arb_transactions() -> impl Strategy<Value = Vec<Transaction>> {
    let item = prop::sample::select(vec!["a", "b", "c", "d", "e"]);
    prop::collection::vec(prop::collection::hash_set(item, 1..4), 1..25).prop_map(|txs| {
        txs.into_iter()
            .map(|set| set.into_iter().map(str::to_string).collect())
            .collect()
    })
}

proptest! {
    /// drift_ratio is bounded by [0, 1] and is 0 exactly for equal sets.
    #[test]
    fn drift_ratio_bounds(old in arb_item_set(), new in arb_item_set()) {
        let ratio = drift_ratio(&old, &new);
        prop_assert!((0.0..=1.0).contains(&ratio));
        prop_assert_eq!(ratio == 0.0, old == new);
    }

    /// Inserting the same multiset of transactions in a permuted order may
    /// build a different tree shape but must agree on every item's final
    /// aggregate support.
    #[test]
    fn item_supports_are_arrival_order_independent(
        transactions in arb_transactions().prop_shuffle().no_shrink()
    ) {
        let mut sorted = transactions.clone();
        sorted.sort();

        let mut permuted_tree = PrefixTree::new();
        let mut sorted_tree = PrefixTree::new();
        for (tid, basket) in transactions.iter().enumerate() {
            permuted_tree.insert(basket, 5, tid as u64);
        }
        for (tid, basket) in sorted.iter().enumerate() {
            sorted_tree.insert(basket, 5, tid as u64);
        }

        for label in ["a", "b", "c", "d", "e"] {
            prop_assert_eq!(
                permuted_tree.label_support(label),
                sorted_tree.label_support(label),
                "support of {} depends on arrival order", label
            );
        }
    }

    /// After any insert sequence, leaf tails split exactly: pre + cur == count,
    /// and the root's children counts sum to the number of transactions.
    #[test]
    fn tree_counters_stay_consistent(transactions in arb_transactions()) {
        let mut tree = PrefixTree::new();
        for (tid, basket) in transactions.iter().enumerate() {
            tree.insert(basket, 5, tid as u64);
        }

        let mut root_sum = 0u64;
        for (id, depth) in tree.traverse() {
            prop_assert!(tree.count_of(id) >= 1);
            if depth == 0 {
                root_sum += tree.count_of(id);
            }
            let is_leaf = tree.children_of(id).is_empty();
            if is_leaf {
                let (pre, cur) = tree.tail_counts(id)
                    .expect("a leaf node always terminates a path");
                prop_assert_eq!(pre + cur, tree.count_of(id));
            }
        }
        prop_assert_eq!(root_sum, transactions.len() as u64);
    }

    /// Pruning never increases a support and leaves no dangling index entries.
    #[test]
    fn prune_shrinks_supports_monotonically(transactions in arb_transactions()) {
        let mut tree = PrefixTree::new();
        let checkpoint = (transactions.len() / 2) as u64;
        for (tid, basket) in transactions.iter().enumerate() {
            tree.insert(basket, checkpoint, tid as u64);
        }

        let before: Vec<u64> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|l| tree.label_support(l))
            .collect();
        tree.prune();
        for (idx, label) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            prop_assert!(tree.label_support(label) <= before[idx]);
        }
        // Every item still indexed must resolve to live, positive counts.
        for item in tree.live_items() {
            prop_assert!(tree.item_support(item) >= 1);
        }
    }
}
