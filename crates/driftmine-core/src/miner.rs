//! Bounded-length frequent-itemset extraction from the prefix tree.
//!
//! Every node's root path is enumerated once (via the item index), and each
//! ordered combination of path items up to the length bound accumulates the
//! node's own total count. Weighting by node counters, rather than one unit
//! per node visit, keeps multi-length supports on the same scale as the
//! single-item supports the tree maintains; prefix sharing would otherwise
//! collapse any number of identical transactions into a single unit.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::tree::{ItemId, NodeId, PrefixTree, ROOT};

/// One mined itemset with its accumulated support.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinedItemset {
    /// Item labels in path order.
    pub items: Vec<String>,
    pub support: u64,
}

/// Mine itemsets of length `1..=max_length` with support ≥ `min_support`.
///
/// Results are ranked by descending support, ties broken by ascending lexical
/// itemset order, so output is deterministic. An empty tree yields an empty
/// vector.
pub fn mine(tree: &PrefixTree, min_support: u64, max_length: usize) -> Vec<MinedItemset> {
    let mut counts: FxHashMap<SmallVec<[ItemId; 4]>, u64> = FxHashMap::default();
    let mut path: SmallVec<[ItemId; 8]> = SmallVec::new();
    let mut scratch: SmallVec<[ItemId; 4]> = SmallVec::new();

    for nodes in tree.index.values() {
        for &node_id in nodes {
            root_path(tree, node_id, &mut path);
            let weight = tree.nodes[node_id].count;
            let longest = max_length.min(path.len());
            for len in 1..=longest {
                accumulate(&path, len, 0, weight, &mut scratch, &mut counts);
            }
        }
    }

    let mut result: Vec<MinedItemset> = counts
        .into_iter()
        .filter(|&(_, support)| support >= min_support)
        .map(|(ids, support)| MinedItemset {
            items: ids
                .into_iter()
                .map(|id| tree.item_label(id).to_string())
                .collect(),
            support,
        })
        .collect();
    result.sort_unstable_by(|a, b| {
        b.support
            .cmp(&a.support)
            .then_with(|| a.items.cmp(&b.items))
    });
    result
}

/// Rebuild the root-to-node item path by following parent links.
fn root_path(tree: &PrefixTree, node_id: NodeId, path: &mut SmallVec<[ItemId; 8]>) {
    path.clear();
    let mut cursor = node_id;
    while cursor != ROOT {
        let node = &tree.nodes[cursor];
        path.push(node.item.expect("non-root node carries an item"));
        cursor = node
            .parent
            .expect("indexed node must be reachable from the root");
    }
    path.reverse();
}

/// Add `weight` to every ordered combination of `len` items from `path`.
fn accumulate(
    path: &[ItemId],
    len: usize,
    start: usize,
    weight: u64,
    scratch: &mut SmallVec<[ItemId; 4]>,
    counts: &mut FxHashMap<SmallVec<[ItemId; 4]>, u64>,
) {
    if scratch.len() == len {
        *counts.entry(scratch.clone()).or_insert(0) += weight;
        return;
    }
    let remaining = len - scratch.len();
    for idx in start..=path.len() - remaining {
        scratch.push(path[idx]);
        accumulate(path, len, idx + 1, weight, scratch, counts);
        scratch.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn support_of(result: &[MinedItemset], items: &[&str]) -> Option<u64> {
        result
            .iter()
            .find(|m| m.items == items)
            .map(|m| m.support)
    }

    #[test]
    fn test_empty_tree_mines_nothing() {
        let tree = PrefixTree::new();
        assert!(mine(&tree, 1, 3).is_empty());
    }

    #[test]
    fn test_single_path_combinations() {
        let mut tree = PrefixTree::new();
        tree.insert(&tx(&["a", "b", "c"]), 100, 0);
        let result = mine(&tree, 1, 3);
        // Paths: [a] (w1), [a,b] (w1), [a,b,c] (w1).
        assert_eq!(support_of(&result, &["a"]), Some(3));
        assert_eq!(support_of(&result, &["b"]), Some(2));
        assert_eq!(support_of(&result, &["c"]), Some(1));
        assert_eq!(support_of(&result, &["a", "b"]), Some(2));
        assert_eq!(support_of(&result, &["a", "c"]), Some(1));
        assert_eq!(support_of(&result, &["b", "c"]), Some(1));
        assert_eq!(support_of(&result, &["a", "b", "c"]), Some(1));
    }

    #[test]
    fn test_max_length_bounds_combinations() {
        let mut tree = PrefixTree::new();
        tree.insert(&tx(&["a", "b", "c"]), 100, 0);
        let result = mine(&tree, 1, 2);
        assert_eq!(support_of(&result, &["a", "b", "c"]), None);
        assert!(support_of(&result, &["a", "b"]).is_some());
    }

    #[test]
    fn test_node_counts_weight_shared_prefixes() {
        let mut tree = PrefixTree::new();
        for tid in 0..10 {
            tree.insert(&tx(&["milk", "bread"]), 100, tid);
        }
        let result = mine(&tree, 2, 3);
        // One shared path bread -> milk, both nodes at count 10.
        assert_eq!(support_of(&result, &["bread", "milk"]), Some(10));
        assert_eq!(support_of(&result, &["milk"]), Some(10));
        assert_eq!(support_of(&result, &["bread"]), Some(20));
    }

    #[test]
    fn test_min_support_filters() {
        let mut tree = PrefixTree::new();
        tree.insert(&tx(&["a", "b"]), 100, 0);
        tree.insert(&tx(&["a", "b"]), 100, 1);
        tree.insert(&tx(&["a", "z"]), 100, 2);
        let result = mine(&tree, 3, 2);
        assert!(support_of(&result, &["z"]).is_none());
        assert!(support_of(&result, &["a"]).is_some());
    }

    #[test]
    fn test_ranking_is_support_descending_then_lexical() {
        let mut tree = PrefixTree::new();
        tree.insert(&tx(&["a"]), 100, 0);
        tree.insert(&tx(&["a"]), 100, 1);
        tree.insert(&tx(&["b"]), 100, 2);
        tree.insert(&tx(&["c"]), 100, 3);
        let result = mine(&tree, 1, 1);
        let ranked: Vec<(&str, u64)> = result
            .iter()
            .map(|m| (m.items[0].as_str(), m.support))
            .collect();
        assert_eq!(ranked, vec![("a", 2), ("b", 1), ("c", 1)]);
    }
}
