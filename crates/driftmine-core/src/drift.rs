//! Concept-drift detection over pre/post-checkpoint frequent-item sets.
//!
//! Drift is measured as the Jaccard-style distance between the sets of items
//! that are frequent before and after the active checkpoint: the size of the
//! symmetric difference over the size of the union. A ratio strictly above
//! the configured threshold triggers a window shrink.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::tree::{ItemId, PrefixTree};

/// Which side of the checkpoint a support query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Observations at or before the checkpoint.
    Pre,
    /// Observations strictly after the checkpoint.
    Post,
}

/// Outcome of one drift check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftDecision {
    /// Symmetric difference over union of the two frequent sets, in [0, 1].
    pub ratio: f64,
    /// True iff `ratio` strictly exceeds the threshold.
    pub triggered: bool,
}

/// Windowed support of a single item.
///
/// Tail nodes contribute their `pre` or `cur` counter per `window`; non-tail
/// nodes contribute their raw total count. Non-tail nodes carry no split
/// counters by construction, so they are window-agnostic here; the asymmetry
/// is inherited from the reference algorithm and kept deliberately.
pub fn one_itemset_support(tree: &PrefixTree, item: ItemId, window: Window) -> u64 {
    let Some(nodes) = tree.index.get(&item) else {
        return 0;
    };
    nodes
        .iter()
        .map(|&id| {
            let node = &tree.nodes[id];
            match node.tail {
                Some(tail) => match window {
                    Window::Pre => tail.pre,
                    Window::Post => tail.cur,
                },
                None => node.count,
            }
        })
        .sum()
}

/// Items whose windowed support reaches `min_support`.
pub fn frequent_items(tree: &PrefixTree, min_support: u64, window: Window) -> FxHashSet<ItemId> {
    tree.live_items()
        .filter(|&item| one_itemset_support(tree, item, window) >= min_support)
        .collect()
}

/// Change rate between two frequent sets: `|sym_diff| / |union|`, 0.0 when
/// both are empty. Always in [0, 1]; exactly 0 iff the sets are equal.
pub fn drift_ratio(old: &FxHashSet<ItemId>, new: &FxHashSet<ItemId>) -> f64 {
    let union = old.union(new).count();
    if union == 0 {
        return 0.0;
    }
    let changed = old.symmetric_difference(new).count();
    changed as f64 / union as f64
}

/// Drift detector comparing pre- vs post-checkpoint frequent items.
#[derive(Debug, Clone)]
pub struct DriftDetector {
    min_support: u64,
    threshold: f64,
}

impl DriftDetector {
    pub fn new(min_support: u64, threshold: f64) -> Self {
        Self {
            min_support,
            threshold,
        }
    }

    /// Compute the drift ratio for the current tree state and decide whether
    /// it exceeds the threshold. An empty tree yields ratio 0.0, untriggered.
    pub fn detect(&self, tree: &PrefixTree) -> DriftDecision {
        let old = frequent_items(tree, self.min_support, Window::Pre);
        let new = frequent_items(tree, self.min_support, Window::Post);
        let ratio = drift_ratio(&old, &new);
        DriftDecision {
            ratio,
            triggered: ratio > self.threshold,
        }
    }
}
