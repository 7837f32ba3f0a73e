//! Per-pane orchestration: insert, detect, shrink-or-grow, report.
//!
//! The controller is the single owner of the tree; panes are processed
//! strictly in order because the checkpoint and the tree contents of each
//! cycle depend on the previous one. Between cycles the tree is internally
//! consistent and safe to snapshot; mid-insert or mid-prune it is not.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{ConfigError, MinerConfig};
use crate::drift::{DriftDecision, DriftDetector};
use crate::miner::{mine, MinedItemset};
use crate::stream::Transaction;
use crate::tree::{PrefixTree, Tid};

/// Append-only drift timeline entry; observability only, never read back by
/// the algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftRecord {
    pub pane_index: usize,
    pub ratio: f64,
    pub triggered: bool,
}

/// Everything one pane cycle produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaneReport {
    pub pane_index: usize,
    /// Tid assigned to the pane's first transaction.
    pub first_tid: Tid,
    /// Number of transactions inserted from this pane.
    pub transactions: usize,
    pub drift: DriftDecision,
    /// True when this cycle pruned the tree and advanced the checkpoint,
    /// either on a drift trigger or on the window-growth cap.
    pub shrunk: bool,
    /// Ranked (itemset, support) results mined after the window adjustment.
    pub itemsets: Vec<MinedItemset>,
}

/// Drives the INSERT -> DETECT -> {SHRINK | GROW} -> REPORT cycle per pane.
pub struct WindowController {
    config: MinerConfig,
    tree: PrefixTree,
    detector: DriftDetector,
    next_tid: Tid,
    checkpoint_tid: Tid,
    panes_in_window: usize,
    pane_index: usize,
    history: Vec<DriftRecord>,
}

impl WindowController {
    /// Validate the configuration and set the initial checkpoint to
    /// `pane_size * initial_window_panes`.
    pub fn new(config: MinerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let checkpoint_tid = (config.pane_size * config.initial_window_panes) as Tid;
        let detector = DriftDetector::new(config.min_support, config.drift_threshold);
        Ok(Self {
            config,
            tree: PrefixTree::new(),
            detector,
            next_tid: 0,
            checkpoint_tid,
            panes_in_window: 0,
            pane_index: 0,
            history: Vec::new(),
        })
    }

    /// Run one full pane cycle. Transactions are inserted in arrival order
    /// with strictly increasing tids; the drift decision then either shrinks
    /// the window (prune + checkpoint advance) or lets it grow.
    pub fn process_pane(&mut self, pane: &[Transaction]) -> PaneReport {
        let pane_index = self.pane_index;
        self.pane_index += 1;
        let first_tid = self.next_tid;

        for transaction in pane {
            self.tree
                .insert(transaction, self.checkpoint_tid, self.next_tid);
            self.next_tid += 1;
        }
        self.panes_in_window += 1;
        debug!(
            "pane {}: inserted {} transactions (tids {}..{}), checkpoint {}",
            pane_index,
            pane.len(),
            first_tid,
            self.next_tid,
            self.checkpoint_tid
        );

        let decision = self.detector.detect(&self.tree);
        let mut shrunk = false;
        if decision.triggered {
            info!(
                "pane {}: concept drift detected (ratio {:.2}), shrinking window",
                pane_index, decision.ratio
            );
            self.shrink();
            shrunk = true;
        } else if self
            .config
            .max_window_panes
            .is_some_and(|cap| self.panes_in_window > cap)
        {
            info!(
                "pane {}: window cap of {} panes exceeded, collapsing window",
                pane_index,
                self.config.max_window_panes.unwrap_or(0)
            );
            self.shrink();
            shrunk = true;
        } else {
            debug!(
                "pane {}: no significant drift (ratio {:.2}), window grows",
                pane_index, decision.ratio
            );
        }

        let itemsets = mine(
            &self.tree,
            self.config.min_support,
            self.config.max_itemset_length,
        );
        self.history.push(DriftRecord {
            pane_index,
            ratio: decision.ratio,
            triggered: decision.triggered,
        });

        PaneReport {
            pane_index,
            first_tid,
            transactions: pane.len(),
            drift: decision,
            shrunk,
            itemsets,
        }
    }

    /// Process every pane in order and collect the reports.
    pub fn run<'a, I>(&mut self, panes: I) -> Vec<PaneReport>
    where
        I: IntoIterator<Item = &'a [Transaction]>,
    {
        panes.into_iter().map(|pane| self.process_pane(pane)).collect()
    }

    /// Expire pre-checkpoint mass and move the checkpoint to the present.
    fn shrink(&mut self) {
        self.tree.prune();
        self.checkpoint_tid = self.next_tid;
        self.panes_in_window = 0;
    }

    /// Read access to the tree between pane cycles.
    pub fn tree(&self) -> &PrefixTree {
        &self.tree
    }

    /// The active checkpoint tid.
    pub fn checkpoint_tid(&self) -> Tid {
        self.checkpoint_tid
    }

    /// Total transactions inserted so far (also the next tid to assign).
    pub fn transactions_seen(&self) -> u64 {
        self.next_tid
    }

    /// Cumulative drift timeline across all processed panes.
    pub fn drift_history(&self) -> &[DriftRecord] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(items: &[&str]) -> Transaction {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn config() -> MinerConfig {
        MinerConfig {
            pane_size: 2,
            min_support: 2,
            drift_threshold: 0.5,
            initial_window_panes: 1,
            max_itemset_length: 3,
            max_window_panes: None,
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad = MinerConfig {
            drift_threshold: 2.0,
            ..config()
        };
        assert!(WindowController::new(bad).is_err());
    }

    #[test]
    fn test_initial_checkpoint_from_config() {
        let controller = WindowController::new(MinerConfig {
            pane_size: 5,
            initial_window_panes: 3,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(controller.checkpoint_tid(), 15);
    }

    #[test]
    fn test_empty_pane_is_harmless() {
        let mut controller = WindowController::new(config()).unwrap();
        let report = controller.process_pane(&[]);
        assert_eq!(report.transactions, 0);
        assert_eq!(report.drift.ratio, 0.0);
        assert!(!report.shrunk);
        assert!(report.itemsets.is_empty());
    }

    #[test]
    fn test_drift_shrinks_and_advances_checkpoint() {
        let mut controller = WindowController::new(config()).unwrap();
        // Pane of two "a" transactions, tids 0 and 1, both pre (checkpoint 2).
        // Pre-frequent {a} vs post-frequent {}: ratio 1.0 > 0.5.
        let report = controller.process_pane(&[tx(&["a"]), tx(&["a"])]);
        assert!(report.drift.triggered);
        assert!(report.shrunk);
        assert_eq!(controller.checkpoint_tid(), 2);
        // All mass was pre-checkpoint, so the prune emptied the tree.
        assert!(controller.tree().is_empty());
        assert!(report.itemsets.is_empty());
    }

    #[test]
    fn test_checkpoint_strictness_after_shrink() {
        let mut controller = WindowController::new(config()).unwrap();
        controller.process_pane(&[tx(&["a"]), tx(&["a"])]); // triggers, checkpoint -> 2
        assert_eq!(controller.checkpoint_tid(), 2);

        // tid 2 == checkpoint: pre. tid 3 > checkpoint: post.
        // Neither b nor c reaches min_support 2, so no second trigger.
        let report = controller.process_pane(&[tx(&["b"]), tx(&["c"])]);
        assert!(!report.drift.triggered);

        let tree = controller.tree();
        let b = tree.children_of(crate::tree::ROOT)[0];
        let c = tree.children_of(crate::tree::ROOT)[1];
        assert_eq!(tree.item_of(b), Some("b"));
        assert_eq!(tree.tail_counts(b), Some((1, 0)));
        assert_eq!(tree.item_of(c), Some("c"));
        assert_eq!(tree.tail_counts(c), Some((0, 1)));
    }

    #[test]
    fn test_no_drift_leaves_checkpoint_alone() {
        let mut controller = WindowController::new(MinerConfig {
            drift_threshold: 1.0, // ratio is never strictly above 1.0
            ..config()
        })
        .unwrap();
        for _ in 0..3 {
            let report = controller.process_pane(&[tx(&["a"]), tx(&["a"])]);
            assert!(!report.shrunk);
        }
        assert_eq!(controller.checkpoint_tid(), 2);
        assert_eq!(controller.transactions_seen(), 6);
    }

    #[test]
    fn test_window_cap_forces_collapse_without_trigger() {
        let mut controller = WindowController::new(MinerConfig {
            pane_size: 1,
            min_support: 1,
            drift_threshold: 1.0,
            initial_window_panes: 1,
            max_itemset_length: 3,
            max_window_panes: Some(2),
        })
        .unwrap();
        let pane = [tx(&["a"])];
        controller.process_pane(&pane); // tid 0, window 1 pane
        controller.process_pane(&pane); // tid 1, window 2 panes
        let report = controller.process_pane(&pane); // window 3 > cap 2
        assert!(!report.drift.triggered);
        assert!(report.shrunk);
        assert_eq!(controller.checkpoint_tid(), 3);
        // tids 0 and 1 were pre (checkpoint 1) and got expired; tid 2 remains.
        assert_eq!(controller.tree().label_support("a"), 1);
    }

    #[test]
    fn test_history_accumulates_per_pane() {
        let mut controller = WindowController::new(config()).unwrap();
        controller.process_pane(&[tx(&["a"])]);
        controller.process_pane(&[tx(&["a"])]);
        let history = controller.drift_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].pane_index, 0);
        assert_eq!(history[1].pane_index, 1);
    }
}
