//! # Driftmine Core
//!
//! Incremental frequent-itemset mining over a transaction stream, with
//! concept-drift detection and an adaptive retention window.
//!
//! The stream is consumed in fixed-size panes. Each pane cycle inserts its
//! transactions into a shared-prefix counting tree, compares the frequent
//! items before and after the active checkpoint, and either shrinks the
//! window (expiring pre-checkpoint observations) on drift or lets the
//! baseline grow. After the adjustment, bounded-length itemsets are mined
//! from the tree and reported.
//!
//! ## Modules
//!
//! - [`tree`]: the prefix-sharing tree, item index and expiration pass
//! - [`drift`]: pre/post-checkpoint frequent-set comparison
//! - [`miner`]: bounded-length itemset extraction
//! - [`controller`]: the per-pane insert/detect/adjust/report cycle
//! - [`stream`]: transaction normalization and pane segmentation
//! - [`config`]: validated loop parameters
//!
//! ## Quick start
//!
//! ```rust
//! use driftmine_core::{split, MinerConfig, WindowController};
//!
//! let transactions = driftmine_core::sample_dataset();
//! let config = MinerConfig::default();
//! let pane_size = config.pane_size;
//! let mut controller = WindowController::new(config).unwrap();
//! for report in controller.run(split(&transactions, pane_size)) {
//!     println!("pane {}: drift ratio {:.2}", report.pane_index, report.drift.ratio);
//! }
//! ```

pub mod config;
pub mod controller;
pub mod drift;
pub mod miner;
pub mod stream;
pub mod tree;

pub use config::{ConfigError, MinerConfig};
pub use controller::{DriftRecord, PaneReport, WindowController};
pub use drift::{drift_ratio, frequent_items, one_itemset_support, DriftDecision, DriftDetector, Window};
pub use miner::{mine, MinedItemset};
pub use stream::{normalize, sample_dataset, split, transaction_from_line, Transaction};
pub use tree::{ItemId, NodeId, PrefixTree, Tid};
