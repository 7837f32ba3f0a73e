//! Transaction normalization and pane segmentation.
//!
//! The core assumes set semantics per transaction; deduplication happens here,
//! upstream of the tree. Segmentation slices an ordered transaction sequence
//! into fixed-size panes, preserving order, as a lazy iterator that can be
//! re-created by calling [`split`] again.

use rustc_hash::FxHashSet;

/// A transaction: a finite set of opaque item labels, stored in arrival order.
pub type Transaction = Vec<String>;

/// Deduplicate labels within one transaction, keeping first occurrences.
pub fn normalize(items: impl IntoIterator<Item = String>) -> Transaction {
    let mut seen = FxHashSet::default();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Parse one whitespace-separated line into a normalized transaction.
pub fn transaction_from_line(line: &str) -> Transaction {
    normalize(line.split_whitespace().map(str::to_string))
}

/// Slice `transactions` into order-preserving panes of `pane_size`.
///
/// The final pane may be shorter. `pane_size` must be positive; the
/// controller validates this before calling.
pub fn split(transactions: &[Transaction], pane_size: usize) -> impl Iterator<Item = &[Transaction]> {
    transactions.chunks(pane_size)
}

/// The fixed demo dataset: five 10-transaction phases that drift from dairy
/// staples through coffee/cereal to stationery.
pub fn sample_dataset() -> Vec<Transaction> {
    let phases: &[&[&[&str]]] = &[
        // Phase 1: milk, bread, butter
        &[
            &["milk", "bread"],
            &["milk", "bread"],
            &["milk", "butter"],
            &["bread", "butter"],
            &["milk", "bread"],
            &["bread", "butter"],
            &["milk", "bread"],
            &["milk", "butter"],
            &["milk", "bread"],
            &["bread", "butter"],
        ],
        // Phase 2: cereal enters
        &[
            &["milk", "cereal"],
            &["bread", "cereal"],
            &["milk", "bread"],
            &["cereal", "butter"],
            &["milk", "cereal"],
            &["bread", "butter"],
            &["cereal", "bread"],
            &["milk", "cereal"],
            &["milk", "bread"],
            &["butter", "cereal"],
        ],
        // Phase 3: shift to coffee, cereal
        &[
            &["coffee", "cereal"],
            &["milk", "coffee"],
            &["cereal", "bread"],
            &["coffee", "butter"],
            &["coffee", "cereal"],
            &["coffee", "milk"],
            &["bread", "coffee"],
            &["cereal", "coffee"],
            &["cereal", "milk"],
            &["butter", "coffee"],
        ],
        // Phase 4: strong drift to juice, tea, snack
        &[
            &["juice", "tea"],
            &["snack", "juice"],
            &["tea", "juice"],
            &["snack", "cereal"],
            &["tea", "snack"],
            &["tea", "coffee"],
            &["juice", "coffee"],
            &["juice", "snack"],
            &["coffee", "snack"],
            &["tea", "cereal"],
        ],
        // Phase 5: stationery
        &[
            &["pen", "notebook"],
            &["notebook", "eraser"],
            &["pen", "eraser"],
            &["notebook", "pencil"],
            &["stapler", "paper"],
            &["pen", "notebook"],
            &["eraser", "paper"],
            &["pen", "stapler"],
            &["notebook", "pen"],
            &["notebook", "paper"],
        ],
    ];
    phases
        .iter()
        .flat_map(|phase| phase.iter())
        .map(|items| items.iter().map(|s| s.to_string()).collect())
        .collect()
}
