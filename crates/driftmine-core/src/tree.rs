//! Shared-prefix counting tree with checkpoint-relative tail counters.
//!
//! Transactions are re-ordered by descending aggregate item frequency before
//! insertion so that popular items cluster near the root and paths share
//! prefixes. Every node that terminates at least one inserted path (a "tail"
//! node) additionally splits its observations around the active checkpoint
//! tid: traversal counters (`pre`/`cur`) feed drift detection, terminating
//! counters (`ended_pre`/`ended_cur`) feed expiration.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Compact interned identifier for an item label.
pub type ItemId = u32;

/// Index of a node in the tree arena.
pub type NodeId = usize;

/// Logical stream position of a transaction.
pub type Tid = u64;

/// Arena index of the root node.
pub const ROOT: NodeId = 0;

/// Checkpoint-split observation counters carried by tail nodes.
///
/// The `pre`/`cur` pair counts every traversal of the node, pass-through
/// included; drift detection reads these. The `ended_*` pair counts only the
/// paths that terminated here. Expiration subtracts `ended_pre` so that each
/// expired transaction is removed exactly once per node on its path; an
/// interior tail's traversal counters also cover units that terminate at a
/// descendant tail and must not be subtracted twice.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TailCounts {
    /// Traversals at or before the active checkpoint.
    pub pre: u64,
    /// Traversals after the active checkpoint.
    pub cur: u64,
    /// Paths terminating here at or before the active checkpoint.
    pub ended_pre: u64,
    /// Paths terminating here after the active checkpoint.
    pub ended_cur: u64,
}

/// A node in the prefix tree.
///
/// Nodes are owned by the arena; the parent/child relations are plain indices.
/// Detached (pruned) nodes stay in the arena as dead slots so that live
/// indices remain stable.
pub(crate) struct Node {
    /// Item carried by this node; `None` only for the root sentinel.
    pub item: Option<ItemId>,
    /// Total number of inserted paths that traversed this node.
    pub count: u64,
    /// Parent node; `None` for the root and for detached nodes.
    pub parent: Option<NodeId>,
    /// Children indexed by item.
    pub children: FxHashMap<ItemId, NodeId>,
    /// Present iff this node terminates at least one inserted path.
    pub tail: Option<TailCounts>,
    /// Cleared when the node is detached during pruning.
    pub live: bool,
}

impl Node {
    fn new(item: ItemId, parent: NodeId, tail: Option<TailCounts>) -> Self {
        Self {
            item: Some(item),
            count: 1,
            parent: Some(parent),
            children: FxHashMap::default(),
            tail,
            live: true,
        }
    }
}

/// Prefix-sharing tree plus the derived per-item node index.
///
/// Item labels are interned to dense [`ItemId`]s on first sight. The item
/// index maps each item to all of its nodes across branches, in discovery
/// order; it is kept in sync by insertion (append) and pruning (remove) and
/// is never rebuilt by traversal.
pub struct PrefixTree {
    /// Arena of nodes; index 0 is the root.
    pub(crate) nodes: Vec<Node>,
    /// Item index: every live node carrying each item, in discovery order.
    pub(crate) index: FxHashMap<ItemId, Vec<NodeId>>,
    label_to_id: FxHashMap<String, ItemId>,
    id_to_label: Vec<String>,
}

impl PrefixTree {
    /// Create an empty tree holding only the root sentinel.
    pub fn new() -> Self {
        let root = Node {
            item: None,
            count: 0,
            parent: None,
            children: FxHashMap::default(),
            tail: None,
            live: true,
        };
        Self {
            nodes: vec![root],
            index: FxHashMap::default(),
            label_to_id: FxHashMap::default(),
            id_to_label: Vec::new(),
        }
    }

    /// Intern a label, returning its existing id if already known.
    pub fn register_item(&mut self, label: &str) -> ItemId {
        if let Some(&id) = self.label_to_id.get(label) {
            return id;
        }
        let id = self.id_to_label.len() as ItemId;
        self.id_to_label.push(label.to_string());
        self.label_to_id.insert(label.to_string(), id);
        id
    }

    /// Look up an interned item id by label.
    pub fn item_id(&self, label: &str) -> Option<ItemId> {
        self.label_to_id.get(label).copied()
    }

    /// Label for an interned item id.
    ///
    /// Panics if `id` was never handed out by [`register_item`](Self::register_item).
    pub fn item_label(&self, id: ItemId) -> &str {
        &self.id_to_label[id as usize]
    }

    /// Number of distinct labels ever interned (pruning does not shrink this).
    pub fn alphabet_size(&self) -> usize {
        self.id_to_label.len()
    }

    /// Aggregate support of an item: sum of `count` over all of its live nodes.
    pub fn item_support(&self, item: ItemId) -> u64 {
        self.index
            .get(&item)
            .map(|nodes| nodes.iter().map(|&n| self.nodes[n].count).sum())
            .unwrap_or(0)
    }

    /// Aggregate support looked up by label; 0 for unknown labels.
    pub fn label_support(&self, label: &str) -> u64 {
        self.item_id(label).map_or(0, |id| self.item_support(id))
    }

    /// Items currently present in the index (having at least one live node).
    pub fn live_items(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.index.keys().copied()
    }

    /// Number of distinct items with at least one live node.
    pub fn live_item_count(&self) -> usize {
        self.index.len()
    }

    /// True when no transaction path is stored.
    pub fn is_empty(&self) -> bool {
        self.nodes[ROOT].children.is_empty()
    }

    /// Total arena slots, including detached ones (root included).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes still attached to the tree (root included).
    pub fn live_node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.live).count()
    }

    /// Total count of a node.
    pub fn count_of(&self, id: NodeId) -> u64 {
        self.nodes[id].count
    }

    /// `(pre, cur)` tail counters, or `None` for non-tail nodes.
    pub fn tail_counts(&self, id: NodeId) -> Option<(u64, u64)> {
        self.nodes[id].tail.map(|t| (t.pre, t.cur))
    }

    /// Item label carried by a node; `None` for the root.
    pub fn item_of(&self, id: NodeId) -> Option<&str> {
        self.nodes[id].item.map(|item| self.item_label(item))
    }

    /// Child node ids of a node, ordered by item id for determinism.
    pub fn children_of(&self, id: NodeId) -> Vec<NodeId> {
        let mut children: Vec<(ItemId, NodeId)> = self.nodes[id]
            .children
            .iter()
            .map(|(&item, &child)| (item, child))
            .collect();
        children.sort_unstable_by_key(|&(item, _)| item);
        children.into_iter().map(|(_, child)| child).collect()
    }

    /// Insert one transaction observed at stream position `current_tid`.
    ///
    /// The transaction is frequency-sort encoded first: items descending by
    /// aggregate known frequency, ties ascending lexically; items never seen
    /// before sort after all known items, lexically among themselves. The
    /// walk then increments existing nodes or splices new ones in, marking
    /// the final node of a newly created path as a tail. Terminating at an
    /// existing non-tail node leaves its tail status unchanged, matching the
    /// split-counter bookkeeping of the expiration pass.
    ///
    /// An empty transaction is a no-op. Insertion is infallible for valid
    /// (deduplicated) input.
    pub fn insert<S: AsRef<str>>(&mut self, items: &[S], checkpoint_tid: Tid, current_tid: Tid) {
        if items.is_empty() {
            return;
        }
        let ordered = self.encode(items);
        let after_checkpoint = current_tid > checkpoint_tid;
        let last = ordered.len() - 1;

        let mut node = ROOT;
        for (idx, &item) in ordered.iter().enumerate() {
            let is_tail = idx == last;
            node = match self.nodes[node].children.get(&item).copied() {
                Some(child) => {
                    let c = &mut self.nodes[child];
                    c.count += 1;
                    if let Some(tail) = c.tail.as_mut() {
                        if after_checkpoint {
                            tail.cur += 1;
                        } else {
                            tail.pre += 1;
                        }
                        if is_tail {
                            if after_checkpoint {
                                tail.ended_cur += 1;
                            } else {
                                tail.ended_pre += 1;
                            }
                        }
                    }
                    child
                }
                None => {
                    let tail = is_tail.then(|| {
                        if after_checkpoint {
                            TailCounts {
                                pre: 0,
                                cur: 1,
                                ended_pre: 0,
                                ended_cur: 1,
                            }
                        } else {
                            TailCounts {
                                pre: 1,
                                cur: 0,
                                ended_pre: 1,
                                ended_cur: 0,
                            }
                        }
                    });
                    let child = self.nodes.len();
                    self.nodes.push(Node::new(item, node, tail));
                    self.nodes[node].children.insert(item, child);
                    self.index.entry(item).or_default().push(child);
                    child
                }
            };
        }
    }

    /// Frequency-sort encode a transaction into interned item ids.
    fn encode<S: AsRef<str>>(&mut self, items: &[S]) -> SmallVec<[ItemId; 8]> {
        let mut labels: SmallVec<[&str; 8]> = items.iter().map(AsRef::as_ref).collect();
        let freq: FxHashMap<&str, u64> = labels
            .iter()
            .map(|&label| (label, self.label_support(label)))
            .collect();
        labels.sort_unstable_by(|a, b| freq[b].cmp(&freq[a]).then_with(|| a.cmp(b)));
        labels
            .into_iter()
            .map(|label| self.register_item(label))
            .collect()
    }

    /// Expire all pre-checkpoint observations.
    ///
    /// Items are processed in ascending order of aggregate support so the
    /// volatile low-support branches are reclaimed first. For every tail node
    /// (iterating a snapshot of its item's index entry, since the entry is
    /// mutated mid-pass) the tail's `ended_pre` counter is subtracted from
    /// every node on its root path; nodes whose count drops to zero are
    /// detached from both the tree and the item index. Each expired
    /// transaction terminated at exactly one tail, so it is subtracted
    /// exactly once per node it traversed; using the traversal-inclusive
    /// `pre` counter here would double-subtract shared-path mass. Each
    /// processed tail is then rotated: `pre := cur`, `ended_pre := ended_cur`,
    /// both current-window counters reset to zero.
    ///
    /// After this pass, every surviving count reflects only observations made
    /// at or after the checkpoint the caller is about to install.
    pub fn prune(&mut self) {
        let mut items: Vec<ItemId> = self.index.keys().copied().collect();
        items.sort_unstable_by_key(|&item| (self.item_support(item), item));

        for item in items {
            let snapshot: Vec<NodeId> = match self.index.get(&item) {
                Some(nodes) => nodes.clone(),
                None => continue, // fully reclaimed by an earlier item's pass
            };
            for node_id in snapshot {
                if !self.nodes[node_id].live {
                    continue;
                }
                let expired = match self.nodes[node_id].tail {
                    Some(tail) => tail.ended_pre,
                    None => continue,
                };

                let mut path: SmallVec<[NodeId; 8]> = SmallVec::new();
                let mut cursor = Some(node_id);
                while let Some(id) = cursor {
                    if id == ROOT {
                        break;
                    }
                    path.push(id);
                    cursor = self.nodes[id].parent;
                }

                // Deepest first: a node's subtree is always reclaimed before
                // the node itself, so detach never orphans live descendants.
                for &id in &path {
                    self.nodes[id].count = self.nodes[id].count.saturating_sub(expired);
                    if self.nodes[id].count == 0 {
                        self.detach(id);
                    }
                }

                if let Some(tail) = self.nodes[node_id].tail.as_mut() {
                    tail.pre = tail.cur;
                    tail.cur = 0;
                    tail.ended_pre = tail.ended_cur;
                    tail.ended_cur = 0;
                }
            }
        }
    }

    /// Remove a node from its parent's child map and from the item index.
    ///
    /// Any inconsistency found here is an implementation defect, not a
    /// recoverable condition.
    fn detach(&mut self, id: NodeId) {
        assert_ne!(id, ROOT, "attempted to detach the root node");
        let node = &self.nodes[id];
        assert!(
            node.children.is_empty(),
            "detaching a node that still has live children"
        );
        let item = node.item.expect("non-root node carries an item");
        let parent = node.parent.expect("live non-root node has a parent");

        let removed = self.nodes[parent].children.remove(&item);
        assert_eq!(removed, Some(id), "parent child map out of sync with arena");

        let entry = self
            .index
            .get_mut(&item)
            .expect("item index entry missing for a live node");
        let pos = entry
            .iter()
            .position(|&n| n == id)
            .expect("node missing from its item index entry");
        entry.remove(pos);
        if entry.is_empty() {
            self.index.remove(&item);
        }

        let node = &mut self.nodes[id];
        node.live = false;
        node.parent = None;
    }

    /// Depth-first traversal of live nodes, yielding `(node, depth)` pairs.
    ///
    /// The root is not yielded; its children are at depth 0. Children are
    /// visited in ascending item-id order, so the sequence is deterministic
    /// and restartable by calling `traverse` again.
    pub fn traverse(&self) -> Traverse<'_> {
        let stack: Vec<(NodeId, usize)> = self
            .children_of(ROOT)
            .into_iter()
            .rev()
            .map(|id| (id, 0))
            .collect();
        Traverse { tree: self, stack }
    }
}

impl Default for PrefixTree {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PrefixTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (id, depth) in self.traverse() {
            let node = &self.nodes[id];
            let label = self.item_of(id).unwrap_or("?");
            write!(f, "{}- {} [{}]", "  ".repeat(depth), label, node.count)?;
            if let Some(tail) = node.tail {
                write!(f, " (pre: {}, cur: {})", tail.pre, tail.cur)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Explicit-stack depth-first iterator over live tree nodes.
pub struct Traverse<'a> {
    tree: &'a PrefixTree,
    stack: Vec<(NodeId, usize)>,
}

impl Iterator for Traverse<'_> {
    type Item = (NodeId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        for child in self.tree.children_of(id).into_iter().rev() {
            self.stack.push((child, depth + 1));
        }
        Some((id, depth))
    }
}
