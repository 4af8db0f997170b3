// =====================================================================
// File: btree/tree.rs
//
// Description:
//   Implements the traced B-tree engine (`BTreeEngine`). The engine owns
//   one tree of fixed order `m` and records every decision it makes
//   while inserting or searching as an ordered `Trace`.
//
// Features:
//   - `insert`: Adds a key; duplicates are a recorded no-op.
//   - `search`: Standard B-tree descent; never mutates.
//   - `reset` : Discards the tree and starts over with a new order.
//   - `verify`: Checks the structural invariants of the current tree.
//
// Notes:
//   * Splitting is bottom-up: a node is inserted into first and split
//     afterwards once it holds `order` keys. The median moves up to the
//     parent, which may overflow in turn, all the way to the root.
//   * Insert helpers are associated functions over the root, the id
//     allocator and the recorder.
// =====================================================================
use tracing::{debug, info};

use super::node::IdAllocator;
use super::{IntoKey, Key, Node};
use crate::error::{BTreeError, InvariantViolation};
use crate::trace::{EventKind, Operation, Outcome, Trace, TraceRecorder};

pub const MIN_ORDER: usize = 3;
pub const MAX_ORDER: usize = 6;
pub const DEFAULT_ORDER: usize = 3;

/// Keys inserted by [`BTreeEngine::load_sample`].
pub const SAMPLE_KEYS: [Key; 8] = [10, 20, 5, 30, 40, 15, 35, 7];

/// What a recursive insert step hands back to its parent frame.
enum Insertion {
    /// Key was already present, nothing changed.
    Exists,
    /// Key placed, no split reached this level.
    Placed,
    /// This node overflowed; parent must take `median` and adopt `right`.
    Split { median: Key, right: Box<Node> },
}

#[derive(Debug)]
pub struct BTreeEngine {
    order: usize,
    root: Box<Node>,
    ids: IdAllocator,
}

impl Default for BTreeEngine {
    fn default() -> Self {
        let mut ids = IdAllocator::default();
        let root = Box::new(Node::new(ids.allocate(), true));
        Self {
            order: DEFAULT_ORDER,
            root,
            ids,
        }
    }
}

impl BTreeEngine {
    /// Create an empty tree of the given order.
    ///
    /// # Example
    /// ```
    /// use btree_trace::BTreeEngine;
    /// let engine = BTreeEngine::new(4).unwrap();
    /// assert_eq!(engine.max_keys(), 3);
    /// assert!(BTreeEngine::new(2).is_err());
    /// ```
    pub fn new(order: usize) -> Result<Self, BTreeError> {
        let mut engine = Self::default();
        engine.reset(order)?;
        Ok(engine)
    }

    /// Discard the tree and start over with a fresh empty root leaf.
    /// An unsupported order leaves the engine untouched.
    pub fn reset(&mut self, order: usize) -> Result<(), BTreeError> {
        if !(MIN_ORDER..=MAX_ORDER).contains(&order) {
            return Err(BTreeError::InvalidOrder(order));
        }
        self.order = order;
        self.root = Box::new(Node::new(self.ids.allocate(), true));
        info!(order, "b-tree reset");
        Ok(())
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Swap in a hand-built tree so `verify` can be exercised on bad shapes.
    #[cfg(test)]
    pub(crate) fn replace_root(&mut self, root: Node) {
        self.root = Box::new(root);
    }

    /// Maximum keys any node may hold once an operation completes.
    pub fn max_keys(&self) -> usize {
        self.order - 1
    }

    /// Minimum keys for every node except the root, `⌈m/2⌉ - 1`.
    pub fn min_keys(&self) -> usize {
        Self::min_keys_for(self.order)
    }

    fn min_keys_for(order: usize) -> usize {
        order.div_ceil(2) - 1
    }

    /// Total number of keys in the tree.
    pub fn len(&self) -> usize {
        self.root.key_count()
    }

    pub fn is_empty(&self) -> bool {
        self.root.keys.is_empty()
    }

    pub fn height(&self) -> usize {
        self.root.height()
    }

    /// All keys in sorted order (in-order traversal).
    pub fn keys(&self) -> Vec<Key> {
        let mut out = Vec::with_capacity(self.len());
        self.root.collect_keys(&mut out);
        out
    }

    /// Rebuild the tree at the current order from [`SAMPLE_KEYS`],
    /// discarding the traces.
    pub fn load_sample(&mut self) {
        self.root = Box::new(Node::new(self.ids.allocate(), true));
        for key in SAMPLE_KEYS {
            self.insert_key(key);
        }
        debug!(keys = self.len(), height = self.height(), "sample tree loaded");
    }

    /// Insert a key, returning the trace of every decision made.
    ///
    /// Input that is not an integer in range is rejected before anything
    /// is recorded or changed. Inserting a key that is already present is
    /// not an error: the trace ends in `KeyExists` and the tree is unchanged.
    ///
    /// # Example
    /// ```
    /// use btree_trace::{BTreeEngine, Outcome};
    /// let mut engine = BTreeEngine::default();
    /// let trace = engine.insert("10").unwrap();
    /// assert_eq!(trace.outcome(), Outcome::Inserted);
    /// assert_eq!(engine.insert(10).unwrap().outcome(), Outcome::KeyExists);
    /// assert!(engine.insert("ten").is_err());
    /// ```
    pub fn insert(&mut self, raw: impl IntoKey) -> Result<Trace, BTreeError> {
        let key = raw.into_key()?;
        Ok(self.insert_key(key))
    }

    fn insert_key(&mut self, key: Key) -> Trace {
        let mut rec = TraceRecorder::default();

        let result =
            Self::insert_internal(&mut self.root, key, self.order, &mut self.ids, &mut rec);

        let outcome = match result {
            Insertion::Exists => Outcome::KeyExists,
            Insertion::Placed => Outcome::Inserted,
            Insertion::Split { median, right } => {
                // Grow by one level: old root becomes the left child
                let new_root = Box::new(Node::new(self.ids.allocate(), false));
                let left = std::mem::replace(&mut self.root, new_root);
                self.root.keys.push(median);
                self.root.children.push(left);
                self.root.children.push(right);

                rec.record_split(
                    EventKind::RootSplit,
                    Some(&*self.root),
                    &self.root.children[0],
                    &self.root.children[1],
                    median,
                    format!("Root node split, creating a new root with key {median}"),
                );
                Outcome::Inserted
            }
        };

        let trace = rec.finish(Operation::Insert(key), outcome);
        debug!(key, order = self.order, ?outcome, steps = trace.len(), "insert traced");
        trace
    }

    /// Search for a key, returning the trace of the descent. Never mutates.
    pub fn search(&self, raw: impl IntoKey) -> Result<Trace, BTreeError> {
        let key = raw.into_key()?;
        let mut rec = TraceRecorder::default();
        let mut node: &Node = &self.root;

        let outcome = loop {
            rec.record(
                EventKind::SearchNode,
                node,
                format!("Searching for key {key} in node with keys [{}]", node.keys_label()),
            );
            let pos = node.lower_bound(key);

            // Found in this node - stop descending
            if node.holds(pos, key) {
                rec.record_key(
                    EventKind::KeyFound,
                    node,
                    pos,
                    format!("Found key {key} at position {pos} in the node!"),
                );
                break Outcome::Found;
            }

            // Bottomed out in a leaf - key is not in the tree
            if node.is_leaf {
                rec.record(
                    EventKind::KeyNotFound,
                    node,
                    format!(
                        "Reached leaf node and key {key} wasn't found. It doesn't exist in the tree."
                    ),
                );
                break Outcome::NotFound;
            }

            rec.record_child(
                EventKind::SearchChild,
                node,
                pos,
                format!("Key {key} is not in this node. Continuing search in child {pos}"),
            );
            node = &*node.children[pos];
        };

        let trace = rec.finish(Operation::Search(key), outcome);
        debug!(key, ?outcome, steps = trace.len(), "search traced");
        Ok(trace)
    }

    /// Check the B-tree invariants of the current tree: sorted in-order
    /// keys, child counts, key-count bounds and equal leaf depth.
    pub fn verify(&self) -> Result<(), InvariantViolation> {
        let mut walk = VerifyWalk {
            order: self.order,
            prev: None,
            leaf_depth: None,
        };
        walk.visit(&self.root, 0, true)
    }

    // =========================
    // Insertion helpers
    // =========================

    /// Inserts `key` into the subtree rooted at `node`, recording each
    /// decision, and reports whether this level split.
    ///
    /// # Behavior
    /// - **Key present**: record `KeyExists`, change nothing.
    /// - **Leaf node**: insert at the sorted position, then split if full.
    /// - **Internal node**: descend into `children[pos]`; if that child
    ///   split, adopt the promoted median and the new right sibling here,
    ///   then split this node if it is now full.
    fn insert_internal(
        node: &mut Node,
        key: Key,
        order: usize,
        ids: &mut IdAllocator,
        rec: &mut TraceRecorder,
    ) -> Insertion {
        rec.record(
            EventKind::VisitNode,
            node,
            format!("Examining node with keys [{}] to insert {key}", node.keys_label()),
        );

        let pos = node.lower_bound(key);

        if node.holds(pos, key) {
            rec.record_key(
                EventKind::KeyExists,
                node,
                pos,
                format!("Key {key} already exists in the node, no insertion needed"),
            );
            return Insertion::Exists;
        }

        // Base case - leaf insert
        if node.is_leaf {
            node.keys.insert(pos, key);
            rec.record_key(
                EventKind::InsertKey,
                node,
                pos,
                format!("Inserted key {key} at position {pos} in leaf node"),
            );
            return Self::split_if_full(node, order, ids, rec);
        }

        rec.record_child(
            EventKind::ChooseChild,
            node,
            pos,
            format!("Moving to child {pos} to continue insertion"),
        );

        match Self::insert_internal(&mut node.children[pos], key, order, ids, rec) {
            Insertion::Split { median, right } => {
                node.keys.insert(pos, median);
                node.children.insert(pos + 1, right);
                rec.record_key(
                    EventKind::PropagateSplit,
                    node,
                    pos,
                    format!("Inserted promoted key {median} at position {pos} in parent node"),
                );
                Self::split_if_full(node, order, ids, rec)
            }
            other => other,
        }
    }

    /// Split `node` when it holds `order` keys.
    ///
    /// - The left half keeps `keys[..median_pos]` and gets a fresh id.
    /// - A new right node takes `keys[median_pos + 1..]`.
    /// - Internal nodes split their children at `median_pos + 1` as well.
    /// - The median is handed back for the parent to adopt.
    fn split_if_full(
        node: &mut Node,
        order: usize,
        ids: &mut IdAllocator,
        rec: &mut TraceRecorder,
    ) -> Insertion {
        let key_count = node.keys.len();
        if key_count < order {
            return Insertion::Placed;
        }

        let median_pos = key_count / 2;
        let median = node.keys[median_pos];

        // Both halves are new nodes; the overflowed id is retired
        node.id = ids.allocate();
        let mut right = Box::new(Node::new(ids.allocate(), node.is_leaf));
        right.keys = node.keys.split_off(median_pos + 1);
        node.keys.truncate(median_pos);
        if !node.is_leaf {
            right.children = node.children.split_off(median_pos + 1);
        }

        rec.record_split(
            EventKind::SplitNode,
            None,
            node,
            &right,
            median,
            format!(
                "Node is full with {key_count} keys. Splitting node, promoting median key {median} to parent"
            ),
        );

        Insertion::Split { median, right }
    }
}

/// State carried through the in-order walk done by `verify`.
struct VerifyWalk {
    order: usize,
    prev: Option<Key>,
    leaf_depth: Option<usize>,
}

impl VerifyWalk {
    fn visit(&mut self, node: &Node, depth: usize, is_root: bool) -> Result<(), InvariantViolation> {
        let keys = node.keys.len();
        let max = self.order - 1;
        if keys > max {
            return Err(InvariantViolation::Overfull { node: node.id, keys, max });
        }
        let min = BTreeEngine::min_keys_for(self.order);
        if !is_root && keys < min {
            return Err(InvariantViolation::Underfull { node: node.id, keys, min });
        }

        let expected_children = if node.is_leaf { 0 } else { keys + 1 };
        if node.children.len() != expected_children {
            return Err(InvariantViolation::ChildCount {
                node: node.id,
                keys,
                children: node.children.len(),
            });
        }

        if node.is_leaf {
            match self.leaf_depth {
                Some(expected) if expected != depth => {
                    return Err(InvariantViolation::Unbalanced {
                        node: node.id,
                        depth,
                        expected,
                    });
                }
                Some(_) => {}
                None => self.leaf_depth = Some(depth),
            }
            for &key in &node.keys {
                self.step(key)?;
            }
            return Ok(());
        }

        for (child, &key) in node.children.iter().zip(&node.keys) {
            self.visit(child, depth + 1, false)?;
            self.step(key)?;
        }
        if let Some(last) = node.children.last() {
            self.visit(last, depth + 1, false)?;
        }
        Ok(())
    }

    fn step(&mut self, key: Key) -> Result<(), InvariantViolation> {
        match self.prev {
            Some(prev) if prev >= key => Err(InvariantViolation::Unsorted { prev, next: key }),
            _ => {
                self.prev = Some(key);
                Ok(())
            }
        }
    }
}
