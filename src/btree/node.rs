// =====================================================================
// File: btree/node.rs
//
// Description:
//   Defines the B-tree node (`Node`) owned by the engine. Each node
//   maintains:
//
//   - `id`      : Stable identifier assigned when the node is created.
//   - `keys`    : Strictly increasing integer keys.
//   - `children`: Owned child nodes (empty if this node is a leaf).
//   - `is_leaf` : Boolean flag indicating whether the node is a leaf.
//
// Notes:
//   * A split retires the overflowing node's id. Both halves get fresh
//     ids, so a trace event never names a node whose keys it did not see.
//   * Higher-level operations live in `tree.rs`.
// =====================================================================
use std::fmt;

use serde::Serialize;

use super::Key;

/// Stable node identifier, unique within one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out node ids in creation order. Never rewinds, even across resets.
#[derive(Debug, Default)]
pub(crate) struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub(crate) fn allocate(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }
}

/// One B-tree node. Serializes as `{ id, keys, children, isLeaf }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub keys: Vec<Key>,
    /// Box allows recursive ownership of child nodes on the heap
    pub children: Vec<Box<Node>>,
    pub is_leaf: bool,
}

impl Node {
    /// Creates a new empty node with the given id.
    pub fn new(id: NodeId, is_leaf: bool) -> Self {
        Self {
            id,
            keys: Vec::new(),
            children: Vec::new(),
            is_leaf,
        }
    }

    /// Returns the index of the first key that is >= `key`.
    /// If all stored keys are less than `key`, returns `keys.len()`.
    ///
    /// This is both the insertion position and the child to descend into.
    pub fn lower_bound(&self, key: Key) -> usize {
        self.keys.binary_search(&key).unwrap_or_else(|pos| pos)
    }

    /// True if `pos` (as returned by [`Node::lower_bound`]) holds `key` itself.
    pub fn holds(&self, pos: usize, key: Key) -> bool {
        self.keys.get(pos) == Some(&key)
    }

    /// Appends all keys of this subtree to `out` in sorted (in-order) order.
    pub fn collect_keys(&self, out: &mut Vec<Key>) {
        if self.is_leaf {
            out.extend_from_slice(&self.keys);
            return;
        }
        for (i, key) in self.keys.iter().enumerate() {
            // Left subtree, then the separator
            if let Some(child) = self.children.get(i) {
                child.collect_keys(out);
            }
            out.push(*key);
        }
        // Rightmost subtree
        if let Some(last) = self.children.get(self.keys.len()) {
            last.collect_keys(out);
        }
    }

    /// Total number of keys stored in this subtree.
    pub fn key_count(&self) -> usize {
        self.keys.len() + self.children.iter().map(|c| c.key_count()).sum::<usize>()
    }

    /// Number of levels from this node down to its leaves (a lone leaf is 1).
    /// All leaves sit at the same depth, so following the leftmost edge is enough.
    pub fn height(&self) -> usize {
        let mut levels = 1;
        let mut current = self;
        while let Some(first) = current.children.first() {
            current = &**first;
            levels += 1;
        }
        levels
    }

    /// Keys rendered as `10, 20` for trace descriptions.
    pub(crate) fn keys_label(&self) -> String {
        self.keys
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
