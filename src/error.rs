// =====================================================================
// File: error.rs
//
// Description:
//   Error types shared by the engine, the session and the REPL.
//
//   - `BTreeError`         : rejected input (bad key, bad order).
//   - `InvariantViolation` : a structural check failed in `verify()`.
//
// Notes:
//   * A duplicate insert or a failed search is NOT an error. Those are
//     normal outcomes and come back inside the returned trace.
// =====================================================================
use crate::btree::{Key, MAX_ORDER, MIN_ORDER, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BTreeError {
    /// Raw value could not be turned into a key. The tree is untouched.
    #[error("invalid input {raw:?}: {reason}")]
    InvalidInput { raw: String, reason: &'static str },

    #[error("unsupported order {0}, expected {min}..={max}", min = MIN_ORDER, max = MAX_ORDER)]
    InvalidOrder(usize),
}

/// First broken B-tree property found by [`crate::BTreeEngine::verify`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("keys out of order: {prev} is followed by {next}")]
    Unsorted { prev: Key, next: Key },

    #[error("node {node} has {keys} keys but {children} children")]
    ChildCount {
        node: NodeId,
        keys: usize,
        children: usize,
    },

    #[error("node {node} holds {keys} keys, order allows at most {max}")]
    Overfull { node: NodeId, keys: usize, max: usize },

    #[error("node {node} holds {keys} keys, non-root nodes need at least {min}")]
    Underfull { node: NodeId, keys: usize, min: usize },

    #[error("leaf {node} sits at depth {depth}, expected {expected}")]
    Unbalanced {
        node: NodeId,
        depth: usize,
        expected: usize,
    },
}
