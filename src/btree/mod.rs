// =====================================================================
// File: btree/mod.rs
//
//! The `btree` module contains the traced B-tree engine.
//!
//! Structure:
//! - `key.rs`   : Key type, accepted range and input parsing ([`IntoKey`]).
//! - `node.rs`  : Defines the [`Node`] structure and its helpers.
//! - `tree.rs`  : Defines the [`BTreeEngine`] and its algorithms
//!                (insert with split/promotion, search, verify).
//! - `tests.rs` : Unit tests for the engine (compiled only in test mode).
// =====================================================================

pub mod key;
pub mod node;
pub mod tree;

pub use self::key::{IntoKey, KEY_LIMIT, Key};
pub use self::node::{Node, NodeId};
pub use self::tree::{BTreeEngine, DEFAULT_ORDER, MAX_ORDER, MIN_ORDER, SAMPLE_KEYS};
