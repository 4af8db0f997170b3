// =====================================================================
// File: trace/event.rs
//
// Description:
//   The recorded output of one engine operation.
//
//   - `EventKind`    : What decision a step represents.
//   - `NodeSnapshot` : Immutable copy of one node at the moment of a step.
//   - `TraceEvent`   : One step; points at snapshots by `SnapshotId`.
//   - `Trace`        : Events plus the snapshot arena they index into.
//
// Notes:
//   * Snapshots are shallow: children are recorded by their stable
//     `NodeId`, which is enough to describe the node's structure.
//   * Events are append-only while recording and immutable afterwards.
// =====================================================================
use std::fmt;

use serde::Serialize;

use crate::btree::{Key, Node, NodeId};

/// The decision a single trace step represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    // insert
    VisitNode,
    InsertKey,
    KeyExists,
    ChooseChild,
    SplitNode,
    PropagateSplit,
    RootSplit,
    // search
    SearchNode,
    SearchChild,
    KeyFound,
    KeyNotFound,
}

impl EventKind {
    /// Kinds that point at a single node the viewer should emphasize.
    pub fn highlights_node(self) -> bool {
        matches!(
            self,
            Self::VisitNode
                | Self::SearchNode
                | Self::InsertKey
                | Self::KeyFound
                | Self::KeyExists
                | Self::KeyNotFound
                | Self::SearchChild
                | Self::ChooseChild
        )
    }

    /// Kinds whose `key_pos` names a key inside the emphasized node.
    pub fn highlights_key(self) -> bool {
        matches!(self, Self::KeyFound | Self::KeyExists | Self::InsertKey)
    }

    /// Kinds whose `child_pos` names the child pointer being followed.
    pub fn highlights_child(self) -> bool {
        matches!(self, Self::SearchChild | Self::ChooseChild)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::VisitNode => "visit-node",
            Self::InsertKey => "insert-key",
            Self::KeyExists => "key-exists",
            Self::ChooseChild => "choose-child",
            Self::SplitNode => "split-node",
            Self::PropagateSplit => "propagate-split",
            Self::RootSplit => "root-split",
            Self::SearchNode => "search-node",
            Self::SearchChild => "search-child",
            Self::KeyFound => "key-found",
            Self::KeyNotFound => "key-not-found",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Index of a snapshot inside its [`Trace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SnapshotId(usize);

/// A node as it looked when a step was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub keys: Vec<Key>,
    pub children: Vec<NodeId>,
    pub is_leaf: bool,
}

impl NodeSnapshot {
    fn capture(node: &Node) -> Self {
        Self {
            id: node.id,
            keys: node.keys.clone(),
            children: node.children.iter().map(|c| c.id).collect(),
            is_leaf: node.is_leaf,
        }
    }
}

/// The two halves of a split and the key promoted between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitRecord {
    pub left: SnapshotId,
    pub right: SnapshotId,
    pub median: Key,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceEvent {
    pub kind: EventKind,
    pub node: Option<SnapshotId>,
    pub key_pos: Option<usize>,
    pub child_pos: Option<usize>,
    pub split: Option<SplitRecord>,
    pub description: String,
}

impl TraceEvent {
    fn on(kind: EventKind, node: SnapshotId, description: String) -> Self {
        Self {
            kind,
            node: Some(node),
            key_pos: None,
            child_pos: None,
            split: None,
            description,
        }
    }

    fn at_key(mut self, pos: usize) -> Self {
        self.key_pos = Some(pos);
        self
    }

    fn at_child(mut self, pos: usize) -> Self {
        self.child_pos = Some(pos);
        self
    }
}

/// The operation a trace was recorded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "key", rename_all = "lowercase")]
pub enum Operation {
    Insert(Key),
    Search(Key),
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert(key) => write!(f, "insert {key}"),
            Self::Search(key) => write!(f, "search {key}"),
        }
    }
}

/// How an operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Inserted,
    KeyExists,
    Found,
    NotFound,
}

/// Complete ordered record of one engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trace {
    operation: Operation,
    outcome: Outcome,
    events: Vec<TraceEvent>,
    snapshots: Vec<NodeSnapshot>,
}

impl Trace {
    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TraceEvent> {
        self.events.get(index)
    }

    pub fn last(&self) -> Option<&TraceEvent> {
        self.events.last()
    }

    /// Event kinds in order, mostly handy for assertions.
    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.iter().map(|e| e.kind).collect()
    }

    pub fn snapshot(&self, id: SnapshotId) -> Option<&NodeSnapshot> {
        self.snapshots.get(id.0)
    }

    /// Snapshot of the node an event is about, if it has one.
    pub fn node_of(&self, event: &TraceEvent) -> Option<&NodeSnapshot> {
        event.node.and_then(|id| self.snapshot(id))
    }
}

/// Collects events and snapshots while the engine runs an operation.
#[derive(Debug, Default)]
pub(crate) struct TraceRecorder {
    events: Vec<TraceEvent>,
    snapshots: Vec<NodeSnapshot>,
}

impl TraceRecorder {
    fn capture(&mut self, node: &Node) -> SnapshotId {
        self.snapshots.push(NodeSnapshot::capture(node));
        SnapshotId(self.snapshots.len() - 1)
    }

    pub(crate) fn record(&mut self, kind: EventKind, node: &Node, description: String) {
        let snap = self.capture(node);
        self.events.push(TraceEvent::on(kind, snap, description));
    }

    pub(crate) fn record_key(&mut self, kind: EventKind, node: &Node, pos: usize, description: String) {
        let snap = self.capture(node);
        self.events
            .push(TraceEvent::on(kind, snap, description).at_key(pos));
    }

    pub(crate) fn record_child(&mut self, kind: EventKind, node: &Node, pos: usize, description: String) {
        let snap = self.capture(node);
        self.events
            .push(TraceEvent::on(kind, snap, description).at_child(pos));
    }

    /// Records a split. `parent` is the new root for `RootSplit`, `None`
    /// for an ordinary `SplitNode` whose parent has not been updated yet.
    pub(crate) fn record_split(
        &mut self,
        kind: EventKind,
        parent: Option<&Node>,
        left: &Node,
        right: &Node,
        median: Key,
        description: String,
    ) {
        let node = parent.map(|p| self.capture(p));
        let left = self.capture(left);
        let right = self.capture(right);
        self.events.push(TraceEvent {
            kind,
            node,
            key_pos: None,
            child_pos: None,
            split: Some(SplitRecord {
                left,
                right,
                median,
            }),
            description,
        });
    }

    pub(crate) fn finish(self, operation: Operation, outcome: Outcome) -> Trace {
        Trace {
            operation,
            outcome,
            events: self.events,
            snapshots: self.snapshots,
        }
    }
}
