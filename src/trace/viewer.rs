// =====================================================================
// File: trace/viewer.rs
//
// Description:
//   Step-by-step playback of one recorded `Trace`.
//
//   The viewer holds a single cursor `0 <= index < len`. It starts at the
//   first event, moves one event at a time in either direction, and
//   reports `Step::Complete` instead of moving past the last one.
//
// Notes:
//   * Highlighting matches nodes by their stable `NodeId`. Two nodes
//     with identical keys can never both light up.
//   * Auto-play is not part of the viewer. Callers that want it call
//     `step_forward` on their own schedule.
// =====================================================================
use crate::btree::{Node, NodeId};

use super::{Trace, TraceEvent};

/// Result of [`TraceViewer::step_forward`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Cursor moved to the next event.
    Advanced,
    /// Cursor was already on the last event; nothing moved.
    Complete,
}

/// What the renderer should emphasize for the current event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Highlight {
    pub node: Option<NodeId>,
    pub key_pos: Option<usize>,
    pub child_pos: Option<usize>,
}

impl Highlight {
    /// Resolve the highlight for one event of `trace`.
    pub fn for_event(trace: &Trace, event: &TraceEvent) -> Self {
        if !event.kind.highlights_node() {
            return Self::default();
        }
        let Some(snapshot) = trace.node_of(event) else {
            return Self::default();
        };
        Self {
            node: Some(snapshot.id),
            key_pos: event.key_pos.filter(|_| event.kind.highlights_key()),
            child_pos: event.child_pos.filter(|_| event.kind.highlights_child()),
        }
    }

    pub fn is_none(&self) -> bool {
        self.node.is_none()
    }

    pub fn node(&self, node: &Node) -> bool {
        self.node == Some(node.id)
    }

    pub fn key(&self, node: &Node, key_pos: usize) -> bool {
        self.node(node) && self.key_pos == Some(key_pos)
    }

    pub fn child(&self, node: &Node, child_pos: usize) -> bool {
        self.node(node) && self.child_pos == Some(child_pos)
    }
}

#[derive(Debug, Clone)]
pub struct TraceViewer {
    trace: Trace,
    index: usize,
    complete: bool,
}

impl TraceViewer {
    /// Start playback of `trace` at its first event.
    pub fn new(trace: Trace) -> Self {
        Self {
            trace,
            index: 0,
            complete: false,
        }
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.trace.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trace.is_empty()
    }

    /// True once `step_forward` has been asked to move past the last event.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn step_forward(&mut self) -> Step {
        if self.index + 1 < self.trace.len() {
            self.index += 1;
            Step::Advanced
        } else {
            self.complete = true;
            Step::Complete
        }
    }

    /// Move back one event. Returns `false` (and does nothing) at the first event.
    pub fn step_backward(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        self.complete = false;
        true
    }

    pub fn current_event(&self) -> Option<&TraceEvent> {
        self.trace.get(self.index)
    }

    /// Description of the current event, shown verbatim to the user.
    pub fn explanation(&self) -> Option<&str> {
        self.current_event().map(|e| e.description.as_str())
    }

    pub fn highlight(&self) -> Highlight {
        self.current_event()
            .map(|event| Highlight::for_event(&self.trace, event))
            .unwrap_or_default()
    }
}
