// =====================================================================
// File: session.rs
//
// Description:
// Defines the `Session` struct, which represents one running simulator
// context: the engine, playback of the latest operation, the text
// currently explaining what is on screen, and the operation history.
//
// Responsibilities:
// - Reject bad input without touching the tree or the current playback.
// - Start a fresh `TraceViewer` for every successful insert or search.
// - Keep `explanation` in step with the viewer cursor.
//
// Each REPL run owns exactly one session.
// =====================================================================
use std::fmt;

use tracing::{info, warn};

use crate::btree::{BTreeEngine, IntoKey, SAMPLE_KEYS};
use crate::error::BTreeError;
use crate::trace::{Highlight, Operation, Step, Trace, TraceViewer};

pub const INVALID_INPUT_MESSAGE: &str = "Please enter a valid number";
pub const COMPLETE_MESSAGE: &str = "Operation complete!";

/// Summary of the current tree, as shown by `STATS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeProperties {
    pub order: usize,
    pub max_keys: usize,
    pub min_keys: usize,
    pub operations: usize,
    pub keys: usize,
    pub height: usize,
}

impl fmt::Display for TreeProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Order (m): {}", self.order)?;
        writeln!(f, "Maximum keys per node: {}", self.max_keys)?;
        writeln!(f, "Minimum keys per non-root node: {}", self.min_keys)?;
        writeln!(f, "Operations performed: {}", self.operations)?;
        writeln!(f, "Keys stored: {}", self.keys)?;
        write!(f, "Height: {}", self.height)
    }
}

#[derive(Debug)]
pub struct Session {
    engine: BTreeEngine,
    /// Playback of the latest operation (`None` right after a reset).
    viewer: Option<TraceViewer>,
    explanation: String,
    history: Vec<Operation>,
}

impl Default for Session {
    fn default() -> Self {
        Self::from_engine(BTreeEngine::default())
    }
}

impl Session {
    /// Creates a new session with an empty tree of the default order.
    ///
    /// # Example
    /// ```
    /// use btree_trace::Session;
    /// let session = Session::new();
    /// assert_eq!(session.engine().order(), 3);
    /// assert!(session.viewer().is_none());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(order: usize) -> Result<Self, BTreeError> {
        Ok(Self::from_engine(BTreeEngine::new(order)?))
    }

    fn from_engine(engine: BTreeEngine) -> Self {
        let explanation = format!("New B-tree created with order {}", engine.order());
        Self {
            engine,
            viewer: None,
            explanation,
            history: Vec::new(),
        }
    }

    pub fn engine(&self) -> &BTreeEngine {
        &self.engine
    }

    pub fn viewer(&self) -> Option<&TraceViewer> {
        self.viewer.as_ref()
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn history(&self) -> &[Operation] {
        &self.history
    }

    /// Insert a key and start playback of its trace.
    pub fn insert(&mut self, raw: impl IntoKey) -> Result<&Trace, BTreeError> {
        match self.engine.insert(raw) {
            Ok(trace) => Ok(self.begin(trace)),
            Err(err) => Err(self.reject(err)),
        }
    }

    /// Search for a key and start playback of its trace.
    pub fn search(&mut self, raw: impl IntoKey) -> Result<&Trace, BTreeError> {
        match self.engine.search(raw) {
            Ok(trace) => Ok(self.begin(trace)),
            Err(err) => Err(self.reject(err)),
        }
    }

    fn begin(&mut self, trace: Trace) -> &Trace {
        let operation = trace.operation();
        self.explanation = match operation {
            Operation::Insert(key) => format!("Starting insertion of key {key}"),
            Operation::Search(key) => format!("Starting search for key {key}"),
        };
        self.history.push(operation);
        info!(%operation, outcome = ?trace.outcome(), steps = trace.len(), "operation recorded");
        self.viewer.insert(TraceViewer::new(trace)).trace()
    }

    fn reject(&mut self, err: BTreeError) -> BTreeError {
        warn!(%err, "input rejected");
        self.explanation = INVALID_INPUT_MESSAGE.to_string();
        err
    }

    /// Advance playback. `None` when there is nothing to play.
    pub fn step_forward(&mut self) -> Option<Step> {
        let viewer = self.viewer.as_mut()?;
        let step = viewer.step_forward();
        self.explanation = match step {
            Step::Advanced => viewer.explanation().unwrap_or_default().to_string(),
            Step::Complete => COMPLETE_MESSAGE.to_string(),
        };
        Some(step)
    }

    /// Rewind playback by one event. Returns `false` if nothing moved.
    pub fn step_backward(&mut self) -> bool {
        let Some(viewer) = self.viewer.as_mut() else {
            return false;
        };
        if !viewer.step_backward() {
            return false;
        }
        if let Some(text) = viewer.explanation() {
            self.explanation = text.to_string();
        }
        true
    }

    /// Highlight for the current step; empty once playback has finished.
    pub fn highlight(&self) -> Highlight {
        match &self.viewer {
            Some(viewer) if !viewer.is_complete() => viewer.highlight(),
            _ => Highlight::default(),
        }
    }

    /// Start over with an empty tree of `order`. History and playback are
    /// cleared. An unsupported order changes nothing.
    pub fn reset(&mut self, order: usize) -> Result<(), BTreeError> {
        self.engine.reset(order)?;
        self.viewer = None;
        self.history.clear();
        self.explanation = format!("New B-tree created with order {order}");
        Ok(())
    }

    /// Replace the tree with the sample tree at the current order.
    pub fn load_sample(&mut self) {
        self.engine.load_sample();
        self.viewer = None;
        self.history.clear();
        let values = SAMPLE_KEYS
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        self.explanation = format!(
            "Created a sample B-tree with order {} and values: {values}",
            self.engine.order()
        );
    }

    pub fn properties(&self) -> TreeProperties {
        TreeProperties {
            order: self.engine.order(),
            max_keys: self.engine.max_keys(),
            min_keys: self.engine.min_keys(),
            operations: self.history.len(),
            keys: self.engine.len(),
            height: self.engine.height(),
        }
    }
}

// =====================================================================
// Unit Tests for Session
// =====================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::Outcome;

    // Basic Session Creation
    #[test]
    fn test_new_session_initial_state() {
        let session = Session::new();
        assert!(session.engine().is_empty());
        assert!(session.viewer().is_none());
        assert!(session.history().is_empty());
        assert_eq!(session.explanation(), "New B-tree created with order 3");
    }

    #[test]
    fn test_with_order_rejects_unsupported() {
        assert!(Session::with_order(5).is_ok());
        assert_eq!(
            Session::with_order(9).unwrap_err(),
            BTreeError::InvalidOrder(9)
        );
    }

    // Operation lifecycle
    #[test]
    fn test_insert_starts_playback() {
        let mut session = Session::new();
        let trace = session.insert("10").unwrap();
        assert_eq!(trace.outcome(), Outcome::Inserted);

        assert_eq!(session.explanation(), "Starting insertion of key 10");
        assert_eq!(session.history(), &[Operation::Insert(10)]);
        assert_eq!(session.viewer().map(|v| v.index()), Some(0));
    }

    #[test]
    fn test_invalid_input_changes_nothing_but_explanation() {
        let mut session = Session::new();
        session.insert(10).unwrap();
        session.step_forward();

        let err = session.insert("abc").unwrap_err();
        assert!(matches!(err, BTreeError::InvalidInput { .. }));
        assert_eq!(session.explanation(), INVALID_INPUT_MESSAGE);

        // Tree, history and playback are as before
        assert_eq!(session.engine().keys(), vec![10]);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.viewer().map(|v| v.index()), Some(1));
    }

    #[test]
    fn test_search_rejects_blank_input() {
        let mut session = Session::new();
        assert!(session.search("   ").is_err());
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_stepping_follows_event_descriptions() {
        let mut session = Session::new();
        session.insert(10).unwrap();

        assert_eq!(session.step_forward(), Some(Step::Advanced));
        assert_eq!(
            session.explanation(),
            "Inserted key 10 at position 0 in leaf node"
        );

        assert_eq!(session.step_forward(), Some(Step::Complete));
        assert_eq!(session.explanation(), COMPLETE_MESSAGE);
        assert!(session.highlight().is_none());

        assert!(session.step_backward());
        assert_eq!(
            session.explanation(),
            "Examining node with keys [] to insert 10"
        );
        assert!(!session.step_backward());
    }

    #[test]
    fn test_step_without_operation() {
        let mut session = Session::new();
        assert_eq!(session.step_forward(), None);
        assert!(!session.step_backward());
        assert!(session.highlight().is_none());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = Session::new();
        session.insert(1).unwrap();
        session.search(1).unwrap();

        session.reset(4).unwrap();
        assert!(session.engine().is_empty());
        assert_eq!(session.engine().order(), 4);
        assert!(session.viewer().is_none());
        assert!(session.history().is_empty());
        assert_eq!(session.explanation(), "New B-tree created with order 4");
    }

    #[test]
    fn test_reset_with_bad_order_keeps_tree() {
        let mut session = Session::new();
        session.insert(1).unwrap();
        assert!(session.reset(12).is_err());
        assert_eq!(session.engine().keys(), vec![1]);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_sample_tree_and_properties() {
        let mut session = Session::new();
        session.insert(99).unwrap();
        session.load_sample();

        assert_eq!(
            session.explanation(),
            "Created a sample B-tree with order 3 and values: 10, 20, 5, 30, 40, 15, 35, 7"
        );
        let props = session.properties();
        assert_eq!(
            props,
            TreeProperties {
                order: 3,
                max_keys: 2,
                min_keys: 1,
                operations: 0,
                keys: 8,
                height: 2,
            }
        );
        assert!(session.viewer().is_none());
    }

    #[test]
    fn test_properties_display() {
        let session = Session::with_order(5).unwrap();
        let text = session.properties().to_string();
        assert!(text.contains("Order (m): 5"));
        assert!(text.contains("Maximum keys per node: 4"));
        assert!(text.contains("Minimum keys per non-root node: 2"));
    }
}
