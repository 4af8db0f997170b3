// =====================================================================
// File: integration_session.rs
//
// Description:
//   End-to-end tests through the public API only. They drive the same
//   paths the binary does:
//
//   - Scripted REPL sessions fed through `repl_loop`
//   - Session playback of insert and search traces
//   - Rendering the live tree with the current highlight
//   - Larger workloads checked against the B-tree invariants
// =====================================================================
use btree_trace::{
    BTreeEngine, EventKind, Highlight, Outcome, Session, Settings, Step, render_tree, repl_loop,
};

/// Helper - run a whole script through the REPL and return its output
fn run_script(session: &mut Session, script: &str) -> String {
    let mut out = Vec::new();
    repl_loop(session, &Settings::default(), script.as_bytes(), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_scripted_session_builds_tree() {
    let mut session = Session::new();
    let output = run_script(
        &mut session,
        "INSERT 10\nPLAY\nINSERT 20\nPLAY\nINSERT 5\nPLAY\nTREE\nSTATS\nEXIT\n",
    );

    assert_eq!(session.engine().keys(), vec![5, 10, 20]);
    assert!(output.contains("Step 4 of 4: Root node split, creating a new root with key 10"));
    // Playback is complete, so TREE draws without a highlight
    assert!(output.contains("[10]\n├── [5]\n└── [20]\n"));
    assert!(output.contains("Keys stored: 3"));
    assert!(output.contains("Height: 2"));
    assert!(output.ends_with("Exiting...\n"));
}

#[test]
fn test_scripted_session_survives_bad_input() {
    let mut session = Session::new();
    let output = run_script(&mut session, "INSERT 1\nINSERT x1\nSEARCH\nJUMP\nSEARCH 1\n");

    assert!(output.contains("ERR: Please enter a valid number"));
    assert!(output.contains("ERR: SEARCH requires exactly one key"));
    assert!(output.contains("ERR: command 'JUMP' not handled"));
    assert_eq!(session.history().len(), 2);
    assert_eq!(session.engine().keys(), vec![1]);
}

#[test]
fn test_end_of_input_stops_loop() {
    let mut session = Session::new();
    let output = run_script(&mut session, "insert 3\ninsert 4");
    assert_eq!(session.engine().keys(), vec![3, 4]);
    assert!(!output.contains("Exiting..."));
}

#[test]
fn test_search_playback_on_sample_tree() {
    let mut session = Session::new();
    session.load_sample();

    let trace = session.search(35).unwrap();
    assert_eq!(trace.outcome(), Outcome::Found);
    assert_eq!(
        trace.kinds(),
        vec![
            EventKind::SearchNode,
            EventKind::SearchChild,
            EventKind::SearchNode,
            EventKind::KeyFound,
        ]
    );

    // Root [10 30]: 35 goes right, edge 2
    session.step_forward();
    let text = render_tree(session.engine().root(), session.highlight());
    assert!(text.starts_with("* [10 30]\n"));
    assert!(text.contains("└=> [35 40]"));

    session.step_forward();
    session.step_forward();
    let text = render_tree(session.engine().root(), session.highlight());
    assert!(text.contains("* [<35> 40]"));

    assert_eq!(session.step_forward(), Some(Step::Complete));
    assert!(session.highlight().is_none());
}

#[test]
fn test_insert_into_sample_tree_cascades() {
    let mut session = Session::new();
    session.load_sample();

    // Leaf [35 40] overflows, then the root [10 30] overflows with 40
    let trace = session.insert(45).unwrap();
    assert_eq!(
        trace.kinds(),
        vec![
            EventKind::VisitNode,
            EventKind::ChooseChild,
            EventKind::VisitNode,
            EventKind::InsertKey,
            EventKind::SplitNode,
            EventKind::PropagateSplit,
            EventKind::SplitNode,
            EventKind::RootSplit,
        ]
    );

    let engine = session.engine();
    assert_eq!(engine.root().keys, vec![30]);
    assert_eq!(engine.height(), 3);
    assert!(engine.verify().is_ok());
}

#[test]
fn test_every_order_survives_large_workload() {
    for order in 3..=6 {
        let mut engine = BTreeEngine::new(order).unwrap();
        // Interleave ascending and descending runs
        for i in 0..250 {
            let key = if i % 2 == 0 { i } else { 1_000 - i };
            assert_eq!(engine.insert(key).unwrap().outcome(), Outcome::Inserted);
        }
        assert!(engine.verify().is_ok(), "order {order}");
        assert_eq!(engine.len(), 250);

        for i in 0..250 {
            let key = if i % 2 == 0 { i } else { 1_000 - i };
            assert_eq!(engine.search(key).unwrap().outcome(), Outcome::Found);
        }
        assert_eq!(engine.search(500).unwrap().outcome(), Outcome::NotFound);
    }
}

#[test]
fn test_highlight_targets_single_leaf() {
    // Only the leaf holding the key lights up
    let mut engine = BTreeEngine::default();
    for key in [10, 20, 5] {
        engine.insert(key).unwrap();
    }
    let trace = engine.search(5).unwrap();
    let found = trace.last().unwrap();
    let highlight = Highlight::for_event(&trace, found);

    let root = engine.root();
    assert!(highlight.key(&root.children[0], 0));
    assert!(!highlight.node(&root.children[1]));
    assert!(!highlight.node(root));
}

#[test]
fn test_step_on_overflowed_leaf_draws_no_highlight() {
    let mut session = Session::new();
    let output = run_script(&mut session, "INSERT 10\nINSERT 20\nINSERT 30\nNEXT\n");

    // The leaf that took 30 no longer exists after the split
    assert!(output.ends_with(
        "Step 2 of 4: Inserted key 30 at position 2 in leaf node\n[20]\n├── [10]\n└── [30]\n"
    ));
}
