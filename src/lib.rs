//! # btree_trace
//! A B-tree of integer keys that records every decision it makes.
//!
//! ## Features
//! - `insert` with bottom-up node splitting and median promotion
//! - `search` by standard B-tree descent
//! - Every operation returns a [`Trace`] of ordered, immutable events
//! - [`TraceViewer`] steps through a trace and resolves what to highlight
//! - Text and JSON rendering of the tree
//!
//! ## Usage
//! This crate is primarily consumed by the binary in `main.rs`,
//! which provides the REPL interface. All reusable logic and
//! unit tests live here so the project can be tested with `cargo test`.
// =====================================================================
// File: lib.rs
//
//   This module implements the command loop that accepts the
//   following commands (case-insensitive):
//
//     `INSERT <key>`  -> Insert a key and start stepping through its trace
//     `SEARCH <key>`  -> Search for a key and start stepping through its trace
//     `NEXT`          -> Advance one step and draw the tree
//     `PREV`          -> Go back one step and draw the tree
//     `PLAY`          -> Step until the operation is complete
//     `TREE`          -> Draw the tree with the current highlight
//     `JSON`          -> Print the tree snapshot as JSON
//     `RESET [order]` -> Empty tree, optionally with a new order (3-6)
//     `SAMPLE`        -> Load the sample tree
//     `STATS`         -> Print the tree properties
//     `HISTORY`       -> List the operations performed since the last reset
//     `HELP`          -> Print usage
//     `EXIT` / `QUIT` -> Terminate the program
// =====================================================================
pub mod btree;
pub use btree::{BTreeEngine, IntoKey, Key, Node, NodeId};

pub mod trace;
pub use trace::{EventKind, Highlight, Operation, Outcome, Step, Trace, TraceEvent, TraceViewer};

pub mod error;
pub use error::{BTreeError, InvariantViolation};

pub mod config;
pub use config::{ConfigError, Settings};

pub mod render;
pub use render::{TreeView, render_tree, to_json};

pub mod session;
pub use session::Session;

use std::io::{self, BufRead, Write};
use std::thread;

/// Printed for `HELP` and after unrecognized commands.
pub const USAGE: &str = "Syntax Usage: INSERT <key>, SEARCH <key>, NEXT, PREV, PLAY, TREE, JSON, \
RESET [order], SAMPLE, STATS, HISTORY, HELP, EXIT";

/// Result of handling a single user command.
///
/// - `Continue` means the REPL should keep running.
/// - `Exit` means the REPL should break out and terminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    Continue,
    Exit,
}

/// Read–Evaluate–Print Loop (REPL) over any line source.
///
/// Reads one command per line from `input`, executes it against
/// `session`, and writes responses to `out`. Stops at `EXIT`/`QUIT` or
/// end of input.
///
/// # Example
/// ```
/// use btree_trace::{Session, Settings, repl_loop};
///
/// let mut session = Session::new();
/// let mut out = Vec::new();
/// repl_loop(&mut session, &Settings::default(), "insert 5\nexit\n".as_bytes(), &mut out).unwrap();
/// assert_eq!(session.engine().keys(), vec![5]);
/// ```
pub fn repl_loop<R: BufRead, W: Write>(
    session: &mut Session,
    settings: &Settings,
    input: R,
    out: &mut W,
) -> io::Result<()> {
    for input_line in input.lines() {
        let full_command = input_line?;
        let (cmd, args) = parse_command(&full_command);

        if handle_command(&cmd, &args, settings, session, out)? == CommandResult::Exit {
            break;
        }
        out.flush()?;
    }
    Ok(())
}

/// Parses a raw input line into a command and its arguments.
///
/// The first token is treated as the command (normalized to uppercase),
/// and the remaining tokens are collected as arguments. Leading and
/// trailing whitespace is ignored.
pub fn parse_command(line: &str) -> (String, Vec<String>) {
    let mut command_segments = line.split_whitespace();
    let cmd = command_segments.next().unwrap_or("").to_uppercase();
    let args: Vec<String> = command_segments.map(str::to_string).collect();
    (cmd, args)
}

/// Handles a single user command and returns whether the REPL should continue or exit.
///
/// Only supported commands operate. Any other input prints an error and the usage line.
pub fn handle_command<W: Write>(
    cmd: &str,
    args: &[String],
    settings: &Settings,
    session: &mut Session,
    out: &mut W,
) -> io::Result<CommandResult> {
    match cmd {
        // INSERT <key> / SEARCH <key>
        "INSERT" | "SEARCH" => {
            let [raw] = args else {
                writeln!(out, "ERR: {cmd} requires exactly one key")?;
                return Ok(CommandResult::Continue);
            };
            let result = if cmd == "INSERT" {
                session.insert(raw).map(Trace::len)
            } else {
                session.search(raw).map(Trace::len)
            };
            match result {
                Ok(steps) => {
                    writeln!(out, "{}", session.explanation())?;
                    writeln!(out, "{steps} steps recorded (NEXT / PREV / PLAY)")?;
                    write_step(session, out)?;
                }
                Err(err) => {
                    writeln!(out, "ERR: {} ({err})", session.explanation())?;
                }
            }
        }

        "NEXT" => match session.step_forward() {
            None => writeln!(out, "ERR: no operation to step through")?,
            Some(Step::Complete) => writeln!(out, "{}", session.explanation())?,
            Some(Step::Advanced) => write_step(session, out)?,
        },

        "PREV" => {
            if session.step_backward() {
                write_step(session, out)?;
            } else {
                writeln!(out, "Already at the first step.")?;
            }
        }

        // Auto-play is just repeated NEXT with an optional pause
        "PLAY" => {
            if session.viewer().is_none() {
                writeln!(out, "ERR: no operation to step through")?;
                return Ok(CommandResult::Continue);
            }
            while session.step_forward() == Some(Step::Advanced) {
                write_step(session, out)?;
                if !settings.play_delay.is_zero() {
                    out.flush()?;
                    thread::sleep(settings.play_delay);
                }
            }
            writeln!(out, "{}", session.explanation())?;
        }

        "TREE" => {
            write!(out, "{}", TreeView::new(session.engine().root(), session.highlight()))?;
        }

        "JSON" => {
            let json = to_json(session.engine().root()).map_err(io::Error::other)?;
            writeln!(out, "{json}")?;
        }

        // RESET [order]
        "RESET" => {
            let order = match args {
                [] => Ok(session.engine().order()),
                [raw] => raw.parse::<usize>().map_err(|_| raw.as_str()),
                _ => {
                    writeln!(out, "ERR: RESET takes at most one argument")?;
                    return Ok(CommandResult::Continue);
                }
            };
            match order {
                Ok(order) => match session.reset(order) {
                    Ok(()) => writeln!(out, "{}", session.explanation())?,
                    Err(err) => writeln!(out, "ERR: {err}")?,
                },
                Err(bad) => writeln!(out, "ERR: RESET takes an optional order, got {bad:?}")?,
            }
        }

        "SAMPLE" => {
            session.load_sample();
            writeln!(out, "{}", session.explanation())?;
            write!(out, "{}", TreeView::new(session.engine().root(), Highlight::default()))?;
        }

        "STATS" => {
            writeln!(out, "{}", session.properties())?;
        }

        "HISTORY" => {
            if session.history().is_empty() {
                writeln!(out, "No operations yet.")?;
            }
            for (i, op) in session.history().iter().enumerate() {
                writeln!(out, "{}. {op}", i + 1)?;
            }
        }

        "HELP" => writeln!(out, "{USAGE}")?,

        "EXIT" | "QUIT" => {
            writeln!(out, "Exiting...")?;
            return Ok(CommandResult::Exit);
        }

        // Empty input
        "" => writeln!(out, "Enter a command.")?,

        // Everything else will be noted and returned as an error
        _ => {
            writeln!(out, "ERR: command '{cmd}' not handled")?;
            writeln!(out, "{USAGE}")?;
        }
    }
    Ok(CommandResult::Continue)
}

/// Prints `Step i of n: <description>` followed by the highlighted tree.
fn write_step<W: Write>(session: &Session, out: &mut W) -> io::Result<()> {
    let Some(viewer) = session.viewer() else {
        return Ok(());
    };
    if let Some(event) = viewer.current_event() {
        writeln!(
            out,
            "Step {} of {}: {}",
            viewer.index() + 1,
            viewer.len(),
            event.description
        )?;
    }
    write!(out, "{}", TreeView::new(session.engine().root(), session.highlight()))
}

// =================================================================
// lib.rs Unit tests
// =================================================================

#[cfg(test)]
mod main_lib_tests {
    use super::*;

    /// Run one command line against `session` and return what it printed.
    fn run(session: &mut Session, line: &str) -> (CommandResult, String) {
        let (cmd, args) = parse_command(line);
        let mut out = Vec::new();
        let result = handle_command(&cmd, &args, &Settings::default(), session, &mut out).unwrap();
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_exit_command() {
        let (cmd, args) = parse_command("EXIT");
        assert_eq!(cmd, "EXIT");
        assert!(args.is_empty());
    }

    #[test]
    fn test_exit_and_quit_commands() {
        let mut session = Session::new();
        assert_eq!(run(&mut session, "EXIT").0, CommandResult::Exit);
        assert_eq!(run(&mut session, "quit").0, CommandResult::Exit);
    }

    #[test]
    fn test_whitespace_command() {
        let (cmd, args) = parse_command("   insert     42      ");
        assert_eq!(cmd, "INSERT");
        assert_eq!(args, vec!["42"]);
    }

    #[test]
    fn test_parse_invalid_command() {
        let mut session = Session::new();
        let (result, text) = run(&mut session, "FLY away");
        // Should not exit on bad command
        assert_eq!(result, CommandResult::Continue);
        assert!(text.starts_with("ERR: command 'FLY' not handled"));
        assert!(text.contains(USAGE));
    }

    #[test]
    fn test_insert_prints_first_step() {
        let mut session = Session::new();
        let (_, text) = run(&mut session, "insert 10");
        assert!(text.starts_with("Starting insertion of key 10\n2 steps recorded"));
        assert!(text.contains("Step 1 of 2: Examining node with keys [] to insert 10"));
        assert!(text.ends_with("* [10]\n"));
    }

    #[test]
    fn test_insert_rejects_non_numeric() {
        let mut session = Session::new();
        let (result, text) = run(&mut session, "INSERT abc");
        assert_eq!(result, CommandResult::Continue);
        assert!(text.starts_with("ERR: Please enter a valid number"));
        assert!(session.engine().is_empty());
    }

    #[test]
    fn test_insert_requires_one_key() {
        let mut session = Session::new();
        let (_, text) = run(&mut session, "INSERT");
        assert_eq!(text, "ERR: INSERT requires exactly one key\n");
        let (_, text) = run(&mut session, "SEARCH 1 2");
        assert_eq!(text, "ERR: SEARCH requires exactly one key\n");
    }

    #[test]
    fn test_next_and_prev() {
        let mut session = Session::new();
        let (_, text) = run(&mut session, "NEXT");
        assert_eq!(text, "ERR: no operation to step through\n");

        run(&mut session, "INSERT 7");
        let (_, text) = run(&mut session, "next");
        assert_eq!(
            text,
            "Step 2 of 2: Inserted key 7 at position 0 in leaf node\n* [<7>]\n"
        );
        let (_, text) = run(&mut session, "NEXT");
        assert_eq!(text, "Operation complete!\n");

        let (_, text) = run(&mut session, "PREV");
        assert!(text.starts_with("Step 1 of 2"));
        let (_, text) = run(&mut session, "PREV");
        assert_eq!(text, "Already at the first step.\n");
    }

    #[test]
    fn test_play_runs_to_completion() {
        let mut session = Session::new();
        for key in [10, 20] {
            session.insert(key).unwrap();
        }
        run(&mut session, "INSERT 5");
        let (_, text) = run(&mut session, "PLAY");
        assert!(text.contains("Step 4 of 4: Root node split, creating a new root with key 10"));
        assert!(text.ends_with("Operation complete!\n"));
        assert_eq!(session.viewer().map(|v| v.is_complete()), Some(true));
    }

    #[test]
    fn test_reset_command() {
        let mut session = Session::new();
        run(&mut session, "INSERT 1");
        let (_, text) = run(&mut session, "reset 5");
        assert_eq!(text, "New B-tree created with order 5\n");
        assert!(session.engine().is_empty());

        let (_, text) = run(&mut session, "RESET 9");
        assert!(text.starts_with("ERR: unsupported order 9"));
        let (_, text) = run(&mut session, "RESET five");
        assert_eq!(text, "ERR: RESET takes an optional order, got \"five\"\n");
        let (_, text) = run(&mut session, "RESET 4 5");
        assert_eq!(text, "ERR: RESET takes at most one argument\n");
        assert_eq!(session.engine().order(), 5);
    }

    #[test]
    fn test_history_command() {
        let mut session = Session::new();
        let (_, text) = run(&mut session, "HISTORY");
        assert_eq!(text, "No operations yet.\n");

        run(&mut session, "INSERT 3");
        run(&mut session, "SEARCH 3");
        let (_, text) = run(&mut session, "HISTORY");
        assert_eq!(text, "1. insert 3\n2. search 3\n");
    }

    #[test]
    fn test_sample_and_json_commands() {
        let mut session = Session::new();
        let (_, text) = run(&mut session, "SAMPLE");
        assert!(text.contains("[10 30]"));

        let (_, text) = run(&mut session, "JSON");
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["keys"], serde_json::json!([10, 30]));
    }

    #[test]
    fn test_empty_line() {
        let mut session = Session::new();
        let (result, text) = run(&mut session, "   ");
        assert_eq!(result, CommandResult::Continue);
        assert_eq!(text, "Enter a command.\n");
    }

    #[test]
    fn test_repl_loop_stops_at_exit() {
        let mut session = Session::new();
        let mut out = Vec::new();
        let script = "insert 1\nexit\ninsert 2\n";
        repl_loop(&mut session, &Settings::default(), script.as_bytes(), &mut out).unwrap();

        assert_eq!(session.engine().keys(), vec![1]);
        assert!(String::from_utf8(out).unwrap().ends_with("Exiting...\n"));
    }
}
