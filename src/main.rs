// ============================================================
// File: main.rs
//
// Description:
//   Entry point for the traced B-tree tool. Loads settings
//   from the environment, applies command-line overrides,
//   and hands stdin/stdout to the REPL in `lib.rs`.
//
//   Logs go to stderr and are filtered with `RUST_LOG`
//   (default `btree_trace=warn`) so they never mix with
//   REPL output.
// ============================================================
use std::io;
use std::process;

use btree_trace::{Session, Settings, USAGE, repl_loop};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "btree-trace",
    about = "Step through B-tree inserts and searches one decision at a time"
)]
struct Cli {
    /// Order of the tree (3-6); overrides BTREE_TRACE_ORDER
    #[arg(long)]
    order: Option<usize>,

    /// Pause between steps for PLAY, in milliseconds; overrides BTREE_TRACE_PLAY_DELAY_MS
    #[arg(long)]
    play_delay_ms: Option<u64>,
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::from_env()?.with_overrides(cli.order, cli.play_delay_ms)?;
    info!(order = settings.order, play_delay = ?settings.play_delay, "settings loaded");

    let mut session = Session::with_order(settings.order)?;

    println!("B-Tree Trace");
    println!("{USAGE}");

    let mut out = io::stdout().lock();
    repl_loop(&mut session, &settings, io::stdin().lock(), &mut out)?;
    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "btree_trace=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{e:#}");
        eprintln!("error: {e}");
        process::exit(1);
    }
}
