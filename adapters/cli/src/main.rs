#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that analyzes a tablet layout and prints the ranked
//! improvement candidates.

mod layout;

use std::fs;
use std::io::Read as _;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tablet_optimizer_core::TileKind;
use tablet_optimizer_system_session::{PlannerConfig, Session};
use tablet_optimizer_tablet::TabletState;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::layout::{parse_text_grid, render_grid, render_rankings, TabletLayoutSnapshot};

/// Ranks rearrangements of a tablet by how far they push its tiles from the
/// entrance.
#[derive(Debug, Parser)]
#[command(name = "tablet-optimizer")]
#[command(group = clap::ArgGroup::new("input").required(true).args(["layout", "snapshot", "sample"]))]
struct Cli {
    /// Path to a glyph grid file; '-' reads standard input.
    ///
    /// Glyphs: '.' empty, '~' water, '@' entrance, '*' encounter.
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Single-line snapshot string (tablet:v1:<columns>x<rows>:<payload>).
    #[arg(long)]
    snapshot: Option<String>,

    /// Analyze the built-in sample tablet instead of reading input.
    #[arg(long)]
    sample: bool,

    /// Maximum number of chained moves to explore (clamped to 1..=3).
    #[arg(long, default_value_t = 2)]
    depth: u32,

    /// Number of ranked options to print per move count.
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Print the loaded layout as a snapshot string and exit.
    #[arg(long)]
    encode: bool,
}

/// Entry point for the tablet optimizer command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let rows = load_rows(&cli)?;
    let state = TabletState::from_rows(&rows).context("could not analyze the provided layout")?;

    if cli.encode {
        println!("{}", TabletLayoutSnapshot::from_state(&state).encode());
        return Ok(());
    }

    let config = PlannerConfig::new(cli.depth, cli.top);
    let mut session = Session::new(config);

    let started = Instant::now();
    session.load(state);
    let Some(analysis) = session.current() else {
        bail!("session holds no analysis after loading a valid tablet");
    };

    info!(
        width = analysis.state().width(),
        height = analysis.state().height(),
        score = analysis.score(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "analyzed tablet"
    );
    for (moves, group) in analysis.rankings() {
        debug!(moves = *moves, options = group.len(), "ranked improvement group");
    }

    print!("{}", render_grid(analysis.state()));
    println!("score: {}", analysis.score());
    println!();
    print!("{}", render_rankings(analysis, config.top_results()));

    Ok(())
}

fn load_rows(cli: &Cli) -> Result<Vec<Vec<TileKind>>> {
    if cli.sample {
        return Ok(vec![vec![
            TileKind::Encounter,
            TileKind::Entrance,
            TileKind::Empty,
        ]]);
    }

    if let Some(snapshot) = &cli.snapshot {
        let decoded = TabletLayoutSnapshot::decode(snapshot)
            .context("could not decode the snapshot string")?;
        return Ok(decoded.into_rows());
    }

    if let Some(path) = &cli.layout {
        let text = if path.as_os_str() == "-" {
            let mut text = String::new();
            let _ = std::io::stdin()
                .read_to_string(&mut text)
                .context("could not read standard input")?;
            text
        } else {
            fs::read_to_string(path)
                .with_context(|| format!("could not read layout file {}", path.display()))?
        };
        return parse_text_grid(&text).context("could not parse the layout text");
    }

    bail!("provide --layout, --snapshot or --sample");
}
