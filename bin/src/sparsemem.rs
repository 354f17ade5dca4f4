//! The `sparsemem` binary: inspect word images and render their screen memory.

use anyhow::Result;
use clap::{ArgAction, Parser};
use subcommands::{SparsememSubcommand, SparsememSubcommandDispatcher};
use tracing::Level;

mod subcommands;

/// Command line arguments for `sparsemem`
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Verbosity level (0-4)
    #[arg(long, short, action = ArgAction::Count)]
    v: u8,

    /// The subcommand to run
    #[command(subcommand)]
    subcommand: SparsememSubcommand,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing_subscriber(args.v)?;
    args.subcommand.dispatch()
}

/// Initializes the tracing subscriber
///
/// # Arguments
/// * `verbosity_level` - The verbosity level (0-4)
///
/// # Returns
/// * `Result<()>` - Ok if successful, Err otherwise.
fn init_tracing_subscriber(verbosity_level: u8) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(match verbosity_level {
            0 => Level::ERROR,
            1 => Level::WARN,
            2 => Level::INFO,
            3 => Level::DEBUG,
            _ => Level::TRACE,
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber).map_err(|e| anyhow::anyhow!(e))
}
