//! Subcommands for the `sparsemem` binary

use anyhow::Result;
use clap::Subcommand;

mod display;
mod inspect;

pub(crate) trait SparsememSubcommandDispatcher {
    /// Dispatches the subcommand
    fn dispatch(self) -> Result<()>;
}

/// The subcommands for the `sparsemem` binary
#[derive(Subcommand, Debug)]
pub(crate) enum SparsememSubcommand {
    /// Load a word image and report on the memory it occupies
    Inspect(inspect::InspectArgs),
    /// Load a word image and draw its screen memory on the terminal
    Display(display::DisplayArgs),
}

impl SparsememSubcommandDispatcher for SparsememSubcommand {
    fn dispatch(self) -> Result<()> {
        match self {
            SparsememSubcommand::Inspect(args) => args.dispatch(),
            SparsememSubcommand::Display(args) => args.dispatch(),
        }
    }
}
