//! The `display` subcommand for the sparsemem binary

use super::SparsememSubcommandDispatcher;
use anyhow::Result;
use clap::Args;
use sparsemem_memory::{Address, Ram};
use sparsemem_screen::{attach, Screen, BASE_ADDRESS, SIZE};
use std::{io::stdout, path::PathBuf, thread::sleep, time::Duration};

/// Command line arguments for `sparsemem display`
#[derive(Args, Debug)]
#[command(author, version, about)]
pub(crate) struct DisplayArgs {
    /// The path to the input word image (little-endian 4 byte words).
    #[arg(long, short)]
    input: PathBuf,

    /// How long to keep the screen up before restoring the terminal, in milliseconds.
    #[arg(long, default_value_t = 0)]
    hold_ms: u64,
}

impl SparsememSubcommandDispatcher for DisplayArgs {
    fn dispatch(self) -> Result<()> {
        tracing::info!(target: "sparsemem-cli::display", "Loading word image @ {}", self.input.display());
        let mut ram = Ram::from_file(&self.input)?;

        let (screen, _) = attach(&mut ram, Screen::new(stdout()));
        screen.borrow_mut().init()?;

        // Loading does not notify observers; replay the screen memory through the mapping.
        let cells = ram.read_range(BASE_ADDRESS, SIZE as usize)?;
        for (offset, word) in cells.into_iter().enumerate() {
            ram.set(BASE_ADDRESS + offset as Address, word);
        }

        sleep(Duration::from_millis(self.hold_ms));
        screen.borrow_mut().terminate()?;

        tracing::info!(target: "sparsemem-cli::display", "Drew {} cells from {} resident pages", SIZE, ram.page_count());
        Ok(())
    }
}
