//! The `inspect` subcommand for the sparsemem binary

use super::SparsememSubcommandDispatcher;
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use sparsemem_memory::{image, Address, PageSize, Ram, RamStats, Word};
use std::path::PathBuf;

/// Command line arguments for `sparsemem inspect`
#[derive(Args, Debug)]
#[command(author, version, about)]
pub(crate) struct InspectArgs {
    /// The path to the input word image (little-endian 4 byte words).
    #[arg(long, short)]
    input: PathBuf,

    /// The number of words per page. Must be a power of two.
    #[arg(long, default_value_t = 1024)]
    page_size: usize,

    /// The first address of the words to print.
    #[arg(long, default_value_t = 0)]
    start: Address,

    /// The number of words to print, starting at `start`.
    #[arg(long, default_value_t = 0)]
    count: usize,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    input: PathBuf,
    words: usize,
    usage: String,
    #[serde(flatten)]
    stats: RamStats,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    dump: Vec<Word>,
}

impl SparsememSubcommandDispatcher for InspectArgs {
    fn dispatch(self) -> Result<()> {
        tracing::info!(target: "sparsemem-cli::inspect", "Loading word image @ {}", self.input.display());
        let words = image::read_words(&self.input)?;

        let mut ram = Ram::with_page_size(PageSize::new(self.page_size)?);
        ram.bulk_init(&words)?;
        tracing::info!(target: "sparsemem-cli::inspect", "Loaded {} words into {} pages", words.len(), ram.page_count());

        let report = Report {
            input: self.input,
            words: words.len(),
            usage: ram.usage(),
            stats: ram.stats(),
            dump: ram.read_range(self.start, self.count)?,
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        println!("image:      {}", report.input.display());
        println!("words:      {}", report.words);
        println!("page size:  {} words", report.stats.page_size);
        println!("pages:      {} ({})", report.stats.page_count, report.usage);
        println!("table:      {} slots", report.stats.capacity);
        for (row, chunk) in report.dump.chunks(8).enumerate() {
            let address = self.start.wrapping_add((row * 8) as Address);
            let words = chunk.iter().map(|w| format!("{:08x}", w)).collect::<Vec<_>>().join(" ");
            println!("{:08x}:  {}", address, words);
        }
        Ok(())
    }
}
