//! Summarize CLI: write a Markdown summary of a directory; --print sends it to stdout instead.

use anyhow::Result;
use clap::Parser;
use std::time::Instant;
use summarize::engine::arg_parser::Cli;
use summarize::engine::handle_run;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
