mod commands;
mod input;
mod logging;

use clap::Parser;
use commands::Commands;

/// unitok: inspect and extend tokenized dataset directories.
#[derive(clap::Parser, Debug)]
#[command(version)]
pub struct Args {
    /// Subcommand to run.
    #[clap(subcommand)]
    pub command: Commands,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    args.command.run()
}
