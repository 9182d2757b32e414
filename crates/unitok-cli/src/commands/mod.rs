use crate::commands::{integrate::IntegrateArgs, remove::RemoveArgs, summarize::SummarizeArgs};

pub mod integrate;
pub mod remove;
pub mod summarize;

/// Subcommands for unitok.
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Print the feature table of a dataset.
    Summarize(SummarizeArgs),

    /// Tokenize one more column of a file into a dataset.
    Integrate(IntegrateArgs),

    /// Remove a feature from a dataset.
    Remove(RemoveArgs),
}

impl Commands {
    /// Run the subcommand.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Commands::Summarize(cmd) => cmd.run(),
            Commands::Integrate(cmd) => cmd.run(),
            Commands::Remove(cmd) => cmd.run(),
        }
    }
}
