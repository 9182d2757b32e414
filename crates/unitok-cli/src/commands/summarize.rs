use std::path::PathBuf;

use unitok::UniTok;

use crate::logging::LogArgs;

/// Args for the summarize command.
#[derive(clap::Args, Debug)]
pub struct SummarizeArgs {
    /// Dataset directory.
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,

    #[clap(flatten)]
    logging: LogArgs,
}

impl SummarizeArgs {
    /// Run the summarize command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging()?;

        let ut = UniTok::load(&self.path)?;
        let summary = ut.summarize()?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print!("{summary}");
        }
        Ok(())
    }
}
