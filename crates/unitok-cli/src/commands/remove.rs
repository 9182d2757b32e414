use std::path::PathBuf;

use unitok::UniTok;

use crate::logging::LogArgs;

/// Args for the remove command.
#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Dataset directory.
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Feature to remove.
    #[arg(long, short)]
    name: String,

    #[clap(flatten)]
    logging: LogArgs,
}

impl RemoveArgs {
    /// Run the remove command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging()?;

        let mut ut = UniTok::load(&self.path)?;
        let feature = ut.remove_feature(&self.name)?;
        log::info!("removed {feature}");

        ut.save(&self.path)?;
        Ok(())
    }
}
