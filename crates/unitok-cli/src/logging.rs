use stderrlog::{LogLevelNum, Timestamp};

/// Logging setup arg group.
#[derive(clap::Args, Debug)]
pub struct LogArgs {
    /// Silence log messages.
    #[clap(short, long)]
    pub quiet: bool,

    /// More log output (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Prefix log lines with a timestamp.
    #[clap(long)]
    pub ts: bool,
}

impl LogArgs {
    /// The stderr level: warnings by default, each `-v` one step chattier.
    fn level(&self) -> LogLevelNum {
        match self.verbose {
            0 => LogLevelNum::Warn,
            1 => LogLevelNum::Info,
            2 => LogLevelNum::Debug,
            _ => LogLevelNum::Trace,
        }
    }

    /// Install the stderr logger.
    ///
    /// Both the library and this binary log under the `unitok` target prefix.
    pub fn setup_logging(&self) -> Result<(), Box<dyn std::error::Error>> {
        let timestamp = if self.ts {
            Timestamp::Second
        } else {
            Timestamp::Off
        };

        stderrlog::new()
            .module("unitok")
            .quiet(self.quiet)
            .verbosity(self.level())
            .timestamp(timestamp)
            .init()?;
        Ok(())
    }
}
