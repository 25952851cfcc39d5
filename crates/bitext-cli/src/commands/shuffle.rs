use bitext::sharding::shuffle_shards;

use crate::logging::{DEFAULT_VERBOSITY, LogArgs};

/// Args for the shuffle command.
#[derive(clap::Args, Debug)]
pub struct ShuffleArgs {
    /// Shard files to shuffle.
    #[arg(required = true)]
    files: Vec<String>,

    /// Shuffle seed.
    #[arg(long, default_value = None)]
    seed: Option<u64>,

    #[clap(flatten)]
    logging: LogArgs,
}

impl ShuffleArgs {
    /// Run the shuffle command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(DEFAULT_VERBOSITY)?;

        let total = shuffle_shards(&self.files, self.seed)?;
        log::info!("shuffled {total} records in {} files", self.files.len());
        Ok(())
    }
}
