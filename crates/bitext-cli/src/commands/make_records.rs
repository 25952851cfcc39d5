use bitext::{
    lines::LineCountPolicy,
    pipeline::{PrepareConfig, prepare_dataset},
    sharding::{DEV_SHARDS, RecordWriterOptions, TRAIN_SHARDS, shard_spec::DEFAULT_PREFIX},
};

use crate::logging::{DEFAULT_VERBOSITY, LogArgs};

/// Args for the make-records command.
#[derive(clap::Args, Debug)]
pub struct MakeRecordsArgs {
    /// Load the whole configuration from a JSON file.
    #[arg(long, default_value = None)]
    config: Option<String>,

    /// Save the effective configuration to a JSON file.
    #[arg(long, default_value = None)]
    save_config: Option<String>,

    /// Output directory for shards and repaired vocabularies.
    #[arg(long, required_unless_present = "config")]
    data_dir: Option<String>,

    /// Train corpus prefix; files are ``{prefix}.{src}`` and ``{prefix}.{tgt}``.
    #[arg(long, required_unless_present = "config")]
    train_prefix: Option<String>,

    /// Dev corpus prefix.
    #[arg(long, required_unless_present = "config")]
    dev_prefix: Option<String>,

    /// Source language suffix.
    #[arg(long, required_unless_present = "config")]
    src: Option<String>,

    /// Target language suffix.
    #[arg(long, required_unless_present = "config")]
    tgt: Option<String>,

    /// Vocabulary file (shared) or prefix (``{prefix}.{src|tgt}``).
    #[arg(long, required_unless_present = "config")]
    vocab_prefix: Option<String>,

    /// Use separate source and target vocabularies.
    #[arg(long)]
    separate_vocab: bool,

    /// The dataset identifier in shard filenames.
    #[arg(long, default_value = DEFAULT_PREFIX)]
    shard_prefix: String,

    /// The number of train shards.
    #[arg(long, default_value_t = TRAIN_SHARDS)]
    train_shards: usize,

    /// The number of dev shards.
    #[arg(long, default_value_t = DEV_SHARDS)]
    dev_shards: usize,

    /// Truncate to the shorter side when line counts differ, instead of failing.
    #[arg(long)]
    truncate_mismatched: bool,

    /// Seed for the train shard shuffle.
    #[arg(long, default_value = None)]
    seed: Option<u64>,

    #[clap(flatten)]
    logging: LogArgs,
}

impl MakeRecordsArgs {
    fn build_config(&self) -> Result<PrepareConfig, Box<dyn std::error::Error>> {
        if let Some(path) = &self.config {
            log::info!("loading config from {path}");
            return Ok(PrepareConfig::from_json_path(path)?);
        }

        let required = |value: &Option<String>, name: &str| {
            value
                .clone()
                .ok_or_else(|| format!("--{name} is required without --config"))
        };

        let policy = if self.truncate_mismatched {
            LineCountPolicy::Truncate
        } else {
            LineCountPolicy::Strict
        };

        Ok(PrepareConfig::new(
            required(&self.data_dir, "data-dir")?,
            &required(&self.train_prefix, "train-prefix")?,
            &required(&self.dev_prefix, "dev-prefix")?,
            &required(&self.src, "src")?,
            &required(&self.tgt, "tgt")?,
            &required(&self.vocab_prefix, "vocab-prefix")?,
        )
        .with_share_vocab(!self.separate_vocab)
        .with_shard_prefix(self.shard_prefix.as_str())
        .with_shards(self.train_shards, self.dev_shards)
        .with_writer(RecordWriterOptions::default().with_line_count_policy(policy))
        .with_shuffle_seed(self.seed))
    }

    /// Run the make-records command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(DEFAULT_VERBOSITY)?;

        let config = self.build_config()?;
        if let Some(path) = &self.save_config {
            config.save_json_path(path)?;
        }

        let report = prepare_dataset::<u32>(&config)?;

        log::info!(
            "train: {} shards, {}",
            report.train.paths.len(),
            match report.train.written {
                Some(n) => format!("{n} examples written"),
                None => "already present".to_string(),
            }
        );
        log::info!("shuffled {} train records", report.shuffled);
        Ok(())
    }
}
