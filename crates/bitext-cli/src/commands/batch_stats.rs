use bitext::{
    batching::{DatasetOptions, TrainDataset},
    vocab::VocabPair,
};

use crate::logging::{DEFAULT_VERBOSITY, LogArgs};

/// Args for the batch-stats command.
#[derive(clap::Args, Debug)]
pub struct BatchStatsArgs {
    /// Corpus prefix; files are ``{prefix}.{src}`` and ``{prefix}.{tgt}``.
    #[arg(long)]
    prefix: String,

    /// Source language suffix.
    #[arg(long)]
    src: String,

    /// Target language suffix.
    #[arg(long)]
    tgt: String,

    /// Source vocabulary file.
    #[arg(long)]
    src_vocab: String,

    /// Target vocabulary file; the source vocabulary is shared if omitted.
    #[arg(long, default_value = None)]
    tgt_vocab: Option<String>,

    /// Load dataset options from a JSON file; overrides the flags below.
    #[arg(long, default_value = None)]
    options: Option<String>,

    /// Examples per batch.
    #[arg(long, default_value_t = 128)]
    batch_size: usize,

    /// The number of length buckets.
    #[arg(long, default_value_t = 5)]
    num_buckets: usize,

    /// Truncate sources to this many tokens.
    #[arg(long, default_value = None)]
    src_max_len: Option<usize>,

    /// Truncate targets to this many tokens.
    #[arg(long, default_value = None)]
    tgt_max_len: Option<usize>,

    /// Shuffle seed.
    #[arg(long, default_value = None)]
    seed: Option<u64>,

    /// Map-stage workers.
    #[arg(long, default_value_t = 4)]
    num_parallel_calls: usize,

    /// The number of epochs to stream.
    #[arg(long, default_value_t = 1)]
    epochs: usize,

    #[clap(flatten)]
    logging: LogArgs,
}

impl BatchStatsArgs {
    fn dataset_options(&self) -> Result<DatasetOptions, Box<dyn std::error::Error>> {
        if let Some(path) = &self.options {
            return Ok(DatasetOptions::from_json_path(path)?);
        }
        Ok(DatasetOptions::new(self.batch_size)
            .with_num_buckets(self.num_buckets)
            .with_max_lens(self.src_max_len, self.tgt_max_len)
            .with_random_seed(self.seed)
            .with_num_parallel_calls(self.num_parallel_calls))
    }

    /// Run the batch-stats command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(DEFAULT_VERBOSITY)?;

        let share_vocab = self.tgt_vocab.is_none();
        let tgt_vocab = self.tgt_vocab.as_deref().unwrap_or(&self.src_vocab);
        let vocab: VocabPair<u32> = VocabPair::from_files(&self.src_vocab, tgt_vocab, share_vocab)?;

        let options = self.dataset_options()?;
        let dataset = TrainDataset::open(&self.prefix, &self.src, &self.tgt, vocab, options)?;

        for epoch in 0..self.epochs {
            let mut batches = 0;
            let mut examples = 0;
            let mut real = 0;
            let mut padded = 0;
            for batch in dataset.epoch_prefetched(epoch)? {
                let batch = batch?;
                batches += 1;
                examples += batch.len();
                real += batch.real_tokens();
                padded += batch.padded_tokens();
            }

            let efficiency = if padded == 0 {
                1.0
            } else {
                real as f64 / padded as f64
            };
            log::info!(
                "epoch {epoch}: {batches} batches, {examples} examples, padding efficiency {efficiency:.3}"
            );
        }
        Ok(())
    }
}
