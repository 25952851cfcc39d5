mod batch_stats;
mod check_vocab;
mod dump_shard;
mod make_records;
mod shuffle;

/// Subcommands for bitext
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Validate a vocabulary file, repairing its reserved tokens.
    CheckVocab(check_vocab::CheckVocabArgs),

    /// Encode train and dev corpora into shuffled record shards.
    MakeRecords(make_records::MakeRecordsArgs),

    /// Shuffle the records of shard files in place.
    Shuffle(shuffle::ShuffleArgs),

    /// Print a shard's records as JSON lines.
    DumpShard(dump_shard::DumpShardArgs),

    /// Stream bucketed batches and report batch statistics.
    BatchStats(batch_stats::BatchStatsArgs),
}

impl Commands {
    /// Run the subcommand.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Commands::CheckVocab(cmd) => cmd.run(),
            Commands::MakeRecords(cmd) => cmd.run(),
            Commands::Shuffle(cmd) => cmd.run(),
            Commands::DumpShard(cmd) => cmd.run(),
            Commands::BatchStats(cmd) => cmd.run(),
        }
    }
}
