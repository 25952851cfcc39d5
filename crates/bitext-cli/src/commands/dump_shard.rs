use std::io::Write;

use bitext::records::{EncodedExample, RecordFileReader};

use crate::{
    input_output::OutputArgs,
    logging::LogArgs,
};

/// Args for the dump-shard command.
#[derive(clap::Args, Debug)]
pub struct DumpShardArgs {
    /// The shard file.
    file: String,

    /// Stop after this many records.
    #[arg(long, default_value = None)]
    limit: Option<usize>,

    #[command(flatten)]
    output: OutputArgs,

    #[clap(flatten)]
    logging: LogArgs,
}

impl DumpShardArgs {
    /// Run the dump-shard command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        // Warnings only; stdout may be the data stream.
        self.logging.setup_logging(2)?;

        let mut writer = self.output.open_writer()?;
        let examples = RecordFileReader::open(&self.file)?.examples::<u32>();

        let mut count = 0;
        for example in examples.take(self.limit.unwrap_or(usize::MAX)) {
            let example: EncodedExample<u32> = example?;
            serde_json::to_writer(&mut writer, &example.to_features()?)?;
            writeln!(writer)?;
            count += 1;
        }
        writer.flush()?;

        log::info!("dumped {count} records from {}", self.file);
        Ok(())
    }
}
