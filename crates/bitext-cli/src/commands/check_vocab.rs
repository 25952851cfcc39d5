use std::fs;

use bitext::vocab::{
    ReservedTokens,
    io::{VocabCheckOptions, check_vocab},
};

use crate::logging::{DEFAULT_VERBOSITY, LogArgs};

/// Args for the check-vocab command.
#[derive(clap::Args, Debug)]
pub struct CheckVocabArgs {
    /// The vocabulary file.
    vocab_file: String,

    /// Where a repaired copy is written.
    #[arg(long)]
    out_dir: String,

    /// Skip the reserved-token check.
    #[arg(long)]
    no_check_special_token: bool,

    /// The unknown-token string.
    #[arg(long, default_value = "<unk>")]
    unk: String,

    /// The start-of-sequence string.
    #[arg(long, default_value = "<s>")]
    sos: String,

    /// The end-of-sequence string.
    #[arg(long, default_value = "</s>")]
    eos: String,

    #[clap(flatten)]
    logging: LogArgs,
}

impl CheckVocabArgs {
    /// Run the check-vocab command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(DEFAULT_VERBOSITY)?;

        let reserved = ReservedTokens::default()
            .with_unk(self.unk.as_str())
            .with_sos(self.sos.as_str())
            .with_eos(self.eos.as_str());
        let options = VocabCheckOptions::default()
            .with_check_special_token(!self.no_check_special_token)
            .with_reserved(reserved);

        fs::create_dir_all(&self.out_dir)?;
        let checked = check_vocab(&self.vocab_file, &self.out_dir, &options)?;

        println!("{}\t{}", checked.size, checked.path.display());
        Ok(())
    }
}
