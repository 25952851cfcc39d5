//! # Dataset Preparation
//!
//! The end-to-end record build:
//!
//! 1. create the data directory;
//! 2. check (and repair) the vocabularies;
//! 3. encode the train and dev corpora into shards;
//! 4. shuffle every train shard.
//!
//! ## Example
//!
//! ```rust,no_run
//! use bitext::pipeline::{PrepareConfig, prepare_dataset};
//!
//! fn example() -> bitext::errors::BTResult<()> {
//!     let config = PrepareConfig::new("data/", "raw/train", "raw/dev", "eu", "en", "raw/vocab.bpe");
//!     let report = prepare_dataset::<u32>(&config)?;
//!     println!("{:?}", report.train.written);
//!     Ok(())
//! }
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    config::{load_json_path, save_json_path},
    errors::BTResult,
    lines::corpus_path,
    sharding::{
        DEV_SHARDS,
        DEV_TAG,
        RecordWriterOptions,
        ShardSpec,
        ShardWriteReport,
        ShardedRecordWriter,
        TRAIN_SHARDS,
        TRAIN_TAG,
        shard_spec::DEFAULT_PREFIX,
        shuffle_shards,
    },
    types::TokenType,
    vocab::{
        VocabPair,
        io::{CheckedVocab, VocabCheckOptions, check_vocab},
    },
};

/// Configuration for [`prepare_dataset`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepareConfig {
    /// Where shards and repaired vocabularies are written.
    pub data_dir: PathBuf,

    /// Train corpora are ``{train_prefix}.{src}`` and ``{train_prefix}.{tgt}``.
    pub train_prefix: String,

    /// Dev corpora are ``{dev_prefix}.{src}`` and ``{dev_prefix}.{tgt}``.
    pub dev_prefix: String,

    /// The source language suffix.
    pub src: String,

    /// The target language suffix.
    pub tgt: String,

    /// The vocabulary file when shared; else ``{vocab_prefix}.{src|tgt}``.
    pub vocab_prefix: String,

    /// Use one vocabulary for both sides.
    pub share_vocab: bool,

    /// The dataset identifier in shard filenames.
    pub shard_prefix: String,

    /// The number of train shards.
    pub train_shards: usize,

    /// The number of dev shards.
    pub dev_shards: usize,

    /// Vocabulary check options.
    pub vocab_check: VocabCheckOptions,

    /// Shard writer options.
    pub writer: RecordWriterOptions,

    /// Seed for the train shard shuffle; `None` draws from the OS.
    pub shuffle_seed: Option<u64>,
}

impl PrepareConfig {
    /// Create a config with a shared vocabulary and default shard counts.
    pub fn new<D: Into<PathBuf>>(
        data_dir: D,
        train_prefix: &str,
        dev_prefix: &str,
        src: &str,
        tgt: &str,
        vocab_prefix: &str,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            train_prefix: train_prefix.to_string(),
            dev_prefix: dev_prefix.to_string(),
            src: src.to_string(),
            tgt: tgt.to_string(),
            vocab_prefix: vocab_prefix.to_string(),
            share_vocab: true,
            shard_prefix: DEFAULT_PREFIX.to_string(),
            train_shards: TRAIN_SHARDS,
            dev_shards: DEV_SHARDS,
            vocab_check: VocabCheckOptions::default(),
            writer: RecordWriterOptions::default(),
            shuffle_seed: None,
        }
    }

    /// Enable or disable the shared vocabulary.
    pub fn with_share_vocab(
        self,
        share_vocab: bool,
    ) -> Self {
        Self {
            share_vocab,
            ..self
        }
    }

    /// Set the train and dev shard counts.
    pub fn with_shards(
        self,
        train_shards: usize,
        dev_shards: usize,
    ) -> Self {
        Self {
            train_shards,
            dev_shards,
            ..self
        }
    }

    /// Set the shard filename prefix.
    pub fn with_shard_prefix<S: Into<String>>(
        self,
        shard_prefix: S,
    ) -> Self {
        Self {
            shard_prefix: shard_prefix.into(),
            ..self
        }
    }

    /// Set the shard writer options.
    pub fn with_writer(
        self,
        writer: RecordWriterOptions,
    ) -> Self {
        Self { writer, ..self }
    }

    /// Set the shuffle seed.
    pub fn with_shuffle_seed(
        self,
        shuffle_seed: Option<u64>,
    ) -> Self {
        Self {
            shuffle_seed,
            ..self
        }
    }

    /// The source and target vocabulary paths.
    pub fn vocab_paths(&self) -> (PathBuf, PathBuf) {
        if self.share_vocab {
            let path = PathBuf::from(&self.vocab_prefix);
            (path.clone(), path)
        } else {
            (
                corpus_path(&self.vocab_prefix, &self.src),
                corpus_path(&self.vocab_prefix, &self.tgt),
            )
        }
    }

    /// The train shard set.
    pub fn train_spec(&self) -> ShardSpec {
        ShardSpec::new(TRAIN_TAG, self.train_shards).with_prefix(self.shard_prefix.as_str())
    }

    /// The dev shard set.
    pub fn dev_spec(&self) -> ShardSpec {
        ShardSpec::new(DEV_TAG, self.dev_shards).with_prefix(self.shard_prefix.as_str())
    }

    /// Load a config from a JSON file.
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> BTResult<Self> {
        load_json_path(path)
    }

    /// Save the config to a JSON file.
    pub fn save_json_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> BTResult<()> {
        save_json_path(self, path)
    }
}

/// The outcome of [`prepare_dataset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareReport {
    /// The checked source vocabulary.
    pub source_vocab: CheckedVocab,

    /// The checked target vocabulary; the source one when shared.
    pub target_vocab: CheckedVocab,

    /// The train shard write.
    pub train: ShardWriteReport,

    /// The dev shard write.
    pub dev: ShardWriteReport,

    /// The number of train records shuffled.
    pub shuffled: usize,
}

/// Build the train and dev record shards described by `config`.
///
/// Re-running over a completed data directory rewrites nothing but
/// reshuffles the train shards.
pub fn prepare_dataset<T: TokenType>(config: &PrepareConfig) -> BTResult<PrepareReport> {
    fs::create_dir_all(&config.data_dir)?;

    let (source_vocab_path, target_vocab_path) = config.vocab_paths();
    let source_vocab = check_vocab(&source_vocab_path, &config.data_dir, &config.vocab_check)?;
    let target_vocab = if config.share_vocab {
        log::info!("using source vocab for target");
        source_vocab.clone()
    } else {
        check_vocab(&target_vocab_path, &config.data_dir, &config.vocab_check)?
    };

    log::info!("encoding files and saving data");
    let vocab: VocabPair<T> = VocabPair::from_files(
        &source_vocab.path,
        &target_vocab.path,
        config.share_vocab,
    )?;

    let train = ShardedRecordWriter::new(config.train_spec(), config.writer.clone()).write_files(
        &vocab,
        corpus_path(&config.train_prefix, &config.src),
        corpus_path(&config.train_prefix, &config.tgt),
        &config.data_dir,
    )?;
    let dev = ShardedRecordWriter::new(config.dev_spec(), config.writer.clone()).write_files(
        &vocab,
        corpus_path(&config.dev_prefix, &config.src),
        corpus_path(&config.dev_prefix, &config.tgt),
        &config.data_dir,
    )?;

    let shuffled = shuffle_shards(&train.paths, config.shuffle_seed)?;

    Ok(PrepareReport {
        source_vocab,
        target_vocab,
        train,
        dev,
        shuffled,
    })
}
