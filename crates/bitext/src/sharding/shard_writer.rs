//! # Sharded Record Writer
//!
//! Distributes encoded line pairs across `N` shard files in round-robin
//! order. Shards are written under an ``.incomplete`` name and renamed only
//! after every writer is closed; a run that dies part-way leaves no final
//! shard, so the next run starts over.
//!
//! A shard set has a single writer; nothing here locks against a
//! concurrent run on the same directory and tag.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    encoders::PairEncoder,
    errors::{BTResult, BitextError},
    lines::{LineCountPolicy, LinePairs},
    records::RecordFileWriter,
    sharding::shard_spec::{INCOMPLETE_SUFFIX, ShardSpec, all_exist, with_suffix},
    types::TokenType,
};

/// Log progress every this many records.
pub const PROGRESS_INTERVAL: usize = 100_000;

/// Options for [`ShardedRecordWriter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordWriterOptions {
    /// Append the end-of-sequence id to both sides.
    pub add_eos: bool,

    /// Behavior when source and target line counts differ.
    pub line_count_policy: LineCountPolicy,

    /// Log progress every this many records.
    pub progress_interval: usize,
}

impl Default for RecordWriterOptions {
    fn default() -> Self {
        Self {
            add_eos: true,
            line_count_policy: LineCountPolicy::Strict,
            progress_interval: PROGRESS_INTERVAL,
        }
    }
}

impl RecordWriterOptions {
    /// Set `add_eos`.
    pub fn with_add_eos(
        self,
        add_eos: bool,
    ) -> Self {
        Self { add_eos, ..self }
    }

    /// Set the line count policy.
    pub fn with_line_count_policy(
        self,
        line_count_policy: LineCountPolicy,
    ) -> Self {
        Self {
            line_count_policy,
            ..self
        }
    }
}

/// The outcome of a shard write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardWriteReport {
    /// The final shard paths, in shard order.
    pub paths: Vec<PathBuf>,

    /// The number of examples written; `None` if every shard already existed.
    pub written: Option<usize>,
}

/// Writes a stream of line pairs into a set of shard files.
#[derive(Debug, Clone)]
pub struct ShardedRecordWriter {
    /// The shard set.
    pub spec: ShardSpec,

    /// Writer options.
    pub options: RecordWriterOptions,
}

impl ShardedRecordWriter {
    /// Create a writer.
    pub fn new(
        spec: ShardSpec,
        options: RecordWriterOptions,
    ) -> Self {
        Self { spec, options }
    }

    fn check_spec(&self) -> BTResult<()> {
        if self.spec.num_shards == 0 {
            return Err(BitextError::InvalidOptions(format!(
                "{}: shard count must be positive",
                self.spec.tag
            )));
        }
        Ok(())
    }

    /// Encode `source_path`/`target_path` line pairs into shards under `dir`.
    ///
    /// ## Errors
    /// * [`BitextError::MissingFile`] if either corpus is absent.
    /// * [`BitextError::LineCountMismatch`] under [`LineCountPolicy::Strict`].
    pub fn write_files<T, E, P, Q, D>(
        &self,
        encoder: &E,
        source_path: P,
        target_path: Q,
        dir: D,
    ) -> BTResult<ShardWriteReport>
    where
        T: TokenType,
        E: PairEncoder<T>,
        P: AsRef<Path>,
        Q: AsRef<Path>,
        D: AsRef<Path>,
    {
        self.check_spec()?;
        let paths = self.spec.shard_paths(&dir);
        if all_exist(&paths) {
            log::info!("files with tag {} already exist", self.spec.tag);
            return Ok(ShardWriteReport {
                paths,
                written: None,
            });
        }
        let pairs = LinePairs::open(source_path, target_path)?;
        self.write_pairs(encoder, pairs, dir)
    }

    /// Encode a stream of line pairs into shards under `dir`.
    ///
    /// Does nothing if every shard file already exists.
    pub fn write_pairs<T, E, A, B, D>(
        &self,
        encoder: &E,
        pairs: LinePairs<A, B>,
        dir: D,
    ) -> BTResult<ShardWriteReport>
    where
        T: TokenType,
        E: PairEncoder<T>,
        A: Iterator<Item = BTResult<String>>,
        B: Iterator<Item = BTResult<String>>,
        D: AsRef<Path>,
    {
        self.check_spec()?;
        let tag = &self.spec.tag;

        let paths = self.spec.shard_paths(&dir);
        if all_exist(&paths) {
            log::info!("files with tag {tag} already exist");
            return Ok(ShardWriteReport {
                paths,
                written: None,
            });
        }

        log::info!("saving files with tag {tag}");

        let pairs = pairs.with_policy(self.options.line_count_policy, tag.as_str());

        let tmp_paths: Vec<PathBuf> = paths
            .iter()
            .map(|p| with_suffix(p, INCOMPLETE_SUFFIX))
            .collect();
        let mut writers = tmp_paths
            .iter()
            .map(RecordFileWriter::create)
            .collect::<BTResult<Vec<_>>>()?;

        let interval = self.options.progress_interval.max(1);
        let mut counter = 0;
        for pair in pairs {
            let (source, target) = pair?;
            if counter > 0 && counter % interval == 0 {
                log::info!("\tsaving case {counter}");
            }
            let example = encoder.encode_pair(&source, &target, self.options.add_eos);
            let shard = counter % writers.len();
            writers[shard].write_example(&example)?;
            counter += 1;
        }

        for writer in writers {
            let file = writer
                .finish()?
                .into_inner()
                .map_err(|e| e.into_error())?;
            file.sync_all()?;
        }

        for (tmp, path) in tmp_paths.iter().zip(&paths) {
            log::debug!("{} -> {}", tmp.display(), path.display());
            fs::rename(tmp, path)?;
        }

        log::info!("saved {counter} examples");

        Ok(ShardWriteReport {
            paths,
            written: Some(counter),
        })
    }
}
