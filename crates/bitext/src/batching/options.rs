//! # Dataset Options

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    config::{load_json_path, save_json_path},
    errors::{BTResult, BitextError},
    lines::LineCountPolicy,
    vocab::ReservedTokens,
};

/// The default number of length buckets.
pub const DEFAULT_NUM_BUCKETS: usize = 5;
/// The default map-stage worker count.
pub const DEFAULT_NUM_PARALLEL_CALLS: usize = 4;
/// The default shuffle buffer size, in batches.
pub const SHUFFLE_BUFFER_BATCHES: usize = 1000;
/// The default prefetch depth, in batches.
pub const DEFAULT_PREFETCH_SIZE: usize = 2;

/// Options for [`crate::batching::TrainDataset`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetOptions {
    /// Examples per batch.
    pub batch_size: usize,

    /// The number of length buckets; `<= 1` disables bucketing.
    pub num_buckets: usize,

    /// Truncate sources to this many tokens.
    pub src_max_len: Option<usize>,

    /// Truncate targets to this many tokens.
    pub tgt_max_len: Option<usize>,

    /// Shuffle seed; `None` draws one from the OS.
    pub random_seed: Option<u64>,

    /// Workers for the text-to-ids map stage.
    pub num_parallel_calls: usize,

    /// Shuffle buffer size; `None` is ``batch_size * 1000``.
    pub output_buffer_size: Option<usize>,

    /// Drop this many pairs (after worker sharding) before shuffling.
    pub skip_count: Option<usize>,

    /// The number of data-parallel workers splitting the corpus.
    pub num_shards: usize,

    /// This worker's index in ``0..num_shards``.
    pub shard_index: usize,

    /// Draw a fresh shuffle order each epoch.
    pub reshuffle_each_iteration: bool,

    /// Batches buffered ahead by [`crate::batching::Prefetch`].
    pub prefetch_size: usize,

    /// The reserved tokens; `sos`/`eos` frame targets and pad batches.
    pub reserved: ReservedTokens,

    /// Behavior when source and target line counts differ.
    pub line_count_policy: LineCountPolicy,
}

impl DatasetOptions {
    /// Create options for `batch_size` with defaults elsewhere.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            num_buckets: DEFAULT_NUM_BUCKETS,
            src_max_len: None,
            tgt_max_len: None,
            random_seed: None,
            num_parallel_calls: DEFAULT_NUM_PARALLEL_CALLS,
            output_buffer_size: None,
            skip_count: None,
            num_shards: 1,
            shard_index: 0,
            reshuffle_each_iteration: true,
            prefetch_size: DEFAULT_PREFETCH_SIZE,
            reserved: ReservedTokens::default(),
            line_count_policy: LineCountPolicy::default(),
        }
    }

    /// Set the bucket count.
    pub fn with_num_buckets(
        self,
        num_buckets: usize,
    ) -> Self {
        Self {
            num_buckets,
            ..self
        }
    }

    /// Set the source and target length caps.
    pub fn with_max_lens(
        self,
        src_max_len: Option<usize>,
        tgt_max_len: Option<usize>,
    ) -> Self {
        Self {
            src_max_len,
            tgt_max_len,
            ..self
        }
    }

    /// Set the shuffle seed.
    pub fn with_random_seed(
        self,
        random_seed: Option<u64>,
    ) -> Self {
        Self {
            random_seed,
            ..self
        }
    }

    /// Set the map-stage worker count.
    pub fn with_num_parallel_calls(
        self,
        num_parallel_calls: usize,
    ) -> Self {
        Self {
            num_parallel_calls,
            ..self
        }
    }

    /// Set the shuffle buffer size.
    pub fn with_output_buffer_size(
        self,
        output_buffer_size: Option<usize>,
    ) -> Self {
        Self {
            output_buffer_size,
            ..self
        }
    }

    /// Set the skip count.
    pub fn with_skip_count(
        self,
        skip_count: Option<usize>,
    ) -> Self {
        Self { skip_count, ..self }
    }

    /// Select this worker's slice of the corpus.
    pub fn with_worker_shard(
        self,
        num_shards: usize,
        shard_index: usize,
    ) -> Self {
        Self {
            num_shards,
            shard_index,
            ..self
        }
    }

    /// Enable or disable per-epoch reshuffling.
    pub fn with_reshuffle_each_iteration(
        self,
        reshuffle_each_iteration: bool,
    ) -> Self {
        Self {
            reshuffle_each_iteration,
            ..self
        }
    }

    /// Set the prefetch depth.
    pub fn with_prefetch_size(
        self,
        prefetch_size: usize,
    ) -> Self {
        Self {
            prefetch_size,
            ..self
        }
    }

    /// Set the reserved tokens.
    pub fn with_reserved(
        self,
        reserved: ReservedTokens,
    ) -> Self {
        Self { reserved, ..self }
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

    /// Derive evaluation options: inference length caps, no worker split.
    pub fn for_eval(
        self,
        src_max_len_infer: Option<usize>,
        tgt_max_len_infer: Option<usize>,
    ) -> Self {
        self.with_max_lens(src_max_len_infer, tgt_max_len_infer)
            .with_worker_shard(1, 0)
            .with_skip_count(None)
    }

    /// The effective shuffle buffer size.
    pub fn shuffle_buffer_size(&self) -> usize {
        self.output_buffer_size
            .unwrap_or(self.batch_size * SHUFFLE_BUFFER_BATCHES)
    }

    /// Check the options for consistency.
    pub fn validate(&self) -> BTResult<()> {
        let fail = |msg: String| Err(BitextError::InvalidOptions(msg));

        if self.batch_size == 0 {
            return fail("batch_size must be positive".to_string());
        }
        if self.num_shards == 0 {
            return fail("num_shards must be positive".to_string());
        }
        if self.shard_index >= self.num_shards {
            return fail(format!(
                "shard_index {} out of range for {} shards",
                self.shard_index, self.num_shards
            ));
        }
        if self.src_max_len == Some(0) || self.tgt_max_len == Some(0) {
            return fail("max lengths must be positive when set".to_string());
        }
        Ok(())
    }

    /// Load options from a JSON file.
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> BTResult<Self> {
        let options: Self = load_json_path(path)?;
        options.validate()?;
        Ok(options)
    }

    /// Save options to a JSON file.
    pub fn save_json_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> BTResult<()> {
        save_json_path(self, path)
    }
}

/// Options for [`crate::batching::InferBatches`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferOptions {
    /// Examples per batch.
    pub batch_size: usize,

    /// Truncate sources to this many tokens.
    pub src_max_len: Option<usize>,

    /// The reserved tokens; `eos` pads batches.
    pub reserved: ReservedTokens,
}

impl InferOptions {
    /// Create options for `batch_size`.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            src_max_len: None,
            reserved: ReservedTokens::default(),
        }
    }

    /// Set the source length cap.
    pub fn with_src_max_len(
        self,
        src_max_len: Option<usize>,
    ) -> Self {
        Self {
            src_max_len,
            ..self
        }
    }

    /// Check the options for consistency.
    pub fn validate(&self) -> BTResult<()> {
        if self.batch_size == 0 {
            return Err(BitextError::InvalidOptions(
                "batch_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = DatasetOptions::new(32);
        assert_eq!(options.shuffle_buffer_size(), 32_000);
        assert_eq!(options.num_parallel_calls, 4);
        assert!(options.reshuffle_each_iteration);
        assert!(options.validate().is_ok());

        let options = options.with_output_buffer_size(Some(7));
        assert_eq!(options.shuffle_buffer_size(), 7);

        let eval = options
            .with_worker_shard(4, 3)
            .with_skip_count(Some(10))
            .for_eval(Some(80), None);
        assert_eq!((eval.num_shards, eval.shard_index), (1, 0));
        assert_eq!(eval.skip_count, None);
        assert_eq!(eval.src_max_len, Some(80));
    }

    #[test]
    fn test_validate() {
        assert!(DatasetOptions::new(0).validate().is_err());
        assert!(
            DatasetOptions::new(8)
                .with_worker_shard(2, 2)
                .validate()
                .is_err()
        );
        assert!(
            DatasetOptions::new(8)
                .with_worker_shard(2, 1)
                .validate()
                .is_ok()
        );
        assert!(
            DatasetOptions::new(8)
                .with_max_lens(Some(0), None)
                .validate()
                .is_err()
        );
        assert!(InferOptions::new(0).validate().is_err());
    }

    #[test]
    fn test_json() {
        let dir = tempdir::TempDir::new("dataset_options").unwrap();
        let path = dir.path().join("options.json");

        let options = DatasetOptions::new(16)
            .with_max_lens(Some(50), Some(60))
            .with_random_seed(Some(42));
        options.save_json_path(&path).unwrap();

        assert_eq!(DatasetOptions::from_json_path(&path).unwrap(), options);
    }
}
