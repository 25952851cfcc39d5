//! # Streaming Training Dataset
//!
//! Each epoch re-opens the line-aligned corpora and streams them through:
//!
//! ```text
//! LinePairs -> worker shard -> skip -> ShuffleBuffer
//!     -> ParallelMap(split + lookup) -> BucketedBatches
//! ```
//!
//! Nothing is written to disk.
//!
//! ## Example
//!
//! ```rust,no_run
//! use bitext::{
//!     batching::{DatasetOptions, TrainDataset},
//!     vocab::VocabPair,
//! };
//!
//! fn example() -> bitext::errors::BTResult<()> {
//!     let vocab = VocabPair::<u32>::from_files("vocab.en", "vocab.en", true)?;
//!     let options = DatasetOptions::new(64).with_random_seed(Some(42));
//!     let dataset = TrainDataset::open("data/train", "eu", "en", vocab, options)?;
//!
//!     for batch in dataset.epoch_prefetched(0)? {
//!         let batch = batch?;
//!         println!("{:?}", batch.source.shape());
//!     }
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    batching::{
        assembler::BatchAssembler,
        options::DatasetOptions,
        padded_batch::PairBatch,
        parallel_map::ParallelMap,
        prefetch::Prefetch,
        shuffle_buffer::ShuffleBuffer,
    },
    errors::{BTResult, require_file},
    lines::{LinePairs, corpus_path},
    types::{SeqPair, TokenType},
    vocab::{VocabPair, VocabTable},
};

/// One epoch of padded training batches.
pub type EpochBatches<T> = Box<dyn Iterator<Item = BTResult<PairBatch<T>>> + Send>;

const EPOCH_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Split `line` on whitespace and look each word up in `table`.
///
/// Blank lines produce an empty sequence.
pub fn lookup_words<T: TokenType>(
    table: &VocabTable<T>,
    line: &str,
) -> Vec<T> {
    line.split_whitespace().map(|w| table.lookup(w)).collect()
}

/// Look up a `(source, target)` line pair.
pub fn lookup_pair<T: TokenType>(
    vocab: &VocabPair<T>,
    source: &str,
    target: &str,
) -> SeqPair<T> {
    (
        lookup_words(vocab.source(), source),
        lookup_words(vocab.target(), target),
    )
}

/// Keep every `num_shards`-th item starting at `shard_index`.
///
/// Errors are always kept.
pub fn worker_shard<I, V>(
    iter: I,
    num_shards: usize,
    shard_index: usize,
) -> impl Iterator<Item = BTResult<V>>
where
    I: Iterator<Item = BTResult<V>>,
{
    let num_shards = num_shards.max(1);
    iter.enumerate().filter_map(move |(i, item)| match item {
        Ok(_) if i % num_shards != shard_index => None,
        item => Some(item),
    })
}

/// Drop the first `count` successful items.
///
/// Errors are always kept.
pub fn skip_ok<I, V>(
    iter: I,
    count: usize,
) -> impl Iterator<Item = BTResult<V>>
where
    I: Iterator<Item = BTResult<V>>,
{
    let mut remaining = count;
    iter.filter(move |item| {
        if item.is_ok() && remaining > 0 {
            remaining -= 1;
            false
        } else {
            true
        }
    })
}

/// A restartable, bucketed training (or evaluation) input stream.
///
/// For evaluation, build with [`DatasetOptions::for_eval`].
#[derive(Debug, Clone)]
pub struct TrainDataset<T: TokenType> {
    source_path: PathBuf,
    target_path: PathBuf,
    vocab: VocabPair<T>,
    options: DatasetOptions,
    seed: u64,
}

impl<T: TokenType> TrainDataset<T> {
    /// Open ``{prefix}.{src}`` and ``{prefix}.{tgt}``.
    ///
    /// ## Arguments
    /// * `prefix` - the corpus path prefix.
    /// * `src` - the source language suffix.
    /// * `tgt` - the target language suffix.
    /// * `vocab` - the source and target vocabularies.
    /// * `options` - dataset options.
    ///
    /// ## Errors
    /// * [`crate::errors::BitextError::InvalidOptions`] if `options` fail validation.
    /// * [`crate::errors::BitextError::MissingFile`] if either corpus is absent.
    pub fn open(
        prefix: &str,
        src: &str,
        tgt: &str,
        vocab: VocabPair<T>,
        options: DatasetOptions,
    ) -> BTResult<Self> {
        Self::from_paths(
            corpus_path(prefix, src),
            corpus_path(prefix, tgt),
            vocab,
            options,
        )
    }

    /// Build from explicit corpus paths.
    pub fn from_paths<P, Q>(
        source_path: P,
        target_path: Q,
        vocab: VocabPair<T>,
        options: DatasetOptions,
    ) -> BTResult<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        options.validate()?;
        let source_path = source_path.as_ref().to_path_buf();
        let target_path = target_path.as_ref().to_path_buf();
        require_file(&source_path)?;
        require_file(&target_path)?;

        let seed = options
            .random_seed
            .unwrap_or_else(|| rand::rng().random());

        Ok(Self {
            source_path,
            target_path,
            vocab,
            options,
            seed,
        })
    }

    /// The options.
    pub fn options(&self) -> &DatasetOptions {
        &self.options
    }

    /// The vocabularies.
    pub fn vocab(&self) -> &VocabPair<T> {
        &self.vocab
    }

    /// The shuffle seed used for `epoch`.
    ///
    /// Every epoch shares one seed unless reshuffling is enabled.
    pub fn epoch_seed(
        &self,
        epoch: usize,
    ) -> u64 {
        if self.options.reshuffle_each_iteration {
            self.seed
                .wrapping_add((epoch as u64).wrapping_mul(EPOCH_SEED_STRIDE))
        } else {
            self.seed
        }
    }

    /// Stream one epoch of batches, re-opening the corpora.
    ///
    /// ## Errors
    /// Opening the corpora or building the map workers can fail here;
    /// read errors and line count mismatches arrive in the stream.
    pub fn epoch(
        &self,
        epoch: usize,
    ) -> BTResult<EpochBatches<T>> {
        let options = &self.options;
        log::debug!(
            "epoch {epoch}: {} / {}",
            self.source_path.display(),
            self.target_path.display()
        );

        let label = self.source_path.display().to_string();
        let pairs = LinePairs::open(&self.source_path, &self.target_path)?
            .with_policy(options.line_count_policy, label);
        let pairs = worker_shard(pairs, options.num_shards, options.shard_index);
        let pairs = skip_ok(pairs, options.skip_count.unwrap_or(0));

        let rng = StdRng::seed_from_u64(self.epoch_seed(epoch));
        let pairs = ShuffleBuffer::new(pairs, options.shuffle_buffer_size(), rng);

        let vocab = self.vocab.clone();
        let ids = ParallelMap::new(
            pairs,
            move |(source, target): (String, String)| lookup_pair(&vocab, &source, &target),
            options.num_parallel_calls,
        )?;

        let batches = BatchAssembler::new(&self.vocab, options).batches(ids);
        Ok(Box::new(batches))
    }

    /// [`TrainDataset::epoch`], produced on a background thread.
    pub fn epoch_prefetched(
        &self,
        epoch: usize,
    ) -> BTResult<Prefetch<BTResult<PairBatch<T>>>> {
        Ok(Prefetch::spawn(self.epoch(epoch)?, self.options.prefetch_size))
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, sync::Arc};

    use tempdir::TempDir;

    use super::*;
    use crate::{errors::BitextError, lines::LineCountPolicy};

    fn vocab() -> VocabPair<u32> {
        let table = VocabTable::from_tokens(["<unk>", "<s>", "</s>", "a", "b", "c", "d", "e"]).unwrap();
        VocabPair::shared(Arc::new(table))
    }

    fn write_corpus(
        dir: &Path,
        source: &[&str],
        target: &[&str],
    ) -> String {
        let prefix = dir.join("train").display().to_string();
        fs::write(format!("{prefix}.src"), source.join("\n")).unwrap();
        fs::write(format!("{prefix}.tgt"), target.join("\n")).unwrap();
        prefix
    }

    fn collect(batches: EpochBatches<u32>) -> Vec<PairBatch<u32>> {
        batches.collect::<BTResult<_>>().unwrap()
    }

    fn all_sources(batches: &[PairBatch<u32>]) -> Vec<Vec<u32>> {
        let mut rows = Vec::new();
        for batch in batches {
            for (i, &len) in batch.source_lengths.iter().enumerate() {
                rows.push(batch.source.row(i).unwrap()[..len].to_vec());
            }
        }
        rows.sort();
        rows
    }

    #[test]
    fn test_lookup_words() {
        let vocab = vocab();
        assert_eq!(lookup_words(vocab.source(), "  a  b zz "), vec![3, 4, 0]);
        assert!(lookup_words(vocab.source(), "   ").is_empty());
        assert_eq!(lookup_pair(&vocab, "a b c", "d e"), (vec![3, 4, 5], vec![6, 7]));
    }

    #[test]
    fn test_worker_shard_and_skip() {
        let items = (0..10).map(Ok::<_, BitextError>);
        let kept: Vec<i32> = worker_shard(items, 3, 1).map(Result::unwrap).collect();
        assert_eq!(kept, vec![1, 4, 7]);

        let items = (0..5).map(Ok::<_, BitextError>);
        let kept: Vec<i32> = skip_ok(items, 2).map(Result::unwrap).collect();
        assert_eq!(kept, vec![2, 3, 4]);
    }

    #[test]
    fn test_epoch() {
        let dir = TempDir::new("dataset").unwrap();
        let prefix = write_corpus(
            dir.path(),
            &["a b c", "", "a", "b b", "c"],
            &["d e", "d", "", "e", "d d d"],
        );

        let options = DatasetOptions::new(2).with_random_seed(Some(1));
        let dataset = TrainDataset::open(&prefix, "src", "tgt", vocab(), options).unwrap();
        let batches = collect(dataset.epoch(0).unwrap());

        // Pairs with an empty side are dropped.
        assert_eq!(batches.iter().map(PairBatch::len).sum::<usize>(), 3);
        assert_eq!(all_sources(&batches), vec![vec![3, 4, 5], vec![4, 4], vec![5]]);
        for batch in &batches {
            assert!(batch.len() <= 2);
            for i in 0..batch.len() {
                assert_eq!(batch.target_input.row(i).unwrap()[0], 1);
            }
        }
    }

    #[test]
    fn test_epoch_seeds() {
        let dir = TempDir::new("dataset").unwrap();
        let source: Vec<String> = (0..200).map(|i| ["a", "b", "c"][i % 3].to_string()).collect();
        let source: Vec<&str> = source.iter().map(String::as_str).collect();
        let prefix = write_corpus(dir.path(), &source, &source);

        let options = DatasetOptions::new(4)
            .with_num_buckets(1)
            .with_random_seed(Some(5));
        let dataset = TrainDataset::open(&prefix, "src", "tgt", vocab(), options.clone()).unwrap();

        assert_ne!(dataset.epoch_seed(0), dataset.epoch_seed(1));
        let first = collect(dataset.epoch(0).unwrap());
        assert_eq!(first, collect(dataset.epoch(0).unwrap()));

        let fixed = TrainDataset::open(
            &prefix,
            "src",
            "tgt",
            vocab(),
            options.with_reshuffle_each_iteration(false),
        )
        .unwrap();
        assert_eq!(fixed.epoch_seed(0), fixed.epoch_seed(3));
        assert_eq!(
            collect(fixed.epoch(0).unwrap()),
            collect(fixed.epoch(3).unwrap())
        );
    }

    #[test]
    fn test_worker_split_partitions() {
        let dir = TempDir::new("dataset").unwrap();
        let source = ["a", "b", "c", "a b", "b c", "c a", "a a a"];
        let prefix = write_corpus(dir.path(), &source, &source);

        let mut rows = Vec::new();
        for shard_index in 0..2 {
            let options = DatasetOptions::new(3)
                .with_worker_shard(2, shard_index)
                .with_random_seed(Some(0));
            let dataset = TrainDataset::open(&prefix, "src", "tgt", vocab(), options).unwrap();
            rows.extend(all_sources(&collect(dataset.epoch(0).unwrap())));
        }
        rows.sort();

        let all = DatasetOptions::new(3).with_random_seed(Some(0));
        let dataset = TrainDataset::open(&prefix, "src", "tgt", vocab(), all).unwrap();
        assert_eq!(rows, all_sources(&collect(dataset.epoch(0).unwrap())));
    }

    #[test]
    fn test_line_count_mismatch() {
        let dir = TempDir::new("dataset").unwrap();
        let prefix = write_corpus(dir.path(), &["a", "b", "c"], &["d", "e"]);

        let options = DatasetOptions::new(8);
        let dataset =
            TrainDataset::open(&prefix, "src", "tgt", vocab(), options.clone()).unwrap();
        let results: Vec<_> = dataset.epoch(0).unwrap().collect();
        assert!(
            results
                .iter()
                .any(|r| matches!(r, Err(BitextError::LineCountMismatch { consumed: 2, .. })))
        );

        let options = options.with_line_count_policy(LineCountPolicy::Truncate);
        let dataset = TrainDataset::open(&prefix, "src", "tgt", vocab(), options).unwrap();
        let batches: Vec<PairBatch<u32>> = dataset
            .epoch_prefetched(0)
            .unwrap()
            .collect::<BTResult<_>>()
            .unwrap();
        assert_eq!(batches.iter().map(PairBatch::len).sum::<usize>(), 2);
    }

    #[test]
    fn test_missing_corpus() {
        let dir = TempDir::new("dataset").unwrap();
        let prefix = dir.path().join("nope").display().to_string();
        let err = TrainDataset::open(&prefix, "src", "tgt", vocab(), DatasetOptions::new(2))
            .unwrap_err();
        assert!(matches!(err, BitextError::MissingFile { .. }));

        let err = TrainDataset::open(&prefix, "src", "tgt", vocab(), DatasetOptions::new(0))
            .unwrap_err();
        assert!(matches!(err, BitextError::InvalidOptions(_)));
    }
}
