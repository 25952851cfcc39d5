//! # Bucketed Batch Assembly
//!
//! Turns a live stream of id pairs into padded [`PairBatch`]es:
//!
//! 1. drop pairs with an empty side, truncate, and frame the target;
//! 2. key each pair by its length bucket;
//! 3. collect per-bucket windows of `batch_size` pairs;
//! 4. pad each window into a batch.
//!
//! Buckets are windowed over the stream, not globally sorted. Partial
//! windows are flushed at end of stream, in ascending bucket order.

use std::collections::VecDeque;

use crate::{
    batching::{
        bucketing::BucketPolicy,
        group_by_window::WindowGrouper,
        options::DatasetOptions,
        padded_batch::PairBatch,
        transform::{FramedPair, frame_pair},
    },
    errors::BTResult,
    types::{SeqPair, TokenType},
    vocab::VocabPair,
};

/// Frames, buckets, and pads id pairs.
#[derive(Debug, Clone)]
pub struct BatchAssembler<T: TokenType> {
    batch_size: usize,
    policy: BucketPolicy,
    src_max_len: Option<usize>,
    tgt_max_len: Option<usize>,
    tgt_sos: T,
    src_eos: T,
    tgt_eos: T,
}

impl<T: TokenType> BatchAssembler<T> {
    /// Build an assembler.
    ///
    /// The marker ids are looked up through the vocabularies: `sos` in the
    /// target table, `eos` in each side's own table.
    pub fn new(
        vocab: &VocabPair<T>,
        options: &DatasetOptions,
    ) -> Self {
        let reserved = &options.reserved;
        Self {
            batch_size: options.batch_size,
            policy: BucketPolicy::new(options.num_buckets, options.src_max_len),
            src_max_len: options.src_max_len,
            tgt_max_len: options.tgt_max_len,
            tgt_sos: vocab.target().lookup(&reserved.sos),
            src_eos: vocab.source().lookup(&reserved.eos),
            tgt_eos: vocab.target().lookup(&reserved.eos),
        }
    }

    /// The batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// The bucket policy.
    pub fn policy(&self) -> &BucketPolicy {
        &self.policy
    }

    /// Frame one pair; `None` if either side is empty.
    pub fn frame(
        &self,
        pair: SeqPair<T>,
    ) -> Option<FramedPair<T>> {
        frame_pair(
            pair,
            self.src_max_len,
            self.tgt_max_len,
            self.tgt_sos,
            self.tgt_eos,
        )
    }

    /// The window key for a framed pair; always 0 when unbucketed.
    pub fn window_key(
        &self,
        pair: &FramedPair<T>,
    ) -> usize {
        if self.policy.is_bucketed() {
            self.policy.bucket_id(pair.source_len(), pair.target_len())
        } else {
            0
        }
    }

    /// Pad a window of framed pairs.
    pub fn batch(
        &self,
        pairs: &[FramedPair<T>],
    ) -> PairBatch<T> {
        PairBatch::from_pairs(pairs, self.src_eos, self.tgt_eos)
    }

    /// Assemble batches from a stream of id pairs.
    pub fn batches<I>(
        &self,
        pairs: I,
    ) -> BucketedBatches<T, I>
    where
        I: Iterator<Item = BTResult<SeqPair<T>>>,
    {
        BucketedBatches {
            assembler: self.clone(),
            pairs,
            grouper: WindowGrouper::new(self.batch_size),
            flushed: VecDeque::new(),
            done: false,
        }
    }
}

/// Iterator of padded batches; see [`BatchAssembler::batches`].
///
/// An error from the input stream is yielded once and ends the stream.
pub struct BucketedBatches<T: TokenType, I> {
    assembler: BatchAssembler<T>,
    pairs: I,
    grouper: WindowGrouper<usize, FramedPair<T>>,
    flushed: VecDeque<Vec<FramedPair<T>>>,
    done: bool,
}

impl<T, I> Iterator for BucketedBatches<T, I>
where
    T: TokenType,
    I: Iterator<Item = BTResult<SeqPair<T>>>,
{
    type Item = BTResult<PairBatch<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(window) = self.flushed.pop_front() {
                return Some(Ok(self.assembler.batch(&window)));
            }
            if self.done {
                return None;
            }

            match self.pairs.next() {
                Some(Ok(pair)) => {
                    let Some(framed) = self.assembler.frame(pair) else {
                        continue;
                    };
                    let key = self.assembler.window_key(&framed);
                    if let Some(window) = self.grouper.push(key, framed) {
                        return Some(Ok(self.assembler.batch(&window)));
                    }
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    self.flushed = self.grouper.finish().into();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{errors::BitextError, vocab::VocabTable};

    fn vocab() -> VocabPair<u32> {
        let table = VocabTable::from_tokens(["<unk>", "<s>", "</s>", "a", "b", "c", "d", "e"]).unwrap();
        VocabPair::shared(Arc::new(table))
    }

    fn ok_pairs(pairs: Vec<SeqPair<u32>>) -> impl Iterator<Item = BTResult<SeqPair<u32>>> {
        pairs.into_iter().map(Ok)
    }

    #[test]
    fn test_unbucketed_stream_order() {
        let options = DatasetOptions::new(2).with_num_buckets(1);
        let assembler = BatchAssembler::new(&vocab(), &options);

        let pairs = vec![
            (vec![3, 4, 5], vec![6, 7]),
            (vec![3], vec![6]),
            (vec![4, 4], vec![7, 7, 7]),
        ];
        let batches: Vec<_> = assembler
            .batches(ok_pairs(pairs))
            .collect::<BTResult<_>>()
            .unwrap();

        assert_eq!(batches.len(), 2);

        let first = &batches[0];
        assert_eq!(first.source.shape(), (2, 3));
        assert_eq!(first.source.row(1), Some(&[3, 2, 2][..]));
        assert_eq!(first.target_input.row(0), Some(&[1, 6, 7][..]));
        assert_eq!(first.target_output.row(1), Some(&[6, 2, 2][..]));
        assert_eq!(first.source_lengths, vec![3, 1]);
        assert_eq!(first.target_lengths, vec![3, 2]);

        assert_eq!(batches[1].len(), 1);
        assert_eq!(batches[1].target_input.row(0), Some(&[1, 7, 7, 7][..]));
    }

    #[test]
    fn test_buckets_group_by_length() {
        // Width 2; the key length is max(source, target + 1).
        let options = DatasetOptions::new(2)
            .with_num_buckets(2)
            .with_max_lens(Some(4), None);
        let assembler = BatchAssembler::new(&vocab(), &options);
        assert_eq!(assembler.policy().width(), 2);

        let pairs = vec![
            (vec![3], vec![6]),
            (vec![3, 3, 3, 3, 3], vec![6]),
            (vec![3], vec![]),
            (vec![4], vec![7]),
            (vec![5, 5, 5, 5], vec![6]),
            (vec![3], vec![6, 7, 6, 7]),
        ];
        let batches: Vec<_> = assembler
            .batches(ok_pairs(pairs))
            .collect::<BTResult<_>>()
            .unwrap();

        // Full windows first, in completion order; then the leftover.
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].source_lengths, vec![1, 1]);
        assert_eq!(batches[0].target_lengths, vec![2, 2]);
        assert_eq!(batches[1].source_lengths, vec![4, 4]);
        assert_eq!(batches[2].source_lengths, vec![1]);
        assert_eq!(batches[2].target_lengths, vec![5]);
    }

    #[test]
    fn test_empty_sides_never_batched() {
        let options = DatasetOptions::new(4);
        let assembler = BatchAssembler::new(&vocab(), &options);

        let pairs = vec![(vec![], vec![6]), (vec![3], vec![]), (vec![], vec![])];
        assert_eq!(assembler.batches(ok_pairs(pairs)).count(), 0);
    }

    #[test]
    fn test_error_ends_stream() {
        let options = DatasetOptions::new(1);
        let assembler = BatchAssembler::new(&vocab(), &options);

        let pairs: Vec<BTResult<SeqPair<u32>>> = vec![
            Ok((vec![3], vec![6])),
            Err(BitextError::LineCountMismatch {
                tag: "train".to_string(),
                consumed: 1,
            }),
            Ok((vec![4], vec![7])),
        ];
        let mut batches = assembler.batches(pairs.into_iter());

        assert!(batches.next().unwrap().is_ok());
        assert!(matches!(
            batches.next(),
            Some(Err(BitextError::LineCountMismatch { consumed: 1, .. }))
        ));
        assert!(batches.next().is_none());
    }
}
