//! # Padded Batches

use crate::{batching::transform::FramedPair, types::TokenType};

/// A dense row-major ``(rows, cols)`` matrix of right-padded sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedMatrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Copy> PaddedMatrix<T> {
    /// Pad `seqs` on the right with `pad` to the longest sequence.
    pub fn from_rows<S: AsRef<[T]>>(
        seqs: &[S],
        pad: T,
    ) -> Self {
        let rows = seqs.len();
        let cols = seqs.iter().map(|s| s.as_ref().len()).max().unwrap_or(0);

        let mut data = Vec::with_capacity(rows * cols);
        for seq in seqs {
            let seq = seq.as_ref();
            data.extend_from_slice(seq);
            data.extend(std::iter::repeat_n(pad, cols - seq.len()));
        }

        Self { rows, cols, data }
    }

    /// ``(rows, cols)``.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// The number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// The padded row length.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Row `index`, including padding.
    pub fn row(
        &self,
        index: usize,
    ) -> Option<&[T]> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.cols;
        Some(&self.data[start..start + self.cols])
    }

    /// The row-major backing data.
    pub fn data(&self) -> &[T] {
        &self.data
    }
}

/// A padded training batch.
///
/// Every field has one row per example; lengths are the unpadded sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairBatch<T> {
    /// Sources, padded with the source end-marker.
    pub source: PaddedMatrix<T>,

    /// Target inputs, padded with the target end-marker.
    pub target_input: PaddedMatrix<T>,

    /// Target outputs, padded with the target end-marker.
    pub target_output: PaddedMatrix<T>,

    /// Unpadded source lengths.
    pub source_lengths: Vec<usize>,

    /// Unpadded target lengths.
    pub target_lengths: Vec<usize>,
}

impl<T: TokenType> PairBatch<T> {
    /// Assemble a batch from framed pairs.
    ///
    /// ## Arguments
    /// * `pairs` - the batch members.
    /// * `src_pad` - the source end-marker id.
    /// * `tgt_pad` - the target end-marker id.
    pub fn from_pairs(
        pairs: &[FramedPair<T>],
        src_pad: T,
        tgt_pad: T,
    ) -> Self {
        let sources: Vec<&[T]> = pairs.iter().map(|p| p.source.as_slice()).collect();
        let inputs: Vec<&[T]> = pairs.iter().map(|p| p.target_input.as_slice()).collect();
        let outputs: Vec<&[T]> = pairs.iter().map(|p| p.target_output.as_slice()).collect();

        Self {
            source: PaddedMatrix::from_rows(&sources, src_pad),
            target_input: PaddedMatrix::from_rows(&inputs, tgt_pad),
            target_output: PaddedMatrix::from_rows(&outputs, tgt_pad),
            source_lengths: pairs.iter().map(FramedPair::source_len).collect(),
            target_lengths: pairs.iter().map(FramedPair::target_len).collect(),
        }
    }

    /// The number of examples.
    pub fn len(&self) -> usize {
        self.source_lengths.len()
    }

    /// Is the batch empty?
    pub fn is_empty(&self) -> bool {
        self.source_lengths.is_empty()
    }

    /// The number of unpadded source and target-input tokens.
    pub fn real_tokens(&self) -> usize {
        self.source_lengths.iter().sum::<usize>() + self.target_lengths.iter().sum::<usize>()
    }

    /// The number of source and target-input cells, padding included.
    pub fn padded_tokens(&self) -> usize {
        self.source.data().len() + self.target_input.data().len()
    }

    /// The fraction of cells holding real tokens.
    pub fn efficiency(&self) -> f64 {
        match self.padded_tokens() {
            0 => 1.0,
            padded => self.real_tokens() as f64 / padded as f64,
        }
    }
}

/// A padded source-only batch, for inference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBatch<T> {
    /// Sources, padded with the source end-marker.
    pub source: PaddedMatrix<T>,

    /// Unpadded source lengths.
    pub source_lengths: Vec<usize>,
}

impl<T: TokenType> SourceBatch<T> {
    /// Assemble a batch from source sequences.
    pub fn from_sources(
        sources: &[Vec<T>],
        src_pad: T,
    ) -> Self {
        Self {
            source: PaddedMatrix::from_rows(sources, src_pad),
            source_lengths: sources.iter().map(Vec::len).collect(),
        }
    }

    /// The number of examples.
    pub fn len(&self) -> usize {
        self.source_lengths.len()
    }

    /// Is the batch empty?
    pub fn is_empty(&self) -> bool {
        self.source_lengths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_matrix() {
        let m = PaddedMatrix::from_rows(&[vec![1u32, 2, 3], vec![4], vec![]], 9);

        assert_eq!(m.shape(), (3, 3));
        assert_eq!(m.row(0), Some(&[1, 2, 3][..]));
        assert_eq!(m.row(1), Some(&[4, 9, 9][..]));
        assert_eq!(m.row(2), Some(&[9, 9, 9][..]));
        assert_eq!(m.row(3), None);

        let empty = PaddedMatrix::<u32>::from_rows::<Vec<u32>>(&[], 0);
        assert_eq!(empty.shape(), (0, 0));
    }

    #[test]
    fn test_pair_batch() {
        let pairs = vec![
            FramedPair {
                source: vec![3u32, 4, 5],
                target_input: vec![1, 6],
                target_output: vec![6, 2],
            },
            FramedPair {
                source: vec![7],
                target_input: vec![1, 8, 9],
                target_output: vec![8, 9, 2],
            },
        ];
        let batch = PairBatch::from_pairs(&pairs, 2, 2);

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.source.row(1), Some(&[7, 2, 2][..]));
        assert_eq!(batch.target_input.row(0), Some(&[1, 6, 2][..]));
        assert_eq!(batch.target_output.row(0), Some(&[6, 2, 2][..]));
        assert_eq!(batch.source_lengths, vec![3, 1]);
        assert_eq!(batch.target_lengths, vec![2, 3]);

        assert_eq!(batch.real_tokens(), 9);
        assert_eq!(batch.padded_tokens(), 12);
        assert!((batch.efficiency() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_source_batch() {
        let batch = SourceBatch::from_sources(&[vec![5u32], vec![6, 7]], 2);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.source.row(0), Some(&[5, 2][..]));
        assert_eq!(batch.source_lengths, vec![1, 2]);
    }
}
