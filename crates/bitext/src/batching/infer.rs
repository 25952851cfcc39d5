//! # Inference Source Batching
//!
//! Source-only batches in input order: split, truncate, look up, pad.
//! Nothing is filtered; a blank line becomes a zero-length row.

use std::{path::Path, sync::Arc};

use crate::{
    batching::{
        dataset::lookup_words,
        options::InferOptions,
        padded_batch::SourceBatch,
        transform::truncate,
    },
    errors::BTResult,
    lines::TextLines,
    types::TokenType,
    vocab::{VocabPair, VocabTable},
};

/// Iterator of padded [`SourceBatch`]es over a line stream.
pub struct InferBatches<T: TokenType, I> {
    lines: I,
    table: Arc<VocabTable<T>>,
    batch_size: usize,
    src_max_len: Option<usize>,
    src_eos: T,
    done: bool,
}

impl<T: TokenType> InferBatches<T, TextLines> {
    /// Batch the lines of a source file.
    pub fn open<P: AsRef<Path>>(
        path: P,
        vocab: &VocabPair<T>,
        options: &InferOptions,
    ) -> BTResult<Self> {
        Self::new(TextLines::open(path)?, vocab, options)
    }
}

impl<T, I> InferBatches<T, I>
where
    T: TokenType,
    I: Iterator<Item = BTResult<String>>,
{
    /// Batch a line stream using the source vocabulary of `vocab`.
    pub fn new(
        lines: I,
        vocab: &VocabPair<T>,
        options: &InferOptions,
    ) -> BTResult<Self> {
        options.validate()?;
        let table = vocab.source().clone();
        let src_eos = table.lookup(&options.reserved.eos);
        Ok(Self {
            lines,
            table,
            batch_size: options.batch_size,
            src_max_len: options.src_max_len,
            src_eos,
            done: false,
        })
    }
}

impl<T, I> Iterator for InferBatches<T, I>
where
    T: TokenType,
    I: Iterator<Item = BTResult<String>>,
{
    type Item = BTResult<SourceBatch<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut sources = Vec::with_capacity(self.batch_size);
        while sources.len() < self.batch_size {
            match self.lines.next() {
                Some(Ok(line)) => {
                    let ids = lookup_words(&self.table, &line);
                    sources.push(truncate(ids, self.src_max_len));
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    break;
                }
            }
        }

        if sources.is_empty() {
            None
        } else {
            Some(Ok(SourceBatch::from_sources(&sources, self.src_eos)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> VocabPair<u32> {
        let table = VocabTable::from_tokens(["<unk>", "<s>", "</s>", "a", "b", "c"]).unwrap();
        VocabPair::shared(Arc::new(table))
    }

    fn lines(lines: &[&str]) -> std::vec::IntoIter<BTResult<String>> {
        lines
            .iter()
            .map(|l| Ok(l.to_string()))
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn test_batches() {
        let options = InferOptions::new(2).with_src_max_len(Some(2));
        let batches: Vec<_> = InferBatches::new(lines(&["a b c", "", "c x"]), &vocab(), &options)
            .unwrap()
            .collect::<BTResult<_>>()
            .unwrap();

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].source.shape(), (2, 2));
        assert_eq!(batches[0].source.row(0), Some(&[3, 4][..]));
        assert_eq!(batches[0].source.row(1), Some(&[2, 2][..]));
        assert_eq!(batches[0].source_lengths, vec![2, 0]);
        assert_eq!(batches[1].source.row(0), Some(&[5, 0][..]));
    }

    #[test]
    fn test_open_file() {
        let dir = tempdir::TempDir::new("infer").unwrap();
        let path = dir.path().join("test.eu");
        std::fs::write(&path, "a\nb\nc\n").unwrap();

        let batches = InferBatches::open(&path, &vocab(), &InferOptions::new(8)).unwrap();
        let sizes: Vec<usize> = batches.map(|b| b.unwrap().len()).collect();
        assert_eq!(sizes, vec![3]);
    }
}
