//! # Line and Line-Pair Encoders

use crate::{
    records::EncodedExample,
    types::TokenType,
    vocab::{VocabPair, VocabTable},
};

/// Encodes one line of text into ids.
pub trait LineEncoder<T: TokenType>: Send + Sync {
    /// Encode `line`, optionally appending the end-of-sequence id.
    fn encode_line(
        &self,
        line: &str,
        add_eos: bool,
    ) -> Vec<T>;
}

/// Encodes a `(source, target)` line pair into an [`EncodedExample`].
pub trait PairEncoder<T: TokenType>: Send + Sync {
    /// Encode a source line.
    fn encode_source(
        &self,
        line: &str,
        add_eos: bool,
    ) -> Vec<T>;

    /// Encode a target line.
    fn encode_target(
        &self,
        line: &str,
        add_eos: bool,
    ) -> Vec<T>;

    /// Encode a line pair.
    fn encode_pair(
        &self,
        source: &str,
        target: &str,
        add_eos: bool,
    ) -> EncodedExample<T> {
        EncodedExample::new(
            self.encode_source(source, add_eos),
            self.encode_target(target, add_eos),
        )
    }
}

impl<T: TokenType> LineEncoder<T> for VocabTable<T> {
    fn encode_line(
        &self,
        line: &str,
        add_eos: bool,
    ) -> Vec<T> {
        VocabTable::encode_line(self, line, add_eos)
    }
}

impl<T: TokenType> PairEncoder<T> for VocabPair<T> {
    fn encode_source(
        &self,
        line: &str,
        add_eos: bool,
    ) -> Vec<T> {
        VocabPair::encode_source(self, line, add_eos)
    }

    fn encode_target(
        &self,
        line: &str,
        add_eos: bool,
    ) -> Vec<T> {
        VocabPair::encode_target(self, line, add_eos)
    }
}

/// A [`PairEncoder`] that uses one [`LineEncoder`] for both sides.
#[derive(Debug, Clone)]
pub struct SharedPairEncoder<E> {
    /// Inner line encoder.
    pub inner: E,
}

impl<E> SharedPairEncoder<E> {
    /// Wrap a line encoder.
    pub fn new(inner: E) -> Self {
        Self { inner }
    }
}

impl<T, E> PairEncoder<T> for SharedPairEncoder<E>
where
    T: TokenType,
    E: LineEncoder<T>,
{
    fn encode_source(
        &self,
        line: &str,
        add_eos: bool,
    ) -> Vec<T> {
        self.inner.encode_line(line, add_eos)
    }

    fn encode_target(
        &self,
        line: &str,
        add_eos: bool,
    ) -> Vec<T> {
        self.inner.encode_line(line, add_eos)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn scenario_vocab() -> VocabPair<u32> {
        VocabPair::shared(Arc::new(
            VocabTable::from_tokens(["<unk>", "<s>", "</s>", "a", "b", "c", "d", "e"]).unwrap(),
        ))
    }

    #[test]
    fn test_scenario_pair() {
        let vocab = scenario_vocab();

        let example = vocab.encode_pair("a b c", "d e", true);
        assert_eq!(example.inputs, vec![3, 4, 5, 2]);
        assert_eq!(example.targets, vec![6, 7, 2]);

        let example = vocab.encode_pair("a b c", "d e", false);
        assert_eq!(example.inputs, vec![3, 4, 5]);
        assert_eq!(example.targets, vec![6, 7]);
    }

    #[test]
    fn test_shared_pair_encoder() {
        let table: VocabTable<u32> =
            VocabTable::from_tokens(["<unk>", "<s>", "</s>", "a"]).unwrap();
        let encoder = SharedPairEncoder::new(table);

        let example: EncodedExample<u32> = encoder.encode_pair("a x", "x a", true);
        assert_eq!(example.inputs, vec![3, 0, 2]);
        assert_eq!(example.targets, vec![0, 3, 2]);
    }
}
