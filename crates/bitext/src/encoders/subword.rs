//! # Subword Vocabulary Collaborator
//!
//! Building a subword vocabulary (searching for a token set whose size is
//! within a tolerance of a target) is a pluggable capability. The pipeline
//! only needs the resulting tokenizer to implement [`LineEncoder`]; a single
//! subword tokenizer serves both sides through [`SharedPairEncoder`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    encoders::{LineEncoder, SharedPairEncoder},
    errors::{BTResult, require_file},
    types::TokenType,
};

/// Accept a searched vocabulary whose size is within this many tokens of the target.
pub const VOCAB_TOLERANCE: usize = 327;

/// The default minimum token count when the size search is disabled.
pub const TRAIN_DATA_MIN_COUNT: usize = 6;

/// Request for a subword vocabulary build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubwordVocabRequest {
    /// Where the built vocabulary is (or will be) saved.
    pub vocab_path: PathBuf,

    /// The training corpora.
    pub corpus_paths: Vec<PathBuf>,

    /// The target vocabulary size.
    pub target_size: usize,

    /// Accepted distance from `target_size`.
    pub tolerance: usize,

    /// Fixed minimum token count; `None` searches for the count that best hits `target_size`.
    pub min_count: Option<usize>,
}

impl SubwordVocabRequest {
    /// Create a request with the default tolerance and size search enabled.
    pub fn new<P: Into<PathBuf>>(
        vocab_path: P,
        corpus_paths: Vec<PathBuf>,
        target_size: usize,
    ) -> Self {
        Self {
            vocab_path: vocab_path.into(),
            corpus_paths,
            target_size,
            tolerance: VOCAB_TOLERANCE,
            min_count: None,
        }
    }

    /// Enable or disable the size search.
    ///
    /// With `search` off, the builder uses [`TRAIN_DATA_MIN_COUNT`].
    pub fn with_search(
        self,
        search: bool,
    ) -> Self {
        Self {
            min_count: if search {
                None
            } else {
                Some(TRAIN_DATA_MIN_COUNT)
            },
            ..self
        }
    }

    /// Set the tolerance.
    pub fn with_tolerance(
        self,
        tolerance: usize,
    ) -> Self {
        Self { tolerance, ..self }
    }

    /// Is `size` an acceptable vocabulary size?
    pub fn accepts(
        &self,
        size: usize,
    ) -> bool {
        size.abs_diff(self.target_size) <= self.tolerance
    }

    /// Check that every corpus exists.
    pub fn validate(&self) -> BTResult<()> {
        self.corpus_paths.iter().try_for_each(require_file)
    }
}

/// Builds a subword tokenizer from training corpora.
pub trait SubwordVocabBuilder<T: TokenType> {
    /// The tokenizer produced.
    type Tokenizer: LineEncoder<T>;

    /// Build (or load, if `request.vocab_path` exists) a tokenizer.
    fn build(
        &self,
        request: &SubwordVocabRequest,
    ) -> BTResult<Self::Tokenizer>;
}

/// Build a subword tokenizer and wrap it as a [`SharedPairEncoder`].
///
/// ## Errors
/// [`crate::errors::BitextError::MissingFile`] if any corpus is absent.
pub fn build_subword_encoder<T, B>(
    builder: &B,
    request: &SubwordVocabRequest,
) -> BTResult<SharedPairEncoder<B::Tokenizer>>
where
    T: TokenType,
    B: SubwordVocabBuilder<T>,
{
    request.validate()?;
    log::info!(
        "building subword vocabulary at {} (target size {} +/- {})",
        request.vocab_path.display(),
        request.target_size,
        request.tolerance
    );
    Ok(SharedPairEncoder::new(builder.build(request)?))
}

/// The conventional vocabulary path ``{data_dir}/{vocab_prefix}.{size}``.
pub fn subword_vocab_path<P: AsRef<Path>>(
    data_dir: P,
    vocab_prefix: &str,
    vocab_size: usize,
) -> PathBuf {
    data_dir
        .as_ref()
        .join(format!("{vocab_prefix}.{vocab_size}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{encoders::PairEncoder, errors::BitextError, records::EncodedExample};

    /// Splits each character into its own piece; id = char code.
    struct CharTokenizer;

    impl LineEncoder<u32> for CharTokenizer {
        fn encode_line(
            &self,
            line: &str,
            add_eos: bool,
        ) -> Vec<u32> {
            let mut ids: Vec<u32> = line.chars().map(|c| c as u32).collect();
            if add_eos {
                ids.push(2);
            }
            ids
        }
    }

    struct CharBuilder;

    impl SubwordVocabBuilder<u32> for CharBuilder {
        type Tokenizer = CharTokenizer;

        fn build(
            &self,
            _request: &SubwordVocabRequest,
        ) -> BTResult<CharTokenizer> {
            Ok(CharTokenizer)
        }
    }

    #[test]
    fn test_request() {
        let request = SubwordVocabRequest::new("vocab.subtoken.16000", vec![], 16000);
        assert_eq!(request.tolerance, VOCAB_TOLERANCE);
        assert_eq!(request.min_count, None);
        assert!(request.accepts(16000 - 327));
        assert!(request.accepts(16327));
        assert!(!request.accepts(16328));

        let request = request.with_search(false).with_tolerance(10);
        assert_eq!(request.min_count, Some(TRAIN_DATA_MIN_COUNT));
        assert!(!request.accepts(16011));
    }

    #[test]
    fn test_build_subword_encoder() {
        let dir = tempdir::TempDir::new("subword").unwrap();
        let corpus = dir.path().join("train.eu");
        std::fs::write(&corpus, "ab\n").unwrap();

        let request = SubwordVocabRequest::new(
            subword_vocab_path(dir.path(), "vocab.subtoken", 100),
            vec![corpus],
            100,
        );
        let encoder = build_subword_encoder::<u32, _>(&CharBuilder, &request).unwrap();

        let example: EncodedExample<u32> = encoder.encode_pair("ab", "c", true);
        assert_eq!(example.inputs, vec![97, 98, 2]);
        assert_eq!(example.targets, vec![99, 2]);

        let missing = SubwordVocabRequest::new("v", vec![dir.path().join("nope")], 100);
        assert!(matches!(
            build_subword_encoder::<u32, _>(&CharBuilder, &missing),
            Err(BitextError::MissingFile { .. })
        ));
    }

    #[test]
    fn test_subword_vocab_path() {
        assert_eq!(
            subword_vocab_path("/data", "vocab.subtoken", 16000),
            PathBuf::from("/data/vocab.subtoken.16000")
        );
    }
}
