//! # Source/Target Vocabulary Pair

use std::{path::Path, sync::Arc};

use crate::{
    errors::BTResult,
    types::TokenType,
    vocab::{VocabTable, reserved::UNK},
};

/// The source and target [`VocabTable`]s of a translation direction.
///
/// A shared vocabulary is literally the same table on both sides.
#[derive(Debug, Clone)]
pub struct VocabPair<T: TokenType> {
    source: Arc<VocabTable<T>>,
    target: Arc<VocabTable<T>>,
}

impl<T: TokenType> VocabPair<T> {
    /// Use one table for both directions.
    pub fn shared(table: Arc<VocabTable<T>>) -> Self {
        Self {
            source: table.clone(),
            target: table,
        }
    }

    /// Use independent source and target tables.
    pub fn separate(
        source: Arc<VocabTable<T>>,
        target: Arc<VocabTable<T>>,
    ) -> Self {
        Self { source, target }
    }

    /// Load a pair from vocabulary files.
    ///
    /// ## Arguments
    /// * `source_path` - the source vocabulary.
    /// * `target_path` - the target vocabulary; ignored when `share_vocab` is set.
    /// * `share_vocab` - use the source table for the target side.
    pub fn from_files<P, Q>(
        source_path: P,
        target_path: Q,
        share_vocab: bool,
    ) -> BTResult<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let source = Arc::new(VocabTable::load_path(source_path)?);
        if share_vocab {
            return Ok(Self::shared(source));
        }
        let target = Arc::new(VocabTable::load_path(target_path)?);
        Ok(Self::separate(source, target))
    }

    /// The source table.
    pub fn source(&self) -> &Arc<VocabTable<T>> {
        &self.source
    }

    /// The target table.
    pub fn target(&self) -> &Arc<VocabTable<T>> {
        &self.target
    }

    /// Are both directions backed by the same table?
    pub fn is_shared(&self) -> bool {
        Arc::ptr_eq(&self.source, &self.target)
    }

    /// Encode a line with the source table.
    pub fn encode(
        &self,
        line: &str,
        add_eos: bool,
    ) -> Vec<T> {
        self.encode_source(line, add_eos)
    }

    /// Encode a line with the source table.
    pub fn encode_source(
        &self,
        line: &str,
        add_eos: bool,
    ) -> Vec<T> {
        self.source.encode_line(line, add_eos)
    }

    /// Encode a line with the target table.
    pub fn encode_target(
        &self,
        line: &str,
        add_eos: bool,
    ) -> Vec<T> {
        self.target.encode_line(line, add_eos)
    }

    /// Decode target ids into a line; unknown ids become `<unk>`.
    pub fn decode(
        &self,
        ids: &[T],
    ) -> String {
        self.target.decode(ids, UNK)
    }
}
