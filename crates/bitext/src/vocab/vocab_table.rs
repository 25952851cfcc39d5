//! # Vocabulary Table ``{ String <-> T }``

use std::path::Path;

use crate::{
    errors::{BTResult, BitextError},
    types::{BTHashMap, TokenType, hash_map_with_capacity},
    vocab::{
        io::load_vocab_list,
        reserved::{EOS_ID, SOS_ID, UNK_ID},
    },
};

/// Convert a `usize` id into the token type.
pub(crate) fn id_from_usize<T: TokenType>(id: usize) -> BTResult<T> {
    T::from_usize(id).ok_or(BitextError::TokenOutOfRange { value: id as i64 })
}

/// An immutable bijection between token strings and dense ids.
///
/// The id of a token is its position in the ordered token list.
/// If a token string is listed more than once, lookup resolves to
/// its first position; every id still decodes to its own entry.
#[derive(Debug, Clone, PartialEq)]
pub struct VocabTable<T: TokenType> {
    tokens: Vec<String>,
    index: BTHashMap<String, T>,
}

impl<T: TokenType> VocabTable<T> {
    /// Build a table from tokens in id order.
    ///
    /// ## Errors
    /// [`BitextError::TokenOutOfRange`] if the table does not fit in `T`.
    pub fn from_tokens<I, S>(tokens: I) -> BTResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let mut index = hash_map_with_capacity(tokens.len());

        for (id, token) in tokens.iter().enumerate() {
            let id: T = id_from_usize(id)?;
            if index.contains_key(token) {
                log::debug!("duplicate vocab entry {token:?} at id {id}");
                continue;
            }
            index.insert(token.clone(), id);
        }

        Ok(Self { tokens, index })
    }

    /// Load a table from a one-token-per-line vocabulary file.
    pub fn load_path<P: AsRef<Path>>(path: P) -> BTResult<Self> {
        Self::from_tokens(load_vocab_list(path)?)
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The tokens, in id order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// The id for `token`, if present.
    pub fn token_id(
        &self,
        token: &str,
    ) -> Option<T> {
        self.index.get(token).copied()
    }

    /// The id for `token`, falling back to the unknown-token id.
    pub fn lookup(
        &self,
        token: &str,
    ) -> T {
        self.token_id(token).unwrap_or_else(Self::unk_id)
    }

    /// The token string for `id`, if present.
    pub fn token(
        &self,
        id: T,
    ) -> Option<&str> {
        id.to_usize()
            .and_then(|idx| self.tokens.get(idx))
            .map(String::as_str)
    }

    /// The unknown-token id.
    pub fn unk_id() -> T {
        T::from_usize(UNK_ID).unwrap_or_default()
    }

    /// The start-of-sequence id.
    pub fn sos_id() -> T {
        T::from_usize(SOS_ID).unwrap_or_default()
    }

    /// The end-of-sequence id.
    pub fn eos_id() -> T {
        T::from_usize(EOS_ID).unwrap_or_default()
    }

    /// Encode space-separated `line` into ids.
    ///
    /// The line is split on the single space character; no normalization
    /// is applied. Tokens absent from the table map to the unknown id.
    ///
    /// ## Arguments
    /// * `line` - the whitespace-tokenized text.
    /// * `add_eos` - append the end-of-sequence id.
    pub fn encode_line(
        &self,
        line: &str,
        add_eos: bool,
    ) -> Vec<T> {
        let mut ids: Vec<T> = line.split(' ').map(|token| self.lookup(token)).collect();
        if add_eos {
            ids.push(Self::eos_id());
        }
        ids
    }

    /// Decode ids into a space-joined line.
    ///
    /// Ids outside the table decode to `unk`.
    pub fn decode(
        &self,
        ids: &[T],
        unk: &str,
    ) -> String {
        ids.iter()
            .map(|&id| self.token(id).unwrap_or(unk))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
