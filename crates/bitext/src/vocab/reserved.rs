//! # Reserved Tokens
//!
//! Every vocabulary starts with three fixed entries:
//!
//! | id | token   | meaning           |
//! |----|---------|-------------------|
//! | 0  | `<unk>` | unknown token     |
//! | 1  | `<s>`   | start of sequence |
//! | 2  | `</s>`  | end of sequence   |

use serde::{Deserialize, Serialize};

/// The default unknown-token string.
pub const UNK: &str = "<unk>";
/// The default start-of-sequence string.
pub const SOS: &str = "<s>";
/// The default end-of-sequence string.
pub const EOS: &str = "</s>";

/// The id of the unknown token.
pub const UNK_ID: usize = 0;
/// The id of the start-of-sequence token.
pub const SOS_ID: usize = 1;
/// The id of the end-of-sequence token.
pub const EOS_ID: usize = 2;

/// The number of reserved leading entries.
pub const RESERVED_COUNT: usize = 3;

/// The reserved token strings, in id order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedTokens {
    /// The unknown-token string; id [`UNK_ID`].
    pub unk: String,

    /// The start-of-sequence string; id [`SOS_ID`].
    pub sos: String,

    /// The end-of-sequence string; id [`EOS_ID`].
    pub eos: String,
}

impl Default for ReservedTokens {
    fn default() -> Self {
        Self {
            unk: UNK.to_string(),
            sos: SOS.to_string(),
            eos: EOS.to_string(),
        }
    }
}

impl ReservedTokens {
    /// Replace the unknown-token string.
    pub fn with_unk<S: Into<String>>(
        self,
        unk: S,
    ) -> Self {
        Self {
            unk: unk.into(),
            ..self
        }
    }

    /// Replace the start-of-sequence string.
    pub fn with_sos<S: Into<String>>(
        self,
        sos: S,
    ) -> Self {
        Self {
            sos: sos.into(),
            ..self
        }
    }

    /// Replace the end-of-sequence string.
    pub fn with_eos<S: Into<String>>(
        self,
        eos: S,
    ) -> Self {
        Self {
            eos: eos.into(),
            ..self
        }
    }

    /// The reserved strings in id order.
    pub fn as_array(&self) -> [&str; RESERVED_COUNT] {
        [&self.unk, &self.sos, &self.eos]
    }

    /// Does `tokens` start with exactly the reserved strings, in order?
    pub fn is_prefix_of<S: AsRef<str>>(
        &self,
        tokens: &[S],
    ) -> bool {
        tokens.len() >= RESERVED_COUNT
            && self
                .as_array()
                .iter()
                .zip(tokens)
                .all(|(r, t)| *r == t.as_ref())
    }
}
