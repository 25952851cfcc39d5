//! # Vocabulary
//!
//! This module provides word-level vocabularies and related io mechanisms.
//!
//! * [`VocabTable`] - an immutable ``{ String <-> T }`` bijection.
//! * [`VocabPair`] - the source and target tables of a translation direction.
//! * [`io::check_vocab`] - validate and repair the reserved leading tokens.
//! * [`reserved`] - the `<unk>`, `<s>`, `</s>` reserved tokens.

pub mod io;
pub mod reserved;
pub mod vocab_pair;
pub mod vocab_table;

#[doc(inline)]
pub use reserved::ReservedTokens;
#[doc(inline)]
pub use vocab_pair::VocabPair;
#[doc(inline)]
pub use vocab_table::VocabTable;
