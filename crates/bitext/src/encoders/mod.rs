//! # Encoders
//!
//! * [`LineEncoder`] - one line of text to ids.
//! * [`PairEncoder`] - a `(source, target)` line pair to an [`crate::records::EncodedExample`].
//!
//! Word-level encoding is provided by [`crate::vocab::VocabTable`] and
//! [`crate::vocab::VocabPair`]; subword tokenizers plug in through
//! [`subword::SubwordVocabBuilder`].

pub mod line_encoder;
pub mod subword;

#[doc(inline)]
pub use line_encoder::{LineEncoder, PairEncoder, SharedPairEncoder};
