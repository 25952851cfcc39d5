//! # Record Files
//!
//! Encoded examples are persisted as length-delimited records; each payload
//! is a self-describing ``{ "inputs": [..], "targets": [..] }`` map.

pub mod example;
pub mod record_io;

#[doc(inline)]
pub use example::{EncodedExample, Features, INPUTS_KEY, TARGETS_KEY};
#[doc(inline)]
pub use record_io::{
    RecordFileReader, RecordFileWriter, RecordReader, RecordWriter, read_all_examples,
    read_all_records,
};
