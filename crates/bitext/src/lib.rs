//! # `bitext` Parallel-Text Data Pipeline
//!
//! This crate prepares parallel text for sequence-to-sequence training.
//!
//! There are two paths through it:
//!
//! * Records: check the vocabularies, encode line pairs, write them
//!   round-robin into shard files, and shuffle each shard.
//! * Streaming: look up raw line pairs and assemble length-bucketed,
//!   padded batches on the fly, without touching shard files.
//!
//! See:
//! * [`vocab`] for vocabulary tables, loading, and reserved-token repair.
//! * [`encoders`] to encode line pairs into ids.
//! * [`records`] for the record file format.
//! * [`sharding`] to write and shuffle shard sets.
//! * [`batching`] for the bucketed batch pipeline.
//! * [`pipeline`] for the end-to-end record build.
//!
//! ## Crate Features
//!
//! #### feature: ``default``
//!
//! * ``rayon``
//!
//! #### feature: ``rayon``
//!
//! Runs the dataset map stage on a ``rayon`` worker pool. Without it,
//! the map stage runs inline.
//!
//! #### feature: ``foldhash``
//!
//! This swaps the vocabulary hash maps for ``foldhash``.
//!
//! ## Streaming Batches
//!
//! ```rust,no_run
//! use bitext::{
//!     batching::{DatasetOptions, TrainDataset},
//!     vocab::VocabPair,
//! };
//!
//! fn example() -> bitext::errors::BTResult<()> {
//!     let vocab = VocabPair::<u32>::from_files("data/vocab.eu", "data/vocab.en", false)?;
//!     let options = DatasetOptions::new(128)
//!         .with_num_buckets(5)
//!         .with_max_lens(Some(50), Some(50));
//!     let dataset = TrainDataset::open("raw/train", "eu", "en", vocab, options)?;
//!
//!     for epoch in 0..3 {
//!         for batch in dataset.epoch_prefetched(epoch)? {
//!             let batch = batch?;
//!             println!("{:?} {:.2}", batch.source.shape(), batch.efficiency());
//!         }
//!     }
//!     Ok(())
//! }
//! ```
#![warn(missing_docs, unused)]

pub mod batching;
pub mod config;
pub mod encoders;
pub mod errors;
pub mod lines;
pub mod pipeline;
pub mod records;
pub mod sharding;
pub mod types;
pub mod vocab;
