//! # Streaming Batch Pipeline
//!
//! Bucketed, padded batches assembled from live text or id streams,
//! for training, evaluation, and inference.

pub mod assembler;
pub mod bucketing;
pub mod dataset;
pub mod group_by_window;
pub mod infer;
pub mod options;
pub mod padded_batch;
pub mod parallel_map;
pub mod prefetch;
pub mod shuffle_buffer;
pub mod transform;

#[doc(inline)]
pub use assembler::{BatchAssembler, BucketedBatches};
#[doc(inline)]
pub use bucketing::BucketPolicy;
#[doc(inline)]
pub use dataset::{EpochBatches, TrainDataset};
#[doc(inline)]
pub use infer::InferBatches;
#[doc(inline)]
pub use options::{DatasetOptions, InferOptions};
#[doc(inline)]
pub use padded_batch::{PaddedMatrix, PairBatch, SourceBatch};
#[doc(inline)]
pub use prefetch::Prefetch;
