//! # Sharding
//!
//! * [`ShardSpec`] - shard naming: ``{prefix}-{tag}-{index:05}-of-{count:05}``.
//! * [`ShardedRecordWriter`] - round-robin, rename-on-completion shard writes.
//! * [`shuffle::shuffle_records`] - in-memory shuffle of one finalized shard.

pub mod shard_spec;
pub mod shard_writer;
pub mod shuffle;

#[doc(inline)]
pub use shard_spec::{DEV_SHARDS, DEV_TAG, ShardSpec, TRAIN_SHARDS, TRAIN_TAG, all_exist};
#[doc(inline)]
pub use shard_writer::{RecordWriterOptions, ShardWriteReport, ShardedRecordWriter};
#[doc(inline)]
pub use shuffle::{shuffle_records, shuffle_records_with, shuffle_rng, shuffle_shards};
