//! # Length Bucketing

/// The bucket width when no source cap is set.
pub const DEFAULT_BUCKET_WIDTH: usize = 10;

/// Maps example lengths to bucket ids.
///
/// ``bucket_id = min(num_buckets, max(src_len, tgt_len) / width)``, so the
/// ids range over ``0..=num_buckets``.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketPolicy {
    num_buckets: usize,
    width: usize,
}

impl BucketPolicy {
    /// Build a policy for `num_buckets` buckets.
    ///
    /// The width is ``ceil(src_max_len / num_buckets)`` when a source cap is
    /// set, and [`DEFAULT_BUCKET_WIDTH`] otherwise.
    pub fn new(
        num_buckets: usize,
        src_max_len: Option<usize>,
    ) -> Self {
        let width = match src_max_len {
            Some(max_len) if num_buckets > 0 => max_len.div_ceil(num_buckets),
            _ => DEFAULT_BUCKET_WIDTH,
        };
        Self {
            num_buckets,
            width: width.max(1),
        }
    }

    /// The number of buckets.
    pub fn num_buckets(&self) -> usize {
        self.num_buckets
    }

    /// The bucket width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Is bucketing enabled?
    ///
    /// With one bucket or fewer, batches follow stream order.
    pub fn is_bucketed(&self) -> bool {
        self.num_buckets > 1
    }

    /// The bucket for an example.
    pub fn bucket_id(
        &self,
        source_len: usize,
        target_len: usize,
    ) -> usize {
        let bucket = source_len.max(target_len) / self.width;
        bucket.min(self.num_buckets)
    }
}
