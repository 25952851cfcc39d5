//! # Shuffle Buffer
//!
//! A bounded-memory approximate shuffle of a stream: the buffer is kept
//! full, and each output is drawn uniformly from it.

use rand::Rng;

use crate::errors::BTResult;

/// Shuffles a fallible stream through a buffer of `capacity` items.
///
/// Errors are passed through as soon as they are read.
pub struct ShuffleBuffer<I, V, R> {
    source: I,
    buffer: Vec<V>,
    capacity: usize,
    rng: R,
    exhausted: bool,
}

impl<I, V, R> ShuffleBuffer<I, V, R>
where
    I: Iterator<Item = BTResult<V>>,
    R: Rng,
{
    /// Wrap `source`; a `capacity` of 0 or 1 preserves order.
    pub fn new(
        source: I,
        capacity: usize,
        rng: R,
    ) -> Self {
        let capacity = capacity.max(1);
        Self {
            source,
            buffer: Vec::with_capacity(capacity.min(1 << 16)),
            capacity,
            rng,
            exhausted: false,
        }
    }
}

impl<I, V, R> Iterator for ShuffleBuffer<I, V, R>
where
    I: Iterator<Item = BTResult<V>>,
    R: Rng,
{
    type Item = BTResult<V>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.exhausted && self.buffer.len() < self.capacity {
            match self.source.next() {
                Some(Ok(value)) => self.buffer.push(value),
                Some(Err(e)) => return Some(Err(e)),
                None => self.exhausted = true,
            }
        }

        if self.buffer.is_empty() {
            return None;
        }
        let idx = self.rng.random_range(0..self.buffer.len());
        Some(Ok(self.buffer.swap_remove(idx)))
    }
}
