//! # Order-Preserving Parallel Map
//!
//! Pulls the input stream in chunks, maps each chunk across a fixed
//! worker pool, and yields results in input order.

use std::collections::VecDeque;

use crate::errors::{BTResult, BitextError};

/// Items pulled per worker per chunk.
pub const CHUNK_PER_WORKER: usize = 256;

/// A fan-out/fan-in map over a fallible stream.
///
/// The transform must be side-effect free. An input error is yielded
/// after the mapped items that preceded it.
pub struct ParallelMap<I, V, U, F> {
    source: I,
    func: F,
    chunk_size: usize,
    ready: VecDeque<BTResult<U>>,
    exhausted: bool,
    #[cfg(feature = "rayon")]
    pool: rayon::ThreadPool,
    _marker: std::marker::PhantomData<fn(V)>,
}

impl<I, V, U, F> ParallelMap<I, V, U, F>
where
    I: Iterator<Item = BTResult<V>>,
    V: Send,
    U: Send,
    F: Fn(V) -> U + Send + Sync,
{
    /// Map `source` through `func` with `num_workers` workers.
    ///
    /// ## Errors
    /// [`BitextError::InvalidOptions`] if the worker pool cannot be built.
    pub fn new(
        source: I,
        func: F,
        num_workers: usize,
    ) -> BTResult<Self> {
        let num_workers = num_workers.max(1);

        #[cfg(feature = "rayon")]
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_workers)
            .build()
            .map_err(|e| BitextError::InvalidOptions(format!("map worker pool: {e}")))?;

        Ok(Self {
            source,
            func,
            chunk_size: num_workers * CHUNK_PER_WORKER,
            ready: VecDeque::new(),
            exhausted: false,
            #[cfg(feature = "rayon")]
            pool,
            _marker: std::marker::PhantomData,
        })
    }

    fn fill(&mut self) {
        let mut chunk = Vec::with_capacity(self.chunk_size);
        let mut error: Option<BitextError> = None;

        while chunk.len() < self.chunk_size {
            match self.source.next() {
                Some(Ok(value)) => chunk.push(value),
                Some(Err(e)) => {
                    error = Some(e);
                    break;
                }
                None => {
                    self.exhausted = true;
                    break;
                }
            }
        }

        let mapped = self.map_chunk(chunk);
        self.ready.extend(mapped.into_iter().map(Ok));
        if let Some(e) = error {
            self.ready.push_back(Err(e));
        }
    }

    #[cfg(feature = "rayon")]
    fn map_chunk(
        &self,
        chunk: Vec<V>,
    ) -> Vec<U> {
        use rayon::prelude::*;

        let func = &self.func;
        self.pool
            .install(|| chunk.into_par_iter().map(func).collect())
    }

    #[cfg(not(feature = "rayon"))]
    fn map_chunk(
        &self,
        chunk: Vec<V>,
    ) -> Vec<U> {
        chunk.into_iter().map(&self.func).collect()
    }
}

impl<I, V, U, F> Iterator for ParallelMap<I, V, U, F>
where
    I: Iterator<Item = BTResult<V>>,
    V: Send,
    U: Send,
    F: Fn(V) -> U + Send + Sync,
{
    type Item = BTResult<U>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.ready.is_empty() && !self.exhausted {
            self.fill();
        }
        self.ready.pop_front()
    }
}
