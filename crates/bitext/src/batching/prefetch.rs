//! # Background Prefetch
//!
//! Runs an iterator on its own thread behind a bounded channel. Items
//! arrive in production order; the producer blocks while the buffer is
//! full, the consumer while it is empty.

use std::{
    sync::mpsc::{Receiver, sync_channel},
    thread::JoinHandle,
};

/// A prefetching iterator; see [`Prefetch::spawn`].
///
/// Dropping it early disconnects the channel, and the producer stops at
/// its next send.
pub struct Prefetch<V> {
    receiver: Receiver<V>,
    handle: Option<JoinHandle<()>>,
}

impl<V: Send + 'static> Prefetch<V> {
    /// Drive `iter` on a background thread, buffering up to `buffer` items.
    ///
    /// A `buffer` of 0 is treated as 1.
    pub fn spawn<I>(
        iter: I,
        buffer: usize,
    ) -> Self
    where
        I: Iterator<Item = V> + Send + 'static,
    {
        let (sender, receiver) = sync_channel(buffer.max(1));
        let handle = std::thread::spawn(move || {
            for item in iter {
                if sender.send(item).is_err() {
                    log::debug!("prefetch consumer hung up");
                    break;
                }
            }
        });

        Self {
            receiver,
            handle: Some(handle),
        }
    }
}

impl<V> Iterator for Prefetch<V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        match self.receiver.recv() {
            Ok(item) => Some(item),
            Err(_) => {
                // Producer finished; surface its panic, if any.
                if let Some(handle) = self.handle.take()
                    && let Err(payload) = handle.join()
                {
                    std::panic::resume_unwind(payload);
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order() {
        let items: Vec<u32> = Prefetch::spawn(0..1000u32, 4).collect();
        assert_eq!(items, (0..1000).collect::<Vec<_>>());
    }

    #[test]
    fn test_zero_buffer() {
        let mut prefetch = Prefetch::spawn(vec!["a", "b"].into_iter(), 0);
        assert_eq!(prefetch.next(), Some("a"));
        assert_eq!(prefetch.next(), Some("b"));
        assert_eq!(prefetch.next(), None);
        assert_eq!(prefetch.next(), None);
    }

    #[test]
    fn test_early_drop() {
        let mut prefetch = Prefetch::spawn(0u64.., 2);
        assert_eq!(prefetch.next(), Some(0));
        drop(prefetch);
    }

    #[test]
    #[should_panic(expected = "producer failed")]
    fn test_producer_panic() {
        let iter = (0..3).map(|i| {
            if i == 2 {
                panic!("producer failed");
            }
            i
        });
        let _: Vec<i32> = Prefetch::spawn(iter, 1).collect();
    }
}
