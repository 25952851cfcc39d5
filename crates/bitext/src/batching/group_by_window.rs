//! # Group By Window
//!
//! Collects a keyed stream into per-key windows of a fixed size.

use std::collections::BTreeMap;

/// Per-key windowing over a live stream.
///
/// Each key accumulates values until its window holds `window_size` of
/// them; that window is then emitted whole. Keys are independent, so
/// output order follows window completion, not input order.
#[derive(Debug)]
pub struct WindowGrouper<K: Ord, V> {
    window_size: usize,
    windows: BTreeMap<K, Vec<V>>,
}

impl<K: Ord, V> WindowGrouper<K, V> {
    /// Create a grouper emitting windows of `window_size` values.
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size: window_size.max(1),
            windows: BTreeMap::new(),
        }
    }

    /// The window size.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// The number of values held in partial windows.
    pub fn pending(&self) -> usize {
        self.windows.values().map(Vec::len).sum()
    }

    /// Add a value; returns the key's window once it is full.
    pub fn push(
        &mut self,
        key: K,
        value: V,
    ) -> Option<Vec<V>> {
        let window_size = self.window_size;
        let window = self
            .windows
            .entry(key)
            .or_insert_with(|| Vec::with_capacity(window_size));
        window.push(value);

        if window.len() >= window_size {
            Some(std::mem::replace(window, Vec::with_capacity(window_size)))
        } else {
            None
        }
    }

    /// Drain the remaining partial windows, in ascending key order.
    pub fn finish(&mut self) -> Vec<Vec<V>> {
        std::mem::take(&mut self.windows)
            .into_values()
            .filter(|window| !window.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows() {
        let mut grouper = WindowGrouper::new(2);

        assert_eq!(grouper.push(1, "a"), None);
        assert_eq!(grouper.push(0, "b"), None);
        assert_eq!(grouper.push(1, "c"), Some(vec!["a", "c"]));
        assert_eq!(grouper.push(2, "d"), None);
        assert_eq!(grouper.push(1, "e"), None);
        assert_eq!(grouper.pending(), 3);

        assert_eq!(grouper.finish(), vec![vec!["b"], vec!["e"], vec!["d"]]);
        assert_eq!(grouper.pending(), 0);
        assert!(grouper.finish().is_empty());
    }

    #[test]
    fn test_window_size_one() {
        let mut grouper = WindowGrouper::new(0);
        assert_eq!(grouper.window_size(), 1);
        assert_eq!(grouper.push(7, 1), Some(vec![1]));
    }
}
