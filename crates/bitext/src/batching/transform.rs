//! # Per-Pair Transform
//!
//! Applied to each id pair before bucketing: drop empties, truncate,
//! then frame the target with the start and end markers.

use crate::types::{SeqPair, TokenType};

/// A training pair with its target framed as decoder input and output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedPair<T: TokenType> {
    /// The source ids.
    pub source: Vec<T>,

    /// ``[sos] + target``.
    pub target_input: Vec<T>,

    /// ``target + [eos]``.
    pub target_output: Vec<T>,
}

impl<T: TokenType> FramedPair<T> {
    /// The unpadded source length.
    pub fn source_len(&self) -> usize {
        self.source.len()
    }

    /// The unpadded target length, ``len(target_input)``.
    pub fn target_len(&self) -> usize {
        self.target_input.len()
    }
}

/// Truncate `ids` to at most `max_len` entries.
pub fn truncate<T>(
    mut ids: Vec<T>,
    max_len: Option<usize>,
) -> Vec<T> {
    if let Some(max_len) = max_len {
        ids.truncate(max_len);
    }
    ids
}

/// Frame a `(source, target)` pair.
///
/// Returns `None` when either side is empty; such pairs are dropped
/// without being reported. Truncation happens after the emptiness check.
///
/// ## Arguments
/// * `pair` - the source and target ids.
/// * `src_max_len` - optional source cap.
/// * `tgt_max_len` - optional target cap.
/// * `sos` - the target start-marker id.
/// * `eos` - the target end-marker id.
pub fn frame_pair<T: TokenType>(
    pair: SeqPair<T>,
    src_max_len: Option<usize>,
    tgt_max_len: Option<usize>,
    sos: T,
    eos: T,
) -> Option<FramedPair<T>> {
    let (source, target) = pair;
    if source.is_empty() || target.is_empty() {
        return None;
    }

    let source = truncate(source, src_max_len);
    let target = truncate(target, tgt_max_len);

    let mut target_input = Vec::with_capacity(target.len() + 1);
    target_input.push(sos);
    target_input.extend_from_slice(&target);

    let mut target_output = target;
    target_output.push(eos);

    Some(FramedPair {
        source,
        target_input,
        target_output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_pair() {
        let framed = frame_pair::<u32>((vec![3, 4, 5], vec![6, 7]), None, None, 1, 2).unwrap();

        assert_eq!(framed.source, vec![3, 4, 5]);
        assert_eq!(framed.target_input, vec![1, 6, 7]);
        assert_eq!(framed.target_output, vec![6, 7, 2]);
        assert_eq!(framed.source_len(), 3);
        assert_eq!(framed.target_len(), 3);
    }

    #[test]
    fn test_frame_pair_truncates() {
        let framed =
            frame_pair::<u32>((vec![3, 4, 5, 6], vec![7, 8, 9]), Some(2), Some(1), 1, 2).unwrap();

        assert_eq!(framed.source, vec![3, 4]);
        assert_eq!(framed.target_input, vec![1, 7]);
        assert_eq!(framed.target_output, vec![7, 2]);
    }

    #[test]
    fn test_frame_pair_drops_empty() {
        assert!(frame_pair::<u32>((vec![], vec![6]), None, None, 1, 2).is_none());
        assert!(frame_pair::<u32>((vec![3], vec![]), None, None, 1, 2).is_none());
    }
}
