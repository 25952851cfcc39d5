//! # Text Line Streams
//!
//! Corpora are read lazily, one trimmed line at a time. A stream is
//! single-pass; re-open the file to restart it.

use std::{
    fs::File,
    io::{BufRead, BufReader, Lines},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::errors::{BTResult, BitextError, require_file};

/// A lazy iterator over the trimmed lines of a text file.
pub struct TextLines {
    lines: Lines<BufReader<File>>,
}

impl TextLines {
    /// Open `path` for line iteration.
    ///
    /// ## Errors
    /// [`crate::errors::BitextError::MissingFile`] if `path` does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> BTResult<Self> {
        let path = path.as_ref();
        require_file(path)?;
        Ok(Self {
            lines: BufReader::new(File::open(path)?).lines(),
        })
    }
}

impl Iterator for TextLines {
    type Item = BTResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.lines
            .next()
            .map(|line| Ok(line?.trim().to_string()))
    }
}

/// What to do when paired streams have different lengths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineCountPolicy {
    /// Fail once one side runs out before the other.
    #[default]
    Strict,

    /// Stop at the shorter side and log a warning.
    Truncate,
}

/// The end state of a [`LinePairs`] stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairsEnd {
    /// Not yet exhausted.
    Open,

    /// Both sides ended together.
    Aligned,

    /// One side ended first.
    Mismatched,
}

/// Zips two line streams into `(source, target)` pairs.
///
/// Unlike [`Iterator::zip`], this notices when one side ends first, and
/// applies its [`LineCountPolicy`]: under `Strict` the stream ends with a
/// [`BitextError::LineCountMismatch`] item.
pub struct LinePairs<A, B> {
    source: A,
    target: B,
    consumed: usize,
    end: PairsEnd,
    policy: LineCountPolicy,
    label: String,
}

impl LinePairs<TextLines, TextLines> {
    /// Open a pair of line-aligned files.
    pub fn open<P, Q>(
        source_path: P,
        target_path: Q,
    ) -> BTResult<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        Ok(Self::new(
            TextLines::open(source_path)?,
            TextLines::open(target_path)?,
        ))
    }
}

impl<A, B> LinePairs<A, B>
where
    A: Iterator<Item = BTResult<String>>,
    B: Iterator<Item = BTResult<String>>,
{
    /// Zip two line streams.
    pub fn new(
        source: A,
        target: B,
    ) -> Self {
        Self {
            source,
            target,
            consumed: 0,
            end: PairsEnd::Open,
            policy: LineCountPolicy::default(),
            label: String::new(),
        }
    }

    /// Set the mismatch policy, and the label used in its errors and warnings.
    pub fn with_policy<S: Into<String>>(
        self,
        policy: LineCountPolicy,
        label: S,
    ) -> Self {
        Self {
            policy,
            label: label.into(),
            ..self
        }
    }

    /// The number of pairs yielded so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// How the stream ended.
    pub fn end(&self) -> PairsEnd {
        self.end
    }
}

impl<A, B> Iterator for LinePairs<A, B>
where
    A: Iterator<Item = BTResult<String>>,
    B: Iterator<Item = BTResult<String>>,
{
    type Item = BTResult<(String, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.end != PairsEnd::Open {
            return None;
        }
        match (self.source.next(), self.target.next()) {
            (Some(Ok(source)), Some(Ok(target))) => {
                self.consumed += 1;
                Some(Ok((source, target)))
            }
            (Some(Err(e)), _) | (_, Some(Err(e))) => {
                self.end = PairsEnd::Mismatched;
                Some(Err(e))
            }
            (None, None) => {
                self.end = PairsEnd::Aligned;
                None
            }
            _ => {
                self.end = PairsEnd::Mismatched;
                match self.policy {
                    LineCountPolicy::Strict => Some(Err(BitextError::LineCountMismatch {
                        tag: self.label.clone(),
                        consumed: self.consumed,
                    })),
                    LineCountPolicy::Truncate => {
                        log::warn!(
                            "{}: line counts differ; truncated to {} pairs",
                            self.label,
                            self.consumed
                        );
                        None
                    }
                }
            }
        }
    }
}

/// The conventional corpus path ``{prefix}.{lang}``.
pub fn corpus_path(
    prefix: &str,
    lang: &str,
) -> PathBuf {
    PathBuf::from(format!("{prefix}.{lang}"))
}
