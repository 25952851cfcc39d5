//! # Error Types

use std::path::PathBuf;

/// Errors from bitext operations.
#[derive(Debug, thiserror::Error)]
pub enum BitextError {
    /// A required input file (corpus or vocabulary) does not exist.
    #[error("file not found: {}", path.display())]
    MissingFile {
        /// The missing path.
        path: PathBuf,
    },

    /// A vocabulary file has fewer entries than the reserved tokens need.
    #[error("vocab file {} has {size} tokens; expected at least 3", path.display())]
    VocabTooSmall {
        /// The vocabulary path.
        path: PathBuf,

        /// The number of tokens read.
        size: usize,
    },

    /// The source and target streams ended at different line counts.
    #[error("{tag}: source and target line counts differ ({consumed} pairs read, one side longer)")]
    LineCountMismatch {
        /// The shard tag being written.
        tag: String,

        /// The number of complete pairs consumed before one side ran out.
        consumed: usize,
    },

    /// A token id value does not fit the target token type.
    #[error("token value {value} out of range")]
    TokenOutOfRange {
        /// The offending value.
        value: i64,
    },

    /// A record file is truncated or holds a malformed payload.
    #[error("corrupt record: {0}")]
    CorruptRecord(String),

    /// Options failed validation.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Record payload (de)serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type for bitext operations.
pub type BTResult<T> = core::result::Result<T, BitextError>;

/// Fail with [`BitextError::MissingFile`] unless `path` exists.
pub fn require_file<P: AsRef<std::path::Path>>(path: P) -> BTResult<()> {
    let path = path.as_ref();
    if path.exists() {
        Ok(())
    } else {
        Err(BitextError::MissingFile {
            path: path.to_path_buf(),
        })
    }
}
