//! # Vocabulary IO
//!
//! Vocabulary files are UTF-8 text, one token per line, in id order.
//!
//! ## Checking A Vocab
//!
//! ```rust,no_run
//! use bitext::vocab::{
//!     VocabTable,
//!     io::{VocabCheckOptions, check_vocab},
//! };
//!
//! fn example() -> bitext::errors::BTResult<VocabTable<u32>> {
//!     let checked = check_vocab("vocab.bpe.16000", "data/", &VocabCheckOptions::default())?;
//!     VocabTable::load_path(&checked.path)
//! }
//! ```

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    errors::{BTResult, BitextError, require_file},
    vocab::reserved::{RESERVED_COUNT, ReservedTokens},
};

/// Read tokens, one per line, from a [`BufRead`] stream.
///
/// Each line is trimmed of surrounding whitespace.
pub fn read_vocab_list<R: BufRead>(reader: R) -> BTResult<Vec<String>> {
    let mut tokens = Vec::new();
    for line in reader.lines() {
        tokens.push(line?.trim().to_string());
    }
    Ok(tokens)
}

/// Load tokens from a vocabulary file.
///
/// ## Errors
/// [`BitextError::MissingFile`] if `path` does not exist.
pub fn load_vocab_list<P: AsRef<Path>>(path: P) -> BTResult<Vec<String>> {
    let path = path.as_ref();
    require_file(path)?;

    let reader = BufReader::new(File::open(path)?);
    read_vocab_list(reader)
}

/// Write tokens, one per line, to a [`Write`] writer.
pub fn write_vocab_list<W, S>(
    tokens: &[S],
    writer: &mut W,
) -> BTResult<()>
where
    W: Write,
    S: AsRef<str>,
{
    for token in tokens {
        writeln!(writer, "{}", token.as_ref())?;
    }
    writer.flush()?;
    Ok(())
}

/// Save tokens to a vocabulary file.
pub fn save_vocab_list<P, S>(
    tokens: &[S],
    path: P,
) -> BTResult<()>
where
    P: AsRef<Path>,
    S: AsRef<str>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    write_vocab_list(tokens, &mut writer)
}

/// Options for [`check_vocab`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabCheckOptions {
    /// Verify (and repair) the reserved leading tokens.
    pub check_special_token: bool,

    /// The reserved tokens to expect.
    pub reserved: ReservedTokens,
}

impl Default for VocabCheckOptions {
    fn default() -> Self {
        Self {
            check_special_token: true,
            reserved: ReservedTokens::default(),
        }
    }
}

impl VocabCheckOptions {
    /// Enable or disable the reserved-token check.
    pub fn with_check_special_token(
        self,
        check_special_token: bool,
    ) -> Self {
        Self {
            check_special_token,
            ..self
        }
    }

    /// Set the reserved tokens.
    pub fn with_reserved(
        self,
        reserved: ReservedTokens,
    ) -> Self {
        Self { reserved, ..self }
    }
}

/// The outcome of [`check_vocab`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedVocab {
    /// The vocabulary file to use; the repaired copy if one was written.
    pub path: PathBuf,

    /// The number of tokens in `path`.
    pub size: usize,

    /// Was a repaired copy written?
    pub repaired: bool,
}

/// Validate a vocabulary file, repairing its reserved prefix if needed.
///
/// When the check is enabled and the first three tokens are not the
/// reserved tokens, a copy with the reserved tokens prepended is written
/// to ``out_dir/basename(vocab_path)``. The source file is never modified.
///
/// ## Arguments
/// * `vocab_path` - the vocabulary file.
/// * `out_dir` - where a repaired copy is written.
/// * `options` - check options.
///
/// ## Errors
/// * [`BitextError::MissingFile`] if `vocab_path` does not exist.
/// * [`BitextError::VocabTooSmall`] if the check is on and there are fewer than 3 tokens.
pub fn check_vocab<P, Q>(
    vocab_path: P,
    out_dir: Q,
    options: &VocabCheckOptions,
) -> BTResult<CheckedVocab>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let vocab_path = vocab_path.as_ref();
    let vocab = load_vocab_list(vocab_path)?;
    log::info!("vocab file {} exists", vocab_path.display());

    let unchanged = |size| CheckedVocab {
        path: vocab_path.to_path_buf(),
        size,
        repaired: false,
    };

    if !options.check_special_token {
        return Ok(unchanged(vocab.len()));
    }

    if vocab.len() < RESERVED_COUNT {
        return Err(BitextError::VocabTooSmall {
            path: vocab_path.to_path_buf(),
            size: vocab.len(),
        });
    }

    let reserved = &options.reserved;
    if reserved.is_prefix_of(&vocab) {
        return Ok(unchanged(vocab.len()));
    }

    log::warn!(
        "the first 3 vocab words {:?} are not {:?}",
        &vocab[..RESERVED_COUNT],
        reserved.as_array()
    );

    let file_name = vocab_path
        .file_name()
        .ok_or_else(|| BitextError::InvalidOptions(format!("{vocab_path:?} has no file name")))?;
    let new_path = out_dir.as_ref().join(file_name);

    let mut repaired: Vec<&str> = Vec::with_capacity(vocab.len() + RESERVED_COUNT);
    repaired.extend(reserved.as_array());
    repaired.extend(vocab.iter().map(String::as_str));

    // Same basename; out_dir may be the source's own directory.
    if same_file(vocab_path, &new_path) {
        return Err(BitextError::InvalidOptions(format!(
            "repaired vocab would overwrite {}",
            vocab_path.display()
        )));
    }
    save_vocab_list(&repaired, &new_path)?;
    log::info!("wrote repaired vocab to {}", new_path.display());

    Ok(CheckedVocab {
        path: new_path,
        size: repaired.len(),
        repaired: true,
    })
}

fn same_file(
    a: &Path,
    b: &Path,
) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
