//! # Record File IO
//!
//! A record file is a sequence of frames:
//!
//! ```text
//! [len: u64 little-endian][payload: len bytes] ...
//! ```
//!
//! Payloads are opaque to this layer; see [`crate::records::EncodedExample`].

use std::{
    fs::File,
    io::{BufReader, BufWriter, ErrorKind, Read, Write},
    path::Path,
};

use crate::{
    errors::{BTResult, BitextError, require_file},
    records::EncodedExample,
    types::TokenType,
};

const LEN_BYTES: usize = size_of::<u64>();

/// A [`RecordWriter`] over a buffered file.
pub type RecordFileWriter = RecordWriter<BufWriter<File>>;

/// A [`RecordReader`] over a buffered file.
pub type RecordFileReader = RecordReader<BufReader<File>>;

/// Writes length-delimited records.
pub struct RecordWriter<W: Write> {
    inner: W,
    count: usize,
}

impl RecordWriter<BufWriter<File>> {
    /// Create (truncating) a record file.
    pub fn create<P: AsRef<Path>>(path: P) -> BTResult<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> RecordWriter<W> {
    /// Wrap a writer.
    pub fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }

    /// The number of records written.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Append one raw record.
    pub fn write_record(
        &mut self,
        payload: &[u8],
    ) -> BTResult<()> {
        self.inner.write_all(&(payload.len() as u64).to_le_bytes())?;
        self.inner.write_all(payload)?;
        self.count += 1;
        Ok(())
    }

    /// Append one encoded example.
    pub fn write_example<T: TokenType>(
        &mut self,
        example: &EncodedExample<T>,
    ) -> BTResult<()> {
        self.write_record(&example.to_bytes()?)
    }

    /// Flush and return the inner writer.
    pub fn finish(mut self) -> BTResult<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Reads length-delimited records.
///
/// Iterates raw payloads; a truncated trailing frame yields
/// [`BitextError::CorruptRecord`].
pub struct RecordReader<R: Read> {
    inner: R,
    done: bool,
}

impl RecordReader<BufReader<File>> {
    /// Open a record file.
    pub fn open<P: AsRef<Path>>(path: P) -> BTResult<Self> {
        let path = path.as_ref();
        require_file(path)?;
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: Read> RecordReader<R> {
    /// Wrap a reader.
    pub fn new(inner: R) -> Self {
        Self { inner, done: false }
    }

    /// Iterate decoded examples instead of raw payloads.
    pub fn examples<T: TokenType>(self) -> impl Iterator<Item = BTResult<EncodedExample<T>>> {
        self.map(|record| record.and_then(|bytes| EncodedExample::from_bytes(&bytes)))
    }

    fn read_frame(&mut self) -> BTResult<Option<Vec<u8>>> {
        let mut len_buf = [0u8; LEN_BYTES];
        let mut filled = 0;
        while filled < LEN_BYTES {
            match self.inner.read(&mut len_buf[filled..]) {
                Ok(0) if filled == 0 => return Ok(None),
                Ok(0) => {
                    return Err(BitextError::CorruptRecord(format!(
                        "truncated length header ({filled} of {LEN_BYTES} bytes)"
                    )));
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        // The header is untrusted; grow the buffer only as bytes arrive.
        let len = u64::from_le_bytes(len_buf);
        let mut payload = Vec::new();
        (&mut self.inner).take(len).read_to_end(&mut payload)?;
        if payload.len() as u64 != len {
            return Err(BitextError::CorruptRecord(format!(
                "truncated payload ({} of {len} bytes)",
                payload.len()
            )));
        }
        Ok(Some(payload))
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = BTResult<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_frame() {
            Ok(Some(payload)) => Some(Ok(payload)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Read every raw record of a file into memory.
pub fn read_all_records<P: AsRef<Path>>(path: P) -> BTResult<Vec<Vec<u8>>> {
    RecordFileReader::open(path)?.collect()
}

/// Read every example of a file into memory.
pub fn read_all_examples<T, P>(path: P) -> BTResult<Vec<EncodedExample<T>>>
where
    T: TokenType,
    P: AsRef<Path>,
{
    RecordFileReader::open(path)?.examples().collect()
}
