//! Lazy, fixed-size line batches over a legacy-encoded text file.

use encoding_rs::{EUC_KR, Encoding};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::error::LoadError;

pub type Chunk = Vec<String>;

/// Resolves a WHATWG encoding label. `cp949` is accepted as an alias for the
/// Korean code page, which `encoding_rs` exposes as `EUC-KR`.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding, LoadError> {
    let label = label.trim();
    let encoding = Encoding::for_label(label.as_bytes())
        .or_else(|| label.eq_ignore_ascii_case("cp949").then_some(EUC_KR))
        .ok_or_else(|| LoadError::UnknownEncoding {
            label: label.to_string(),
        })?;
    if !encoding.is_ascii_compatible() {
        return Err(LoadError::UnsupportedEncoding {
            label: label.to_string(),
        });
    }
    Ok(encoding)
}

/// Yields chunks of at most `chunk_size` decoded lines. The first line of the
/// source is a header and is always discarded.
///
/// The iterator owns the reader; once it yields `None` or an error it is
/// finished and cannot be restarted.
pub struct ChunkReader<R> {
    reader: R,
    path: PathBuf,
    encoding: &'static Encoding,
    chunk_size: usize,
    line_number: u64,
    header_skipped: bool,
    finished: bool,
    buf: Vec<u8>,
}

impl ChunkReader<BufReader<File>> {
    pub fn open(path: &Path, encoding_label: &str, chunk_size: usize) -> Result<Self, LoadError> {
        let encoding = resolve_encoding(encoding_label)?;
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(BufReader::new(file), path, encoding, chunk_size)
    }
}

impl<R: BufRead> ChunkReader<R> {
    /// `path` is only used to label errors.
    pub fn new(
        reader: R,
        path: &Path,
        encoding: &'static Encoding,
        chunk_size: usize,
    ) -> Result<Self, LoadError> {
        if chunk_size == 0 {
            return Err(LoadError::InvalidChunkSize);
        }
        Ok(Self {
            reader,
            path: path.to_path_buf(),
            encoding,
            chunk_size,
            line_number: 0,
            header_skipped: false,
            finished: false,
            buf: Vec::new(),
        })
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    fn next_line(&mut self) -> Result<Option<String>, LoadError> {
        self.buf.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .map_err(|source| LoadError::Io {
                path: self.path.clone(),
                source,
            })?;
        if read == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        let mut end = self.buf.len();
        if end > 0 && self.buf[end - 1] == b'\n' {
            end -= 1;
        }
        if end > 0 && self.buf[end - 1] == b'\r' {
            end -= 1;
        }

        let text = self
            .encoding
            .decode_without_bom_handling_and_without_replacement(&self.buf[..end])
            .ok_or_else(|| LoadError::Decoding {
                path: self.path.clone(),
                line: self.line_number,
                encoding: self.encoding.name(),
            })?;
        Ok(Some(text.into_owned()))
    }

    fn next_chunk(&mut self) -> Result<Option<Chunk>, LoadError> {
        if !self.header_skipped {
            self.header_skipped = true;
            if self.next_line()?.is_none() {
                return Ok(None);
            }
        }

        let mut lines = Vec::with_capacity(self.chunk_size);
        while lines.len() < self.chunk_size {
            match self.next_line()? {
                Some(line) => lines.push(line),
                None => break,
            }
        }
        Ok((!lines.is_empty()).then_some(lines))
    }
}

impl<R: BufRead> Iterator for ChunkReader<R> {
    type Item = Result<Chunk, LoadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_chunk() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

impl<R: BufRead> std::iter::FusedIterator for ChunkReader<R> {}
