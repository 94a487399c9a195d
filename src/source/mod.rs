// ABOUTME: Transparent dump file access with compression sniffing
// ABOUTME: Provides offset-tracking readers over plain, gzip, and bzip2 dumps

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

/// Compression format of a dump file, detected from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Bzip2,
}

impl Compression {
    /// Detect compression from a file extension (`.gz`, `.bz2`, else plain)
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("gz") => Compression::Gzip,
            Some("bz2") => Compression::Bzip2,
            _ => Compression::None,
        }
    }
}

/// A dump file that can hand out fresh decompressed readers
///
/// The source itself is cheap to clone; each [`DumpReader`] it opens is an
/// independent forward stream over the decompressed bytes. All byte offsets
/// used throughout the crate refer to the decompressed stream, never to the
/// on-disk compressed representation.
#[derive(Debug, Clone)]
pub struct DumpSource {
    path: PathBuf,
    compression: Compression,
}

impl DumpSource {
    /// Open a dump file, verifying it exists and is readable
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or cannot be opened. A
    /// corrupt compressed stream is only detected once reading starts.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        File::open(&path)
            .with_context(|| format!("Failed to open dump file '{}'", path.display()))?;

        let compression = Compression::from_path(&path);
        tracing::debug!(
            "Opened dump source '{}' (compression: {:?})",
            path.display(),
            compression
        );

        Ok(Self { path, compression })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Open a fresh reader positioned at the start of the decompressed stream
    pub fn reader(&self) -> Result<DumpReader> {
        Ok(DumpReader {
            inner: self.raw_reader()?,
            source: self.clone(),
            offset: 0,
        })
    }

    /// Count the lines in the dump, used for progress display
    ///
    /// This is a full extra pass over the (decompressed) stream, the same
    /// trade-off the progress bar needs anyway to know its length.
    pub fn line_count(&self) -> Result<u64> {
        let mut reader = self.raw_reader()?;
        let mut buf = Vec::new();
        let mut count = 0u64;
        loop {
            buf.clear();
            let n = reader
                .read_until(b'\n', &mut buf)
                .with_context(|| format!("Failed to read dump '{}'", self.path.display()))?;
            if n == 0 {
                break;
            }
            count += 1;
        }
        Ok(count)
    }

    fn raw_reader(&self) -> Result<BufReader<Box<dyn Read>>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open dump file '{}'", self.path.display()))?;
        let reader: Box<dyn Read> = match self.compression {
            Compression::Gzip => Box::new(flate2::read::GzDecoder::new(file)),
            Compression::Bzip2 => Box::new(bzip2::read::BzDecoder::new(file)),
            Compression::None => Box::new(file),
        };
        Ok(BufReader::with_capacity(256 * 1024, reader))
    }
}

/// A line-oriented reader over the decompressed dump stream
///
/// Tracks the current byte offset so callers can record where each line
/// begins before consuming it, and can later re-extract exact byte spans.
///
/// Seeking backward on a compressed source reopens the file and decompresses
/// from the beginning up to the target offset; the formats involved have no
/// random access, so this is linear in the target offset. Replay keeps its
/// seeks forward-only by visiting ranges in file order, which makes the
/// reopen path the exception rather than the rule.
pub struct DumpReader {
    inner: BufReader<Box<dyn Read>>,
    source: DumpSource,
    offset: u64,
}

impl DumpReader {
    /// Current byte offset into the decompressed stream
    pub fn tell(&self) -> u64 {
        self.offset
    }

    /// Read one line (including its terminator) into `buf`
    ///
    /// Returns the number of bytes consumed; 0 means end of stream. The
    /// buffer is cleared first. Lines are raw bytes so that dumps with
    /// non-UTF-8 payloads still index with correct offsets.
    pub fn read_line(&mut self, buf: &mut Vec<u8>) -> Result<usize> {
        buf.clear();
        let n = self
            .inner
            .read_until(b'\n', buf)
            .with_context(|| format!("Failed to read dump '{}'", self.source.path().display()))?;
        self.offset += n as u64;
        Ok(n)
    }

    /// Position the reader at `offset` in the decompressed stream
    ///
    /// Forward seeks skip-read from the current position. Backward seeks
    /// reopen the stream and skip-read from the start.
    pub fn seek_to(&mut self, offset: u64) -> Result<()> {
        if offset < self.offset {
            tracing::debug!(
                "Backward seek to {} from {}; re-reading '{}' from the start",
                offset,
                self.offset,
                self.source.path().display()
            );
            self.inner = self.source.raw_reader()?;
            self.offset = 0;
        }

        let to_skip = offset - self.offset;
        if to_skip > 0 {
            let skipped = io::copy(&mut self.inner.by_ref().take(to_skip), &mut io::sink())
                .with_context(|| {
                    format!("Failed to seek in dump '{}'", self.source.path().display())
                })?;
            if skipped < to_skip {
                bail!(
                    "Dump '{}' ended at offset {} while seeking to {}",
                    self.source.path().display(),
                    self.offset + skipped,
                    offset
                );
            }
            self.offset = offset;
        }
        Ok(())
    }

    /// Re-extract the exact byte span `[start, start + len)`
    ///
    /// Returned as raw bytes: dump payloads are not guaranteed to be UTF-8
    /// (latin-1 text columns, binary blobs), and replay must submit the
    /// statement byte-for-byte as it appeared in the dump.
    pub fn read_span(&mut self, start: u64, len: u64) -> Result<Vec<u8>> {
        self.seek_to(start)?;

        let mut buf = Vec::with_capacity(len as usize);
        self.inner
            .by_ref()
            .take(len)
            .read_to_end(&mut buf)
            .with_context(|| format!("Failed to read dump '{}'", self.source.path().display()))?;
        if (buf.len() as u64) < len {
            bail!(
                "Dump '{}' ended inside span [{}, {})",
                self.source.path().display(),
                start,
                start + len
            );
        }
        self.offset = start + len;

        Ok(buf)
    }
}
