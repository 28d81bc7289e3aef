//! Sequential, position-tracked I/O cursors over file content.
//!
//! Streams are scoped resources: every stream obtained must be closed
//! on all exit paths. `close()` is idempotent and safe to call even if
//! no I/O occurred.

use crate::DEFAULT_BUFFER_SIZE;
use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::io::SeekFrom;

/// Read cursor over a file's content.
#[async_trait]
pub trait ReadStream: Send {
    /// Reads the next chunk, at most `size_hint` bytes (implementation
    /// default when `None`). Returns `None` at end of stream.
    async fn read(&mut self, size_hint: Option<usize>) -> Result<Option<Bytes>>;

    /// Moves the cursor. The target position is clamped into
    /// `[0, size]`. Returns the new position.
    async fn seek(&mut self, pos: SeekFrom) -> Result<u64>;

    fn position(&self) -> u64;

    /// Releases backend resources. Idempotent.
    async fn close(&mut self) -> Result<()>;
}

/// Write cursor over a file's content.
#[async_trait]
pub trait WriteStream: Send {
    /// Writes a chunk at the current position, advancing it by the
    /// returned byte count.
    async fn write(&mut self, chunk: &[u8]) -> Result<usize>;

    /// Sets the content length. A position beyond the new size is
    /// clamped down to it.
    async fn truncate(&mut self, size: u64) -> Result<()>;

    fn position(&self) -> u64;

    /// Flushes and releases backend resources. Idempotent.
    async fn close(&mut self) -> Result<()>;
}

/// In-memory [`ReadStream`] over a byte snapshot. Used by the memory
/// backend and by hooks that short-circuit a read open.
pub struct BytesReadStream {
    data: Bytes,
    pos: u64,
}

impl BytesReadStream {
    pub fn new<B: Into<Bytes>>(data: B) -> Self {
        BytesReadStream {
            data: data.into(),
            pos: 0,
        }
    }
}

#[async_trait]
impl ReadStream for BytesReadStream {
    async fn read(&mut self, size_hint: Option<usize>) -> Result<Option<Bytes>> {
        let len = self.data.len() as u64;
        if self.pos >= len {
            return Ok(None);
        }
        let want = size_hint.unwrap_or(DEFAULT_BUFFER_SIZE).max(1);
        let start = self.pos as usize;
        let end = (start + want).min(self.data.len());
        self.pos = end as u64;
        Ok(Some(self.data.slice(start..end)))
    }

    async fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        let len = self.data.len() as i64;
        let target = match pos {
            SeekFrom::Start(n) => n as i64,
            SeekFrom::Current(n) => self.pos as i64 + n,
            SeekFrom::End(n) => len + n,
        };
        self.pos = target.clamp(0, len) as u64;
        Ok(self.pos)
    }

    fn position(&self) -> u64 {
        self.pos
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Drives every byte from `reader` into `writer` through a bounded
/// buffer, so peak memory stays at `buffer_size` regardless of file
/// size. Returns the byte count transferred. Does not close either
/// stream.
pub async fn pump(
    reader: &mut dyn ReadStream,
    writer: &mut dyn WriteStream,
    buffer_size: usize,
) -> Result<u64> {
    let buffer_size = buffer_size.max(1);
    let mut total = 0u64;
    while let Some(chunk) = reader.read(Some(buffer_size)).await? {
        let mut off = 0;
        while off < chunk.len() {
            let n = writer.write(&chunk[off..]).await?;
            if n == 0 {
                return Err(Error::no_modification_allowed(
                    "",
                    "write stream accepted zero bytes",
                ));
            }
            off += n;
        }
        total += chunk.len() as u64;
    }
    Ok(total)
}
