use super::backend::{MemContent, MemEntry, State};
use crate::error::Result;
use crate::stats::now_millis;
use crate::stream::WriteStream;
use async_trait::async_trait;
use bytes::Bytes;

/// Write cursor over a private buffer. Nothing is shared until
/// `close`, which publishes the buffer as the entry's new content in
/// one step.
pub(super) struct MemoryWriteStream {
    state: State,
    path: String,
    buf: Vec<u8>,
    pos: u64,
    dirty: bool,
    closed: bool,
}

impl MemoryWriteStream {
    pub fn new(state: State, path: String, buf: Vec<u8>, pos: u64) -> Self {
        MemoryWriteStream {
            state,
            path,
            buf,
            pos,
            dirty: false,
            closed: false,
        }
    }
}

#[async_trait]
impl WriteStream for MemoryWriteStream {
    async fn write(&mut self, chunk: &[u8]) -> Result<usize> {
        let start = self.pos as usize;
        let end = start + chunk.len();
        if end > self.buf.len() {
            self.buf.resize(end, 0);
        }
        self.buf[start..end].copy_from_slice(chunk);
        self.pos = end as u64;
        self.dirty = true;
        Ok(chunk.len())
    }

    async fn truncate(&mut self, size: u64) -> Result<()> {
        self.buf.resize(size as usize, 0);
        if self.pos > size {
            self.pos = size;
        }
        self.dirty = true;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.pos
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if !self.dirty {
            return Ok(());
        }
        let data = Bytes::from(std::mem::take(&mut self.buf));
        let mut map = self.state.lock().await;
        match map.get_mut(&self.path) {
            Some(entry) => {
                entry.content = MemContent::File(data);
                entry.modified = now_millis();
            }
            // Deleted while the stream was open: the close wins and
            // the entry reappears with the written content.
            None => {
                map.insert(self.path.clone(), MemEntry::file(data));
            }
        }
        Ok(())
    }
}
