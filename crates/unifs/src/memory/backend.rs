use super::stream::MemoryWriteStream;
use crate::backend::{Backend, BackendResult, WriteMode};
use crate::error::BackendError;
use crate::options::{OpenOptions, WriteOptions};
use crate::stats::{Props, Stats, now_millis};
use crate::stream::{BytesReadStream, ReadStream, WriteStream};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::{Error as IoError, ErrorKind};
use std::sync::Arc;
use tokio::sync::Mutex;

pub(super) type State = Arc<Mutex<BTreeMap<String, MemEntry>>>;

pub(super) enum MemContent {
    File(Bytes),
    Dir,
}

pub(super) struct MemEntry {
    pub content: MemContent,
    pub created: i64,
    pub modified: i64,
    pub accessed: Option<i64>,
    pub etc: BTreeMap<String, serde_json::Value>,
}

impl MemEntry {
    pub fn dir() -> Self {
        let now = now_millis();
        MemEntry {
            content: MemContent::Dir,
            created: now,
            modified: now,
            accessed: None,
            etc: BTreeMap::new(),
        }
    }

    pub fn file(data: Bytes) -> Self {
        let now = now_millis();
        MemEntry {
            content: MemContent::File(data),
            created: now,
            modified: now,
            accessed: None,
            etc: BTreeMap::new(),
        }
    }

    fn stats(&self) -> Stats {
        Stats {
            size: match &self.content {
                MemContent::File(data) => Some(data.len() as u64),
                MemContent::Dir => None,
            },
            created: Some(self.created),
            modified: Some(self.modified),
            accessed: self.accessed,
            deleted: None,
            etc: self.etc.clone(),
        }
    }
}

/// Tree held in a `BTreeMap` keyed by normalized path, so listings
/// come out sorted. Write streams buffer privately and publish on
/// close; readers opened meanwhile see the previous content.
pub struct MemoryBackend {
    repository: String,
    state: State,
}

impl MemoryBackend {
    pub fn new(repository: impl Into<String>) -> Self {
        let mut map = BTreeMap::new();
        map.insert("/".to_string(), MemEntry::dir());
        MemoryBackend {
            repository: repository.into(),
            state: Arc::new(Mutex::new(map)),
        }
    }
}

fn not_found(path: &str) -> BackendError {
    Box::new(IoError::new(ErrorKind::NotFound, format!("{path} not found")))
}

fn not_a_file(path: &str) -> BackendError {
    Box::new(IoError::other(format!("{path} is not a file")))
}

#[async_trait]
impl Backend for MemoryBackend {
    fn repository(&self) -> &str {
        &self.repository
    }

    fn can_patch_accessed(&self) -> bool {
        true
    }

    fn can_patch_created(&self) -> bool {
        true
    }

    async fn head(&self, path: &str) -> BackendResult<Stats> {
        let map = self.state.lock().await;
        match map.get(path) {
            Some(entry) => Ok(entry.stats()),
            None => Err(not_found(path)),
        }
    }

    async fn list(&self, path: &str) -> BackendResult<Vec<String>> {
        let map = self.state.lock().await;
        match map.get(path) {
            Some(entry) if matches!(entry.content, MemContent::Dir) => {}
            Some(_) => return Err(Box::new(IoError::other(format!("{path} is not a directory")))),
            None => return Err(not_found(path)),
        }
        let prefix = if path == "/" {
            "/".to_string()
        } else {
            format!("{path}/")
        };
        Ok(map
            .keys()
            .filter(|k| {
                k.len() > prefix.len()
                    && k.starts_with(&prefix)
                    && !k[prefix.len()..].contains('/')
            })
            .cloned()
            .collect())
    }

    async fn mkcol(&self, path: &str) -> BackendResult<()> {
        let mut map = self.state.lock().await;
        if map.contains_key(path) {
            return Err(Box::new(IoError::new(
                ErrorKind::AlreadyExists,
                format!("{path} already exists"),
            )));
        }
        map.insert(path.to_string(), MemEntry::dir());
        Ok(())
    }

    async fn delete(&self, path: &str) -> BackendResult<()> {
        let mut map = self.state.lock().await;
        if path == "/" {
            return Err(Box::new(IoError::new(
                ErrorKind::PermissionDenied,
                "cannot delete the root",
            )));
        }
        match map.get(path) {
            Some(entry) if matches!(entry.content, MemContent::Dir) => {
                let prefix = format!("{path}/");
                if map.keys().any(|k| k.starts_with(&prefix)) {
                    return Err(Box::new(IoError::other(format!("{path} is not empty"))));
                }
            }
            Some(_) => {}
            None => return Err(not_found(path)),
        }
        map.remove(path);
        Ok(())
    }

    async fn patch(&self, path: &str, props: &Props) -> BackendResult<()> {
        let mut map = self.state.lock().await;
        let entry = map.get_mut(path).ok_or_else(|| not_found(path))?;
        if let Some(created) = props.created {
            entry.created = created;
        }
        if let Some(modified) = props.modified {
            entry.modified = modified;
        }
        if let Some(accessed) = props.accessed {
            entry.accessed = Some(accessed);
        }
        entry
            .etc
            .extend(props.etc.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(())
    }

    async fn open_read(
        &self,
        path: &str,
        _options: &OpenOptions,
    ) -> BackendResult<Box<dyn ReadStream>> {
        let mut map = self.state.lock().await;
        let entry = map.get_mut(path).ok_or_else(|| not_found(path))?;
        let MemContent::File(data) = &entry.content else {
            return Err(not_a_file(path));
        };
        // Snapshot read: the stream stays consistent if the entry is
        // rewritten while open.
        let data = data.clone();
        entry.accessed = Some(now_millis());
        Ok(Box::new(BytesReadStream::new(data)))
    }

    async fn open_write(
        &self,
        path: &str,
        mode: WriteMode,
        _options: &WriteOptions,
    ) -> BackendResult<Box<dyn WriteStream>> {
        let mut map = self.state.lock().await;
        let (buf, pos) = match mode {
            WriteMode::Create => {
                // The entry becomes visible (empty) at open time;
                // content lands when the stream closes.
                map.insert(path.to_string(), MemEntry::file(Bytes::new()));
                (Vec::new(), 0)
            }
            WriteMode::Overwrite | WriteMode::Append => {
                let entry = map.get(path).ok_or_else(|| not_found(path))?;
                let MemContent::File(data) = &entry.content else {
                    return Err(not_a_file(path));
                };
                let buf = data.to_vec();
                let pos = if mode == WriteMode::Append {
                    buf.len() as u64
                } else {
                    0
                };
                (buf, pos)
            }
        };
        Ok(Box::new(MemoryWriteStream::new(
            self.state.clone(),
            path.to_string(),
            buf,
            pos,
        )))
    }
}
