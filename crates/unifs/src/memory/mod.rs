//! In-memory backend, for tests and as the reference adapter.

mod backend;
mod stream;

pub use backend::MemoryBackend;

use crate::fs::FileSystem;
use crate::options::FsConfig;
use std::sync::Arc;

/// A fresh filesystem over an empty in-memory tree.
pub fn new_fs() -> FileSystem {
    FileSystem::new(Arc::new(MemoryBackend::new("memory")))
}

pub fn new_fs_with_config(config: FsConfig) -> FileSystem {
    FileSystem::with_config(Arc::new(MemoryBackend::new("memory")), config)
}
