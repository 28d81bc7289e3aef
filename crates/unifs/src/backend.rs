//! The primitive surface a storage adapter implements.

use crate::error::BackendError;
use crate::options::{OpenOptions, WriteOptions};
use crate::stats::{Props, Stats};
use crate::stream::{ReadStream, WriteStream};
use async_trait::async_trait;

/// Backend primitive result: failures are opaque, backend-native
/// errors. The core normalizes them into the canonical taxonomy.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// How a write stream is being opened, decided by the core's
/// existence check before the backend is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// The target is absent and will be created.
    Create,
    /// The target exists; content is replaced from position 0.
    Overwrite,
    /// The target exists; the cursor starts at the end.
    Append,
}

/// Minimal operations a storage adapter must provide. The core builds
/// the full contract (type checks, hooks, recursion, error taxonomy)
/// on top of these; primitives only move bytes and metadata.
///
/// Contract notes:
/// - paths arrive normalized (absolute, `'/'`-separated);
/// - `head` stats must carry `size` for files and omit it for
///   directories;
/// - `delete` removes a single node and may assume emptiness;
/// - `patch` receives only the fields the backend declared it can
///   persist.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Opaque backend-scoped root identifier, e.g. a root directory or
    /// bucket name.
    fn repository(&self) -> &str;

    /// Whether the backend has real directories. Flat key-value
    /// backends answer false and `mkcol` is never reached.
    fn supports_directories(&self) -> bool {
        true
    }

    fn can_patch_accessed(&self) -> bool {
        false
    }

    fn can_patch_created(&self) -> bool {
        false
    }

    fn can_patch_modified(&self) -> bool {
        true
    }

    async fn head(&self, path: &str) -> BackendResult<Stats>;

    /// Lists the immediate children of a directory as full paths.
    async fn list(&self, path: &str) -> BackendResult<Vec<String>>;

    async fn mkcol(&self, path: &str) -> BackendResult<()>;

    async fn delete(&self, path: &str) -> BackendResult<()>;

    async fn patch(&self, path: &str, props: &Props) -> BackendResult<()>;

    async fn open_read(
        &self,
        path: &str,
        options: &OpenOptions,
    ) -> BackendResult<Box<dyn ReadStream>>;

    async fn open_write(
        &self,
        path: &str,
        mode: WriteMode,
        options: &WriteOptions,
    ) -> BackendResult<Box<dyn WriteStream>>;
}
