//! Before/after interception points for every primitive operation.
//!
//! A hook lets cross-cutting behavior (caching, auditing, access
//! control) observe or override operations without the backend or the
//! caller being aware. One immutable `Arc<dyn Hook>` is passed at
//! `FileSystem` construction and threaded by reference to every entry
//! the filesystem creates.
//!
//! Protocol per operation: if a `before_*` method returns a non-null
//! result (or `true` for unit operations), that result is the entire
//! outcome — the backend primitive is never called and no `after_*`
//! fires. Otherwise the primitive runs, and on success the matching
//! `after_*` is invoked as a detached task: its failure is logged and
//! never reaches the caller, and it always observes the state the
//! primitive produced. Call-site options carry an `ignore_hook` flag
//! to opt out of both sides.

use crate::error::Result;
use crate::options::{DeleteOptions, HeadOptions, ListOptions, MkcolOptions, OpenOptions, WriteOptions};
use crate::stats::{Props, Stats};
use crate::stream::{ReadStream, WriteStream};
use async_trait::async_trait;

#[async_trait]
pub trait Hook: Send + Sync {
    async fn before_head(&self, _path: &str, _options: &HeadOptions) -> Result<Option<Stats>> {
        Ok(None)
    }

    async fn before_list(
        &self,
        _path: &str,
        _options: &ListOptions,
    ) -> Result<Option<Vec<String>>> {
        Ok(None)
    }

    /// Returns true when the hook handled the creation itself.
    async fn before_mkcol(&self, _path: &str, _options: &MkcolOptions) -> Result<bool> {
        Ok(false)
    }

    /// Returns true when the hook handled the deletion itself.
    async fn before_delete(&self, _path: &str, _options: &DeleteOptions) -> Result<bool> {
        Ok(false)
    }

    /// Returns true when the hook handled the patch itself.
    async fn before_patch(&self, _path: &str, _props: &Props) -> Result<bool> {
        Ok(false)
    }

    /// A returned stream replaces the backend's entirely; see
    /// [`crate::stream::BytesReadStream`] for supplying cached bytes.
    async fn before_open_read(
        &self,
        _path: &str,
        _options: &OpenOptions,
    ) -> Result<Option<Box<dyn ReadStream>>> {
        Ok(None)
    }

    async fn before_open_write(
        &self,
        _path: &str,
        _options: &WriteOptions,
    ) -> Result<Option<Box<dyn WriteStream>>> {
        Ok(None)
    }

    async fn after_head(&self, _path: &str, _stats: &Stats) -> Result<()> {
        Ok(())
    }

    async fn after_list(&self, _path: &str, _children: &[String]) -> Result<()> {
        Ok(())
    }

    async fn after_mkcol(&self, _path: &str) -> Result<()> {
        Ok(())
    }

    async fn after_delete(&self, _path: &str) -> Result<()> {
        Ok(())
    }

    async fn after_patch(&self, _path: &str, _props: &Props) -> Result<()> {
        Ok(())
    }

    async fn after_open_read(&self, _path: &str) -> Result<()> {
        Ok(())
    }

    /// Fired when a write stream opened in create mode closes with at
    /// least one mutating call.
    async fn after_create(&self, _path: &str) -> Result<()> {
        Ok(())
    }

    /// Fired when a write stream opened over existing content closes
    /// with at least one mutating call.
    async fn after_update(&self, _path: &str) -> Result<()> {
        Ok(())
    }
}
