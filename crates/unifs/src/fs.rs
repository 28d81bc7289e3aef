//! Root factory and dispatcher: routes every operation through the
//! hook pipeline, delegates to backend primitives, and normalizes
//! backend failures into the canonical taxonomy.

use crate::backend::{Backend, WriteMode};
use crate::entry::{Dir, File};
use crate::error::{Error, NodeFailure, Result};
use crate::hook::Hook;
use crate::options::{
    CopyOptions, DeleteOptions, EntryKind, FsConfig, HeadOptions, ListOptions, MkcolOptions,
    MoveOptions, OpenOptions, WriteOptions,
};
use crate::path;
use crate::stats::{Props, Stats};
use crate::stream::{ReadStream, WriteStream};
use crate::xmit::{self, XmitError};
use async_trait::async_trait;
use diagnostics::log_warn;
use futures::future::BoxFuture;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// A filesystem over one storage root. Cheap to clone; all clones
/// share the backend and configuration.
///
/// Stateless between calls: entries carry no cached state, and every
/// stat re-queries the backend unless a hook intercepts it.
#[derive(Clone)]
pub struct FileSystem {
    inner: Arc<Inner>,
}

struct Inner {
    backend: Arc<dyn Backend>,
    config: FsConfig,
}

impl FileSystem {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_config(backend, FsConfig::default())
    }

    pub fn with_config(backend: Arc<dyn Backend>, config: FsConfig) -> Self {
        FileSystem {
            inner: Arc::new(Inner { backend, config }),
        }
    }

    /// The backend-scoped root identifier.
    pub fn repository(&self) -> &str {
        self.inner.backend.repository()
    }

    pub fn config(&self) -> &FsConfig {
        &self.inner.config
    }

    /// Typed handle to a file path. No I/O: existence is checked
    /// lazily on first operation, so a handle may point at a path that
    /// is about to be created.
    pub fn get_file(&self, fpath: &str) -> Result<File> {
        Ok(File::new(self.clone(), path::normalize(fpath)?))
    }

    /// Typed handle to a directory path. No I/O.
    pub fn get_directory(&self, dpath: &str) -> Result<Dir> {
        Ok(Dir::new(self.clone(), path::normalize(dpath)?))
    }

    // --- head ---

    pub async fn head(&self, hpath: &str) -> Result<Stats> {
        let options = self.inner.config.head.clone();
        self.head_with(hpath, &options).await
    }

    pub async fn head_with(&self, hpath: &str, options: &HeadOptions) -> Result<Stats> {
        let hpath = path::normalize(hpath)?;
        if let Some(hook) = self.hook(options.ignore_hook)
            && let Some(stats) = hook.before_head(&hpath, options).await?
        {
            check_kind(&hpath, &stats, options.kind)?;
            return Ok(stats);
        }
        let stats = self.stat_raw(&hpath).await?;
        check_kind(&hpath, &stats, options.kind)?;
        if let Some(hook) = self.hook(options.ignore_hook) {
            let hpath = hpath.clone();
            let stats = stats.clone();
            tokio::spawn(async move {
                if let Err(err) = hook.after_head(&hpath, &stats).await {
                    warn_after("head", &hpath, &err);
                }
            });
        }
        Ok(stats)
    }

    /// Alias for [`FileSystem::head`].
    pub async fn stat(&self, hpath: &str) -> Result<Stats> {
        self.head(hpath).await
    }

    pub async fn exists(&self, hpath: &str) -> bool {
        self.head_with(hpath, &HeadOptions::default()).await.is_ok()
    }

    // --- list ---

    pub async fn list(&self, dpath: &str) -> Result<Vec<String>> {
        let options = self.inner.config.list.clone();
        self.list_with(dpath, &options).await
    }

    pub async fn list_with(&self, dpath: &str, options: &ListOptions) -> Result<Vec<String>> {
        let dpath = path::normalize(dpath)?;
        if let Some(hook) = self.hook(options.ignore_hook)
            && let Some(children) = hook.before_list(&dpath, options).await?
        {
            return Ok(children);
        }
        let stats = self.stat_raw(&dpath).await?;
        if stats.is_file() {
            return Err(Error::type_mismatch(&dpath, "not a directory"));
        }
        let children = self.list_raw(&dpath).await?;
        if let Some(hook) = self.hook(options.ignore_hook) {
            let dpath = dpath.clone();
            let children = children.clone();
            tokio::spawn(async move {
                if let Err(err) = hook.after_list(&dpath, &children).await {
                    warn_after("list", &dpath, &err);
                }
            });
        }
        Ok(children)
    }

    /// Alias for [`FileSystem::list`].
    pub async fn readdir(&self, dpath: &str) -> Result<Vec<String>> {
        self.list(dpath).await
    }

    /// Alias for [`FileSystem::list`].
    pub async fn ls(&self, dpath: &str) -> Result<Vec<String>> {
        self.list(dpath).await
    }

    // --- mkcol ---

    pub async fn mkcol(&self, dpath: &str) -> Result<()> {
        let options = self.inner.config.mkcol.clone();
        self.mkcol_with(dpath, &options).await
    }

    pub async fn mkcol_with(&self, dpath: &str, options: &MkcolOptions) -> Result<()> {
        let dpath = path::normalize(dpath)?;
        if !self.inner.backend.supports_directories() {
            return Err(Error::not_supported(&dpath, "backend has no directories"));
        }
        if let Some(hook) = self.hook(options.ignore_hook)
            && hook.before_mkcol(&dpath, options).await?
        {
            return Ok(());
        }
        match self.stat_raw(&dpath).await {
            Ok(_) => return Err(Error::path_exists(&dpath)),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }
        if let Some(parent) = path::dirname(&dpath) {
            match self.stat_raw(&parent).await {
                Ok(s) if s.is_dir() => {}
                Ok(_) => return Err(Error::type_mismatch(&parent, "parent is not a directory")),
                Err(e) if e.is_not_found() => {
                    if options.recursive {
                        self.make_parents(&parent).await?;
                    } else {
                        return Err(Error::not_found(&parent));
                    }
                }
                Err(e) => return Err(e),
            }
        }
        self.inner
            .backend
            .mkcol(&dpath)
            .await
            .map_err(|e| Error::normalize_write(&dpath, e))?;
        if let Some(hook) = self.hook(options.ignore_hook) {
            let dpath = dpath.clone();
            tokio::spawn(async move {
                if let Err(err) = hook.after_mkcol(&dpath).await {
                    warn_after("mkcol", &dpath, &err);
                }
            });
        }
        Ok(())
    }

    /// Alias for [`FileSystem::mkcol`].
    pub async fn mkdir(&self, dpath: &str) -> Result<()> {
        self.mkcol(dpath).await
    }

    /// Creates the directory chain from the root down to `dpath`,
    /// skipping ancestors that already exist.
    async fn make_parents(&self, dpath: &str) -> Result<()> {
        let mut missing = vec![dpath.to_string()];
        let mut cursor = dpath.to_string();
        while let Some(parent) = path::dirname(&cursor) {
            match self.stat_raw(&parent).await {
                Ok(s) if s.is_dir() => break,
                Ok(_) => {
                    return Err(Error::type_mismatch(&parent, "ancestor is not a directory"));
                }
                Err(e) if e.is_not_found() => {
                    missing.push(parent.clone());
                    cursor = parent;
                }
                Err(e) => return Err(e),
            }
        }
        for dir in missing.iter().rev() {
            self.inner
                .backend
                .mkcol(dir)
                .await
                .map_err(|e| Error::normalize_write(dir, e))?;
        }
        Ok(())
    }

    // --- delete ---

    /// Deletes an entry. Recursive tree deletion accumulates per-node
    /// failures into the returned list instead of aborting siblings;
    /// an empty list means every node was removed.
    pub async fn delete(&self, dpath: &str) -> Result<Vec<NodeFailure>> {
        let options = self.inner.config.delete.clone();
        self.delete_with(dpath, &options).await
    }

    pub async fn delete_with(
        &self,
        dpath: &str,
        options: &DeleteOptions,
    ) -> Result<Vec<NodeFailure>> {
        let dpath = path::normalize(dpath)?;
        let mut failures = Vec::new();
        if let Err(error) = self.delete_rec(dpath.clone(), options, &mut failures).await {
            if options.force {
                failures.push(NodeFailure { path: dpath, error });
            } else {
                return Err(error);
            }
        }
        Ok(failures)
    }

    /// Alias for [`FileSystem::delete`].
    pub async fn rm(&self, dpath: &str) -> Result<Vec<NodeFailure>> {
        self.delete(dpath).await
    }

    fn delete_rec<'a>(
        &'a self,
        dpath: String,
        options: &'a DeleteOptions,
        failures: &'a mut Vec<NodeFailure>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if let Some(hook) = self.hook(options.ignore_hook)
                && hook.before_delete(&dpath, options).await?
            {
                return Ok(());
            }
            let stats = match self.stat_raw(&dpath).await {
                Ok(s) => s,
                Err(e) if e.is_not_found() && options.force => return Ok(()),
                Err(e) => return Err(e),
            };
            if stats.is_dir() {
                let children = self.list_raw(&dpath).await?;
                if !children.is_empty() && !options.recursive {
                    return Err(Error::invalid_modification(&dpath, "directory not empty"));
                }
                for child in children {
                    if let Err(error) = self.delete_rec(child.clone(), options, failures).await {
                        if options.force {
                            failures.push(NodeFailure { path: child, error });
                        } else {
                            return Err(error);
                        }
                    }
                }
            }
            self.inner
                .backend
                .delete(&dpath)
                .await
                .map_err(|e| Error::normalize_write(&dpath, e))?;
            if let Some(hook) = self.hook(options.ignore_hook) {
                let dpath = dpath.clone();
                tokio::spawn(async move {
                    if let Err(err) = hook.after_delete(&dpath).await {
                        warn_after("delete", &dpath, &err);
                    }
                });
            }
            Ok(())
        })
    }

    // --- patch ---

    /// Patches entry metadata. Fields the backend cannot persist are
    /// silently dropped (with a diagnostic) rather than failing;
    /// partial metadata support is expected across backends.
    pub async fn patch(&self, ppath: &str, props: &Props) -> Result<()> {
        let ppath = path::normalize(ppath)?;
        if props.size.is_some() {
            return Err(Error::invalid_modification(&ppath, "size is derived"));
        }
        // Existence and kind are checked before consulting the hook so
        // a patch on a missing path always reports NotFound.
        let _ = self.stat_raw(&ppath).await?;
        if let Some(hook) = self.hook(false)
            && hook.before_patch(&ppath, props).await?
        {
            return Ok(());
        }
        let props = self.strip_unsupported(&ppath, props);
        self.inner
            .backend
            .patch(&ppath, &props)
            .await
            .map_err(|e| Error::normalize_write(&ppath, e))?;
        if let Some(hook) = self.hook(false) {
            let ppath = ppath.clone();
            tokio::spawn(async move {
                if let Err(err) = hook.after_patch(&ppath, &props).await {
                    warn_after("patch", &ppath, &err);
                }
            });
        }
        Ok(())
    }

    fn strip_unsupported(&self, ppath: &str, props: &Props) -> Props {
        let backend = &self.inner.backend;
        let mut props = props.clone();
        if props.accessed.is_some() && !backend.can_patch_accessed() {
            log_warn!("dropping accessed time patch for {ppath}: backend cannot persist it", ppath: ppath);
            props.accessed = None;
        }
        if props.created.is_some() && !backend.can_patch_created() {
            log_warn!("dropping created time patch for {ppath}: backend cannot persist it", ppath: ppath);
            props.created = None;
        }
        if props.modified.is_some() && !backend.can_patch_modified() {
            log_warn!("dropping modified time patch for {ppath}: backend cannot persist it", ppath: ppath);
            props.modified = None;
        }
        props
    }

    // --- streams ---

    pub async fn open_read(&self, fpath: &str) -> Result<Box<dyn ReadStream>> {
        let options = self.inner.config.open.clone();
        self.open_read_with(fpath, &options).await
    }

    pub async fn open_read_with(
        &self,
        fpath: &str,
        options: &OpenOptions,
    ) -> Result<Box<dyn ReadStream>> {
        let fpath = path::normalize(fpath)?;
        if let Some(hook) = self.hook(options.ignore_hook)
            && let Some(stream) = hook.before_open_read(&fpath, options).await?
        {
            return Ok(stream);
        }
        let stats = self.stat_raw(&fpath).await?;
        if stats.is_dir() {
            return Err(Error::type_mismatch(&fpath, "not a file"));
        }
        let stream = self
            .inner
            .backend
            .open_read(&fpath, options)
            .await
            .map_err(|e| Error::normalize_read(&fpath, e))?;
        if let Some(hook) = self.hook(options.ignore_hook) {
            let fpath = fpath.clone();
            tokio::spawn(async move {
                if let Err(err) = hook.after_open_read(&fpath).await {
                    warn_after("open_read", &fpath, &err);
                }
            });
        }
        Ok(stream)
    }

    pub async fn open_write(&self, fpath: &str) -> Result<Box<dyn WriteStream>> {
        let options = self.inner.config.write.clone();
        self.open_write_with(fpath, &options).await
    }

    /// Opens a write stream. Create-vs-overwrite is decided by an
    /// existence check here, not by the backend; see
    /// [`WriteOptions::create`] for the strict modes.
    pub async fn open_write_with(
        &self,
        fpath: &str,
        options: &WriteOptions,
    ) -> Result<Box<dyn WriteStream>> {
        let fpath = path::normalize(fpath)?;
        if let Some(hook) = self.hook(options.ignore_hook)
            && let Some(stream) = hook.before_open_write(&fpath, options).await?
        {
            return Ok(stream);
        }
        let mode = match self.stat_raw(&fpath).await {
            Ok(stats) => {
                if stats.is_dir() {
                    return Err(Error::type_mismatch(&fpath, "not a file"));
                }
                if options.create == Some(true) {
                    return Err(Error::path_exists(&fpath));
                }
                if options.append {
                    WriteMode::Append
                } else {
                    WriteMode::Overwrite
                }
            }
            Err(e) if e.is_not_found() => {
                if options.create == Some(false) {
                    return Err(e);
                }
                if let Some(parent) = path::dirname(&fpath) {
                    match self.stat_raw(&parent).await {
                        Ok(s) if s.is_dir() => {}
                        Ok(_) => {
                            return Err(Error::type_mismatch(
                                &parent,
                                "parent is not a directory",
                            ));
                        }
                        Err(e) => return Err(e),
                    }
                }
                WriteMode::Create
            }
            Err(e) => return Err(e),
        };
        let inner = self
            .inner
            .backend
            .open_write(&fpath, mode, options)
            .await
            .map_err(|e| Error::normalize_write(&fpath, e))?;
        Ok(Box::new(HookedWriteStream {
            inner,
            hook: self.hook(options.ignore_hook),
            path: fpath,
            create: mode == WriteMode::Create,
            changed: false,
            closed: false,
        }))
    }

    // --- whole-file conveniences (stream-driven, bounded memory) ---

    pub async fn read(&self, fpath: &str) -> Result<Vec<u8>> {
        let options = self.inner.config.open.clone();
        self.read_with(fpath, &options).await
    }

    pub async fn read_with(&self, fpath: &str, options: &OpenOptions) -> Result<Vec<u8>> {
        let mut stream = self.open_read_with(fpath, options).await?;
        let mut out = Vec::new();
        let result = loop {
            match stream.read(Some(options.buffer_size)).await {
                Ok(Some(chunk)) => out.extend_from_slice(&chunk),
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        let closed = stream.close().await;
        result?;
        closed?;
        Ok(out)
    }

    pub async fn write(&self, fpath: &str, content: &[u8]) -> Result<()> {
        let options = self.inner.config.write.clone();
        self.write_with(fpath, content, &options).await
    }

    pub async fn write_with(
        &self,
        fpath: &str,
        content: &[u8],
        options: &WriteOptions,
    ) -> Result<()> {
        let mut stream = self.open_write_with(fpath, options).await?;
        let result = write_all(stream.as_mut(), content, options.buffer_size).await;
        let truncated = match (&result, options.append) {
            // Full overwrite replaces the previous content entirely.
            (Ok(()), false) => {
                let end = stream.position();
                stream.truncate(end).await
            }
            _ => Ok(()),
        };
        let closed = stream.close().await;
        result?;
        truncated?;
        closed?;
        Ok(())
    }

    /// SHA-256 of the file content as lowercase hex, computed by
    /// streaming through a bounded buffer.
    pub async fn hash(&self, fpath: &str) -> Result<String> {
        let options = self.inner.config.open.clone();
        self.hash_with(fpath, &options).await
    }

    pub async fn hash_with(&self, fpath: &str, options: &OpenOptions) -> Result<String> {
        let mut stream = self.open_read_with(fpath, options).await?;
        let mut hasher = Sha256::new();
        let result = loop {
            match stream.read(Some(options.buffer_size)).await {
                Ok(Some(chunk)) => hasher.update(&chunk),
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        let closed = stream.close().await;
        result?;
        closed?;
        Ok(hex::encode(hasher.finalize()))
    }

    // --- copy / move ---

    /// Copies `from` onto `to`, recursively for directory trees.
    /// Returns accumulated per-node failures; empty means full
    /// success. Only top-level argument validation rejects.
    pub async fn copy(&self, from: &str, to: &str) -> Result<Vec<XmitError>> {
        let options = self.inner.config.copy.clone();
        self.copy_with(from, to, &options).await
    }

    pub async fn copy_with(
        &self,
        from: &str,
        to: &str,
        options: &CopyOptions,
    ) -> Result<Vec<XmitError>> {
        xmit::transfer(self, from, self, to, options, false).await
    }

    /// Copy into another filesystem (possibly a different backend).
    pub async fn copy_into(
        &self,
        from: &str,
        dest: &FileSystem,
        to: &str,
        options: &CopyOptions,
    ) -> Result<Vec<XmitError>> {
        xmit::transfer(self, from, dest, to, options, false).await
    }

    /// Alias for [`FileSystem::copy`].
    pub async fn cp(&self, from: &str, to: &str) -> Result<Vec<XmitError>> {
        self.copy(from, to).await
    }

    /// Moves `from` to `to`: copy followed by best-effort deletion of
    /// the source. A failed deletion is recorded in the returned list
    /// and the copy is never rolled back, so a move can leave both
    /// sides populated; callers decide whether to retry the deletion.
    pub async fn mv(&self, from: &str, to: &str) -> Result<Vec<XmitError>> {
        let options = self.inner.config.mv.clone();
        self.mv_with(from, to, &options).await
    }

    pub async fn mv_with(
        &self,
        from: &str,
        to: &str,
        options: &MoveOptions,
    ) -> Result<Vec<XmitError>> {
        xmit::transfer(self, from, self, to, options, true).await
    }

    /// Move into another filesystem (possibly a different backend).
    pub async fn mv_into(
        &self,
        from: &str,
        dest: &FileSystem,
        to: &str,
        options: &MoveOptions,
    ) -> Result<Vec<XmitError>> {
        xmit::transfer(self, from, dest, to, options, true).await
    }

    // --- internals ---

    /// Backend head with error normalization, no hook participation.
    /// Internal existence checks go through here.
    pub(crate) async fn stat_raw(&self, hpath: &str) -> Result<Stats> {
        self.inner
            .backend
            .head(hpath)
            .await
            .map_err(|e| Error::normalize_read(hpath, e))
    }

    pub(crate) async fn list_raw(&self, dpath: &str) -> Result<Vec<String>> {
        self.inner
            .backend
            .list(dpath)
            .await
            .map_err(|e| Error::normalize_read(dpath, e))
    }

    pub(crate) fn same_root(&self, other: &FileSystem) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn hook(&self, ignore_hook: bool) -> Option<Arc<dyn Hook>> {
        if ignore_hook {
            None
        } else {
            self.inner.config.hook.clone()
        }
    }
}

impl std::fmt::Debug for FileSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FileSystem{{repository:{:?}}}", self.repository())
    }
}

fn check_kind(hpath: &str, stats: &Stats, kind: Option<EntryKind>) -> Result<()> {
    match kind {
        Some(EntryKind::File) if !stats.is_file() => {
            Err(Error::type_mismatch(hpath, "not a file"))
        }
        Some(EntryKind::Directory) if !stats.is_dir() => {
            Err(Error::type_mismatch(hpath, "not a directory"))
        }
        _ => Ok(()),
    }
}

fn warn_after(op: &str, hpath: &str, err: &Error) {
    let err = err.to_string();
    log_warn!("after-{op} hook failed for {hpath}: {err}", op: op, hpath: hpath, err: err.as_str());
}

async fn write_all(stream: &mut dyn WriteStream, content: &[u8], buffer_size: usize) -> Result<()> {
    let buffer_size = buffer_size.max(1);
    for block in content.chunks(buffer_size) {
        let mut off = 0;
        while off < block.len() {
            let n = stream.write(&block[off..]).await?;
            if n == 0 {
                return Err(Error::no_modification_allowed(
                    "",
                    "write stream accepted zero bytes",
                ));
            }
            off += n;
        }
    }
    Ok(())
}

/// Wrapper that tracks whether any mutating call occurred so `close`
/// can fire the create-vs-update notification. A stream opened and
/// closed without a write triggers nothing.
struct HookedWriteStream {
    inner: Box<dyn WriteStream>,
    hook: Option<Arc<dyn Hook>>,
    path: String,
    create: bool,
    changed: bool,
    closed: bool,
}

#[async_trait]
impl WriteStream for HookedWriteStream {
    async fn write(&mut self, chunk: &[u8]) -> Result<usize> {
        let n = self.inner.write(chunk).await?;
        if n > 0 {
            self.changed = true;
        }
        Ok(n)
    }

    async fn truncate(&mut self, size: u64) -> Result<()> {
        self.inner.truncate(size).await?;
        self.changed = true;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.inner.position()
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.inner.close().await?;
        // The notification task starts only after the backend stream
        // committed, so the hook observes the produced state.
        if self.changed
            && let Some(hook) = self.hook.take()
        {
            let path = std::mem::take(&mut self.path);
            let create = self.create;
            tokio::spawn(async move {
                let result = if create {
                    hook.after_create(&path).await
                } else {
                    hook.after_update(&path).await
                };
                if let Err(err) = result {
                    warn_after(if create { "create" } else { "update" }, &path, &err);
                }
            });
        }
        Ok(())
    }
}
