//! Typed path handles: a closed entry variant of files and
//! directories.
//!
//! Handles are cheap values: a filesystem reference plus a normalized
//! path, no cached state. Every method re-dispatches through the
//! owning [`FileSystem`], so hooks and error normalization apply
//! identically whether an operation starts from the root or from a
//! handle.

use crate::error::{Error, NodeFailure, Result};
use crate::fs::FileSystem;
use crate::options::{
    CopyOptions, DeleteOptions, EntryKind, HeadOptions, ListOptions, MkcolOptions, MoveOptions,
    OpenOptions, WriteOptions,
};
use crate::path;
use crate::stats::{Props, Stats};
use crate::stream::{ReadStream, WriteStream};
use crate::xmit::XmitError;

/// Either kind of entry, as produced by typed directory listings.
#[derive(Debug, Clone)]
pub enum Entry {
    File(File),
    Dir(Dir),
}

impl Entry {
    pub fn path(&self) -> &str {
        match self {
            Entry::File(f) => f.path(),
            Entry::Dir(d) => d.path(),
        }
    }

    pub fn name(&self) -> Option<String> {
        path::basename(self.path())
    }

    pub async fn stat(&self) -> Result<Stats> {
        match self {
            Entry::File(f) => f.stat().await,
            Entry::Dir(d) => d.stat().await,
        }
    }

    pub async fn delete(&self, options: &DeleteOptions) -> Result<Vec<NodeFailure>> {
        match self {
            Entry::File(f) => f.fs.delete_with(&f.path, options).await,
            Entry::Dir(d) => d.fs.delete_with(&d.path, options).await,
        }
    }
}

/// Handle to a file path.
#[derive(Debug, Clone)]
pub struct File {
    fs: FileSystem,
    path: String,
}

impl File {
    pub(crate) fn new(fs: FileSystem, path: String) -> Self {
        File { fs, path }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> Option<String> {
        path::basename(&self.path)
    }

    pub fn filesystem(&self) -> &FileSystem {
        &self.fs
    }

    /// Stats for this file; a directory at the path is a
    /// `TypeMismatch`.
    pub async fn stat(&self) -> Result<Stats> {
        let options = HeadOptions {
            kind: Some(EntryKind::File),
            ..self.fs.config().head.clone()
        };
        self.fs.head_with(&self.path, &options).await
    }

    pub async fn exists(&self) -> bool {
        self.stat().await.is_ok()
    }

    pub async fn size(&self) -> Result<u64> {
        let stats = self.stat().await?;
        stats
            .size
            .ok_or_else(|| Error::type_mismatch(&self.path, "not a file"))
    }

    pub async fn open_read(&self) -> Result<Box<dyn ReadStream>> {
        self.fs.open_read(&self.path).await
    }

    pub async fn open_read_with(&self, options: &OpenOptions) -> Result<Box<dyn ReadStream>> {
        self.fs.open_read_with(&self.path, options).await
    }

    pub async fn open_write(&self) -> Result<Box<dyn WriteStream>> {
        self.fs.open_write(&self.path).await
    }

    pub async fn open_write_with(&self, options: &WriteOptions) -> Result<Box<dyn WriteStream>> {
        self.fs.open_write_with(&self.path, options).await
    }

    pub async fn read(&self) -> Result<Vec<u8>> {
        self.fs.read(&self.path).await
    }

    pub async fn write(&self, content: &[u8]) -> Result<()> {
        self.fs.write(&self.path, content).await
    }

    pub async fn append(&self, content: &[u8]) -> Result<()> {
        let options = WriteOptions {
            append: true,
            ..self.fs.config().write.clone()
        };
        self.fs.write_with(&self.path, content, &options).await
    }

    /// SHA-256 of the content as lowercase hex.
    pub async fn hash(&self) -> Result<String> {
        self.fs.hash(&self.path).await
    }

    pub async fn patch(&self, props: &Props) -> Result<()> {
        self.fs.patch(&self.path, props).await
    }

    pub async fn delete(&self) -> Result<Vec<NodeFailure>> {
        self.fs.delete(&self.path).await
    }

    /// Copies this file onto a path in `dest`, which may belong to a
    /// different backend.
    pub async fn copy_to(
        &self,
        dest: &FileSystem,
        to: &str,
        options: &CopyOptions,
    ) -> Result<Vec<XmitError>> {
        self.fs.copy_into(&self.path, dest, to, options).await
    }

    pub async fn move_to(
        &self,
        dest: &FileSystem,
        to: &str,
        options: &MoveOptions,
    ) -> Result<Vec<XmitError>> {
        self.fs.mv_into(&self.path, dest, to, options).await
    }
}

/// Handle to a directory path.
#[derive(Debug, Clone)]
pub struct Dir {
    fs: FileSystem,
    path: String,
}

impl Dir {
    pub(crate) fn new(fs: FileSystem, path: String) -> Self {
        Dir { fs, path }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> Option<String> {
        path::basename(&self.path)
    }

    pub fn filesystem(&self) -> &FileSystem {
        &self.fs
    }

    /// Child file handle. No I/O.
    pub fn file(&self, name: &str) -> Result<File> {
        Ok(File::new(self.fs.clone(), path::join(&self.path, name)?))
    }

    /// Child directory handle. No I/O.
    pub fn dir(&self, name: &str) -> Result<Dir> {
        Ok(Dir::new(self.fs.clone(), path::join(&self.path, name)?))
    }

    /// Stats for this directory; a file at the path is a
    /// `TypeMismatch`.
    pub async fn stat(&self) -> Result<Stats> {
        let options = HeadOptions {
            kind: Some(EntryKind::Directory),
            ..self.fs.config().head.clone()
        };
        self.fs.head_with(&self.path, &options).await
    }

    pub async fn exists(&self) -> bool {
        self.stat().await.is_ok()
    }

    /// Child paths, one level deep.
    pub async fn list(&self) -> Result<Vec<String>> {
        self.fs.list(&self.path).await
    }

    pub async fn list_with(&self, options: &ListOptions) -> Result<Vec<String>> {
        self.fs.list_with(&self.path, options).await
    }

    /// Typed listing: stats each child to decide its kind.
    pub async fn entries(&self) -> Result<Vec<Entry>> {
        let children = self.fs.list(&self.path).await?;
        let mut entries = Vec::with_capacity(children.len());
        for child in children {
            let stats = self.fs.stat_raw(&child).await?;
            if stats.is_dir() {
                entries.push(Entry::Dir(Dir::new(self.fs.clone(), child)));
            } else {
                entries.push(Entry::File(File::new(self.fs.clone(), child)));
            }
        }
        Ok(entries)
    }

    pub async fn create(&self) -> Result<()> {
        self.fs.mkcol(&self.path).await
    }

    pub async fn create_with(&self, options: &MkcolOptions) -> Result<()> {
        self.fs.mkcol_with(&self.path, options).await
    }

    pub async fn patch(&self, props: &Props) -> Result<()> {
        self.fs.patch(&self.path, props).await
    }

    pub async fn delete(&self) -> Result<Vec<NodeFailure>> {
        self.fs.delete(&self.path).await
    }

    pub async fn delete_with(&self, options: &DeleteOptions) -> Result<Vec<NodeFailure>> {
        self.fs.delete_with(&self.path, options).await
    }

    /// Copies this directory tree onto a path in `dest`.
    pub async fn copy_to(
        &self,
        dest: &FileSystem,
        to: &str,
        options: &CopyOptions,
    ) -> Result<Vec<XmitError>> {
        self.fs.copy_into(&self.path, dest, to, options).await
    }

    pub async fn move_to(
        &self,
        dest: &FileSystem,
        to: &str,
        options: &MoveOptions,
    ) -> Result<Vec<XmitError>> {
        self.fs.mv_into(&self.path, dest, to, options).await
    }
}
