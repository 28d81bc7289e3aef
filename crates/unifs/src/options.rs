//! Per-operation option records and filesystem configuration.
//!
//! Options are plain, side-effect-free configuration. Defaults live on
//! the [`FsConfig`] held by a `FileSystem`; the `*_with` operation
//! variants take a call-site record which wins wholesale over the
//! configured default.

use crate::DEFAULT_BUFFER_SIZE;
use crate::hook::Hook;
use std::sync::Arc;

/// The two entry kinds of the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// Policy when a copy/move destination already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnExists {
    /// Fail the operation.
    #[default]
    Error,
    /// Treat as success, touch nothing.
    Skip,
    /// Replace the destination content.
    Overwrite,
}

/// Policy when a copy/move destination's parent does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnNoParent {
    /// Fail the operation.
    #[default]
    Error,
    /// Create the parent chain first.
    MakeParents,
}

#[derive(Debug, Clone, Default)]
pub struct HeadOptions {
    /// Require the entry to be of this kind; mismatch is a
    /// `TypeMismatch` error.
    pub kind: Option<EntryKind>,
    pub ignore_hook: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub ignore_hook: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MkcolOptions {
    /// Create missing ancestors as well (mkdir -p).
    pub recursive: bool,
    pub ignore_hook: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DeleteOptions {
    /// Skip a missing target, and record per-node failures instead of
    /// aborting the walk.
    pub force: bool,
    /// Delete directory contents first.
    pub recursive: bool,
    pub ignore_hook: bool,
}

#[derive(Debug, Clone)]
pub struct CopyOptions {
    pub on_exists: OnExists,
    pub on_no_parent: OnNoParent,
    /// Descend into directory trees.
    pub recursive: bool,
    /// For moves: force the source-deletion step.
    pub force: bool,
    pub buffer_size: usize,
}

impl Default for CopyOptions {
    fn default() -> Self {
        CopyOptions {
            on_exists: OnExists::default(),
            on_no_parent: OnNoParent::default(),
            recursive: false,
            force: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// Move takes the same shape as copy.
pub type MoveOptions = CopyOptions;

#[derive(Debug, Clone)]
pub struct OpenOptions {
    pub buffer_size: usize,
    pub ignore_hook: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        OpenOptions {
            buffer_size: DEFAULT_BUFFER_SIZE,
            ignore_hook: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Position the stream at the end of existing content.
    pub append: bool,
    /// `Some(true)`: the target must not exist (else `PathExists`).
    /// `Some(false)`: the target must exist (else `NotFound`).
    /// `None`: create if absent, overwrite if present.
    pub create: Option<bool>,
    pub buffer_size: usize,
    pub ignore_hook: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            append: false,
            create: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
            ignore_hook: false,
        }
    }
}

/// Filesystem-wide configuration: the hook pipeline plus the default
/// option set for each operation. Fixed at construction.
#[derive(Clone, Default)]
pub struct FsConfig {
    pub hook: Option<Arc<dyn Hook>>,
    pub head: HeadOptions,
    pub list: ListOptions,
    pub mkcol: MkcolOptions,
    pub delete: DeleteOptions,
    pub copy: CopyOptions,
    pub mv: MoveOptions,
    pub open: OpenOptions,
    pub write: WriteOptions,
}

impl std::fmt::Debug for FsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsConfig")
            .field("hook", &self.hook.is_some())
            .field("head", &self.head)
            .field("list", &self.list)
            .field("mkcol", &self.mkcol)
            .field("delete", &self.delete)
            .field("copy", &self.copy)
            .field("mv", &self.mv)
            .field("open", &self.open)
            .field("write", &self.write)
            .finish()
    }
}
