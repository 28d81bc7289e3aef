//! Backend-independent virtual filesystem core.
//!
//! A uniform set of operations (stat, read, write, list, mkdir, delete,
//! copy, move, patch metadata) over pluggable storage backends. The
//! [`Backend`] trait is the small primitive surface an adapter
//! implements; [`FileSystem`] builds the full contract on top of it:
//! one error taxonomy, a before/after hook pipeline for cross-cutting
//! behavior, a recursive copy/move engine with partial-failure
//! semantics, and a buffered, position-aware stream contract.
//!
//! The [`memory`] module provides the in-memory reference backend used
//! throughout the test suite.

pub mod backend;
pub mod entry;
pub mod error;
pub mod fs;
pub mod hook;
pub mod memory;
pub mod options;
pub mod path;
pub mod stats;
pub mod stream;
pub mod xmit;

#[cfg(test)]
mod tests;

pub use backend::{Backend, BackendResult, WriteMode};
pub use entry::{Dir, Entry, File};
pub use error::{BackendError, Error, NodeFailure, Result};
pub use fs::FileSystem;
pub use hook::Hook;
pub use options::{
    CopyOptions, DeleteOptions, EntryKind, FsConfig, HeadOptions, ListOptions, MkcolOptions,
    MoveOptions, OnExists, OnNoParent, OpenOptions, WriteOptions,
};
pub use stats::{Props, Stats};
pub use stream::{BytesReadStream, ReadStream, WriteStream, pump};
pub use xmit::XmitError;

/// Default chunk size for buffered stream transfers.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;
