//! Recursive transfer engine behind copy and move.
//!
//! Transfers walk the source tree node by node and accumulate per-node
//! failures instead of aborting: one unreadable file does not stop its
//! siblings. Only top-level argument validation rejects the call
//! itself. A move is a copy followed by best-effort deletion of the
//! source; a failed deletion joins the failure list and the copied
//! data stays in place.

use crate::error::{Error, Result};
use crate::fs::FileSystem;
use crate::options::{CopyOptions, DeleteOptions, MkcolOptions, OnExists, OnNoParent, OpenOptions, WriteOptions};
use crate::path;
use crate::stats::Stats;
use crate::stream::pump;
use futures::future::BoxFuture;

/// One failed node of a transfer, with both endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmitError {
    pub from: String,
    pub to: String,
    pub error: Error,
}

impl std::fmt::Display for XmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}: {}", self.from, self.to, self.error)
    }
}

pub(crate) async fn transfer(
    src: &FileSystem,
    from: &str,
    dst: &FileSystem,
    to: &str,
    options: &CopyOptions,
    is_move: bool,
) -> Result<Vec<XmitError>> {
    let from = path::normalize(from)?;
    let to = path::normalize(to)?;
    if src.same_root(dst) && (to == from || to.starts_with(&format!("{from}/"))) {
        return Err(Error::invalid_modification(
            &to,
            "destination is inside the source",
        ));
    }
    let stats = src.stat_raw(&from).await?;
    if let Some(parent) = path::dirname(&to) {
        match dst.stat_raw(&parent).await {
            Ok(s) if s.is_dir() => {}
            Ok(_) => return Err(Error::type_mismatch(&parent, "parent is not a directory")),
            Err(e) if e.is_not_found() => match options.on_no_parent {
                OnNoParent::Error => return Err(Error::not_found(&parent)),
                OnNoParent::MakeParents => {
                    let mkcol = MkcolOptions {
                        recursive: true,
                        ignore_hook: false,
                    };
                    dst.mkcol_with(&parent, &mkcol).await?;
                }
            },
            Err(e) => return Err(e),
        }
    }
    let mut errors = Vec::new();
    xmit_node(src, &from, dst, &to, &stats, options, is_move, &mut errors).await;
    Ok(errors)
}

#[allow(clippy::too_many_arguments)]
fn xmit_node<'a>(
    src: &'a FileSystem,
    from: &'a str,
    dst: &'a FileSystem,
    to: &'a str,
    stats: &'a Stats,
    options: &'a CopyOptions,
    is_move: bool,
    errors: &'a mut Vec<XmitError>,
) -> BoxFuture<'a, ()> {
    Box::pin(async move {
        let existing = match dst.stat_raw(to).await {
            Ok(s) => Some(s),
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                record(errors, from, to, e);
                return;
            }
        };
        if stats.is_dir() {
            xmit_dir(src, from, dst, to, existing, options, is_move, errors).await;
        } else {
            xmit_file(src, from, dst, to, existing, options, is_move, errors).await;
        }
    })
}

#[allow(clippy::too_many_arguments)]
async fn xmit_dir(
    src: &FileSystem,
    from: &str,
    dst: &FileSystem,
    to: &str,
    existing: Option<Stats>,
    options: &CopyOptions,
    is_move: bool,
    errors: &mut Vec<XmitError>,
) {
    match existing {
        Some(s) if s.is_dir() => match options.on_exists {
            OnExists::Error => {
                record(errors, from, to, Error::path_exists(to));
                return;
            }
            // Skip leaves the whole subtree untouched; on a move the
            // source subtree is kept rather than silently dropped.
            OnExists::Skip => return,
            // Overwrite merges into the existing directory.
            OnExists::Overwrite => {}
        },
        Some(_) => {
            record(
                errors,
                from,
                to,
                Error::invalid_modification(to, "directory onto file"),
            );
            return;
        }
        None => {
            let mkcol = MkcolOptions::default();
            if let Err(e) = dst.mkcol_with(to, &mkcol).await {
                record(errors, from, to, e);
                return;
            }
        }
    }
    if options.recursive {
        let children = match src.list_raw(from).await {
            Ok(c) => c,
            Err(e) => {
                record(errors, from, to, e);
                return;
            }
        };
        for child in children {
            let Some(name) = path::basename(&child) else {
                continue;
            };
            let child_to = match path::join(to, &name) {
                Ok(p) => p,
                Err(e) => {
                    record(errors, &child, to, e);
                    continue;
                }
            };
            let child_stats = match src.stat_raw(&child).await {
                Ok(s) => s,
                Err(e) => {
                    record(errors, &child, &child_to, e);
                    continue;
                }
            };
            xmit_node(
                src, &child, dst, &child_to, &child_stats, options, is_move, errors,
            )
            .await;
        }
    }
    if is_move {
        // Non-recursive deletion: succeeds only once every child moved
        // out, so a partially-moved tree keeps its leftovers visible.
        delete_source(src, from, to, options, errors).await;
    }
}

#[allow(clippy::too_many_arguments)]
async fn xmit_file(
    src: &FileSystem,
    from: &str,
    dst: &FileSystem,
    to: &str,
    existing: Option<Stats>,
    options: &CopyOptions,
    is_move: bool,
    errors: &mut Vec<XmitError>,
) {
    match existing {
        Some(s) if s.is_dir() => {
            record(
                errors,
                from,
                to,
                Error::invalid_modification(to, "file onto directory"),
            );
            return;
        }
        Some(_) => match options.on_exists {
            OnExists::Error => {
                record(errors, from, to, Error::path_exists(to));
                return;
            }
            OnExists::Skip => return,
            OnExists::Overwrite => {}
        },
        None => {}
    }
    if let Err(e) = copy_file(src, from, dst, to, options).await {
        record(errors, from, to, e);
        return;
    }
    if is_move {
        delete_source(src, from, to, options, errors).await;
    }
}

/// Streams one file across, closing both streams on every exit path.
async fn copy_file(
    src: &FileSystem,
    from: &str,
    dst: &FileSystem,
    to: &str,
    options: &CopyOptions,
) -> Result<()> {
    let read_opts = OpenOptions {
        buffer_size: options.buffer_size,
        ignore_hook: false,
    };
    let mut reader = src.open_read_with(from, &read_opts).await?;
    let write_opts = WriteOptions {
        append: false,
        create: None,
        buffer_size: options.buffer_size,
        ignore_hook: false,
    };
    let mut writer = match dst.open_write_with(to, &write_opts).await {
        Ok(w) => w,
        Err(e) => {
            let _ = reader.close().await;
            return Err(e);
        }
    };
    let pumped = pump(reader.as_mut(), writer.as_mut(), options.buffer_size).await;
    // Trim any tail left behind when overwriting a longer file. Also
    // forces the create notification for zero-length sources.
    let trimmed = match &pumped {
        Ok(_) => {
            let end = writer.position();
            writer.truncate(end).await
        }
        Err(_) => Ok(()),
    };
    let reader_closed = reader.close().await;
    let writer_closed = writer.close().await;
    pumped?;
    trimmed?;
    reader_closed?;
    writer_closed?;
    Ok(())
}

async fn delete_source(
    src: &FileSystem,
    from: &str,
    to: &str,
    options: &CopyOptions,
    errors: &mut Vec<XmitError>,
) {
    let delete = DeleteOptions {
        force: options.force,
        recursive: false,
        ignore_hook: false,
    };
    match src.delete_with(from, &delete).await {
        Ok(failures) => {
            for f in failures {
                record(errors, &f.path, to, f.error);
            }
        }
        Err(e) => record(errors, from, to, e),
    }
}

fn record(errors: &mut Vec<XmitError>, from: &str, to: &str, error: Error) {
    errors.push(XmitError {
        from: from.to_string(),
        to: to.to_string(),
        error,
    });
}
