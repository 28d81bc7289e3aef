//! Backend-neutral path utilities.
//!
//! Paths are absolute, `'/'`-separated strings. Every path is
//! normalized before it reaches a backend primitive: no `.`/`..`
//! segments, no duplicate separators, trailing separator stripped
//! except for the root itself.

use crate::error::{Error, Result};

/// Normalizes a path into canonical absolute form.
///
/// Idempotent: `normalize(normalize(p)) == normalize(p)`.
pub fn normalize(path: &str) -> Result<String> {
    if path.is_empty() {
        return Err(Error::syntax(path, "empty path"));
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                if segments.pop().is_none() {
                    return Err(Error::syntax(path, "path escapes root"));
                }
            }
            name => {
                validate_segment(path, name)?;
                segments.push(name);
            }
        }
    }

    if segments.is_empty() {
        Ok("/".to_string())
    } else {
        Ok(format!("/{}", segments.join("/")))
    }
}

fn validate_segment(path: &str, segment: &str) -> Result<()> {
    if segment.contains('\0') || segment.contains('\\') {
        return Err(Error::security(path, "illegal character in path segment"));
    }
    Ok(())
}

/// Joins a child name onto a directory path. The result is normalized.
pub fn join(dir: &str, name: &str) -> Result<String> {
    if dir.ends_with('/') {
        normalize(&format!("{dir}{name}"))
    } else {
        normalize(&format!("{dir}/{name}"))
    }
}

/// Extracts the parent path, or None for the root.
pub fn dirname(path: &str) -> Option<String> {
    if path == "/" {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some("/".to_string()),
        Some(idx) => Some(path[..idx].to_string()),
        None => None,
    }
}

/// Extracts the final component, or None for the root.
pub fn basename(path: &str) -> Option<String> {
    if path == "/" {
        return None;
    }
    path.rfind('/').map(|idx| path[idx + 1..].to_string())
}
