//! Canonical error taxonomy and the backend-failure normalizer.

pub type Result<T> = std::result::Result<T, Error>;

/// Opaque failure produced by a backend primitive. Backends are not
/// responsible for the taxonomy; the core classifies every failure
/// through [`Error::normalize_read`] / [`Error::normalize_write`].
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Closed taxonomy of filesystem errors. Every backend-native failure
/// is mapped into exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("path not found: {0}")]
    NotFound(String),

    #[error("not readable: {path}: {message}")]
    NotReadable { path: String, message: String },

    #[error("no modification allowed: {path}: {message}")]
    NoModificationAllowed { path: String, message: String },

    /// Structurally illegal mutation, e.g. deleting a non-empty
    /// directory without recursion, or copying a directory onto a file.
    #[error("invalid modification: {path}: {message}")]
    InvalidModification { path: String, message: String },

    /// Wrong entry kind for the requested operation.
    #[error("type mismatch: {path}: {message}")]
    TypeMismatch { path: String, message: String },

    #[error("path already exists: {0}")]
    PathExists(String),

    /// Path containing illegal characters.
    #[error("security violation: {path}: {message}")]
    Security { path: String, message: String },

    /// Malformed path.
    #[error("syntax error: {path}: {message}")]
    Syntax { path: String, message: String },

    /// Operation the backend cannot perform at all, e.g. directories
    /// on a flat key-value backend.
    #[error("not supported: {path}: {message}")]
    NotSupported { path: String, message: String },
}

impl Error {
    pub fn not_found<P: Into<String>>(path: P) -> Self {
        Error::NotFound(path.into())
    }

    pub fn not_readable<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Error::NotReadable {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn no_modification_allowed<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Error::NoModificationAllowed {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invalid_modification<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Error::InvalidModification {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn type_mismatch<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Error::TypeMismatch {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn path_exists<P: Into<String>>(path: P) -> Self {
        Error::PathExists(path.into())
    }

    pub fn security<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Error::Security {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn syntax<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Error::Syntax {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn not_supported<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Error::NotSupported {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Classify a read-side backend failure.
    pub fn normalize_read(path: &str, err: BackendError) -> Error {
        Self::normalize(path, err, false)
    }

    /// Classify a write-side backend failure.
    pub fn normalize_write(path: &str, err: BackendError) -> Error {
        Self::normalize(path, err, true)
    }

    fn normalize(path: &str, err: BackendError, write_side: bool) -> Error {
        // An already-classified error passes through unchanged.
        let err = match err.downcast::<Error>() {
            Ok(e) => return *e,
            Err(e) => e,
        };

        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            use std::io::ErrorKind;
            return match io.kind() {
                ErrorKind::NotFound => Error::not_found(path),
                ErrorKind::AlreadyExists => Error::path_exists(path),
                ErrorKind::Unsupported => Error::not_supported(path, io.to_string()),
                _ if write_side => Error::no_modification_allowed(path, io.to_string()),
                _ => Error::not_readable(path, io.to_string()),
            };
        }

        if write_side {
            Error::no_modification_allowed(path, err.to_string())
        } else {
            Error::not_readable(path, err.to_string())
        }
    }
}

/// One failed node during a recursive delete walk. Accumulated, never
/// thrown mid-walk.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeFailure {
    pub path: String,
    pub error: Error,
}
