//! Metadata records for filesystem entries.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Metadata describing an entry. Presence of `size` is the sole
/// discriminator between a file and a directory when a backend does
/// not support explicit typing: a file's stats always carry `size`
/// once retrieved, a directory's never do.
///
/// Timestamps are milliseconds since the Unix epoch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessed: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<i64>,

    /// Backend-defined custom properties.
    #[serde(flatten)]
    pub etc: BTreeMap<String, Value>,
}

/// A metadata patch document: the same shape as [`Stats`], applied
/// field-by-field. `size` is derived and may never be patched.
pub type Props = Stats;

impl Stats {
    pub fn file(size: u64) -> Self {
        Stats {
            size: Some(size),
            ..Default::default()
        }
    }

    pub fn dir() -> Self {
        Stats::default()
    }

    pub fn is_file(&self) -> bool {
        self.size.is_some()
    }

    pub fn is_dir(&self) -> bool {
        self.size.is_none()
    }
}

/// Current time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_discriminator() {
        assert!(Stats::file(0).is_file());
        assert!(!Stats::file(10).is_dir());
        assert!(Stats::dir().is_dir());
        assert!(!Stats::dir().is_file());
    }

    #[test]
    fn test_serde_skips_absent_fields() {
        let s = serde_json::to_string(&Stats::dir()).expect("serialize");
        assert_eq!(s, "{}");
        let s = serde_json::to_string(&Stats::file(3)).expect("serialize");
        assert_eq!(s, r#"{"size":3}"#);
    }
}
