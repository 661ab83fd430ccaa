//! Object key resolution from request paths.
//!
//! The raw path is used as received: no percent-decoding and no collapsing
//! of `.`/`..` segments. Keys map 1:1 onto bucket keys.

use std::fmt;

/// A non-empty storage object key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Strip exactly one leading `/` from `path`.
    ///
    /// Returns `None` when nothing is left, e.g. for `/` or the empty path.
    pub fn from_path(path: &str) -> Option<Self> {
        let key = path.strip_prefix('/').unwrap_or(path);
        if key.is_empty() {
            None
        } else {
            Some(Self(key.to_string()))
        }
    }

    /// Whether any `/`-separated segment is `.` or `..`.
    pub fn has_dot_segments(&self) -> bool {
        self.0.split('/').any(|segment| segment == "." || segment == "..")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
