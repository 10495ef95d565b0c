//! Helpers for the store's absolute path strings.
//!
//! Store paths always start with `/`, use `/` as the only separator and
//! carry no trailing separator, so the root is exactly `"/"`. Conversion
//! from platform-specific spellings happens in the verb adapter.

/// The root path.
pub const ROOT: &str = "/";

/// Path separator used by the store.
pub const SEPARATOR: char = '/';

/// Returns true if `path` is the root.
#[inline]
pub fn is_root(path: &str) -> bool {
    path == ROOT
}

/// Returns the parent of `path`, or `None` for the root.
///
/// ```
/// use memfs_core::path::parent;
///
/// assert_eq!(parent("/a/b"), Some("/a"));
/// assert_eq!(parent("/a"), Some("/"));
/// assert_eq!(parent("/"), None);
/// ```
pub fn parent(path: &str) -> Option<&str> {
    if is_root(path) {
        return None;
    }
    match path.rfind(SEPARATOR) {
        Some(0) => Some(ROOT),
        Some(idx) => Some(&path[..idx]),
        None => None,
    }
}

/// Returns the last component of `path`. The root has an empty name.
pub fn file_name(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Joins a directory path and a single component.
pub fn join(dir: &str, name: &str) -> String {
    if is_root(dir) {
        format!("/{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Returns true if `path` lies strictly below `ancestor`.
pub fn is_descendant(path: &str, ancestor: &str) -> bool {
    if is_root(ancestor) {
        return !is_root(path) && path.starts_with(SEPARATOR);
    }
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'/'
}
