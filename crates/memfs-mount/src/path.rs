//! Conversion from platform path spellings to store paths.

use memfs_core::path::ROOT;

/// Normalizes a platform path into the store's canonical form.
///
/// Both `\` and `/` are accepted as separators. Empty components and `.`
/// are dropped, `..` pops a component but never climbs above the root, and
/// the result always starts with `/` and has no trailing separator.
///
/// ```
/// use memfs_mount::normalize_path;
///
/// assert_eq!(normalize_path(r"\docs\report.txt"), "/docs/report.txt");
/// assert_eq!(normalize_path("docs//a/./../b/"), "/docs/b");
/// assert_eq!(normalize_path(""), "/");
/// ```
pub fn normalize_path(raw: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for component in raw.split(['/', '\\']) {
        match component {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            name => parts.push(name),
        }
    }
    if parts.is_empty() {
        return ROOT.to_string();
    }
    let mut out = String::with_capacity(raw.len() + 1);
    for part in parts {
        out.push('/');
        out.push_str(part);
    }
    out
}
