//! Mapping of object keys onto the local directory tree.

use std::path::{Component, Path, PathBuf};

/// Removes leading `../` and `..\` segments from a key.
fn strip_leading_traversal(mut key: &str) -> &str {
    while let Some(rest) = key.strip_prefix("..") {
        match rest.chars().next() {
            None => return "",
            Some('/') | Some('\\') => key = &rest[1..],
            Some(_) => break,
        }
    }
    key
}

/// Resolves the local path an object key should be written to.
///
/// Leading parent-directory segments are stripped, then the remaining key is
/// normalized lexically with both `/` and `\` treated as separators. Returns
/// `None` when the key would still escape `root` (for example `a/../../x`) or
/// contains a segment that is not a plain file name, such as a drive prefix.
///
/// A key that is empty after stripping resolves to `root` itself.
///
/// # Example
///
/// ```
/// use bucketsync::resolve_local_path;
/// use std::path::Path;
///
/// let root = Path::new("backup");
/// assert_eq!(
///     resolve_local_path(root, "../../etc/passwd"),
///     Some(root.join("etc").join("passwd"))
/// );
/// assert_eq!(resolve_local_path(root, "a/../../x"), None);
/// ```
pub fn resolve_local_path(root: &Path, key: &str) -> Option<PathBuf> {
    let key = strip_leading_traversal(key);

    let mut relative = PathBuf::new();
    for segment in key.split(['/', '\\']) {
        match segment {
            "" | "." => continue,
            ".." => {
                if !relative.pop() {
                    return None;
                }
            }
            name => {
                let mut components = Path::new(name).components();
                match (components.next(), components.next()) {
                    (Some(Component::Normal(_)), None) => relative.push(name),
                    _ => return None,
                }
            }
        }
    }

    Some(root.join(relative))
}
