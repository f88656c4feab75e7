//! Node path helpers.

use crate::constants::PATH_SEPARATOR;

/// Parent of an absolute node path. The parent of a top-level node
/// (`/name`) is the root `/`; the root has no parent.
pub fn parent_path(path: &str) -> Option<&str> {
    let trimmed = path.trim_end_matches(PATH_SEPARATOR);
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.rfind(PATH_SEPARATOR) {
        Some(0) => Some("/"),
        Some(idx) => Some(&trimmed[..idx]),
        None => None,
    }
}

/// Last segment of a node path.
pub fn node_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches(PATH_SEPARATOR);
    match trimmed.rfind(PATH_SEPARATOR) {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Join a child name onto a parent path.
pub fn join_path(
    parent: &str,
    child: &str,
) -> String {
    let base = parent.trim_end_matches(PATH_SEPARATOR);
    format!("{}{}{}", base, PATH_SEPARATOR, child)
}

#[cfg(test)]
mod utils_test;
