//! Path resolution over the node tree.
//!
//! Paths are always absolute: segments are split on `/`, empty segments are
//! dropped and each remaining segment must name an existing child of a
//! directory. `.` and `..` are ordinary names.

use super::node::Node;

/// Splits a path into its non-empty segments.
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Canonical `/a/b` spelling of a path.
pub fn normalize(path: &str) -> String {
    format!("/{}", segments(path).join("/"))
}

pub fn resolve<'a>(root: &'a Node, path: &str) -> Option<&'a Node> {
    segments(path)
        .into_iter()
        .try_fold(root, |current, segment| current.children()?.get(segment))
}

pub fn resolve_mut<'a>(root: &'a mut Node, path: &str) -> Option<&'a mut Node> {
    segments(path)
        .into_iter()
        .try_fold(root, |current, segment| {
            current.children_mut()?.get_mut(segment)
        })
}
