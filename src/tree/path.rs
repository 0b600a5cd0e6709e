//! Slash-delimited path algebra.
//!
//! Paths are plain strings such as `a/b/c`: no leading or trailing
//! separator and no empty segments. Every prefix test here respects segment
//! boundaries, so `a` is an ancestor of `a/b` but not of `ab/c`.

use snafu::ensure;

use super::error::{ParentChildSnafu, ResourceSnafu, TreeError};

pub const SEPARATOR: char = '/';

/// Builds the path of a node named `segment` below `parent`.
///
/// Without a parent the segment itself is the path.
pub fn build_path(parent: Option<&str>, segment: &str) -> Result<String, TreeError> {
    let needed = match parent {
        Some(parent) => parent.len() + SEPARATOR.len_utf8() + segment.len(),
        None => segment.len(),
    };

    let mut path = reserve(needed, parent, segment)?;
    if let Some(parent) = parent {
        path.push_str(parent);
        path.push(SEPARATOR);
    }
    path.push_str(segment);
    Ok(path)
}

/// Empty string with room for `needed` bytes. On failure the error names the
/// path that was being built.
fn reserve(needed: usize, parent: Option<&str>, segment: &str) -> Result<String, TreeError> {
    let mut path = String::new();
    if path.try_reserve_exact(needed).is_err() {
        let path = match parent {
            Some(parent) => format!("{parent}{SEPARATOR}{segment}"),
            None => segment.to_string(),
        };
        return ResourceSnafu { path }.fail();
    }
    Ok(path)
}

/// Rejects empty paths, leading or trailing separators and doubled separators.
pub fn validate(path: &str) -> Result<(), TreeError> {
    ensure!(
        !path.is_empty() && path.split(SEPARATOR).all(|segment| !segment.is_empty()),
        ParentChildSnafu { path }
    );
    Ok(())
}

/// Whether `path` equals `ancestor` or lies anywhere below it.
pub fn is_within(ancestor: &str, path: &str) -> bool {
    match path.strip_prefix(ancestor) {
        Some("") => true,
        Some(rest) => rest.starts_with(SEPARATOR),
        None => false,
    }
}

/// The part of `path` below `ancestor`, without the joining separator.
///
/// Returns the empty string when `path` is not strictly below `ancestor`.
pub fn remainder<'p>(ancestor: &str, path: &'p str) -> &'p str {
    path.strip_prefix(ancestor)
        .and_then(|rest| rest.strip_prefix(SEPARATOR))
        .unwrap_or("")
}

/// The path one level below `ancestor` on the way to `path`.
///
/// For `ancestor = "a"` and `path = "a/b/c"` this is `"a/b"`.
pub fn next_component<'p>(ancestor: &str, path: &'p str) -> &'p str {
    let rest = remainder(ancestor, path);
    let segment_len = rest.find(SEPARATOR).unwrap_or(rest.len());
    let end = path.len() - rest.len() + segment_len;
    &path[..end]
}

/// Whether `child` is exactly one segment below `parent`.
pub fn is_direct_child(parent: &str, child: &str) -> bool {
    let rest = remainder(parent, child);
    !rest.is_empty() && !rest.contains(SEPARATOR)
}
