// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store path helpers
//!
//! Paths are absolute, `/`-separated, and never end in `/` except for the
//! root itself.

use crate::error::InvalidPath;

/// Separator between the priority and the store-assigned sequence
pub const SEQUENCE_SEPARATOR: char = '-';

/// Derive a request identity from its store-assigned path.
///
/// The identity is everything after the last `-`. A path with no separator,
/// or with nothing after it, means the store or configuration is
/// inconsistent and is rejected.
pub fn id_for_path(path: &str) -> Result<&str, InvalidPath> {
    match path.rsplit_once(SEQUENCE_SEPARATOR) {
        Some((_, id)) if !id.is_empty() => Ok(id),
        _ => Err(InvalidPath::new(path)),
    }
}

/// Join a child segment (or relative path) onto a base path
pub fn join(base: &str, child: &str) -> String {
    let base = base.trim_end_matches('/');
    let child = child.trim_start_matches('/');
    if child.is_empty() {
        if base.is_empty() {
            return "/".to_string();
        }
        return base.to_string();
    }
    format!("{}/{}", base, child)
}

/// Parent of an absolute path, `None` for the root
pub fn parent(path: &str) -> Option<&str> {
    if path == "/" {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some("/"),
        Some(idx) => Some(&path[..idx]),
        None => None,
    }
}

/// Final segment of a path
pub fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Whether `path` is a well-formed absolute path
pub fn is_valid(path: &str) -> bool {
    if path == "/" {
        return true;
    }
    path.starts_with('/') && !path.ends_with('/') && !path[1..].split('/').any(str::is_empty)
}

/// Every ancestor of `path`, nearest to the root first, excluding `/` and `path`
pub fn ancestors(path: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut current = parent(path);
    while let Some(p) = current {
        if p == "/" {
            break;
        }
        out.push(p);
        current = parent(p);
    }
    out.reverse();
    out
}

#[cfg(test)]
#[path = "path_tests.rs"]
mod tests;
