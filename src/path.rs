/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Path syntax: a `/`-delimited absolute path addressing a file or
//! directory in the tree.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// An absolute, `/`-delimited path. Does not by itself guarantee validity
/// against the configured limits — see [`PathName::validate`].
#[derive(Debug, Clone, Hash, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct PathName(String);

/// A single path segment / child name.
pub type Name = String;

impl Display for PathName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PathName {
    fn from(value: &str) -> Self {
        PathName(value.to_owned())
    }
}

impl From<String> for PathName {
    fn from(value: String) -> Self {
        PathName(value)
    }
}

impl PathName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Splits the path into its parent directory path and terminal name.
    /// Panics if called on the root path; callers must check
    /// [`PathName::is_root`] first (mutating operations reject root up
    /// front via validation).
    pub fn split(&self) -> (PathName, Name) {
        let split_at = self.0.rfind('/').expect("path is validated to contain '/'");
        let (parent, name) = (&self.0[..split_at], &self.0[split_at + 1..]);
        if parent.is_empty() {
            ("/".into(), name.to_owned())
        } else {
            (parent.into(), name.to_owned())
        }
    }

    /// All non-empty segments, in order, ignoring leading/trailing `/`.
    pub fn segments(&self) -> Vec<&str> {
        self.0.split('/').filter(|s| !s.is_empty()).collect()
    }

    pub fn join(&self, name: &str) -> PathName {
        if self.is_root() {
            format!("/{}", name).into()
        } else {
            format!("{}/{}", self.0, name).into()
        }
    }

    /// Syntactic validity per §4.1: non-empty, starts with `/`, no empty
    /// segments (no `//`), every segment within `[1, max_string_len]`
    /// bytes, and the whole path within `max_path_len` bytes. Does not
    /// check whether the path actually resolves in a given tree.
    pub fn validate(&self, max_string_len: usize, max_path_len: usize) -> bool {
        if self.0.is_empty() || !self.0.starts_with('/') {
            return false;
        }
        if self.0.len() > max_path_len {
            return false;
        }
        if self.is_root() {
            return true;
        }
        if self.0.ends_with('/') {
            return false;
        }
        if self.0.contains("//") {
            return false;
        }
        self.segments()
            .iter()
            .all(|s| !s.is_empty() && s.len() <= max_string_len)
    }

    /// Like [`PathName::validate`] but tolerates exactly one trailing `/`
    /// on a non-root path, which is what [`PathName::normalize_as_dir`]
    /// produces. Used at the [`list_dir`](crate::state::Root::list_dir)
    /// boundary, where callers may legitimately pass either `"/dir1"` or
    /// `"/dir1/"` (§4.7's own examples use the trailing-slash form).
    pub fn validate_as_dir(&self, max_string_len: usize, max_path_len: usize) -> bool {
        if self.0.len() > 1 && self.0.ends_with('/') {
            let trimmed: PathName = self.0[..self.0.len() - 1].to_owned().into();
            trimmed.validate(max_string_len, max_path_len)
        } else {
            self.validate(max_string_len, max_path_len)
        }
    }

    /// Normalizes a path for [`list_dir`](crate::state::Root::list_dir):
    /// ensures it ends with exactly one trailing `/` so the walker
    /// descends fully into the named directory. The empty path and bare
    /// `/` both normalize to root.
    pub fn normalize_as_dir(&self) -> PathName {
        if self.0.is_empty() || self.is_root() {
            return "/".into();
        }
        if self.0.ends_with('/') {
            self.clone()
        } else {
            format!("{}/", self.0).into()
        }
    }
}
