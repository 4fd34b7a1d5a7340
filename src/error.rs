/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Closed, comparable error type for the state machine (§7). Every
//! mutating and read-only operation fails through exactly one of these
//! variants; there is no partial success.

use thiserror::Error;

use crate::path::PathName;

pub type Result<T> = std::result::Result<T, FsError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    #[error("path '{0}' is syntactically invalid, missing, or targets root")]
    PathError(PathName),
    #[error("no entry at path '{0}'")]
    PathNotFound(PathName),
    #[error("arena mismatch: name index points at missing id for '{0}' (invariant broken)")]
    ArenaMismatch(PathName),
    #[error("file already exists at '{0}'")]
    FileAlreadyExists(PathName),
    #[error("directory already exists at '{0}'")]
    DirectoryAlreadyExists(PathName),
    #[error("rename paths '{0}' and '{1}' disagree on a non-terminal segment")]
    RenamePathMismatch(PathName, PathName),
    #[error("string '{0}' exceeds the maximum length")]
    StringTooLong(String),
    #[error("{0} tags exceeds the maximum allowed")]
    TooManyTags(usize),
    #[error("operation cannot target the root path")]
    InvalidPathOperationOnRoot,
    #[error("caller is not the root's bound authority")]
    Unauthorized,
}
