/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The objects the arenas own, and the name→id indexes that point at them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ids::ObjectId;
use crate::path::Name;

/// An ordered `name -> id` index. Backed by an insertion-order-preserving
/// map so `list_dir` can report children in the order they were added,
/// per §4.7 ("callers must not rely on alphabetical ordering").
pub type NameIndex = IndexMap<Name, ObjectId>;

/// Per-file content metadata. The state machine never holds file bytes,
/// only this descriptor plus an opaque external blob id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileObject {
    pub create_ts: u64,
    pub tags: Vec<String>,
    pub size: u64,
    pub blob_id: String,
    pub end_epoch: u64,
}

/// A non-root directory. Root itself is not represented here; its child
/// indexes live directly on [`crate::state::Root`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirObject {
    pub create_ts: u64,
    pub tags: Vec<String>,
    pub children_files: NameIndex,
    pub children_directories: NameIndex,
}

impl DirObject {
    pub fn new(create_ts: u64, tags: Vec<String>) -> Self {
        DirObject {
            create_ts,
            tags,
            children_files: NameIndex::new(),
            children_directories: NameIndex::new(),
        }
    }
}

/// One entry as returned by `list_dir` / `stat`: a tagged sum of "this is
/// a directory" or "this is a file", expressed as a flat record rather
/// than an enum so it matches the wire format directly (§6, §9).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    pub name: Name,
    pub id: ObjectId,
    pub is_dir: bool,
    pub create_ts: u64,
    pub tags: Vec<String>,
    /// Zero for directories.
    pub size: u64,
    /// Empty for directories.
    pub blob_id: String,
    /// Zero for directories.
    pub end_epoch: u64,
}

impl ListEntry {
    pub fn from_dir(name: Name, id: ObjectId, dir: &DirObject) -> Self {
        ListEntry {
            name,
            id,
            is_dir: true,
            create_ts: dir.create_ts,
            tags: dir.tags.clone(),
            size: 0,
            blob_id: String::new(),
            end_epoch: 0,
        }
    }

    pub fn from_file(name: Name, id: ObjectId, file: &FileObject) -> Self {
        ListEntry {
            name,
            id,
            is_dir: false,
            create_ts: file.create_ts,
            tags: file.tags.clone(),
            size: file.size,
            blob_id: file.blob_id.clone(),
            end_epoch: file.end_epoch,
        }
    }
}

/// One directory's record within a [`RecursiveSnapshot`]: its own
/// metadata plus its two child indexes, each split into parallel
/// name/id sequences (§4.9 — the i-th name corresponds to the i-th id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirRecord {
    pub id: ObjectId,
    pub create_ts: u64,
    pub tags: Vec<String>,
    pub children_file_names: Vec<Name>,
    pub children_file_ids: Vec<ObjectId>,
    pub children_directory_names: Vec<Name>,
    pub children_directory_ids: Vec<ObjectId>,
}

impl DirRecord {
    pub fn new(id: ObjectId, dir: &DirObject) -> Self {
        let (children_file_names, children_file_ids) = dir
            .children_files
            .iter()
            .map(|(name, id)| (name.clone(), *id))
            .unzip();
        let (children_directory_names, children_directory_ids) = dir
            .children_directories
            .iter()
            .map(|(name, id)| (name.clone(), *id))
            .unzip();
        DirRecord {
            id,
            create_ts: dir.create_ts,
            tags: dir.tags.clone(),
            children_file_names,
            children_file_ids,
            children_directory_names,
            children_directory_ids,
        }
    }
}

/// The full result of `get_dir_all`: the id of the directory resolved,
/// every descendant file (inclusive) keyed by id, and every descendant
/// directory (inclusive) as a [`DirRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecursiveSnapshot {
    pub dir_id: ObjectId,
    pub files: Vec<(ObjectId, FileObject)>,
    pub dirs: Vec<DirRecord>,
}
