/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Events are a side channel consumed by off-chain indexers; they are
//! not part of any operation's return value (§9). A [`Root`](crate::state::Root)
//! is handed a pluggable sink at construction time and pushes events
//! through it as operations commit (or, for the `*AlreadyExists`
//! variants, just before they abort).

use serde::{Deserialize, Serialize};

use crate::ids::ObjectId;
use crate::node::{DirObject, FileObject};
use crate::path::PathName;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    FileAdded {
        path: PathName,
        id: ObjectId,
        metadata: FileObject,
    },
    FileAlreadyExists {
        path: PathName,
        existing_id: ObjectId,
        existing_metadata: FileObject,
    },
    DirAdded {
        path: PathName,
        id: ObjectId,
        metadata: DirMetadata,
    },
    DirAlreadyExists {
        path: PathName,
        existing_id: ObjectId,
        existing_metadata: DirMetadata,
    },
    Deleted {
        path: PathName,
    },
}

/// The subset of [`DirObject`] worth carrying on an event payload: its
/// own metadata, not its children (those are reachable separately via
/// `get_dir_all` and would make every `DirAlreadyExists` event an
/// unbounded-size payload).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirMetadata {
    pub create_ts: u64,
    pub tags: Vec<String>,
}

impl From<&DirObject> for DirMetadata {
    fn from(dir: &DirObject) -> Self {
        DirMetadata {
            create_ts: dir.create_ts,
            tags: dir.tags.clone(),
        }
    }
}

/// A pluggable capability that consumes events as they are emitted. A
/// function pointer / closure is sufficient, matching §9's "function-typed
/// capability" guidance.
pub trait EventSink {
    fn emit(&mut self, event: Event);
}

impl<F: FnMut(Event)> EventSink for F {
    fn emit(&mut self, event: Event) {
        self(event)
    }
}

/// An [`EventSink`] that discards everything. Useful when a caller has no
/// off-chain indexer attached and does not want to thread an `Option`
/// through every call site.
#[derive(Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: Event) {}
}

/// An [`EventSink`] that appends every event to an in-memory `Vec`, handy
/// for tests and for the `fsctl` demo binary.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<Event>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: Event) {
        self.events.push(event);
    }
}
