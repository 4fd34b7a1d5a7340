/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! A deterministic hierarchical filesystem state machine.
//!
//! [`state::Root`] owns a two-arena, name→id indexed directory tree (§2,
//! §3 of the design): a flat file arena, a flat directory arena, and
//! name→id indexes at root and at every directory that point into them.
//! The closed operation set in [`state::Root`]'s inherent methods is the
//! only way to mutate or inspect the tree; every operation is
//! all-or-nothing and reports failure through [`error::FsError`].

pub mod config;
pub mod error;
pub mod events;
pub mod ids;
pub mod limits;
pub mod logging;
pub mod node;
pub mod path;
pub mod persist;
pub mod state;
pub mod wire;

pub use config::{Config, Limits};
pub use error::{FsError, Result};
pub use events::{Event, EventSink, NullSink, RecordingSink};
pub use ids::{Authority, ObjectId};
pub use node::{DirObject, DirRecord, FileObject, ListEntry, RecursiveSnapshot};
pub use path::PathName;
pub use state::Root;
