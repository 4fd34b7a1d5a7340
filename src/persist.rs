/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Root persistence (§6): the root object is the unit of persistence and
//! must round-trip bit-for-bit across restarts, arena-coherence invariant
//! included. This module encodes/decodes a [`Root`] using exactly the
//! wire format in §6 rather than a generic serializer, since the wire
//! format is itself part of the spec's contract (shared with any event
//! sink that forwards payloads off-process).

use std::collections::HashMap;

use crate::config::Limits;
use crate::ids::{Authority, ObjectId};
use crate::node::{DirObject, FileObject, NameIndex};
use crate::state::Root;
use crate::wire::{Reader, WireError, Writer};

pub fn encode_root(root: &Root) -> Vec<u8> {
    let mut w = Writer::new();
    w.write_u64(root.current_epoch);
    w.write_id(root.obj_id_counter);
    w.write_str(&root.authority.0);
    write_limits(&mut w, &root.limits);
    write_name_index(&mut w, &root.children_files);
    write_name_index(&mut w, &root.children_directories);

    let mut files: Vec<(&ObjectId, &FileObject)> = root.file_arena.iter().collect();
    files.sort_by_key(|(id, _)| **id);
    w.write_seq(&files, |w, (id, file)| {
        w.write_id(**id);
        write_file_object(w, file);
    });

    let mut dirs: Vec<(&ObjectId, &DirObject)> = root.dir_arena.iter().collect();
    dirs.sort_by_key(|(id, _)| **id);
    w.write_seq(&dirs, |w, (id, dir)| {
        w.write_id(**id);
        write_dir_object(w, dir);
    });

    w.into_bytes()
}

pub fn decode_root(bytes: &[u8]) -> Result<Root, WireError> {
    let mut r = Reader::new(bytes);
    let current_epoch = r.read_u64()?;
    let obj_id_counter = r.read_id()?;
    let authority = Authority(r.read_str()?);
    let limits = read_limits(&mut r)?;
    let children_files = read_name_index(&mut r)?;
    let children_directories = read_name_index(&mut r)?;

    let file_entries = r.read_seq(|r| {
        let id = r.read_id()?;
        let file = read_file_object(r)?;
        Ok((id, file))
    })?;
    let file_arena: HashMap<ObjectId, FileObject> = file_entries.into_iter().collect();

    let dir_entries = r.read_seq(|r| {
        let id = r.read_id()?;
        let dir = read_dir_object(r)?;
        Ok((id, dir))
    })?;
    let dir_arena: HashMap<ObjectId, DirObject> = dir_entries.into_iter().collect();

    r.finish()?;
    Ok(Root {
        current_epoch,
        obj_id_counter,
        authority,
        children_files,
        children_directories,
        file_arena,
        dir_arena,
        limits,
    })
}

fn write_limits(w: &mut Writer, limits: &Limits) {
    w.write_uleb128(limits.max_tags as u64);
    w.write_uleb128(limits.max_string_len as u64);
    w.write_uleb128(limits.max_path_len as u64);
}

fn read_limits(r: &mut Reader) -> Result<Limits, WireError> {
    Ok(Limits {
        max_tags: r.read_uleb128()? as usize,
        max_string_len: r.read_uleb128()? as usize,
        max_path_len: r.read_uleb128()? as usize,
    })
}

fn write_tags(w: &mut Writer, tags: &[String]) {
    w.write_seq(tags, |w, tag| w.write_str(tag));
}

fn read_tags(r: &mut Reader) -> Result<Vec<String>, WireError> {
    r.read_seq(|r| r.read_str())
}

fn write_name_index(w: &mut Writer, index: &NameIndex) {
    let entries: Vec<(&String, &ObjectId)> = index.iter().collect();
    w.write_seq(&entries, |w, (name, id)| {
        w.write_str(name);
        w.write_id(**id);
    });
}

fn read_name_index(r: &mut Reader) -> Result<NameIndex, WireError> {
    let entries = r.read_seq(|r| {
        let name = r.read_str()?;
        let id = r.read_id()?;
        Ok((name, id))
    })?;
    Ok(entries.into_iter().collect())
}

fn write_file_object(w: &mut Writer, file: &FileObject) {
    w.write_u64(file.create_ts);
    write_tags(w, &file.tags);
    w.write_u64(file.size);
    w.write_str(&file.blob_id);
    w.write_u64(file.end_epoch);
}

fn read_file_object(r: &mut Reader) -> Result<FileObject, WireError> {
    Ok(FileObject {
        create_ts: r.read_u64()?,
        tags: read_tags(r)?,
        size: r.read_u64()?,
        blob_id: r.read_str()?,
        end_epoch: r.read_u64()?,
    })
}

fn write_dir_object(w: &mut Writer, dir: &DirObject) {
    w.write_u64(dir.create_ts);
    write_tags(w, &dir.tags);
    write_name_index(w, &dir.children_files);
    write_name_index(w, &dir.children_directories);
}

fn read_dir_object(r: &mut Reader) -> Result<DirObject, WireError> {
    Ok(DirObject {
        create_ts: r.read_u64()?,
        tags: read_tags(r)?,
        children_files: read_name_index(r)?,
        children_directories: read_name_index(r)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullSink;
    use crate::path::PathName;

    #[test]
    fn test_round_trip_empty_root() {
        let root = Root::initialize(Authority::from("auth-1"), Limits::default());
        let bytes = encode_root(&root);
        let restored = decode_root(&bytes).unwrap();
        assert_eq!(root.current_epoch, restored.current_epoch);
        assert_eq!(root.obj_id_counter, restored.obj_id_counter);
        assert_eq!(root.authority, restored.authority);
        assert!(restored.file_arena.is_empty());
        assert!(restored.dir_arena.is_empty());
    }

    #[test]
    fn test_round_trip_with_tree() {
        let authority = Authority::from("auth-1");
        let mut root = Root::initialize(authority.clone(), Limits::default());
        let mut sink = NullSink;
        root.add_dir(&authority, &PathName::from("/docs"), vec!["folder".into()], 10, &mut sink)
            .unwrap();
        root.add_file(
            &authority,
            &PathName::from("/docs/readme.md"),
            vec![],
            128,
            "blob-1".into(),
            500,
            false,
            11,
            &mut sink,
        )
        .unwrap();

        let bytes = encode_root(&root);
        let restored = decode_root(&bytes).unwrap();

        assert_eq!(root.file_arena, restored.file_arena);
        assert_eq!(root.dir_arena, restored.dir_arena);
        assert_eq!(root.children_directories, restored.children_directories);
        assert_eq!(root.obj_id_counter, restored.obj_id_counter);

        // and the restored root is still a fully functional state machine.
        let stat = restored.stat(&PathName::from("/docs/readme.md")).unwrap();
        assert_eq!(128, stat.size);
    }

    #[test]
    fn test_decode_truncated_bytes_errors() {
        let root = Root::initialize(Authority::from("auth-1"), Limits::default());
        let mut bytes = encode_root(&root);
        bytes.truncate(bytes.len() - 1);
        assert!(decode_root(&bytes).is_err());
    }
}
