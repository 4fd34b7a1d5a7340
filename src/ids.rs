/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! 256-bit object identifiers.
//!
//! Zero is the reserved "root" sentinel; real objects start at 1. The
//! counter that mints them only ever grows, so ids are never reused even
//! after their object is deleted.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// A 256-bit unsigned integer stored as four little-endian `u64` limbs
/// (`limbs[0]` is least significant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId([u64; 4]);

impl ObjectId {
    /// The sentinel identifying the root. Never assigned to a real object.
    pub const ROOT: ObjectId = ObjectId([0, 0, 0, 0]);

    pub fn is_root(&self) -> bool {
        *self == Self::ROOT
    }

    /// Returns `self + 1`, wrapping is not expected to be reachable in
    /// practice (2^256 allocations) but is defined as saturating-on-carry
    /// wraparound of the limbs rather than a panic, since this type has no
    /// use for the overflow-checked arithmetic the spec never calls for.
    pub fn next(&self) -> ObjectId {
        let mut limbs = self.0;
        for limb in limbs.iter_mut() {
            let (next, carry) = limb.overflowing_add(1);
            *limb = next;
            if !carry {
                break;
            }
        }
        ObjectId(limbs)
    }

    /// 32 little-endian bytes, per the wire format.
    pub fn to_le_bytes(self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for (i, limb) in self.0.iter().enumerate() {
            out[i * 8..i * 8 + 8].copy_from_slice(&limb.to_le_bytes());
        }
        out
    }

    pub fn from_le_bytes(bytes: [u8; 32]) -> ObjectId {
        let mut limbs = [0u64; 4];
        for (i, limb) in limbs.iter_mut().enumerate() {
            let mut chunk = [0u8; 8];
            chunk.copy_from_slice(&bytes[i * 8..i * 8 + 8]);
            *limb = u64::from_le_bytes(chunk);
        }
        ObjectId(limbs)
    }
}

impl From<u64> for ObjectId {
    fn from(value: u64) -> Self {
        ObjectId([value, 0, 0, 0])
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}{:016x}{:016x}{:016x}", self.0[3], self.0[2], self.0[1], self.0[0])
    }
}

/// Opaque identity of the single authority permitted to mutate a root.
///
/// In a non-blockchain port this is whatever key the host derives the
/// root's storage slot from (e.g. a hash of a signer's public key); the
/// state machine only ever compares it for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Authority(pub String);

impl Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Authority {
    fn from(value: &str) -> Self {
        Authority(value.to_owned())
    }
}
