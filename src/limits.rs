/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Bit-exact limits on the shapes of values the state machine will accept.

/// Maximum number of tags a file or directory may carry.
pub const MAX_TAGS: usize = 5;

/// Maximum byte length (not codepoint length) of any stored string: a tag,
/// a blob id, or a single path segment.
pub const MAX_STRING_LEN: usize = 64;

/// Default maximum total byte length of a path. Implementation-defined,
/// but must be at least `6 * MAX_STRING_LEN` per the spec.
pub const DEFAULT_MAX_PATH_LEN: usize = 6 * MAX_STRING_LEN;
