/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Host-tunable knobs the spec leaves implementation-defined, loaded the
//! way the teacher's own `Config` is: a `serde`-derived struct read from
//! TOML.

use serde::{Deserialize, Serialize};

use crate::limits::{DEFAULT_MAX_PATH_LEN, MAX_STRING_LEN, MAX_TAGS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub max_tags: usize,
    pub max_string_len: usize,
    pub max_path_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_tags: MAX_TAGS,
            max_string_len: MAX_STRING_LEN,
            max_path_len: DEFAULT_MAX_PATH_LEN,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Where a snapshot of the root is read from / written to by the
    /// `fsctl` demo binary. Not consulted by the library itself.
    pub snapshot_path: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        PersistenceConfig {
            snapshot_path: "statefs.snapshot".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub limits: Limits,
    pub persistence: PersistenceConfig,
}

impl Config {
    pub fn from_toml_str(source: &str) -> Result<Config, toml::de::Error> {
        toml::from_str(source)
    }
}
