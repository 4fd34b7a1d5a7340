/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Logging bootstrap for binaries embedding this crate. The library
//! itself only ever calls the `log` macros; it never initializes a
//! logger, so tests and other embedders are free to install their own.

use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config as Log4rsConfig, Root as Log4rsRoot};
use log4rs::encode::pattern::PatternEncoder;

/// Installs a simple stderr logger at `level`. Intended for the `fsctl`
/// demo binary; library consumers embedding this crate in a larger
/// process should configure `log4rs` themselves instead.
pub fn init_logging(level: log::LevelFilter) -> anyhow::Result<()> {
    let stderr = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%dT%H:%M:%S)} {l} [{T}] {m}{n}",
        )))
        .build();
    let config = Log4rsConfig::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Log4rsRoot::builder().appender("stderr").build(level))?;
    log4rs::init_config(config)?;
    Ok(())
}
