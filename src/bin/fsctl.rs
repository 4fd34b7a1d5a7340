/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! A one-shot CLI for driving a [`statefs_core::Root`]: each invocation
//! loads the persisted snapshot (or initializes a fresh root the first
//! time), applies a single operation, prints the result, and writes the
//! snapshot back out. Manual smoke-test harness, not a server.

use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{info, LevelFilter};

use statefs_core::config::Config;
use statefs_core::events::RecordingSink;
use statefs_core::ids::Authority;
use statefs_core::logging::init_logging;
use statefs_core::path::PathName;
use statefs_core::persist::{decode_root, encode_root};
use statefs_core::state::Root;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file in TOML format.
    #[arg(long, default_value_t = String::from("./config.toml"))]
    pub config_path: String,

    /// Authority to act as. Only consulted the first time a root is
    /// initialized; later invocations use the authority already bound
    /// to the persisted snapshot.
    #[arg(long, default_value_t = String::from("demo-authority"))]
    pub authority: String,

    /// Print read-only results as JSON instead of the plain-text table.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
#[clap(rename_all = "kebab_case")]
pub enum Command {
    /// Create an empty root at the configured snapshot path, or do
    /// nothing if one already exists.
    Init,
    /// Advance the root's current epoch.
    UpdateEpoch { epoch: u64 },
    AddFile {
        path: String,
        #[arg(long, value_delimiter = ',', default_value = "")]
        tags: Vec<String>,
        #[arg(long)]
        size: u64,
        #[arg(long)]
        blob_id: String,
        #[arg(long, default_value_t = 0)]
        end_epoch: u64,
        #[arg(long, default_value_t = false)]
        overwrite: bool,
    },
    AddDir {
        path: String,
        #[arg(long, value_delimiter = ',', default_value = "")]
        tags: Vec<String>,
    },
    RenameFile {
        from: String,
        to: String,
    },
    RenameDir {
        from: String,
        to: String,
    },
    DeleteFile {
        path: String,
    },
    DeleteDir {
        path: String,
    },
    /// List the direct children of a directory.
    List { path: String },
    /// Look up a single file or directory entry.
    Stat { path: String },
    /// Dump a directory and everything reachable under it.
    GetAll { path: String },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    init_logging(LevelFilter::Info).context("failed to init logger")?;
    let args = Args::parse();

    let config = match fs::read_to_string(&args.config_path) {
        Ok(raw) => Config::from_toml_str(&raw).context("failed to parse configuration")?,
        Err(_) => Config::default(),
    };

    let mut root = match fs::read(&config.persistence.snapshot_path) {
        Ok(bytes) => {
            info!("loaded snapshot from '{}'", config.persistence.snapshot_path);
            decode_root(&bytes).context("failed to decode persisted snapshot")?
        }
        Err(_) => {
            info!("no snapshot found, initializing fresh root");
            Root::initialize(Authority::from(args.authority.as_str()), config.limits.clone())
        }
    };
    let authority = root.authority.clone();
    let mut sink = RecordingSink::default();

    match args.command {
        Command::Init => {}
        Command::UpdateEpoch { epoch } => {
            root.update_epoch(&authority, epoch)?;
        }
        Command::AddFile {
            path,
            tags,
            size,
            blob_id,
            end_epoch,
            overwrite,
        } => {
            let id = root.add_file(
                &authority,
                &PathName::from(path),
                non_empty_tags(tags),
                size,
                blob_id,
                end_epoch,
                overwrite,
                now_ms(),
                &mut sink,
            )?;
            println!("{id}");
        }
        Command::AddDir { path, tags } => {
            let id = root.add_dir(
                &authority,
                &PathName::from(path),
                non_empty_tags(tags),
                now_ms(),
                &mut sink,
            )?;
            println!("{id}");
        }
        Command::RenameFile { from, to } => {
            root.rename_file(&authority, &PathName::from(from), &PathName::from(to))?;
        }
        Command::RenameDir { from, to } => {
            root.rename_dir(&authority, &PathName::from(from), &PathName::from(to))?;
        }
        Command::DeleteFile { path } => {
            root.delete_file(&authority, &PathName::from(path), &mut sink)?;
        }
        Command::DeleteDir { path } => {
            root.delete_dir(&authority, &PathName::from(path), &mut sink)?;
        }
        Command::List { path } => {
            let entries = root.list_dir(&PathName::from(path))?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for entry in &entries {
                    print_entry(entry);
                }
            }
        }
        Command::Stat { path } => {
            let entry = root.stat(&PathName::from(path))?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&entry)?);
            } else {
                print_entry(&entry);
            }
        }
        Command::GetAll { path } => {
            let snapshot = root.get_dir_all(&PathName::from(path))?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                println!(
                    "dir {}: {} files, {} directories",
                    snapshot.dir_id,
                    snapshot.files.len(),
                    snapshot.dirs.len()
                );
            }
        }
    }

    for event in &sink.events {
        info!("{event:?}");
    }

    fs::write(&config.persistence.snapshot_path, encode_root(&root))
        .context("failed to write snapshot")?;
    Ok(())
}

fn non_empty_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter().filter(|t| !t.is_empty()).collect()
}

fn print_entry(entry: &statefs_core::node::ListEntry) {
    if entry.is_dir {
        println!("d {} {}", entry.id, entry.name);
    } else {
        println!("f {} {} size={} blob={}", entry.id, entry.name, entry.size, entry.blob_id);
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_millis() as u64
}
