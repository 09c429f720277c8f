// Copyright (c) 2026 Rackdeck Labs
// SPDX-License-Identifier: AGPL-3.0

//! Storage volume commands
//!
//! Commands: list, show, browse

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use uuid::Uuid;

use rdc_core::domain::format_bytes;
use rdc_core::parse::listing::{self, FileKind};

use super::{console_client, Scope};

#[derive(Subcommand)]
pub enum StorageCommand {
    /// List storage volumes
    List,

    /// Show one storage volume
    Show {
        /// Storage ID
        #[arg(value_name = "STORAGE_ID")]
        id: Uuid,
    },

    /// Browse files on a storage volume
    Browse {
        /// Storage ID
        #[arg(value_name = "STORAGE_ID")]
        id: Uuid,

        /// Path to list (default: the volume root)
        #[arg(value_name = "PATH")]
        path: Option<String>,

        /// Long listing with size and mtime columns
        #[arg(short, long)]
        long: bool,
    },
}

pub async fn handle_command(command: StorageCommand, scope: &Scope) -> Result<()> {
    let store = scope.open_store()?;
    let client = console_client(&store, scope)?;

    match command {
        StorageCommand::List => {
            let volumes = client.list_storages().await?;
            if volumes.is_empty() {
                println!("{}", "No storage volumes".yellow());
                return Ok(());
            }
            println!("{} volume(s):", volumes.len());
            for v in volumes {
                println!(
                    "  {} {:<24} {:<8} {}",
                    v.id,
                    v.name,
                    v.kind,
                    usage(v.used_bytes, v.capacity_bytes)
                );
            }
            Ok(())
        }
        StorageCommand::Show { id } => {
            let v = client.get_storage(id).await?;
            println!("Storage {}", v.id);
            println!("  Name: {}", v.name.bold());
            println!("  Kind: {}", v.kind);
            if let Some(machine) = &v.machine {
                println!("  Machine: {}", machine);
            }
            println!("  Usage: {}", usage(v.used_bytes, v.capacity_bytes));
            Ok(())
        }
        StorageCommand::Browse { id, path, long } => {
            let path = path.as_deref().unwrap_or("/");
            let raw = client.browse_storage(id, path).await?;
            let entries = listing::parse(&raw);
            if entries.is_empty() {
                println!("{}", "Empty directory".yellow());
                return Ok(());
            }
            for entry in entries {
                let name = match entry.kind {
                    FileKind::Dir => format!("{}/", entry.name).blue().to_string(),
                    FileKind::Symlink => entry.name.cyan().to_string(),
                    FileKind::File => entry.name.clone(),
                };
                if long {
                    let size = entry
                        .size
                        .map(format_bytes)
                        .unwrap_or_else(|| "-".to_string());
                    let mtime = entry
                        .modified
                        .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!("{:>10}  {:<16}  {}", size, mtime, name);
                } else {
                    println!("{}", name);
                }
            }
            Ok(())
        }
    }
}

fn usage(used: Option<u64>, capacity: Option<u64>) -> String {
    match (used, capacity) {
        (Some(u), Some(c)) => format!("{} / {}", format_bytes(u), format_bytes(c)),
        (None, Some(c)) => format!("- / {}", format_bytes(c)),
        (Some(u), None) => format_bytes(u),
        (None, None) => "-".to_string(),
    }
}
