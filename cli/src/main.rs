// Copyright (c) 2026 Rackdeck Labs
// SPDX-License-Identifier: AGPL-3.0

//! # Rackdeck CLI
//!
//! The `rdc` binary is the command-line console for Rackdeck
//! infrastructure: machines, teams, storage volumes, distributed-storage
//! clusters, and the work queue.
//!
//! ## Contexts
//!
//! Every remote command runs against a named *context* stored in
//! `~/.rdc/contexts.json`. A context is either `cloud` (console API +
//! token), `local` (inventory kept in the context file), or `s3`
//! (inventory pushed to an S3 state vault, optionally sealed with a
//! master password).
//!
//! ## Commands
//!
//! - `rdc context create|create-local|create-s3|list|show|use|delete|to-s3|to-local`
//! - `rdc machine list|show|reboot|delete|logs`
//! - `rdc team list|show`
//! - `rdc storage list|show|browse`
//! - `rdc cluster list|status`
//! - `rdc queue list|show|cancel`

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

mod commands;

use commands::{
    ClusterCommand, ContextCommand, MachineCommand, QueueCommand, Scope, StorageCommand,
    TeamCommand,
};

/// Rackdeck console - manage machines, storage and queues
#[derive(Parser)]
#[command(name = "rdc")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Directory holding contexts.json (default: ~/.rdc)
    #[arg(long, global = true, env = "RDC_CONFIG_DIR", value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Context to run against (default: the selected context)
    #[arg(short = 'c', long, global = true, env = "RDC_CONTEXT", value_name = "NAME")]
    context: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "RDC_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage named contexts
    #[command(name = "context")]
    Context {
        #[command(subcommand)]
        command: ContextCommand,
    },

    /// Machine operations
    #[command(name = "machine")]
    Machine {
        #[command(subcommand)]
        command: MachineCommand,
    },

    /// Team operations
    #[command(name = "team")]
    Team {
        #[command(subcommand)]
        command: TeamCommand,
    },

    /// Storage volume operations
    #[command(name = "storage")]
    Storage {
        #[command(subcommand)]
        command: StorageCommand,
    },

    /// Distributed-storage cluster operations
    #[command(name = "cluster")]
    Cluster {
        #[command(subcommand)]
        command: ClusterCommand,
    },

    /// Work queue operations
    #[command(name = "queue")]
    Queue {
        #[command(subcommand)]
        command: QueueCommand,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        report_error(&err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    init_logging(&cli.log_level)?;

    let scope = Scope {
        config_dir: cli.config_dir,
        context: cli.context,
    };

    match cli.command {
        Commands::Context { command } => commands::context::handle_command(command, &scope).await,
        Commands::Machine { command } => commands::machine::handle_command(command, &scope).await,
        Commands::Team { command } => commands::team::handle_command(command, &scope).await,
        Commands::Storage { command } => commands::storage::handle_command(command, &scope).await,
        Commands::Cluster { command } => commands::cluster::handle_command(command, &scope).await,
        Commands::Queue { command } => commands::queue::handle_command(command, &scope).await,
    }
}

/// User-facing errors print bare; everything else keeps its chain.
fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<rdc_core::Error>() {
        Some(rdc_core::Error::Validation(msg)) => {
            eprintln!("{} {}", "✗".red(), msg);
        }
        Some(rdc_core::Error::WrongPassword) => {
            eprintln!("{} wrong master password", "✗".red());
        }
        _ => eprintln!("{} {:#}", "✗".red(), err),
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
