// Copyright (c) 2026 Rackdeck Labs
// SPDX-License-Identifier: AGPL-3.0

//! Machine operations commands
//!
//! Commands: list, show, reboot, delete, logs

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use uuid::Uuid;

use rdc_core::domain::MachineStatus;
use rdc_core::parse::{log, progress};

use super::{confirm, console_client, Scope};

#[derive(Subcommand)]
pub enum MachineCommand {
    /// List machines
    List,

    /// Show one machine
    Show {
        /// Machine ID
        #[arg(value_name = "MACHINE_ID")]
        id: Uuid,
    },

    /// Reboot a machine
    Reboot {
        /// Machine ID
        #[arg(value_name = "MACHINE_ID")]
        id: Uuid,
    },

    /// Delete a machine
    Delete {
        /// Machine ID
        #[arg(value_name = "MACHINE_ID")]
        id: Uuid,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Fetch and render machine logs
    Logs {
        /// Machine ID
        #[arg(value_name = "MACHINE_ID")]
        id: Uuid,

        /// Only fetch the last N lines
        #[arg(long, value_name = "N")]
        tail: Option<usize>,

        /// Only show warnings and errors
        #[arg(long)]
        errors_only: bool,

        /// Render provisioning progress markers as a bar
        #[arg(long)]
        progress: bool,
    },
}

pub async fn handle_command(command: MachineCommand, scope: &Scope) -> Result<()> {
    let store = scope.open_store()?;
    let client = console_client(&store, scope)?;

    match command {
        MachineCommand::List => {
            let machines = client.list_machines().await?;
            if machines.is_empty() {
                println!("{}", "No machines".yellow());
                return Ok(());
            }
            println!("{} machine(s):", machines.len());
            for m in machines {
                println!(
                    "  {} {:<24} {:<14} {}",
                    m.id,
                    m.name,
                    format_status(m.status),
                    m.host
                );
            }
            Ok(())
        }
        MachineCommand::Show { id } => {
            let m = client.get_machine(id).await?;
            println!("Machine {}", m.id);
            println!("  Name: {}", m.name.bold());
            println!("  Host: {}", m.host);
            println!("  Status: {}", format_status(m.status));
            if let Some(team) = &m.team {
                println!("  Team: {}", team);
            }
            if let Some(region) = &m.region {
                println!("  Region: {}", region);
            }
            println!("  Created: {}", m.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
            Ok(())
        }
        MachineCommand::Reboot { id } => {
            client.reboot_machine(id).await?;
            println!("{}", format!("✓ Reboot requested for {}", id).green());
            Ok(())
        }
        MachineCommand::Delete { id, yes } => {
            if !confirm(&format!("delete machine {}", id), yes)? {
                println!("{}", "Aborted".yellow());
                return Ok(());
            }
            client.delete_machine(id).await?;
            println!("{}", format!("✓ Machine {} deleted", id).green());
            Ok(())
        }
        MachineCommand::Logs {
            id,
            tail,
            errors_only,
            progress,
        } => {
            let raw = client.machine_logs(id, tail).await?;
            if progress {
                render_progress(&raw);
                return Ok(());
            }
            let entries = log::parse(&raw);
            if errors_only {
                for entry in log::errors(&entries) {
                    print_entry(entry);
                }
            } else {
                for entry in &entries {
                    print_entry(entry);
                }
            }
            Ok(())
        }
    }
}

fn print_entry(entry: &log::LogEntry) {
    let level = match entry.level {
        log::LogLevel::Error => "ERROR".red().bold(),
        log::LogLevel::Warn => "WARN ".yellow(),
        log::LogLevel::Info => "INFO ".green(),
        log::LogLevel::Debug => "DEBUG".blue(),
        log::LogLevel::Trace => "TRACE".dimmed(),
    };
    match entry.timestamp {
        Some(ts) => println!(
            "{} {} {}",
            ts.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
            level,
            entry.message
        ),
        None => println!("{} {}", level, entry.message),
    }
}

/// Replay progress markers found in the log text through a bar.
fn render_progress(raw: &str) {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let mut seen = false;
    for line in raw.lines() {
        if let Some(p) = progress::parse_line(line) {
            seen = true;
            if let Some(ratio) = p.ratio() {
                bar.set_position((ratio * 100.0).round() as u64);
            }
            if let Some((current, total)) = p.step {
                bar.set_message(format!("step {}/{}", current, total));
            }
            if let Some(eta) = p.eta {
                bar.set_message(format!("eta {}s", eta.as_secs()));
            }
        }
    }
    if !seen {
        bar.finish_and_clear();
        println!("{}", "No progress markers found in the logs".yellow());
        return;
    }
    bar.abandon();
}

fn format_status(status: MachineStatus) -> colored::ColoredString {
    match status {
        MachineStatus::Online => "online".green(),
        MachineStatus::Offline => "offline".red(),
        MachineStatus::Provisioning => "provisioning".yellow(),
        MachineStatus::Error => "error".red().bold(),
    }
}
