// Copyright (c) 2026 Rackdeck Labs
// SPDX-License-Identifier: AGPL-3.0

//! Work queue commands
//!
//! Commands: list, show, cancel

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use uuid::Uuid;

use rdc_core::domain::QueueState;

use super::{console_client, Scope};

#[derive(Subcommand)]
pub enum QueueCommand {
    /// List queue items
    List {
        /// Only show items in this state (pending, running, succeeded, failed, cancelled)
        #[arg(long, value_name = "STATE")]
        state: Option<String>,
    },

    /// Show one queue item
    Show {
        /// Queue item ID
        #[arg(value_name = "ITEM_ID")]
        id: Uuid,
    },

    /// Cancel a queue item
    Cancel {
        /// Queue item ID
        #[arg(value_name = "ITEM_ID")]
        id: Uuid,
    },
}

pub async fn handle_command(command: QueueCommand, scope: &Scope) -> Result<()> {
    let store = scope.open_store()?;
    let client = console_client(&store, scope)?;

    match command {
        QueueCommand::List { state } => {
            let items = client.list_queue(state.as_deref()).await?;
            if items.is_empty() {
                println!("{}", "Queue is empty".yellow());
                return Ok(());
            }
            println!("{} item(s):", items.len());
            for item in items {
                println!(
                    "  {} {:<24} {:<10} {}",
                    item.id,
                    item.kind,
                    format_state(item.state),
                    item.subject.as_deref().unwrap_or("-")
                );
            }
            Ok(())
        }
        QueueCommand::Show { id } => {
            let item = client.get_queue_item(id).await?;
            println!("Queue item {}", item.id);
            println!("  Kind: {}", item.kind.bold());
            println!("  State: {}", format_state(item.state));
            if let Some(subject) = &item.subject {
                println!("  Subject: {}", subject);
            }
            if let Some(error) = &item.error {
                println!("  Error: {}", error.red());
            }
            println!("  Created: {}", item.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
            if let Some(updated) = item.updated_at {
                println!("  Updated: {}", updated.format("%Y-%m-%d %H:%M:%S UTC"));
            }
            Ok(())
        }
        QueueCommand::Cancel { id } => {
            let item = client.get_queue_item(id).await?;
            if item.state.is_terminal() {
                println!(
                    "{}",
                    format!("Item {} is already {}", id, item.state).yellow()
                );
                return Ok(());
            }
            client.cancel_queue_item(id).await?;
            println!("{}", format!("✓ Queue item {} cancelled", id).green());
            Ok(())
        }
    }
}

fn format_state(state: QueueState) -> colored::ColoredString {
    match state {
        QueueState::Pending => "pending".normal(),
        QueueState::Running => "running".yellow(),
        QueueState::Succeeded => "succeeded".green(),
        QueueState::Failed => "failed".red(),
        QueueState::Cancelled => "cancelled".yellow(),
    }
}
