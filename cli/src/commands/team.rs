// Copyright (c) 2026 Rackdeck Labs
// SPDX-License-Identifier: AGPL-3.0

//! Team operations commands

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use uuid::Uuid;

use super::{console_client, Scope};

#[derive(Subcommand)]
pub enum TeamCommand {
    /// List teams
    List,

    /// Show one team
    Show {
        /// Team ID
        #[arg(value_name = "TEAM_ID")]
        id: Uuid,
    },
}

pub async fn handle_command(command: TeamCommand, scope: &Scope) -> Result<()> {
    let store = scope.open_store()?;
    let client = console_client(&store, scope)?;

    match command {
        TeamCommand::List => {
            let teams = client.list_teams().await?;
            if teams.is_empty() {
                println!("{}", "No teams".yellow());
                return Ok(());
            }
            println!("{} team(s):", teams.len());
            for t in teams {
                println!("  {} {:<24} {} member(s)", t.id, t.name, t.member_count);
            }
            Ok(())
        }
        TeamCommand::Show { id } => {
            let t = client.get_team(id).await?;
            println!("Team {}", t.id);
            println!("  Name: {}", t.name.bold());
            if let Some(desc) = &t.description {
                println!("  Description: {}", desc);
            }
            println!("  Members: {}", t.member_count);
            Ok(())
        }
    }
}
