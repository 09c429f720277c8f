// Copyright (c) 2026 Rackdeck Labs
// SPDX-License-Identifier: AGPL-3.0

//! Distributed-storage cluster commands

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use uuid::Uuid;

use rdc_core::domain::{format_bytes, Cluster, ClusterHealth};

use super::{console_client, Scope};

#[derive(Subcommand)]
pub enum ClusterCommand {
    /// List clusters
    List,

    /// Show one cluster's record
    Show {
        /// Cluster ID
        #[arg(value_name = "CLUSTER_ID")]
        id: Uuid,
    },

    /// Show one cluster's health and usage
    Status {
        /// Cluster ID
        #[arg(value_name = "CLUSTER_ID")]
        id: Uuid,
    },
}

pub async fn handle_command(command: ClusterCommand, scope: &Scope) -> Result<()> {
    let store = scope.open_store()?;
    let client = console_client(&store, scope)?;

    match command {
        ClusterCommand::List => {
            let clusters = client.list_clusters().await?;
            if clusters.is_empty() {
                println!("{}", "No clusters".yellow());
                return Ok(());
            }
            println!("{} cluster(s):", clusters.len());
            for c in clusters {
                println!(
                    "  {} {:<24} {:<10} {} node(s)",
                    c.id,
                    c.name,
                    format_health(c.health),
                    c.nodes
                );
            }
            Ok(())
        }
        ClusterCommand::Show { id } => {
            let c = client.get_cluster(id).await?;
            print_cluster(&c);
            Ok(())
        }
        ClusterCommand::Status { id } => {
            let c = client.cluster_status(id).await?;
            print_cluster(&c);
            Ok(())
        }
    }
}

fn print_cluster(c: &Cluster) {
    println!("Cluster {}", c.id);
    println!("  Name: {}", c.name.bold());
    println!("  Health: {}", format_health(c.health));
    println!("  Nodes: {}", c.nodes);
    if let (Some(used), Some(capacity)) = (c.used_bytes, c.capacity_bytes) {
        let pct = if capacity > 0 {
            (used as f64 / capacity as f64) * 100.0
        } else {
            0.0
        };
        println!(
            "  Usage: {} / {} ({:.1}%)",
            format_bytes(used),
            format_bytes(capacity),
            pct
        );
    }
}

fn format_health(health: ClusterHealth) -> colored::ColoredString {
    match health {
        ClusterHealth::Healthy => "healthy".green(),
        ClusterHealth::Degraded => "degraded".yellow(),
        ClusterHealth::Offline => "offline".red(),
    }
}
