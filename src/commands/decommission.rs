// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Node decommissioning: delete the volumes of every matching node,
//! then the nodes themselves.
//!
//! Each deletion is an independent unit of failure; a failed volume or
//! node is reported and counted but never stops the batch.

use std::time::Duration;

use crate::cli::DecommissionArgs;
use crate::client::types::{Node, Volume};
use crate::client::{DeleteOutcome, ManagementClient};
use crate::common::config::AppConfig;
use crate::common::confirm::{create_confirmer, Confirm};
use crate::error::Result;
use crate::filter::{volumes_for_node, NodeFilter};

/// One node slated for removal together with its volumes.
#[derive(Debug)]
pub struct NodeRemoval<'a> {
    pub node: &'a Node,
    pub volumes: Vec<&'a Volume>,
}

/// Pair every filtered node with its associated volumes.
pub fn plan_removals<'a>(
    nodes: &'a [Node],
    volumes: &'a [Volume],
    filter: &NodeFilter,
) -> Vec<NodeRemoval<'a>> {
    filter
        .apply(nodes)
        .into_iter()
        .map(|node| NodeRemoval {
            node,
            volumes: volumes_for_node(volumes, &node.name),
        })
        .collect()
}

/// Run the decommission command. Returns `false` when any deletion
/// failed.
pub async fn run(args: &DecommissionArgs) -> Result<bool> {
    let filter = NodeFilter::from_options(
        &args.nodes,
        args.pattern.as_deref(),
        args.contains.as_deref(),
        args.prefix.as_deref(),
    )?;

    println!("Connecting to {}...", args.connection.host);
    let client = ManagementClient::new(
        &args.connection.host,
        &args.connection.user,
        &args.connection.password,
    )?;

    println!("Fetching nodes...");
    let all_nodes = client.nodes().await?;
    println!("  Found {} total nodes", all_nodes.len());

    let matching = filter.apply(&all_nodes);
    if matching.is_empty() {
        println!("\nNo nodes found {}", filter.describe());
        return Ok(true);
    }

    println!("\nFound {} nodes {}:", matching.len(), filter.describe());
    for node in &matching {
        println!("  - {} (UUID: {})", node.name, node.uuid().unwrap_or("N/A"));
    }

    println!("\nFetching storage volumes...");
    let all_volumes = client.storage_volumes().await?;
    println!("  Found {} total volumes", all_volumes.len());

    let removals = plan_removals(&all_nodes, &all_volumes, &filter);

    let total_volumes: usize = removals.iter().map(|r| r.volumes.len()).sum();
    println!(
        "\n{}Will delete {} volumes from {} nodes:",
        if args.dry_run { "[DRY RUN] " } else { "" },
        total_volumes,
        removals.len()
    );
    for removal in &removals {
        println!("\n  Node: {}", removal.node.name);
        if removal.volumes.is_empty() {
            println!("    - (no volumes)");
        }
        for volume in &removal.volumes {
            println!("    - Volume: {}", volume.name);
        }
    }

    if args.dry_run {
        println!("\n[DRY RUN] No changes made.");
        return Ok(true);
    }

    let confirmer = create_confirmer(args.yes);
    if !args.yes {
        println!("\n{}", "=".repeat(60));
        println!("WARNING: This will permanently delete the above resources!");
        println!("{}", "=".repeat(60));
    }
    if !confirmer.confirm("Type 'yes' to confirm deletion:") {
        println!("Aborted.");
        return Ok(true);
    }

    println!("\n{}", "=".repeat(60));
    println!("PHASE 1: Deleting volumes...");
    println!("{}", "=".repeat(60));

    let mut deleted_volumes = 0;
    let mut failed_volumes = 0;

    for removal in &removals {
        if removal.volumes.is_empty() {
            continue;
        }
        println!("\nDeleting volumes for node '{}':", removal.node.name);
        for volume in &removal.volumes {
            match client.delete_volume(&volume.name).await {
                Ok(DeleteOutcome::Deleted) => {
                    println!("  Deleted: {}", volume.name);
                    deleted_volumes += 1;
                }
                Ok(DeleteOutcome::AlreadyGone) => {
                    println!("  Volume '{}' not found (already deleted?)", volume.name);
                    deleted_volumes += 1;
                }
                Err(e) => {
                    eprintln!("  Failed to delete volume '{}': {e}", volume.name);
                    failed_volumes += 1;
                }
            }
            tokio::time::sleep(Duration::from_millis(AppConfig::MUTATION_DELAY_MS)).await;
        }
    }

    println!("\nVolume deletion complete: {deleted_volumes} deleted, {failed_volumes} failed");

    println!("\n{}", "=".repeat(60));
    println!("PHASE 2: Deleting nodes...");
    println!("{}", "=".repeat(60));

    let mut deleted_nodes = 0;
    let mut failed_nodes = 0;

    for removal in &removals {
        let node_name = &removal.node.name;
        let Some(uuid) = removal.node.uuid() else {
            eprintln!("  Skipping node '{node_name}': no UUID found");
            failed_nodes += 1;
            continue;
        };

        println!("\nDeleting node: {node_name}...");
        match client.delete_node(uuid).await {
            Ok(DeleteOutcome::Deleted) => {
                println!("  Deleted: {node_name}");
                deleted_nodes += 1;
            }
            Ok(DeleteOutcome::AlreadyGone) => {
                println!("  Node '{node_name}' not found (already deleted?)");
                deleted_nodes += 1;
            }
            Err(e) => {
                eprintln!("  Failed to delete node '{node_name}': {e}");
                failed_nodes += 1;
            }
        }
        tokio::time::sleep(Duration::from_millis(AppConfig::MUTATION_DELAY_MS)).await;
    }

    println!("\nNode deletion complete: {deleted_nodes} deleted, {failed_nodes} failed");

    println!("\n{}", "=".repeat(60));
    println!("SUMMARY");
    println!("{}", "=".repeat(60));
    println!("Volumes: {deleted_volumes} deleted, {failed_volumes} failed");
    println!("Nodes:   {deleted_nodes} deleted, {failed_nodes} failed");

    Ok(failed_volumes == 0 && failed_nodes == 0)
}
