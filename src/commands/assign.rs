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

//! Zone assignment: reconcile volume names against the instance
//! inventory.
//!
//! The run learns existing assignments before allocating anything, so a
//! fabric that already owns `AZ1` on the remote system keeps it across
//! re-runs, and newly seen fabrics continue from one past the highest
//! learned index.

use std::collections::HashMap;
use std::time::Duration;

use tracing::warn;

use crate::cli::AssignArgs;
use crate::client::types::Volume;
use crate::client::ManagementClient;
use crate::common::config::AppConfig;
use crate::common::confirm::{create_confirmer, Confirm};
use crate::error::{Error, Result};
use crate::inventory::cloud::{CloudInventoryClient, CloudQuery};
use crate::inventory::fabric_file::load_fabric_file;
use crate::inventory::{AzSource, Inventory};
use crate::report::write_instance_report;
use crate::zone::{format_name, tail, FabricZoneMapper, VolumeName};

/// A volume whose name needs the zone prefix added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    pub current_name: String,
    pub new_name: String,
    pub uuid: Option<String>,
    pub node: String,
    pub zone: String,
}

/// Classification of every remote volume against the inventory.
#[derive(Debug, Default)]
pub struct VolumePlan {
    pub renames: Vec<RenamePlan>,
    /// (volume name, existing zone) pairs left untouched.
    pub already_labelled: Vec<(String, String)>,
    /// (volume name, node name) pairs with no zone data available.
    pub unmappable: Vec<(String, String)>,
}

/// Zone labels already on the remote system, joined to fabric ids.
///
/// For every volume whose name carries a zone and whose node is in the
/// inventory with a non-empty fabric id, the (fabric, zone) pair is
/// recorded; the first zone observed for a fabric wins.
pub fn learn_existing_zones(
    volumes: &[Volume],
    inventory: &Inventory,
) -> HashMap<String, String> {
    let mut learned = HashMap::new();

    for volume in volumes {
        let parsed = VolumeName::parse(&volume.name);
        if parsed.zone.is_empty() || parsed.node.is_empty() {
            continue;
        }
        let Some(instance) = inventory.get(&parsed.node) else {
            continue;
        };
        if instance.fabric_id.is_empty() {
            continue;
        }
        learned
            .entry(instance.fabric_id.clone())
            .or_insert(parsed.zone);
    }

    learned
}

/// Classify every volume: already labelled, unmappable, or pending
/// rename. Pure; the caller decides whether to apply.
pub fn plan_volume_updates(volumes: &[Volume], inventory: &Inventory) -> VolumePlan {
    let mut plan = VolumePlan::default();

    for volume in volumes {
        let parsed = VolumeName::parse(&volume.name);

        if !parsed.zone.is_empty() {
            plan.already_labelled
                .push((volume.name.clone(), parsed.zone));
            continue;
        }

        let zone = inventory
            .get(&parsed.node)
            .map(|instance| instance.zone.clone())
            .unwrap_or_default();
        if zone.is_empty() {
            plan.unmappable.push((volume.name.clone(), parsed.node));
            continue;
        }

        plan.renames.push(RenamePlan {
            current_name: volume.name.clone(),
            new_name: format_name(&zone, &parsed.node, &parsed.path),
            uuid: volume.uuid().map(str::to_string),
            node: parsed.node,
            zone,
        });
    }

    plan
}

/// Run the assign command. Returns `false` when any rename failed.
pub async fn run(args: &AssignArgs) -> Result<bool> {
    if args.az_source == AzSource::FaultDomain && args.fabric_file.is_some() {
        return Err(Error::Config(
            "--az-source fault-domain needs cloud inventory data; it cannot be combined with --fabric-file".to_string(),
        ));
    }

    let client = ManagementClient::new(
        &args.connection.host,
        &args.connection.user,
        &args.connection.password,
    )?;

    // Load the instance inventory from the chosen source.
    let mut inventory = if let Some(path) = &args.fabric_file {
        println!("Loading fabric data from {}...", path.display());
        let inventory = load_fabric_file(path, &args.shape)?;
        println!("  Found {} instances in file", inventory.len());
        inventory
    } else {
        let compartment_id = args
            .compartment_id
            .clone()
            .ok_or_else(|| Error::Config("either --fabric-file or --compartment-id is required".to_string()))?;
        let inventory_url = args
            .inventory_url
            .as_deref()
            .ok_or_else(|| Error::Config("--inventory-url is required with --compartment-id".to_string()))?;

        println!("Querying cloud inventory for instances in compartment...");
        println!(
            "  Filters: shape={}, lifecycle_state={}",
            args.shape, args.lifecycle_state
        );
        let cloud = CloudInventoryClient::new(inventory_url)?;
        let inventory = cloud
            .instances(&CloudQuery {
                compartment_id,
                shape: Some(args.shape.clone()),
                lifecycle_state: args.lifecycle_state.clone(),
            })
            .await?;
        println!("  Found {} matching instances", inventory.len());
        inventory
    };

    // Learn existing assignments before allocating anything.
    let mut mapper = FabricZoneMapper::new();
    println!(
        "\nConnecting to {} to learn existing zone assignments...",
        args.connection.host
    );
    match client.storage_volumes().await {
        Ok(existing_volumes) => {
            println!("  Found {} existing volumes", existing_volumes.len());
            let learned = learn_existing_zones(&existing_volumes, &inventory);
            for (fabric, zone) in &learned {
                println!("    Learned: {} -> ...{}", zone, tail(fabric, AppConfig::FABRIC_DISPLAY_CHARS));
            }
            if learned.is_empty() {
                println!("  No existing zone assignments found");
            } else {
                mapper.learn(&learned);
                println!("  Learned {} existing zone assignments", learned.len());
                println!("  Next new zone will be: AZ{}", mapper.next_index());
            }
        }
        Err(e) => {
            warn!("could not fetch existing volumes: {e}");
            eprintln!("  Warning: could not fetch existing volumes: {e}");
            eprintln!("  Proceeding without learning existing assignments...");
        }
    }

    inventory.assign_zones(&mut mapper, args.az_source);

    print_mapping(&mapper);
    print_instances(&inventory);
    write_instance_report(&inventory, &args.output)?;

    if args.report_only {
        println!("\n[REPORT ONLY] Exiting without modifying volumes.");
        return Ok(true);
    }

    println!("\nRefreshing storage volumes list...");
    let volumes = client.storage_volumes().await?;
    println!("  Found {} total volumes", volumes.len());

    let plan = plan_volume_updates(&volumes, &inventory);
    print_plan(&plan);

    if plan.renames.is_empty() {
        println!("\nNo changes needed - all volumes have correct zone prefixes");
        return Ok(true);
    }

    if args.dry_run {
        println!("\n[DRY RUN] No changes made.");
        return Ok(true);
    }

    let confirmer = create_confirmer(args.yes);
    if !args.yes {
        println!("\n{}", "=".repeat(70));
        println!("WARNING: This will rename the volumes listed above!");
        println!("{}", "=".repeat(70));
    }
    if !confirmer.confirm("Type 'yes' to confirm:") {
        println!("Aborted.");
        return Ok(true);
    }

    let (renamed, failed) = apply_renames(&client, &plan.renames).await;

    println!("\n{}", "=".repeat(70));
    println!("FINAL SUMMARY");
    println!("{}", "=".repeat(70));
    println!("Successfully updated: {renamed}");
    println!("Failed: {failed}");
    println!("Skipped (existing zone): {}", plan.already_labelled.len());
    println!("No instance match: {}", plan.unmappable.len());

    Ok(failed == 0)
}

async fn apply_renames(client: &ManagementClient, renames: &[RenamePlan]) -> (usize, usize) {
    println!("\n{}", "=".repeat(70));
    println!("APPLYING CHANGES");
    println!("{}", "=".repeat(70));

    let mut renamed = 0;
    let mut failed = 0;

    for plan in renames {
        println!("\nRenaming: {} -> {}", plan.current_name, plan.new_name);
        match client
            .rename_volume(&plan.current_name, &plan.new_name, plan.uuid.as_deref())
            .await
        {
            Ok(()) => {
                println!("  Renamed");
                renamed += 1;
            }
            Err(e) => {
                eprintln!("  Failed to rename: {e}");
                failed += 1;
            }
        }
        tokio::time::sleep(Duration::from_millis(AppConfig::MUTATION_DELAY_MS)).await;
    }

    (renamed, failed)
}

fn print_mapping(mapper: &FabricZoneMapper) {
    if mapper.mapping().is_empty() {
        return;
    }
    println!("\n  Fabric to zone mapping:");
    println!("  {}", "-".repeat(80));
    let mut entries: Vec<_> = mapper.mapping().iter().collect();
    entries.sort_by_key(|(_, zone)| {
        zone.trim_start_matches("AZ")
            .parse::<u32>()
            .unwrap_or(u32::MAX)
    });
    for (fabric, zone) in entries {
        println!("    {}: ...{}", zone, tail(fabric, AppConfig::FABRIC_DISPLAY_CHARS));
    }
}

fn print_instances(inventory: &Inventory) {
    println!();
    println!(
        "  {:<35} {:<12} {:<5} {:<15}",
        "Display Name", "Fabric", "Zone", "Private IP"
    );
    println!(
        "  {:<35} {:<12} {:<5} {:<15}",
        "-".repeat(35),
        "-".repeat(12),
        "-".repeat(5),
        "-".repeat(15)
    );

    let mut instances: Vec<_> = inventory.iter().collect();
    instances.sort_by(|a, b| a.name.cmp(&b.name));
    for instance in instances {
        let fabric = if instance.fabric_id.is_empty() {
            "N/A".to_string()
        } else {
            FabricZoneMapper::short_id(&instance.fabric_id)
        };
        println!(
            "  {:<35} {:<12} {:<5} {:<15}",
            instance.name, fabric, instance.zone, instance.private_ip
        );
    }
}

fn print_plan(plan: &VolumePlan) {
    println!("\n{}", "=".repeat(70));
    println!("VOLUME ANALYSIS SUMMARY");
    println!("{}", "=".repeat(70));

    if !plan.already_labelled.is_empty() {
        println!(
            "\nVolumes with existing zone prefix (skipped): {}",
            plan.already_labelled.len()
        );
        preview(&plan.already_labelled, |(name, zone)| {
            format!("{name} ({zone})")
        });
    }

    if !plan.unmappable.is_empty() {
        println!(
            "\nVolumes with no matching instance: {}",
            plan.unmappable.len()
        );
        preview(&plan.unmappable, |(name, node)| {
            format!("{name} (node: {node})")
        });
    }

    if !plan.renames.is_empty() {
        println!("\nVolumes to be updated: {}", plan.renames.len());
        println!("{}", "-".repeat(70));
        println!("{:<40} {:<40}", "Current Name", "New Name");
        println!("{}", "-".repeat(70));
        for rename in &plan.renames {
            println!("{:<40} {:<40}", rename.current_name, rename.new_name);
        }
    }
}

fn preview<T>(items: &[T], render: impl Fn(&T) -> String) {
    for item in items.iter().take(AppConfig::PLAN_PREVIEW_LINES) {
        println!("    {}", render(item));
    }
    if items.len() > AppConfig::PLAN_PREVIEW_LINES {
        println!(
            "    ... and {} more",
            items.len() - AppConfig::PLAN_PREVIEW_LINES
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::types::{NodeRef, Uoid};
    use crate::inventory::Instance;

    fn volume(name: &str, uuid: Option<&str>) -> Volume {
        Volume {
            name: name.to_string(),
            node: None,
            uoid: uuid.map(|u| Uoid {
                uuid: u.to_string(),
            }),
        }
    }

    fn instance(name: &str, fabric: &str) -> Instance {
        Instance {
            name: name.to_string(),
            fabric_id: fabric.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_learn_existing_zones_joins_through_inventory() {
        let inventory: Inventory = [instance("nodeA", "fab-1"), instance("nodeB", "fab-2")]
            .into_iter()
            .collect();
        let volumes = vec![
            volume("AZ1:nodeA::/d", None),
            // Unlabelled: nothing to learn.
            volume("nodeB::/d", None),
            // Node unknown to the inventory: ignored.
            volume("AZ9:stranger::/d", None),
        ];

        let learned = learn_existing_zones(&volumes, &inventory);
        assert_eq!(learned, HashMap::from([("fab-1".to_string(), "AZ1".to_string())]));
    }

    #[test]
    fn test_learn_first_zone_per_fabric_wins() {
        let inventory: Inventory = [instance("nodeA", "fab-1"), instance("nodeB", "fab-1")]
            .into_iter()
            .collect();
        let volumes = vec![
            volume("AZ1:nodeA::/d", None),
            volume("AZ2:nodeB::/d", None),
        ];

        let learned = learn_existing_zones(&volumes, &inventory);
        assert_eq!(learned.get("fab-1"), Some(&"AZ1".to_string()));
    }

    #[test]
    fn test_plan_classification() {
        let mut inventory: Inventory = [instance("nodeA", "fab-1")].into_iter().collect();
        let mut mapper = FabricZoneMapper::new();
        inventory.assign_zones(&mut mapper, AzSource::Fabric);

        let volumes = vec![
            volume("AZ1:nodeA::/d", None),
            volume("nodeA::/scratch", Some("u-1")),
            volume("mystery::/d", None),
        ];
        let plan = plan_volume_updates(&volumes, &inventory);

        assert_eq!(
            plan.already_labelled,
            vec![("AZ1:nodeA::/d".to_string(), "AZ1".to_string())]
        );
        assert_eq!(
            plan.unmappable,
            vec![("mystery::/d".to_string(), "mystery".to_string())]
        );
        assert_eq!(
            plan.renames,
            vec![RenamePlan {
                current_name: "nodeA::/scratch".to_string(),
                new_name: "AZ1:nodeA::/scratch".to_string(),
                uuid: Some("u-1".to_string()),
                node: "nodeA".to_string(),
                zone: "AZ1".to_string(),
            }]
        );
    }

    #[test]
    fn test_reconciliation_reuses_learned_zone_for_sibling_node() {
        // nodeA and nodeB share a fabric; nodeA's volume already carries
        // AZ1. nodeB's unlabelled volume must get AZ1, not a fresh AZ2.
        let mut inventory: Inventory = [instance("nodeA", "fab-1"), instance("nodeB", "fab-1")]
            .into_iter()
            .collect();
        let volumes = vec![volume("AZ1:nodeA::/d", None), volume("nodeB::/d", None)];

        let mut mapper = FabricZoneMapper::new();
        mapper.learn(&learn_existing_zones(&volumes, &inventory));
        inventory.assign_zones(&mut mapper, AzSource::Fabric);

        let plan = plan_volume_updates(&volumes, &inventory);
        assert_eq!(plan.already_labelled.len(), 1);
        assert_eq!(plan.renames.len(), 1);
        assert_eq!(plan.renames[0].new_name, "AZ1:nodeB::/d");
    }

    #[test]
    fn test_plan_keeps_path_and_pathless_forms() {
        let mut inventory: Inventory = [instance("nodeA", "fab-1")].into_iter().collect();
        let mut mapper = FabricZoneMapper::new();
        inventory.assign_zones(&mut mapper, AzSource::Fabric);

        let volumes = vec![volume("nodeA::/d", None), volume("nodeA", None)];
        let plan = plan_volume_updates(&volumes, &inventory);

        let new_names: Vec<&str> = plan.renames.iter().map(|r| r.new_name.as_str()).collect();
        assert_eq!(new_names, vec!["AZ1:nodeA::/d", "AZ1:nodeA"]);
    }

    #[test]
    fn test_plan_ignores_volume_node_reference_for_mapping() {
        // Zone mapping is keyed on the name-embedded node, matching the
        // learning phase; the reference field only matters for
        // decommission association.
        let inventory: Inventory = [instance("nodeA", "fab-1")].into_iter().collect();
        let volumes = vec![Volume {
            name: "orphan-volume".to_string(),
            node: Some(NodeRef {
                name: "nodeA".to_string(),
            }),
            uoid: None,
        }];

        let plan = plan_volume_updates(&volumes, &inventory);
        assert_eq!(plan.renames.len(), 0);
        assert_eq!(plan.unmappable.len(), 1);
    }
}
