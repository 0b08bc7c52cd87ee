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

//! End-to-end planning behavior: fabric file in, rename/removal plans
//! out, without touching the network.

use std::io::Write;

use zonectl::client::types::{Node, NodeRef, Uoid, Volume};
use zonectl::commands::assign::{learn_existing_zones, plan_volume_updates};
use zonectl::commands::decommission::plan_removals;
use zonectl::filter::NodeFilter;
use zonectl::inventory::fabric_file::load_fabric_file;
use zonectl::inventory::AzSource;
use zonectl::report::write_instance_report;
use zonectl::zone::FabricZoneMapper;

fn volume(name: &str) -> Volume {
    Volume {
        name: name.to_string(),
        node: None,
        uoid: Some(Uoid {
            uuid: format!("uuid-{name}"),
        }),
    }
}

#[test]
fn fabric_file_to_rename_plan() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# fleet probe output").unwrap();
    writeln!(file, "instance-01 | SUCCESS | rc=0 >>").unwrap();
    writeln!(file, "fab-aaa instance-01 10.0.0.1").unwrap();
    writeln!(file, "fab-aaa instance-02 10.0.0.2").unwrap();
    writeln!(file, "fab-bbb instance-03 10.0.0.3").unwrap();

    let mut inventory = load_fabric_file(file.path(), "BM.GPU.H100.8").unwrap();
    assert_eq!(inventory.len(), 3);

    let volumes = vec![
        // instance-01 already carries a zone: learned, then skipped.
        volume("AZ1:instance-01::/data"),
        // Same fabric as instance-01: must reuse AZ1, not mint AZ2.
        volume("instance-02::/data"),
        // New fabric: next free index.
        volume("instance-03::/data"),
        // Unknown node: unmappable.
        volume("stray::/data"),
    ];

    let mut mapper = FabricZoneMapper::new();
    mapper.learn(&learn_existing_zones(&volumes, &inventory));
    inventory.assign_zones(&mut mapper, AzSource::Fabric);

    let plan = plan_volume_updates(&volumes, &inventory);

    assert_eq!(plan.already_labelled.len(), 1);
    assert_eq!(plan.unmappable.len(), 1);

    let new_names: Vec<&str> = plan.renames.iter().map(|r| r.new_name.as_str()).collect();
    assert_eq!(
        new_names,
        vec!["AZ1:instance-02::/data", "AZ2:instance-03::/data"]
    );
    assert_eq!(plan.renames[0].uuid.as_deref(), Some("uuid-instance-02::/data"));
}

#[test]
fn rerun_after_apply_is_a_no_op() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "fab-aaa instance-01 10.0.0.1").unwrap();
    let mut inventory = load_fabric_file(file.path(), "shape").unwrap();

    // State after a successful first run: every volume labelled.
    let volumes = vec![volume("AZ1:instance-01::/data")];

    let mut mapper = FabricZoneMapper::new();
    mapper.learn(&learn_existing_zones(&volumes, &inventory));
    inventory.assign_zones(&mut mapper, AzSource::Fabric);

    let plan = plan_volume_updates(&volumes, &inventory);
    assert!(plan.renames.is_empty());
    assert!(plan.unmappable.is_empty());
    assert_eq!(plan.already_labelled.len(), 1);
}

#[test]
fn report_rows_are_sorted_by_name() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "fab-b zulu 10.0.0.2").unwrap();
    writeln!(file, "fab-a alpha 10.0.0.1").unwrap();
    let mut inventory = load_fabric_file(file.path(), "shape").unwrap();

    let mut mapper = FabricZoneMapper::new();
    inventory.assign_zones(&mut mapper, AzSource::Fabric);
    // Allocation order follows the file: zulu first.
    assert_eq!(inventory.get("zulu").unwrap().zone, "AZ1");
    assert_eq!(inventory.get("alpha").unwrap().zone, "AZ2");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.csv");
    write_instance_report(&inventory, &path).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let names: Vec<&str> = contents
        .lines()
        .skip(1)
        .map(|line| line.split(',').next().unwrap())
        .collect();
    assert_eq!(names, vec!["alpha", "zulu"]);
}

#[test]
fn decommission_plan_for_node_without_volumes() {
    let nodes = vec![Node {
        name: "instance-empty".to_string(),
        uoid: Some(Uoid {
            uuid: "u-1".to_string(),
        }),
        ..Default::default()
    }];
    let filter = NodeFilter::from_options(&[], None, None, None).unwrap();

    let removals = plan_removals(&nodes, &[], &filter);
    assert_eq!(removals.len(), 1);
    assert!(removals[0].volumes.is_empty());
    assert_eq!(removals[0].node.uuid(), Some("u-1"));
}

#[test]
fn decommission_plan_collects_both_association_rules() {
    let nodes = vec![Node {
        name: "instance-01".to_string(),
        uoid: Some(Uoid {
            uuid: "u-1".to_string(),
        }),
        ..Default::default()
    }];
    let volumes = vec![
        Volume {
            name: "AZ1:instance-01::/d".to_string(),
            node: None,
            uoid: None,
        },
        Volume {
            name: "detached".to_string(),
            node: Some(NodeRef {
                name: "instance-01".to_string(),
            }),
            uoid: None,
        },
        Volume {
            name: "instance-02::/d".to_string(),
            node: None,
            uoid: None,
        },
    ];
    let filter = NodeFilter::from_options(&[], None, None, Some("instance-01")).unwrap();

    let removals = plan_removals(&nodes, &volumes, &filter);
    let names: Vec<&str> = removals[0].volumes.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["AZ1:instance-01::/d", "detached"]);
}
