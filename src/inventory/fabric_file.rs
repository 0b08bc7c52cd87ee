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

//! Fabric data file parser.
//!
//! The file is typically assembled by running a metadata probe across
//! the fleet with an automation tool, so besides `#` comments it may
//! contain status banners and JSON fragments from that tool's output.
//! Data lines are whitespace-separated:
//!
//! ```text
//! <fabric_id> <instance_name> [<private_ip>]
//! ```

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::inventory::{Instance, Inventory};

/// Load instances from a fabric data file, preserving line order.
///
/// `shape` and a `RUNNING` lifecycle state are stamped onto every
/// record; the file itself carries neither.
pub fn load_fabric_file(path: &Path, shape: &str) -> Result<Inventory> {
    let contents = fs::read_to_string(path)?;
    Ok(parse_fabric_data(&contents, shape))
}

fn parse_fabric_data(contents: &str, shape: &str) -> Inventory {
    let mut inventory = Inventory::new();

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || is_noise(line) {
            continue;
        }

        let mut parts = line.split_whitespace();
        let (Some(fabric_id), Some(name)) = (parts.next(), parts.next()) else {
            continue;
        };
        let private_ip = parts.next().unwrap_or("");

        inventory.push(Instance {
            name: name.to_string(),
            fabric_id: fabric_id.to_string(),
            private_ip: private_ip.to_string(),
            lifecycle_state: "RUNNING".to_string(),
            shape: shape.to_string(),
            ..Default::default()
        });
    }

    inventory
}

/// Automation-tool output that is not fabric data.
fn is_noise(line: &str) -> bool {
    line.contains("SUCCESS")
        || line.contains("CHANGED")
        || line.contains("FAILED")
        || line.starts_with('[')
        || line.starts_with('{')
        || line.contains("=>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parses_data_lines() {
        let data = "\
fabric-aaa instance-01 10.0.0.1
fabric-aaa instance-02 10.0.0.2
fabric-bbb instance-03
";
        let inventory = parse_fabric_data(data, "BM.GPU.H100.8");

        assert_eq!(inventory.len(), 3);
        let first = inventory.get("instance-01").unwrap();
        assert_eq!(first.fabric_id, "fabric-aaa");
        assert_eq!(first.private_ip, "10.0.0.1");
        assert_eq!(first.lifecycle_state, "RUNNING");
        assert_eq!(first.shape, "BM.GPU.H100.8");

        // Two-field form leaves the address empty.
        assert_eq!(inventory.get("instance-03").unwrap().private_ip, "");
    }

    #[test]
    fn test_skips_comments_and_noise() {
        let data = "\
# collected 2026-01-16
instance-01 | SUCCESS | rc=0 >>
[WARNING]: provided hosts list is empty
{\"changed\": false}
node-x => unreachable
fabric-aaa instance-01 10.0.0.1
";
        let inventory = parse_fabric_data(data, "shape");
        assert_eq!(inventory.len(), 1);
        assert!(inventory.get("instance-01").is_some());
    }

    #[test]
    fn test_short_lines_are_ignored() {
        let inventory = parse_fabric_data("loneword\n\n", "shape");
        assert!(inventory.is_empty());
    }

    #[test]
    fn test_preserves_file_order() {
        let data = "fab-z z-instance\nfab-a a-instance\n";
        let inventory = parse_fabric_data(data, "shape");
        let names: Vec<&str> = inventory.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["z-instance", "a-instance"]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# header").unwrap();
        writeln!(file, "fab-1 instance-a 10.1.1.1").unwrap();

        let inventory = load_fabric_file(file.path(), "shape").unwrap();
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory.get("instance-a").unwrap().fabric_id, "fab-1");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_fabric_file(Path::new("/nonexistent/fabric.txt"), "shape").unwrap_err();
        assert!(matches!(err, crate::error::Error::Io(_)));
    }
}
