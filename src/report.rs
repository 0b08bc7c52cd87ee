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

//! CSV instance report.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Local;

use crate::error::Result;
use crate::inventory::Inventory;

/// Write the instance report, one row per instance, sorted by name.
pub fn write_instance_report(inventory: &Inventory, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(
        writer,
        "display_name,fabric_id,fault_domain,zone,private_ip,shape"
    )?;

    let mut instances: Vec<_> = inventory.iter().collect();
    instances.sort_by(|a, b| a.name.cmp(&b.name));

    for instance in instances {
        writeln!(
            writer,
            "{},{},{},{},{},{}",
            instance.name,
            instance.fabric_id,
            instance.fault_domain,
            instance.zone,
            instance.private_ip,
            instance.shape
        )?;
    }

    writer.flush()?;
    println!(
        "Instance report saved to: {} (generated {})",
        path.display(),
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    Ok(())
}
