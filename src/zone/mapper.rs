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

//! Fabric-to-zone assignment.
//!
//! [`FabricZoneMapper`] hands out `AZ<n>` labels to GPU fabric
//! identifiers in first-seen order. Seeding it from labels already
//! present on remote volume names keeps re-runs stable: a fabric that
//! earned `AZ1` last month keeps `AZ1` today, and newly observed
//! fabrics continue past the highest learned index.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

static ZONE_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^AZ(\d+)$").expect("valid regex"));

/// Maps fabric identifiers to zone labels.
///
/// State lives for one run only; the durable record of past assignments
/// is the set of volume names on the remote system.
#[derive(Debug, Default)]
pub struct FabricZoneMapper {
    fabric_to_zone: HashMap<String, String>,
    next_index: u32,
}

impl FabricZoneMapper {
    pub fn new() -> Self {
        Self {
            fabric_to_zone: HashMap::new(),
            next_index: 1,
        }
    }

    /// Seed the mapper from zone labels already assigned to fabrics.
    ///
    /// Pairs with an empty fabric id or label are ignored. For labels of
    /// the form `AZ<n>`, the allocation counter advances past `n` so
    /// freshly observed fabrics never collide with a learned label.
    /// Calling this twice with the same data is a no-op beyond the first
    /// call.
    pub fn learn(&mut self, existing: &HashMap<String, String>) {
        for (fabric, zone) in existing {
            if fabric.is_empty() || zone.is_empty() {
                continue;
            }
            self.fabric_to_zone
                .insert(fabric.clone(), zone.clone());
            if let Some(caps) = ZONE_LABEL.captures(zone) {
                if let Ok(index) = caps[1].parse::<u32>() {
                    if index >= self.next_index {
                        self.next_index = index + 1;
                    }
                }
            }
        }
    }

    /// Zone label for a fabric identifier, allocating on first sight.
    ///
    /// An empty fabric id yields an empty label and never allocates.
    /// Indices follow the order of `zone_for` calls, not any ordering of
    /// the identifiers themselves.
    pub fn zone_for(&mut self, fabric: &str) -> String {
        if fabric.is_empty() {
            return String::new();
        }

        if !self.fabric_to_zone.contains_key(fabric) {
            self.fabric_to_zone
                .insert(fabric.to_string(), format!("AZ{}", self.next_index));
            self.next_index += 1;
        }

        self.fabric_to_zone[fabric].clone()
    }

    /// Trailing characters of a fabric id for compact display.
    pub fn short_id(fabric: &str) -> String {
        tail(fabric, 8)
    }

    /// The full fabric-to-zone table.
    pub fn mapping(&self) -> &HashMap<String, String> {
        &self.fabric_to_zone
    }

    /// The index the next unseen fabric would receive.
    pub fn next_index(&self) -> u32 {
        self.next_index
    }
}

/// Last `count` characters of `s`.
pub fn tail(s: &str, count: usize) -> String {
    let total = s.chars().count();
    s.chars().skip(total.saturating_sub(count)).collect()
}
