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

//! Availability-zone derivation: fabric mapping, fault-domain
//! conversion, and the volume name codec.

pub mod mapper;
pub mod volume_name;

pub use mapper::{tail, FabricZoneMapper};
pub use volume_name::{format_name, VolumeName};

use once_cell::sync::Lazy;
use regex::Regex;

static FAULT_DOMAIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"FAULT-DOMAIN-(\d+)").expect("valid regex"));

/// Derive a zone label from a cloud fault-domain label.
///
/// `FAULT-DOMAIN-2` becomes `AZ2`; anything else (including an empty
/// label) yields an empty zone.
pub fn fault_domain_zone(fault_domain: &str) -> String {
    match FAULT_DOMAIN.captures(fault_domain) {
        Some(caps) => format!("AZ{}", &caps[1]),
        None => String::new(),
    }
}
