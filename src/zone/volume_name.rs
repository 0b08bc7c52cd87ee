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

//! Volume name codec.
//!
//! Volume names encode their placement: `AZ2:node7::/data/x` is volume
//! `/data/x` on `node7` in zone `AZ2`. Both the zone prefix and the path
//! segment are optional.

use once_cell::sync::Lazy;
use regex::Regex;

static ZONE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(AZ\d+):(.+)$").expect("valid regex"));

/// Components of a volume name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VolumeName {
    pub zone: String,
    pub node: String,
    pub path: String,
}

impl VolumeName {
    /// Parse a volume name into its components.
    ///
    /// Recognizes an optional leading `AZ<n>:` token, then splits the
    /// remainder on the first `::`. Without a `::` the whole remainder
    /// is the node name.
    pub fn parse(name: &str) -> Self {
        let mut parsed = VolumeName::default();

        let remainder = match ZONE_PREFIX.captures(name) {
            Some(caps) => {
                parsed.zone = caps[1].to_string();
                caps.get(2).map(|m| m.as_str()).unwrap_or("")
            }
            None => name,
        };

        match remainder.split_once("::") {
            Some((node, path)) => {
                parsed.node = node.to_string();
                parsed.path = path.to_string();
            }
            None => parsed.node = remainder.to_string(),
        }

        parsed
    }

    /// Render the composite name, omitting empty segments and their
    /// separators.
    pub fn render(&self) -> String {
        format_name(&self.zone, &self.node, &self.path)
    }
}

/// Build a volume name from its components.
pub fn format_name(zone: &str, node: &str, path: &str) -> String {
    let base = if path.is_empty() {
        node.to_string()
    } else {
        format!("{node}::{path}")
    };

    if zone.is_empty() {
        base
    } else {
        format!("{zone}:{base}")
    }
}
