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

//! Documents exchanged with the management API.
//!
//! Only the fields this tool reads are modeled; the rename path works on
//! the raw JSON document instead, so unrelated fields survive a write
//! untouched.

use serde::{Deserialize, Serialize};

/// Object identity wrapper used throughout the management API.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Uoid {
    #[serde(default)]
    pub uuid: String,
}

/// Management address of a node.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct IpAddress {
    #[serde(default)]
    pub address: String,
}

/// A storage node.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub node_type: String,
    #[serde(default)]
    pub mgmt_ip_address: Option<IpAddress>,
    #[serde(default)]
    pub uoid: Option<Uoid>,
}

impl Node {
    /// UUID, if the document carried one.
    pub fn uuid(&self) -> Option<&str> {
        self.uoid
            .as_ref()
            .map(|u| u.uuid.as_str())
            .filter(|u| !u.is_empty())
    }

    /// Management IP for display.
    pub fn mgmt_address(&self) -> &str {
        self.mgmt_ip_address
            .as_ref()
            .map(|a| a.address.as_str())
            .filter(|a| !a.is_empty())
            .unwrap_or("N/A")
    }
}

/// Reference from a volume back to its owning node.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct NodeRef {
    #[serde(default)]
    pub name: String,
}

/// A storage volume.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Volume {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub node: Option<NodeRef>,
    #[serde(default)]
    pub uoid: Option<Uoid>,
}

impl Volume {
    pub fn uuid(&self) -> Option<&str> {
        self.uoid
            .as_ref()
            .map(|u| u.uuid.as_str())
            .filter(|u| !u.is_empty())
    }
}

/// Status document returned by the asynchronous task endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskDocument {
    #[serde(default)]
    pub status: String,
}

impl TaskDocument {
    pub fn is_completed(&self) -> bool {
        self.status == "COMPLETED"
    }

    pub fn is_terminal_failure(&self) -> bool {
        matches!(self.status.as_str(), "FAILED" | "CANCELLED")
    }
}
