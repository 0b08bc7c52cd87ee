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

//! Node listing.

use crate::cli::ListNodesArgs;
use crate::client::ManagementClient;
use crate::error::Result;

pub async fn run(args: &ListNodesArgs) -> Result<bool> {
    println!("Connecting to {}...", args.connection.host);
    let client = ManagementClient::new(
        &args.connection.host,
        &args.connection.user,
        &args.connection.password,
    )?;

    let mut nodes = client.nodes().await?;
    nodes.sort_by(|a, b| a.name.cmp(&b.name));

    println!("\nAll nodes:");
    for node in &nodes {
        let name = if node.name.is_empty() {
            "N/A"
        } else {
            node.name.as_str()
        };
        println!(
            "  - {} (Type: {}, IP: {})",
            name,
            if node.node_type.is_empty() {
                "N/A"
            } else {
                node.node_type.as_str()
            },
            node.mgmt_address()
        );
    }

    Ok(true)
}
