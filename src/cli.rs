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

use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};

use crate::inventory::AzSource;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assign availability-zone prefixes to storage volumes based on GPU fabric membership.
    Assign(AssignArgs),
    /// Delete all volumes from matching nodes, then remove the nodes.
    Decommission(DecommissionArgs),
    /// List all nodes known to the management API and exit.
    ListNodes(ListNodesArgs),
}

#[derive(Parser, Clone, Debug)]
pub struct ConnectionArgs {
    /// Management endpoint IP or hostname.
    #[arg(long)]
    pub host: String,
    /// API username.
    #[arg(long)]
    pub user: String,
    /// API password.
    #[arg(long)]
    pub password: String,
}

#[derive(Parser, Clone, Debug)]
#[command(group(ArgGroup::new("source").required(true)))]
pub struct AssignArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// File with fabric data (`<fabric_id> <instance_name> [<private_ip>]` per line).
    #[arg(long, value_name = "FILE", group = "source")]
    pub fabric_file: Option<PathBuf>,
    /// Cloud compartment OCID to query instead of a fabric file.
    #[arg(long, group = "source", requires = "inventory_url")]
    pub compartment_id: Option<String>,
    /// Base URL of the cloud inventory API (required with --compartment-id).
    #[arg(long, value_name = "URL")]
    pub inventory_url: Option<String>,
    /// Keep only instances of this shape.
    #[arg(long, default_value = "BM.GPU.GB200-v3.4")]
    pub shape: String,
    /// Keep only instances in this lifecycle state.
    #[arg(long, default_value = "RUNNING")]
    pub lifecycle_state: String,
    /// Source for zone derivation.
    #[arg(long, value_enum, default_value_t = AzSource::Fabric)]
    pub az_source: AzSource,

    /// Show what would be changed without making changes.
    #[arg(long)]
    pub dry_run: bool,
    /// Skip the confirmation prompt.
    #[arg(long, short = 'y')]
    pub yes: bool,
    /// Only generate the instance report, do not touch volumes.
    #[arg(long)]
    pub report_only: bool,
    /// Output file for the instance report.
    #[arg(long, default_value = "instance_report.csv")]
    pub output: PathBuf,
}

#[derive(Parser, Clone, Debug)]
#[command(group(ArgGroup::new("filter")))]
pub struct DecommissionArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Match nodes starting with this prefix (default mode, default value "instance").
    #[arg(long, group = "filter")]
    pub prefix: Option<String>,
    /// Match nodes containing this string.
    #[arg(long, group = "filter")]
    pub contains: Option<String>,
    /// Match nodes using a regex pattern.
    #[arg(long, group = "filter")]
    pub pattern: Option<String>,
    /// Match a specific node name (can be used multiple times).
    #[arg(long = "node", group = "filter", value_name = "NAME")]
    pub nodes: Vec<String>,

    /// Show what would be deleted without actually deleting.
    #[arg(long)]
    pub dry_run: bool,
    /// Skip the confirmation prompt.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Parser, Clone, Debug)]
pub struct ListNodesArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,
}
