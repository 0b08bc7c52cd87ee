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

//! Cloud inventory source.
//!
//! Queries the provider's compute inventory API for instances in a
//! compartment and resolves each instance's GPU fabric attachment. The
//! fabric lookup is best-effort with explicit fallbacks: attachment
//! endpoint, then instance metadata, then freeform tags; every step
//! signals absence as `None` rather than failing the run.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::common::config::AppConfig;
use crate::error::Result;
use crate::inventory::{Instance, Inventory};

/// Metadata key carrying the fabric id on provider instances.
const METADATA_FABRIC_KEY: &str = "customergpumemoryfabric";
/// Freeform tag consulted when the metadata key is absent.
const TAG_FABRIC_KEY: &str = "gpu_fabric";

/// Instance listing filters.
#[derive(Debug, Clone)]
pub struct CloudQuery {
    pub compartment_id: String,
    /// Keep only instances of this shape; `None` keeps all.
    pub shape: Option<String>,
    pub lifecycle_state: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ApiInstance {
    id: String,
    display_name: String,
    fault_domain: String,
    lifecycle_state: String,
    shape: String,
    private_ip: Option<String>,
    metadata: HashMap<String, String>,
    freeform_tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FabricAttachment {
    #[serde(default)]
    fabric_id: String,
}

pub struct CloudInventoryClient {
    http: reqwest::Client,
    base: Url,
}

impl CloudInventoryClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(AppConfig::CONNECTION_TIMEOUT_SECS))
            .build()?;

        // A base without a trailing slash would drop its last path
        // segment on join().
        let base = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{base_url}/"))?
        };

        Ok(Self { http, base })
    }

    /// List matching instances with their fabric ids resolved.
    ///
    /// Listing failures are fatal; fabric resolution failures degrade
    /// each affected instance to an empty fabric id.
    pub async fn instances(&self, query: &CloudQuery) -> Result<Inventory> {
        let mut url = self.base.join("instances")?;
        url.query_pairs_mut()
            .append_pair("compartmentId", &query.compartment_id)
            .append_pair("lifecycleState", &query.lifecycle_state);

        debug!("GET {url}");
        let listed: Vec<ApiInstance> = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut inventory = Inventory::new();
        for api_instance in listed {
            if let Some(shape) = &query.shape {
                if &api_instance.shape != shape {
                    continue;
                }
            }

            let fabric_id = self.resolve_fabric(&api_instance).await.unwrap_or_default();

            inventory.push(Instance {
                name: api_instance.display_name,
                fabric_id,
                fault_domain: api_instance.fault_domain,
                private_ip: api_instance.private_ip.unwrap_or_default(),
                lifecycle_state: api_instance.lifecycle_state,
                shape: api_instance.shape,
                ..Default::default()
            });
        }

        Ok(inventory)
    }

    /// Fabric id for one instance: attachment endpoint, then metadata,
    /// then freeform tags.
    async fn resolve_fabric(&self, instance: &ApiInstance) -> Option<String> {
        if let Some(fabric) = self.fabric_attachment(&instance.id).await {
            return Some(fabric);
        }

        lookup_non_empty(&instance.metadata, METADATA_FABRIC_KEY)
            .or_else(|| lookup_non_empty(&instance.freeform_tags, TAG_FABRIC_KEY))
    }

    async fn fabric_attachment(&self, instance_id: &str) -> Option<String> {
        let url = match self
            .base
            .join(&format!("instances/{instance_id}/fabric-attachment"))
        {
            Ok(url) => url,
            Err(e) => {
                warn!("skipping fabric attachment lookup for {instance_id}: {e}");
                return None;
            }
        };

        debug!("GET {url}");
        let response = match self.http.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("fabric attachment lookup failed for {instance_id}: {e}");
                return None;
            }
        };

        if !response.status().is_success() {
            return None;
        }

        match response.json::<FabricAttachment>().await {
            Ok(attachment) if !attachment.fabric_id.is_empty() => Some(attachment.fabric_id),
            Ok(_) => None,
            Err(e) => {
                warn!("malformed fabric attachment for {instance_id}: {e}");
                None
            }
        }
    }
}

fn lookup_non_empty(map: &HashMap<String, String>, key: &str) -> Option<String> {
    map.get(key).filter(|v| !v.is_empty()).cloned()
}
