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

//! Management API client.
//!
//! A thin wrapper over the cluster management REST interface: node and
//! volume enumeration, volume rename, and the destructive calls used by
//! decommissioning. The endpoint speaks basic auth over HTTPS with a
//! self-signed certificate.

pub mod types;

use std::time::Duration;

use reqwest::header::LOCATION;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, warn};
use url::Url;

use crate::common::config::AppConfig;
use crate::error::{Error, Result};
use types::{Node, TaskDocument, Volume};

/// Outcome of a delete call.
///
/// A 404 counts as [`DeleteOutcome::AlreadyGone`]: the resource being
/// absent is exactly the state the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    AlreadyGone,
}

pub struct ManagementClient {
    http: reqwest::Client,
    base: Url,
    user: String,
    password: String,
}

impl ManagementClient {
    /// Connect parameters for a management endpoint.
    ///
    /// No request is issued here; connectivity problems surface on the
    /// first call.
    pub fn new(host: &str, user: &str, password: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(AppConfig::CONNECTION_TIMEOUT_SECS))
            .danger_accept_invalid_certs(true)
            .build()?;

        let base = Url::parse(&format!(
            "https://{}:{}{}/",
            host,
            AppConfig::API_PORT,
            AppConfig::API_BASE_PATH
        ))?;

        Ok(Self {
            http,
            base,
            user: user.to_string(),
            password: password.to_string(),
        })
    }

    /// Build an endpoint URL; each segment is percent-encoded, so volume
    /// names containing `/` stay a single path segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .expect("base URL always has a path")
            .pop_if_empty()
            .extend(segments);
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET {url}");
        let response = self
            .http
            .get(url)
            .basic_auth(&self.user, Some(&self.password))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api(status.as_u16(), &body));
        }

        Ok(response.json().await?)
    }

    /// All nodes known to the cluster.
    pub async fn nodes(&self) -> Result<Vec<Node>> {
        self.get_json(self.endpoint(&["nodes"])).await
    }

    /// All storage volumes known to the cluster.
    pub async fn storage_volumes(&self) -> Result<Vec<Volume>> {
        self.get_json(self.endpoint(&["storage-volumes"])).await
    }

    /// Rename a volume via read-modify-write.
    ///
    /// The volume document is fetched fresh, only its `name` field is
    /// overwritten, and the whole document is PUT back. Fields edited
    /// out-of-band between enumeration and apply are preserved; this is
    /// never a partial PATCH. Addressing prefers the UUID when known.
    pub async fn rename_volume(
        &self,
        current_name: &str,
        new_name: &str,
        uuid: Option<&str>,
    ) -> Result<()> {
        let id = uuid.unwrap_or(current_name);
        let url = self.endpoint(&["storage-volumes", id]);

        let mut document: Value = self.get_json(url.clone()).await?;
        document["name"] = Value::String(new_name.to_string());

        debug!("PUT {url}");
        let response = self
            .http
            .put(url)
            .basic_auth(&self.user, Some(&self.password))
            .json(&document)
            .send()
            .await?;

        let status = response.status();
        match status.as_u16() {
            200 | 202 | 204 => Ok(()),
            code => {
                let body = response.text().await.unwrap_or_default();
                Err(Error::api(code, &body))
            }
        }
    }

    /// Delete a storage volume by name.
    pub async fn delete_volume(&self, name: &str) -> Result<DeleteOutcome> {
        self.delete_resource(self.endpoint(&["storage-volumes", name]))
            .await
    }

    /// Delete a node by UUID.
    pub async fn delete_node(&self, uuid: &str) -> Result<DeleteOutcome> {
        self.delete_resource(self.endpoint(&["nodes", uuid])).await
    }

    async fn delete_resource(&self, url: Url) -> Result<DeleteOutcome> {
        debug!("DELETE {url}");
        let response = self
            .http
            .delete(url)
            .basic_auth(&self.user, Some(&self.password))
            .send()
            .await?;

        let status = response.status();
        match status.as_u16() {
            200 | 204 => Ok(DeleteOutcome::Deleted),
            202 => {
                // Deletion continues server-side; follow the task if one
                // was advertised.
                let task_url = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .map(|loc| self.base.join(loc));
                if let Some(task_url) = task_url {
                    self.wait_for_task(task_url?).await?;
                }
                Ok(DeleteOutcome::Deleted)
            }
            404 => Ok(DeleteOutcome::AlreadyGone),
            code => {
                let body = response.text().await.unwrap_or_default();
                Err(Error::api(code, &body))
            }
        }
    }

    /// Poll an asynchronous task until it completes.
    ///
    /// Bounded by a hard wall-clock timeout; a terminal failure status
    /// or the timeout fails the one resource the task belongs to, never
    /// the whole run.
    async fn wait_for_task(&self, task_url: Url) -> Result<()> {
        let deadline = Instant::now() + Duration::from_secs(AppConfig::TASK_TIMEOUT_SECS);

        while Instant::now() < deadline {
            match self.get_json::<TaskDocument>(task_url.clone()).await {
                Ok(task) if task.is_completed() => return Ok(()),
                Ok(task) if task.is_terminal_failure() => {
                    return Err(Error::Task(format!(
                        "task ended with status {}",
                        task.status
                    )));
                }
                Ok(_) => {}
                Err(e) => warn!("task status poll failed: {e}"),
            }

            tokio::time::sleep(Duration::from_secs(AppConfig::TASK_POLL_INTERVAL_SECS)).await;
        }

        Err(Error::Task(format!(
            "timed out after {}s",
            AppConfig::TASK_TIMEOUT_SECS
        )))
    }
}
