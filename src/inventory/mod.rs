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

//! Instance inventory.
//!
//! An [`Inventory`] holds the compute instances a run reasons about,
//! keyed by name but ordered: zone allocation follows source order
//! (file line order or API listing order), so insertion order is part
//! of the contract.

pub mod cloud;
pub mod fabric_file;

use std::collections::HashMap;

use serde::Serialize;

use crate::zone::{fault_domain_zone, FabricZoneMapper};

/// Zone derivation source for `assign`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AzSource {
    /// Group instances by GPU fabric membership (default).
    Fabric,
    /// Derive zones from cloud fault-domain labels.
    FaultDomain,
}

/// One compute instance, alive for the duration of a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Instance {
    pub name: String,
    pub fabric_id: String,
    pub fault_domain: String,
    pub private_ip: String,
    pub lifecycle_state: String,
    pub shape: String,
    /// Computed by [`Inventory::assign_zones`]; empty until then.
    pub zone: String,
}

/// Ordered, name-indexed set of instances.
#[derive(Debug, Default)]
pub struct Inventory {
    instances: Vec<Instance>,
    index: HashMap<String, usize>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an instance, replacing any previous record with the same
    /// name in place (the original position is kept).
    pub fn push(&mut self, instance: Instance) {
        match self.index.get(&instance.name) {
            Some(&i) => self.instances[i] = instance,
            None => {
                self.index
                    .insert(instance.name.clone(), self.instances.len());
                self.instances.push(instance);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Instance> {
        self.index.get(name).map(|&i| &self.instances[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.instances.iter()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Assign a zone to every instance, in inventory order.
    ///
    /// With [`AzSource::Fabric`], instances on a known fabric consult
    /// the mapper (allocating in iteration order); instances without a
    /// fabric id fall back to their fault-domain label. With
    /// [`AzSource::FaultDomain`], only the fault-domain label is used.
    pub fn assign_zones(&mut self, mapper: &mut FabricZoneMapper, source: AzSource) {
        for instance in &mut self.instances {
            instance.zone = match source {
                AzSource::Fabric if !instance.fabric_id.is_empty() => {
                    mapper.zone_for(&instance.fabric_id)
                }
                _ => fault_domain_zone(&instance.fault_domain),
            };
        }
    }
}

impl FromIterator<Instance> for Inventory {
    fn from_iter<T: IntoIterator<Item = Instance>>(iter: T) -> Self {
        let mut inventory = Inventory::new();
        for instance in iter {
            inventory.push(instance);
        }
        inventory
    }
}
