//! In-memory inventory shared by the integration tests

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use gcp_inventory::gcp::compute::{AccessConfig, Disk, Instance, NetworkInterface, Zone};
use gcp_inventory::gcp::http::ApiStatusError;
use gcp_inventory::gcp::Inventory;
use gcp_inventory::resource::ResourceKind;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

pub const PROJECT: &str = "test-project";

pub fn zone_url(zone: &str) -> String {
    format!("https://www.googleapis.com/compute/v1/projects/{PROJECT}/zones/{zone}")
}

fn unavailable() -> anyhow::Error {
    ApiStatusError {
        status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
    }
    .into()
}

pub fn instance(zone: &str, name: &str, status: &str, nat_ips: &[&str]) -> Instance {
    Instance {
        name: name.to_string(),
        zone: zone_url(zone),
        status: status.to_string(),
        creation_timestamp: "2024-05-01T12:00:00.000-07:00".to_string(),
        network_interfaces: vec![NetworkInterface {
            network_ip: "10.0.0.2".to_string(),
            access_configs: nat_ips
                .iter()
                .map(|ip| AccessConfig {
                    nat_ip: ip.to_string(),
                })
                .collect(),
        }],
    }
}

pub fn disk(zone: &str, name: &str, status: &str) -> Disk {
    Disk {
        name: name.to_string(),
        zone: zone_url(zone),
        status: status.to_string(),
        creation_timestamp: "2023-11-20T08:15:00.000Z".to_string(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeInventory {
    pub zones: Vec<String>,
    pub instances: HashMap<String, Vec<Instance>>,
    pub disks: HashMap<String, Vec<Disk>>,
    pub failing: HashSet<(String, ResourceKind)>,
    pub zones_unavailable: bool,
    pub slow: HashMap<String, Duration>,
    /// (zone, kind) pairs whose by-name lookups answer with any record
    pub ignoring_names: HashSet<(String, ResourceKind)>,
}

impl FakeInventory {
    pub fn with_zone(mut self, zone: &str) -> Self {
        if !self.zones.iter().any(|z| z == zone) {
            self.zones.push(zone.to_string());
        }
        self
    }

    pub fn with_instance(mut self, zone: &str, name: &str, status: &str) -> Self {
        self = self.with_zone(zone);
        self.instances
            .entry(zone.to_string())
            .or_default()
            .push(instance(zone, name, status, &[]));
        self
    }

    pub fn with_disk(mut self, zone: &str, name: &str, status: &str) -> Self {
        self = self.with_zone(zone);
        self.disks
            .entry(zone.to_string())
            .or_default()
            .push(disk(zone, name, status));
        self
    }

    pub fn failing(mut self, zone: &str, kind: ResourceKind) -> Self {
        self.failing.insert((zone.to_string(), kind));
        self
    }

    pub fn slow(mut self, zone: &str, delay: Duration) -> Self {
        self.slow.insert(zone.to_string(), delay);
        self
    }

    /// By-name lookups for this pair return the zone's first record
    /// whatever name was asked for
    pub fn ignoring_names(mut self, zone: &str, kind: ResourceKind) -> Self {
        self.ignoring_names.insert((zone.to_string(), kind));
        self
    }

    fn matches_name(&self, zone: &str, kind: ResourceKind, wanted: &str, actual: &str) -> bool {
        actual == wanted || self.ignoring_names.contains(&(zone.to_string(), kind))
    }

    pub fn without_zones(mut self) -> Self {
        self.zones_unavailable = true;
        self
    }

    /// The scenario inventory: one instance in us-central1-a, one disk in europe-west1-b
    pub fn scenario() -> Self {
        Self::default()
            .with_instance("us-central1-a", "web-1", "RUNNING")
            .with_disk("europe-west1-b", "data-1", "READY")
    }

    async fn enter(&self, zone: &str, kind: ResourceKind) -> Result<()> {
        if let Some(delay) = self.slow.get(zone) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(&(zone.to_string(), kind)) {
            return Err(unavailable());
        }
        Ok(())
    }
}

#[async_trait]
impl Inventory for FakeInventory {
    async fn list_zones(&self) -> Result<Vec<Zone>> {
        if self.zones_unavailable {
            return Err(unavailable());
        }
        Ok(self
            .zones
            .iter()
            .map(|name| Zone { name: name.clone() })
            .collect())
    }

    async fn list_instances(&self, zone: &str) -> Result<Vec<Instance>> {
        self.enter(zone, ResourceKind::Instance).await?;
        Ok(self.instances.get(zone).cloned().unwrap_or_default())
    }

    async fn list_disks(&self, zone: &str) -> Result<Vec<Disk>> {
        self.enter(zone, ResourceKind::Disk).await?;
        Ok(self.disks.get(zone).cloned().unwrap_or_default())
    }

    async fn get_instance(&self, zone: &str, name: &str) -> Result<Option<Instance>> {
        self.enter(zone, ResourceKind::Instance).await?;
        Ok(self
            .instances
            .get(zone)
            .and_then(|items| {
                items
                    .iter()
                    .find(|i| self.matches_name(zone, ResourceKind::Instance, name, &i.name))
                    .cloned()
            }))
    }

    async fn get_disk(&self, zone: &str, name: &str) -> Result<Option<Disk>> {
        self.enter(zone, ResourceKind::Disk).await?;
        Ok(self
            .disks
            .get(zone)
            .and_then(|items| {
                items
                    .iter()
                    .find(|d| self.matches_name(zone, ResourceKind::Disk, name, &d.name))
                    .cloned()
            }))
    }
}
