//! Resource aggregation core
//!
//! Flattens the zonal Compute Engine inventory into one list of [`Resource`]s.
//!
//! # Architecture
//!
//! - [`normalize`] - Maps instance and disk records onto the canonical shape
//! - [`filter`] - Region / type filter applied to raw records
//! - [`aggregator`] - Lists every zone concurrently and merges the results
//! - [`resolver`] - Looks in every zone concurrently for one named resource
//!
//! Per-zone failures never fail a request. They are collected as
//! [`ZoneFailure`]s next to the results so callers can surface them.

pub mod aggregator;
pub mod filter;
pub mod normalize;
pub mod resolver;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tokio::task::JoinSet;

pub use aggregator::{list_resources, Listing};
pub use filter::ResourceFilter;
pub use resolver::{
    effective_identifier, is_valid_resource_name, resolve_resource, Resolution,
};

/// Kind of compute resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Instance,
    Disk,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Instance, ResourceKind::Disk];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Instance => "instance",
            ResourceKind::Disk => "disk",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "instance" => Ok(ResourceKind::Instance),
            "disk" => Ok(ResourceKind::Disk),
            other => Err(anyhow::anyhow!("Unknown resource type: {}", other)),
        }
    }
}

/// Canonical, kind-agnostic view of an instance or a disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    /// Short zone name, e.g. `us-central1-a`
    pub zone: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub status: String,
    /// External addresses only; always empty for disks
    #[serde(rename = "ipAddresses", default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<String>,
    /// `YYYY-MM-DD`, or `N/A` when the provider timestamp did not parse
    #[serde(rename = "creationTimestamp")]
    pub created_at: String,
}

/// A (zone, kind) call whose error was absorbed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneFailure {
    pub zone: String,
    pub kind: ResourceKind,
    pub message: String,
}

impl ZoneFailure {
    pub fn new(zone: &str, kind: ResourceKind, error: &anyhow::Error) -> Self {
        Self {
            zone: zone.to_string(),
            kind,
            message: format!("{:#}", error),
        }
    }
}

impl fmt::Display for ZoneFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.zone, self.kind, self.message)
    }
}

/// Drive every task in `tasks` to completion, or until `timeout` elapses.
///
/// On expiry the remaining tasks are aborted and reaped before returning, so
/// no task can write to shared state afterwards. Returns `true` if the
/// deadline fired.
pub(crate) async fn join_until(tasks: &mut JoinSet<()>, timeout: Duration) -> bool {
    let drained = tokio::time::timeout(timeout, async {
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                tracing::error!("Zone task failed: {}", e);
            }
        }
    })
    .await;

    if drained.is_ok() {
        return false;
    }

    tracing::warn!(
        "Deadline of {:?} reached, aborting {} outstanding zone tasks",
        timeout,
        tasks.len()
    );
    tasks.abort_all();
    while tasks.join_next().await.is_some() {}
    true
}
