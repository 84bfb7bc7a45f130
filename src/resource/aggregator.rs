//! Parallel Aggregator
//!
//! Lists instances and disks in every zone concurrently and merges everything
//! that passes the filter into one shared list.

use super::filter::ResourceFilter;
use super::{join_until, Resource, ResourceKind, ZoneFailure};
use crate::gcp::Inventory;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

/// Merged result of one listing request
#[derive(Debug, Default)]
pub struct Listing {
    /// Interleaved across zones by completion order; provider order within
    /// one zone's instance or disk list
    pub resources: Vec<Resource>,
    pub failures: Vec<ZoneFailure>,
    /// The deadline fired and `resources` is partial
    pub timed_out: bool,
}

/// List every zone's instances and disks, keeping records that pass `filter`.
///
/// Only the zone enumeration can fail the call. Errors from a single
/// (zone, kind) listing are recorded in [`Listing::failures`] and that pair
/// contributes nothing.
pub async fn list_resources(
    inventory: &Arc<dyn Inventory>,
    filter: &ResourceFilter,
    timeout: Duration,
) -> Result<Listing> {
    let zones = inventory.list_zones().await?;

    tracing::debug!("Listing resources across {} zones ({:?})", zones.len(), filter);

    let merged = Arc::new(Mutex::new(Listing::default()));
    let mut tasks = JoinSet::new();

    for zone in zones {
        let inventory = Arc::clone(inventory);
        let filter = filter.clone();
        let merged = Arc::clone(&merged);
        tasks.spawn(async move {
            list_zone(inventory.as_ref(), &zone.name, &filter, &merged).await;
        });
    }

    let timed_out = join_until(&mut tasks, timeout).await;

    let mut listing = std::mem::take(&mut *merged.lock().await);
    listing.timed_out = timed_out;

    tracing::debug!(
        "Listed {} resources, {} zone failures",
        listing.resources.len(),
        listing.failures.len()
    );

    Ok(listing)
}

/// Both kinds of one zone, each merged as soon as its listing returns
async fn list_zone(
    inventory: &dyn Inventory,
    zone: &str,
    filter: &ResourceFilter,
    merged: &Mutex<Listing>,
) {
    let instances = async {
        if !filter.wants(ResourceKind::Instance) {
            return;
        }
        let outcome = inventory.list_instances(zone).await.map(|items| {
            items
                .iter()
                .filter(|i| filter.matches(ResourceKind::Instance, &i.zone))
                .map(Resource::from)
                .collect::<Vec<_>>()
        });
        merge(merged, zone, ResourceKind::Instance, outcome).await;
    };

    let disks = async {
        if !filter.wants(ResourceKind::Disk) {
            return;
        }
        let outcome = inventory.list_disks(zone).await.map(|items| {
            items
                .iter()
                .filter(|d| filter.matches(ResourceKind::Disk, &d.zone))
                .map(Resource::from)
                .collect::<Vec<_>>()
        });
        merge(merged, zone, ResourceKind::Disk, outcome).await;
    };

    futures::future::join(instances, disks).await;
}

async fn merge(
    merged: &Mutex<Listing>,
    zone: &str,
    kind: ResourceKind,
    outcome: Result<Vec<Resource>>,
) {
    let mut listing = merged.lock().await;
    match outcome {
        Ok(resources) => listing.resources.extend(resources),
        Err(e) => {
            tracing::debug!("Dropping {} listing for zone {}: {:#}", kind, zone, e);
            listing.failures.push(ZoneFailure::new(zone, kind, &e));
        }
    }
}
