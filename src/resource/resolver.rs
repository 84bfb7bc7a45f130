//! Single-Resource Resolver
//!
//! Looks a name up as both an instance and a disk in every zone at once.
//! The first match recorded for each kind wins; later matches of the same
//! kind in other zones are dropped.

use super::{join_until, Resource, ResourceKind, ZoneFailure};
use crate::gcp::Inventory;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

/// Outcome of resolving one identifier
#[derive(Debug, Default)]
pub struct Resolution {
    /// At most one instance followed by at most one disk
    pub resources: Vec<Resource>,
    pub failures: Vec<ZoneFailure>,
    pub timed_out: bool,
}

impl Resolution {
    pub fn is_not_found(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Longest name Compute Engine accepts for instances and disks
pub const MAX_NAME_LEN: usize = 63;

/// Pick the identifier to resolve: a startup-pinned id always wins over the
/// one in the request. A blank pinned id counts as missing; the requested id
/// is taken as given, padding included.
pub fn effective_identifier<'a>(
    pinned: Option<&'a str>,
    requested: Option<&'a str>,
) -> Option<&'a str> {
    pinned
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .or_else(|| requested.filter(|id| !id.is_empty()))
}

/// Whether `id` is a valid instance/disk name: `[a-z]([-a-z0-9]*[a-z0-9])?`,
/// at most [`MAX_NAME_LEN`] characters.
///
/// Anything else (dots, slashes, whitespace, upper case) cannot name a
/// resource and must never reach a request path.
pub fn is_valid_resource_name(id: &str) -> bool {
    let bytes = id.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            bytes.len() <= MAX_NAME_LEN
                && first.is_ascii_lowercase()
                && (last.is_ascii_lowercase() || last.is_ascii_digit())
                && bytes
                    .iter()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
        }
        _ => false,
    }
}

#[derive(Default)]
struct Matches {
    instance: Mutex<Option<Resource>>,
    disk: Mutex<Option<Resource>>,
    failures: Mutex<Vec<ZoneFailure>>,
}

impl Matches {
    fn slot(&self, kind: ResourceKind) -> &Mutex<Option<Resource>> {
        match kind {
            ResourceKind::Instance => &self.instance,
            ResourceKind::Disk => &self.disk,
        }
    }

    /// Record `candidate` unless this kind already has a match.
    /// Check and write happen under the same lock.
    async fn record_first(&self, candidate: Resource) -> bool {
        let mut slot = self.slot(candidate.kind).lock().await;
        if slot.is_some() {
            return false;
        }
        *slot = Some(candidate);
        true
    }
}

/// Look in every zone for an instance and a disk named `id`.
///
/// Waits for every lookup (or the deadline) even after both kinds matched.
/// Only the zone enumeration can fail the call; a lookup that errors is
/// recorded in [`Resolution::failures`] and counts as not found. An `id`
/// that is not a valid resource name resolves to nothing without any
/// upstream call.
pub async fn resolve_resource(
    inventory: &Arc<dyn Inventory>,
    id: &str,
    timeout: Duration,
) -> Result<Resolution> {
    if !is_valid_resource_name(id) {
        tracing::debug!("Not resolving invalid resource name {:?}", id);
        return Ok(Resolution::default());
    }

    let zones = inventory.list_zones().await?;

    tracing::debug!("Resolving {:?} across {} zones", id, zones.len());

    let matches = Arc::new(Matches::default());
    let mut tasks = JoinSet::new();

    for zone in &zones {
        for kind in ResourceKind::ALL {
            let inventory = Arc::clone(inventory);
            let matches = Arc::clone(&matches);
            let zone = zone.name.clone();
            let id = id.to_string();
            tasks.spawn(async move {
                lookup(inventory.as_ref(), &zone, kind, &id, &matches).await;
            });
        }
    }

    let timed_out = join_until(&mut tasks, timeout).await;

    let mut resources = Vec::with_capacity(2);
    for kind in ResourceKind::ALL {
        if let Some(found) = matches.slot(kind).lock().await.take() {
            resources.push(found);
        }
    }
    let failures = std::mem::take(&mut *matches.failures.lock().await);

    Ok(Resolution {
        resources,
        failures,
        timed_out,
    })
}

async fn lookup(inventory: &dyn Inventory, zone: &str, kind: ResourceKind, id: &str, matches: &Matches) {
    let outcome = match kind {
        ResourceKind::Instance => inventory
            .get_instance(zone, id)
            .await
            .map(|found| found.as_ref().map(Resource::from)),
        ResourceKind::Disk => inventory
            .get_disk(zone, id)
            .await
            .map(|found| found.as_ref().map(Resource::from)),
    };

    match outcome {
        Ok(Some(resource)) if resource.name != id => {
            tracing::warn!(
                "Dropping {} {:?} returned for {:?} in {}",
                kind,
                resource.name,
                id,
                zone
            );
        }
        Ok(Some(resource)) => {
            if matches.record_first(resource).await {
                tracing::debug!("Found {} {:?} in {}", kind, id, zone);
            } else {
                tracing::debug!("Ignoring duplicate {} {:?} in {}", kind, id, zone);
            }
        }
        Ok(None) => {}
        Err(e) => {
            tracing::debug!("{} lookup for {:?} failed in {}: {:#}", kind, id, zone, e);
            matches
                .failures
                .lock()
                .await
                .push(ZoneFailure::new(zone, kind, &e));
        }
    }
}
