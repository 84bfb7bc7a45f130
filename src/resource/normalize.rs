//! Record normalization
//!
//! Pure mappings from Compute Engine records to [`Resource`]. No filtering
//! happens here.

use super::{Resource, ResourceKind};
use crate::gcp::compute::{Disk, Instance, NetworkInterface};
use chrono::DateTime;

/// Placeholder for a creation timestamp that did not parse
pub const MISSING_DATE: &str = "N/A";

/// Extract short name from a GCP resource URL
/// e.g., "https://www.googleapis.com/compute/v1/projects/my-project/zones/us-central1-a" -> "us-central1-a"
pub fn short_name(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// External (NAT) addresses across all interfaces, in encounter order
pub fn external_addresses(interfaces: &[NetworkInterface]) -> Vec<String> {
    interfaces
        .iter()
        .flat_map(|ni| ni.access_configs.iter())
        .filter(|ac| !ac.nat_ip.is_empty())
        .map(|ac| ac.nat_ip.clone())
        .collect()
}

/// RFC 3339 timestamp -> `YYYY-MM-DD` in the timestamp's own offset
pub fn creation_date(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(parsed) => parsed.format("%Y-%m-%d").to_string(),
        Err(e) => {
            tracing::warn!("Error parsing creation timestamp {:?}: {}", timestamp, e);
            MISSING_DATE.to_string()
        }
    }
}

impl From<&Instance> for Resource {
    fn from(instance: &Instance) -> Self {
        Self {
            name: instance.name.clone(),
            zone: short_name(&instance.zone).to_string(),
            kind: ResourceKind::Instance,
            status: instance.status.clone(),
            addresses: external_addresses(&instance.network_interfaces),
            created_at: creation_date(&instance.creation_timestamp),
        }
    }
}

impl From<&Disk> for Resource {
    fn from(disk: &Disk) -> Self {
        Self {
            name: disk.name.clone(),
            zone: short_name(&disk.zone).to_string(),
            kind: ResourceKind::Disk,
            status: disk.status.clone(),
            addresses: Vec::new(),
            created_at: creation_date(&disk.creation_timestamp),
        }
    }
}
