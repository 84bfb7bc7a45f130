//! The inventory seam between the aggregation core and Compute Engine.

use super::client::GcpClient;
use super::compute::{Disk, Instance, Zone};
use anyhow::Result;
use async_trait::async_trait;

/// Read-only view of one project's zonal compute inventory.
///
/// Every call may fail independently and there is no consistency guarantee
/// between calls. `get_*` return `Ok(None)` when the named resource does not
/// exist in that zone.
#[async_trait]
pub trait Inventory: Send + Sync {
    async fn list_zones(&self) -> Result<Vec<Zone>>;
    async fn list_instances(&self, zone: &str) -> Result<Vec<Instance>>;
    async fn list_disks(&self, zone: &str) -> Result<Vec<Disk>>;
    async fn get_instance(&self, zone: &str, name: &str) -> Result<Option<Instance>>;
    async fn get_disk(&self, zone: &str, name: &str) -> Result<Option<Disk>>;
}

#[async_trait]
impl Inventory for GcpClient {
    async fn list_zones(&self) -> Result<Vec<Zone>> {
        GcpClient::list_zones(self).await
    }

    async fn list_instances(&self, zone: &str) -> Result<Vec<Instance>> {
        GcpClient::list_instances(self, zone).await
    }

    async fn list_disks(&self, zone: &str) -> Result<Vec<Disk>> {
        GcpClient::list_disks(self, zone).await
    }

    async fn get_instance(&self, zone: &str, name: &str) -> Result<Option<Instance>> {
        GcpClient::get_instance(self, zone, name).await
    }

    async fn get_disk(&self, zone: &str, name: &str) -> Result<Option<Disk>> {
        GcpClient::get_disk(self, zone, name).await
    }
}
