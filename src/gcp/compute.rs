//! Compute Engine wire records
//!
//! Only the fields the inventory cares about are modelled; everything else in
//! the API payload is ignored.

use serde::Deserialize;

/// A zone as returned by `zones.list`
#[derive(Debug, Clone, Deserialize)]
pub struct Zone {
    pub name: String,
}

/// A VM instance as returned by `instances.list` / `instances.get`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub name: String,
    /// Fully-qualified zone URL
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub creation_timestamp: String,
    #[serde(default)]
    pub network_interfaces: Vec<NetworkInterface>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkInterface {
    #[serde(rename = "networkIP")]
    pub network_ip: String,
    pub access_configs: Vec<AccessConfig>,
}

/// How a network interface gets its external address
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    #[serde(rename = "natIP")]
    pub nat_ip: String,
}

/// A persistent disk as returned by `disks.list` / `disks.get`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disk {
    pub name: String,
    /// Fully-qualified zone URL
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub creation_timestamp: String,
}

/// Envelope shared by every `*.list` response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}
