//! GCP Client
//!
//! Main client for the Compute Engine API, combining authentication
//! and HTTP functionality for a single project.

use super::auth::GcpCredentials;
use super::compute::{Disk, Instance, ListResponse, Zone};
use super::http::GcpHttpClient;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Public Compute Engine API endpoint
pub const DEFAULT_COMPUTE_ENDPOINT: &str = "https://compute.googleapis.com";

/// Main GCP client
#[derive(Clone)]
pub struct GcpClient {
    pub credentials: GcpCredentials,
    pub http: GcpHttpClient,
    pub project_id: String,
    endpoint: String,
}

impl GcpClient {
    /// Create a client from already-resolved credentials
    pub fn with_credentials(project_id: &str, credentials: GcpCredentials) -> Result<Self> {
        Ok(Self {
            credentials,
            http: GcpHttpClient::new()?,
            project_id: project_id.to_string(),
            endpoint: DEFAULT_COMPUTE_ENDPOINT.to_string(),
        })
    }

    /// Point the client at a different API endpoint (mock servers, private endpoints)
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    /// Make a GET request to a GCP API
    pub async fn get(&self, url: &str) -> Result<Value> {
        let token = self.credentials.get_token().await?;
        self.http.get(url, &token).await
    }

    /// Make a GET request, mapping 404 to `None`
    pub async fn get_optional(&self, url: &str) -> Result<Option<Value>> {
        let token = self.credentials.get_token().await?;
        self.http.get_optional(url, &token).await
    }

    // =========================================================================
    // Compute Engine API helpers
    // =========================================================================

    /// Build Compute Engine API URL
    pub fn compute_url(&self, path: &str) -> String {
        format!(
            "{}/compute/v1/projects/{}/{}",
            self.endpoint,
            urlencoding::encode(&self.project_id),
            path
        )
    }

    /// Build zonal Compute Engine API URL
    pub fn compute_zonal_url(&self, zone: &str, resource: &str) -> String {
        self.compute_url(&format!("zones/{}/{}", urlencoding::encode(zone), resource))
    }

    /// Build the URL of a single named zonal resource
    pub fn compute_zonal_item_url(&self, zone: &str, resource: &str, name: &str) -> String {
        self.compute_zonal_url(zone, &format!("{}/{}", resource, urlencoding::encode(name)))
    }

    // =========================================================================
    // Typed Compute Engine calls
    // =========================================================================

    async fn list<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>> {
        let response = self.get(url).await?;
        let list: ListResponse<T> =
            serde_json::from_value(response).context("Unexpected list response shape")?;

        if list.next_page_token.is_some() {
            tracing::debug!("Ignoring further pages for {}", url);
        }

        Ok(list.items)
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        match self.get_optional(url).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .context("Unexpected resource shape"),
            None => Ok(None),
        }
    }

    /// List every zone visible to the project
    pub async fn list_zones(&self) -> Result<Vec<Zone>> {
        self.list(&self.compute_url("zones"))
            .await
            .context("Failed to list zones")
    }

    pub async fn list_instances(&self, zone: &str) -> Result<Vec<Instance>> {
        self.list(&self.compute_zonal_url(zone, "instances"))
            .await
            .with_context(|| format!("Failed to list instances in {}", zone))
    }

    pub async fn list_disks(&self, zone: &str) -> Result<Vec<Disk>> {
        self.list(&self.compute_zonal_url(zone, "disks"))
            .await
            .with_context(|| format!("Failed to list disks in {}", zone))
    }

    pub async fn get_instance(&self, zone: &str, name: &str) -> Result<Option<Instance>> {
        self.fetch(&self.compute_zonal_item_url(zone, "instances", name))
            .await
            .with_context(|| format!("Failed to get instance {} in {}", name, zone))
    }

    pub async fn get_disk(&self, zone: &str, name: &str) -> Result<Option<Disk>> {
        self.fetch(&self.compute_zonal_item_url(zone, "disks", name))
            .await
            .with_context(|| format!("Failed to get disk {} in {}", name, zone))
    }
}

/// Format a GCP API error for display
pub fn format_gcp_error(error: &anyhow::Error) -> String {
    super::http::format_gcp_error(error)
}
