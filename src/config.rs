//! Configuration Management
//!
//! Settings are resolved once at startup (CLI > config file > gcloud
//! defaults > built-ins) into an immutable [`Config`].

use crate::gcp::auth;
use crate::gcp::client::DEFAULT_COMPUTE_ENDPOINT;
use crate::resource::is_valid_resource_name;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings persisted in the config file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub project_id: Option<String>,
    /// Pin the single-resource endpoint to this identifier
    #[serde(default)]
    pub resource_id: Option<String>,
    #[serde(default)]
    pub bind_addr: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub compute_endpoint: Option<String>,
}

impl FileConfig {
    /// Default config file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gcp-inventory").join("config.json"))
    }

    /// Load configuration from disk. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) else {
            return Ok(Self::default());
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }
}

/// Values given on the command line (or their env fallbacks)
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub project_id: Option<String>,
    pub resource_id: Option<String>,
    pub bind_addr: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub compute_endpoint: Option<String>,
}

/// Process-wide configuration, read-only after startup
#[derive(Debug, Clone)]
pub struct Config {
    pub project_id: String,
    /// When set, every single-resource request resolves this id and the
    /// listing endpoint behaves as a single-resource lookup
    pub pinned_resource_id: Option<String>,
    pub bind_addr: SocketAddr,
    pub request_timeout: Duration,
    pub compute_endpoint: Url,
}

impl Config {
    /// Merge CLI overrides over the file config, then gcloud defaults
    pub fn resolve(overrides: Overrides, file: FileConfig) -> Result<Self> {
        let project_id = overrides
            .project_id
            .or(file.project_id)
            .or_else(auth::get_default_project)
            .context(
                "No GCP project configured. Set GOOGLE_CLOUD_PROJECT or use --project flag",
            )?;

        if !auth::validate_project_id(&project_id) {
            anyhow::bail!("Invalid GCP project ID: {}", project_id);
        }

        let pinned_resource_id = overrides
            .resource_id
            .or(file.resource_id)
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        if let Some(id) = &pinned_resource_id {
            if !is_valid_resource_name(id) {
                anyhow::bail!("Invalid resource ID: {}", id);
            }
        }

        let bind_addr = overrides
            .bind_addr
            .or(file.bind_addr)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_addr
            .parse()
            .with_context(|| format!("Invalid bind address: {}", bind_addr))?;

        let request_timeout = overrides
            .request_timeout_secs
            .or(file.request_timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        if request_timeout.is_zero() {
            anyhow::bail!("Request timeout must be at least one second");
        }

        let endpoint = overrides
            .compute_endpoint
            .or(file.compute_endpoint)
            .unwrap_or_else(|| DEFAULT_COMPUTE_ENDPOINT.to_string());
        let compute_endpoint = Url::parse(&endpoint)
            .with_context(|| format!("Invalid compute endpoint: {}", endpoint))?;
        if !matches!(compute_endpoint.scheme(), "http" | "https") {
            anyhow::bail!("Compute endpoint must be http(s): {}", endpoint);
        }

        Ok(Self {
            project_id,
            pinned_resource_id,
            bind_addr,
            request_timeout,
            compute_endpoint,
        })
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned_resource_id.is_some()
    }
}
