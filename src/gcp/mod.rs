//! GCP API interaction module
//!
//! This module provides the core functionality for talking to the Compute
//! Engine API: authentication, the HTTP client and the typed wire records.
//!
//! # Module Structure
//!
//! - [`auth`] - GCP authentication using Application Default Credentials
//! - [`client`] - Compute Engine client bound to one project
//! - [`compute`] - Wire records (zones, instances, disks)
//! - [`http`] - HTTP utilities for REST API calls
//! - [`inventory`] - The [`Inventory`] trait consumed by the aggregation core
//!
//! # Example
//!
//! ```ignore
//! use gcp_inventory::gcp::auth::GcpCredentials;
//! use gcp_inventory::gcp::{GcpClient, Inventory};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = GcpClient::with_credentials("my-project", GcpCredentials::new().await?)?;
//!     let instances = client.list_instances("us-central1-a").await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod compute;
pub mod http;
pub mod inventory;

pub use client::GcpClient;
pub use inventory::Inventory;
