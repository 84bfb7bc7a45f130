//! Flattened, filterable view of a GCP project's instances and disks across
//! every zone, served over HTTP.

pub mod config;
pub mod gcp;
pub mod resource;
pub mod server;

/// Version injected at compile time via GCP_INVENTORY_VERSION env var (set by CI/CD),
/// or the crate version for local builds.
pub const VERSION: &str = match option_env!("GCP_INVENTORY_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};
