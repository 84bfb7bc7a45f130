//! HTTP server exposing the aggregated inventory.

pub mod error;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::config::Config;
use crate::gcp::Inventory;
use crate::resource::{
    effective_identifier, is_valid_resource_name, list_resources, resolve_resource, Resource,
    ResourceFilter, ResourceKind, ZoneFailure,
};
pub use error::ApiError;

/// Number of per-zone errors absorbed while building the response
pub const ZONE_FAILURES_HEADER: &str = "x-zone-failures";
/// Present when the request deadline cut the fan-out short
pub const PARTIAL_RESULT_HEADER: &str = "x-partial-result";

/// Shared, read-only handler state
#[derive(Clone)]
pub struct AppState {
    pub inventory: Arc<dyn Inventory>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(inventory: Arc<dyn Inventory>, config: Config) -> Self {
        Self {
            inventory,
            config: Arc::new(config),
        }
    }
}

/// Build the API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/resources", get(list_handler))
        .route("/api/resources/", get(missing_id_handler))
        .route("/api/resources/{id}", get(resource_handler))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    id = %Uuid::new_v4(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    #[serde(default)]
    region: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

impl ListParams {
    fn filter(&self) -> Result<ResourceFilter, ApiError> {
        let kind = match self.kind.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<ResourceKind>()
                    .map_err(|_| ApiError::InvalidType(raw.to_string()))?,
            ),
        };
        Ok(ResourceFilter::new(self.region.as_deref(), kind))
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "gcp-inventory",
        "version": crate::VERSION
    }))
}

/// `GET /api/resources` - filtered listing, or the pinned resource
async fn list_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Response, ApiError> {
    if state.config.is_pinned() {
        return resolve(&state, None).await;
    }

    let filter = params.filter()?;
    let listing = list_resources(&state.inventory, &filter, state.config.request_timeout).await?;

    Ok(respond(listing.resources, &listing.failures, listing.timed_out))
}

/// `GET /api/resources/{id}`
async fn resource_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    resolve(&state, Some(&id)).await
}

/// `GET /api/resources/` - only meaningful when an id is pinned
async fn missing_id_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    resolve(&state, None).await
}

async fn resolve(state: &AppState, requested: Option<&str>) -> Result<Response, ApiError> {
    let id = effective_identifier(state.config.pinned_resource_id.as_deref(), requested)
        .ok_or(ApiError::MissingIdentifier)?;
    if !is_valid_resource_name(id) {
        return Err(ApiError::InvalidIdentifier(id.to_string()));
    }

    let resolution = resolve_resource(&state.inventory, id, state.config.request_timeout).await?;

    if resolution.is_not_found() {
        log_failures(&resolution.failures);
        return Err(ApiError::NotFound);
    }

    Ok(respond(resolution.resources, &resolution.failures, resolution.timed_out))
}

fn log_failures(failures: &[ZoneFailure]) {
    for failure in failures {
        tracing::warn!("Absorbed zone failure: {}", failure);
    }
}

fn respond(resources: Vec<Resource>, failures: &[ZoneFailure], timed_out: bool) -> Response {
    log_failures(failures);

    let mut headers = HeaderMap::new();
    headers.insert(ZONE_FAILURES_HEADER, HeaderValue::from(failures.len()));
    if timed_out {
        headers.insert(PARTIAL_RESULT_HEADER, HeaderValue::from_static("true"));
    }

    (StatusCode::OK, headers, Json(resources)).into_response()
}
