//! HTTP utilities for GCP REST API calls

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|&i| body.is_char_boundary(i))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Non-success HTTP status returned by the API
#[derive(Debug, Error)]
#[error("API request failed: {status}")]
pub struct ApiStatusError {
    pub status: StatusCode,
}

/// HTTP client wrapper for GCP API calls
#[derive(Clone)]
pub struct GcpHttpClient {
    client: Client,
}

impl GcpHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("gcp-inventory/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Make a GET request to a GCP API
    pub async fn get(&self, url: &str, token: &str) -> Result<Value> {
        match self.get_optional(url, token).await? {
            Some(value) => Ok(value),
            None => Err(ApiStatusError {
                status: StatusCode::NOT_FOUND,
            }
            .into()),
        }
    }

    /// Make a GET request where a 404 is an expected outcome rather than an error
    pub async fn get_optional(&self, url: &str, token: &str) -> Result<Option<Value>> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if status == StatusCode::NOT_FOUND {
            tracing::debug!("GET {} -> 404", url);
            return Ok(None);
        }

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(ApiStatusError { status }.into());
        }

        if body.is_empty() {
            return Ok(Some(Value::Null));
        }

        serde_json::from_str(&body)
            .map(Some)
            .context("Failed to parse response JSON")
    }
}

/// Format a GCP API error for display
/// Security: Sanitizes error messages to avoid leaking sensitive API details
///
/// Classification looks at the typed causes in the chain, never at the
/// rendered text, so digits in URLs, ports or names cannot be mistaken for
/// a status code.
pub fn format_gcp_error(error: &anyhow::Error) -> String {
    if let Some(ApiStatusError { status }) = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<ApiStatusError>())
    {
        return match status.as_u16() {
            403 => "Permission denied. Check your GCP IAM permissions.".to_string(),
            401 => {
                "Authentication failed. Run 'gcloud auth application-default login'.".to_string()
            }
            404 => "Resource not found.".to_string(),
            429 => "Rate limit exceeded. Please try again later.".to_string(),
            400 => "Invalid request. Check your parameters.".to_string(),
            500..=599 => "GCP service temporarily unavailable. Please try again.".to_string(),
            _ => format!("GCP API request failed ({}).", status),
        };
    }

    if error.chain().any(|cause| cause.is::<reqwest::Error>()) {
        return "Unable to reach the GCP API. Check your network connection and try again."
            .to_string();
    }

    let message = error.root_cause().to_string();
    let sanitized = message
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .take(80)
        .collect::<String>();

    if sanitized.len() < message.len() {
        format!("{}...", sanitized)
    } else {
        sanitized
    }
}
