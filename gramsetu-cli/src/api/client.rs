//! HTTP client for the GramSetu backend

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;

use crate::import::records::SignupPayload;

/// Path of the resident signup endpoint, relative to the API base URL.
const RESIDENT_SIGNUP_PATH: &str = "/user/resident_signup";

/// Outcome of a single signup attempt that produced a response.
#[derive(Debug, Clone)]
pub struct SignupOutcome {
    /// Whether the backend accepted the record (any 2xx status).
    pub success: bool,
    /// HTTP status code, when one was received at all.
    pub status_code: Option<u16>,
    /// Error description for failed attempts.
    pub error: Option<String>,
}

impl SignupOutcome {
    pub fn success(status_code: u16) -> Self {
        Self {
            success: true,
            status_code: Some(status_code),
            error: None,
        }
    }

    pub fn error(error: impl Into<String>, status_code: Option<u16>) -> Self {
        Self {
            success: false,
            status_code,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

/// The signup surface the batch submitter depends on.
///
/// Implementations may return `Err` for failures that never produced a
/// response; the submitter treats those the same as a rejected record.
#[async_trait]
pub trait ResidentBackend: Send + Sync {
    async fn resident_signup(&self, payload: &SignupPayload) -> Result<SignupOutcome>;
}

/// reqwest-backed client for a GramSetu deployment.
#[derive(Debug, Clone)]
pub struct GramsetuClient {
    http: reqwest::Client,
    base_url: String,
}

impl GramsetuClient {
    /// Create a client for an API base URL (scheme, host, optional path
    /// prefix). A trailing slash on the base URL is tolerated.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ResidentBackend for GramsetuClient {
    async fn resident_signup(&self, payload: &SignupPayload) -> Result<SignupOutcome> {
        let url = self.endpoint(RESIDENT_SIGNUP_PATH);
        debug!("POST {} for username {}", url, payload.username);

        let response = self
            .http
            .post(&url)
            .json(payload)
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", url))?;

        let status = response.status();
        if status.is_success() {
            return Ok(SignupOutcome::success(status.as_u16()));
        }

        let body = response.text().await.unwrap_or_default();
        Ok(SignupOutcome::error(
            format!("HTTP {}: {}", status.as_u16(), summarize_body(&body)),
            Some(status.as_u16()),
        ))
    }
}

/// First part of a response body, enough to log without flooding.
fn summarize_body(body: &str) -> String {
    let trimmed = body.trim();
    let mut summary: String = trimmed.chars().take(200).collect();
    if summary.len() < trimmed.len() {
        summary.push_str("...");
    }
    summary
}
