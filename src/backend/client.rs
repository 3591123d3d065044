// ABOUTME: Shared HTTP plumbing for the agent backend: URL building, retries, JSON decoding.
// ABOUTME: Errors keep the HTTP status and trimmed body so the UI can show what the backend said.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_REQUEST_ATTEMPTS: usize = 2;

#[derive(Debug, Clone)]
pub struct BackendClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub request_attempts: usize,
}

impl BackendClientConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            request_attempts: DEFAULT_REQUEST_ATTEMPTS,
        }
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend base url is missing")]
    BaseUrlMissing,
    #[error("invalid backend path")]
    InvalidPath,
    #[error("backend request failed: {message}")]
    Request { message: String },
    #[error("failed to read backend response: {message}")]
    Read { message: String },
    #[error("backend returned {status}: {body}")]
    Http { status: StatusCode, body: String },
    #[error("failed to decode backend response: {message}")]
    Decode { message: String },
}

/// Thin JSON-over-HTTP client for the agent backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    timeout: Duration,
    request_attempts: usize,
    http: reqwest::Client,
}

impl BackendClient {
    pub fn new(config: BackendClientConfig) -> Result<Self, BackendError> {
        let base_url = normalize_base_url(&config.base_url)?;
        Ok(Self {
            base_url,
            timeout: Duration::from_millis(config.timeout_ms.max(250)),
            request_attempts: config.request_attempts.max(1),
            http: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn endpoint(&self, path: &str) -> Option<String> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.starts_with('/') {
            Some(format!("{}{}", self.base_url, trimmed))
        } else {
            Some(format!("{}/{}", self.base_url, trimmed))
        }
    }

    pub async fn get_json<T>(&self, path: &str) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint(path).ok_or(BackendError::InvalidPath)?;
        let response = self
            .send_with_retries(|| self.http.get(url.as_str()))
            .await?;
        decode_json_response(response).await
    }

    pub async fn post_json<Req, Res>(&self, path: &str, payload: &Req) -> Result<Res, BackendError>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let url = self.endpoint(path).ok_or(BackendError::InvalidPath)?;
        let response = self
            .send_with_retries(|| self.http.post(url.as_str()).json(payload))
            .await?;
        decode_json_response(response).await
    }

    /// Send a request, retrying only when the connection could not be opened.
    ///
    /// Anything that may have reached the backend (timeouts, reset bodies) is
    /// not resent: agent creation, chat and runs are not idempotent.
    async fn send_with_retries<F>(&self, build: F) -> Result<reqwest::Response, BackendError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut last_error: Option<String> = None;

        for attempt in 0..self.request_attempts {
            let request_id = format!("req_{}", Uuid::new_v4().simple());
            let request = build()
                .header("x-request-id", request_id.as_str())
                .timeout(self.timeout);

            match request.send().await {
                Ok(response) => {
                    debug!(request_id = %request_id, status = %response.status(), "backend response");
                    return Ok(response);
                }
                Err(error) => {
                    let retryable = error.is_connect();
                    warn!(request_id = %request_id, attempt, retryable, error = %error, "backend request failed");
                    last_error = Some(error.to_string());
                    if !retryable || attempt + 1 >= self.request_attempts {
                        break;
                    }
                }
            }
        }

        Err(BackendError::Request {
            message: last_error.unwrap_or_else(|| "unknown".to_string()),
        })
    }
}

pub fn format_http_error(status: StatusCode, body: &[u8]) -> BackendError {
    let body = non_empty_string(String::from_utf8_lossy(body).to_string())
        .unwrap_or_else(|| "<empty>".to_string());
    BackendError::Http { status, body }
}

fn normalize_base_url(base_url: &str) -> Result<String, BackendError> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err(BackendError::BaseUrlMissing);
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

async fn decode_json_response<T>(response: reqwest::Response) -> Result<T, BackendError>
where
    T: DeserializeOwned,
{
    let status = response.status();
    let bytes = response.bytes().await.map_err(|error| BackendError::Read {
        message: error.to_string(),
    })?;

    if !status.is_success() {
        return Err(format_http_error(status, &bytes));
    }

    serde_json::from_slice::<T>(&bytes).map_err(|error| BackendError::Decode {
        message: error.to_string(),
    })
}

fn non_empty_string(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_builder_normalizes_paths() {
        let client = BackendClient::new(BackendClientConfig::new("http://localhost:8080/"))
            .expect("backend client");

        assert_eq!(
            client.endpoint("/aigent/user-agents/0xabc"),
            Some("http://localhost:8080/aigent/user-agents/0xabc".to_string())
        );
        assert_eq!(
            client.endpoint("blend/web3_manager/0xabc/agents"),
            Some("http://localhost:8080/blend/web3_manager/0xabc/agents".to_string())
        );
        assert_eq!(client.endpoint("  "), None);
    }

    #[test]
    fn http_error_mapping_preserves_shape() {
        let error = format_http_error(StatusCode::FORBIDDEN, b" {\"detail\":\"nope\"} ");
        assert_eq!(
            error.to_string(),
            "backend returned 403 Forbidden: {\"detail\":\"nope\"}"
        );

        let empty = format_http_error(StatusCode::INTERNAL_SERVER_ERROR, b"  ");
        assert_eq!(
            empty.to_string(),
            "backend returned 500 Internal Server Error: <empty>"
        );
    }

    #[test]
    fn base_url_missing_is_rejected() {
        let result = BackendClient::new(BackendClientConfig::new("   "));
        assert!(matches!(result, Err(BackendError::BaseUrlMissing)));
    }

    #[test]
    fn attempts_and_timeout_are_clamped() {
        let mut config = BackendClientConfig::new("http://localhost:8080");
        config.request_attempts = 0;
        config.timeout_ms = 1;
        let client = BackendClient::new(config).unwrap();
        assert_eq!(client.request_attempts, 1);
        assert_eq!(client.timeout, Duration::from_millis(250));
    }
}
