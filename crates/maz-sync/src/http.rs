//! Authenticated JSON GET transport.
//!
//! [`QueryTransport`] is the seam the walkers talk to; [`HttpTransport`] is
//! the reqwest implementation. Status-code handling (429 with `Retry-After`,
//! non-success → [`SyncError::Api`]) is centralized in [`check_response`].

use std::future::Future;
use std::time::Duration;

use maz_config::HttpConfig;
use maz_core::Endpoints;
use serde_json::{Map, Value};

use crate::credentials::CredentialProvider;
use crate::error::SyncError;

/// Per-call request preferences. Passed alongside each request; never stored
/// on the shared client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Ask the server to return only the `$select`ed attributes
    /// (`Prefer: return=minimal`). Used on a delta collection's initial sync.
    pub prefer_minimal: bool,
    /// Send `ConsistencyLevel: eventual`, required by advanced queries.
    pub eventual_consistency: bool,
}

impl RequestOptions {
    #[must_use]
    pub const fn minimal() -> Self {
        Self {
            prefer_minimal: true,
            eventual_consistency: false,
        }
    }
}

/// Issues one authenticated GET and returns the decoded JSON body.
pub trait QueryTransport: Send + Sync {
    fn get_json(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> impl Future<Output = Result<Value, SyncError>> + Send;
}

/// reqwest-backed transport with a fixed per-call timeout and no retry.
pub struct HttpTransport<C> {
    http: reqwest::Client,
    endpoints: Endpoints,
    credentials: C,
}

impl<C: CredentialProvider> HttpTransport<C> {
    /// # Errors
    ///
    /// Returns [`SyncError::Http`] if the underlying client fails to build.
    pub fn new(config: &HttpConfig, endpoints: Endpoints, credentials: C) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoints,
            credentials,
        })
    }
}

impl<C: CredentialProvider> QueryTransport for HttpTransport<C> {
    async fn get_json(&self, url: &str, options: &RequestOptions) -> Result<Value, SyncError> {
        let surface = self
            .endpoints
            .surface_of(url)
            .ok_or_else(|| SyncError::Credentials(format!("url outside configured APIs: {url}")))?;
        let token = self.credentials.bearer(surface)?;

        let mut request = self
            .http
            .get(url)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if options.prefer_minimal {
            request = request.header("Prefer", "return=minimal");
        }
        if options.eventual_consistency {
            request = request.header("ConsistencyLevel", "eventual");
        }

        tracing::debug!(url, ?options, "GET");
        let resp = check_response(url, request.send().await?).await?;
        let body = resp.text().await?;
        parse_body(&body)
    }
}

/// Check an HTTP response for common error conditions.
///
/// Returns the response unchanged on success. Handles:
/// - **429 Too Many Requests** → [`SyncError::RateLimited`] with
///   `Retry-After` header parsing (falls back to 60 s if absent or
///   unparseable).
/// - **Non-success status** → [`SyncError::Api`] with status code and
///   response body.
pub async fn check_response(
    url: &str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, SyncError> {
    if resp.status() == 429 {
        return Err(SyncError::RateLimited {
            retry_after_secs: parse_retry_after(&resp),
        });
    }
    if !resp.status().is_success() {
        return Err(SyncError::Api {
            status: resp.status().as_u16(),
            url: url.to_string(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}

/// Decode a response body. Count endpoints answer with a bare integer, which
/// is wrapped as `{"value": n}`; an empty body decodes to an empty object.
///
/// # Errors
///
/// Returns [`SyncError::Parse`] if the body is neither an integer nor JSON.
pub fn parse_body(body: &str) -> Result<Value, SyncError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    if let Ok(count) = trimmed.parse::<i64>() {
        let mut wrapped = Map::new();
        wrapped.insert("value".to_string(), Value::from(count));
        return Ok(Value::Object(wrapped));
    }
    serde_json::from_str(trimmed).map_err(|e| SyncError::Parse(format!("invalid JSON body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mock_response(status: u16) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body("")
                .unwrap(),
        )
    }

    fn mock_response_with_retry_after(status: u16, value: &str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .header("Retry-After", value)
                .body("")
                .unwrap(),
        )
    }

    #[test]
    fn parse_retry_after_from_header() {
        let resp = mock_response_with_retry_after(429, "120");
        assert_eq!(parse_retry_after(&resp), 120);
    }

    #[test]
    fn parse_retry_after_non_numeric() {
        let resp = mock_response_with_retry_after(429, "soon");
        assert_eq!(parse_retry_after(&resp), 60);
    }

    #[tokio::test]
    async fn check_response_rate_limited_default() {
        let err = check_response("u", mock_response(429)).await.unwrap_err();
        assert!(matches!(
            err,
            SyncError::RateLimited {
                retry_after_secs: 60
            }
        ));
    }

    #[tokio::test]
    async fn check_response_api_error_keeps_url() {
        let err = check_response("https://graph.microsoft.com/beta/users", mock_response(403))
            .await
            .unwrap_err();
        match err {
            SyncError::Api { status, url, .. } => {
                assert_eq!(status, 403);
                assert_eq!(url, "https://graph.microsoft.com/beta/users");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn check_response_success() {
        assert!(check_response("u", mock_response(200)).await.is_ok());
    }

    #[test]
    fn bare_integer_bodies_are_wrapped() {
        assert_eq!(parse_body("4213").unwrap(), json!({"value": 4213}));
    }

    #[test]
    fn empty_body_is_an_empty_object() {
        assert_eq!(parse_body("  ").unwrap(), json!({}));
    }

    #[test]
    fn garbage_body_is_a_parse_error() {
        assert!(matches!(parse_body("<html>"), Err(SyncError::Parse(_))));
    }

    #[tokio::test]
    async fn requests_outside_configured_apis_are_refused() {
        use crate::credentials::StaticCredentials;

        let transport = HttpTransport::new(
            &HttpConfig::default(),
            Endpoints::default(),
            StaticCredentials::new("g", "a"),
        )
        .unwrap();
        let err = transport
            .get_json("https://example.com/x", &RequestOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Credentials(_)));
    }
}
