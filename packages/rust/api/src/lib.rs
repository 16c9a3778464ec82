//! REST API collaborator.
//!
//! [`ApiClient::send_request`] never returns an error: every outcome, including
//! a missing connection or a transport failure, is folded into an
//! [`ApiResponse`] with an HTTP-style status and a raw body.

mod connection;

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use guidegen_shared::{ApiConfig, GuideError, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{error, info, instrument, warn};

pub use connection::ConnectionConfig;

/// Request timeout when the caller gives none.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Sent as `X-Request-GUID`; header names are case-insensitive.
const REQUEST_GUID_HEADER: &str = "x-request-guid";

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// One API call. Built with chained setters.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: String,
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub params: Vec<(String, String)>,
    pub body: Option<Value>,
    pub request_id: Option<String>,
    pub timeout_ms: u64,
}

impl ApiRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: BTreeMap::new(),
            params: Vec::new(),
            body: None,
            request_id: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// Outcome of [`ApiClient::send_request`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    /// Raw response body, or a JSON `{error, message}` object for local failures.
    pub content: String,
}

impl ApiResponse {
    fn failure(status: u16, error: &str, message: impl std::fmt::Display) -> Self {
        Self {
            status,
            content: json!({ "error": error, "message": message.to_string() }).to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Option<String>,
    auth_header: Option<String>,
    client: Client,
}

impl ApiClient {
    pub fn new(connection: &ConnectionConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| GuideError::Network(format!("failed to build HTTP client: {e}")))?;

        let base_url = connection.base_url();
        if let Some(url) = &base_url {
            info!(%url, "API connection initialized");
        }

        Ok(Self {
            base_url,
            auth_header: connection
                .access_token
                .as_deref()
                .map(|token| format!("Bearer {token}")),
            client,
        })
    }

    /// Client for the connection named in `config`. An unreadable connections
    /// file yields an uninitialized client rather than an error.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let path = Path::new(&config.connections_file);
        let connection = ConnectionConfig::load(path).unwrap_or_else(|e| {
            error!(error = %e, "failed to load connection config");
            ConnectionConfig::default()
        });
        Self::new(&connection)
    }

    /// Point the client somewhere other than the account host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Whether requests will actually be attempted.
    pub fn is_initialized(&self) -> bool {
        self.base_url.is_some() && self.auth_header.is_some()
    }

    /// Perform `request`.
    ///
    /// HTTP error statuses pass through with their raw body. Local failures
    /// map to status 500 with a JSON `{error, message}` body.
    #[instrument(skip_all, fields(method = %request.method, path = %request.path))]
    pub async fn send_request(&self, request: &ApiRequest) -> ApiResponse {
        let (Some(base_url), Some(auth)) = (&self.base_url, &self.auth_header) else {
            return ApiResponse::failure(
                500,
                "Connection not initialized",
                "Failed to load validation connection config",
            );
        };

        let method = match Method::from_bytes(request.method.to_ascii_uppercase().as_bytes()) {
            Ok(method) => method,
            Err(e) => return ApiResponse::failure(500, "Unexpected error", e),
        };

        let headers = match build_headers(auth, request) {
            Ok(headers) => headers,
            Err(message) => return ApiResponse::failure(500, "Unexpected error", message),
        };

        let url = format!("{}{}", base_url.trim_end_matches('/'), request.path);
        info!(%method, %url, "sending API request");

        let mut builder = self
            .client
            .request(method, &url)
            .headers(headers)
            .timeout(Duration::from_millis(request.timeout_ms));
        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        if let Some(body) = request.body.as_ref().filter(|b| !b.is_null()) {
            builder = builder.body(body.to_string());
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) if e.is_builder() => return ApiResponse::failure(500, "Unexpected error", e),
            Err(e) => {
                error!(error = %e, "API request failed");
                return ApiResponse::failure(500, "Connection failed", e);
            }
        };

        let status = response.status();
        info!(status = status.as_u16(), "API response");

        match response.text().await {
            Ok(content) => {
                if !status.is_success() {
                    error!(status = status.as_u16(), "API returned an error status");
                    if status == StatusCode::UNAUTHORIZED {
                        explain_unauthorized(&content);
                    }
                }
                ApiResponse {
                    status: status.as_u16(),
                    content,
                }
            }
            Err(e) if status.is_success() => ApiResponse::failure(500, "Connection failed", e),
            Err(_) => ApiResponse::failure(
                status.as_u16(),
                &format!("HTTP {}", status.as_u16()),
                status.canonical_reason().unwrap_or("unknown"),
            ),
        }
    }
}

/// Defaults first, caller headers over them, then the request id.
fn build_headers(auth: &str, request: &ApiRequest) -> std::result::Result<HeaderMap, String> {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(auth).map_err(|e| format!("authorization header: {e}"))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    for (name, value) in &request.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| format!("header name {name:?}: {e}"))?;
        let value = HeaderValue::from_str(value).map_err(|e| format!("header {name}: {e}"))?;
        headers.insert(name, value);
    }

    if let Some(id) = &request.request_id {
        let value = HeaderValue::from_str(id).map_err(|e| format!("request id: {e}"))?;
        headers.insert(HeaderName::from_static(REQUEST_GUID_HEADER), value);
    }

    Ok(headers)
}

fn explain_unauthorized(content: &str) {
    let message = serde_json::from_str::<Value>(content)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_default();

    if message.contains("Network policy is required") {
        warn!("network policy restriction: API access may be limited by IP/network policies");
    } else {
        let lower = message.to_lowercase();
        if lower.contains("invalid") || lower.contains("expired") {
            warn!("access token may be invalid or expired");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn request_builder_collects_parts() {
        let req = ApiRequest::new("post", "/api/v2/cortex/inference:complete")
            .header("X-Snowflake-Authorization-Token-Type", "PROGRAMMATIC_ACCESS_TOKEN")
            .param("limit", "5")
            .body(json!({"model": "llama3.1-8b"}))
            .request_id("abc")
            .timeout_ms(5_000);

        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.params, vec![("limit".to_string(), "5".to_string())]);
        assert_eq!(req.timeout_ms, 5_000);
        assert_eq!(req.request_id.as_deref(), Some("abc"));
    }

    #[test]
    fn caller_headers_override_defaults() {
        let req = ApiRequest::new("GET", "/").header("accept", "text/plain").request_id("r-1");
        let headers = build_headers("Bearer t", &req).unwrap();

        assert_eq!(headers[ACCEPT], "text/plain");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers[AUTHORIZATION], "Bearer t");
        assert_eq!(headers[REQUEST_GUID_HEADER], "r-1");
    }

    #[test]
    fn bad_header_name_is_rejected() {
        let req = ApiRequest::new("GET", "/").header("bad header", "x");
        assert!(build_headers("Bearer t", &req).is_err());
    }

    #[tokio::test]
    async fn uninitialized_client_short_circuits() {
        let client = ApiClient::new(&ConnectionConfig::default()).unwrap();
        assert!(!client.is_initialized());

        let resp = client.send_request(&ApiRequest::new("GET", "/x")).await;
        assert_eq!(resp.status, 500);
        let body: Value = serde_json::from_str(&resp.content).unwrap();
        assert_eq!(body["error"], "Connection not initialized");
    }

    #[tokio::test]
    async fn missing_token_is_uninitialized() {
        let connection = ConnectionConfig {
            account: Some("acct".into()),
            access_token: None,
        };
        let client = ApiClient::new(&connection).unwrap();
        let resp = client.send_request(&ApiRequest::new("GET", "/x")).await;
        assert_eq!(resp.status, 500);
        assert!(resp.content.contains("Connection not initialized"));
    }

    // -----------------------------------------------------------------------
    // Against a mock server
    // -----------------------------------------------------------------------

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&ConnectionConfig::new("acct", "secret-token"))
            .unwrap()
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn success_passes_body_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/cortex/inference:complete"))
            .and(header("authorization", "Bearer secret-token"))
            .and(header("content-type", "application/json"))
            .and(header("x-request-guid", "req-42"))
            .and(query_param("stream", "false"))
            .and(body_json(json!({"model": "mistral-large2"})))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"choices":[]}"#))
            .expect(1)
            .mount(&server)
            .await;

        let request = ApiRequest::new("post", "/api/v2/cortex/inference:complete")
            .param("stream", "false")
            .body(json!({"model": "mistral-large2"}))
            .request_id("req-42");
        let resp = client_for(&server).send_request(&request).await;

        assert_eq!(resp.status, 200);
        assert!(resp.is_success());
        assert_eq!(resp.content, r#"{"choices":[]}"#);
    }

    #[tokio::test]
    async fn http_errors_keep_status_and_body() {
        let server = MockServer::start().await;
        let body = r#"{"code":"390303","message":"Invalid OAuth access token."}"#;
        Mock::given(method("GET"))
            .and(path("/api/v2/databases"))
            .respond_with(ResponseTemplate::new(401).set_body_string(body))
            .mount(&server)
            .await;

        let resp = client_for(&server)
            .send_request(&ApiRequest::new("GET", "/api/v2/databases"))
            .await;

        assert_eq!(resp.status, 401);
        assert_eq!(resp.content, body);
        assert!(!resp.is_success());
    }

    #[tokio::test]
    async fn null_body_is_not_sent() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/empty"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let resp = client_for(&server)
            .send_request(&ApiRequest::new("PUT", "/empty").body(Value::Null))
            .await;
        assert_eq!(resp.status, 204);
        assert_eq!(resp.content, "");

        let received = server.received_requests().await.unwrap();
        assert!(received[0].body.is_empty());
    }

    #[tokio::test]
    async fn transport_failure_maps_to_500() {
        let client = ApiClient::new(&ConnectionConfig::new("acct", "t"))
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        let resp = client
            .send_request(&ApiRequest::new("GET", "/x").timeout_ms(500))
            .await;

        assert_eq!(resp.status, 500);
        let body: Value = serde_json::from_str(&resp.content).unwrap();
        assert_eq!(body["error"], "Connection failed");
    }

    #[tokio::test]
    async fn invalid_method_maps_to_500() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let resp = client_for(&server)
            .send_request(&ApiRequest::new("NOT A METHOD", "/x"))
            .await;

        assert_eq!(resp.status, 500);
        let body: Value = serde_json::from_str(&resp.content).unwrap();
        assert_eq!(body["error"], "Unexpected error");
    }

    #[test]
    fn from_config_without_file_is_uninitialized() {
        let dir = tempfile::tempdir().unwrap();
        let config = ApiConfig {
            connections_file: dir.path().join("nope.toml").display().to_string(),
            ..ApiConfig::default()
        };
        let client = ApiClient::from_config(&config).unwrap();
        assert!(!client.is_initialized());
    }
}
