//! Retrying HTTP transport
//!
//! Issues one logical request, re-sending it while the response status is
//! outside `[200, 300)` until the retry budget is spent. Connection-level
//! failures are returned immediately and are never retried.

use crate::auth::Authenticator;
use crate::error::{OpcError, OperationError, Result};
use async_trait::async_trait;
use reqwest::Method;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_MAX_RETRIES: u32 = 1;
pub const JSON_MEDIA_TYPE: &str = "application/json";
pub const METHOD_OVERRIDE_HEADER: &str = "X-HTTP-Method-Override";

/// A fully resolved request, as handed to the backend
#[derive(Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Set a header, replacing any existing value (names compare case-insensitively)
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(n, v)| {
                if n.eq_ignore_ascii_case("authorization") {
                    (n.as_str(), "<redacted>")
                } else {
                    (n.as_str(), v.as_str())
                }
            })
            .collect();
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &headers)
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends a single HTTP request. Implementations must not retry.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// `reqwest`-backed implementation of [`HttpBackend`]
pub struct ReqwestBackend {
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(request_timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("opcflow/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.client.request(request.method.clone(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

/// Retrying transport bound to one base URL and one authenticator
#[derive(Clone)]
pub struct Transport {
    backend: Arc<dyn HttpBackend>,
    base_url: String,
    authenticator: Authenticator,
    max_retries: u32,
}

impl Transport {
    pub fn new(
        base_url: impl Into<String>,
        authenticator: Authenticator,
        backend: Arc<dyn HttpBackend>,
    ) -> Self {
        Self {
            backend,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            authenticator,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Total attempts per request. Zero is treated as one.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    /// Resolve a path against the base URL. Absolute URLs pass through.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Build, send and retry one request.
    ///
    /// `headers` override the JSON `Content-Type`/`Accept` defaults.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse> {
        let mut request = HttpRequest::new(method, self.url_for(path));
        request.set_header("Accept", JSON_MEDIA_TYPE);
        if let Some(body) = body {
            request.body = Some(serde_json::to_vec(body)?);
            request.set_header("Content-Type", JSON_MEDIA_TYPE);
        }
        for (name, value) in headers {
            request.set_header(*name, *value);
        }

        let attempts = self.max_retries.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!(
                method = %request.method,
                url = %request.url,
                attempt,
                attempts,
                "Sending request"
            );

            let mut outgoing = request.clone();
            self.authenticator.apply(&mut outgoing);
            let response = self.backend.send(&outgoing).await?;

            if response.is_success() {
                return Ok(response);
            }

            if attempt >= attempts {
                debug!(
                    method = %request.method,
                    url = %request.url,
                    status = response.status,
                    "Request failed, retries exhausted"
                );
                return Err(OpcError::Operation(OperationError::new(
                    response.status,
                    response.text(),
                )));
            }

            warn!(
                method = %request.method,
                url = %request.url,
                status = response.status,
                attempt,
                "Request failed, retrying"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credentials;
    use crate::testing::ScriptedBackend;
    use serde_json::json;

    fn transport(backend: Arc<ScriptedBackend>, max_retries: u32) -> Transport {
        Transport::new(
            "https://api.example.com/",
            Authenticator::basic(Credentials::new("dom", "user", "pass")),
            backend,
        )
        .with_max_retries(max_retries)
    }

    #[tokio::test]
    async fn test_retry_bound_on_persistent_failure() {
        let backend = Arc::new(ScriptedBackend::new().always(500, "internal error"));
        let transport = transport(backend.clone(), 4);

        let err = transport
            .execute(Method::GET, "/vlbrs", None, &[])
            .await
            .unwrap_err();

        assert_eq!(backend.call_count(), 4);
        match err {
            OpcError::Operation(op) => {
                assert_eq!(op.status_code, 500);
                assert_eq!(op.message, "internal error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_early_success_stops_retrying() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .respond(503, "busy")
                .respond(200, r#"{"name":"lb1"}"#)
                .respond(200, "unused"),
        );
        let transport = transport(backend.clone(), 3);

        let response = transport
            .execute(Method::GET, "vlbrs/lb1", None, &[])
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.text(), r#"{"name":"lb1"}"#);
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn test_default_budget_is_single_attempt() {
        let backend = Arc::new(ScriptedBackend::new().always(502, "bad gateway"));
        let transport = Transport::new(
            "https://api.example.com",
            Authenticator::basic(Credentials::new("dom", "user", "pass")),
            backend.clone(),
        );

        let err = transport
            .execute(Method::DELETE, "x", None, &[])
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(502));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_is_not_retried() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .fail("connection refused")
                .respond(200, "{}"),
        );
        let transport = transport(backend.clone(), 5);

        let err = transport
            .execute(Method::GET, "x", None, &[])
            .await
            .unwrap_err();

        assert!(matches!(err, OpcError::Transport(ref msg) if msg.contains("refused")));
        assert_eq!(err.status_code(), None);
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_request_shape() {
        let backend = Arc::new(ScriptedBackend::new().respond(201, "{}"));
        let transport = transport(backend.clone(), 1);

        transport
            .execute(
                Method::POST,
                "/us-east/vlbrs",
                Some(&json!({"name": "lb1"})),
                &[("Accept", "application/vnd.example+json")],
            )
            .await
            .unwrap();

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        let sent = &requests[0];
        assert_eq!(sent.method, Method::POST);
        assert_eq!(sent.url, "https://api.example.com/us-east/vlbrs");
        assert_eq!(sent.header("Content-Type"), Some(JSON_MEDIA_TYPE));
        assert_eq!(sent.header("Accept"), Some("application/vnd.example+json"));
        assert!(sent.header("Authorization").unwrap().starts_with("Basic "));
        assert_eq!(sent.body.as_deref(), Some(br#"{"name":"lb1"}"#.as_slice()));
    }

    #[test]
    fn test_url_for_passes_absolute_urls_through() {
        let backend = Arc::new(ScriptedBackend::new());
        let transport = transport(backend, 1);
        assert_eq!(
            transport.url_for("https://other.example.com/job/1"),
            "https://other.example.com/job/1"
        );
        assert_eq!(transport.url_for("a/b"), "https://api.example.com/a/b");
    }

    #[test]
    fn test_request_debug_redacts_authorization() {
        let mut request = HttpRequest::new(Method::GET, "https://api.example.com");
        request.set_header("Authorization", "Basic c2VjcmV0");
        let rendered = format!("{:?}", request);
        assert!(!rendered.contains("c2VjcmV0"));
        assert!(rendered.contains("<redacted>"));
    }
}
