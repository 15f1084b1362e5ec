use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// HTTP request envelope used by fetcher transport calls.
///
/// Exchange symbol endpoints are read-only, so only GET is modeled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub timeout_ms: u64,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
            timeout_ms: 10_000,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// HTTP response envelope returned by a fetcher transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level HTTP error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    message: String,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

/// Fetcher transport contract.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;
}

/// Deterministic in-memory transport for offline tests.
#[derive(Debug, Clone)]
pub struct CannedHttpClient {
    outcome: Result<HttpResponse, HttpError>,
}

impl CannedHttpClient {
    /// Responds to every request with a 200 and the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            outcome: Ok(HttpResponse {
                status: 200,
                body: body.into(),
            }),
        }
    }

    /// Responds to every request with the given status and body.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            outcome: Ok(HttpResponse {
                status,
                body: body.into(),
            }),
        }
    }

    /// Fails every request at the transport level.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(HttpError::new(message)),
        }
    }
}

impl HttpClient for CannedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let _ = request;
        let outcome = self.outcome.clone();
        Box::pin(async move { outcome })
    }
}

/// Production transport backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Arc::new(
                reqwest::Client::builder()
                    .user_agent("symreg/0.1.0")
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new()),
            ),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let mut builder = self
                .client
                .get(&request.url)
                .timeout(std::time::Duration::from_millis(request.timeout_ms));

            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    HttpError::new(format!("request timeout: {e}"))
                } else if e.is_connect() {
                    HttpError::new(format!("connection failed: {e}"))
                } else {
                    HttpError::new(format!("request failed: {e}"))
                }
            })?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| HttpError::new(format!("failed to read response body: {e}")))?;

            Ok(HttpResponse { status, body })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn canned_client_returns_configured_body() {
        let client = CannedHttpClient::ok("{\"symbols\":[]}");
        let response = client
            .execute(HttpRequest::get("https://example.test/info"))
            .await
            .expect("canned success");

        assert!(response.is_success());
        assert_eq!(response.body, "{\"symbols\":[]}");
    }

    #[tokio::test]
    async fn canned_client_can_fail_at_transport_level() {
        let client = CannedHttpClient::failing("connection refused");
        let err = client
            .execute(HttpRequest::get("https://example.test/info"))
            .await
            .expect_err("canned failure");

        assert_eq!(err.message(), "connection refused");
    }

    #[test]
    fn header_names_are_normalized_to_lowercase() {
        let request = HttpRequest::get("https://example.test").with_header("X-Token", "abc");
        assert_eq!(request.headers.get("x-token").map(String::as_str), Some("abc"));
    }
}
