//! HTTP transport for Prism REST API calls

use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let total = body.len();
    let truncated: String = body.chars().take(MAX_LOG_BODY_LENGTH).collect();
    let truncated = if truncated.len() < total {
        format!("{}... [truncated, {} bytes total]", truncated, total)
    } else {
        truncated
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Errors raised by the transport, kept apart from parse errors so callers
/// can tell bad credentials from a changed schema
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("authentication rejected by {url} (HTTP 401)")]
    Unauthorized { url: String },

    #[error("request to {url} failed with HTTP {status}")]
    Status { status: u16, url: String },

    #[error("failed to reach {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to create HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

/// Connection settings for the transport
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Skip TLS certificate validation (Prism ships self-signed certificates)
    pub accept_invalid_certs: bool,
    pub timeout: Duration,
    /// Keep server-issued session cookies and replay them
    pub cookie_store: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            accept_invalid_certs: false,
            timeout: DEFAULT_TIMEOUT,
            cookie_store: false,
        }
    }
}

/// A fully buffered response
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// HTTP client wrapper for Prism API calls
#[derive(Clone)]
pub struct PrismHttpClient {
    client: Client,
}

impl PrismHttpClient {
    /// Create a new HTTP client
    pub fn new(options: &TransportOptions) -> Result<Self, TransportError> {
        if options.accept_invalid_certs {
            tracing::warn!("TLS certificate validation is disabled");
        }

        let client = Client::builder()
            .user_agent(concat!("prismctl/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .cookie_store(options.cookie_store)
            .timeout(options.timeout)
            .build()
            .map_err(TransportError::Build)?;

        Ok(Self { client })
    }

    /// Perform one request and buffer the whole body.
    ///
    /// 401 and other non-success statuses are returned as distinct errors.
    pub async fn fetch(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
    ) -> Result<FetchResponse, TransportError> {
        tracing::debug!("{} {}", method, url);

        let response = self
            .client
            .request(method, url)
            .headers(headers)
            .send()
            .await
            .map_err(|source| TransportError::Connect {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| TransportError::Body {
                url: url.to_string(),
                source,
            })?;

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("Credentials rejected by {}", url);
            return Err(TransportError::Unauthorized {
                url: url.to_string(),
            });
        }

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!(
                "API error: {} - {}",
                status,
                sanitize_for_log(&String::from_utf8_lossy(&body))
            );
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        tracing::trace!("{} bytes from {}", body.len(), url);

        Ok(FetchResponse {
            status,
            body: body.to_vec(),
        })
    }
}
