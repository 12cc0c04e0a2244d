//! Crate-level errors and user-facing messages

use crate::normalize::NormalizeError;
use crate::prism::http::TransportError;
use thiserror::Error;

/// Anything a [`crate::prism::client::PrismClient`] call can fail with
#[derive(Debug, Error)]
pub enum PrismError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, PrismError>;

impl PrismError {
    /// The server rejected the credentials
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, PrismError::Transport(TransportError::Unauthorized { .. }))
    }

    /// The server answered with a document outside the expected contract
    pub fn is_schema_change(&self) -> bool {
        matches!(
            self,
            PrismError::Normalize(NormalizeError::MalformedEnvelope(_))
        )
    }
}

/// Format an error for display
/// Security: Maps errors to generic messages instead of echoing server responses
pub fn format_prism_error(error: &anyhow::Error) -> String {
    let transport = error
        .downcast_ref::<TransportError>()
        .or_else(|| match error.downcast_ref::<PrismError>() {
            Some(PrismError::Transport(t)) => Some(t),
            _ => None,
        });

    if let Some(transport) = transport {
        return match transport {
            TransportError::Unauthorized { .. } => {
                "Authentication failed. Check the Prism username and password.".to_string()
            }
            TransportError::Status { status: 403, .. } => {
                "Permission denied. The Prism user lacks the required role.".to_string()
            }
            TransportError::Status { status: 404, .. } => {
                "Endpoint not found. The API generation may not be served by this host."
                    .to_string()
            }
            TransportError::Status { status, .. } if *status >= 500 => {
                "Prism service temporarily unavailable. Please try again.".to_string()
            }
            TransportError::Status { status, .. } => format!("Request failed with HTTP {}.", status),
            TransportError::Connect { source, .. } if source.is_timeout() => {
                "Request timed out. Check the host and your network connection.".to_string()
            }
            TransportError::Connect { .. } => {
                "Connection failed. Check the host, port 9440 and TLS settings (--insecure)."
                    .to_string()
            }
            TransportError::Body { .. } => "Connection dropped while reading the response.".to_string(),
            TransportError::Build(_) | TransportError::InvalidHeader(_) => {
                "Failed to initialize the HTTP client.".to_string()
            }
        };
    }

    let normalize = error
        .downcast_ref::<NormalizeError>()
        .or_else(|| match error.downcast_ref::<PrismError>() {
            Some(PrismError::Normalize(n)) => Some(n),
            _ => None,
        });

    if let Some(normalize) = normalize {
        return match normalize {
            NormalizeError::UnsupportedGeneration { .. } => normalize.to_string(),
            NormalizeError::MalformedEnvelope(_) => {
                "Unexpected response format. The server may have changed its schema.".to_string()
            }
        };
    }

    // Truncate long error messages and remove potential sensitive data
    let error_str = error.to_string();
    let sanitized = error_str
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .take(80)
        .collect::<String>();

    if sanitized.len() < error_str.len() {
        format!("{}...", sanitized)
    } else {
        sanitized
    }
}
