//! Error types for genesis-api

use thiserror::Error;

/// Result type alias using genesis-api Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the backend
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed before a response arrived
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend answered with a non-success status
    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Classified failure of a chat or health call, as shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatErrorKind {
    /// Nothing is listening at the backend address
    ConnectionRefused,
    /// HTTP 500, with the backend's `detail` when it sent one
    ServerError(Option<String>),
    /// HTTP 404, usually a wrong base URL
    NotFound,
    /// Transport failed without a response
    NetworkError,
    /// No response within the request timeout
    Timeout,
    /// Anything else, with the raw message
    Unknown(String),
}

impl Error {
    /// Create a status error
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Classify this error for display
    pub fn kind(&self) -> ChatErrorKind {
        match self {
            Error::Http(e) => {
                if e.is_timeout() {
                    ChatErrorKind::Timeout
                } else if is_connection_refused(e) {
                    ChatErrorKind::ConnectionRefused
                } else if e.is_connect() {
                    ChatErrorKind::NetworkError
                } else {
                    ChatErrorKind::Unknown(e.to_string())
                }
            }
            Error::Json(e) => ChatErrorKind::Unknown(format!("invalid response: {}", e)),
            Error::Status { status: 500, body } => ChatErrorKind::ServerError(server_detail(body)),
            Error::Status { status: 404, .. } => ChatErrorKind::NotFound,
            Error::Status { status, body } => {
                let body = body.trim();
                if body.is_empty() {
                    ChatErrorKind::Unknown(format!("HTTP {}", status))
                } else {
                    ChatErrorKind::Unknown(format!("HTTP {}: {}", status, body))
                }
            }
        }
    }
}

impl ChatErrorKind {
    /// Whether this failure means the backend cannot be reached at all
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            ChatErrorKind::ConnectionRefused | ChatErrorKind::NetworkError
        )
    }

    /// Short, actionable text for a transcript message
    pub fn user_message(&self, base_url: &str) -> String {
        match self {
            ChatErrorKind::ConnectionRefused => format!(
                "Backend unavailable. Check that the server is running at {}.",
                base_url
            ),
            ChatErrorKind::ServerError(detail) => format!(
                "Server error: {}",
                detail.as_deref().unwrap_or("Internal error")
            ),
            ChatErrorKind::NotFound => "Endpoint not found. Check the backend URL.".to_string(),
            ChatErrorKind::NetworkError => "Network error. Check your connection.".to_string(),
            ChatErrorKind::Timeout => {
                "Timeout. The server is taking too long to respond.".to_string()
            }
            ChatErrorKind::Unknown(message) => format!("Error: {}", message),
        }
    }
}

/// Walk the source chain looking for a refused TCP connect.
fn is_connection_refused(error: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(err) = source {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::ConnectionRefused {
                return true;
            }
        }
        source = err.source();
    }
    // Some platforms only surface the OS message
    let msg = format!("{:?}", error).to_lowercase();
    msg.contains("connection refused") || msg.contains("connectionrefused")
}

/// Extract FastAPI-style `{"detail": "..."}` from an error body.
fn server_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}
