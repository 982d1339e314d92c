use thiserror::Error;

/// Errors returned by the Webex client library
#[derive(Error, Debug)]
pub enum WebexError {
    /// No usable access or refresh token
    #[error("Not authorized. Run 'webex-cli auth login' first.")]
    NotAuthorized,

    /// The authorization step (launcher or code exchange) did not produce a token
    #[error("Authorization failed: {0}")]
    Authorization(String),

    /// The REST API answered with a non-success status
    #[error("Failed to {operation}: {status} - {body}")]
    Api {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid Webex id: {0}")]
    InvalidId(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl WebexError {
    /// HTTP status of an API error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            WebexError::Api { status, .. } => Some(*status),
            WebexError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, WebexError>;
