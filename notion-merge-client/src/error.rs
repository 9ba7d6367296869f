/// Errors returned by calls to the Notion API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Notion rejected the token: {0}")]
    Unauthorized(String),

    #[error("Not found or not shared with the integration: {0}")]
    NotFound(String),

    #[error("Rate limited by the Notion API")]
    RateLimited,

    #[error("Notion API error (HTTP {status}, {code}): {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
