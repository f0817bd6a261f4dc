//! Content store errors

use thiserror::Error;

/// Anything that can go wrong between a query and a decoded record
#[derive(Debug, Error)]
pub enum CmsError {
    #[error("content store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("content store returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected content shape: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid content store url: {0}")]
    Url(String),
}

impl CmsError {
    /// Build a status error from a non-2xx response body.
    ///
    /// The store reports failures as `{"error": {"description": ..}}`, older
    /// API versions as `{"message": ..}`. Anything else falls back to the raw
    /// body, then to the status alone.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .pointer("/error/description")
                    .or_else(|| value.get("message"))
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string())
            })
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    format!("HTTP {}", status)
                } else {
                    trimmed.chars().take(200).collect()
                }
            });

        CmsError::Status { status, message }
    }
}
