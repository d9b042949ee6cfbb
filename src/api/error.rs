use thiserror::Error;

/// Fallback shown when an error carries no usable message at all.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Failed to fetch news. Make sure the backend server is running.";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection refused, DNS failure, or any other failure to reach the host.
    #[error("Cannot connect to backend server at {base_url}. Make sure the backend is running.")]
    Unreachable { base_url: String },

    /// Transport-level timeout (reqwest client timeout), distinct from the UI bound.
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// Non-2xx reply. `detail` is the backend's structured error message, if any.
    #[error("Request failed with status code {status}")]
    Server { status: u16, detail: Option<String> },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response from backend: {0}")]
    Decode(String),

    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),

    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// Human-readable message for display in an error banner.
    ///
    /// Prefers the server-supplied detail, then the error's own message, then
    /// a generic fallback.
    pub fn user_message(&self) -> String {
        let message = match self {
            ApiError::Server {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => detail.clone(),
            other => other.to_string(),
        };
        if message.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            message
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Server { status: 404, .. })
    }
}

/// Extract a FastAPI-style `detail` from an error body.
///
/// `detail` is either a string or, for validation errors, a list of objects
/// carrying `msg` fields.
pub(crate) fn extract_detail(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        }
        _ => None,
    }
}
