use std::backtrace::Backtrace;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not authenticated - run `auth` with a fresh authorization code")]
    NotAuthenticated,

    #[error("HTTP {status}: {body}")]
    Http {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Transport failure, with the stack trace captured where it was raised
    #[error("Network error")]
    NetworkError {
        #[source]
        source: reqwest::Error,
        trace: String,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for response bodies in log lines
const MAX_LOG_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_LOG_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_LOG_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Non-success status; the body is kept whole for display
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        ApiError::Http {
            status,
            body: body.to_string(),
        }
    }

    /// A 200 whose body lacked what the call needed; pretty-printed for display
    pub fn rejected(body: &serde_json::Value) -> Self {
        let diagnostic = serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string());
        ApiError::Rejected(diagnostic)
    }

    /// Wrap a transport error. The trace is always captured, regardless of
    /// `RUST_BACKTRACE`.
    pub fn network(source: reqwest::Error) -> Self {
        ApiError::NetworkError {
            source,
            trace: Backtrace::force_capture().to_string(),
        }
    }
}
