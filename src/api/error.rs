use crate::core::envelope::ErrorInfo;
use reqwest::StatusCode;
use thiserror::Error;

fn error_suffix(error: &Option<ErrorInfo>) -> String {
    error
        .as_ref()
        .map(|e| format!(" ({e})"))
        .unwrap_or_default()
}

/// Everything that can go wrong talking to the ETF API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response: connection refused, timeout, ...
    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// Non-2xx status. `error` holds the structured error if the body had one.
    #[error("Server responded with {status}{}", error_suffix(.error))]
    Status {
        status: StatusCode,
        error: Option<ErrorInfo>,
        body: String,
    },

    /// 2xx status but the envelope reports a failure.
    #[error("{0}")]
    Application(ErrorInfo),

    #[error("Invalid response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The response decoded but breaks a guarantee of the contract.
    #[error("Contract violation: {0}")]
    Contract(String),

    /// Rejected locally; no request was sent.
    #[error("Invalid request: {0}")]
    InvalidQuery(String),

    #[error("Invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl ApiError {
    /// The structured error reported by the server, if any.
    pub fn error_info(&self) -> Option<&ErrorInfo> {
        match self {
            ApiError::Status { error, .. } => error.as_ref(),
            ApiError::Application(error) => Some(error),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.error_info().is_some_and(ErrorInfo::is_not_found)
            || self.status() == Some(StatusCode::NOT_FOUND)
    }
}
