//! Response interceptor that reports structured API errors without altering them

use super::error::ApiError;
use crate::core::envelope::ErrorInfo;
use reqwest::StatusCode;
use std::sync::{Arc, Mutex};
use tracing::error;

/// Destination for API error reports.
pub trait ErrorSink: Send + Sync {
    fn api_error(&self, status: Option<StatusCode>, error: &ErrorInfo);
}

/// Writes API errors to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn api_error(&self, status: Option<StatusCode>, error: &ErrorInfo) {
        error!(
            status = ?status.map(|s| s.as_u16()),
            "[API Error] {}: {}",
            error.code,
            error.message
        );
    }
}

/// Keeps reported errors in memory, formatted the same way the log line is.
#[derive(Debug, Default)]
pub struct RecordingErrorSink {
    entries: Mutex<Vec<String>>,
}

impl RecordingErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl ErrorSink for RecordingErrorSink {
    fn api_error(&self, _status: Option<StatusCode>, error: &ErrorInfo) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(format!("[API Error] {}: {}", error.code, error.message));
        }
    }
}

/// Observes request results on their way back to the caller. Failures that
/// carry an [`ErrorInfo`] are reported to the sink once; every result is
/// returned untouched.
#[derive(Clone)]
pub struct ErrorInterceptor {
    sink: Arc<dyn ErrorSink>,
}

impl ErrorInterceptor {
    pub fn new(sink: Arc<dyn ErrorSink>) -> Self {
        Self { sink }
    }

    pub fn intercept<T>(&self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if let Err(err) = &result {
            if let Some(info) = err.error_info() {
                self.sink.api_error(err.status(), info);
            }
        }
        result
    }
}

impl Default for ErrorInterceptor {
    fn default() -> Self {
        Self::new(Arc::new(TracingErrorSink))
    }
}

impl std::fmt::Debug for ErrorInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorInterceptor").finish_non_exhaustive()
    }
}
