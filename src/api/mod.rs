//! HTTP access to the ETF backend

pub mod client;
pub mod error;
pub mod etf;
pub mod interceptor;

pub use client::{ApiClient, ApiClientBuilder, ApiResponse};
pub use error::ApiError;
pub use etf::{EtfApi, EtfPage};
pub use interceptor::{ErrorInterceptor, ErrorSink, RecordingErrorSink, TracingErrorSink};
