//! The `{success, data, error, meta}` envelope every API response is wrapped in

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes the backend is known to emit.
pub mod codes {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
}

/// Structured error carried by a failed response.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn is_not_found(&self) -> bool {
        self.code == codes::NOT_FOUND
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    #[serde(alias = "total_pages")]
    pub total_pages: u64,
}

impl PaginationMeta {
    /// Builds paging metadata the way the backend does, rounding the page count up.
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total.div_ceil(u64::from(limit))
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages
    }
}

/// A decoded response: either a payload or an error, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiEnvelope<T> {
    Success {
        data: T,
        meta: Option<PaginationMeta>,
    },
    Failure {
        error: ErrorInfo,
    },
}

impl<T> ApiEnvelope<T> {
    pub fn success(data: T) -> Self {
        ApiEnvelope::Success { data, meta: None }
    }

    pub fn paginated(data: T, page: u32, limit: u32, total: u64) -> Self {
        ApiEnvelope::Success {
            data,
            meta: Some(PaginationMeta::new(page, limit, total)),
        }
    }

    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        ApiEnvelope::Failure {
            error: ErrorInfo::new(code, message),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiEnvelope::Success { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ApiEnvelope::Success { data, .. } => Some(data),
            ApiEnvelope::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            ApiEnvelope::Success { .. } => None,
            ApiEnvelope::Failure { error } => Some(error),
        }
    }

    pub fn into_result(self) -> Result<(T, Option<PaginationMeta>), ErrorInfo> {
        match self {
            ApiEnvelope::Success { data, meta } => Ok((data, meta)),
            ApiEnvelope::Failure { error } => Err(error),
        }
    }
}

// Wire shape. Every field is optional here so that malformed combinations
// can be reported with a useful message rather than a generic serde error.
#[derive(Deserialize)]
struct RawEnvelope<T> {
    #[serde(default)]
    success: Option<bool>,
    data: Option<T>,
    #[serde(default)]
    error: Option<ErrorInfo>,
    #[serde(default)]
    meta: Option<PaginationMeta>,
}

#[derive(Serialize)]
struct RawEnvelopeRef<'a, T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a ErrorInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<&'a PaginationMeta>,
}

impl<'de, T> Deserialize<'de> for ApiEnvelope<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawEnvelope::<T>::deserialize(deserializer)?;
        let success = raw
            .success
            .ok_or_else(|| <D::Error as de::Error>::missing_field("success"))?;

        // An error object wins over everything else in the envelope.
        if let Some(error) = raw.error {
            return Ok(ApiEnvelope::Failure { error });
        }
        if !success {
            return Err(de::Error::custom(
                "failure envelope without an error object",
            ));
        }
        match raw.data {
            Some(data) => Ok(ApiEnvelope::Success {
                data,
                meta: raw.meta,
            }),
            None => Err(de::Error::missing_field("data")),
        }
    }
}

impl<T> Serialize for ApiEnvelope<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let raw = match self {
            ApiEnvelope::Success { data, meta } => RawEnvelopeRef {
                success: true,
                data: Some(data),
                error: None,
                meta: meta.as_ref(),
            },
            ApiEnvelope::Failure { error } => RawEnvelopeRef {
                success: false,
                data: None,
                error: Some(error),
                meta: None,
            },
        };
        raw.serialize(serializer)
    }
}

/// Loose view of a failed response body. Only the `error` object matters;
/// anything else in the body is ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<ErrorInfo>,
}

impl ErrorBody {
    pub(crate) fn extract(body: &str) -> Option<ErrorInfo> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
    }
}
