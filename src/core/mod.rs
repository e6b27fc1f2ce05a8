//! Data contract, formatting and application plumbing

pub mod config;
pub mod envelope;
pub mod format;
pub mod log;
pub mod types;

// Re-export main types for cleaner imports
pub use envelope::{ApiEnvelope, ErrorInfo, PaginationMeta};
pub use types::{
    EtfDetail, EtfHolding, EtfListQuery, EtfSummary, HealthStatus, PortfolioItem,
    PriceHistoryPoint, PricePeriod,
};
