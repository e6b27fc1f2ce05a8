//! Typed ETF endpoints on top of [`ApiClient`]

use super::client::{ApiClient, ApiResponse};
use super::error::ApiError;
use crate::core::envelope::PaginationMeta;
use crate::core::types::{
    EtfDetail, EtfHolding, EtfListQuery, EtfSummary, HealthStatus, PriceHistoryPoint, PricePeriod,
};
use async_trait::async_trait;
use std::collections::HashSet;
use tracing::{debug, instrument};

/// One page of an ETF listing.
#[derive(Debug, Clone, PartialEq)]
pub struct EtfPage {
    pub items: Vec<EtfSummary>,
    pub meta: Option<PaginationMeta>,
}

#[async_trait]
pub trait EtfApi: Send + Sync {
    async fn list_etfs(&self, query: &EtfListQuery) -> Result<EtfPage, ApiError>;
    async fn get_etf(&self, code: &str) -> Result<EtfDetail, ApiError>;
    async fn get_prices(
        &self,
        code: &str,
        period: PricePeriod,
    ) -> Result<Vec<PriceHistoryPoint>, ApiError>;
    async fn get_holdings(&self, code: &str) -> Result<Vec<EtfHolding>, ApiError>;
    async fn health(&self) -> Result<HealthStatus, ApiError>;
}

/// ETF codes end up in URL paths, so only plain alphanumerics are accepted.
fn check_code(code: &str) -> Result<&str, ApiError> {
    let code = code.trim();
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ApiError::InvalidQuery(format!("invalid ETF code: {code:?}")));
    }
    Ok(code)
}

/// Every listed ETF needs a non-empty code, unique within the page.
fn check_listing(items: &[EtfSummary]) -> Result<(), ApiError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if item.code.trim().is_empty() {
            return Err(ApiError::Contract(format!(
                "ETF {:?} has an empty code",
                item.name
            )));
        }
        if !seen.insert(item.code.as_str()) {
            return Err(ApiError::Contract(format!(
                "ETF code {} appears more than once",
                item.code
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl EtfApi for ApiClient {
    #[instrument(name = "ListEtfs", skip(self))]
    async fn list_etfs(&self, query: &EtfListQuery) -> Result<EtfPage, ApiError> {
        query
            .validate()
            .map_err(|e| ApiError::InvalidQuery(e.to_string()))?;

        let ApiResponse { data, meta } = self
            .get::<Vec<EtfSummary>>("/api/etfs", &query.to_pairs())
            .await?;
        check_listing(&data)?;
        debug!(count = data.len(), "Fetched ETF listing");

        Ok(EtfPage { items: data, meta })
    }

    #[instrument(name = "GetEtf", skip(self))]
    async fn get_etf(&self, code: &str) -> Result<EtfDetail, ApiError> {
        let code = check_code(code)?;
        let response: ApiResponse<EtfDetail> =
            self.get(&format!("/api/etfs/{code}"), &[]).await?;
        Ok(response.data)
    }

    #[instrument(name = "GetPrices", skip(self))]
    async fn get_prices(
        &self,
        code: &str,
        period: PricePeriod,
    ) -> Result<Vec<PriceHistoryPoint>, ApiError> {
        let code = check_code(code)?;
        let response: ApiResponse<Vec<PriceHistoryPoint>> = self
            .get(
                &format!("/api/etfs/{code}/prices"),
                &[("period", period.to_string())],
            )
            .await?;
        Ok(response.data)
    }

    #[instrument(name = "GetHoldings", skip(self))]
    async fn get_holdings(&self, code: &str) -> Result<Vec<EtfHolding>, ApiError> {
        let code = check_code(code)?;
        let response: ApiResponse<Vec<EtfHolding>> = self
            .get(&format!("/api/etfs/{code}/holdings"), &[])
            .await?;
        Ok(response.data)
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        let response: ApiResponse<HealthStatus> = self.get("/health", &[]).await?;
        Ok(response.data)
    }
}
