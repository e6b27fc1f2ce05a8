//! ETF data shapes exchanged with the backend

use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Holdings totals up to this much above 100% are treated as rounding noise.
const WEIGHT_TOLERANCE: f64 = 0.01;

/// One row of an ETF listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtfSummary {
    pub code: String,
    pub name: String,
    pub category: String,
    pub manager: String,
    #[serde(alias = "listed_at")]
    pub listed_at: NaiveDate,
    pub fee: f64,
    pub nav: f64,
    pub price: f64,
    #[serde(alias = "return_1m")]
    pub return_1m: f64,
    #[serde(alias = "return_3m")]
    pub return_3m: f64,
    #[serde(alias = "return_6m")]
    pub return_6m: f64,
    #[serde(alias = "return_1y")]
    pub return_1y: f64,
    pub volume: u64,
    #[serde(alias = "updated_at")]
    pub updated_at: DateTime<Utc>,
}

/// An ETF with its constituents, in the order the backend reports them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtfDetail {
    #[serde(flatten)]
    pub summary: EtfSummary,
    #[serde(default)]
    pub holdings: Vec<EtfHolding>,
}

impl EtfDetail {
    pub fn holdings_weight_total(&self) -> f64 {
        self.holdings.iter().map(|h| h.weight).sum()
    }

    /// Whether holdings weights add up to at most 100%. Producers are expected
    /// to keep this true; nothing here enforces it.
    pub fn holdings_within_bounds(&self) -> bool {
        self.holdings_weight_total() <= 100.0 + WEIGHT_TOLERANCE
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtfHolding {
    pub name: String,
    /// Percentage of the fund, 0-100.
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryPoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// A position the user holds in an ETF. `etf_name` is denormalized for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    pub id: String,
    #[serde(alias = "etf_code")]
    pub etf_code: String,
    #[serde(alias = "etf_name")]
    pub etf_name: String,
    pub quantity: f64,
    #[serde(alias = "avg_price")]
    pub avg_price: f64,
    #[serde(default, alias = "current_price", skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
}

impl PortfolioItem {
    pub fn cost_basis(&self) -> f64 {
        self.quantity * self.avg_price
    }

    pub fn market_value(&self) -> Option<f64> {
        self.current_price.map(|p| p * self.quantity)
    }

    pub fn profit_loss(&self) -> Option<f64> {
        self.market_value().map(|v| v - self.cost_basis())
    }

    /// Return on cost in percent. `None` without a current price or a cost.
    pub fn return_pct(&self) -> Option<f64> {
        let cost = self.cost_basis();
        if cost == 0.0 {
            return None;
        }
        self.profit_loss().map(|pl| pl / cost * 100.0)
    }
}

/// Filters, sorting and paging for `GET /api/etfs`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EtfListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Field name, `-` prefixed for descending, e.g. `-return_1y`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl EtfListQuery {
    pub const MAX_LIMIT: u32 = 100;

    /// Checks the bounds the backend accepts: `page >= 1`, `1 <= limit <= 100`.
    pub fn validate(&self) -> Result<()> {
        if self.page == Some(0) {
            return Err(anyhow!("page must be at least 1"));
        }
        match self.limit {
            Some(limit) if limit == 0 || limit > Self::MAX_LIMIT => Err(anyhow!(
                "limit must be between 1 and {}, got {}",
                Self::MAX_LIMIT,
                limit
            )),
            _ => Ok(()),
        }
    }

    /// Query string pairs for the parameters that are set.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let text = [
            ("category", &self.category),
            ("manager", &self.manager),
            ("search", &self.search),
            ("sort", &self.sort),
        ];
        for (key, value) in text {
            if let Some(v) = value {
                pairs.push((key, v.clone()));
            }
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

/// Window for `GET /api/etfs/{code}/prices`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PricePeriod {
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "6m")]
    SixMonths,
    #[default]
    #[serde(rename = "1y")]
    OneYear,
}

impl Display for PricePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                PricePeriod::OneMonth => "1m",
                PricePeriod::ThreeMonths => "3m",
                PricePeriod::SixMonths => "6m",
                PricePeriod::OneYear => "1y",
            }
        )
    }
}

impl FromStr for PricePeriod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1m" => Ok(PricePeriod::OneMonth),
            "3m" => Ok(PricePeriod::ThreeMonths),
            "6m" => Ok(PricePeriod::SixMonths),
            "1y" => Ok(PricePeriod::OneYear),
            _ => Err(anyhow!("Invalid price period: {}", s)),
        }
    }
}

/// Payload of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub version: String,
}
