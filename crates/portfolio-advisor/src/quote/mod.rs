//! Market Quotes
//!
//! Quote records, the provider strategy trait, and the providers behind it:
//! a deterministic synthetic generator and a rate-limited Alpha Vantage client,
//! fronted by a caching service that falls back to the generator on failure.

pub mod alphavantage;
pub mod cache;
pub mod price_table;
pub mod service;
pub mod synthetic;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::RiskLevel;

pub use alphavantage::{AlphaVantageConfig, AlphaVantageProvider};
pub use cache::TtlCache;
pub use service::{MarketDataService, Watchlist};
pub use synthetic::{Clock, FixedClock, QuoteGenerator, SyntheticQuoteProvider, SystemClock};

/// Where a quote's numbers came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteSource {
    Synthetic,
    Live,
}

/// Daily market snapshot of one symbol
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    /// Sector display name, or `Equity` outside the catalog
    pub category: String,
    pub price: Decimal,
    pub change_percent: Decimal,
    pub market_cap: String,
    pub volume: String,
    pub pe_ratio: Decimal,
    pub dividend_yield: Decimal,
    pub fifty_two_week_high: Decimal,
    pub fifty_two_week_low: Decimal,
    /// Absent for symbols outside the catalog
    pub expense_ratio: Option<Decimal>,
    pub risk_level: RiskLevel,
    pub source: QuoteSource,
    pub as_of: NaiveDate,
}

/// One close in a historical series
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: Decimal,
    pub volume: u64,
}

/// Lookback window for historical series
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryPeriod {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[default]
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "1Y")]
    OneYear,
}

impl HistoryPeriod {
    pub const fn days(self) -> u32 {
        match self {
            Self::OneDay => 1,
            Self::OneWeek => 7,
            Self::OneMonth => 30,
            Self::ThreeMonths => 90,
            Self::SixMonths => 180,
            Self::OneYear => 365,
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::OneDay => "1D",
            Self::OneWeek => "1W",
            Self::OneMonth => "1M",
            Self::ThreeMonths => "3M",
            Self::SixMonths => "6M",
            Self::OneYear => "1Y",
        }
    }

    /// Parse a period code, treating anything unrecognized as one month
    pub fn parse_or_default(code: &str) -> Self {
        code.parse().unwrap_or_default()
    }
}

impl FromStr for HistoryPeriod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "1D" => Ok(Self::OneDay),
            "1W" => Ok(Self::OneWeek),
            "1M" => Ok(Self::OneMonth),
            "3M" => Ok(Self::ThreeMonths),
            "6M" => Ok(Self::SixMonths),
            "1Y" => Ok(Self::OneYear),
            other => Err(format!("unknown history period '{other}'")),
        }
    }
}

impl fmt::Display for HistoryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Strategy trait for market data sources
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Provider name, also used to partition the cache
    fn name(&self) -> &str;

    /// Current quote for a symbol
    async fn quote(&self, symbol: &str) -> Result<Quote>;

    /// Daily closes covering `period`, oldest first
    async fn history(&self, symbol: &str, period: HistoryPeriod) -> Result<Vec<PricePoint>>;
}

/// Aggregates shown above the watch list
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistStats {
    pub count: usize,
    pub total_price: Decimal,
    pub avg_change_percent: Decimal,
    pub avg_dividend_yield: Decimal,
}

impl WatchlistStats {
    /// Summarize over quotes with a positive price
    pub fn from_quotes(quotes: &[Quote]) -> Self {
        let priced: Vec<&Quote> = quotes.iter().filter(|q| q.price > Decimal::ZERO).collect();
        if priced.is_empty() {
            return Self::default();
        }

        let count = Decimal::from(priced.len());
        let total_price: Decimal = priced.iter().map(|q| q.price).sum();
        let total_change: Decimal = priced.iter().map(|q| q.change_percent).sum();
        let total_yield: Decimal = priced.iter().map(|q| q.dividend_yield).sum();

        Self {
            count: priced.len(),
            total_price: total_price.round_dp(2),
            avg_change_percent: (total_change / count).round_dp(2),
            avg_dividend_yield: (total_yield / count).round_dp(2),
        }
    }
}
