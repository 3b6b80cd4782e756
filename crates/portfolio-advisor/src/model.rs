//! Domain Models
//!
//! Catalog reference types shared by the quote generator, the recommendation
//! engine and the allocation calculator.
//! Uses `rust_decimal` for all monetary values - never use f64 for money!

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// Sector risk label, ordered from least to most risky
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "Bajo")]
    Low,
    #[serde(rename = "Medio-Bajo")]
    MediumLow,
    #[serde(rename = "Medio")]
    Medium,
    #[serde(rename = "Medio-Alto")]
    MediumHigh,
    #[serde(rename = "Alto")]
    High,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Bajo",
            Self::MediumLow => "Medio-Bajo",
            Self::Medium => "Medio",
            Self::MediumHigh => "Medio-Alto",
            Self::High => "Alto",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Expected price volatility of a sector
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Volatility {
    #[serde(rename = "Baja")]
    Low,
    #[serde(rename = "Media")]
    Medium,
    #[serde(rename = "Media-Alta")]
    MediumHigh,
    #[serde(rename = "Alta")]
    High,
    #[serde(rename = "Muy Alta")]
    VeryHigh,
}

impl Volatility {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Baja",
            Self::Medium => "Media",
            Self::MediumHigh => "Media-Alta",
            Self::High => "Alta",
            Self::VeryHigh => "Muy Alta",
        }
    }
}

impl fmt::Display for Volatility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Typical dividend yield range of a sector, e.g. `3.5-5.0%`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DividendRange {
    pub low: Decimal,
    pub high: Decimal,
}

impl DividendRange {
    pub const fn new(low: Decimal, high: Decimal) -> Self {
        Self { low, high }
    }
}

impl fmt::Display for DividendRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}%", self.low, self.high)
    }
}

impl FromStr for DividendRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('%');
        let (low, high) = trimmed
            .split_once('-')
            .ok_or_else(|| format!("expected LOW-HIGH%, got '{s}'"))?;
        let low = Decimal::from_str(low.trim()).map_err(|e| e.to_string())?;
        let high = Decimal::from_str(high.trim()).map_err(|e| e.to_string())?;
        Ok(Self { low, high })
    }
}

impl Serialize for DividendRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DividendRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Fund manager behind a ticker
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Issuer {
    IShares,
    Vanguard,
    Spdr,
    Schwab,
    Invesco,
    Ark,
}

impl Issuer {
    /// Managers known for rock-bottom fees
    pub const fn is_low_cost(self) -> bool {
        matches!(self, Self::Vanguard)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetType {
    #[serde(rename = "ETF")]
    Etf,
    #[serde(rename = "Stock")]
    Stock,
}

/// An investable instrument listed in the catalog
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker {
    pub symbol: String,

    pub name: String,

    /// Annual expense ratio in percent, `0.03` means 0.03%
    pub expense_ratio: Decimal,

    pub asset_type: AssetType,

    pub issuer: Issuer,

    /// Tracks a whole market or aggregate index rather than a slice of it
    pub broad_market: bool,
}

impl Ticker {
    pub fn etf(symbol: &str, name: &str, expense_ratio: Decimal, issuer: Issuer) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            expense_ratio,
            asset_type: AssetType::Etf,
            issuer,
            broad_market: false,
        }
    }

    #[must_use]
    pub fn broad(mut self) -> Self {
        self.broad_market = true;
        self
    }
}

/// A group of tickers sharing risk, volatility and dividend traits
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sector {
    pub id: String,
    pub name: String,
    pub code: String,
    pub tickers: Vec<Ticker>,
    pub description: String,
    pub risk_level: RiskLevel,
    pub volatility: Volatility,
    pub dividend_yield: DividendRange,
}

impl Sector {
    /// Lowest expense ratio in the sector; the first one wins ties
    pub fn cheapest_ticker(&self) -> Option<&Ticker> {
        self.tickers.iter().reduce(|best, current| {
            if current.expense_ratio < best.expense_ratio {
                current
            } else {
                best
            }
        })
    }
}

/// One sector weight inside an allocation template
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorWeight {
    pub sector_id: String,
    pub percentage: Decimal,
}

/// Named allocation template mapping sectors to target weights
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub description: String,
    pub risk_tolerance: RiskLevel,
    pub time_horizon: String,
    /// Sector weights in template order
    pub allocation: Vec<SectorWeight>,
    pub characteristics: Vec<String>,
}

impl Profile {
    pub fn weight_for(&self, sector_id: &str) -> Option<Decimal> {
        self.allocation
            .iter()
            .find(|w| w.sector_id == sector_id)
            .map(|w| w.percentage)
    }

    /// Sum of all sector weights; templates are not normalized
    pub fn total_weight(&self) -> Decimal {
        self.allocation.iter().map(|w| w.percentage).sum()
    }
}

static SYMBOL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{1,5}(\.[A-Z]{1,2})?$").ok());

/// Trim and uppercase a user-entered symbol, rejecting malformed input
pub fn normalize_symbol(raw: &str) -> Result<String, ValidationError> {
    let symbol = raw.trim().to_uppercase();
    let valid = SYMBOL_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(&symbol));

    if valid {
        Ok(symbol)
    } else {
        Err(ValidationError::InvalidTicker(raw.trim().to_string()))
    }
}
