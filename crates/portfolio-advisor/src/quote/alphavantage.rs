//! Alpha Vantage Quote Provider
//!
//! Live prices from `GLOBAL_QUOTE` and daily closes from `TIME_SERIES_DAILY`.
//! The free tier allows five calls a minute; a local `governor` limiter
//! rejects calls past that budget before they hit the network. Descriptive
//! fields (name, sector, P/E, yield) come from the synthetic generator since
//! the quote endpoint does not return them.

use std::num::NonZeroU32;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use governor::clock::DefaultClock;
use governor::state::InMemoryState;
use governor::state::direct::NotKeyed;
use governor::{Quota, RateLimiter};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use super::synthetic::{format_volume, round2};
use super::{HistoryPeriod, PricePoint, Quote, QuoteGenerator, QuoteProvider, QuoteSource};
use crate::error::{AdvisorError, Result};

const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

#[derive(Clone, Debug)]
pub struct AlphaVantageConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Calls allowed per `quota_window`
    pub quota_limit: u32,
    pub quota_window: Duration,
    pub timeout_secs: u64,
}

impl Default for AlphaVantageConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.into(),
            quota_limit: 5,
            quota_window: Duration::from_secs(60),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AlphaVantageConfig {
    pub fn from_env() -> Self {
        let api_key = std::env::var("ALPHA_VANTAGE_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        let base_url = std::env::var("ALPHA_VANTAGE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());

        Self {
            api_key,
            base_url,
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

fn quota_from_window(window: Duration, limit: u32) -> Quota {
    let burst = NonZeroU32::new(limit.max(1)).unwrap_or(NonZeroU32::MIN);
    let period = window / burst.get();
    Quota::with_period(period).map_or_else(|| Quota::per_minute(burst), |q| q.allow_burst(burst))
}

/// Fields of a `GLOBAL_QUOTE` payload the dashboard consumes
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiveQuote {
    pub symbol: String,
    pub price: Decimal,
    pub change_percent: Decimal,
    pub volume: u64,
    pub latest_trading_day: NaiveDate,
}

impl LiveQuote {
    /// Overlay live numbers onto a synthetic quote of the same symbol
    pub fn apply(&self, mut quote: Quote) -> Quote {
        quote.price = self.price;
        quote.change_percent = self.change_percent;
        quote.volume = format_volume(self.volume);
        quote.fifty_two_week_high = round2(self.price * dec!(1.25));
        quote.fifty_two_week_low = round2(self.price * dec!(0.75));
        quote.as_of = self.latest_trading_day;
        quote.source = QuoteSource::Live;
        quote
    }
}

/// Reject error and throttling payloads, which arrive with HTTP 200
fn check_payload(symbol: &str, body: &Value) -> Result<()> {
    if let Some(message) = body.get("Error Message").and_then(Value::as_str) {
        return Err(AdvisorError::quote_unavailable(symbol, message));
    }
    if let Some(message) = body
        .get("Information")
        .or_else(|| body.get("Note"))
        .and_then(Value::as_str)
    {
        return Err(AdvisorError::RateLimited(message.to_string()));
    }
    Ok(())
}

fn field<'a>(object: &'a Value, key: &str) -> Option<&'a str> {
    object.get(key).and_then(Value::as_str).map(str::trim)
}

fn decimal_field(symbol: &str, object: &Value, key: &str) -> Result<Decimal> {
    let raw = field(object, key).ok_or_else(|| AdvisorError::quote_unavailable(symbol, format!("missing '{key}'")))?;
    Decimal::from_str(raw.trim_end_matches('%'))
        .map_err(|e| AdvisorError::quote_unavailable(symbol, format!("bad '{key}': {e}")))
}

fn volume_field(object: &Value, key: &str) -> u64 {
    field(object, key).and_then(|v| v.parse().ok()).unwrap_or(0)
}

/// Decode a `GLOBAL_QUOTE` response body
pub fn parse_global_quote(symbol: &str, body: &Value) -> Result<LiveQuote> {
    check_payload(symbol, body)?;

    let quote = body
        .get("Global Quote")
        .filter(|q| q.as_object().is_some_and(|o| !o.is_empty()))
        .ok_or_else(|| AdvisorError::quote_unavailable(symbol, "invalid response from Alpha Vantage"))?;

    let latest_trading_day = field(quote, "07. latest trading day")
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .ok_or_else(|| AdvisorError::quote_unavailable(symbol, "missing latest trading day"))?;

    Ok(LiveQuote {
        symbol: field(quote, "01. symbol").unwrap_or(symbol).to_string(),
        price: decimal_field(symbol, quote, "05. price")?,
        change_percent: round2(decimal_field(symbol, quote, "10. change percent")?),
        volume: volume_field(quote, "06. volume"),
        latest_trading_day,
    })
}

/// Decode a `TIME_SERIES_DAILY` body, keeping the most recent `days` entries oldest first
pub fn parse_daily_series(symbol: &str, body: &Value, days: usize) -> Result<Vec<PricePoint>> {
    check_payload(symbol, body)?;

    let series = body
        .get("Time Series (Daily)")
        .and_then(Value::as_object)
        .ok_or_else(|| AdvisorError::quote_unavailable(symbol, "invalid historical data response"))?;

    let mut points = series
        .iter()
        .filter_map(|(date, bar)| {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
            let price = Decimal::from_str(field(bar, "4. close")?).ok()?;
            Some(PricePoint {
                date,
                price,
                volume: volume_field(bar, "5. volume"),
            })
        })
        .collect::<Vec<_>>();

    points.sort_by_key(|p| p.date);
    let skip = points.len().saturating_sub(days);
    Ok(points.split_off(skip))
}

pub struct AlphaVantageProvider {
    http: reqwest::Client,
    config: AlphaVantageConfig,
    limiter: DirectRateLimiter,
    generator: Arc<QuoteGenerator>,
}

impl AlphaVantageProvider {
    pub fn new(config: AlphaVantageConfig, generator: Arc<QuoteGenerator>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let limiter = RateLimiter::direct(quota_from_window(config.quota_window, config.quota_limit));

        Ok(Self {
            http,
            config,
            limiter,
            generator,
        })
    }

    pub const fn config(&self) -> &AlphaVantageConfig {
        &self.config
    }

    /// Spend one unit of the call budget
    fn acquire(&self) -> Result<()> {
        self.limiter
            .check()
            .map_err(|_| AdvisorError::RateLimited("Alpha Vantage call budget exhausted".into()))
    }

    async fn fetch(&self, function: &str, symbol: &str) -> Result<Value> {
        self.acquire()?;

        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| AdvisorError::Config("Alpha Vantage API key not configured".into()))?;

        tracing::debug!(function, symbol, "querying Alpha Vantage");
        let res = self
            .http
            .get(&self.config.base_url)
            .query(&[("function", function), ("symbol", symbol), ("apikey", api_key)])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AdvisorError::quote_unavailable(symbol, format!("status={status} body={body}")));
        }

        Ok(res.json().await?)
    }
}

#[async_trait]
impl QuoteProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        "alphaVantage"
    }

    async fn quote(&self, symbol: &str) -> Result<Quote> {
        let symbol = symbol.to_uppercase();
        let body = self.fetch("GLOBAL_QUOTE", &symbol).await?;
        let live = parse_global_quote(&symbol, &body)?;
        Ok(live.apply(self.generator.quote(&symbol, live.latest_trading_day)))
    }

    async fn history(&self, symbol: &str, period: HistoryPeriod) -> Result<Vec<PricePoint>> {
        let symbol = symbol.to_uppercase();
        let body = self.fetch("TIME_SERIES_DAILY", &symbol).await?;
        parse_daily_series(&symbol, &body, usize::try_from(period.days()).unwrap_or(usize::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider(limit: u32) -> AlphaVantageProvider {
        let config = AlphaVantageConfig {
            quota_limit: limit,
            ..AlphaVantageConfig::default()
        };
        AlphaVantageProvider::new(config, Arc::new(QuoteGenerator::builtin())).unwrap()
    }

    #[test]
    fn parses_global_quote() {
        let body = json!({
            "Global Quote": {
                "01. symbol": "SPY",
                "05. price": "581.2300",
                "06. volume": "45123456",
                "07. latest trading day": "2026-10-13",
                "09. change": "-2.1000",
                "10. change percent": "-0.3600%"
            }
        });

        let live = parse_global_quote("SPY", &body).unwrap();
        assert_eq!(live.price, dec!(581.23));
        assert_eq!(live.change_percent, dec!(-0.36));
        assert_eq!(live.volume, 45_123_456);
        assert_eq!(live.latest_trading_day, NaiveDate::from_ymd_opt(2026, 10, 13).unwrap());
    }

    #[test]
    fn live_numbers_overlay_synthetic_metadata() {
        let generator = QuoteGenerator::builtin();
        let day = NaiveDate::from_ymd_opt(2026, 10, 13).unwrap();
        let live = LiveQuote {
            symbol: "VOO".into(),
            price: dec!(540.00),
            change_percent: dec!(1.10),
            volume: 2_500_000,
            latest_trading_day: day,
        };

        let quote = live.apply(generator.quote("VOO", day));
        assert_eq!(quote.source, QuoteSource::Live);
        assert_eq!(quote.price, dec!(540.00));
        assert_eq!(quote.volume, "2.50M");
        assert_eq!(quote.fifty_two_week_high, dec!(675.00));
        assert_eq!(quote.name, "Vanguard S&P 500 ETF");
    }

    #[test]
    fn error_payloads_are_classified() {
        let invalid = json!({ "Error Message": "Invalid API call." });
        assert!(matches!(
            parse_global_quote("XXX", &invalid),
            Err(AdvisorError::QuoteUnavailable { .. })
        ));

        let throttled = json!({ "Information": "Thank you for using Alpha Vantage! Our standard API rate limit is 25 requests per day." });
        assert!(matches!(parse_global_quote("SPY", &throttled), Err(AdvisorError::RateLimited(_))));
        assert!(matches!(
            parse_daily_series("SPY", &throttled, 30),
            Err(AdvisorError::RateLimited(_))
        ));

        let empty = json!({ "Global Quote": {} });
        assert!(parse_global_quote("SPY", &empty).is_err());
    }

    #[test]
    fn daily_series_keeps_latest_days_in_order() {
        let body = json!({
            "Time Series (Daily)": {
                "2026-10-13": { "4. close": "581.00", "5. volume": "100" },
                "2026-10-09": { "4. close": "575.50", "5. volume": "300" },
                "2026-10-12": { "4. close": "579.25", "5. volume": "200" }
            }
        });

        let points = parse_daily_series("SPY", &body, 2).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].price, dec!(579.25));
        assert_eq!(points[1].date, NaiveDate::from_ymd_opt(2026, 10, 13).unwrap());

        assert_eq!(parse_daily_series("SPY", &body, 30).unwrap().len(), 3);
    }

    #[test]
    fn limiter_rejects_calls_past_budget() {
        let provider = provider(5);
        for _ in 0..5 {
            assert!(provider.acquire().is_ok());
        }
        assert!(matches!(provider.acquire(), Err(AdvisorError::RateLimited(_))));
    }

    #[tokio::test]
    async fn missing_key_is_a_config_error() {
        let provider = provider(5);
        assert!(matches!(provider.quote("SPY").await, Err(AdvisorError::Config(_))));
    }
}
