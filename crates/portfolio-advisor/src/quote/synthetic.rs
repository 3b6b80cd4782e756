//! Synthetic Quote Generator
//!
//! Produces a full quote from nothing but a symbol and a calendar date. Every
//! metric comes from a 32-bit rolling hash of `symbol + date` (plus a per-metric
//! tag), so the same day always yields the same numbers and a new day yields
//! new ones. Time of day never enters the seed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::{HistoryPeriod, PricePoint, Quote, QuoteProvider, QuoteSource, price_table};
use crate::catalog::TickerCatalog;
use crate::error::Result;
use crate::model::RiskLevel;

/// Source of "today" for date-seeded quotes
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Host-local calendar date
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// A clock pinned to one date
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// `hash = hash * 31 + unit` over UTF-16 code units, wrapping at 32 bits
pub fn hash_code(input: &str) -> i32 {
    input
        .encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// `|hash| / 2^31`, in `[0, 1]`
pub fn seed_fraction(input: &str) -> f64 {
    f64::from(hash_code(input).unsigned_abs()) / 2_147_483_648.0
}

/// Date-only seed component, e.g. `Wed Oct 14 2026`
pub fn date_key(date: NaiveDate) -> String {
    date.format("%a %b %d %Y").to_string()
}

fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

pub(crate) fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn scaled(value: Decimal, divisor: Decimal, suffix: &str) -> String {
    format!("{:.2}{suffix}", round2(value / divisor))
}

/// `---` for zero, otherwise two decimals with a T/B/M suffix
pub fn format_market_cap(value: Decimal) -> String {
    if value.is_zero() {
        "---".into()
    } else if value >= dec!(1_000_000_000_000) {
        scaled(value, dec!(1_000_000_000_000), "T")
    } else if value >= dec!(1_000_000_000) {
        scaled(value, dec!(1_000_000_000), "B")
    } else if value >= dec!(1_000_000) {
        scaled(value, dec!(1_000_000), "M")
    } else {
        value.round().to_string()
    }
}

/// `---` for zero, otherwise two decimals with a B/M/K suffix
pub fn format_volume(volume: u64) -> String {
    let value = Decimal::from(volume);
    if volume == 0 {
        "---".into()
    } else if volume >= 1_000_000_000 {
        scaled(value, dec!(1_000_000_000), "B")
    } else if volume >= 1_000_000 {
        scaled(value, dec!(1_000_000), "M")
    } else if volume >= 1_000 {
        scaled(value, dec!(1_000), "K")
    } else {
        volume.to_string()
    }
}

/// Deterministic per-day quote generator
#[derive(Debug, Clone)]
pub struct QuoteGenerator {
    catalog: Arc<TickerCatalog>,
}

impl QuoteGenerator {
    pub const fn new(catalog: Arc<TickerCatalog>) -> Self {
        Self { catalog }
    }

    pub fn builtin() -> Self {
        Self::new(Arc::new(TickerCatalog::builtin()))
    }

    pub fn catalog(&self) -> &TickerCatalog {
        &self.catalog
    }

    fn fraction(symbol: &str, date: NaiveDate, tag: &str) -> Decimal {
        to_decimal(seed_fraction(&format!("{symbol}{}{tag}", date_key(date))))
    }

    /// Unperturbed reference price
    pub fn base_price(&self, symbol: &str) -> Decimal {
        price_table::estimated_price(symbol)
    }

    /// Base price moved by at most ±2%
    pub fn price(&self, symbol: &str, date: NaiveDate) -> Decimal {
        let f = Self::fraction(symbol, date, "");
        let variation = Decimal::ONE + (f * dec!(4) - dec!(2)) / dec!(100);
        round2(self.base_price(symbol) * variation)
    }

    /// Shares traded, up to 100M
    pub fn volume(&self, symbol: &str, date: NaiveDate) -> u64 {
        (Self::fraction(symbol, date, "volume") * dec!(100_000_000))
            .floor()
            .to_u64()
            .unwrap_or(0)
    }

    pub fn quote(&self, symbol: &str, date: NaiveDate) -> Quote {
        let price = self.price(symbol, date);
        let change_percent = round2(Self::fraction(symbol, date, "change") * dec!(6) - dec!(3));
        let pe_ratio = round2(dec!(15) + Self::fraction(symbol, date, "pe") * dec!(25));
        let dividend_yield = round2(Self::fraction(symbol, date, "div") * dec!(4));
        let market_cap = Self::fraction(symbol, date, "cap") * dec!(3_000_000_000_000);

        let (name, category, expense_ratio, risk_level) = match self.catalog.find_ticker(symbol) {
            Some((ticker, sector)) => (
                ticker.name.clone(),
                sector.name.clone(),
                Some(ticker.expense_ratio),
                sector.risk_level,
            ),
            None => (symbol.to_string(), "Equity".to_string(), None, RiskLevel::Medium),
        };

        Quote {
            symbol: symbol.to_string(),
            name,
            category,
            price,
            change_percent,
            market_cap: format_market_cap(market_cap),
            volume: format_volume(self.volume(symbol, date)),
            pe_ratio,
            dividend_yield,
            fifty_two_week_high: round2(price * dec!(1.25)),
            fifty_two_week_low: round2(price * dec!(0.75)),
            expense_ratio,
            risk_level,
            source: QuoteSource::Synthetic,
            as_of: date,
        }
    }

    /// One point per calendar day from `today - days` through `today`
    pub fn history(&self, symbol: &str, today: NaiveDate, period: HistoryPeriod) -> Vec<PricePoint> {
        (0..=u64::from(period.days()))
            .rev()
            .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
            .map(|date| PricePoint {
                date,
                price: self.price(symbol, date),
                volume: self.volume(symbol, date),
            })
            .collect()
    }
}

/// `QuoteProvider` backed by the generator
pub struct SyntheticQuoteProvider {
    generator: Arc<QuoteGenerator>,
    clock: Arc<dyn Clock>,
}

impl SyntheticQuoteProvider {
    pub fn new(generator: Arc<QuoteGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self { generator, clock }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }
}

#[async_trait]
impl QuoteProvider for SyntheticQuoteProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    async fn quote(&self, symbol: &str) -> Result<Quote> {
        Ok(self.generator.quote(&symbol.to_uppercase(), self.clock.today()))
    }

    async fn history(&self, symbol: &str, period: HistoryPeriod) -> Result<Vec<PricePoint>> {
        Ok(self
            .generator
            .history(&symbol.to_uppercase(), self.clock.today(), period))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn hash_matches_reference_values() {
        assert_eq!(hash_code(""), 0);
        assert_eq!(hash_code("a"), 97);
        assert_eq!(hash_code("hello"), 99_162_322);
        assert_eq!(hash_code("SPYWed Oct 14 2026"), 878_067_385);
    }

    #[test]
    fn fraction_stays_in_unit_interval() {
        for input in ["", "SPY", "zzzzzzzzzzzzzzzzzzzz", "Bienes Raíces"] {
            let f = seed_fraction(input);
            assert!((0.0..=1.0).contains(&f), "{input}: {f}");
        }
    }

    #[test]
    fn date_key_is_date_only() {
        assert_eq!(date_key(day(2026, 10, 14)), "Wed Oct 14 2026");
        assert_eq!(date_key(day(2026, 1, 4)), "Sun Jan 04 2026");
    }

    #[test]
    fn quote_is_deterministic_per_day() {
        let generator = QuoteGenerator::builtin();
        let today = day(2026, 10, 14);

        assert_eq!(generator.quote("SPY", today), generator.quote("SPY", today));
        assert_ne!(
            generator.quote("SPY", today).price,
            generator.quote("SPY", day(2026, 10, 15)).price
        );
    }

    #[test]
    fn reference_quote_values() {
        let quote = QuoteGenerator::builtin().quote("SPY", day(2026, 10, 14));
        assert_eq!(quote.price, dec!(583.10));
        assert_eq!(quote.change_percent, dec!(-0.35));
        assert_eq!(quote.volume, "18.57M");
        assert_eq!(quote.fifty_two_week_high, dec!(728.88));
        assert_eq!(quote.fifty_two_week_low, dec!(437.33));
        assert_eq!(quote.category, "Mercado Total (Core)");
        assert_eq!(quote.expense_ratio, Some(dec!(0.09)));
    }

    #[test]
    fn price_stays_within_two_percent_of_base() {
        let generator = QuoteGenerator::builtin();
        let start = day(2026, 1, 1);

        for symbol in ["SPLG", "QQQ", "AGG", "BRK.B", "UNKNOWN"] {
            let base = generator.base_price(symbol);
            let bound = base * dec!(0.02) + dec!(0.01);
            for offset in 0..120 {
                let date = start.checked_add_days(Days::new(offset)).unwrap();
                let quote = generator.quote(symbol, date);
                assert!((quote.price - base).abs() <= bound, "{symbol} {date}: {}", quote.price);
                assert!(quote.change_percent.abs() <= dec!(3));
                assert!(quote.pe_ratio >= dec!(15) && quote.pe_ratio <= dec!(40));
                assert!(quote.dividend_yield >= dec!(0) && quote.dividend_yield <= dec!(4));
            }
        }
    }

    #[test]
    fn unknown_symbol_gets_generic_metadata() {
        let quote = QuoteGenerator::builtin().quote("ZZZZ", day(2026, 10, 14));
        assert_eq!(quote.name, "ZZZZ");
        assert_eq!(quote.category, "Equity");
        assert_eq!(quote.expense_ratio, None);
        assert_eq!(quote.risk_level, RiskLevel::Medium);
        assert!(quote.price > dec!(146) && quote.price < dec!(154));
    }

    #[test]
    fn formatters() {
        assert_eq!(format_market_cap(Decimal::ZERO), "---");
        assert_eq!(format_market_cap(dec!(2_500_000_000_000)), "2.50T");
        assert_eq!(format_market_cap(dec!(3_404_000_000)), "3.40B");
        assert_eq!(format_market_cap(dec!(5_000_000)), "5.00M");
        assert_eq!(format_market_cap(dec!(999)), "999");

        assert_eq!(format_volume(0), "---");
        assert_eq!(format_volume(999), "999");
        assert_eq!(format_volume(1_234), "1.23K");
        assert_eq!(format_volume(45_600_000), "45.60M");
        assert_eq!(format_volume(2_000_000_000), "2.00B");
    }

    #[test]
    fn history_covers_window_oldest_first() {
        let generator = QuoteGenerator::builtin();
        let today = day(2026, 10, 14);
        let series = generator.history("VTI", today, HistoryPeriod::OneWeek);

        assert_eq!(series.len(), 8);
        assert_eq!(series[0].date, day(2026, 10, 7));
        assert_eq!(series[7].date, today);
        assert_eq!(series[7].price, generator.price("VTI", today));
    }

    #[tokio::test]
    async fn provider_uses_clock_date() {
        let generator = Arc::new(QuoteGenerator::builtin());
        let provider = SyntheticQuoteProvider::new(generator.clone(), Arc::new(FixedClock(day(2026, 10, 14))));

        let quote = provider.quote("spy").await.unwrap();
        assert_eq!(quote.symbol, "SPY");
        assert_eq!(quote, generator.quote("SPY", day(2026, 10, 14)));
    }
}
