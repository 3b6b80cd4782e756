//! Allocation Calculator
//!
//! Splits an investment amount across four buckets: fixed income plus the
//! core/explore/protect slices of the equity side. Each bucket holds one
//! selected ticker whose price turns the dollar amount into a share count.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::quote::QuoteGenerator;

pub const DEFAULT_INVESTMENT_AMOUNT: Decimal = dec!(100);
const EQUITY_TOLERANCE: Decimal = dec!(0.1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Bucket {
    FixedIncome,
    Core,
    Explore,
    Protect,
}

impl Bucket {
    pub const ALL: [Self; 4] = [Self::FixedIncome, Self::Core, Self::Explore, Self::Protect];

    pub const fn label(self) -> &'static str {
        match self {
            Self::FixedIncome => "Renta Fija",
            Self::Core => "Core",
            Self::Explore => "Explore",
            Self::Protect => "Protect",
        }
    }

    /// Selectable tickers; the first is the default
    pub const fn options(self) -> &'static [&'static str] {
        match self {
            Self::FixedIncome => &["AGG", "BND", "TLT", "IEF"],
            Self::Core => &["IVV", "SPY", "VOO", "SPLG", "VTI"],
            Self::Explore => &["QQQ", "ARKK", "VGT", "XLK"],
            Self::Protect => &["XLP", "XLU", "VIG", "DVY"],
        }
    }

    const fn default_symbol(self) -> &'static str {
        self.options()[0]
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fixed-income / equity split with the equity side divided three ways
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Composition {
    pub fixed_income: Decimal,
    /// Derived; recomputed on save
    #[serde(default)]
    pub equity: Decimal,
    pub core: Decimal,
    pub explore: Decimal,
    pub protect: Decimal,
}

impl Default for Composition {
    fn default() -> Self {
        Self::new(dec!(40), dec!(42), dec!(9), dec!(9))
    }
}

impl Composition {
    /// Equity is derived as `100 - fixed_income`
    pub fn new(fixed_income: Decimal, core: Decimal, explore: Decimal, protect: Decimal) -> Self {
        Self {
            fixed_income,
            equity: Decimal::ONE_HUNDRED - fixed_income,
            core,
            explore,
            protect,
        }
    }

    pub fn preset(id: &str) -> Option<Self> {
        let composition = match id {
            "conservative" => Self::new(dec!(70), dec!(21), dec!(4.5), dec!(4.5)),
            "balanced" => Self::new(dec!(40), dec!(42), dec!(9), dec!(9)),
            "growth" => Self::new(dec!(20), dec!(56), dec!(12), dec!(12)),
            "aggressive" => Self::new(dec!(5), dec!(66.5), dec!(14.25), dec!(14.25)),
            _ => return None,
        };
        Some(composition)
    }

    pub const PRESETS: [&'static str; 4] = ["conservative", "balanced", "growth", "aggressive"];

    pub const fn percent(&self, bucket: Bucket) -> Decimal {
        match bucket {
            Bucket::FixedIncome => self.fixed_income,
            Bucket::Core => self.core,
            Bucket::Explore => self.explore,
            Bucket::Protect => self.protect,
        }
    }

    /// Recompute `equity` from `fixed_income`
    #[must_use]
    pub fn normalized(self) -> Self {
        Self::new(self.fixed_income, self.core, self.explore, self.protect)
    }

    /// Must pass before the composition is persisted
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.fixed_income < Decimal::ZERO || self.fixed_income > Decimal::ONE_HUNDRED {
            return Err(ValidationError::FixedIncomeOutOfRange(self.fixed_income));
        }

        let expected = Decimal::ONE_HUNDRED - self.fixed_income;
        let actual = self.core + self.explore + self.protect;
        if (actual - expected).abs() >= EQUITY_TOLERANCE {
            return Err(ValidationError::EquityBucketMismatch { expected, actual });
        }
        Ok(())
    }
}

/// Which ticker fills each bucket
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TickerSelection {
    pub fixed_income: String,
    pub core: String,
    pub explore: String,
    pub protect: String,
}

impl Default for TickerSelection {
    fn default() -> Self {
        Self {
            fixed_income: Bucket::FixedIncome.default_symbol().into(),
            core: Bucket::Core.default_symbol().into(),
            explore: Bucket::Explore.default_symbol().into(),
            protect: Bucket::Protect.default_symbol().into(),
        }
    }
}

impl TickerSelection {
    pub fn get(&self, bucket: Bucket) -> &str {
        match bucket {
            Bucket::FixedIncome => &self.fixed_income,
            Bucket::Core => &self.core,
            Bucket::Explore => &self.explore,
            Bucket::Protect => &self.protect,
        }
    }

    /// Select one of the bucket's listed options
    pub fn set(&mut self, bucket: Bucket, symbol: &str) -> Result<(), ValidationError> {
        let symbol = symbol.trim().to_uppercase();
        if !bucket.options().contains(&symbol.as_str()) {
            return Err(ValidationError::TickerNotInBucket {
                symbol,
                bucket: bucket.label(),
            });
        }

        let slot = match bucket {
            Bucket::FixedIncome => &mut self.fixed_income,
            Bucket::Core => &mut self.core,
            Bucket::Explore => &mut self.explore,
            Bucket::Protect => &mut self.protect,
        };
        *slot = symbol;
        Ok(())
    }

    pub fn contains(&self, symbol: &str) -> bool {
        Bucket::ALL.iter().any(|&b| self.get(b) == symbol)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut check = Self::default();
        for bucket in Bucket::ALL {
            check.set(bucket, self.get(bucket))?;
        }
        Ok(())
    }
}

pub trait PriceLookup {
    fn price(&self, symbol: &str) -> Decimal;
}

impl<F: Fn(&str) -> Decimal> PriceLookup for F {
    fn price(&self, symbol: &str) -> Decimal {
        self(symbol)
    }
}

/// Live prices first, the synthetic price for `date` otherwise
#[derive(Clone, Debug)]
pub struct PriceBook {
    date: NaiveDate,
    live: HashMap<String, Decimal>,
    generator: Arc<QuoteGenerator>,
}

impl PriceBook {
    pub fn new(generator: Arc<QuoteGenerator>, date: NaiveDate) -> Self {
        Self {
            date,
            live: HashMap::new(),
            generator,
        }
    }

    /// Store a live price; `true` when a selected bucket ticker changed and
    /// the breakdown needs recomputing
    #[must_use]
    pub fn record_live_price(&mut self, symbol: &str, price: Decimal, selection: &TickerSelection) -> bool {
        if price <= Decimal::ZERO {
            return false;
        }
        let symbol = symbol.to_uppercase();
        let selected = selection.contains(&symbol);
        self.live.insert(symbol, price);
        selected
    }

    pub fn live_price(&self, symbol: &str) -> Option<Decimal> {
        self.live.get(symbol).copied()
    }
}

impl PriceLookup for PriceBook {
    fn price(&self, symbol: &str) -> Decimal {
        self.live_price(symbol)
            .unwrap_or_else(|| self.generator.price(symbol, self.date))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketAllocation {
    pub bucket: Bucket,
    pub label: String,
    pub symbol: String,
    pub percentage: Decimal,
    pub amount: Decimal,
    pub price: Decimal,
    pub shares: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationBreakdown {
    pub investment_amount: Decimal,
    pub buckets: Vec<BucketAllocation>,
}

impl AllocationBreakdown {
    pub fn total_allocated(&self) -> Decimal {
        self.buckets.iter().map(|b| b.amount).sum()
    }
}

/// Largest accepted investment amount; keeps every percentage product in range
pub const MAX_INVESTMENT_AMOUNT: Decimal = dec!(1000000000000000);

/// Reject amounts below zero or above [`MAX_INVESTMENT_AMOUNT`]; zero is
/// allowed and allocates nothing
pub fn validate_amount(amount: Decimal) -> Result<Decimal, ValidationError> {
    if amount < Decimal::ZERO {
        Err(ValidationError::NegativeAmount(amount))
    } else if amount > MAX_INVESTMENT_AMOUNT {
        Err(ValidationError::AmountTooLarge {
            amount,
            max: MAX_INVESTMENT_AMOUNT,
        })
    } else {
        Ok(amount)
    }
}

pub fn allocate(
    composition: &Composition,
    amount: Decimal,
    selection: &TickerSelection,
    prices: &impl PriceLookup,
) -> AllocationBreakdown {
    if validate_amount(amount).is_err() || amount.is_zero() {
        return AllocationBreakdown::default();
    }

    let buckets = Bucket::ALL
        .into_iter()
        .map(|bucket| {
            let percentage = composition.percent(bucket);
            let symbol = selection.get(bucket);
            let raw_amount = amount * percentage / Decimal::ONE_HUNDRED;
            let price = prices.price(symbol);
            let shares = if price > Decimal::ZERO {
                (raw_amount / price).round_dp(4)
            } else {
                Decimal::ZERO
            };

            BucketAllocation {
                bucket,
                label: bucket.label().into(),
                symbol: symbol.to_string(),
                percentage,
                amount: raw_amount.round_dp(2),
                price: price.round_dp(2),
                shares,
            }
        })
        .collect();

    AllocationBreakdown {
        investment_amount: amount,
        buckets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(_: &str) -> Decimal {
        dec!(100)
    }

    #[test]
    fn splits_amount_by_bucket() {
        let breakdown = allocate(
            &Composition::default(),
            dec!(1000),
            &TickerSelection::default(),
            &flat,
        );

        let amounts: Vec<_> = breakdown.buckets.iter().map(|b| b.amount).collect();
        assert_eq!(amounts, [dec!(400), dec!(420), dec!(90), dec!(90)]);
        assert_eq!(breakdown.total_allocated(), dec!(1000));
        assert_eq!(breakdown.buckets[1].symbol, "IVV");
        assert_eq!(breakdown.buckets[1].shares, dec!(4.2));
    }

    #[test]
    fn rejects_mismatched_equity_buckets() {
        let bad = Composition::new(dec!(40), dec!(50), dec!(9), dec!(9));
        assert_eq!(
            bad.validate(),
            Err(ValidationError::EquityBucketMismatch {
                expected: dec!(60),
                actual: dec!(68),
            })
        );

        let out_of_range = Composition::new(dec!(120), dec!(0), dec!(0), dec!(0));
        assert!(matches!(
            out_of_range.validate(),
            Err(ValidationError::FixedIncomeOutOfRange(_))
        ));

        let close_enough = Composition::new(dec!(40), dec!(42.05), dec!(9), dec!(9));
        assert!(close_enough.validate().is_ok());
    }

    #[test]
    fn presets_are_valid() {
        for id in Composition::PRESETS {
            let preset = Composition::preset(id).unwrap();
            assert!(preset.validate().is_ok(), "{id}");
        }
        assert_eq!(Composition::preset("balanced"), Some(Composition::default()));
        assert_eq!(Composition::preset("custom"), None);
    }

    #[test]
    fn non_positive_amount_allocates_nothing() {
        let selection = TickerSelection::default();
        assert!(allocate(&Composition::default(), dec!(0), &selection, &flat).buckets.is_empty());
        assert!(allocate(&Composition::default(), dec!(-5), &selection, &flat).buckets.is_empty());
        assert!(allocate(&Composition::default(), Decimal::MAX, &selection, &flat).buckets.is_empty());
        assert!(validate_amount(dec!(-5)).is_err());
        assert_eq!(validate_amount(dec!(250)), Ok(dec!(250)));
        assert_eq!(validate_amount(MAX_INVESTMENT_AMOUNT), Ok(MAX_INVESTMENT_AMOUNT));
        assert!(matches!(
            validate_amount(Decimal::MAX),
            Err(ValidationError::AmountTooLarge { .. })
        ));
    }

    #[test]
    fn zero_price_yields_zero_shares() {
        let breakdown = allocate(
            &Composition::default(),
            dec!(1000),
            &TickerSelection::default(),
            &|_: &str| Decimal::ZERO,
        );
        assert!(breakdown.buckets.iter().all(|b| b.shares.is_zero()));
    }

    #[test]
    fn selection_accepts_only_listed_options() {
        let mut selection = TickerSelection::default();
        selection.set(Bucket::Core, "voo").unwrap();
        assert_eq!(selection.core, "VOO");

        let err = selection.set(Bucket::Protect, "QQQ").unwrap_err();
        assert!(matches!(err, ValidationError::TickerNotInBucket { bucket: "Protect", .. }));
        assert!(selection.validate().is_ok());
    }

    #[test]
    fn price_book_prefers_live_prices() {
        let generator = Arc::new(QuoteGenerator::builtin());
        let day = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let mut book = PriceBook::new(generator.clone(), day);
        let selection = TickerSelection::default();

        assert_eq!(book.price("AGG"), generator.price("AGG", day));

        assert!(book.record_live_price("agg", dec!(99.10), &selection));
        assert!(!book.record_live_price("TLT", dec!(91.00), &selection));
        assert!(!book.record_live_price("IVV", dec!(0), &selection));

        assert_eq!(book.price("AGG"), dec!(99.10));
        assert_eq!(book.price("IVV"), generator.price("IVV", day));

        let breakdown = allocate(&Composition::default(), dec!(1000), &selection, &book);
        assert_eq!(breakdown.buckets[0].price, dec!(99.10));
        assert_eq!(breakdown.buckets[0].shares, (dec!(400) / dec!(99.10)).round_dp(4));
    }
}
