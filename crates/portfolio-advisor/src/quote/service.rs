//! Market Data Service
//!
//! Caches the configured provider's answers and substitutes the synthetic
//! generator whenever that provider fails, so callers always get a quote.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use super::cache::TtlCache;
use super::synthetic::SyntheticQuoteProvider;
use super::{HistoryPeriod, PricePoint, Quote, QuoteProvider, WatchlistStats};
use crate::error::Result;

pub const DEFAULT_QUOTE_TTL: Duration = Duration::from_secs(60);
pub const DEFAULT_HISTORY_TTL: Duration = Duration::from_secs(300);

/// Watch-list quotes with their aggregate figures
#[derive(Clone, Debug, Serialize)]
pub struct Watchlist {
    pub quotes: Vec<Quote>,
    pub stats: WatchlistStats,
}

pub struct MarketDataService {
    primary: Arc<dyn QuoteProvider>,
    fallback: Arc<SyntheticQuoteProvider>,
    quotes: TtlCache<Quote>,
    histories: TtlCache<Vec<PricePoint>>,
}

impl MarketDataService {
    pub fn new(primary: Arc<dyn QuoteProvider>, fallback: Arc<SyntheticQuoteProvider>) -> Self {
        Self::with_ttls(primary, fallback, DEFAULT_QUOTE_TTL, DEFAULT_HISTORY_TTL)
    }

    pub fn with_ttls(
        primary: Arc<dyn QuoteProvider>,
        fallback: Arc<SyntheticQuoteProvider>,
        quote_ttl: Duration,
        history_ttl: Duration,
    ) -> Self {
        Self {
            primary,
            fallback,
            quotes: TtlCache::new(quote_ttl),
            histories: TtlCache::new(history_ttl),
        }
    }

    /// Synthetic data only, no live provider
    pub fn synthetic(fallback: Arc<SyntheticQuoteProvider>) -> Self {
        let primary: Arc<dyn QuoteProvider> = fallback.clone();
        Self::new(primary, fallback)
    }

    pub fn provider_name(&self) -> &str {
        self.primary.name()
    }

    pub fn fallback(&self) -> &SyntheticQuoteProvider {
        &self.fallback
    }

    /// Cached quote from the primary provider, synthetic on failure
    pub async fn quote(&self, symbol: &str) -> Result<Quote> {
        let symbol = symbol.trim().to_uppercase();
        let key = format!("quote_{symbol}_{}", self.primary.name());

        if let Some(hit) = self.quotes.get(&key).await {
            tracing::debug!(%symbol, "quote cache hit");
            return Ok(hit);
        }

        match self.primary.quote(&symbol).await {
            Ok(quote) => {
                self.quotes.put(key, quote.clone(), None).await;
                Ok(quote)
            }
            Err(e) => {
                tracing::warn!(%symbol, provider = self.primary.name(), error = %e, "quote provider failed, using synthetic data");
                self.fallback.quote(&symbol).await
            }
        }
    }

    /// Cached history from the primary provider, synthetic on failure
    pub async fn history(&self, symbol: &str, period: HistoryPeriod) -> Result<Vec<PricePoint>> {
        let symbol = symbol.trim().to_uppercase();
        let key = format!("history_{symbol}_{period}_{}", self.primary.name());

        if let Some(hit) = self.histories.get(&key).await {
            tracing::debug!(%symbol, %period, "history cache hit");
            return Ok(hit);
        }

        match self.primary.history(&symbol, period).await {
            Ok(series) => {
                self.histories.put(key, series.clone(), None).await;
                Ok(series)
            }
            Err(e) => {
                tracing::warn!(%symbol, %period, error = %e, "history provider failed, using synthetic data");
                self.fallback.history(&symbol, period).await
            }
        }
    }

    /// Quotes for a list of symbols plus the summary row
    pub async fn watchlist(&self, symbols: &[String]) -> Result<Watchlist> {
        let mut quotes = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            quotes.push(self.quote(symbol).await?);
        }
        let stats = WatchlistStats::from_quotes(&quotes);
        Ok(Watchlist { quotes, stats })
    }

    pub async fn clear_cache(&self) {
        self.quotes.clear().await;
        self.histories.clear().await;
        tracing::info!("market data cache cleared");
    }

    pub async fn cached_entries(&self) -> usize {
        self.quotes.len().await + self.histories.len().await
    }
}
