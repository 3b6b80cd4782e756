//! Ticker Catalog
//!
//! Static reference data: sectors with their member tickers, the named
//! allocation templates, and the current market outlook. Built once at
//! startup and shared behind an `Arc`.

mod data;

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::{Profile, Sector, Ticker};

/// A search match with its owning sector
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(flatten)]
    pub ticker: Ticker,
    pub sector_id: String,
    pub sector_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketConditions {
    pub market_phase: String,
    pub interest_rate_environment: String,
    pub inflation_trend: String,
    pub economic_cycle: String,
}

/// Sector ids grouped by positioning call
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SectorCalls {
    pub overweight: Vec<String>,
    pub neutral: Vec<String>,
    pub underweight: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub conditions: MarketConditions,
    pub recommendations: SectorCalls,
    /// Sector id -> reason for the call
    pub rationale: BTreeMap<String, String>,
}

/// In-memory sector/profile catalog
#[derive(Debug)]
pub struct TickerCatalog {
    sectors: Vec<Sector>,
    profiles: Vec<Profile>,
    /// symbol -> (sector index, ticker index)
    by_symbol: HashMap<String, (usize, usize)>,
    market: MarketAnalysis,
}

impl TickerCatalog {
    pub fn new(sectors: Vec<Sector>, profiles: Vec<Profile>, market: MarketAnalysis) -> Self {
        let mut by_symbol = HashMap::new();
        for (si, sector) in sectors.iter().enumerate() {
            for (ti, ticker) in sector.tickers.iter().enumerate() {
                if by_symbol.insert(ticker.symbol.clone(), (si, ti)).is_some() {
                    tracing::warn!(symbol = %ticker.symbol, sector = %sector.id, "ticker listed in more than one sector");
                }
            }
        }

        for profile in &profiles {
            let total = profile.total_weight();
            if total != Decimal::ONE_HUNDRED {
                tracing::warn!(profile = %profile.id, %total, "allocation template does not sum to 100");
            }
        }

        Self {
            sectors,
            profiles,
            by_symbol,
            market,
        }
    }

    /// The built-in catalog of thirteen sectors and six templates
    pub fn builtin() -> Self {
        Self::new(data::sectors(), data::profiles(), data::market_analysis())
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn sector(&self, id: &str) -> Option<&Sector> {
        self.sectors.iter().find(|s| s.id == id)
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn profile(&self, id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// Locate a ticker and the sector that owns it
    pub fn find_ticker(&self, symbol: &str) -> Option<(&Ticker, &Sector)> {
        let &(si, ti) = self.by_symbol.get(symbol)?;
        let sector = self.sectors.get(si)?;
        Some((sector.tickers.get(ti)?, sector))
    }

    /// Case-insensitive substring search over symbol, ticker name and sector name
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        let needle = needle.as_str();

        self.sectors
            .iter()
            .flat_map(|sector| {
                let sector_match = sector.name.to_lowercase().contains(needle);
                sector
                    .tickers
                    .iter()
                    .filter(move |t| {
                        sector_match
                            || t.symbol.to_lowercase().contains(needle)
                            || t.name.to_lowercase().contains(needle)
                    })
                    .map(move |t| SearchHit {
                        ticker: t.clone(),
                        sector_id: sector.id.clone(),
                        sector_name: sector.name.clone(),
                    })
            })
            .collect()
    }

    pub const fn market_analysis(&self) -> &MarketAnalysis {
        &self.market
    }
}

impl Default for TickerCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn builtin_catalog_shape() {
        let catalog = TickerCatalog::builtin();
        assert_eq!(catalog.sectors().len(), 13);
        assert_eq!(catalog.profiles().len(), 6);

        for profile in catalog.profiles() {
            assert_eq!(profile.total_weight(), dec!(100), "{}", profile.id);
            for weight in &profile.allocation {
                assert!(catalog.sector(&weight.sector_id).is_some(), "{}", weight.sector_id);
            }
        }
    }

    #[test]
    fn every_ticker_belongs_to_one_sector() {
        let catalog = TickerCatalog::builtin();
        let listed: usize = catalog.sectors().iter().map(|s| s.tickers.len()).sum();
        assert_eq!(listed, catalog.by_symbol.len());

        let (ticker, sector) = catalog.find_ticker("QQQ").unwrap();
        assert_eq!(ticker.expense_ratio, dec!(0.20));
        assert_eq!(sector.id, "tecnologia");
        assert!(catalog.find_ticker("AAPL").is_none());
    }

    #[test]
    fn search_matches_symbol_name_and_sector() {
        let catalog = TickerCatalog::builtin();

        let by_symbol = catalog.search("vgt");
        assert_eq!(by_symbol.len(), 1);
        assert_eq!(by_symbol[0].sector_id, "tecnologia");

        let by_sector: Vec<_> = catalog.search("renta fija").into_iter().map(|h| h.ticker.symbol).collect();
        assert_eq!(by_sector, ["AGG", "BND", "TLT", "IEF", "LQD"]);

        let by_name = catalog.search("REIT");
        assert!(by_name.iter().any(|h| h.ticker.symbol == "SCHH"));

        assert!(catalog.search("   ").is_empty());
    }

    #[test]
    fn market_analysis_has_rationale_for_every_call() {
        let catalog = TickerCatalog::builtin();
        let analysis = catalog.market_analysis();
        assert_eq!(analysis.conditions.market_phase, "Expansión");

        for id in analysis.recommendations.overweight.iter().chain(&analysis.recommendations.underweight) {
            assert!(analysis.rationale.contains_key(id), "{id}");
        }
    }
}
