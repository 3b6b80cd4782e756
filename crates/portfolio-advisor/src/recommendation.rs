//! Recommendation Engine
//!
//! For each sector weight of an allocation template, recommend the sector's
//! cheapest ticker and annotate it with a confidence score, pros, cons and
//! up to two sibling alternatives.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::allocation::MAX_INVESTMENT_AMOUNT;
use crate::catalog::TickerCatalog;
use crate::model::{RiskLevel, Sector, Ticker, Volatility};

pub const BASE_CONFIDENCE: i32 = 70;
pub const MIN_CONFIDENCE: i32 = 40;
pub const MAX_CONFIDENCE: i32 = 95;
const MAX_ALTERNATIVES: usize = 2;
const ENERGY_SECTOR_ID: &str = "energia";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alternative {
    pub symbol: String,
    pub name: String,
    pub expense_ratio: Decimal,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(flatten)]
    pub ticker: Ticker,
    pub sector_id: String,
    pub sector_name: String,
    /// Template weight of the sector
    pub percentage: Decimal,
    pub recommended_amount: Decimal,
    /// Ordinal quality signal in `[40, 95]`
    pub confidence: i32,
    pub reason: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub alternatives: Vec<Alternative>,
    pub fit_analysis: String,
}

/// Heuristic score from expense ratio and template weight
pub fn confidence(expense_ratio: Decimal, weight: Decimal) -> i32 {
    let mut score = BASE_CONFIDENCE;

    if expense_ratio <= dec!(0.05) {
        score += 15;
    } else if expense_ratio <= dec!(0.15) {
        score += 5;
    } else if expense_ratio > dec!(0.50) {
        score -= 20;
    }

    if weight >= dec!(20) {
        score += 10;
    } else if weight >= dec!(10) {
        score += 5;
    }

    score.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}

pub fn pros(ticker: &Ticker, sector: &Sector) -> Vec<String> {
    let range = sector.dividend_yield;
    let rules = [
        (ticker.expense_ratio <= dec!(0.05), "very low expense ratio"),
        (ticker.issuer.is_low_cost(), "recognized low-cost manager"),
        (ticker.broad_market, "broadly diversified"),
        (sector.risk_level == RiskLevel::Low, "low-risk sector"),
        (range.low >= dec!(3) && range.low < dec!(5), "good dividends"),
    ];

    let found = collect(&rules);
    if found.is_empty() {
        vec!["well-established ETF".into(), "good liquidity".into()]
    } else {
        found
    }
}

pub fn cons(ticker: &Ticker, sector: &Sector) -> Vec<String> {
    let rules = [
        (ticker.expense_ratio > dec!(0.30), "high expense ratio"),
        (sector.volatility == Volatility::VeryHigh, "high expected volatility"),
        (sector.risk_level == RiskLevel::High, "high-risk sector"),
        (sector.id == ENERGY_SECTOR_ID, "cyclical and volatile sector"),
    ];

    let found = collect(&rules);
    if found.is_empty() {
        vec!["consider additional diversification".into()]
    } else {
        found
    }
}

fn collect(rules: &[(bool, &str)]) -> Vec<String> {
    rules
        .iter()
        .filter(|(hit, _)| *hit)
        .map(|(_, text)| (*text).to_string())
        .collect()
}

pub fn fit_analysis(ticker: &Ticker, sector: &Sector, profile_id: &str) -> String {
    let er = ticker.expense_ratio;
    let expense_line = if er <= dec!(0.10) {
        format!("• Very competitive expense ratio ({er}%)")
    } else if er <= dec!(0.20) {
        format!("• Reasonable expense ratio ({er}%)")
    } else {
        format!("• High expense ratio ({er}%), consider alternatives")
    };

    format!(
        "{} fits your {profile_id} profile because:\n\
         • Sector {}: {}\n\
         • Risk level: {}\n\
         • Expected volatility: {}\n\
         • Dividend yield: {}\n\
         {expense_line}\n",
        ticker.symbol, sector.name, sector.description, sector.risk_level, sector.volatility, sector.dividend_yield,
    )
}

fn alternatives(sector: &Sector, chosen: &Ticker) -> Vec<Alternative> {
    sector
        .tickers
        .iter()
        .filter(|t| t.symbol != chosen.symbol)
        .take(MAX_ALTERNATIVES)
        .map(|t| Alternative {
            symbol: t.symbol.clone(),
            name: t.name.clone(),
            expense_ratio: t.expense_ratio,
            reason: format!("Expense ratio: {}%", t.expense_ratio),
        })
        .collect()
}

/// Template-driven recommender over a shared catalog
#[derive(Clone, Debug)]
pub struct RecommendationEngine {
    catalog: Arc<TickerCatalog>,
}

impl RecommendationEngine {
    pub const fn new(catalog: Arc<TickerCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &TickerCatalog {
        &self.catalog
    }

    /// Recommendations for a template id, highest weight first.
    /// Unknown ids yield an empty list.
    pub fn recommend(&self, profile_id: &str, amount: Decimal) -> Vec<Recommendation> {
        let Some(profile) = self.catalog.profile(profile_id) else {
            tracing::debug!(profile_id, "no allocation template");
            return Vec::new();
        };
        if amount > MAX_INVESTMENT_AMOUNT {
            tracing::warn!(%amount, "investment amount out of range");
            return Vec::new();
        }

        let mut recommendations: Vec<Recommendation> = profile
            .allocation
            .iter()
            .filter_map(|weight| {
                let sector = self.catalog.sector(&weight.sector_id)?;
                let ticker = sector.cheapest_ticker()?;
                Some(Recommendation {
                    ticker: ticker.clone(),
                    sector_id: sector.id.clone(),
                    sector_name: sector.name.clone(),
                    percentage: weight.percentage,
                    recommended_amount: (amount * weight.percentage / Decimal::ONE_HUNDRED).round_dp(2),
                    confidence: confidence(ticker.expense_ratio, weight.percentage),
                    reason: format!(
                        "Lowest expense ratio ({}%) in sector {}",
                        ticker.expense_ratio, sector.name
                    ),
                    pros: pros(ticker, sector),
                    cons: cons(ticker, sector),
                    alternatives: alternatives(sector, ticker),
                    fit_analysis: fit_analysis(ticker, sector, &profile.id),
                })
            })
            .collect();

        recommendations.sort_by(|a, b| b.percentage.cmp(&a.percentage));
        recommendations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::{Experience, PrimaryGoal, Questionnaire, RiskProfiler, VolatilityTolerance};

    fn engine() -> RecommendationEngine {
        RecommendationEngine::new(Arc::new(TickerCatalog::builtin()))
    }

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(confidence(dec!(0), dec!(100)), 95);
        assert_eq!(confidence(dec!(10), dec!(0)), 50);
        assert_eq!(confidence(dec!(0.10), dec!(30)), 85);
        assert_eq!(confidence(dec!(0.20), dec!(5)), 70);
        assert_eq!(confidence(dec!(0.75), dec!(12)), 55);

        for er in [dec!(0), dec!(0.05), dec!(0.5), dec!(0.51), dec!(10)] {
            for w in [dec!(0), dec!(10), dec!(20), dec!(100)] {
                let c = confidence(er, w);
                assert!((MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&c));
            }
        }
    }

    #[test]
    fn out_of_range_amount_yields_nothing() {
        assert!(engine().recommend("aggressive", Decimal::MAX).is_empty());

        let recs = engine().recommend("aggressive", MAX_INVESTMENT_AMOUNT);
        assert_eq!(recs[0].recommended_amount, dec!(300000000000000));
    }

    #[test]
    fn aggressive_profile_leads_with_technology() {
        let recs = engine().recommend("aggressive", dec!(10000));
        assert_eq!(recs.len(), 8);

        let top = &recs[0];
        assert_eq!(top.sector_id, "tecnologia");
        assert_eq!(top.ticker.symbol, "VGT");
        assert_eq!(top.recommended_amount, dec!(3000));
        assert_eq!(top.confidence, 85);
        assert_eq!(top.reason, "Lowest expense ratio (0.10%) in sector Tecnología");
        assert_eq!(top.pros, ["recognized low-cost manager"]);
        assert_eq!(top.cons, ["high expected volatility", "high-risk sector"]);

        let alts: Vec<_> = top.alternatives.iter().map(|a| a.symbol.as_str()).collect();
        assert_eq!(alts, ["IYW", "XLK"]);
        assert_eq!(top.alternatives[0].reason, "Expense ratio: 0.42%");

        assert!(recs.windows(2).all(|w| w[0].percentage >= w[1].percentage));
    }

    #[test]
    fn one_recommendation_per_sector_weight() {
        let engine = engine();
        for profile in engine.catalog().profiles() {
            let recs = engine.recommend(&profile.id, dec!(1000));
            assert_eq!(recs.len(), profile.allocation.len(), "{}", profile.id);

            let mut sectors: Vec<_> = recs.iter().map(|r| r.sector_id.clone()).collect();
            sectors.sort();
            sectors.dedup();
            assert_eq!(sectors.len(), recs.len());
        }
    }

    #[test]
    fn bond_pick_collects_every_pro() {
        let recs = engine().recommend("conservative", dec!(10000));
        let bonds = &recs[0];

        assert_eq!(bonds.ticker.symbol, "AGG");
        assert_eq!(bonds.confidence, 95);
        assert_eq!(
            bonds.pros,
            ["very low expense ratio", "broadly diversified", "low-risk sector", "good dividends"]
        );
        assert_eq!(bonds.cons, ["consider additional diversification"]);
        assert!(bonds.fit_analysis.starts_with("AGG fits your conservative profile because:"));
        assert!(bonds.fit_analysis.contains("• Very competitive expense ratio (0.03%)"));
    }

    #[test]
    fn energy_is_flagged_cyclical() {
        let recs = engine().recommend("dividend-income", dec!(10000));
        let energy = recs.iter().find(|r| r.sector_id == "energia").unwrap();

        assert_eq!(energy.ticker.symbol, "VDE");
        assert!(energy.cons.contains(&"cyclical and volatile sector".to_string()));
        assert!(energy.pros.contains(&"good dividends".to_string()));
    }

    #[test]
    fn pros_fall_back_when_nothing_applies() {
        let catalog = TickerCatalog::builtin();
        let sector = catalog.sector("tecnologia").unwrap();
        let (qqq, _) = catalog.find_ticker("QQQ").unwrap();

        assert_eq!(pros(qqq, sector), ["well-established ETF", "good liquidity"]);
        assert!(fit_analysis(qqq, sector, "growth").contains("• Reasonable expense ratio (0.20%)"));
    }

    #[test]
    fn unknown_profile_yields_nothing() {
        assert!(engine().recommend("yolo", dec!(10000)).is_empty());
    }

    #[test]
    fn questionnaire_to_recommendations() {
        let questionnaire = Questionnaire {
            age: Some(25),
            experience: Some(Experience::Beginner),
            time_horizon: Some(10),
            volatility_tolerance: Some(VolatilityTolerance::High),
            primary_goal: Some(PrimaryGoal::Growth),
        };
        let assessment = RiskProfiler::new().assess(&questionnaire);
        assert_eq!(assessment.profile_type.id(), "growth");

        let engine = engine();
        let recs = engine.recommend(assessment.profile_type.id(), dec!(10000));

        let template = engine.catalog().profile("growth").unwrap();
        let largest = template.allocation.iter().map(|w| w.percentage).max().unwrap();
        assert_eq!(recs[0].percentage, largest);
    }
}
