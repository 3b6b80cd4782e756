//! Market insights, scenario outcomes and personalized tips.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::catalog::{MarketAnalysis, SectorCalls};
use crate::profiler::ProfileType;

const GENERAL_TIPS: [&str; 2] = [
    "Review expense ratios regularly; small differences compound over time",
    "Don't try to time the market; consistency is what matters",
];

/// Profile tips followed by the general ones
pub fn personalized_tips(profile: ProfileType) -> Vec<String> {
    let specific: &[&str] = match profile {
        ProfileType::Conservative => &[
            "Consider rebalancing quarterly to keep the target allocation",
            "Treasury bonds can add extra stability",
        ],
        ProfileType::Balanced => &[
            "Review your portfolio every six months to stay balanced",
            "Consider dollar-cost averaging to reduce timing risk",
        ],
        ProfileType::Growth => &[
            "Keep at least six months of expenses in cash before investing",
            "International diversification can reduce risk",
        ],
        ProfileType::Aggressive => &[
            "Be patient; aggressive portfolios need time to show results",
            "Consider keeping some exposure to emerging markets",
        ],
        ProfileType::DividendIncome => &[],
    };

    specific
        .iter()
        .chain(GENERAL_TIPS.iter())
        .map(ToString::to_string)
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Bull,
    Bear,
    Sideways,
}

impl Scenario {
    pub const ALL: [Self; 3] = [Self::Bull, Self::Bear, Self::Sideways];

    /// Annual return in percent
    pub const fn expected_return(self) -> Decimal {
        match self {
            Self::Bull => dec!(12),
            Self::Bear => dec!(-15),
            Self::Sideways => dec!(3),
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Bull => "Bull market: strong economic growth and high confidence",
            Self::Bear => "Bear market: economic recession and high volatility",
            Self::Sideways => "Sideways market: moderate growth and normal volatility",
        }
    }

    pub const fn recommendation(self) -> &'static str {
        match self {
            Self::Bull => "Stay the course and rebalance if allocations drift far from target",
            Self::Bear => "Don't panic; look for buying opportunities if you have cash available",
            Self::Sideways => "Focus on dividend income and regular rebalancing",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioOutcome {
    pub expected_return: Decimal,
    pub description: String,
    pub recommendation: String,
    /// Projected one-year value when an amount was given
    pub projected_value: Option<Decimal>,
}

pub fn simulate_scenarios(amount: Option<Decimal>) -> BTreeMap<Scenario, ScenarioOutcome> {
    Scenario::ALL
        .into_iter()
        .map(|scenario| {
            let expected_return = scenario.expected_return();
            let outcome = ScenarioOutcome {
                expected_return,
                description: scenario.description().into(),
                recommendation: scenario.recommendation().into(),
                projected_value: amount
                    .map(|a| (a * (Decimal::ONE_HUNDRED + expected_return) / Decimal::ONE_HUNDRED).round_dp(2)),
            };
            (scenario, outcome)
        })
        .collect()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketInsights {
    pub market_phase: String,
    pub key_insights: Vec<String>,
    pub sector_recommendations: SectorCalls,
    pub rationale: BTreeMap<String, String>,
}

impl MarketInsights {
    pub fn from_analysis(analysis: &MarketAnalysis) -> Self {
        Self {
            market_phase: analysis.conditions.market_phase.clone(),
            key_insights: [
                "The market is in an expansion phase, favoring cyclical sectors",
                "Neutral interest rates benefit the financial sector",
                "Technological innovation keeps driving the tech sector",
                "Utilities look relatively less attractive",
            ]
            .map(String::from)
            .to_vec(),
            sector_recommendations: analysis.recommendations.clone(),
            rationale: analysis.rationale.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TickerCatalog;

    #[test]
    fn tips_end_with_general_advice() {
        let tips = personalized_tips(ProfileType::Growth);
        assert_eq!(tips.len(), 4);
        assert!(tips[0].contains("six months of expenses"));
        assert_eq!(tips[3], GENERAL_TIPS[1]);

        assert_eq!(personalized_tips(ProfileType::DividendIncome).len(), 2);
    }

    #[test]
    fn scenario_projection() {
        let outcomes = simulate_scenarios(Some(dec!(10000)));
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[&Scenario::Bull].projected_value, Some(dec!(11200)));
        assert_eq!(outcomes[&Scenario::Bear].projected_value, Some(dec!(8500)));
        assert_eq!(outcomes[&Scenario::Sideways].expected_return, dec!(3));

        assert!(simulate_scenarios(None).values().all(|o| o.projected_value.is_none()));
    }

    #[test]
    fn insights_reflect_catalog_outlook() {
        let catalog = TickerCatalog::builtin();
        let insights = MarketInsights::from_analysis(catalog.market_analysis());
        assert_eq!(insights.market_phase, "Expansión");
        assert_eq!(insights.key_insights.len(), 4);
        assert!(insights.sector_recommendations.overweight.contains(&"tecnologia".to_string()));
    }
}
