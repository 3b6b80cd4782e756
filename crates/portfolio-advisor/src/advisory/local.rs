use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{AdvisoryReport, AdvisoryRequest, AssetAllocation, RecommendationSource, ReportRecommendation, ReportSource};
use crate::catalog::TickerCatalog;
use crate::error::Result;
use crate::insights::personalized_tips;
use crate::profiler::{MAX_SCORE, RiskProfiler};
use crate::recommendation::RecommendationEngine;

/// Amount used to size recommendations when the request carries none
pub const DEFAULT_ADVISORY_AMOUNT: Decimal = dec!(10000);

const BOND_SECTOR_ID: &str = "bonos";

/// Rule-based source: risk profiler followed by the recommendation engine
#[derive(Clone, Debug)]
pub struct LocalAdvisor {
    profiler: RiskProfiler,
    engine: RecommendationEngine,
}

impl LocalAdvisor {
    pub const fn new(catalog: Arc<TickerCatalog>) -> Self {
        Self {
            profiler: RiskProfiler::new(),
            engine: RecommendationEngine::new(catalog),
        }
    }

    pub const fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }

    /// Never touches the network, so never fails on valid input
    pub fn report(&self, request: &AdvisoryRequest) -> Result<AdvisoryReport> {
        request.questionnaire.validate()?;

        let assessment = self.profiler.assess(&request.questionnaire);
        let profile_id = assessment.profile_type.id();
        let amount = request
            .investment_amount
            .filter(|a| *a > Decimal::ZERO)
            .unwrap_or(DEFAULT_ADVISORY_AMOUNT);

        let bonds = self
            .engine
            .catalog()
            .profile(profile_id)
            .and_then(|p| p.weight_for(BOND_SECTOR_ID))
            .unwrap_or_default();

        let recommendations = self
            .engine
            .recommend(profile_id, amount)
            .into_iter()
            .map(|r| ReportRecommendation {
                ticker: r.ticker.symbol,
                name: r.ticker.name,
                allocation: r.percentage,
                reasoning: r.reason,
            })
            .collect();

        let characteristics = assessment.characteristics;
        Ok(AdvisoryReport {
            risk_profile: profile_id.into(),
            risk_justification: format!(
                "Rule-based assessment: risk score {}/{MAX_SCORE} over a {}-year horizon",
                assessment.risk_score, assessment.time_horizon_years
            ),
            asset_allocation: AssetAllocation {
                bonds,
                stocks: Decimal::ONE_HUNDRED - bonds,
                international: Decimal::ZERO,
                alternatives: Decimal::ZERO,
            },
            recommendations,
            personalized_tips: personalized_tips(assessment.profile_type),
            expected_return: characteristics.expected_return,
            volatility_range: characteristics.volatility,
            source: ReportSource::Local,
            raw_response: None,
        })
    }
}

#[async_trait]
impl RecommendationSource for LocalAdvisor {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn analyze(&self, request: &AdvisoryRequest) -> Result<AdvisoryReport> {
        self.report(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AdvisorError, ValidationError};
    use crate::profiler::{Experience, PrimaryGoal, Questionnaire, VolatilityTolerance};

    fn advisor() -> LocalAdvisor {
        LocalAdvisor::new(Arc::new(TickerCatalog::builtin()))
    }

    #[tokio::test]
    async fn cautious_answers_get_a_conservative_report() {
        let request = AdvisoryRequest::new(Questionnaire {
            age: Some(70),
            experience: Some(Experience::Beginner),
            time_horizon: Some(1),
            volatility_tolerance: Some(VolatilityTolerance::VeryLow),
            primary_goal: Some(PrimaryGoal::CapitalPreservation),
        });

        let report = advisor().analyze(&request).await.unwrap();
        assert_eq!(report.risk_profile, "conservative");
        assert_eq!(report.source, ReportSource::Local);
        assert_eq!(report.asset_allocation.bonds, dec!(70));
        assert_eq!(report.asset_allocation.stocks, dec!(30));
        assert_eq!(report.recommendations[0].ticker, "AGG");
        assert_eq!(report.recommendations[0].allocation, dec!(70));
        assert_eq!(report.expected_return, "4-6% anual");
        assert!(report.risk_justification.contains("risk score 0/17"));
        assert_eq!(report.personalized_tips.len(), 4);
    }

    #[tokio::test]
    async fn empty_questionnaire_still_reports() {
        let report = advisor().analyze(&AdvisoryRequest::default()).await.unwrap();
        assert_eq!(report.risk_profile, "conservative");
        assert!(!report.recommendations.is_empty());
    }

    #[tokio::test]
    async fn impossible_age_is_rejected() {
        let request = AdvisoryRequest::new(Questionnaire {
            age: Some(300),
            ..Questionnaire::default()
        });
        let err = advisor().analyze(&request).await.unwrap_err();
        assert!(matches!(err, AdvisorError::Validation(ValidationError::AgeOutOfRange(300))));
    }
}
