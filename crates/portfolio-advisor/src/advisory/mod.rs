//! Advisory Sources
//!
//! A questionnaire goes in, an [`AdvisoryReport`] comes out. Three sources
//! share the [`RecommendationSource`] seam:
//!
//! ```text
//! ┌──────────────────┐   Err / unusable text   ┌──────────────────┐
//! │  RemoteAdvisor   │ ──────────────────────▶ │   LocalAdvisor   │
//! │  (LLM, t = 0.3)  │                         │ (profiler + eng) │
//! └──────────────────┘                         └──────────────────┘
//!          ▲                                            ▲
//!          └──────────────── FallbackAdvisor ───────────┘
//! ```
//!
//! The fallback path is part of the contract: callers always get a report.

mod assistant;
mod fallback;
mod local;
mod prompts;
mod remote;
mod slots;

pub use assistant::{AdvisoryAssistant, ChatContext};
pub use fallback::FallbackAdvisor;
pub use local::{DEFAULT_ADVISORY_AMOUNT, LocalAdvisor};
pub use remote::{RemoteAdvisor, extract_json};
pub use slots::RequestSlots;

use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::profiler::{ProfileType, Questionnaire};

/// Inputs to a profile analysis
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdvisoryRequest {
    pub questionnaire: Questionnaire,
    /// Symbols already held
    pub current_portfolio: Vec<String>,
    pub investment_amount: Option<Decimal>,
}

impl AdvisoryRequest {
    pub fn new(questionnaire: Questionnaire) -> Self {
        Self {
            questionnaire,
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportSource {
    /// Rule-based profiler and recommendation engine
    #[default]
    Local,
    /// Structured JSON from the advisory service
    Remote,
    /// Free text from the advisory service, fields extracted by keyword
    RemoteText,
}

/// Percentages in `[0, 100]`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetAllocation {
    #[serde(deserialize_with = "lenient_percent")]
    pub bonds: Decimal,
    #[serde(deserialize_with = "lenient_percent")]
    pub stocks: Decimal,
    #[serde(deserialize_with = "lenient_percent")]
    pub international: Decimal,
    #[serde(deserialize_with = "lenient_percent")]
    pub alternatives: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecommendation {
    pub ticker: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_percent")]
    pub allocation: Decimal,
    #[serde(default)]
    pub reasoning: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryReport {
    pub risk_profile: String,
    #[serde(default)]
    pub risk_justification: String,
    #[serde(default)]
    pub asset_allocation: AssetAllocation,
    #[serde(default)]
    pub recommendations: Vec<ReportRecommendation>,
    #[serde(default)]
    pub personalized_tips: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub expected_return: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub volatility_range: String,
    #[serde(default)]
    pub source: ReportSource,
    /// Advisory service text the report was extracted from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl AdvisoryReport {
    /// Best-effort mapping of the free-form profile label onto a profile type
    pub fn profile_type(&self) -> Option<ProfileType> {
        let label = self.risk_profile.trim().to_lowercase().replace([' ', '_'], "-");
        ProfileType::from_id(&label).or_else(|| match label.as_str() {
            "moderate" | "moderado" => Some(ProfileType::Balanced),
            "conservador" => Some(ProfileType::Conservative),
            "agresivo" => Some(ProfileType::Aggressive),
            "income" | "dividend" => Some(ProfileType::DividendIncome),
            _ => None,
        })
    }
}

/// A source of profile analyses
#[async_trait]
pub trait RecommendationSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn analyze(&self, request: &AdvisoryRequest) -> Result<AdvisoryReport>;
}

/// `25`, `25.5`, `"25%"` and `" 25 "` all read as 25; anything else as zero
fn lenient_percent<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Decimal, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(parse_percent(&value).unwrap_or_default())
}

fn parse_percent(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn report_reads_loose_service_json() {
        let report: AdvisoryReport = serde_json::from_value(json!({
            "riskProfile": "moderate",
            "riskJustification": "Long horizon, medium tolerance",
            "assetAllocation": {"bonds": "40%", "stocks": 45, "international": "10", "alternatives": "n/a"},
            "recommendations": [
                {"ticker": "VTI", "name": "Vanguard Total Stock Market", "allocation": "30%", "reasoning": "core"},
                {"ticker": "BND"}
            ],
            "personalizedTips": ["Rebalance yearly"],
            "expectedReturn": "6-8%",
            "volatilityRange": 12
        }))
        .unwrap();

        assert_eq!(report.asset_allocation.bonds, dec!(40));
        assert_eq!(report.asset_allocation.stocks, dec!(45));
        assert_eq!(report.asset_allocation.international, dec!(10));
        assert_eq!(report.asset_allocation.alternatives, Decimal::ZERO);
        assert_eq!(report.recommendations[0].allocation, dec!(30));
        assert_eq!(report.recommendations[1].allocation, Decimal::ZERO);
        assert_eq!(report.volatility_range, "12");
        assert_eq!(report.source, ReportSource::Local);
        assert_eq!(report.profile_type(), Some(ProfileType::Balanced));
    }

    #[test]
    fn report_needs_a_profile() {
        assert!(serde_json::from_value::<AdvisoryReport>(json!({"personalizedTips": []})).is_err());
    }

    #[test]
    fn profile_labels() {
        let label = |s: &str| AdvisoryReport {
            risk_profile: s.into(),
            ..sample()
        };
        assert_eq!(label("Dividend Income").profile_type(), Some(ProfileType::DividendIncome));
        assert_eq!(label("agresivo").profile_type(), Some(ProfileType::Aggressive));
        assert_eq!(label("???").profile_type(), None);
    }

    #[test]
    fn request_defaults() {
        let request: AdvisoryRequest = serde_json::from_value(json!({
            "questionnaire": {"age": "30"},
            "currentPortfolio": ["SPY"]
        }))
        .unwrap();
        assert_eq!(request.questionnaire.age, Some(30));
        assert_eq!(request.current_portfolio, ["SPY"]);
        assert_eq!(request.investment_amount, None);
    }

    fn sample() -> AdvisoryReport {
        serde_json::from_value(json!({"riskProfile": "balanced"})).unwrap()
    }
}
