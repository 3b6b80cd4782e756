use std::sync::Arc;

use advisor_core::{AdvisoryError, GenerationOptions, LlmProvider, Message};
use async_trait::async_trait;
use rust_decimal_macros::dec;

use super::{AdvisoryReport, AdvisoryRequest, AssetAllocation, RecommendationSource, ReportRecommendation, ReportSource, prompts};
use crate::error::Result;

const MAX_TOKENS: u32 = 1500;

/// JSON object embedded in a completion.
///
/// Markdown fences are stripped when present; otherwise, or when the fenced
/// body is empty, the first `{` to the last `}` is taken.
pub fn extract_json(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.starts_with("```") {
        let mut inner = trimmed.split_once('\n').map_or("", |(_, rest)| rest);
        if let Some(end) = inner.rfind("```") {
            inner = &inner[..end];
        }
        let inner = inner.trim();
        if !inner.is_empty() {
            return Some(inner);
        }
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    (end > start).then(|| &trimmed[start..=end])
}

fn risk_profile_from_text(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    if lower.contains("conservative") || lower.contains("low risk") {
        "conservative"
    } else if lower.contains("aggressive") || lower.contains("high risk") {
        "aggressive"
    } else {
        "balanced"
    }
}

/// A structurally complete report built from free text
fn text_report(text: &str) -> AdvisoryReport {
    AdvisoryReport {
        risk_profile: risk_profile_from_text(text).into(),
        risk_justification: "Extracted from the advisory service's free-text answer".into(),
        asset_allocation: AssetAllocation {
            bonds: dec!(40),
            stocks: dec!(60),
            ..AssetAllocation::default()
        },
        recommendations: vec![
            ReportRecommendation {
                ticker: "SPY".into(),
                name: "SPDR S&P 500 ETF".into(),
                allocation: dec!(35),
                reasoning: "Diversified S&P 500 exposure".into(),
            },
            ReportRecommendation {
                ticker: "AGG".into(),
                name: "iShares Core U.S. Aggregate Bond ETF".into(),
                allocation: dec!(40),
                reasoning: "Bond exposure for stability".into(),
            },
        ],
        personalized_tips: vec![
            "Keep a disciplined investment strategy".into(),
            "Rebalance your portfolio every 6 months".into(),
            "Don't try to time the market".into(),
        ],
        expected_return: "6-8% annual".into(),
        volatility_range: "10-15%".into(),
        source: ReportSource::RemoteText,
        raw_response: Some(text.into()),
    }
}

/// Interpret a completion: structured JSON when possible, keyword extraction otherwise
pub(crate) fn parse_report(text: &str) -> AdvisoryReport {
    let parsed = extract_json(text).and_then(|json| match serde_json::from_str::<AdvisoryReport>(json) {
        Ok(report) => Some(report),
        Err(e) => {
            tracing::warn!(error = %e, "advisory JSON did not match the report shape");
            None
        }
    });

    match parsed {
        Some(mut report) => {
            report.source = ReportSource::Remote;
            report.raw_response = None;
            report
        }
        None => text_report(text),
    }
}

/// Profile analysis by the advisory text service
#[derive(Clone)]
pub struct RemoteAdvisor {
    provider: Arc<dyn LlmProvider>,
    options: GenerationOptions,
}

impl RemoteAdvisor {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        let options = GenerationOptions::precise()
            .with_model(provider.info().default_model)
            .with_max_tokens(MAX_TOKENS);
        Self { provider, options }
    }

    #[must_use]
    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.provider.info().configured
    }
}

#[async_trait]
impl RecommendationSource for RemoteAdvisor {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn analyze(&self, request: &AdvisoryRequest) -> Result<AdvisoryReport> {
        let messages = [
            Message::system(prompts::ANALYSIS_SYSTEM),
            Message::user(prompts::analysis(request)),
        ];
        let completion = self.provider.complete(&messages, &self.options).await?;

        if completion.content.trim().is_empty() {
            return Err(AdvisoryError::Parse("empty completion".into()).into());
        }
        if completion.truncated() {
            tracing::debug!(model = %completion.model, "advisory answer hit the token limit");
        }
        Ok(parse_report(&completion.content))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use advisor_core::{Completion, FinishReason, ProviderInfo};
    use std::sync::Mutex;

    /// Replays canned answers and records the options it was called with
    pub(crate) struct ScriptedProvider {
        answers: Mutex<Vec<advisor_core::Result<String>>>,
        pub(crate) seen: Mutex<Vec<(usize, f32)>>,
    }

    impl ScriptedProvider {
        pub(crate) fn new(answers: Vec<advisor_core::Result<String>>) -> Self {
            Self {
                answers: Mutex::new(answers),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn info(&self) -> ProviderInfo {
            ProviderInfo {
                name: "scripted".into(),
                default_model: "test-model".into(),
                configured: true,
            }
        }

        async fn health_check(&self) -> advisor_core::Result<bool> {
            Ok(true)
        }

        async fn complete(
            &self,
            messages: &[Message],
            options: &GenerationOptions,
        ) -> advisor_core::Result<Completion> {
            self.seen.lock().unwrap().push((messages.len(), options.temperature));
            let mut answers = self.answers.lock().unwrap();
            let next = if answers.is_empty() {
                Err(AdvisoryError::ProviderUnavailable("script exhausted".into()))
            } else {
                answers.remove(0)
            };
            next.map(|content| Completion {
                content,
                model: options.model.clone(),
                usage: None,
                finish_reason: Some(FinishReason::Stop),
            })
        }
    }

    #[test]
    fn json_is_found_in_fences_and_prose() {
        assert_eq!(extract_json("```json\n{\"a\": 1}\n```"), Some("{\"a\": 1}"));
        assert_eq!(extract_json("```\n{\"a\": 1}```"), Some("{\"a\": 1}"));
        assert_eq!(extract_json("```json {\"a\": 1}```"), Some("{\"a\": 1}"));
        assert_eq!(extract_json("Here you go: {\"a\": {\"b\": 2}} hope it helps"), Some("{\"a\": {\"b\": 2}}"));
        assert_eq!(extract_json("no braces at all"), None);
        assert_eq!(extract_json("} backwards {"), None);
    }

    #[test]
    fn free_text_is_classified_by_keywords() {
        let report = parse_report("Given your age, a conservative approach fits best.");
        assert_eq!(report.source, ReportSource::RemoteText);
        assert_eq!(report.risk_profile, "conservative");
        assert_eq!(report.asset_allocation.bonds, dec!(40));
        assert_eq!(report.recommendations.len(), 2);
        assert_eq!(report.personalized_tips.len(), 3);
        assert!(report.raw_response.as_deref().unwrap().starts_with("Given your age"));

        assert_eq!(parse_report("This is a HIGH RISK plan").risk_profile, "aggressive");
        assert_eq!(parse_report("nothing decisive").risk_profile, "balanced");
    }

    #[test]
    fn braces_without_a_report_fall_back_to_text() {
        let report = parse_report("Use {SPY} and {AGG}");
        assert_eq!(report.source, ReportSource::RemoteText);
    }

    #[tokio::test]
    async fn structured_answer_is_used_as_is() {
        let answer = "```json\n{\"riskProfile\": \"growth\", \"assetAllocation\": {\"bonds\": \"20%\", \"stocks\": \"80%\"}}\n```";
        let provider = Arc::new(ScriptedProvider::new(vec![Ok(answer.into())]));
        let advisor = RemoteAdvisor::new(provider.clone());

        let report = advisor.analyze(&AdvisoryRequest::default()).await.unwrap();
        assert_eq!(report.source, ReportSource::Remote);
        assert_eq!(report.risk_profile, "growth");
        assert_eq!(report.asset_allocation.stocks, dec!(80));
        assert!(report.raw_response.is_none());

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen[0].0, 2);
        assert!((seen[0].1 - 0.3).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn transport_failure_is_an_error() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err(AdvisoryError::Http {
            status: 500,
            body: "boom".into(),
        })]));
        let advisor = RemoteAdvisor::new(provider);
        assert!(advisor.analyze(&AdvisoryRequest::default()).await.is_err());
    }

    #[tokio::test]
    async fn blank_answer_is_an_error() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok("   ".into())]));
        let advisor = RemoteAdvisor::new(provider);
        assert!(advisor.analyze(&AdvisoryRequest::default()).await.is_err());
    }
}
