use async_trait::async_trait;

use super::{AdvisoryReport, AdvisoryRequest, LocalAdvisor, RecommendationSource, ReportSource};
use crate::error::Result;

/// Tries `primary`, answers from the rule-based advisor on any failure.
///
/// A free-text remote answer is also replaced by the local report, since
/// its allocation is a placeholder; the text is kept in `raw_response`.
pub struct FallbackAdvisor<P> {
    primary: Option<P>,
    local: LocalAdvisor,
}

impl<P: RecommendationSource> FallbackAdvisor<P> {
    pub const fn new(primary: P, local: LocalAdvisor) -> Self {
        Self {
            primary: Some(primary),
            local,
        }
    }

    /// No remote source configured
    pub const fn local_only(local: LocalAdvisor) -> Self {
        Self { primary: None, local }
    }

    pub const fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    pub const fn local(&self) -> &LocalAdvisor {
        &self.local
    }
}

#[async_trait]
impl<P: RecommendationSource> RecommendationSource for FallbackAdvisor<P> {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn analyze(&self, request: &AdvisoryRequest) -> Result<AdvisoryReport> {
        let Some(primary) = &self.primary else {
            return self.local.analyze(request).await;
        };

        match primary.analyze(request).await {
            Ok(report) if report.source == ReportSource::RemoteText => {
                tracing::warn!(source = primary.name(), "unstructured advisory answer, using rule-based report");
                let mut local = self.local.analyze(request).await?;
                local.raw_response = report.raw_response;
                Ok(local)
            }
            Ok(report) => Ok(report),
            Err(e) => {
                tracing::warn!(source = primary.name(), error = %e, "advisory source failed, using rule-based report");
                self.local.analyze(request).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use advisor_core::AdvisoryError;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::advisory::RemoteAdvisor;
    use crate::advisory::remote::tests::ScriptedProvider;
    use crate::catalog::TickerCatalog;
    use crate::profiler::{Experience, Questionnaire};

    fn advisor(answers: Vec<advisor_core::Result<String>>) -> FallbackAdvisor<RemoteAdvisor> {
        let remote = RemoteAdvisor::new(Arc::new(ScriptedProvider::new(answers)));
        FallbackAdvisor::new(remote, LocalAdvisor::new(Arc::new(TickerCatalog::builtin())))
    }

    fn request() -> AdvisoryRequest {
        AdvisoryRequest::new(Questionnaire {
            age: Some(35),
            experience: Some(Experience::Intermediate),
            time_horizon: Some(6),
            ..Questionnaire::default()
        })
    }

    #[tokio::test]
    async fn provider_failure_yields_local_report() {
        let advisor = advisor(vec![Err(AdvisoryError::Auth("bad key".into()))]);
        let report = advisor.analyze(&request()).await.unwrap();

        // 2 + 1 + 2 points
        assert_eq!(report.risk_profile, "dividend-income");
        assert_eq!(report.source, ReportSource::Local);
        assert!(report.raw_response.is_none());
    }

    #[tokio::test]
    async fn free_text_is_replaced_but_kept() {
        let advisor = advisor(vec![Ok("I'd go with an aggressive mix.".into())]);
        let report = advisor.analyze(&request()).await.unwrap();

        assert_eq!(report.source, ReportSource::Local);
        assert_eq!(report.risk_profile, "dividend-income");
        assert_eq!(report.raw_response.as_deref(), Some("I'd go with an aggressive mix."));
    }

    #[tokio::test]
    async fn structured_answer_wins() {
        let advisor = advisor(vec![Ok(r#"{"riskProfile": "aggressive", "assetAllocation": {"stocks": 95}}"#.into())]);
        let report = advisor.analyze(&request()).await.unwrap();

        assert_eq!(report.source, ReportSource::Remote);
        assert_eq!(report.asset_allocation.stocks, dec!(95));
    }

    #[tokio::test]
    async fn local_only_never_calls_out() {
        let advisor = FallbackAdvisor::<RemoteAdvisor>::local_only(LocalAdvisor::new(Arc::new(TickerCatalog::builtin())));
        assert!(!advisor.has_primary());
        let report = advisor.analyze(&request()).await.unwrap();
        assert_eq!(report.source, ReportSource::Local);
    }
}
