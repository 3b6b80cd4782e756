use std::sync::Arc;

use advisor_core::{AdvisoryError, Conversation, GenerationOptions, LlmProvider, Message};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::prompts;

/// History messages sent along with each chat question
const CHAT_WINDOW: usize = 6;
const MAX_TOKENS: u32 = 1500;

/// What the chat prompt knows about the user
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatContext {
    pub portfolio: Option<String>,
    pub risk_profile: Option<String>,
    pub investment_amount: Option<Decimal>,
}

/// Free-text advisory services. Every call answers with text: on any
/// provider failure the caller gets a fixed apology instead of an error.
pub struct AdvisoryAssistant {
    provider: Arc<dyn LlmProvider>,
    model: String,
    history: Mutex<Conversation>,
}

impl AdvisoryAssistant {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        let model = provider.info().default_model;
        Self {
            provider,
            model,
            history: Mutex::new(Conversation::new()),
        }
    }

    fn options(&self, temperature: f32) -> GenerationOptions {
        GenerationOptions::default()
            .with_model(self.model.clone())
            .with_temperature(temperature)
            .with_max_tokens(MAX_TOKENS)
    }

    async fn complete(&self, messages: &[Message], temperature: f32) -> advisor_core::Result<String> {
        let completion = self.provider.complete(messages, &self.options(temperature)).await?;
        if completion.content.trim().is_empty() {
            return Err(AdvisoryError::Parse("empty completion".into()));
        }
        Ok(completion.content)
    }

    async fn single(&self, system: &str, user: String, temperature: f32) -> advisor_core::Result<String> {
        self.complete(&[Message::system(system), Message::user(user)], temperature)
            .await
    }

    fn or_fallback(task: &str, result: advisor_core::Result<String>, fallback: String) -> String {
        result.unwrap_or_else(|e| {
            tracing::warn!(task, error = %e, "advisory text unavailable");
            fallback
        })
    }

    pub async fn portfolio_review(&self, portfolio: &[String], amount: Decimal) -> String {
        let result = self
            .single(prompts::REVIEW_SYSTEM, prompts::review(portfolio, amount), 0.4)
            .await;
        Self::or_fallback(
            "review",
            result,
            "Could not analyze the portfolio right now. Please try again later.".into(),
        )
    }

    pub async fn market_insights(&self) -> String {
        let result = self
            .single(prompts::INSIGHTS_SYSTEM, prompts::INSIGHTS_PROMPT.into(), 0.6)
            .await;
        Self::or_fallback(
            "insights",
            result,
            "Could not get market insights right now. Please try again later.".into(),
        )
    }

    pub async fn explain_etf(&self, ticker: &str) -> String {
        let result = self
            .single(prompts::EXPLAIN_SYSTEM, prompts::explain(ticker), 0.3)
            .await;
        Self::or_fallback(
            "explain",
            result,
            format!("Could not get information about {ticker}. Please try again later."),
        )
    }

    pub async fn compare_etfs(&self, first: &str, second: &str) -> String {
        let result = self
            .single(prompts::COMPARE_SYSTEM, prompts::compare(first, second), 0.4)
            .await;
        Self::or_fallback(
            "compare",
            result,
            format!("Could not compare {first} and {second}. Please try again later."),
        )
    }

    /// Answer a question in the running conversation.
    ///
    /// The question is always recorded; the answer only when one arrives.
    pub async fn ask(&self, question: &str, context: &ChatContext) -> String {
        let amount = context
            .investment_amount
            .map_or_else(|| "Not specified".to_string(), |a| format!("${a}"));
        let system = prompts::chat_system(
            context.portfolio.as_deref().unwrap_or("Not specified"),
            context.risk_profile.as_deref().unwrap_or("Not determined"),
            &amount,
        );

        let messages = {
            let mut history = self.history.lock().await;
            history.push(Message::user(question));
            history.windowed(system, CHAT_WINDOW)
        };

        match self.complete(&messages, 0.7).await {
            Ok(answer) => {
                self.history.lock().await.push(Message::assistant(answer.clone()));
                answer
            }
            Err(e) => Self::or_fallback(
                "chat",
                Err(e),
                "Sorry, I couldn't process your question right now. Please try again later.".into(),
            ),
        }
    }

    pub async fn history(&self) -> Vec<Message> {
        self.history.lock().await.messages().to_vec()
    }

    pub async fn clear_history(&self) {
        self.history.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::remote::tests::ScriptedProvider;
    use advisor_core::Role;

    #[tokio::test]
    async fn texts_use_their_own_temperatures() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok("review".into()),
            Ok("insights".into()),
            Ok("explain".into()),
            Ok("compare".into()),
        ]));
        let assistant = AdvisoryAssistant::new(provider.clone());

        assert_eq!(assistant.portfolio_review(&["SPY".into()], Decimal::ONE_HUNDRED).await, "review");
        assert_eq!(assistant.market_insights().await, "insights");
        assert_eq!(assistant.explain_etf("VOO").await, "explain");
        assert_eq!(assistant.compare_etfs("VOO", "IVV").await, "compare");

        let temps: Vec<f32> = provider.seen.lock().unwrap().iter().map(|(_, t)| *t).collect();
        let expected = [0.4_f32, 0.6, 0.3, 0.4];
        assert!(temps.iter().zip(expected).all(|(t, e)| (t - e).abs() < f32::EPSILON));
    }

    #[tokio::test]
    async fn failures_become_apologies() {
        let assistant = AdvisoryAssistant::new(Arc::new(ScriptedProvider::new(vec![])));

        assert!(assistant.explain_etf("VOO").await.contains("about VOO"));
        assert!(assistant.compare_etfs("VOO", "IVV").await.contains("compare VOO and IVV"));
        assert!(assistant.ask("Is VTI enough?", &ChatContext::default()).await.starts_with("Sorry"));

        let history = assistant.history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, Role::User);
    }

    #[tokio::test]
    async fn chat_sends_a_bounded_window() {
        let answers = (0..5).map(|i| Ok(format!("answer {i}"))).collect();
        let provider = Arc::new(ScriptedProvider::new(answers));
        let assistant = AdvisoryAssistant::new(provider.clone());

        for i in 0..5 {
            assistant.ask(&format!("question {i}"), &ChatContext::default()).await;
        }

        let sizes: Vec<usize> = provider.seen.lock().unwrap().iter().map(|(n, _)| *n).collect();
        // system prompt plus at most six history messages
        assert_eq!(sizes, [2, 4, 6, 7, 7]);
        assert_eq!(assistant.history().await.len(), 10);

        assistant.clear_history().await;
        assert!(assistant.history().await.is_empty());
    }
}
