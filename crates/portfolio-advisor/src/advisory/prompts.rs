//! Prompt text for the advisory service.

use rust_decimal::Decimal;

use super::AdvisoryRequest;

pub const ANALYSIS_SYSTEM: &str = r"You are an expert financial advisor specializing in investor risk profiling and ETF recommendations.

Analyze the user's answers and produce:
1. A detailed assessment of their risk profile
2. Specific ETF recommendations with justification
3. A personalized asset allocation strategy
4. Practical, specific tips

Focus on popular, well-diversified ETFs. Be specific with percentages and tickers.";

const ANALYSIS_FORMAT: &str = r#"Format your answer as JSON with this structure:
{
  "riskProfile": "conservative/moderate/aggressive",
  "riskJustification": "explanation of the profile",
  "assetAllocation": {
    "bonds": "percentage",
    "stocks": "percentage",
    "international": "percentage",
    "alternatives": "percentage"
  },
  "recommendations": [
    {"ticker": "SPY", "name": "SPDR S&P 500 ETF", "allocation": "25%", "reasoning": "specific reason"}
  ],
  "personalizedTips": ["tip 1", "tip 2"],
  "expectedReturn": "expected return range",
  "volatilityRange": "volatility range"
}"#;

pub const REVIEW_SYSTEM: &str = "You are a financial advisor who reviews investment portfolios. \
Analyze the current portfolio and give specific improvement recommendations. \
Focus on diversification, costs and asset allocation.";

pub const INSIGHTS_SYSTEM: &str = "You are an expert financial markets analyst. \
Give current insights on the US stock market, sector trends and strategic allocation. \
Focus on ETFs and keep a professional but accessible tone.";

pub const INSIGHTS_PROMPT: &str = r"Give a current market analysis with:

1. Overall market state (S&P 500, NASDAQ)
2. Sectors with the best recent performance
3. Sectors to avoid or reduce exposure to
4. Tactical recommendations for the next 3-6 months
5. Specific ETFs that are doing well

Keep it concise but informative (300 words at most).";

pub const EXPLAIN_SYSTEM: &str = "You are an ETF expert who explains financial products clearly. \
Give detailed but accessible information about specific ETFs.";

pub const COMPARE_SYSTEM: &str = "You are a financial analyst who compares ETFs to help investors decide. \
Give objective, balanced comparisons.";

fn or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".into()
    } else {
        items.join(", ")
    }
}

pub fn analysis(request: &AdvisoryRequest) -> String {
    let answers = serde_json::to_string_pretty(&request.questionnaire).unwrap_or_default();
    format!(
        "Analyze this investor profile.\n\n\
         QUESTIONNAIRE ANSWERS:\n{answers}\n\n\
         CURRENT PORTFOLIO: {}\n\n\
         Please provide:\n\
         1. The determined risk profile and its justification\n\
         2. A recommended asset allocation (specific %)\n\
         3. 5-7 recommended ETFs with specific tickers and reasons\n\
         4. 3-5 personalized practical tips\n\n\
         {ANALYSIS_FORMAT}",
        or_none(&request.current_portfolio),
    )
}

pub fn review(portfolio: &[String], amount: Decimal) -> String {
    format!(
        "Review this investment portfolio:\n\n\
         CURRENT PORTFOLIO: {}\n\
         AMOUNT INVESTED: ${amount}\n\n\
         Provide:\n\
         1. Analysis of the current diversification\n\
         2. Risk concentrations\n\
         3. Rebalancing suggestions\n\
         4. Lower-cost alternative ETFs\n\
         5. An overall portfolio score (1-10)\n\n\
         Keep the recommendations specific and actionable.",
        or_none(portfolio),
    )
}

pub fn chat_system(portfolio: &str, risk_profile: &str, amount: &str) -> String {
    format!(
        "You are an expert financial advisor specializing in ETFs and passive investing.\n\
         Answer investment questions clearly and educationally.\n\n\
         USER CONTEXT:\n\
         - Current portfolio: {portfolio}\n\
         - Risk profile: {risk_profile}\n\
         - Amount invested: {amount}\n\n\
         Keep your answers educational and easy to follow, specific with tickers when relevant, \
         balanced about risks and benefits, and practical."
    )
}

pub fn explain(ticker: &str) -> String {
    format!(
        "Explain the ETF {ticker}, including:\n\n\
         1. What it is and what it tracks\n\
         2. Top holdings (top 5-10)\n\
         3. Expense ratio and costs\n\
         4. Typical historical performance\n\
         5. What kind of investor it suits\n\
         6. Advantages and disadvantages\n\n\
         Keep the explanation clear and educational (250 words at most)."
    )
}

pub fn compare(first: &str, second: &str) -> String {
    format!(
        "Compare these two ETFs: {first} vs {second}\n\n\
         Include:\n\
         1. Main differences in strategy and holdings\n\
         2. Expense ratio comparison\n\
         3. Relative historical performance\n\
         4. Which may suit different profiles better\n\
         5. A final recommendation with justification\n\n\
         Keep the comparison objective and educational (300 words at most)."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::Questionnaire;

    #[test]
    fn analysis_prompt_carries_answers_and_format() {
        let request = AdvisoryRequest {
            questionnaire: Questionnaire {
                age: Some(41),
                ..Questionnaire::default()
            },
            current_portfolio: vec!["SPY".into(), "QQQ".into()],
            investment_amount: None,
        };
        let prompt = analysis(&request);
        assert!(prompt.contains("\"age\": 41"));
        assert!(prompt.contains("CURRENT PORTFOLIO: SPY, QQQ"));
        assert!(prompt.contains("\"assetAllocation\""));

        assert!(analysis(&AdvisoryRequest::default()).contains("CURRENT PORTFOLIO: None"));
    }
}
