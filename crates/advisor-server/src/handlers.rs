//! HTTP Handlers

use std::collections::BTreeMap;

use advisor_core::AdvisoryError;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use portfolio_advisor::allocation::{self, AllocationBreakdown, Bucket, Composition, PriceBook, TickerSelection};
use portfolio_advisor::auth::UserIdentity;
use portfolio_advisor::catalog::{MarketAnalysis, SearchHit};
use portfolio_advisor::insights::{self, MarketInsights, Scenario, ScenarioOutcome};
use portfolio_advisor::model::{Profile, Sector, normalize_symbol};
use portfolio_advisor::quote::{HistoryPeriod, PricePoint, Quote, QuoteSource, Watchlist};
use portfolio_advisor::settings::{ApiKeyKind, AppSettings, DataSource, KEY_MASK};
use portfolio_advisor::storage::{SavedProfile, Snapshot};
use portfolio_advisor::{
    AdvisorError, AdvisoryReport, AdvisoryRequest, Questionnaire, Recommendation, RecommendationSource,
    RiskAssessment, RiskProfiler, advisory::ChatContext, advisory::DEFAULT_ADVISORY_AMOUNT,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Slot for profile analyses; a newer analysis cancels the one in flight
const ANALYSIS_SLOT: &str = "analysis";

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub advisory_configured: bool,
    pub data_source: DataSource,
    pub quote_provider: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub period: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AmountParams {
    pub amount: Option<Decimal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketResponse {
    pub analysis: MarketAnalysis,
    pub insights: MarketInsights,
    /// One-year outcomes for the stored investment amount
    pub scenarios: BTreeMap<Scenario, ScenarioOutcome>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessRequest {
    #[serde(default)]
    pub questionnaire: Questionnaire,
    pub investment_amount: Option<Decimal>,
    /// Save the answers under this profile name
    pub save_as: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessResponse {
    pub assessment: RiskAssessment,
    pub recommendations: Vec<Recommendation>,
    pub tips: Vec<String>,
    pub saved: Option<SavedProfile>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub context: ChatContext,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub message: String,
    pub answered_by: String,
}

#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct TickerRequest {
    pub symbol: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub authenticated: bool,
    pub user: Option<UserIdentity>,
}

// ============================================================================
// Error mapping
// ============================================================================

fn reject(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

fn api_error(err: AdvisorError) -> ApiError {
    match &err {
        AdvisorError::Validation(v) => reject(StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", v.to_string()),
        AdvisorError::UnsupportedProfile(_) => reject(StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        AdvisorError::Advisory(e @ AdvisoryError::Superseded(_)) => {
            reject(StatusCode::CONFLICT, "SUPERSEDED", e.user_message())
        }
        AdvisorError::Advisory(e) => {
            tracing::error!("Advisory error: {}", e);
            reject(StatusCode::INTERNAL_SERVER_ERROR, "ADVISORY_ERROR", e.user_message())
        }
        _ => {
            tracing::error!("Unexpected error: {}", err);
            reject(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "An unexpected error occurred.")
        }
    }
}

fn parse_symbol(raw: &str) -> Result<String, ApiError> {
    normalize_symbol(raw).map_err(|e| api_error(e.into()))
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        advisory_configured: state.advisor.has_primary(),
        data_source: state.data_source,
        quote_provider: state.market.provider_name().to_string(),
    })
}

pub async fn list_sectors(State(state): State<AppState>) -> Json<Vec<Sector>> {
    Json(state.catalog.sectors().to_vec())
}

pub async fn list_profiles(State(state): State<AppState>) -> Json<Vec<Profile>> {
    Json(state.catalog.profiles().to_vec())
}

pub async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<Vec<SearchHit>> {
    Json(state.catalog.search(&params.q))
}

pub async fn market_analysis(State(state): State<AppState>) -> Json<MarketResponse> {
    let amount = state.preferences.lock().await.investment_amount();
    let analysis = state.catalog.market_analysis().clone();
    Json(MarketResponse {
        insights: MarketInsights::from_analysis(&analysis),
        analysis,
        scenarios: insights::simulate_scenarios(Some(amount)),
    })
}

pub async fn get_quote(State(state): State<AppState>, Path(symbol): Path<String>) -> ApiResult<Quote> {
    let symbol = parse_symbol(&symbol)?;
    let quote = state.market.quote(&symbol).await.map_err(api_error)?;
    Ok(Json(quote))
}

pub async fn get_history(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<Vec<PricePoint>> {
    let symbol = parse_symbol(&symbol)?;
    let period = params
        .period
        .as_deref()
        .map_or_else(HistoryPeriod::default, HistoryPeriod::parse_or_default);
    let series = state.market.history(&symbol, period).await.map_err(api_error)?;
    Ok(Json(series))
}

pub async fn clear_quote_cache(State(state): State<AppState>) -> StatusCode {
    state.market.clear_cache().await;
    StatusCode::NO_CONTENT
}

/// Questionnaire → assessment, engine output and tips
pub async fn assess(State(state): State<AppState>, Json(payload): Json<AssessRequest>) -> ApiResult<AssessResponse> {
    payload
        .questionnaire
        .validate()
        .map_err(|e| api_error(e.into()))?;

    let assessment = RiskProfiler::new().assess(&payload.questionnaire);
    let amount = match payload.investment_amount {
        Some(amount) => allocation::validate_amount(amount).map_err(|e| api_error(e.into()))?,
        None => DEFAULT_ADVISORY_AMOUNT,
    };
    let recommendations = state
        .advisor
        .local()
        .engine()
        .recommend(assessment.profile_type.id(), amount);

    let saved = match payload.save_as.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => {
            let profile = SavedProfile::new(name, payload.questionnaire.clone(), &assessment);
            state
                .preferences
                .lock()
                .await
                .save_profile(profile.clone())
                .map_err(api_error)?;
            Some(profile)
        }
        None => None,
    };

    Ok(Json(AssessResponse {
        tips: insights::personalized_tips(assessment.profile_type),
        assessment,
        recommendations,
        saved,
    }))
}

pub async fn recommendations(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
    Query(params): Query<AmountParams>,
) -> ApiResult<Vec<Recommendation>> {
    if state.catalog.profile(&profile_id).is_none() {
        return Err(api_error(AdvisorError::UnsupportedProfile(profile_id)));
    }
    let amount = allocation::validate_amount(params.amount.unwrap_or(DEFAULT_ADVISORY_AMOUNT))
        .map_err(|e| api_error(e.into()))?;

    Ok(Json(state.advisor.local().engine().recommend(&profile_id, amount)))
}

/// Remote analysis with rule-based fallback
pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AdvisoryRequest>,
) -> ApiResult<AdvisoryReport> {
    let advisor = state.advisor.clone();
    let report = state
        .slots
        .run(ANALYSIS_SLOT, async move { advisor.analyze(&request).await })
        .await
        .map_err(api_error)?;
    Ok(Json(report))
}

pub async fn chat(State(state): State<AppState>, Json(payload): Json<ChatRequest>) -> Json<ChatResponse> {
    let Some(assistant) = state.assistant.as_ref() else {
        return Json(ChatResponse {
            message: AdvisoryError::Config("no advisory provider".into()).user_message(),
            answered_by: "none".into(),
        });
    };

    let message = assistant.ask(&payload.message, &payload.context).await;
    Json(ChatResponse {
        message,
        answered_by: "assistant".into(),
    })
}

pub async fn get_composition(State(state): State<AppState>) -> Json<Composition> {
    Json(state.preferences.lock().await.composition())
}

pub async fn put_composition(
    State(state): State<AppState>,
    Json(composition): Json<Composition>,
) -> ApiResult<Composition> {
    let saved = state
        .preferences
        .lock()
        .await
        .save_composition(composition)
        .map_err(api_error)?;
    Ok(Json(saved))
}

/// Breakdown of the stored amount over the stored composition
async fn current_allocation(state: &AppState) -> AllocationBreakdown {
    let (composition, amount, selection) = {
        let prefs = state.preferences.lock().await;
        (prefs.composition(), prefs.investment_amount(), prefs.selection())
    };

    let mut book = PriceBook::new(state.generator.clone(), state.market.fallback().today());
    if state.data_source == DataSource::AlphaVantage {
        for bucket in Bucket::ALL {
            let symbol = selection.get(bucket);
            let live = state.market.quote(symbol).await.ok().filter(|q| q.source == QuoteSource::Live);
            let Some(quote) = live else { continue };
            if book.record_live_price(symbol, quote.price, &selection) {
                tracing::debug!(symbol, price = %quote.price, %bucket, "live price for selected ticker");
            }
        }
    }

    allocation::allocate(&composition, amount, &selection, &book)
}

pub async fn get_allocation(State(state): State<AppState>) -> Json<AllocationBreakdown> {
    Json(current_allocation(&state).await)
}

pub async fn put_amount(
    State(state): State<AppState>,
    Json(payload): Json<AmountRequest>,
) -> ApiResult<AllocationBreakdown> {
    state
        .preferences
        .lock()
        .await
        .set_investment_amount(payload.amount)
        .map_err(api_error)?;
    Ok(Json(current_allocation(&state).await))
}

pub async fn put_selection(
    State(state): State<AppState>,
    Json(selection): Json<TickerSelection>,
) -> ApiResult<AllocationBreakdown> {
    state
        .preferences
        .lock()
        .await
        .save_selection(&selection)
        .map_err(api_error)?;
    Ok(Json(current_allocation(&state).await))
}

async fn current_watchlist(state: &AppState) -> ApiResult<Watchlist> {
    let tickers = state.preferences.lock().await.tickers();
    let watchlist = state.market.watchlist(&tickers).await.map_err(api_error)?;
    Ok(Json(watchlist))
}

pub async fn get_watchlist(State(state): State<AppState>) -> ApiResult<Watchlist> {
    current_watchlist(&state).await
}

pub async fn add_to_watchlist(
    State(state): State<AppState>,
    Json(payload): Json<TickerRequest>,
) -> ApiResult<Watchlist> {
    state
        .preferences
        .lock()
        .await
        .add_ticker(&payload.symbol)
        .map_err(api_error)?;
    current_watchlist(&state).await
}

pub async fn remove_from_watchlist(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> ApiResult<Watchlist> {
    let removed = state
        .preferences
        .lock()
        .await
        .remove_ticker(&symbol)
        .map_err(api_error)?;
    if !removed {
        tracing::debug!(%symbol, "ticker was not in the watch list");
    }
    current_watchlist(&state).await
}

pub async fn list_saved_profiles(State(state): State<AppState>) -> Json<Vec<SavedProfile>> {
    Json(state.preferences.lock().await.profiles())
}

pub async fn delete_saved_profile(State(state): State<AppState>, Path(name): Path<String>) -> Result<StatusCode, ApiError> {
    let deleted = state
        .preferences
        .lock()
        .await
        .delete_profile(&name)
        .map_err(api_error)?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(reject(StatusCode::NOT_FOUND, "NOT_FOUND", format!("No saved profile named '{name}'")))
    }
}

pub async fn get_settings(State(state): State<AppState>) -> Json<AppSettings> {
    Json(state.preferences.lock().await.settings().redacted())
}

/// Key fields carry plaintext replacements; empty or masked values keep the stored key
pub async fn put_settings(
    State(state): State<AppState>,
    Json(incoming): Json<AppSettings>,
) -> ApiResult<AppSettings> {
    let mut prefs = state.preferences.lock().await;
    let current = prefs.settings();
    let mut next = AppSettings {
        openai_api_key: current.openai_api_key,
        alpha_vantage_api_key: current.alpha_vantage_api_key,
        ..incoming.clone()
    };

    for (kind, raw) in [
        (ApiKeyKind::OpenAi, incoming.openai_api_key.trim()),
        (ApiKeyKind::AlphaVantage, incoming.alpha_vantage_api_key.trim()),
    ] {
        if !raw.is_empty() && raw != KEY_MASK {
            next.set_api_key(kind, raw).map_err(|e| api_error(e.into()))?;
        }
    }

    prefs.save_settings(&next).map_err(api_error)?;
    Ok(Json(next.redacted()))
}

pub async fn export_preferences(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.preferences.lock().await.export())
}

pub async fn import_preferences(
    State(state): State<AppState>,
    Json(document): Json<serde_json::Value>,
) -> Result<StatusCode, ApiError> {
    state
        .preferences
        .lock()
        .await
        .import(&document)
        .map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn session(State(state): State<AppState>) -> Json<SessionResponse> {
    let user = state.auth.current_user().await;
    Json(SessionResponse {
        authenticated: user.is_some(),
        user,
    })
}
