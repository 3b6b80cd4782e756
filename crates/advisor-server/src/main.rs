//! ETF Portfolio Advisor HTTP Server
//!
//! Local, single-user JSON API behind the browser dashboard. Services are
//! wired once at startup; everything the user saves lives in memory for the
//! lifetime of the process.

mod config;
mod handlers;
mod state;

use std::sync::Arc;

use advisor_core::LlmProvider;
use advisor_runtime::{OpenAiConfig, OpenAiProvider};
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use portfolio_advisor::quote::SystemClock;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::handlers::{
    add_to_watchlist, analyze, assess, chat, clear_quote_cache, delete_saved_profile, export_preferences,
    get_allocation, get_composition, get_history, get_quote, get_settings, get_watchlist, health_check,
    import_preferences, list_profiles, list_saved_profiles, list_sectors, market_analysis, put_amount,
    put_composition, put_selection, put_settings, recommendations, remove_from_watchlist, search, session,
};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health & info
        .route("/health", get(health_check))
        .route("/api/session", get(session))

        // Catalog
        .route("/api/sectors", get(list_sectors))
        .route("/api/profiles", get(list_profiles))
        .route("/api/search", get(search))
        .route("/api/market/analysis", get(market_analysis))

        // Quotes
        .route("/api/quotes/{symbol}", get(get_quote))
        .route("/api/quotes/{symbol}/history", get(get_history))
        .route("/api/quotes/cache/clear", post(clear_quote_cache))

        // Profiling & advisory
        .route("/api/assess", post(assess))
        .route("/api/recommendations/{profile}", get(recommendations))
        .route("/api/advisory/analyze", post(analyze))
        .route("/api/advisory/chat", post(chat))
        .route("/api/saved-profiles", get(list_saved_profiles))
        .route("/api/saved-profiles/{name}", delete(delete_saved_profile))

        // Allocation
        .route("/api/composition", get(get_composition).put(put_composition))
        .route("/api/allocation", get(get_allocation))
        .route("/api/allocation/amount", put(put_amount))
        .route("/api/allocation/selection", put(put_selection))

        // Watch list
        .route("/api/watchlist", get(get_watchlist).post(add_to_watchlist))
        .route("/api/watchlist/{symbol}", delete(remove_from_watchlist))

        // Preferences
        .route("/api/settings", get(get_settings).put(put_settings))
        .route("/api/preferences/export", get(export_preferences))
        .route("/api/preferences/import", post(import_preferences))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn advisory_provider() -> anyhow::Result<Option<Arc<dyn LlmProvider>>> {
    let config = OpenAiConfig::from_env();
    if !config.is_configured() {
        tracing::warn!("⚠ OPENAI_API_KEY not set - using rule-based analysis only");
        return Ok(None);
    }

    let model = config.model.clone();
    let provider: Arc<dyn LlmProvider> = Arc::new(OpenAiProvider::from_config(config)?);
    tracing::info!("✓ Advisory provider configured (model {})", model);
    Ok(Some(provider))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    let llm = advisory_provider()?;
    let state = AppState::new(&config, llm, Arc::new(SystemClock))?;

    tracing::info!("Quote provider: {}", state.market.provider_name());
    tracing::info!("Catalog: {} sectors, {} profiles", state.catalog.sectors().len(), state.catalog.profiles().len());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 portfolio advisor running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");

    axum::serve(listener, app(state)).await?;

    Ok(())
}
