//! Application State

use std::sync::Arc;

use advisor_core::LlmProvider;
use portfolio_advisor::auth::{AnonymousGate, AuthGate, StaticUserGate};
use portfolio_advisor::quote::{
    AlphaVantageConfig, AlphaVantageProvider, Clock, MarketDataService, QuoteGenerator, QuoteProvider,
    SyntheticQuoteProvider,
};
use portfolio_advisor::settings::DataSource;
use portfolio_advisor::{
    AdvisoryAssistant, FallbackAdvisor, LocalAdvisor, MemoryStore, PreferenceStore, RemoteAdvisor, RequestSlots,
    TickerCatalog,
};
use tokio::sync::Mutex;

use crate::config::ServerConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<TickerCatalog>,

    /// Deterministic prices, also the allocation price source
    pub generator: Arc<QuoteGenerator>,

    /// Cached quotes with synthetic fallback
    pub market: Arc<MarketDataService>,

    /// Remote-first profile analysis, rule-based when unavailable
    pub advisor: Arc<FallbackAdvisor<RemoteAdvisor>>,

    /// Free-text services (None if no provider is configured)
    pub assistant: Option<Arc<AdvisoryAssistant>>,

    pub slots: Arc<RequestSlots>,

    /// Watch list, composition, settings. Every read-modify-write goes through this lock.
    pub preferences: Arc<Mutex<PreferenceStore<MemoryStore>>>,

    pub auth: Arc<dyn AuthGate>,

    pub data_source: DataSource,
}

impl AppState {
    pub fn new(config: &ServerConfig, llm: Option<Arc<dyn LlmProvider>>, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let catalog = Arc::new(TickerCatalog::builtin());
        let generator = Arc::new(QuoteGenerator::new(catalog.clone()));
        let synthetic = Arc::new(SyntheticQuoteProvider::new(generator.clone(), clock));

        let primary: Arc<dyn QuoteProvider> = match config.data_source {
            DataSource::AlphaVantage => {
                let av = AlphaVantageConfig::from_env();
                if av.is_configured() {
                    Arc::new(AlphaVantageProvider::new(av, generator.clone())?)
                } else {
                    tracing::warn!("⚠ ALPHA_VANTAGE_API_KEY not set - serving simulated quotes");
                    synthetic.clone()
                }
            }
            DataSource::Simulated => synthetic.clone(),
        };
        let market = MarketDataService::with_ttls(primary, synthetic, config.quote_ttl, config.history_ttl);

        let local = LocalAdvisor::new(catalog.clone());
        let (advisor, assistant) = match llm {
            Some(provider) => (
                FallbackAdvisor::new(RemoteAdvisor::new(provider.clone()), local),
                Some(Arc::new(AdvisoryAssistant::new(provider))),
            ),
            None => (FallbackAdvisor::local_only(local), None),
        };

        let auth: Arc<dyn AuthGate> = match &config.local_user {
            Some(user) => Arc::new(StaticUserGate::new(user.clone(), None)),
            None => Arc::new(AnonymousGate),
        };

        Ok(Self {
            catalog,
            generator,
            market: Arc::new(market),
            advisor: Arc::new(advisor),
            assistant,
            slots: Arc::new(RequestSlots::new()),
            preferences: Arc::new(Mutex::new(PreferenceStore::new(MemoryStore::new()))),
            auth,
            data_source: config.data_source,
        })
    }
}
