//! # portfolio-advisor
//!
//! ETF risk profiling and portfolio recommendation engine.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   score 0..17   ┌──────────────┐  template id  ┌────────────────────┐
//! │ Questionnaire│ ──────────────▶ │ RiskProfiler │ ────────────▶ │RecommendationEngine│
//! └──────────────┘                 └──────────────┘               └────────────────────┘
//!                                                                          │
//!        ┌──────────────────┐   prices   ┌────────────────────┐            ▼
//!        │  QuoteGenerator  │ ─────────▶ │ allocate(4 buckets)│   cheapest ETF per sector
//!        │ (deterministic)  │            └────────────────────┘
//!        └──────────────────┘
//! ```
//!
//! ## Example: $1000 Balanced Composition
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Fixed income 40% / Core 42% / Explore 9% / Protect 9%      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  AGG  ████████████████████  $400 (40%)  - Renta Fija        │
//! │  IVV  █████████████████████ $420 (42%)  - Core              │
//! │  QQQ  ████                  $90  (9%)   - Explore           │
//! │  XLP  ████                  $90  (9%)   - Protect           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything deterministic lives here; the advisory text service and the
//! market data API are reached through traits and always have a local
//! fallback.

pub mod advisory;
pub mod allocation;
pub mod auth;
pub mod catalog;
pub mod error;
pub mod insights;
pub mod model;
pub mod profiler;
pub mod quote;
pub mod recommendation;
pub mod settings;
pub mod storage;

pub use advisory::{
    AdvisoryAssistant, AdvisoryReport, AdvisoryRequest, FallbackAdvisor, LocalAdvisor, RecommendationSource,
    RemoteAdvisor, RequestSlots,
};
pub use allocation::{AllocationBreakdown, Bucket, Composition, PriceBook, TickerSelection, allocate};
pub use catalog::TickerCatalog;
pub use error::{AdvisorError, Result, ValidationError};
pub use model::{Profile, RiskLevel, Sector, Ticker, Volatility};
pub use profiler::{ProfileType, Questionnaire, RiskAssessment, RiskProfiler};
pub use quote::{MarketDataService, Quote, QuoteGenerator, QuoteProvider};
pub use recommendation::{Recommendation, RecommendationEngine};
pub use settings::AppSettings;
pub use storage::{KeyValueStore, MemoryStore, PreferenceStore};
