//! # advisor-runtime
//!
//! Runtime providers for the portfolio advisory text service.
//!
//! ## Providers
//!
//! - **OpenAI** (default): chat completions over HTTPS, or any server
//!   speaking the same wire format via `OPENAI_BASE_URL`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use advisor_runtime::openai::OpenAiProvider;
//!
//! let provider = Arc::new(OpenAiProvider::from_env()?);
//! let advisor = RemoteAdvisor::new(provider, catalog);
//! ```

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "openai")]
pub use openai::{OpenAiConfig, OpenAiProvider};

// Re-export core types for convenience
pub use advisor_core::{AdvisoryError, GenerationOptions, LlmProvider, Message, Result, Role};
