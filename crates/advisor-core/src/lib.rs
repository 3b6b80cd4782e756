//! # advisor-core
//!
//! Provider-agnostic LLM abstraction for the portfolio advisory text service.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   portfolio-advisor                       │
//! │  ┌──────────────┐   ┌────────────────┐   ┌─────────────┐  │
//! │  │ RemoteAdvisor│──▶│  LlmProvider   │◀──│  Assistant  │  │
//! │  │  (analysis)  │   │  (Strategy)    │   │   (chat)    │  │
//! │  └──────────────┘   └────────────────┘   └─────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait lets the advisory layer swap OpenAI for any
//! compatible backend, or for a fake in tests, without touching callers.

pub mod error;
pub mod message;
pub mod provider;

pub use error::{AdvisoryError, Result};
pub use message::{Conversation, Message, Role};
pub use provider::{Completion, FinishReason, GenerationOptions, LlmProvider, ProviderInfo, TokenUsage};
