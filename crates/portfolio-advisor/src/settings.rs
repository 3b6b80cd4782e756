//! User Settings
//!
//! Dashboard preferences persisted as one JSON record. API keys are stored
//! base64-encoded. That is obfuscation, not encryption: anyone who can read
//! the store can recover the keys. Do not treat it as secure storage.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const SETTINGS_VERSION: &str = "2.0.0";

/// Shown in place of a stored key
pub const KEY_MASK: &str = "••••••••••••••••";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    #[default]
    #[serde(rename = "simulated")]
    Simulated,
    #[serde(rename = "alphaVantage", alias = "alpha-vantage")]
    AlphaVantage,
}

impl std::str::FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "simulated" => Ok(Self::Simulated),
            "alphaVantage" | "alpha-vantage" => Ok(Self::AlphaVantage),
            other => Err(format!("unknown data source '{other}'")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiKeyKind {
    OpenAi,
    AlphaVantage,
}

impl ApiKeyKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::AlphaVantage => "Alpha Vantage",
        }
    }
}

/// Format check only; says nothing about whether the key works
pub fn validate_api_key(key: &str, kind: ApiKeyKind) -> Result<(), ValidationError> {
    let valid = match kind {
        ApiKeyKind::OpenAi => key.starts_with("sk-") && key.len() > 10,
        ApiKeyKind::AlphaVantage => {
            key.len() >= 8 && key.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        }
    };

    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidApiKey { provider: kind.name() })
    }
}

pub fn obscure(secret: &str) -> String {
    STANDARD.encode(secret)
}

/// `None` when the stored value is not valid base64 UTF-8
pub fn reveal(obscured: &str) -> Option<String> {
    let bytes = STANDARD.decode(obscured).ok()?;
    String::from_utf8(bytes).ok()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// Base64-obscured
    pub openai_api_key: String,
    pub api_model: String,
    /// Base64-obscured
    pub alpha_vantage_api_key: String,

    pub dark_mode: bool,
    pub show_decimals: bool,
    pub currency: String,

    /// Seconds
    pub refresh_interval: u64,
    pub auto_save: bool,
    pub data_source: DataSource,

    pub price_alerts: bool,
    pub portfolio_alerts: bool,
    /// Percent move that triggers an alert
    pub alert_threshold: Decimal,

    pub debug_mode: bool,
    pub version: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            api_model: "gpt-4".into(),
            alpha_vantage_api_key: String::new(),
            dark_mode: false,
            show_decimals: true,
            currency: "USD".into(),
            refresh_interval: 60,
            auto_save: true,
            data_source: DataSource::Simulated,
            price_alerts: false,
            portfolio_alerts: false,
            alert_threshold: dec!(5),
            debug_mode: false,
            version: SETTINGS_VERSION.into(),
        }
    }
}

impl AppSettings {
    pub fn set_api_key(&mut self, kind: ApiKeyKind, key: &str) -> Result<(), ValidationError> {
        let key = key.trim();
        validate_api_key(key, kind)?;

        let slot = match kind {
            ApiKeyKind::OpenAi => &mut self.openai_api_key,
            ApiKeyKind::AlphaVantage => &mut self.alpha_vantage_api_key,
        };
        *slot = obscure(key);
        Ok(())
    }

    pub fn api_key(&self, kind: ApiKeyKind) -> Option<String> {
        let stored = match kind {
            ApiKeyKind::OpenAi => &self.openai_api_key,
            ApiKeyKind::AlphaVantage => &self.alpha_vantage_api_key,
        };
        if stored.is_empty() {
            return None;
        }
        reveal(stored).filter(|k| !k.is_empty())
    }

    pub fn has_api_key(&self, kind: ApiKeyKind) -> bool {
        self.api_key(kind).is_some()
    }

    /// Copy safe to hand to a browser: stored keys replaced by a mask
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mask = |s: &str| if s.is_empty() { String::new() } else { KEY_MASK.into() };
        Self {
            openai_api_key: mask(&self.openai_api_key),
            alpha_vantage_api_key: mask(&self.alpha_vantage_api_key),
            ..self.clone()
        }
    }
}
