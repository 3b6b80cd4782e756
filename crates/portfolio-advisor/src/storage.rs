//! Preferences Store
//!
//! Typed access to the dashboard's persisted state over a plain string
//! key/value store. Values are JSON documents under fixed keys.
//!
//! Nothing here locks. Read-modify-write operations such as `add_ticker` or
//! `save_composition` are not safe to call concurrently; callers sharing a
//! store must serialize access themselves.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::allocation::{self, Composition, DEFAULT_INVESTMENT_AMOUNT, TickerSelection};
use crate::error::{AdvisorError, Result, ValidationError};
use crate::model::normalize_symbol;
use crate::profiler::{ProfileType, Questionnaire, RiskAssessment};
use crate::settings::AppSettings;

pub const PORTFOLIO_TICKERS: &str = "portfolioTickers";
pub const USER_PROFILES: &str = "userProfiles";
pub const PORTFOLIO_COMPOSITION: &str = "portfolioComposition";
pub const INVESTMENT_AMOUNT: &str = "investmentAmount";
pub const SELECTED_TICKERS: &str = "selectedTickers";
pub const APP_SETTINGS: &str = "appSettings";

pub const DEFAULT_TICKERS: [&str; 5] = ["SPLG", "SPY", "QQQ", "VTI", "VOO"];

/// Minimal string store in the shape of browser local storage
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
    fn remove(&mut self, key: &str);
    fn clear(&mut self);
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// A questionnaire saved under a user-chosen name
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedProfile {
    pub id: Uuid,
    pub name: String,
    pub questionnaire: Questionnaire,
    pub profile_type: ProfileType,
    pub risk_score: u32,
    pub saved_at: DateTime<Utc>,
}

impl SavedProfile {
    pub fn new(name: impl Into<String>, questionnaire: Questionnaire, assessment: &RiskAssessment) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            questionnaire,
            profile_type: assessment.profile_type,
            risk_score: assessment.risk_score,
            saved_at: Utc::now(),
        }
    }
}

/// Backup document; the list entries carry the raw stored JSON
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub settings: AppSettings,
    pub portfolio_tickers: Option<String>,
    pub user_profiles: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

pub struct PreferenceStore<S> {
    store: S,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.store.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring unreadable stored value");
                None
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.store.set(key, json)
    }

    pub fn tickers(&self) -> Vec<String> {
        self.read(PORTFOLIO_TICKERS)
            .unwrap_or_else(|| DEFAULT_TICKERS.iter().map(ToString::to_string).collect())
    }

    /// Append a validated, uppercased symbol to the watch list
    pub fn add_ticker(&mut self, raw: &str) -> Result<String> {
        let symbol = normalize_symbol(raw)?;
        let mut tickers = self.tickers();
        if tickers.contains(&symbol) {
            return Err(ValidationError::DuplicateTicker(symbol).into());
        }
        tickers.push(symbol.clone());
        self.write(PORTFOLIO_TICKERS, &tickers)?;
        Ok(symbol)
    }

    /// `true` if the symbol was present
    pub fn remove_ticker(&mut self, symbol: &str) -> Result<bool> {
        let symbol = symbol.trim().to_uppercase();
        let mut tickers = self.tickers();
        let before = tickers.len();
        tickers.retain(|t| *t != symbol);
        if tickers.len() == before {
            return Ok(false);
        }
        self.write(PORTFOLIO_TICKERS, &tickers)?;
        Ok(true)
    }

    pub fn composition(&self) -> Composition {
        self.read(PORTFOLIO_COMPOSITION).unwrap_or_default()
    }

    /// Validate, then persist; nothing is written on failure
    pub fn save_composition(&mut self, composition: Composition) -> Result<Composition> {
        let composition = composition.normalized();
        composition.validate()?;
        self.write(PORTFOLIO_COMPOSITION, &composition)?;
        Ok(composition)
    }

    pub fn investment_amount(&self) -> Decimal {
        self.store
            .get(INVESTMENT_AMOUNT)
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(DEFAULT_INVESTMENT_AMOUNT)
    }

    pub fn set_investment_amount(&mut self, amount: Decimal) -> Result<()> {
        let amount = allocation::validate_amount(amount)?;
        self.store.set(INVESTMENT_AMOUNT, amount.to_string())
    }

    pub fn selection(&self) -> TickerSelection {
        self.read(SELECTED_TICKERS).unwrap_or_default()
    }

    pub fn save_selection(&mut self, selection: &TickerSelection) -> Result<()> {
        selection.validate()?;
        self.write(SELECTED_TICKERS, selection)
    }

    pub fn settings(&self) -> AppSettings {
        self.read(APP_SETTINGS).unwrap_or_default()
    }

    pub fn save_settings(&mut self, settings: &AppSettings) -> Result<()> {
        self.write(APP_SETTINGS, settings)
    }

    pub fn profiles(&self) -> Vec<SavedProfile> {
        self.read(USER_PROFILES).unwrap_or_default()
    }

    /// Save under `profile.name`, replacing any profile of the same name
    pub fn save_profile(&mut self, profile: SavedProfile) -> Result<()> {
        let mut profiles = self.profiles();
        profiles.retain(|p| p.name != profile.name);
        profiles.push(profile);
        self.write(USER_PROFILES, &profiles)
    }

    pub fn load_profile(&self, name: &str) -> Option<SavedProfile> {
        self.profiles().into_iter().find(|p| p.name == name)
    }

    pub fn delete_profile(&mut self, name: &str) -> Result<bool> {
        let mut profiles = self.profiles();
        let before = profiles.len();
        profiles.retain(|p| p.name != name);
        if profiles.len() == before {
            return Ok(false);
        }
        self.write(USER_PROFILES, &profiles)?;
        Ok(true)
    }

    pub fn export(&self) -> Snapshot {
        let settings = self.settings();
        Snapshot {
            version: settings.version.clone(),
            settings,
            portfolio_tickers: self.store.get(PORTFOLIO_TICKERS),
            user_profiles: self.store.get(USER_PROFILES),
            timestamp: Utc::now(),
        }
    }

    /// Restore a backup. `settings` and `timestamp` are required; the
    /// settings are merged over the defaults.
    pub fn import(&mut self, document: &Value) -> Result<()> {
        let (Some(settings), Some(_timestamp)) = (document.get("settings"), document.get("timestamp")) else {
            return Err(ValidationError::InvalidSnapshot("settings and timestamp are required".into()).into());
        };

        let settings: AppSettings = serde_json::from_value(settings.clone())
            .map_err(|e| AdvisorError::from(ValidationError::InvalidSnapshot(e.to_string())))?;
        self.save_settings(&settings)?;

        for key in [PORTFOLIO_TICKERS, USER_PROFILES] {
            if let Some(raw) = document.get(key).and_then(Value::as_str) {
                self.store.set(key, raw.to_string())?;
            }
        }

        tracing::info!("preferences restored from backup");
        Ok(())
    }

    pub fn clear_all(&mut self) {
        self.store.clear();
    }
}
