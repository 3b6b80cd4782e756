//! Server Configuration

use std::time::Duration;

use portfolio_advisor::settings::DataSource;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_QUOTE_TTL_SECS: u64 = 60;
const DEFAULT_HISTORY_TTL_SECS: u64 = 300;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub data_source: DataSource,
    pub quote_ttl: Duration,
    pub history_ttl: Duration,
    /// Signed-in user for single-user deployments; anonymous when unset
    pub local_user: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.into(),
            data_source: DataSource::Simulated,
            quote_ttl: Duration::from_secs(DEFAULT_QUOTE_TTL_SECS),
            history_ttl: Duration::from_secs(DEFAULT_HISTORY_TTL_SECS),
            local_user: None,
        }
    }
}

fn secs_from_env(var: &str, default: u64) -> Duration {
    Duration::from_secs(
        std::env::var(var)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(default),
    )
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into());
        let data_source = std::env::var("DATA_SOURCE")
            .ok()
            .and_then(|raw| {
                raw.parse()
                    .map_err(|e: String| tracing::warn!("{e}, using simulated data"))
                    .ok()
            })
            .unwrap_or_default();

        Self {
            bind_addr,
            data_source,
            quote_ttl: secs_from_env("QUOTE_CACHE_TTL_SECS", DEFAULT_QUOTE_TTL_SECS),
            history_ttl: secs_from_env("HISTORY_CACHE_TTL_SECS", DEFAULT_HISTORY_TTL_SECS),
            local_user: std::env::var("LOCAL_USER").ok().filter(|u| !u.trim().is_empty()),
        }
    }
}
