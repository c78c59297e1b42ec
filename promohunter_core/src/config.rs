//! Application configuration.
//!
//! Everything has sensible defaults. Values come from, in order:
//! 1. Built-in defaults
//! 2. `~/.config/promohunter/config.yaml` (if present)
//! 3. Environment variables (`TELEGRAM_TOKEN`, `LOG_LEVEL`, `API_TIMEOUT`,
//!    `PROMOHUNTER_POLICY`)

use crate::error::ConfigError;
use crate::product::Store;
use crate::ranking::RankingPolicy;
use crate::search::DEFAULT_SOURCE_TIMEOUT_MS;
use crate::stores::{self, SourceSettings, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_USER_AGENT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

// ============================================================================
// Default Values
// ============================================================================

/// Default log filter when neither `RUST_LOG` nor `LOG_LEVEL` is set
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const ENV_TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
/// Per-source timeout, in seconds
pub const ENV_API_TIMEOUT: &str = "API_TIMEOUT";
pub const ENV_POLICY: &str = "PROMOHUNTER_POLICY";

fn default_sources() -> Vec<Store> {
    Store::ALL.to_vec()
}

fn default_source_timeout_ms() -> u64 {
    DEFAULT_SOURCE_TIMEOUT_MS
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_magalu_endpoint() -> String {
    stores::magalu::DEFAULT_ENDPOINT.to_string()
}

fn default_kabum_endpoint() -> String {
    stores::kabum::DEFAULT_ENDPOINT.to_string()
}

// ============================================================================
// AppConfig
// ============================================================================

/// Search endpoint templates; `{query}` is replaced by the encoded term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default = "default_magalu_endpoint")]
    pub magalu: String,

    #[serde(default = "default_kabum_endpoint")]
    pub kabum: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            magalu: default_magalu_endpoint(),
            kabum: default_kabum_endpoint(),
        }
    }
}

impl Endpoints {
    pub fn for_store(&self, store: Store) -> &str {
        match store {
            Store::Magalu => &self.magalu,
            Store::Kabum => &self.kabum,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Stores to search, in registration (and output) order
    #[serde(default = "default_sources")]
    pub sources: Vec<Store>,

    /// Policy used for plain-text searches (default: lowest_price)
    #[serde(default)]
    pub default_policy: RankingPolicy,

    /// Budget for one store, including normalization (default: 30000)
    #[serde(default = "default_source_timeout_ms")]
    pub source_timeout_ms: u64,

    /// HTTP timeout for one store request (default: 10000)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default)]
    pub endpoints: Endpoints,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// tracing filter directive (default: info)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Telegram Bot API token. Read from the file or environment, never written out.
    #[serde(default, skip_serializing)]
    pub telegram_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            default_policy: RankingPolicy::default(),
            source_timeout_ms: DEFAULT_SOURCE_TIMEOUT_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            endpoints: Endpoints::default(),
            user_agent: default_user_agent(),
            log_level: default_log_level(),
            telegram_token: None,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("sources", &self.sources)
            .field("default_policy", &self.default_policy)
            .field("source_timeout_ms", &self.source_timeout_ms)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("endpoints", &self.endpoints)
            .field("user_agent", &self.user_agent)
            .field("log_level", &self.log_level)
            .field("telegram_token", &self.telegram_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AppConfig {
    pub fn source_timeout(&self) -> Duration {
        Duration::from_millis(self.source_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Request shaping for one store's client.
    pub fn source_settings(&self, store: Store) -> SourceSettings {
        SourceSettings {
            endpoint: self.endpoints.for_store(store).to_string(),
            user_agent: self.user_agent.clone(),
            request_timeout: self.request_timeout(),
        }
    }

    pub fn has_telegram_token(&self) -> bool {
        self.telegram_token
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup. Unparseable values are ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(ENV_TELEGRAM_TOKEN).filter(|t| !t.trim().is_empty()) {
            self.telegram_token = Some(token.trim().to_string());
        }

        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|l| !l.trim().is_empty()) {
            self.log_level = level.trim().to_ascii_lowercase();
        }

        if let Some(raw) = lookup(ENV_API_TIMEOUT) {
            let millis = raw
                .trim()
                .parse::<u64>()
                .ok()
                .and_then(|secs| secs.checked_mul(1000));
            match millis {
                Some(ms) if ms > 0 => self.source_timeout_ms = ms,
                _ => warn!(value = %raw, "ignoring invalid {}", ENV_API_TIMEOUT),
            }
        }

        if let Some(raw) = lookup(ENV_POLICY) {
            match raw.parse::<RankingPolicy>() {
                Ok(policy) => self.default_policy = policy,
                Err(e) => warn!("ignoring {}: {}", ENV_POLICY, e),
            }
        }
    }

    /// Reject configurations no search could run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::Invalid("no sources configured".to_string()));
        }
        for (i, store) in self.sources.iter().enumerate() {
            if self.sources[..i].contains(store) {
                return Err(ConfigError::Invalid(format!(
                    "source '{}' listed more than once",
                    store.key()
                )));
            }
            if !self.endpoints.for_store(*store).contains("{query}") {
                return Err(ConfigError::Invalid(format!(
                    "endpoint for '{}' has no {{query}} placeholder",
                    store.key()
                )));
            }
        }
        if self.source_timeout_ms == 0 || self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeouts must be positive".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// ConfigStore
// ============================================================================

/// Location of the YAML config file.
///
/// Stored at `~/.config/promohunter/config.yaml` by default.
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Create a config store at the default location.
    pub fn new_default() -> Self {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|p| p.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        let path = base.join("promohunter").join("config.yaml");
        Self { path }
    }

    /// Create a config store at a custom path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the file only. A missing file yields the defaults.
    pub fn load_file(&self) -> Result<AppConfig, ConfigError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(AppConfig::default()),
            Ok(content) => Ok(serde_yaml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no config file, using defaults");
                Ok(AppConfig::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// File, then environment overrides, then validation.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut config = self.load_file()?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("promohunter-config-{}-{}", std::process::id(), name))
            .join("config.yaml")
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.sources, vec![Store::Magalu, Store::Kabum]);
        assert_eq!(config.default_policy, RankingPolicy::LowestPrice);
        assert_eq!(config.source_timeout(), Duration::from_secs(30));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
sources: [kabum]
default_policy: best_rating
endpoints:
  kabum: "http://localhost:8080/kabum?q={query}"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.sources, vec![Store::Kabum]);
        assert_eq!(config.default_policy, RankingPolicy::BestRating);
        assert_eq!(config.endpoints.kabum, "http://localhost:8080/kabum?q={query}");
        assert_eq!(config.endpoints.magalu, stores::magalu::DEFAULT_ENDPOINT);
        assert_eq!(config.source_timeout_ms, DEFAULT_SOURCE_TIMEOUT_MS);

        let settings = config.source_settings(Store::Kabum);
        assert_eq!(settings.url_for("ssd nvme"), "http://localhost:8080/kabum?q=ssd%20nvme");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_TELEGRAM_TOKEN, " 123:abc "),
            (ENV_LOG_LEVEL, "DEBUG"),
            (ENV_API_TIMEOUT, "5"),
            (ENV_POLICY, "best_value"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.telegram_token.as_deref(), Some("123:abc"));
        assert!(config.has_telegram_token());
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.source_timeout_ms, 5000);
        assert_eq!(config.default_policy, RankingPolicy::BestValue);
    }

    #[test]
    fn test_invalid_env_values_are_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(|k| match k {
            ENV_API_TIMEOUT => Some("soon".to_string()),
            ENV_POLICY => Some("fanciest".to_string()),
            _ => None,
        });
        assert_eq!(config.source_timeout_ms, DEFAULT_SOURCE_TIMEOUT_MS);
        assert_eq!(config.default_policy, RankingPolicy::LowestPrice);
    }

    #[test]
    fn test_oversized_api_timeout_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(|k| (k == ENV_API_TIMEOUT).then(|| "18446744073709552".to_string()));
        assert_eq!(config.source_timeout_ms, DEFAULT_SOURCE_TIMEOUT_MS);

        config.apply_overrides(|k| (k == ENV_API_TIMEOUT).then(|| "0".to_string()));
        assert_eq!(config.source_timeout_ms, DEFAULT_SOURCE_TIMEOUT_MS);
    }

    #[test]
    fn test_token_never_serialized() {
        let config = AppConfig {
            telegram_token: Some("secret-token".to_string()),
            ..AppConfig::default()
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("secret-token"));
        assert!(!format!("{:?}", config).contains("secret-token"));
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig {
            sources: vec![],
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());

        config.sources = vec![Store::Kabum, Store::Kabum];
        assert!(config.validate().is_err());

        config.sources = vec![Store::Magalu];
        config.endpoints.magalu = "https://example.com/search".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_store_missing_and_malformed_file() {
        let path = temp_path("missing");
        let store = ConfigStore::new(path.clone());
        assert!(!store.exists());
        assert_eq!(store.load_file().unwrap().sources, Store::ALL.to_vec());

        let path = temp_path("malformed");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "sources: [walmart]\n").unwrap();
        let store = ConfigStore::new(path.clone());
        assert!(matches!(store.load_file(), Err(ConfigError::Parse(_))));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
