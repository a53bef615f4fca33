//! Engine configuration.
//!
//! Values come from `PUTAWAY_*` environment variables with defaults; the zone
//! table is an optional TOML file (the built-in five-zone layout otherwise).

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use putaway_ai::{ChatCompletionsConfig, RetryPolicy, ServiceError};
use putaway_core::DomainError;
use putaway_warehouse::{DEFAULT_AMBIENT_THRESHOLD_C, ZoneCatalog, ZoneTable};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const OLLAMA_MODEL: &str = "phi3:mini";
/// Upper bound on reasoning-service retries after the first attempt.
pub const MAX_REASONING_RETRIES: u32 = 2;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key} ({value:?}): {message}")]
    Invalid {
        key: &'static str,
        value: String,
        message: String,
    },

    #[error("failed to read zone table {}: {source}", path.display())]
    ZoneTableIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse zone table {}: {message}", path.display())]
    ZoneTableParse { path: PathBuf, message: String },

    #[error("zone table rejected: {0}")]
    ZoneTable(#[from] DomainError),

    #[error("failed to build reasoning client: {0}")]
    ReasoningClient(#[from] ServiceError),
}

/// Settings for the external reasoning service.
#[derive(Debug, Clone, PartialEq)]
pub struct ReasoningConfig {
    /// When false the engine never calls out and always uses the fallback policy.
    pub enabled: bool,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub attempt_timeout: Duration,
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub backoff_multiplier: f64,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        let chat = ChatCompletionsConfig::default();
        let retry = RetryPolicy::default();
        Self {
            enabled: false,
            base_url: chat.base_url,
            model: chat.model,
            api_key: None,
            attempt_timeout: putaway_ai::DEFAULT_ATTEMPT_TIMEOUT,
            max_retries: retry.max_retries,
            backoff_base: retry.base_delay,
            backoff_multiplier: retry.multiplier,
        }
    }
}

impl ReasoningConfig {
    pub fn chat_completions(&self) -> ChatCompletionsConfig {
        ChatCompletionsConfig {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            api_key: self.api_key.clone(),
            // Keep the transport ceiling above the per-attempt timeout.
            request_timeout: self.attempt_timeout + Duration::from_secs(5),
            ..ChatCompletionsConfig::default()
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries.min(MAX_REASONING_RETRIES),
            base_delay: self.backoff_base,
            multiplier: self.backoff_multiplier,
            ..RetryPolicy::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub reasoning: ReasoningConfig,
    pub ambient_threshold_c: f64,
    /// TOML zone table; the standard layout when unset.
    pub zone_table_path: Option<PathBuf>,
    /// JSON-lines audit log; in-memory when unset.
    pub audit_log_path: Option<PathBuf>,
    pub bind_addr: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reasoning: ReasoningConfig::default(),
            ambient_threshold_c: DEFAULT_AMBIENT_THRESHOLD_C,
            zone_table_path: None,
            audit_log_path: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();
        let r = &mut config.reasoning;

        let use_ollama = parse_bool("PUTAWAY_USE_OLLAMA", get("PUTAWAY_USE_OLLAMA"))?.unwrap_or(false);
        if use_ollama {
            r.base_url = putaway_ai::http::OLLAMA_BASE_URL.to_string();
            r.model = OLLAMA_MODEL.to_string();
        }
        if let Some(url) = get("PUTAWAY_REASONING_BASE_URL") {
            r.base_url = url;
        }
        if let Some(model) = get("PUTAWAY_REASONING_MODEL") {
            r.model = model;
        }
        r.api_key = get("PUTAWAY_REASONING_API_KEY").or_else(|| get("OPENROUTER_API_KEY"));
        r.enabled = parse_bool("PUTAWAY_REASONING_ENABLED", get("PUTAWAY_REASONING_ENABLED"))?
            .unwrap_or(use_ollama || r.api_key.is_some());

        if let Some(ms) = parse_num::<u64>("PUTAWAY_REASONING_TIMEOUT_MS", get("PUTAWAY_REASONING_TIMEOUT_MS"))? {
            if ms == 0 {
                return Err(invalid("PUTAWAY_REASONING_TIMEOUT_MS", ms.to_string(), "must be positive"));
            }
            r.attempt_timeout = Duration::from_millis(ms);
        }
        if let Some(n) = parse_num::<u32>("PUTAWAY_REASONING_MAX_RETRIES", get("PUTAWAY_REASONING_MAX_RETRIES"))? {
            if n > MAX_REASONING_RETRIES {
                return Err(invalid(
                    "PUTAWAY_REASONING_MAX_RETRIES",
                    n.to_string(),
                    &format!("at most {MAX_REASONING_RETRIES} retries are allowed"),
                ));
            }
            r.max_retries = n;
        }
        if let Some(ms) = parse_num::<u64>("PUTAWAY_REASONING_BACKOFF_MS", get("PUTAWAY_REASONING_BACKOFF_MS"))? {
            r.backoff_base = Duration::from_millis(ms);
        }
        if let Some(m) = parse_num::<f64>(
            "PUTAWAY_REASONING_BACKOFF_MULTIPLIER",
            get("PUTAWAY_REASONING_BACKOFF_MULTIPLIER"),
        )? {
            if !(m.is_finite() && m >= 1.0) {
                return Err(invalid("PUTAWAY_REASONING_BACKOFF_MULTIPLIER", m.to_string(), "must be >= 1"));
            }
            r.backoff_multiplier = m;
        }

        if let Some(t) = parse_num::<f64>("PUTAWAY_AMBIENT_THRESHOLD_C", get("PUTAWAY_AMBIENT_THRESHOLD_C"))? {
            if !t.is_finite() {
                return Err(invalid("PUTAWAY_AMBIENT_THRESHOLD_C", t.to_string(), "must be finite"));
            }
            config.ambient_threshold_c = t;
        }
        config.zone_table_path = get("PUTAWAY_ZONE_TABLE").map(PathBuf::from);
        config.audit_log_path = get("PUTAWAY_AUDIT_LOG").map(PathBuf::from);
        if let Some(addr) = get("PUTAWAY_BIND_ADDR") {
            config.bind_addr = addr;
        }

        Ok(config)
    }

    pub fn zone_table(&self) -> Result<ZoneTable, ConfigError> {
        match &self.zone_table_path {
            Some(path) => load_zone_table(path),
            None => Ok(ZoneTable::standard()),
        }
    }

    pub fn zone_catalog(&self) -> Result<ZoneCatalog, ConfigError> {
        Ok(ZoneCatalog::new(self.zone_table()?)?)
    }
}

pub fn load_zone_table(path: &Path) -> Result<ZoneTable, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ZoneTableIo {
        path: path.to_path_buf(),
        source,
    })?;
    parse_zone_table(&text).map_err(|message| ConfigError::ZoneTableParse {
        path: path.to_path_buf(),
        message,
    })
}

pub fn parse_zone_table(text: &str) -> Result<ZoneTable, String> {
    toml::from_str(text).map_err(|e| e.to_string())
}

fn invalid(key: &'static str, value: String, message: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value,
        message: message.to_string(),
    }
}

fn parse_bool(key: &'static str, value: Option<String>) -> Result<Option<bool>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(invalid(key, value, "expected a boolean")),
    }
}

fn parse_num<T>(key: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|v| v.parse::<T>().map_err(|e| invalid(key, v.clone(), &e.to_string())))
        .transpose()
}
