use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::pipeline::interactions::{DEFAULT_MODEL, OLLAMA_DEFAULT_URL};
use crate::pipeline::labels::OPENFDA_DEFAULT_URL;
use crate::pipeline::UnknownDrugPolicy;

/// Application-level constants
pub const APP_NAME: &str = "DrugViz";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> &'static str {
    "info,drugviz_lib=debug"
}

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_CATALOG_PATH: &str = "data/drug_names.json";
pub const DEFAULT_LABEL_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_REASONING_TIMEOUT_SECS: u64 = 30;
pub const MAX_REASONING_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_REASONING_TEMPERATURE: f32 = 0.1;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key}={value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("Cannot build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("Cannot start runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("Server error: {0}")]
    Server(#[source] std::io::Error),
}

/// Settings resolved once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub openfda_base_url: String,
    pub openfda_api_key: Option<String>,
    pub label_timeout_secs: u64,
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub reasoning_timeout_secs: u64,
    pub reasoning_temperature: f32,
    pub unknown_drug_policy: UnknownDrugPolicy,
    pub catalog_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through `lookup`. Unset and blank values take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr: SocketAddr =
            parse_or(&get, "DRUGVIZ_BIND_ADDR", DEFAULT_BIND_ADDR.parse().ok())?;

        let label_timeout_secs =
            parse_or(&get, "LABEL_TIMEOUT_SECS", Some(DEFAULT_LABEL_TIMEOUT_SECS))?;
        if label_timeout_secs == 0 {
            return Err(invalid("LABEL_TIMEOUT_SECS", "0", "must be at least 1"));
        }

        let reasoning_timeout_secs = parse_or(
            &get,
            "REASONING_TIMEOUT_SECS",
            Some(DEFAULT_REASONING_TIMEOUT_SECS),
        )?;
        if !(1..=MAX_REASONING_TIMEOUT_SECS).contains(&reasoning_timeout_secs) {
            return Err(invalid(
                "REASONING_TIMEOUT_SECS",
                &reasoning_timeout_secs.to_string(),
                &format!("must be between 1 and {MAX_REASONING_TIMEOUT_SECS}"),
            ));
        }

        let reasoning_temperature: f32 = parse_or(
            &get,
            "REASONING_TEMPERATURE",
            Some(DEFAULT_REASONING_TEMPERATURE),
        )?;
        if !(0.0..=1.0).contains(&reasoning_temperature) {
            return Err(invalid(
                "REASONING_TEMPERATURE",
                &reasoning_temperature.to_string(),
                "must be between 0.0 and 1.0",
            ));
        }

        let unknown_drug_policy = match get("UNKNOWN_DRUG_POLICY") {
            Some(raw) => raw
                .parse::<UnknownDrugPolicy>()
                .map_err(|reason| invalid("UNKNOWN_DRUG_POLICY", &raw, &reason))?,
            None => UnknownDrugPolicy::default(),
        };

        Ok(Self {
            bind_addr,
            openfda_base_url: get("OPENFDA_BASE_URL")
                .unwrap_or_else(|| OPENFDA_DEFAULT_URL.to_string()),
            openfda_api_key: get("OPENFDA_API_KEY"),
            label_timeout_secs,
            ollama_base_url: get("OLLAMA_BASE_URL")
                .unwrap_or_else(|| OLLAMA_DEFAULT_URL.to_string()),
            ollama_model: get("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            reasoning_timeout_secs,
            reasoning_temperature,
            unknown_drug_policy,
            catalog_path: get("DRUG_CATALOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_PATH)),
        })
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: Option<T>) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| invalid(key, &raw, &e.to_string())),
        None => default.ok_or_else(|| invalid(key, "", "no default available")),
    }
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
