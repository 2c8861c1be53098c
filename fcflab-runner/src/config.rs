//! Pipeline configuration.
//!
//! Every setting has a built-in default, so the pipeline runs with no config
//! file at all. An optional TOML file overrides individual fields. The API
//! credential is deliberately not part of this struct: it comes from the
//! environment (or a `.env` file) and is handed to the provider directly.

use fcflab_core::data::simfin::{DEFAULT_BASE_URL, FREE_API_KEY};
use fcflab_core::data::{Dataset, DatasetRequest, ProviderConfig, RetryPolicy};
use fcflab_core::fundamentals::DEFAULT_CAPEX_CANDIDATES;
use fcflab_core::{FundamentalsOptions, OutputSchema, DEFAULT_WINDOW_DAYS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Upper bound for `price_window_days`.
pub const MAX_WINDOW_DAYS: i64 = 366;

/// Environment variable holding the provider API key.
pub const API_KEY_ENV: &str = "SIMFIN_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// HTTP settings for the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 300,
        }
    }
}

/// Everything one pipeline run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Market code, e.g. `US`.
    pub market: String,
    /// Reports dated before this year are dropped.
    pub start_year: i32,
    /// Dataset cache directory.
    pub data_dir: PathBuf,
    /// Output CSV path.
    pub output: PathBuf,
    /// Output layout.
    pub schema: OutputSchema,
    /// Cached datasets younger than this are reused without a download.
    pub refresh_days: u32,
    /// Calendar days after the report date a trade may fall on.
    pub price_window_days: i64,
    /// CapEx column names, highest priority first.
    pub capex_candidates: Vec<String>,
    pub retry: RetryPolicy,
    pub provider: ProviderSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            market: "US".to_string(),
            start_year: 2000,
            data_dir: PathBuf::from("simfin_data"),
            output: PathBuf::from("fcf_dataset.csv"),
            schema: OutputSchema::Basic,
            refresh_days: 365,
            price_window_days: DEFAULT_WINDOW_DAYS,
            capex_candidates: DEFAULT_CAPEX_CANDIDATES.iter().map(|s| s.to_string()).collect(),
            retry: RetryPolicy::default(),
            provider: ProviderSettings::default(),
        }
    }
}

impl PipelineConfig {
    /// Load from a TOML file and validate.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse from a TOML string and validate. Missing fields keep defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.market.trim().is_empty() {
            return Err(ConfigError::Invalid("market must not be empty".into()));
        }
        if self.capex_candidates.is_empty() {
            return Err(ConfigError::Invalid(
                "capex_candidates must list at least one column name".into(),
            ));
        }
        if !(0..=MAX_WINDOW_DAYS).contains(&self.price_window_days) {
            return Err(ConfigError::Invalid(format!(
                "price_window_days must be in 0..={MAX_WINDOW_DAYS}, got {}",
                self.price_window_days
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid("retry.max_attempts must be >= 1".into()));
        }
        Ok(())
    }

    /// The three datasets this run reads.
    pub fn dataset_requests(&self) -> [DatasetRequest; 3] {
        Dataset::ALL.map(|d| DatasetRequest::new(d, self.market.clone()))
    }

    pub fn fundamentals_options(&self) -> FundamentalsOptions {
        FundamentalsOptions {
            capex_candidates: self.capex_candidates.clone(),
            start_year: self.start_year,
            windows: self.schema.windows().to_vec(),
            include_income_details: self.schema.needs_income_details(),
        }
    }

    pub fn provider_config(&self, api_key: String) -> ProviderConfig {
        ProviderConfig {
            api_key,
            base_url: self.provider.base_url.clone(),
            timeout: Duration::from_secs(self.provider.timeout_secs),
            retry: self.retry,
        }
    }
}

/// Provider API key from the environment, after loading `.env` if present.
/// Falls back to the free-tier key.
pub fn api_key_from_env() -> String {
    dotenvy::dotenv().ok();
    resolve_api_key(std::env::var(API_KEY_ENV).ok())
}

/// Blank or missing keys fall back to the free-tier key.
pub fn resolve_api_key(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| FREE_API_KEY.to_string())
}
