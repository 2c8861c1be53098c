//! Data provider trait and structured error types.
//!
//! The DatasetProvider trait abstracts over bulk data sources (SimFin today)
//! so the loader can swap implementations and tests can plug in fixtures.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} from provider for {dataset}")]
    Http { status: u16, dataset: String },

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("missing column '{column}' in {table} table")]
    MissingColumn { table: String, column: String },

    #[error("bad value '{value}' in column '{column}' of {table} table (row {row})")]
    BadValue {
        table: String,
        column: String,
        row: usize,
        value: String,
    },

    #[error("cache error: {0}")]
    CacheError(String),

    #[error("no cached data for '{dataset}' and network access is disabled")]
    NoCachedData { dataset: String },

    #[error("data error: {0}")]
    Other(String),
}

impl DataError {
    /// Server-side failures (HTTP 5xx) are worth retrying; nothing else is.
    pub fn is_transient(&self) -> bool {
        matches!(self, DataError::Http { status, .. } if (500..600).contains(status))
    }
}

/// The three bulk tables the pipeline needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    CashFlow,
    Income,
    SharePrices,
}

impl Dataset {
    pub const ALL: [Dataset; 3] = [Dataset::CashFlow, Dataset::Income, Dataset::SharePrices];

    /// Provider-side dataset name.
    pub fn slug(self) -> &'static str {
        match self {
            Dataset::CashFlow => "cashflow",
            Dataset::Income => "income",
            Dataset::SharePrices => "shareprices",
        }
    }

    /// Fundamentals are quarterly, prices are daily.
    pub fn variant(self) -> &'static str {
        match self {
            Dataset::CashFlow | Dataset::Income => "quarterly",
            Dataset::SharePrices => "daily",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.slug(), self.variant())
    }
}

/// A dataset for a specific market.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetRequest {
    pub dataset: Dataset,
    pub market: String,
}

impl DatasetRequest {
    pub fn new(dataset: Dataset, market: impl Into<String>) -> Self {
        Self {
            dataset,
            market: market.into(),
        }
    }

    /// `{market}-{dataset}-{variant}`, e.g. `us-cashflow-quarterly`.
    pub fn file_stem(&self) -> String {
        format!(
            "{}-{}-{}",
            self.market.to_lowercase(),
            self.dataset.slug(),
            self.dataset.variant()
        )
    }
}

impl fmt::Display for DatasetRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.dataset, self.market)
    }
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    SimFin,
    Cache,
    Fixture,
}

/// Result of a successful fetch: the CSV text of one dataset.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub request: DatasetRequest,
    pub csv: String,
    pub source: DataSource,
}

/// Trait for bulk dataset providers.
///
/// Implementations handle the specifics of one source, including retries.
/// The cache layer sits above this trait; providers don't know about it.
pub trait DatasetProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch one full dataset as `;`-separated CSV text.
    fn fetch(&self, request: &DatasetRequest) -> Result<FetchResult, DataError>;
}
