//! SimFin bulk-download provider.
//!
//! Downloads a full dataset (all tickers of one market) as a zip archive
//! holding a single `;`-separated CSV. Server errors are retried with
//! exponential backoff; everything else fails immediately.

use std::io::{Cursor, Read};
use std::time::Duration;

use tracing::{debug, info};

use super::provider::{DataError, DataSource, DatasetProvider, DatasetRequest, FetchResult};
use super::retry::{Failure, RetryPolicy};

/// Public SimFin API root.
pub const DEFAULT_BASE_URL: &str = "https://backend.simfin.com";

/// Key used when no credential is configured. SimFin serves the free tier
/// for it.
pub const FREE_API_KEY: &str = "free";

/// Everything the provider needs, passed in explicitly.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: FREE_API_KEY.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(300),
            retry: RetryPolicy::default(),
        }
    }
}

/// SimFin data provider.
pub struct SimFinProvider {
    client: reqwest::blocking::Client,
    config: ProviderConfig,
}

impl SimFinProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("fcflab/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Bulk download URL for a dataset.
    pub fn bulk_url(base_url: &str, request: &DatasetRequest) -> String {
        format!(
            "{}/api/bulk-download/s3?dataset={}&variant={}&market={}",
            base_url.trim_end_matches('/'),
            request.dataset.slug(),
            request.dataset.variant(),
            request.market.to_lowercase()
        )
    }

    /// One HTTP round trip, classified for the retry loop.
    fn download_once(&self, request: &DatasetRequest) -> Result<Vec<u8>, Failure<DataError>> {
        let url = Self::bulk_url(&self.config.base_url, request);
        debug!(%url, "requesting bulk dataset");

        let resp = self
            .client
            .get(&url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("api-key {}", self.config.api_key),
            )
            .send()
            .map_err(|e| Failure::Fatal(DataError::NetworkUnreachable(e.to_string())))?;

        let status = resp.status();
        if let Some(failure) = classify_status(status, request) {
            return Err(failure);
        }

        resp.bytes()
            .map(|b| b.to_vec())
            .map_err(|e| Failure::Fatal(DataError::NetworkUnreachable(e.to_string())))
    }
}

/// Map a non-success status to a retry decision. `None` means success.
///
/// 401/403 reject the credential and are fatal; 5xx is transient; every
/// other non-success status is fatal.
pub fn classify_status(
    status: reqwest::StatusCode,
    request: &DatasetRequest,
) -> Option<Failure<DataError>> {
    if status.is_success() {
        return None;
    }
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Some(Failure::Fatal(DataError::AuthenticationRequired(format!(
            "SimFin rejected the API key ({status})"
        ))));
    }
    let err = DataError::Http {
        status: status.as_u16(),
        dataset: request.dataset.to_string(),
    };
    Some(if err.is_transient() {
        Failure::Transient(err)
    } else {
        Failure::Fatal(err)
    })
}

/// Pull the single CSV out of a bulk-download archive.
pub fn extract_csv(archive: &[u8]) -> Result<String, DataError> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive))
        .map_err(|e| DataError::ResponseFormatChanged(format!("not a zip archive: {e}")))?;

    let name = zip
        .file_names()
        .find(|n| n.ends_with(".csv"))
        .map(str::to_owned)
        .ok_or_else(|| DataError::ResponseFormatChanged("archive holds no CSV file".into()))?;

    let mut file = zip
        .by_name(&name)
        .map_err(|e| DataError::ResponseFormatChanged(format!("zip entry {name}: {e}")))?;
    let mut csv = String::new();
    file.read_to_string(&mut csv)
        .map_err(|e| DataError::ResponseFormatChanged(format!("CSV is not UTF-8: {e}")))?;
    Ok(csv)
}

impl DatasetProvider for SimFinProvider {
    fn name(&self) -> &str {
        "simfin"
    }

    fn fetch(&self, request: &DatasetRequest) -> Result<FetchResult, DataError> {
        info!(dataset = %request, "downloading from SimFin");
        let archive = self
            .config
            .retry
            .run(|_attempt| self.download_once(request))?;
        let csv = extract_csv(&archive)?;
        Ok(FetchResult {
            request: request.clone(),
            csv,
            source: DataSource::SimFin,
        })
    }
}
