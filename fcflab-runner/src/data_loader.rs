//! Dataset loading for the runner.
//!
//! Resolves each dataset through the cache with the following policy:
//! 1. Cached and younger than `refresh_days` → use it
//! 2. Offline → use whatever is cached (even if stale), else fail
//! 3. Provider available → download, cache, use
//! 4. Otherwise → fail with a clear error

use chrono::Utc;
use fcflab_core::data::{
    DataError, DataSource, DatasetCache, DatasetProvider, DatasetRequest, Freshness, RawTable,
    PROVIDER_DELIMITER,
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no cached data for '{dataset}' and no network access (run without --offline)")]
    NoCachedDataOffline { dataset: String },

    #[error("no cached data for '{dataset}' and no provider configured")]
    NoProvider { dataset: String },

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Options controlling how datasets are loaded.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Cached copies younger than this many days are reused.
    pub refresh_days: u32,
    /// If true, never make network requests.
    pub offline: bool,
    /// Force re-download even if a fresh copy is cached.
    pub force: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            refresh_days: 365,
            offline: false,
            force: false,
        }
    }
}

/// A parsed dataset with its provenance.
#[derive(Debug)]
pub struct LoadedDataset {
    pub request: DatasetRequest,
    pub table: RawTable,
    pub source: DataSource,
    /// BLAKE3 over the raw CSV text.
    pub data_hash: String,
}

/// The three tables one pipeline run consumes.
#[derive(Debug)]
pub struct PipelineInputs {
    pub cashflow: LoadedDataset,
    pub income: LoadedDataset,
    pub shareprices: LoadedDataset,
}

impl PipelineInputs {
    /// Deterministic hash over all three inputs.
    pub fn dataset_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for ds in [&self.cashflow, &self.income, &self.shareprices] {
            hasher.update(ds.request.file_stem().as_bytes());
            hasher.update(ds.data_hash.as_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }
}

/// Load one dataset following the cache policy above.
pub fn load_dataset(
    request: &DatasetRequest,
    cache: &DatasetCache,
    provider: Option<&dyn DatasetProvider>,
    opts: &LoadOptions,
) -> Result<LoadedDataset, LoadError> {
    let freshness = cache.freshness(request, opts.refresh_days, Utc::now().naive_utc());

    // Step 1: fresh cache
    if !opts.force {
        if let Freshness::Fresh { age_days } = freshness {
            match cache.load(request) {
                Ok(csv) => {
                    info!(dataset = %request, age_days, "using cached dataset");
                    return parse(request, csv, DataSource::Cache);
                }
                Err(DataError::NoCachedData { .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    // Step 2: offline → stale cache or fail
    if opts.offline {
        return match cache.load(request) {
            Ok(csv) => {
                if let Freshness::Stale { age_days } = freshness {
                    warn!(dataset = %request, age_days, "offline: using stale cached dataset");
                }
                parse(request, csv, DataSource::Cache)
            }
            Err(DataError::NoCachedData { .. }) => Err(LoadError::NoCachedDataOffline {
                dataset: request.file_stem(),
            }),
            Err(e) => Err(e.into()),
        };
    }

    // Step 3: download
    let Some(provider) = provider else {
        return match cache.load(request) {
            Ok(csv) => parse(request, csv, DataSource::Cache),
            Err(DataError::NoCachedData { .. }) => Err(LoadError::NoProvider {
                dataset: request.file_stem(),
            }),
            Err(e) => Err(e.into()),
        };
    };

    if let Freshness::Stale { age_days } = freshness {
        info!(dataset = %request, age_days, "cached dataset is stale; refreshing");
    }
    let fetched = provider.fetch(request)?;
    let meta = cache.write(request, &fetched.csv, fetched.source)?;
    info!(
        dataset = %request,
        provider = provider.name(),
        bytes = meta.byte_len,
        "cached dataset"
    );
    parse(request, fetched.csv, fetched.source)
}

fn parse(
    request: &DatasetRequest,
    csv: String,
    source: DataSource,
) -> Result<LoadedDataset, LoadError> {
    let data_hash = blake3::hash(csv.as_bytes()).to_hex().to_string();
    let table = RawTable::from_csv(request.dataset.slug(), &csv, PROVIDER_DELIMITER)?;
    debug!(
        dataset = %request,
        rows = table.len(),
        columns = table.headers().len(),
        source = ?source,
        "parsed dataset"
    );
    Ok(LoadedDataset {
        request: request.clone(),
        table,
        source,
        data_hash,
    })
}
