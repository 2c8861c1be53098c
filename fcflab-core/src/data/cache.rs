//! On-disk dataset cache.
//!
//! Layout: `{cache_dir}/{market}-{dataset}-{variant}.csv` with a
//! `{...}.meta.json` sidecar next to it.
//!
//! Features:
//! - Atomic writes (write to .tmp, rename into place)
//! - Refresh age: a dataset younger than `refresh_days` is reused as-is
//! - Integrity validation on load (BLAKE3 hash against the sidecar)
//! - Quarantine for corrupt files ({filename}.quarantined)

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::provider::{DataError, DataSource, DatasetRequest};

/// Metadata sidecar for a cached dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheMeta {
    pub dataset: String,
    pub fetched_at: NaiveDateTime,
    pub byte_len: usize,
    pub data_hash: String,
    pub source: DataSource,
}

/// How fresh a cached dataset is relative to the refresh age.
#[derive(Debug, Clone, PartialEq)]
pub enum Freshness {
    Missing,
    Fresh { age_days: i64 },
    Stale { age_days: i64 },
}

/// Cache status for a single dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStatus {
    pub dataset: String,
    pub cached: bool,
    pub fetched_at: Option<NaiveDateTime>,
    pub byte_len: Option<usize>,
    pub data_hash: Option<String>,
}

/// The dataset cache.
#[derive(Debug, Clone)]
pub struct DatasetCache {
    cache_dir: PathBuf,
}

impl DatasetCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Root directory of the cache.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn csv_path(&self, request: &DatasetRequest) -> PathBuf {
        self.cache_dir.join(format!("{}.csv", request.file_stem()))
    }

    fn meta_path(&self, request: &DatasetRequest) -> PathBuf {
        self.cache_dir.join(format!("{}.meta.json", request.file_stem()))
    }

    /// Store a dataset and its sidecar. Returns the sidecar written.
    pub fn write(
        &self,
        request: &DatasetRequest,
        csv: &str,
        source: DataSource,
    ) -> Result<CacheMeta, DataError> {
        fs::create_dir_all(&self.cache_dir)
            .map_err(|e| DataError::CacheError(format!("failed to create dir: {e}")))?;

        let path = self.csv_path(request);
        write_atomic(&path, csv.as_bytes())?;

        let meta = CacheMeta {
            dataset: request.file_stem(),
            fetched_at: Utc::now().naive_utc(),
            byte_len: csv.len(),
            data_hash: blake3::hash(csv.as_bytes()).to_hex().to_string(),
            source,
        };
        let meta_json = serde_json::to_string_pretty(&meta)
            .map_err(|e| DataError::CacheError(format!("meta serialization: {e}")))?;
        write_atomic(&self.meta_path(request), meta_json.as_bytes())?;

        Ok(meta)
    }

    /// Load a cached dataset.
    ///
    /// A file whose hash no longer matches its sidecar is quarantined and
    /// reported as not cached.
    pub fn load(&self, request: &DatasetRequest) -> Result<String, DataError> {
        let path = self.csv_path(request);
        if !path.exists() {
            return Err(DataError::NoCachedData {
                dataset: request.file_stem(),
            });
        }

        let csv = fs::read_to_string(&path)
            .map_err(|e| DataError::CacheError(format!("read {}: {e}", path.display())))?;

        if let Some(meta) = self.get_meta(request) {
            let hash = blake3::hash(csv.as_bytes()).to_hex().to_string();
            if hash != meta.data_hash {
                let quarantine = path.with_extension("csv.quarantined");
                warn!(
                    path = %path.display(),
                    "cached dataset does not match its recorded hash; quarantining"
                );
                let _ = fs::rename(&path, &quarantine);
                let _ = fs::remove_file(self.meta_path(request));
                return Err(DataError::NoCachedData {
                    dataset: request.file_stem(),
                });
            }
        }

        Ok(csv)
    }

    /// Sidecar for a dataset, if one exists and parses.
    pub fn get_meta(&self, request: &DatasetRequest) -> Option<CacheMeta> {
        let content = fs::read_to_string(self.meta_path(request)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// When the cached copy was fetched. Falls back to the file's mtime for
    /// files dropped into the cache by hand.
    pub fn fetched_at(&self, request: &DatasetRequest) -> Option<NaiveDateTime> {
        if let Some(meta) = self.get_meta(request) {
            return Some(meta.fetched_at);
        }
        let modified = fs::metadata(self.csv_path(request)).ok()?.modified().ok()?;
        Some(DateTime::<Utc>::from(modified).naive_utc())
    }

    /// Compare the cached copy's age against `refresh_days`.
    pub fn freshness(
        &self,
        request: &DatasetRequest,
        refresh_days: u32,
        now: NaiveDateTime,
    ) -> Freshness {
        if !self.csv_path(request).exists() {
            return Freshness::Missing;
        }
        match self.fetched_at(request) {
            None => Freshness::Stale { age_days: i64::MAX },
            Some(fetched_at) => {
                let age_days = (now - fetched_at).num_days();
                if age_days < i64::from(refresh_days) {
                    Freshness::Fresh { age_days }
                } else {
                    Freshness::Stale { age_days }
                }
            }
        }
    }

    /// Report which datasets are cached.
    pub fn status(&self, requests: &[DatasetRequest]) -> Vec<CacheStatus> {
        requests
            .iter()
            .map(|req| {
                let meta = self.get_meta(req);
                CacheStatus {
                    dataset: req.file_stem(),
                    cached: self.csv_path(req).exists(),
                    fetched_at: self.fetched_at(req),
                    byte_len: meta.as_ref().map(|m| m.byte_len),
                    data_hash: meta.map(|m| m.data_hash),
                }
            })
            .collect()
    }
}

/// Write to `{path}.tmp`, then rename into place.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DataError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp_path = PathBuf::from(tmp);

    fs::write(&tmp_path, bytes)
        .map_err(|e| DataError::CacheError(format!("write {}: {e}", tmp_path.display())))?;
    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        DataError::CacheError(format!("atomic rename failed: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::Dataset;
    use chrono::Duration;

    const CSV: &str = "Ticker;Report Date\nAAPL;2021-03-31\n";

    fn req() -> DatasetRequest {
        DatasetRequest::new(Dataset::CashFlow, "US")
    }

    #[test]
    fn write_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DatasetCache::new(dir.path());
        let meta = cache.write(&req(), CSV, DataSource::SimFin).unwrap();

        assert_eq!(meta.dataset, "us-cashflow-quarterly");
        assert_eq!(meta.byte_len, CSV.len());
        assert_eq!(cache.load(&req()).unwrap(), CSV);
        assert!(cache.csv_path(&req()).ends_with("us-cashflow-quarterly.csv"));
        assert_eq!(cache.get_meta(&req()), Some(meta));
    }

    #[test]
    fn load_missing_reports_no_cached_data() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DatasetCache::new(dir.path());
        assert!(matches!(
            cache.load(&req()),
            Err(DataError::NoCachedData { .. })
        ));
    }

    #[test]
    fn tampered_file_is_quarantined() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DatasetCache::new(dir.path());
        cache.write(&req(), CSV, DataSource::SimFin).unwrap();
        fs::write(cache.csv_path(&req()), "Ticker\nEVIL\n").unwrap();

        assert!(matches!(
            cache.load(&req()),
            Err(DataError::NoCachedData { .. })
        ));
        assert!(!cache.csv_path(&req()).exists());
        assert!(dir
            .path()
            .join("us-cashflow-quarterly.csv.quarantined")
            .exists());
    }

    #[test]
    fn freshness_respects_refresh_days() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DatasetCache::new(dir.path());
        assert_eq!(
            cache.freshness(&req(), 365, Utc::now().naive_utc()),
            Freshness::Missing
        );

        let now = cache.write(&req(), CSV, DataSource::SimFin).unwrap().fetched_at;
        assert!(matches!(
            cache.freshness(&req(), 365, now + Duration::days(10)),
            Freshness::Fresh { age_days: 10 }
        ));
        assert!(matches!(
            cache.freshness(&req(), 365, now + Duration::days(400)),
            Freshness::Stale { age_days: 400 }
        ));
    }

    #[test]
    fn hand_placed_file_without_sidecar_still_loads() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DatasetCache::new(dir.path());
        fs::write(cache.csv_path(&req()), CSV).unwrap();

        assert_eq!(cache.load(&req()).unwrap(), CSV);
        assert!(cache.fetched_at(&req()).is_some());
        let status = cache.status(&[req()]);
        assert!(status[0].cached);
        assert!(status[0].data_hash.is_none());
    }
}
