//! Provider access, raw tables, retry and the on-disk dataset cache.

pub mod cache;
pub mod provider;
pub mod retry;
pub mod simfin;
pub mod table;

pub use cache::{CacheMeta, CacheStatus, DatasetCache, Freshness};
pub use provider::{DataError, DataSource, Dataset, DatasetProvider, DatasetRequest, FetchResult};
pub use retry::{Failure, RetryPolicy};
pub use simfin::{ProviderConfig, SimFinProvider};
pub use table::{RawTable, PROVIDER_DELIMITER};
