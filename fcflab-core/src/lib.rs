//! fcflab core — quarterly free-cash-flow fundamentals joined with share prices.
//!
//! This crate holds everything between raw provider tables and finished
//! output rows:
//! - Provider access (SimFin bulk download), retry policy, dataset cache
//! - Fundamentals builder (CapEx column probe, FCF, FCF per share)
//! - Price loader and report-date → trade-date aligner
//! - Trailing growth over per-ticker sequences
//! - Metrics finalizer and the output schema contract

pub mod align;
pub mod data;
pub mod domain;
pub mod fundamentals;
pub mod growth;
pub mod metrics;
pub mod prices;
pub mod schema;

pub use align::{align_prices, find_aligned_price, Alignment, DEFAULT_WINDOW_DAYS};
pub use fundamentals::{build_fundamentals, resolve_capex_column, FundamentalsError, FundamentalsOptions};
pub use metrics::finalize;
pub use prices::load_price_book;
pub use schema::{Cell, Field, OutputColumn, OutputSchema};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: pipeline types can cross threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::FundamentalRow>();
        require_sync::<domain::FundamentalRow>();
        require_send::<domain::DatasetRow>();
        require_sync::<domain::DatasetRow>();
        require_send::<domain::PriceBook>();
        require_sync::<domain::PriceBook>();
        require_send::<data::RawTable>();
        require_sync::<data::RawTable>();
        require_send::<data::SimFinProvider>();
        require_sync::<data::SimFinProvider>();
        require_send::<data::DatasetCache>();
        require_sync::<data::DatasetCache>();
        require_send::<OutputSchema>();
        require_sync::<OutputSchema>();
    }

    /// DatasetProvider must stay object safe; the loader takes `&dyn`.
    #[test]
    fn dataset_provider_is_object_safe() {
        fn _takes_dyn(p: &dyn data::DatasetProvider) -> &str {
            p.name()
        }
    }
}
