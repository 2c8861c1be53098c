//! fcflab runner — configuration, dataset loading, pipeline orchestration
//! and CSV export.
//!
//! This crate builds on `fcflab-core` to provide:
//! - Layered config (built-in defaults, optional TOML, API key from env)
//! - Dataset loading with fresh-cache / download / offline fallback
//! - One-call pipeline run returning rows and a run report
//! - Atomic CSV export with a content digest

pub mod config;
pub mod data_loader;
pub mod export;
pub mod pipeline;

pub use config::{api_key_from_env, ConfigError, PipelineConfig, ProviderSettings, API_KEY_ENV};
pub use data_loader::{load_dataset, LoadError, LoadOptions, LoadedDataset, PipelineInputs};
pub use export::{export_csv, report_path, write_dataset, write_report, ExportSummary};
pub use pipeline::{run_pipeline, PipelineError, PipelineOutput, PipelineReport};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<PipelineConfig>();
        assert_sync::<PipelineConfig>();
        assert_send::<LoadOptions>();
        assert_sync::<LoadOptions>();
    }

    #[test]
    fn outputs_are_send_sync() {
        assert_send::<PipelineOutput>();
        assert_sync::<PipelineOutput>();
        assert_send::<PipelineReport>();
        assert_sync::<PipelineReport>();
    }
}
