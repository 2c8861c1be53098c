//! End-to-end dataset build: load → fundamentals → prices → align → finalize.

use fcflab_core::data::{DataError, DatasetCache, DatasetProvider};
use fcflab_core::domain::{DatasetRow, FundamentalRow};
use fcflab_core::{
    align_prices, build_fundamentals, finalize, load_price_book, FundamentalsError, OutputSchema,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::PipelineConfig;
use crate::data_loader::{load_dataset, LoadError, LoadOptions, LoadedDataset, PipelineInputs};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Fundamentals(#[from] FundamentalsError),

    #[error("price table: {0}")]
    Prices(#[from] DataError),
}

/// Row counts and provenance of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Joined, year-filtered fundamentals rows.
    pub fundamentals: usize,
    /// Rows that found a trade inside the window.
    pub aligned: usize,
    /// Rows dropped because no trade fell inside the window.
    pub dropped_without_price: usize,
    /// Distinct tickers in the output.
    pub tickers: usize,
    pub price_observations: usize,
    /// Combined hash of the three input tables.
    pub dataset_hash: String,
}

#[derive(Debug)]
pub struct PipelineOutput {
    pub schema: OutputSchema,
    pub rows: Vec<DatasetRow>,
    pub report: PipelineReport,
}

/// Load the datasets and build the output rows.
///
/// Cash flow and income are loaded first and the fundamentals built from
/// them, so a missing CapEx column aborts before the share-price table is
/// fetched.
pub fn run_pipeline(
    config: &PipelineConfig,
    cache: &DatasetCache,
    provider: Option<&dyn DatasetProvider>,
    opts: &LoadOptions,
) -> Result<PipelineOutput, PipelineError> {
    let [cashflow_req, income_req, prices_req] = config.dataset_requests();

    info!(market = %config.market, "loading cash-flow and income tables");
    let cashflow = load_dataset(&cashflow_req, cache, provider, opts)?;
    let income = load_dataset(&income_req, cache, provider, opts)?;
    let fundamentals = fundamentals_stage(config, &cashflow, &income)?;

    info!(market = %config.market, "loading daily share prices");
    let shareprices = load_dataset(&prices_req, cache, provider, opts)?;

    let inputs = PipelineInputs {
        cashflow,
        income,
        shareprices,
    };
    price_stage(config, &inputs, fundamentals)
}

fn fundamentals_stage(
    config: &PipelineConfig,
    cashflow: &LoadedDataset,
    income: &LoadedDataset,
) -> Result<Vec<FundamentalRow>, PipelineError> {
    let fundamentals = build_fundamentals(
        &cashflow.table,
        &income.table,
        &config.fundamentals_options(),
    )?;
    info!(rows = fundamentals.len(), start_year = config.start_year, "built fundamentals");
    Ok(fundamentals)
}

fn price_stage(
    config: &PipelineConfig,
    inputs: &PipelineInputs,
    fundamentals: Vec<FundamentalRow>,
) -> Result<PipelineOutput, PipelineError> {
    let schema = config.schema;
    let fundamentals_count = fundamentals.len();

    let prices = load_price_book(&inputs.shareprices.table)?;
    info!(
        tickers = prices.ticker_count(),
        observations = prices.observation_count(),
        "loaded daily share prices"
    );

    info!(window_days = config.price_window_days, "aligning prices");
    let alignment = align_prices(fundamentals, &prices, config.price_window_days);
    let aligned_count = alignment.aligned.len();

    let rows = finalize(alignment.aligned, schema.windows());
    let tickers = count_tickers(&rows);
    info!(rows = rows.len(), tickers, dropped = alignment.unmatched, "computed market cap and price growth");

    Ok(PipelineOutput {
        schema,
        rows,
        report: PipelineReport {
            fundamentals: fundamentals_count,
            aligned: aligned_count,
            dropped_without_price: alignment.unmatched,
            tickers,
            price_observations: prices.observation_count(),
            dataset_hash: inputs.dataset_hash(),
        },
    })
}

/// Rows are ordered by ticker, so counting boundaries suffices.
fn count_tickers(rows: &[DatasetRow]) -> usize {
    let mut count = 0;
    let mut last: Option<&str> = None;
    for row in rows {
        if last != Some(row.ticker()) {
            count += 1;
            last = Some(row.ticker());
        }
    }
    count
}
