//! CSV export of finished dataset rows.
//!
//! Column layout and float precision come from [`OutputSchema`]; undefined
//! values are written as empty cells. The file is written atomically and its
//! BLAKE3 digest returned so identical inputs can be checked for identical
//! output.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fcflab_core::domain::DatasetRow;
use fcflab_core::OutputSchema;

use crate::pipeline::PipelineReport;

/// What was written.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows: usize,
    /// BLAKE3 of the file contents, hex.
    pub digest: String,
}

/// Render rows as CSV text with the schema's header and precision.
pub fn export_csv(rows: &[DatasetRow], schema: OutputSchema) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(schema.headers())?;

    let precision = schema.float_precision();
    let columns = schema.columns();
    let mut record = Vec::with_capacity(columns.len());
    for row in rows {
        record.clear();
        record.extend(columns.iter().map(|c| c.field.value(row).render(precision)));
        wtr.write_record(&record)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Write the dataset to `path`, creating parent directories as needed.
pub fn write_dataset(rows: &[DatasetRow], schema: OutputSchema, path: &Path) -> Result<ExportSummary> {
    let text = export_csv(rows, schema)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let tmp = path.with_extension("csv.tmp");
    std::fs::write(&tmp, &text).with_context(|| format!("failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("failed to move {} into place", path.display()))?;

    Ok(ExportSummary {
        path: path.to_path_buf(),
        rows: rows.len(),
        digest: blake3::hash(text.as_bytes()).to_hex().to_string(),
    })
}

/// Sidecar path for the run report: `fcf_dataset.csv` → `fcf_dataset.report.json`.
pub fn report_path(output: &Path) -> PathBuf {
    output.with_extension("report.json")
}

/// Write the run report as pretty JSON next to the dataset.
pub fn write_report(report: &PipelineReport, output: &Path) -> Result<PathBuf> {
    let path = report_path(output);
    let json =
        serde_json::to_string_pretty(report).context("failed to serialize run report to JSON")?;
    std::fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
