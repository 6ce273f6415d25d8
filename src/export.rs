//! Filtered Extract Export Module
//! Writes the currently filtered rows to a CSV with canonical column names.

use anyhow::{Context, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Default file name offered in the save dialog.
pub const DEFAULT_EXPORT_NAME: &str = "filtered_yearly_deaths.csv";

/// Write `df` to `path` as a headered CSV. The frame already carries the
/// canonical columns in order; no index column is added.
pub fn write_filtered(df: &DataFrame, path: &Path) -> Result<()> {
    let mut out = df.clone();
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    CsvWriter::new(file)
        .include_header(true)
        .finish(&mut out)
        .with_context(|| format!("failed to write {}", path.display()))?;

    info!(path = %path.display(), rows = out.height(), "exported filtered extract");
    Ok(())
}
