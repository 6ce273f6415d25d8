//! CSV Data Loader Module
//! One-shot CSV read with the normalized frame cached per source path.

use crate::data::schema::{self, ColumnMap, SchemaError};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("CSV file not found: {}", .0.display())]
    SourceMissing(PathBuf),
    #[error("Failed to read CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("No data loaded")]
    NoData,
}

/// Normalized dataset plus the column mapping it was built from.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub df: DataFrame,
    pub columns: ColumnMap,
}

impl Dataset {
    /// Distinct non-null clinic names, sorted ascending.
    pub fn clinic_names(&self) -> Vec<String> {
        self.df
            .column(schema::CLINIC)
            .ok()
            .and_then(|col| col.unique().ok())
            .map(|unique| {
                let series = unique.as_materialized_series();
                let mut names: Vec<String> = (0..series.len())
                    .filter_map(|i| {
                        let val = series.get(i).ok()?;
                        if val.is_null() {
                            None
                        } else {
                            Some(val.to_string().trim_matches('"').to_string())
                        }
                    })
                    .collect();
                names.sort();
                names
            })
            .unwrap_or_default()
    }

    /// Min/max year over the dataset; `None` when every year value is null.
    pub fn year_bounds(&self) -> Option<(i64, i64)> {
        let years = self.df.column(schema::YEAR).ok()?.i64().ok()?;
        Some((years.min()?, years.max()?))
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    pub fn has_births(&self) -> bool {
        self.columns.has_births()
    }
}

/// Loads CSV files and keeps the normalized result cached per source path.
///
/// The cache is invalidated only by a path change; repeated interactions on
/// the same file reuse the normalized frame.
pub struct DataLoader {
    cached: Option<(PathBuf, Dataset)>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self { cached: None }
    }

    /// Load and normalize `path`, reusing the cached dataset when the path
    /// is unchanged.
    pub fn load(&mut self, path: &Path) -> Result<&Dataset, LoaderError> {
        let stale = self
            .cached
            .as_ref()
            .map_or(true, |(cached_path, _)| cached_path != path);

        if stale {
            let dataset = Self::read_normalized(path)?;
            self.cached = Some((path.to_path_buf(), dataset));
        }

        self.cached
            .as_ref()
            .map(|(_, dataset)| dataset)
            .ok_or(LoaderError::NoData)
    }

    /// Read and normalize a CSV without touching the cache (used by the
    /// background load thread).
    pub fn read_normalized(path: &Path) -> Result<Dataset, LoaderError> {
        if !path.is_file() {
            return Err(LoaderError::SourceMissing(path.to_path_buf()));
        }

        let raw = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        let (df, columns) = schema::normalize(raw)?;
        info!(
            path = %path.display(),
            rows = df.height(),
            births = columns.has_births(),
            "loaded and normalized CSV"
        );

        Ok(Dataset { df, columns })
    }

    /// Install an already-normalized dataset for `path` (used when the read
    /// happened on a background thread).
    pub fn install(&mut self, path: PathBuf, dataset: Dataset) {
        self.cached = Some((path, dataset));
    }

    /// Whether `path` is the currently cached source.
    pub fn is_cached(&self, path: &Path) -> bool {
        self.cached
            .as_ref()
            .is_some_and(|(cached_path, _)| cached_path == path)
    }

    /// The currently loaded dataset, if any.
    pub fn current(&self) -> Option<&Dataset> {
        self.cached.as_ref().map(|(_, dataset)| dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_source_is_fatal_before_parsing() {
        let mut loader = DataLoader::new();
        let err = loader
            .load(Path::new("definitely/not/here.csv"))
            .unwrap_err();
        assert!(matches!(err, LoaderError::SourceMissing(_)));
        assert!(loader.current().is_none());
    }

    #[test]
    fn test_year_bounds_none_when_all_years_null() {
        let df = df![
            "year" => [None::<i64>, None],
            "deaths" => [1.0, 2.0],
            "clinic" => ["a", "b"],
        ]
        .unwrap();
        let dataset = Dataset {
            df,
            columns: ColumnMap {
                year: "year".into(),
                deaths: "deaths".into(),
                births: None,
                clinic: Some("clinic".into()),
            },
        };
        assert_eq!(dataset.year_bounds(), None);
    }

    #[test]
    fn test_clinic_names_sorted_and_null_free() {
        let df = df![
            "year" => [1841i64, 1842, 1843],
            "deaths" => [1.0, 2.0, 3.0],
            "clinic" => [Some("clinic 2"), None, Some("clinic 1")],
        ]
        .unwrap();
        let dataset = Dataset {
            df,
            columns: ColumnMap {
                year: "year".into(),
                deaths: "deaths".into(),
                births: None,
                clinic: Some("clinic".into()),
            },
        };
        assert_eq!(dataset.clinic_names(), vec!["clinic 1", "clinic 2"]);
    }
}
