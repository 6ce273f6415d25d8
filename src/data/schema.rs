//! Schema Normalizer Module
//! Maps free-form CSV headers onto the canonical column set and coerces types.

use polars::prelude::*;
use thiserror::Error;

/// Canonical column names used by the rest of the pipeline.
pub const YEAR: &str = "year";
pub const DEATHS: &str = "deaths";
pub const BIRTHS: &str = "births";
pub const CLINIC: &str = "clinic";

/// Clinic value assigned to every row when the source has no clinic-like column.
pub const CLINIC_PLACEHOLDER: &str = "All";

/// Accepted source spellings per canonical column, in priority order.
/// First alias present in the header set wins; matching is exact, no fuzzing.
const YEAR_ALIASES: &[&str] = &["year", "yr"];
const DEATHS_ALIASES: &[&str] = &["deaths", "death", "deaths_count", "death_count"];
const BIRTHS_ALIASES: &[&str] = &["births", "birth", "birth_count", "births_count"];
const CLINIC_ALIASES: &[&str] = &["clinic", "hospital", "place", "location"];

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("no year-like and deaths-like columns found; detected columns: {0:?}")]
    MissingRequired(Vec<String>),
}

/// Canonical form of a header: trimmed, lowercased, spaces replaced with
/// underscores (e.g. " Death Count " becomes "death_count").
pub fn canonical_name(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

/// First alias present in `columns`; earlier aliases win.
fn find_first<'a>(columns: &[String], aliases: &[&'a str]) -> Option<&'a str> {
    aliases
        .iter()
        .copied()
        .find(|alias| columns.iter().any(|c| c == alias))
}

/// Which source column backs each canonical column.
///
/// Detected once per load and kept immutable afterwards, so the UI can report
/// exactly which headers were used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub year: String,
    pub deaths: String,
    pub births: Option<String>,
    pub clinic: Option<String>,
}

impl ColumnMap {
    /// Resolve aliases among already-canonicalized header names.
    ///
    /// Year and deaths are required; their absence invalidates the whole
    /// dataset, not individual rows.
    pub fn detect(columns: &[String]) -> Result<Self, SchemaError> {
        let year = find_first(columns, YEAR_ALIASES);
        let deaths = find_first(columns, DEATHS_ALIASES);
        let (Some(year), Some(deaths)) = (year, deaths) else {
            return Err(SchemaError::MissingRequired(columns.to_vec()));
        };

        Ok(Self {
            year: year.to_string(),
            deaths: deaths.to_string(),
            births: find_first(columns, BIRTHS_ALIASES).map(str::to_string),
            clinic: find_first(columns, CLINIC_ALIASES).map(str::to_string),
        })
    }

    pub fn has_births(&self) -> bool {
        self.births.is_some()
    }

    /// One-line "canonical <- source" summary for the diagnostics footer.
    pub fn describe(&self) -> String {
        let mut parts = vec![
            format!("{} <- {}", YEAR, self.year),
            format!("{} <- {}", DEATHS, self.deaths),
        ];
        match &self.births {
            Some(src) => parts.push(format!("{} <- {}", BIRTHS, src)),
            None => parts.push(format!("{}: not present", BIRTHS)),
        }
        match &self.clinic {
            Some(src) => parts.push(format!("{} <- {}", CLINIC, src)),
            None => parts.push(format!("{}: placeholder \"{}\"", CLINIC, CLINIC_PLACEHOLDER)),
        }
        parts.join("  |  ")
    }
}

/// Normalize a raw frame: canonicalize headers, resolve aliases, rename the
/// detected columns to their canonical names and coerce their types.
///
/// Unparseable year/deaths/births cells become null; rows are never dropped
/// here. The returned frame holds exactly the canonical columns, in order.
pub fn normalize(mut df: DataFrame) -> Result<(DataFrame, ColumnMap), SchemaError> {
    let canonical: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| canonical_name(name))
        .collect();
    df.set_column_names(canonical.clone())?;

    let map = ColumnMap::detect(&canonical)?;

    let mut existing: Vec<&str> = vec![map.year.as_str(), map.deaths.as_str()];
    let mut renamed: Vec<&str> = vec![YEAR, DEATHS];
    if let Some(births) = &map.births {
        existing.push(births.as_str());
        renamed.push(BIRTHS);
    }
    if let Some(clinic) = &map.clinic {
        existing.push(clinic.as_str());
        renamed.push(CLINIC);
    }

    let mut columns = vec![
        col(YEAR).cast(DataType::Int64),
        col(DEATHS).cast(DataType::Float64),
    ];
    if map.has_births() {
        columns.push(col(BIRTHS).cast(DataType::Float64));
    }
    columns.push(if map.clinic.is_some() {
        col(CLINIC).cast(DataType::String)
    } else {
        lit(CLINIC_PLACEHOLDER).alias(CLINIC)
    });

    let normalized = df
        .lazy()
        .rename(&existing, &renamed, true)
        .select(columns)
        .collect()?;

    Ok((normalized, map))
}
