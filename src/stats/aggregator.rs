//! Filter & Aggregate Engine
//! Applies the user's year range and clinic selection to the normalized frame
//! and reduces deaths/births by year and by clinic.

use crate::data::schema::{BIRTHS, CLINIC, DEATHS, YEAR};
use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AggregatorError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Reducer applied uniformly to deaths and births within one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Aggregation {
    #[default]
    Sum,
    Mean,
}

impl Aggregation {
    pub fn label(&self) -> &'static str {
        match self {
            Aggregation::Sum => "Sum",
            Aggregation::Mean => "Mean",
        }
    }

    /// Lowercase label for axis titles and metric captions.
    pub fn label_lower(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Mean => "mean",
        }
    }

    fn reduce(&self, expr: Expr) -> Expr {
        match self {
            Aggregation::Sum => expr.sum(),
            Aggregation::Mean => expr.mean(),
        }
    }
}

/// User-selected filter state, rebuilt from the controls on every interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelection {
    /// Inclusive year range.
    pub year_range: (i64, i64),
    /// Selected clinic names; empty means no restriction.
    pub clinics: Vec<String>,
    pub aggregation: Aggregation,
}

/// Reduced deaths/births over the whole filtered set.
/// `None` when the filtered set is empty or the reducer had no values.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub deaths: Option<f64>,
    pub births: Option<f64>,
}

/// Filtered rows plus the grouped aggregates derived from them.
#[derive(Debug, Clone)]
pub struct FilteredView {
    pub rows: DataFrame,
    /// One row per distinct year, ascending. Columns: year, deaths[, births].
    pub by_year: DataFrame,
    /// One row per distinct clinic, descending by reduced deaths, ties broken
    /// by clinic name ascending. Columns: clinic, deaths.
    pub by_clinic: DataFrame,
    pub totals: Totals,
}

/// Filter `df` by the selection, then aggregate by year and by clinic.
///
/// Rows with a null year cannot satisfy the range predicate and drop out of
/// the filtered set entirely. Reducers ignore null cells; an empty filtered
/// set yields empty aggregate frames and absent totals, never an error.
pub fn filter_and_aggregate(
    df: &DataFrame,
    selection: &FilterSelection,
) -> Result<FilteredView, AggregatorError> {
    let (lo, hi) = selection.year_range;
    let mut predicate = col(YEAR).gt_eq(lit(lo)).and(col(YEAR).lt_eq(lit(hi)));
    if !selection.clinics.is_empty() {
        let wanted = Series::new("selected_clinics".into(), selection.clinics.clone());
        predicate = predicate.and(col(CLINIC).is_in(lit(wanted)));
    }

    let rows = df.clone().lazy().filter(predicate).collect()?;
    let has_births = rows.column(BIRTHS).is_ok();
    let agg = selection.aggregation;

    let mut reductions = vec![agg.reduce(col(DEATHS)).alias(DEATHS)];
    if has_births {
        reductions.push(agg.reduce(col(BIRTHS)).alias(BIRTHS));
    }

    let by_year = rows
        .clone()
        .lazy()
        .group_by([col(YEAR)])
        .agg(reductions.clone())
        .sort([YEAR], SortMultipleOptions::default())
        .collect()?;

    // Null clinics match no selection and form no group of their own.
    let by_clinic = rows
        .clone()
        .lazy()
        .filter(col(CLINIC).is_not_null())
        .group_by([col(CLINIC)])
        .agg([agg.reduce(col(DEATHS)).alias(DEATHS)])
        .sort_by_exprs(
            [col(DEATHS), col(CLINIC)],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
        .collect()?;

    let totals = if rows.height() == 0 {
        Totals::default()
    } else {
        let reduced = rows.clone().lazy().select(reductions).collect()?;
        Totals {
            deaths: scalar(&reduced, DEATHS),
            births: if has_births {
                scalar(&reduced, BIRTHS)
            } else {
                None
            },
        }
    };

    Ok(FilteredView {
        rows,
        by_year,
        by_clinic,
        totals,
    })
}

fn scalar(df: &DataFrame, name: &str) -> Option<f64> {
    df.column(name).ok()?.f64().ok()?.get(0)
}
