//! Stats module - filtering and aggregation

mod aggregator;

pub use aggregator::{
    filter_and_aggregate, Aggregation, AggregatorError, FilterSelection, FilteredView, Totals,
};
