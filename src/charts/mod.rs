//! Charts module - chart data extraction and rendering

mod plotter;

pub use plotter::{ChartData, ChartPlotter};
