//! Chart Plotter Module
//! Creates the dashboard visualizations using egui_plot.

use crate::data::schema::{BIRTHS, CLINIC, DEATHS, YEAR};
use crate::stats::{Aggregation, FilteredView, Totals};
use egui::Color32;
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};
use polars::prelude::*;

pub const TREND_COLOR: Color32 = Color32::from_rgb(52, 152, 219); // Blue
pub const DEATHS_COLOR: Color32 = Color32::from_rgb(231, 76, 60); // Red
pub const BIRTHS_COLOR: Color32 = Color32::from_rgb(46, 204, 113); // Green

/// Chart-ready aggregates extracted from the filtered frames.
#[derive(Debug, Clone, Default)]
pub struct ChartData {
    /// (year, reduced deaths), ascending by year.
    pub deaths_by_year: Vec<[f64; 2]>,
    /// (year, reduced births); `None` when the source had no births column.
    pub births_by_year: Option<Vec<[f64; 2]>>,
    /// (clinic, reduced deaths), descending by deaths.
    pub deaths_by_clinic: Vec<(String, f64)>,
    pub totals: Totals,
    pub aggregation: Aggregation,
    pub filtered_rows: usize,
}

impl ChartData {
    pub fn from_view(view: &FilteredView, aggregation: Aggregation) -> Self {
        let births_by_year = if view.by_year.column(BIRTHS).is_ok() {
            Some(year_points(&view.by_year, BIRTHS))
        } else {
            None
        };

        Self {
            deaths_by_year: year_points(&view.by_year, DEATHS),
            births_by_year,
            deaths_by_clinic: clinic_bars(&view.by_clinic),
            totals: view.totals,
            aggregation,
            filtered_rows: view.rows.height(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.filtered_rows == 0
    }
}

/// (year, value) pairs from an aggregate frame; null cells are skipped.
fn year_points(df: &DataFrame, value_col: &str) -> Vec<[f64; 2]> {
    let (Ok(years), Ok(values)) = (
        df.column(YEAR).and_then(|c| c.i64()),
        df.column(value_col).and_then(|c| c.f64()),
    ) else {
        return Vec::new();
    };

    years
        .into_iter()
        .zip(values)
        .filter_map(|(year, value)| Some([year? as f64, value?]))
        .collect()
}

/// (clinic, deaths) pairs from the clinic aggregate frame, in frame order.
fn clinic_bars(df: &DataFrame) -> Vec<(String, f64)> {
    let (Ok(clinics), Ok(values)) = (
        df.column(CLINIC).and_then(|c| c.str()),
        df.column(DEATHS).and_then(|c| c.f64()),
    ) else {
        return Vec::new();
    };

    clinics
        .into_iter()
        .zip(values)
        .filter_map(|(clinic, value)| Some((clinic?.to_string(), value?)))
        .collect()
}

/// Draws the dashboard charts.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Line chart: reduced deaths per year across the selected range.
    pub fn draw_trend_chart(ui: &mut egui::Ui, data: &ChartData) {
        let y_label = format!("Deaths ({})", data.aggregation.label_lower());

        Plot::new("deaths_trend")
            .height(300.0)
            .allow_scroll(false)
            .x_axis_label("Year")
            .y_axis_label(y_label)
            .x_axis_formatter(|mark, _range| format!("{:.0}", mark.value))
            .show(ui, |plot_ui| {
                let line_points = PlotPoints::from_iter(data.deaths_by_year.iter().copied());
                plot_ui.line(Line::new(line_points).color(TREND_COLOR).width(2.0).name("Deaths"));

                let markers = PlotPoints::from_iter(data.deaths_by_year.iter().copied());
                plot_ui.points(Points::new(markers).radius(3.0).color(TREND_COLOR));
            });
    }

    /// Paired bars: reduced births vs deaths per year. Only called when the
    /// source actually has a births column.
    pub fn draw_comparison_chart(ui: &mut egui::Ui, data: &ChartData) {
        let Some(births) = &data.births_by_year else {
            return;
        };
        let y_label = format!("Count ({})", data.aggregation.label_lower());

        Plot::new("births_vs_deaths")
            .height(300.0)
            .allow_scroll(false)
            .legend(Legend::default())
            .x_axis_label("Year")
            .y_axis_label(y_label)
            .x_axis_formatter(|mark, _range| format!("{:.0}", mark.value))
            .show(ui, |plot_ui| {
                let deaths: Vec<Bar> = data
                    .deaths_by_year
                    .iter()
                    .map(|&[year, value]| Bar::new(year - 0.2, value).width(0.35))
                    .collect();
                let births: Vec<Bar> = births
                    .iter()
                    .map(|&[year, value]| Bar::new(year + 0.2, value).width(0.35))
                    .collect();

                plot_ui.bar_chart(BarChart::new(deaths).color(DEATHS_COLOR).name("deaths"));
                plot_ui.bar_chart(BarChart::new(births).color(BIRTHS_COLOR).name("births"));
            });
    }

    /// Horizontal bars: reduced deaths per clinic, largest at the top.
    pub fn draw_clinic_chart(ui: &mut egui::Ui, data: &ChartData) {
        let x_label = format!("Deaths ({})", data.aggregation.label_lower());
        let count = data.deaths_by_clinic.len();

        // Largest first means index 0 sits at the highest y position.
        let labels: Vec<String> = data
            .deaths_by_clinic
            .iter()
            .rev()
            .map(|(clinic, _)| clinic.clone())
            .collect();

        Plot::new("deaths_by_clinic")
            .height(300.0)
            .allow_scroll(false)
            .x_axis_label(x_label)
            .y_axis_formatter(move |mark, _range| {
                let idx = mark.value.round() as usize;
                if (mark.value - idx as f64).abs() < f64::EPSILON && idx < labels.len() {
                    labels[idx].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                let bars: Vec<Bar> = data
                    .deaths_by_clinic
                    .iter()
                    .enumerate()
                    .map(|(i, (_, value))| {
                        Bar::new((count - 1 - i) as f64, *value).width(0.6)
                    })
                    .collect();

                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .horizontal()
                        .color(DEATHS_COLOR)
                        .name("Deaths"),
                );
            });
    }
}
