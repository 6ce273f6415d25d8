//! Chart Viewer Widget
//! Central panel showing summary metrics, the trend/comparison/clinic charts
//! and a preview of the filtered rows.

use crate::charts::{ChartData, ChartPlotter};
use egui::{Color32, RichText, ScrollArea};

const CARD_SPACING: f32 = 15.0;

/// How many filtered rows the preview table shows.
pub const PREVIEW_LIMIT: usize = 100;

/// Scrollable chart display area.
pub struct ChartViewer {
    pub chart_data: Option<ChartData>,
    pub preview_headers: Vec<String>,
    pub preview_rows: Vec<Vec<String>>,
}

impl Default for ChartViewer {
    fn default() -> Self {
        Self {
            chart_data: None,
            preview_headers: Vec::new(),
            preview_rows: Vec::new(),
        }
    }
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all charts and the preview.
    pub fn clear(&mut self) {
        self.chart_data = None;
        self.preview_headers.clear();
        self.preview_rows.clear();
    }

    /// Install freshly recomputed chart data and preview rows.
    pub fn set_data(
        &mut self,
        chart_data: ChartData,
        preview_headers: Vec<String>,
        preview_rows: Vec<Vec<String>>,
    ) {
        self.chart_data = Some(chart_data);
        self.preview_headers = preview_headers;
        self.preview_rows = preview_rows;
    }

    /// Draw the chart viewer.
    pub fn show(&mut self, ui: &mut egui::Ui) {
        let Some(data) = self.chart_data.clone() else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                self.draw_summary(ui, &data);
                ui.add_space(CARD_SPACING);

                Self::draw_card(ui, "Trend: Deaths by Year", |ui| {
                    ChartPlotter::draw_trend_chart(ui, &data);
                });
                ui.add_space(CARD_SPACING);

                if data.births_by_year.is_some() {
                    Self::draw_card(ui, "Births vs Deaths by Year", |ui| {
                        ChartPlotter::draw_comparison_chart(ui, &data);
                    });
                    ui.add_space(CARD_SPACING);
                }

                Self::draw_card(ui, "Deaths by Clinic (selected range)", |ui| {
                    ChartPlotter::draw_clinic_chart(ui, &data);
                });
                ui.add_space(CARD_SPACING);

                self.draw_preview(ui);
            });
    }

    /// Summary metric row: aggregated deaths/births plus matching row count.
    fn draw_summary(&self, ui: &mut egui::Ui, data: &ChartData) {
        let agg = data.aggregation.label_lower();

        ui.horizontal(|ui| {
            Self::draw_metric(
                ui,
                &format!("Deaths ({agg})"),
                data.totals.deaths.map(|v| format!("{v:.0}")),
            );
            if data.births_by_year.is_some() {
                Self::draw_metric(
                    ui,
                    &format!("Births ({agg})"),
                    data.totals.births.map(|v| format!("{v:.0}")),
                );
            }
            Self::draw_metric(
                ui,
                "Rows matching",
                Some(data.filtered_rows.to_string()),
            );
        });

        if data.is_empty() {
            ui.add_space(5.0);
            ui.label(
                RichText::new("No rows match the current filters")
                    .size(12.0)
                    .color(Color32::GRAY),
            );
        }
    }

    fn draw_metric(ui: &mut egui::Ui, label: &str, value: Option<String>) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(8.0)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.label(RichText::new(label).size(11.0).color(Color32::GRAY));
                    ui.label(
                        RichText::new(value.unwrap_or_else(|| "–".to_string()))
                            .size(20.0)
                            .strong(),
                    );
                });
            });
    }

    fn draw_card(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.label(RichText::new(title).size(15.0).strong());
                ui.add_space(8.0);
                add_contents(ui);
            });
    }

    /// Collapsing table with the first rows of the filtered extract.
    fn draw_preview(&self, ui: &mut egui::Ui) {
        if self.preview_headers.is_empty() {
            return;
        }

        let shown = self.preview_rows.len();
        ui.collapsing("Filtered data", |ui| {
            egui::Grid::new("filtered_preview")
                .striped(true)
                .min_col_width(70.0)
                .spacing([10.0, 4.0])
                .show(ui, |ui| {
                    for header in &self.preview_headers {
                        ui.label(RichText::new(header).strong().size(11.0));
                    }
                    ui.end_row();

                    for row in &self.preview_rows {
                        for cell in row {
                            ui.label(RichText::new(cell).size(11.0));
                        }
                        ui.end_row();
                    }
                });

            if shown == PREVIEW_LIMIT {
                ui.add_space(4.0);
                ui.label(
                    RichText::new(format!("Showing the first {PREVIEW_LIMIT} rows"))
                        .size(10.0)
                        .color(Color32::GRAY),
                );
            }
        });
    }
}
