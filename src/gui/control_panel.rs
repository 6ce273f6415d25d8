//! Control Panel Widget
//! Left side panel with the data source picker and filter controls.

use crate::stats::{Aggregation, FilterSelection};
use egui::{Color32, RichText, ScrollArea};
use std::path::PathBuf;

/// User filter state backing the sidebar controls.
#[derive(Clone, Default)]
pub struct UserSettings {
    pub csv_path: Option<PathBuf>,
    pub year_lo: i64,
    pub year_hi: i64,
    /// Parallel to `ControlPanel::clinics`.
    pub selected_clinics: Vec<bool>,
    pub aggregation: Aggregation,
}

/// Left side control panel with file selection and filter controls.
pub struct ControlPanel {
    pub settings: UserSettings,
    pub clinics: Vec<String>,
    pub year_bounds: (i64, i64),
    pub has_data: bool,
    pub status: String,
    pub columns_note: String,
    pub export_path: Option<PathBuf>,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            settings: UserSettings::default(),
            clinics: Vec::new(),
            year_bounds: (0, 0),
            has_data: false,
            status: "Ready".to_string(),
            columns_note: String::new(),
            export_path: None,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the controls for a freshly loaded dataset.
    ///
    /// `preselect` clinics (alphabetical order) start checked; zero starts
    /// with none checked, which leaves the clinic filter unrestricted.
    pub fn update_dataset(
        &mut self,
        clinics: Vec<String>,
        year_bounds: (i64, i64),
        preselect: usize,
        columns_note: String,
    ) {
        self.year_bounds = year_bounds;
        self.settings.year_lo = year_bounds.0;
        self.settings.year_hi = year_bounds.1;
        self.settings.selected_clinics = (0..clinics.len()).map(|i| i < preselect).collect();
        self.clinics = clinics;
        self.columns_note = columns_note;
        self.has_data = true;
        self.export_path = None;
    }

    /// Build the current filter selection from widget state.
    pub fn selection(&self) -> FilterSelection {
        FilterSelection {
            year_range: (self.settings.year_lo, self.settings.year_hi),
            clinics: self
                .clinics
                .iter()
                .zip(&self.settings.selected_clinics)
                .filter(|(_, &selected)| selected)
                .map(|(clinic, _)| clinic.clone())
                .collect(),
            aggregation: self.settings.aggregation,
        }
    }

    /// Draw the control panel.
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🩺 Mortality Insights")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Yearly deaths by clinic")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .settings
                        .csv_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.settings.csv_path.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filters Section =====
        ui.label(RichText::new("🔧 Filters").size(14.0).strong());
        ui.add_space(8.0);

        if !self.has_data {
            ui.label(
                RichText::new("Load a CSV to enable filtering")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        } else {
            let (min_year, max_year) = self.year_bounds;

            ui.label("Year range:");
            let lo_changed = ui
                .add(egui::Slider::new(&mut self.settings.year_lo, min_year..=max_year).text("From"))
                .changed();
            let hi_changed = ui
                .add(egui::Slider::new(&mut self.settings.year_hi, min_year..=max_year).text("To"))
                .changed();

            // Keep the range well formed whichever handle moved.
            if lo_changed && self.settings.year_lo > self.settings.year_hi {
                self.settings.year_hi = self.settings.year_lo;
            }
            if hi_changed && self.settings.year_hi < self.settings.year_lo {
                self.settings.year_lo = self.settings.year_hi;
            }
            if lo_changed || hi_changed {
                action = ControlPanelAction::FilterChanged;
            }

            ui.add_space(10.0);
            ui.label("Clinics (none checked = all):");
            egui::Frame::none()
                .fill(ui.visuals().widgets.noninteractive.bg_fill)
                .rounding(5.0)
                .inner_margin(5.0)
                .show(ui, |ui| {
                    ScrollArea::vertical().max_height(140.0).show(ui, |ui| {
                        for (i, clinic) in self.clinics.iter().enumerate() {
                            if i < self.settings.selected_clinics.len()
                                && ui
                                    .checkbox(&mut self.settings.selected_clinics[i], clinic)
                                    .changed()
                            {
                                action = ControlPanelAction::FilterChanged;
                            }
                        }
                    });
                });

            ui.add_space(5.0);
            ui.horizontal(|ui| {
                if ui.small_button("Select All").clicked() {
                    self.settings
                        .selected_clinics
                        .iter_mut()
                        .for_each(|v| *v = true);
                    action = ControlPanelAction::FilterChanged;
                }
                if ui.small_button("Clear All").clicked() {
                    self.settings
                        .selected_clinics
                        .iter_mut()
                        .for_each(|v| *v = false);
                    action = ControlPanelAction::FilterChanged;
                }
            });

            ui.add_space(10.0);
            ui.label("Aggregation:");
            ui.horizontal(|ui| {
                for mode in [Aggregation::Sum, Aggregation::Mean] {
                    if ui
                        .radio_value(&mut self.settings.aggregation, mode, mode.label())
                        .changed()
                    {
                        action = ControlPanelAction::FilterChanged;
                    }
                }
            });
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export Section =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.has_data, |ui| {
                let button =
                    egui::Button::new(RichText::new("⬇ Download filtered CSV").size(15.0))
                        .min_size(egui::vec2(210.0, 32.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::DownloadCsv;
                }
            });

            if let Some(path) = &self.export_path {
                ui.add_space(5.0);
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                if ui.small_button(format!("📂 Open {name}")).clicked() {
                    action = ControlPanelAction::OpenExport;
                }
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        if !self.columns_note.is_empty() {
            ui.add_space(5.0);
            ui.label(
                RichText::new(format!("Detected columns: {}", self.columns_note))
                    .size(10.0)
                    .color(Color32::GRAY),
            );
        }

        action
    }

    /// Set the status line.
    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    FilterChanged,
    DownloadCsv,
    OpenExport,
}
