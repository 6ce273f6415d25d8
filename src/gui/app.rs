//! Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::charts::ChartData;
use crate::config::AppConfig;
use crate::data::{DataLoader, Dataset};
use crate::export;
use crate::gui::chart_viewer::PREVIEW_LIMIT;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::stats::filter_and_aggregate;
use egui::{Color32, RichText, SidePanel};
use polars::prelude::*;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::thread;
use tracing::error;

/// CSV loading result from background thread
enum LoadResult {
    Complete { path: PathBuf, dataset: Dataset },
    Failed(String),
}

/// Main application window.
pub struct DashboardApp {
    config: AppConfig,
    loader: DataLoader,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    /// Filtered rows backing the download button.
    filtered: Option<DataFrame>,
    /// Fatal dataset condition; set, all filtering/charting halts.
    fatal: Option<String>,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let source = config.source_path.clone();
        let mut app = Self {
            config,
            loader: DataLoader::new(),
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            filtered: None,
            fatal: None,
            load_rx: None,
            is_loading: false,
        };
        app.request_load(source);
        app
    }

    /// Load a CSV on a background thread, unless it is already cached.
    fn request_load(&mut self, path: PathBuf) {
        if self.is_loading {
            return;
        }
        if self.loader.is_cached(&path) {
            self.on_dataset_ready();
            return;
        }

        self.control_panel
            .set_status(&format!("Loading {}...", path.display()));
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        thread::spawn(move || {
            let result = match DataLoader::read_normalized(&path) {
                Ok(dataset) => LoadResult::Complete { path, dataset },
                Err(err) => LoadResult::Failed(err.to_string()),
            };
            let _ = tx.send(result);
        });
    }

    /// Check for CSV loading results.
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Complete { path, dataset } => {
                        self.loader.install(path.clone(), dataset);
                        self.control_panel.settings.csv_path = Some(path);
                        self.is_loading = false;
                        should_keep_receiver = false;
                        self.on_dataset_ready();
                    }
                    LoadResult::Failed(message) => {
                        error!(%message, "CSV load failed");
                        self.fatal = Some(message.clone());
                        self.filtered = None;
                        self.chart_viewer.clear();
                        self.control_panel.set_status(&format!("Error: {message}"));
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    /// Wire a freshly loaded dataset into the controls and recompute.
    fn on_dataset_ready(&mut self) {
        let Some(dataset) = self.loader.current() else {
            return;
        };
        let year_bounds = dataset.year_bounds();
        let clinics = dataset.clinic_names();
        let columns_note = dataset.columns.describe();
        let year_source = dataset.columns.year.clone();
        let row_count = dataset.row_count();

        match year_bounds {
            None => {
                self.fatal = Some(format!(
                    "No usable year values in detected column \"{year_source}\""
                ));
                self.filtered = None;
                self.chart_viewer.clear();
            }
            Some(bounds) => {
                self.fatal = None;
                self.control_panel.update_dataset(
                    clinics,
                    bounds,
                    self.config.clinic_preselect,
                    columns_note,
                );
                self.control_panel
                    .set_status(&format!("Loaded {row_count} rows"));
                self.recompute();
            }
        }
    }

    /// One synchronous filter-and-aggregate pass for the current selection.
    fn recompute(&mut self) {
        if self.fatal.is_some() {
            return;
        }
        let selection = self.control_panel.selection();
        let view = {
            let Some(dataset) = self.loader.current() else {
                return;
            };
            filter_and_aggregate(&dataset.df, &selection)
        };

        match view {
            Ok(view) => {
                let chart_data = ChartData::from_view(&view, selection.aggregation);
                let (headers, rows) = preview_rows(&view.rows, PREVIEW_LIMIT);
                let matched = view.rows.height();
                let total = self.loader.current().map(Dataset::row_count).unwrap_or(0);

                self.filtered = Some(view.rows);
                self.chart_viewer.set_data(chart_data, headers, rows);
                self.control_panel
                    .set_status(&format!("{matched} of {total} rows match"));
            }
            Err(err) => {
                error!(%err, "filter-and-aggregate failed");
                self.control_panel.set_status(&format!("Error: {err}"));
            }
        }
    }

    /// Handle CSV file selection.
    fn handle_browse_csv(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.request_load(path);
        }
    }

    /// Write the filtered extract wherever the user points the save dialog.
    fn handle_download(&mut self) {
        let Some(filtered) = self.filtered.clone() else {
            self.control_panel.set_status("No filtered data to export");
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name(export::DEFAULT_EXPORT_NAME)
            .save_file()
        else {
            return; // User cancelled
        };

        match export::write_filtered(&filtered, &path) {
            Ok(()) => {
                self.control_panel
                    .set_status(&format!("Exported {} rows", filtered.height()));
                self.control_panel.export_path = Some(path);
            }
            Err(err) => {
                error!(%err, "export failed");
                self.control_panel.set_status(&format!("Error: {err}"));
            }
        }
    }

    fn handle_open_export(&mut self) {
        if let Some(path) = self.control_panel.export_path.clone() {
            if let Err(err) = open::that(&path) {
                self.control_panel.set_status(&format!("Error: {err}"));
            }
        }
    }

    fn draw_fatal(ui: &mut egui::Ui, message: &str) {
        ui.centered_and_justified(|ui| {
            ui.vertical_centered(|ui| {
                ui.label(
                    RichText::new("⚠ Cannot load dashboard data")
                        .size(20.0)
                        .strong()
                        .color(Color32::from_rgb(220, 53, 69)),
                );
                ui.add_space(8.0);
                ui.label(RichText::new(message).size(13.0));
                ui.add_space(8.0);
                ui.label(
                    RichText::new(
                        "The CSV needs at least a year-like and a deaths-like column. \
                         Use Browse to pick a different file.",
                    )
                    .size(11.0)
                    .color(Color32::GRAY),
                );
            });
        });
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::FilterChanged => self.recompute(),
                        ControlPanelAction::DownloadCsv => self.handle_download(),
                        ControlPanelAction::OpenExport => self.handle_open_export(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - fatal banner or charts
        egui::CentralPanel::default().show(ctx, |ui| match &self.fatal {
            Some(message) => Self::draw_fatal(ui, message),
            None => self.chart_viewer.show(ui),
        });
    }
}

/// Header names plus display strings for the first `limit` filtered rows.
fn preview_rows(df: &DataFrame, limit: usize) -> (Vec<String>, Vec<Vec<String>>) {
    let headers: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let take = df.height().min(limit);
    let mut rows = Vec::with_capacity(take);
    for i in 0..take {
        let row: Vec<String> = df
            .get_columns()
            .iter()
            .map(|column| {
                let series = column.as_materialized_series();
                match series.get(i) {
                    Ok(value) if !value.is_null() => {
                        value.to_string().trim_matches('"').to_string()
                    }
                    _ => "–".to_string(),
                }
            })
            .collect();
        rows.push(row);
    }

    (headers, rows)
}
