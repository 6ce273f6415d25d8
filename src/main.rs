//! Mortality Insights - Yearly Deaths by Clinic Dashboard
//!
//! A Rust application for exploring yearly death/birth counts across clinics
//! with interactive filtering and charts.

use eframe::egui;
use mortality_insights::config::AppConfig;
use mortality_insights::gui::DashboardApp;
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mortality_insights=info")),
        )
        .init();

    let config = AppConfig::load_or_default();

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1100.0, 650.0])
            .with_title("Mortality Insights"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Mortality Insights",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
}
