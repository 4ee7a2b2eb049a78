mod app;
mod color;
mod state;
mod tasks;
mod ui;

use app::MicroscopeDashboardApp;
use eframe::egui;
use microscope_dashboard::config::DashboardConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::load();
    log::debug!("Using {config:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Microscope Measurements – Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(MicroscopeDashboardApp::new(cc, config)))),
    )
}
