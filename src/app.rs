use std::time::Instant;

use eframe::egui;

use microscope_dashboard::config::DashboardConfig;

use crate::state::{AppState, Tab};
use crate::ui::{forms, overview, panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct MicroscopeDashboardApp {
    pub state: AppState,
}

impl MicroscopeDashboardApp {
    /// Build the app and kick off the first load.
    pub fn new(cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let mut state = AppState::new(config, Some(cc.egui_ctx.clone()));
        state.request_reload();
        if state.config.use_api {
            state.check_health();
        }
        Self { state }
    }
}

impl eframe::App for MicroscopeDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_tasks();
        if let Some(wait) = self.state.tick(Instant::now()) {
            ctx.request_repaint_after(wait);
        }

        // ---- Top panel: menu bar + tabs ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
            ui.separator();
            panels::tab_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: active tab ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.tab {
            Tab::Overview => overview::overview(ui, &self.state),
            Tab::Measurements => table::measurements_table(ui, &mut self.state),
            Tab::Samples => overview::samples(ui, &self.state),
            Tab::Charts => plot::charts(ui, &self.state),
            Tab::Register => forms::register(ui, &mut self.state),
        });
    }
}
