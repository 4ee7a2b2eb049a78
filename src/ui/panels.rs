use std::time::{Duration, Instant};

use chrono::Utc;
use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::DatePickerButton;

use microscope_dashboard::data::export::ExportFormat;

use crate::state::{AppState, ExportScope, Tab};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.service.is_empty() {
        ui.label("No measurements loaded.");
        return;
    }

    let samples = state.service.distinct_sample_ids();
    let operators = state.service.distinct_operators();
    let form = &mut state.filter_form;

    ui.checkbox(&mut form.use_start, "From");
    ui.add_enabled_ui(form.use_start, |ui: &mut Ui| {
        ui.add(DatePickerButton::new(&mut form.start).id_salt("filter_start"));
    });
    ui.checkbox(&mut form.use_end, "Until (whole day)");
    ui.add_enabled_ui(form.use_end, |ui: &mut Ui| {
        ui.add(DatePickerButton::new(&mut form.end).id_salt("filter_end"));
    });
    ui.add_space(6.0);

    ui.strong("Sample");
    egui::ComboBox::from_id_salt("filter_sample")
        .selected_text(form.sample.as_deref().unwrap_or("All samples"))
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut form.sample, None, "All samples");
            for id in &samples {
                ui.selectable_value(&mut form.sample, Some(id.clone()), id.as_str());
            }
        });

    ui.strong("Operator");
    egui::ComboBox::from_id_salt("filter_operator")
        .selected_text(form.operator.as_deref().unwrap_or("All operators"))
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut form.operator, None, "All operators");
            for op in &operators {
                ui.selectable_value(&mut form.operator, Some(op.clone()), op.as_str());
            }
        });

    ui.strong("Search");
    let search = ui.add(egui::TextEdit::singleline(&mut form.search).hint_text("ID or sample"));
    let submitted = search.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

    ui.add_space(6.0);
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Apply").clicked() || submitted {
            state.apply_filters();
        }
        if ui.button("Clear").clicked() {
            state.clear_filters();
        }
    });

    ui.separator();
    ui.label(format!(
        "{} of {} measurements match",
        state.service.filtered_len(),
        state.service.len()
    ));
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open measurements…").clicked() {
                open_measurements_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open samples…").clicked() {
                open_samples_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            ui.menu_button("Export filtered", |ui: &mut Ui| {
                export_buttons(ui, state, ExportScope::Filtered);
            });
            ui.menu_button("Export all", |ui: &mut Ui| {
                export_buttons(ui, state, ExportScope::All);
            });
            ui.separator();
            ui.menu_button("Clear data", |ui: &mut Ui| {
                ui.label("Remove all loaded measurements and samples?");
                if ui.button("Clear").clicked() {
                    state.clear();
                    ui.close_menu();
                }
            });
        });

        ui.separator();

        let refresh = ui.add_enabled(!state.loading(), egui::Button::new("Refresh"));
        if refresh.clicked() || ui.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::R)) {
            state.request_reload();
        }
        if state.loading() {
            ui.spinner();
        }

        let mut auto = state.auto_refresh.enabled();
        if ui.checkbox(&mut auto, "Auto-refresh").changed() {
            state.auto_refresh.set_enabled(auto, Instant::now());
            state.info(if auto {
                "Auto-refresh enabled"
            } else {
                "Auto-refresh disabled"
            });
        }
        let mut secs = state.auto_refresh.interval.as_secs();
        let interval = ui.add(
            egui::DragValue::new(&mut secs)
                .range(1..=3600)
                .suffix(" s"),
        );
        if interval.changed() {
            state
                .auto_refresh
                .set_interval(Duration::from_secs(secs), Instant::now());
        }

        ui.separator();

        match state.api_online {
            Some(true) => ui.label(RichText::new("● API online").color(Color32::GREEN)),
            Some(false) => ui.label(RichText::new("● API offline").color(Color32::RED)),
            None => ui.label("● API unknown"),
        };
        if ui.small_button("Check").clicked() {
            state.check_health();
        }

        ui.separator();

        if let Some(origin) = &state.origin {
            ui.label(format!("Source: {origin}"));
        }
        if let Some(ts) = state.last_update {
            ui.label(format!("Updated {} UTC", ts.format("%Y-%m-%d %H:%M:%S")));
        }

        if let Some(status) = &state.status {
            let color = if status.is_error {
                Color32::RED
            } else {
                ui.visuals().text_color()
            };
            ui.label(RichText::new(&status.text).color(color));
        }
    });
}

/// Tab strip under the menu bar.
pub fn tab_bar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.tab, tab, tab.label());
        }
    });
}

fn export_buttons(ui: &mut Ui, state: &mut AppState, scope: ExportScope) {
    for format in [ExportFormat::Csv, ExportFormat::Json] {
        if ui.button(format.extension().to_uppercase()).clicked() {
            export_dialog(state, format, scope);
            ui.close_menu();
        }
    }
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_measurements_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open measurements")
        .add_filter("Supported files", &["json", "csv"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.open_measurements(&path);
    }
}

pub fn open_samples_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open samples")
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.open_samples(&path);
    }
}

pub fn export_dialog(state: &mut AppState, format: ExportFormat, scope: ExportScope) {
    let rows = match scope {
        ExportScope::Filtered => state.service.filtered_len(),
        ExportScope::All => state.service.len(),
    };
    if rows == 0 {
        state.error("No data to export");
        return;
    }

    let ext = format.extension();
    let file = rfd::FileDialog::new()
        .set_title("Export measurements")
        .set_file_name(format.default_file_name(Utc::now().date_naive()))
        .add_filter(ext.to_uppercase(), &[ext])
        .save_file();

    if let Some(path) = file {
        state.export(&path, format, scope);
    }
}
