use eframe::egui::{self, Ui};

use crate::state::AppState;

fn text_row(ui: &mut Ui, label: &str, value: &mut String) {
    ui.label(label);
    ui.text_edit_singleline(value);
    ui.end_row();
}

/// Forms that POST new samples and measurements to the API.
pub fn register(ui: &mut Ui, state: &mut AppState) {
    ui.label(format!("Submitting to {}", state.config.api_base_url));
    ui.add_space(6.0);

    ui.heading("New sample");
    egui::Grid::new("new_sample")
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            let form = &mut state.sample_form;
            text_row(ui, "ID", &mut form.id);
            text_row(ui, "Name", &mut form.nome);
            text_row(ui, "Type", &mut form.tipo);
            text_row(ui, "Responsible operator", &mut form.operador_responsavel);
        });
    if ui.button("Register sample").clicked() {
        if let Err(e) = state.submit_sample() {
            state.error(format!("{e:#}"));
        }
    }

    ui.separator();

    ui.heading("New measurement");
    egui::Grid::new("new_measurement")
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            let form = &mut state.measurement_form;
            text_row(ui, "ID", &mut form.id);
            text_row(ui, "Sample ID", &mut form.sample_id);
            ui.label("Area (µm²)");
            ui.add(
                egui::DragValue::new(&mut form.area)
                    .range(0.0..=f64::MAX)
                    .speed(0.1)
                    .max_decimals(2),
            );
            ui.end_row();
            text_row(ui, "Image ID", &mut form.image_id);
            text_row(ui, "Image file", &mut form.image_name);
            text_row(ui, "Operator", &mut form.operator);
        });
    if ui.button("Register measurement").clicked() {
        if let Err(e) = state.submit_measurement() {
            state.error(format!("{e:#}"));
        }
    }
}
