use eframe::egui::{self, RichText, Ui};

use microscope_dashboard::data::model::format_timestamp;
use microscope_dashboard::data::stats::{self, mean_area};

use crate::state::AppState;
use crate::ui::{fmt_area, table};

fn stat_card(ui: &mut Ui, title: &str, value: String) {
    ui.group(|ui: &mut Ui| {
        ui.set_min_width(160.0);
        ui.vertical(|ui: &mut Ui| {
            ui.label(title);
            ui.label(RichText::new(value).heading().strong());
        });
    });
}

// ---------------------------------------------------------------------------
// Overview tab
// ---------------------------------------------------------------------------

pub fn overview(ui: &mut Ui, state: &AppState) {
    let service = &state.service;
    if service.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No measurements loaded  (Refresh or File → Open measurements…)");
        });
        return;
    }

    let all = stats::aggregate(service.all());
    ui.horizontal_wrapped(|ui: &mut Ui| {
        stat_card(ui, "Measurements", all.count.to_string());
        stat_card(ui, "Samples", all.distinct_samples.to_string());
        stat_card(ui, "Mean area", fmt_area(all.mean));
        stat_card(
            ui,
            "Last measurement",
            service
                .last_measurement()
                .map(|ts| format_timestamp(&ts))
                .unwrap_or_else(|| "Never".to_string()),
        );
    });

    ui.add_space(8.0);
    ui.heading("Filtered view");
    let filtered = service.aggregate();
    egui::Grid::new("filtered_stats")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            let rows = [
                ("Count", filtered.count.to_string()),
                ("Mean area", fmt_area(filtered.mean)),
                ("Std. deviation", format!("{:.2}", filtered.std_dev)),
                ("Min area", fmt_area(filtered.min)),
                ("Max area", fmt_area(filtered.max)),
                ("Distinct samples", filtered.distinct_samples.to_string()),
                ("Distinct operators", filtered.distinct_operators.to_string()),
            ];
            for (label, value) in rows {
                ui.label(label);
                ui.label(value);
                ui.end_row();
            }
        });

    ui.add_space(8.0);
    ui.heading("Recent measurements");
    table::recent_table(ui, &service.recent(state.config.recent_count));
}

// ---------------------------------------------------------------------------
// Samples tab
// ---------------------------------------------------------------------------

/// One card per sample present in the filtered view.
pub fn samples(ui: &mut Ui, state: &AppState) {
    let service = &state.service;
    let groups = service.group_by_sample();
    if groups.is_empty() {
        ui.label("No samples in the current view.");
        return;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.horizontal_wrapped(|ui: &mut Ui| {
                for (sample_id, members) in &groups {
                    let info = service.sample_info(sample_id);
                    ui.group(|ui: &mut Ui| {
                        ui.set_width(240.0);
                        ui.vertical(|ui: &mut Ui| {
                            ui.label(RichText::new(&info.name).heading());
                            egui::Grid::new(("sample_card", sample_id.as_str()))
                                .num_columns(2)
                                .show(ui, |ui: &mut Ui| {
                                    ui.strong("ID");
                                    ui.label(sample_id.as_str());
                                    ui.end_row();
                                    ui.strong("Type");
                                    ui.label(info.kind.as_str());
                                    ui.end_row();
                                    ui.strong("Measurements");
                                    ui.label(members.len().to_string());
                                    ui.end_row();
                                    ui.strong("Mean area");
                                    ui.label(fmt_area(mean_area(members)));
                                    ui.end_row();
                                    ui.strong("Responsible");
                                    ui.label(info.responsible_operator.as_str());
                                    ui.end_row();
                                });
                        });
                    });
                }
            });
        });
}
