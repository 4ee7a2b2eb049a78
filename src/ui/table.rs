use eframe::egui::{self, Align, Layout, Ui};
use egui_extras::{Column, TableBuilder};

use microscope_dashboard::data::model::{format_timestamp, Measurement};
use microscope_dashboard::data::sort::SortColumn;

use crate::state::AppState;
use crate::ui::fmt_area;

const PAGE_SIZES: [usize; 4] = [10, 25, 50, 100];

fn cell_text(m: &Measurement, column: SortColumn) -> String {
    match column {
        SortColumn::Id => m.id.clone(),
        SortColumn::SampleId => m.sample_id.clone(),
        SortColumn::AreaUm2 => fmt_area(m.area_um2),
        SortColumn::AreaPixels => format!("{} px", m.area_pixels),
        SortColumn::Timestamp => format_timestamp(&m.timestamp),
        SortColumn::Operator => m.operator_label().to_string(),
        SortColumn::ImageName => m.image_name.clone().unwrap_or_else(|| "N/A".to_string()),
    }
}

// ---------------------------------------------------------------------------
// Paginated measurement table
// ---------------------------------------------------------------------------

/// Sortable, paginated table of the filtered measurements.
pub fn measurements_table(ui: &mut Ui, state: &mut AppState) {
    let stats = state.service.aggregate();
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("{} rows", stats.count));
        ui.separator();
        ui.label(format!("mean {}", fmt_area(stats.mean)));
        ui.label(format!("σ {:.2}", stats.std_dev));
        ui.label(format!("min {}", fmt_area(stats.min)));
        ui.label(format!("max {}", fmt_area(stats.max)));
    });
    pagination_controls(ui, state);
    ui.separator();

    if state.service.filtered_len() == 0 {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No measurements match the current filters");
        });
        return;
    }

    let sort = state.service.sort_state();
    let mut clicked: Option<SortColumn> = None;
    let page = state.service.current_page();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .columns(Column::auto().at_least(80.0), SortColumn::ALL.len() - 1)
        .column(Column::remainder())
        .header(22.0, |mut header| {
            for column in SortColumn::ALL {
                header.col(|ui: &mut Ui| {
                    let arrow = if sort.column == Some(column) {
                        sort.direction.arrow()
                    } else {
                        ""
                    };
                    if ui.button(format!("{column} {arrow}")).clicked() {
                        clicked = Some(column);
                    }
                });
            }
        })
        .body(|mut body| {
            for m in &page.rows {
                body.row(20.0, |mut row| {
                    for column in SortColumn::ALL {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell_text(m, column));
                        });
                    }
                });
            }
        });

    if let Some(column) = clicked {
        let s = state.service.toggle_sort(column);
        log::debug!("Sorted by {column} {:?}", s.direction);
    }
}

fn pagination_controls(ui: &mut Ui, state: &mut AppState) {
    let page = state.service.page();
    let page_size = state.service.page_size();
    let total = state.service.total_pages().max(1);

    ui.horizontal(|ui: &mut Ui| {
        if ui.add_enabled(page > 1, egui::Button::new("◀")).clicked() {
            state.service.paginate(page - 1, page_size);
        }
        ui.label(format!("Page {page} of {total}"));
        if ui.add_enabled(page < total, egui::Button::new("▶")).clicked() {
            state.service.paginate(page + 1, page_size);
        }

        ui.separator();
        let mut size = page_size;
        egui::ComboBox::from_id_salt("page_size")
            .selected_text(format!("{size} per page"))
            .show_ui(ui, |ui: &mut Ui| {
                for option in PAGE_SIZES {
                    ui.selectable_value(&mut size, option, option.to_string());
                }
            });
        if size != page_size {
            state.service.set_page_size(size);
        }
    });
}

// ---------------------------------------------------------------------------
// Recent measurements
// ---------------------------------------------------------------------------

/// Compact list of the newest measurements.
pub fn recent_table(ui: &mut Ui, rows: &[&Measurement]) {
    egui::Grid::new("recent_measurements")
        .striped(true)
        .num_columns(5)
        .show(ui, |ui: &mut Ui| {
            for header in ["ID", "Sample", "Area", "Date/Time", "Operator"] {
                ui.strong(header);
            }
            ui.end_row();
            for m in rows {
                ui.label(m.id.as_str());
                ui.label(m.sample_id.as_str());
                ui.label(fmt_area(m.area_um2));
                ui.label(format_timestamp(&m.timestamp));
                ui.label(m.operator_label());
                ui.end_row();
            }
        });
}
