use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::state::AppState;

const CHART_HEIGHT: f32 = 240.0;
const AREA_COLOR: Color32 = Color32::from_rgb(52, 152, 219);
const DAY_COLOR: Color32 = Color32::from_rgb(231, 76, 60);

// ---------------------------------------------------------------------------
// Charts tab
// ---------------------------------------------------------------------------

/// All charts over the filtered view.
pub fn charts(ui: &mut Ui, state: &AppState) {
    if state.service.filtered_len() == 0 {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Nothing to plot for the current filters");
        });
        return;
    }

    eframe::egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Area distribution");
            area_histogram(ui, state);
            ui.heading("Measurements per day");
            daily_counts(ui, state);
            ui.heading("Measurements per operator");
            operator_counts(ui, state);
            ui.heading("Area trend");
            area_trend(ui, state);
        });
}

fn area_histogram(ui: &mut Ui, state: &AppState) {
    let bins = state.service.histogram(state.config.histogram_bins);
    let bars: Vec<Bar> = bins
        .iter()
        .map(|b| {
            // A single-valued set gives a zero-width bin; draw it visibly.
            let width = if b.width() > 0.0 { b.width() } else { 1.0 };
            Bar::new(b.midpoint(), b.count as f64)
                .width(width * 0.95)
                .name(format!("{:.1}–{:.1} µm²", b.lower, b.upper))
        })
        .collect();

    Plot::new("area_histogram")
        .height(CHART_HEIGHT)
        .x_axis_label("Area (µm²)")
        .y_axis_label("Measurements")
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(AREA_COLOR).name("Measurements"));
        });
}

fn daily_counts(ui: &mut Ui, state: &AppState) {
    let days = state.service.group_by_day();
    let labels: Vec<String> = days.keys().map(|d| d.format("%Y-%m-%d").to_string()).collect();
    let points: Vec<[f64; 2]> = days
        .values()
        .enumerate()
        .map(|(i, totals)| [i as f64, totals.count as f64])
        .collect();

    Plot::new("daily_counts")
        .height(CHART_HEIGHT)
        .y_axis_label("Measurements")
        .allow_drag(false)
        .allow_scroll(false)
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() > f64::EPSILON || i < 0.0 {
                return String::new();
            }
            labels.get(i as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .color(DAY_COLOR)
                    .fill(0.0)
                    .name("Measurements per day"),
            );
            plot_ui.points(Points::new(PlotPoints::from(points)).color(DAY_COLOR).radius(3.0));
        });
}

fn operator_counts(ui: &mut Ui, state: &AppState) {
    let counts = state.service.count_by_operator();
    let color_map = state.color_map.as_ref();

    Plot::new("operator_counts")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .y_axis_label("Measurements")
        .show_x(false)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (i, (operator, count)) in counts.iter().enumerate() {
                let color = color_map
                    .map(|cm| cm.color_for(operator))
                    .unwrap_or(AREA_COLOR);
                let bar = Bar::new(i as f64, *count as f64).width(0.6);
                plot_ui.bar_chart(BarChart::new(vec![bar]).color(color).name(operator));
            }
        });
}

fn area_trend(ui: &mut Ui, state: &AppState) {
    let points = state.service.area_trend();

    Plot::new("area_trend")
        .height(CHART_HEIGHT)
        .x_axis_label("Measurement sequence")
        .y_axis_label("Area (µm²)")
        .include_y(0.0)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .color(AREA_COLOR)
                    .name("Area"),
            );
            plot_ui.points(Points::new(PlotPoints::from(points)).color(AREA_COLOR).radius(3.0));
        });
}
