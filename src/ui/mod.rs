pub mod forms;
pub mod overview;
pub mod panels;
pub mod plot;
pub mod table;

/// `12.34 µm²`
pub fn fmt_area(area: f64) -> String {
    format!("{area:.2} µm²")
}
