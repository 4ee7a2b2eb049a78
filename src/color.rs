use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use microscope_dashboard::data::model::UNKNOWN_OPERATOR;

/// Hue step between consecutive colours; keeps neighbours far apart for
/// any count without knowing it up front.
const GOLDEN_ANGLE_DEG: f32 = 137.507_77;

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgb(channel(rgb.red), channel(rgb.green), channel(rgb.blue))
}

/// `n` distinct chart colours. Hues advance by the golden angle and every
/// other colour is a little darker so adjacent bars stay tellable apart.
pub fn chart_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 * GOLDEN_ANGLE_DEG) % 360.0;
            let lightness = if i % 2 == 0 { 0.55 } else { 0.42 };
            hsl_to_color32(hue, 0.65, lightness)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Operator colours
// ---------------------------------------------------------------------------

/// Fixed colour per operator name, stable for a given set of names.
/// Measurements without an operator are drawn grey.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    fallback: Color32,
}

impl ColorMap {
    pub fn new(operators: &BTreeSet<String>) -> Self {
        let named: Vec<&String> = operators
            .iter()
            .filter(|op| op.as_str() != UNKNOWN_OPERATOR)
            .collect();
        let mut mapping: BTreeMap<String, Color32> = named
            .iter()
            .map(|op| op.to_string())
            .zip(chart_palette(named.len()))
            .collect();
        if operators.contains(UNKNOWN_OPERATOR) {
            mapping.insert(UNKNOWN_OPERATOR.to_string(), Color32::GRAY);
        }
        ColorMap {
            mapping,
            fallback: Color32::LIGHT_GRAY,
        }
    }

    pub fn color_for(&self, operator: &str) -> Color32 {
        self.mapping.get(operator).copied().unwrap_or(self.fallback)
    }
}
