use std::str::FromStr;

use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

use crate::data::model::{BoxCategory, Tier};

// ---------------------------------------------------------------------------
// Static lookup tables keyed by category
// ---------------------------------------------------------------------------

/// Bar colour for the distribution chart, graded from red (worst) to green.
pub fn category_color(category: BoxCategory) -> &'static str {
    use Tier::*;
    match (category.potential, category.performance) {
        (High, High) => "#27ae60",
        (High, Moderate) | (Moderate, High) => "#a9dfbf",
        (High, Low) | (Low, High) => "#f1c40f",
        (Moderate, Moderate) | (Moderate, Low) | (Low, Moderate) => "#f39c12",
        (Low, Low) => "#e74c3c",
    }
}

/// Short talent-segment name shown next to each bar.
pub fn category_legend(category: BoxCategory) -> &'static str {
    use Tier::*;
    match (category.potential, category.performance) {
        (High, High) => "Consistent Stars",
        (High, Moderate) => "High Potential",
        (High, Low) => "Potential Gems",
        (Moderate, High) => "High Performers",
        (Moderate, Moderate) => "Key Players",
        (Moderate, Low) => "Inconsistent Performers",
        (Low, High) => "Strong Performers",
        (Low, Moderate) => "Effective Employees",
        (Low, Low) => "Under Performers",
    }
}

/// Heatmap colour scale: `(position, hex)` stops, worst to best.
pub const GRID_COLOR_SCALE: [(f32, &str); 5] = [
    (0.0, "#e74c3c"),
    (0.3, "#f39c12"),
    (0.5, "#f1c40f"),
    (0.7, "#a9dfbf"),
    (1.0, "#27ae60"),
];

pub const SALARY_COLOR: &str = "#27ae60";

// ---------------------------------------------------------------------------
// Colour conversion
// ---------------------------------------------------------------------------

/// Parse `#rrggbb` into an egui colour; malformed input maps to grey.
pub fn hex_to_color32(hex: &str) -> Color32 {
    match Srgb::<u8>::from_str(hex) {
        Ok(rgb) => Color32::from_rgb(rgb.red, rgb.green, rgb.blue),
        Err(_) => Color32::GRAY,
    }
}

/// Sample [`GRID_COLOR_SCALE`] at `t` in `[0, 1]`, mixing in linear RGB.
pub fn grid_scale_color(t: f32) -> Color32 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let linear = |hex: &str| -> LinSrgb {
        Srgb::<u8>::from_str(hex)
            .map(|c| c.into_format::<f32>().into_linear())
            .unwrap_or_default()
    };

    let upper = GRID_COLOR_SCALE
        .iter()
        .position(|&(pos, _)| pos >= t)
        .unwrap_or(GRID_COLOR_SCALE.len() - 1);
    let lower = upper.saturating_sub(1);
    let (p0, c0) = GRID_COLOR_SCALE[lower];
    let (p1, c1) = GRID_COLOR_SCALE[upper];
    let factor = if p1 > p0 { (t - p0) / (p1 - p0) } else { 0.0 };

    let mixed = linear(c0).mix(linear(c1), factor);
    let rgb: Srgb<u8> = Srgb::<f32>::from_linear(mixed).into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

/// Heatmap colour for an ordinal goodness score in `0..=max`.
pub fn goodness_color(score: u8, max: u8) -> Color32 {
    if max == 0 {
        return grid_scale_color(0.0);
    }
    grid_scale_color(score as f32 / max as f32)
}
