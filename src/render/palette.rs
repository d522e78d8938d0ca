// 🎨 Color tables - map palettes, chart colors, table row styles
//
// The chart colors and the table row thresholds disagree for the same
// counts (4 offices is red in the bar chart, green in the table). Kept as
// published.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Neutral fill of the coverage layer
pub const BASE_FILL: &str = "#F7F7F7FF";

/// Fill for a count missing from a lookup
pub const FALLBACK_COLOR: &str = "#CCCCCC";

pub const OUTLINE_COLOR: &str = "black";
pub const OUTLINE_WEIGHT: f64 = 1.1;
pub const FILL_OPACITY: f64 = 0.6;

pub const THEMATIC_COLORS: [&str; 5] = ["#7CFC00", "#FFFF00", "#FFA500", "#FF0000", "#800080"];
pub const BLUES_COLORS: [&str; 5] = ["#9FBFFFFF", "#3E7DFBFF", "#0000FFE1", "#000080", "#FFFF00FF"];

/// Pie slices cycle this palette in ascending count order
pub const PIE_COLORS: [&str; 5] = THEMATIC_COLORS;

pub const BAR_OUTLINE_COLOR: &str = "rgb(8,48,107)";
pub const BAR_OUTLINE_WIDTH: f64 = 1.5;

/// Exact office count → bar color
pub const BAR_COLORS: &[(u32, &str)] = &[
    (20, "#800080"),
    (4, "#FF0000"),
    (3, "#FFA500"),
    (2, "#FFFF00"),
    (1, "#7CFC00"),
];

// ============================================================================
// MAP PALETTE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapPalette {
    /// Green → purple scale
    #[default]
    Thematic,
    /// Blue scale
    Blues,
}

impl MapPalette {
    pub fn colors(&self) -> &'static [&'static str; 5] {
        match self {
            MapPalette::Thematic => &THEMATIC_COLORS,
            MapPalette::Blues => &BLUES_COLORS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MapPalette::Thematic => "thematic",
            MapPalette::Blues => "blues",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MapPalette::Thematic => "Thematic map (color scale)",
            MapPalette::Blues => "Thematic map (blue scale)",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "thematic" => Some(MapPalette::Thematic),
            "blues" => Some(MapPalette::Blues),
            _ => None,
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            MapPalette::Thematic => MapPalette::Blues,
            MapPalette::Blues => MapPalette::Thematic,
        }
    }
}

/// Count → color for the highlighted map layer.
///
/// Distinct counts are sorted ascending and take palette colors by index,
/// wrapping after five.
pub fn count_color_lookup<I>(counts: I, palette: MapPalette) -> BTreeMap<u32, &'static str>
where
    I: IntoIterator<Item = u32>,
{
    let distinct: std::collections::BTreeSet<u32> = counts.into_iter().collect();
    let colors = palette.colors();

    distinct
        .into_iter()
        .enumerate()
        .map(|(i, count)| (count, colors[i % colors.len()]))
        .collect()
}

pub fn bar_color(count: u32) -> &'static str {
    BAR_COLORS
        .iter()
        .find(|(value, _)| *value == count)
        .map(|(_, color)| *color)
        .unwrap_or(FALLBACK_COLOR)
}

pub fn pie_color(index: usize) -> &'static str {
    PIE_COLORS[index % PIE_COLORS.len()]
}

/// Row background in the detail table
pub fn table_row_background(count: u32) -> &'static str {
    match count {
        c if c >= 4 => "#e8f5e8",
        3 => "#fff3cd",
        2 => "#ffeaa7",
        _ => "#f8f9fa",
    }
}

/// Split `#RRGGBB` / `#RRGGBBAA` into RGB and alpha in `0.0..=1.0`
pub fn parse_hex(color: &str) -> Option<((u8, u8, u8), f64)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 && hex.len() != 8 {
        return None;
    }

    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    let rgb = (byte(0)?, byte(2)?, byte(4)?);
    let alpha = if hex.len() == 8 {
        byte(6)? as f64 / 255.0
    } else {
        1.0
    };

    Some((rgb, alpha))
}

/// SVG `fill` and `fill-opacity` for a palette color at the map's opacity
pub fn svg_fill(color: &str) -> (String, f64) {
    match parse_hex(color) {
        Some(((r, g, b), alpha)) => (format!("#{:02X}{:02X}{:02X}", r, g, b), FILL_OPACITY * alpha),
        None => (color.to_string(), FILL_OPACITY),
    }
}

// ============================================================================
// TESTS
// ============================================================================
