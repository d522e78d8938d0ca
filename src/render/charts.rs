// 📊 Charts - Top departments bar chart + distribution pie
//
// Both charts always use the full joined table; filters only affect the map.

use super::palette::{bar_color, pie_color, BAR_OUTLINE_COLOR, BAR_OUTLINE_WIDTH};
use crate::join::JoinedRegion;
use askama::Template;
use serde::Serialize;
use std::collections::BTreeMap;
use std::f64::consts::PI;

/// Bars in the top departments chart
pub const TOP_N: usize = 7;

// ============================================================================
// TOP-N BAR CHART
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub value: u32,
    pub color: &'static str,
}

/// The `n` regions with most offices. Ties keep table order.
pub fn top_regions(regions: &[JoinedRegion], n: usize) -> Vec<&JoinedRegion> {
    let mut ranked: Vec<&JoinedRegion> = regions.iter().collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(n);
    ranked
}

/// Bars for the top departments, largest first
pub fn top_bars(regions: &[JoinedRegion]) -> Vec<Bar> {
    top_regions(regions, TOP_N)
        .into_iter()
        .map(|r| Bar {
            label: r.name.clone(),
            value: r.count,
            color: bar_color(r.count),
        })
        .collect()
}

struct BarRow<'a> {
    label: &'a str,
    value: u32,
    color: &'static str,
    y: f64,
    text_y: f64,
    width: f64,
    value_x: f64,
}

#[derive(Template)]
#[template(path = "bar_chart.svg")]
struct BarChartSvg<'a> {
    width: f64,
    height: f64,
    label_x: f64,
    plot_x: f64,
    bar_height: f64,
    stroke: &'static str,
    stroke_width: f64,
    rows: Vec<BarRow<'a>>,
    axis_top: f64,
    axis_bottom: f64,
    caption_x: f64,
    caption_y: f64,
}

/// Horizontal bar chart, largest bar on top
pub fn bar_chart_svg(bars: &[Bar]) -> askama::Result<String> {
    let width = 560.0;
    let label_width = 200.0;
    let row_height = 40.0;
    let margin = 20.0;
    let height = margin * 2.0 + row_height * bars.len().max(1) as f64 + 20.0;
    let plot_width = width - label_width - margin * 2.0;

    let max_value = bars.iter().map(|b| b.value).max().unwrap_or(0).max(1) as f64;

    let rows = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let y = margin + i as f64 * row_height;
            let bar_width = bar.value as f64 / max_value * plot_width;
            BarRow {
                label: &bar.label,
                value: bar.value,
                color: bar.color,
                y: y + 6.0,
                text_y: y + row_height / 2.0 + 4.0,
                width: bar_width,
                value_x: label_width + bar_width + 6.0,
            }
        })
        .collect();

    BarChartSvg {
        width,
        height,
        label_x: label_width - 6.0,
        plot_x: label_width,
        bar_height: row_height - 12.0,
        stroke: BAR_OUTLINE_COLOR,
        stroke_width: BAR_OUTLINE_WIDTH,
        rows,
        axis_top: margin,
        axis_bottom: margin + row_height * bars.len() as f64,
        caption_x: label_width + plot_width / 2.0,
        caption_y: height - 8.0,
    }
    .render()
}

// ============================================================================
// DISTRIBUTION PIE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    /// Office count shared by the regions in this slice
    pub offices: u32,
    /// Regions with exactly `offices` offices
    pub regions: usize,
    /// Fraction of all regions, 0.0..=1.0
    pub share: f64,
    pub label: String,
    pub color: &'static str,
}

/// One slice per distinct office count, ascending, zero included
pub fn distribution(regions: &[JoinedRegion]) -> Vec<PieSlice> {
    let mut groups: BTreeMap<u32, usize> = BTreeMap::new();
    for region in regions {
        *groups.entry(region.count).or_insert(0) += 1;
    }

    let total = regions.len().max(1) as f64;
    groups
        .into_iter()
        .enumerate()
        .map(|(i, (offices, count))| PieSlice {
            offices,
            regions: count,
            share: count as f64 / total,
            label: format!("{} office(s)", offices),
            color: pie_color(i),
        })
        .collect()
}

struct Wedge<'a> {
    /// Single slice covering the whole pie
    full: bool,
    d: String,
    color: &'static str,
    title: String,
    label: &'a str,
    label_x: f64,
    label_y: f64,
    percent: f64,
}

#[derive(Template)]
#[template(path = "pie_chart.svg")]
struct PieChartSvg<'a> {
    size: f64,
    center: f64,
    radius: f64,
    wedges: Vec<Wedge<'a>>,
}

pub fn pie_chart_svg(slices: &[PieSlice]) -> askama::Result<String> {
    let size = 400.0;
    let center = size / 2.0;
    let radius = 170.0;

    let mut wedges = Vec::with_capacity(slices.len());
    let mut angle = -PI / 2.0;

    for slice in slices {
        let sweep = slice.share * 2.0 * PI;
        if sweep <= 0.0 {
            continue;
        }

        let (x0, y0) = (center + radius * angle.cos(), center + radius * angle.sin());
        let end = angle + sweep;
        let (x1, y1) = (center + radius * end.cos(), center + radius * end.sin());
        let large_arc = if sweep > PI { 1 } else { 0 };
        let mid = angle + sweep / 2.0;

        wedges.push(Wedge {
            full: slice.share >= 1.0 - 1e-9,
            d: format!(
                "M{c} {c} L{x0:.2} {y0:.2} A{r} {r} 0 {large_arc} 1 {x1:.2} {y1:.2} Z",
                c = center,
                r = radius,
            ),
            color: slice.color,
            title: format!("{}: {} ({:.1}%)", slice.label, slice.regions, slice.share * 100.0),
            label: &slice.label,
            label_x: center + radius * 0.62 * mid.cos(),
            label_y: center + radius * 0.62 * mid.sin(),
            percent: slice.share * 100.0,
        });

        angle = end;
    }

    PieChartSvg {
        size,
        center,
        radius,
        wedges,
    }
    .render()
}

// ============================================================================
// TESTS
// ============================================================================
