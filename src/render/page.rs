// 🖥️ Dashboard Page - Header, metric cards, filters, map, charts, table
//
// Re-rendered on every request from the cached context; only the map's
// highlighted layer depends on the filter. The SVG fragments are rendered
// by their own templates and embedded as-is.

use super::charts::{bar_chart_svg, distribution, pie_chart_svg, top_bars, TOP_N};
use super::map::{ChoroplethMap, LegendEntry, LEGEND};
use super::palette::MapPalette;
use super::table::{table_rows, TableRow};
use crate::context::{AppContext, Metrics};
use crate::filter::{ViewFilter, MAX_OFFICES, MIN_OFFICES};
use askama::Template;

/// `<option>` in one of the sidebar selects
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Office name without a boundary, spellings flattened for display
pub struct UnmatchedRow {
    pub region: String,
    pub count: u32,
    pub spellings: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage<'a> {
    pub warning: Option<&'a str>,
    pub metrics: Metrics,
    pub filter: &'a ViewFilter,
    pub palettes: Vec<SelectOption>,
    pub regions: Vec<SelectOption>,
    pub slider_min: u32,
    pub slider_max: u32,
    pub map_svg: String,
    pub legend: &'static [LegendEntry],
    pub top_n: usize,
    pub bar_chart_svg: String,
    pub pie_chart_svg: String,
    pub rows: Vec<TableRow>,
    pub unmatched: Vec<UnmatchedRow>,
}

impl<'a> DashboardPage<'a> {
    pub fn new(context: &'a AppContext, filter: &'a ViewFilter) -> askama::Result<Self> {
        let filtered = filter.apply(&context.regions);
        let map = ChoroplethMap::new(&context.regions, &filtered, filter.palette);

        let palettes = [MapPalette::Thematic, MapPalette::Blues]
            .into_iter()
            .map(|palette| SelectOption {
                value: palette.as_str().to_string(),
                label: palette.label().to_string(),
                selected: palette == filter.palette,
            })
            .collect();

        let regions = context
            .region_options()
            .into_iter()
            .map(|name| SelectOption {
                selected: filter.regions.contains(&name),
                label: name.clone(),
                value: name,
            })
            .collect();

        let unmatched = context
            .report
            .unmatched
            .iter()
            .map(|row| UnmatchedRow {
                region: row.region.clone(),
                count: row.count,
                spellings: row.spellings.join(" / "),
            })
            .collect();

        Ok(DashboardPage {
            warning: context.warning.as_deref(),
            metrics: context.metrics(),
            filter,
            palettes,
            regions,
            slider_min: MIN_OFFICES,
            slider_max: MAX_OFFICES,
            map_svg: map.to_svg()?,
            legend: LEGEND,
            top_n: TOP_N,
            bar_chart_svg: bar_chart_svg(&top_bars(&context.regions))?,
            pie_chart_svg: pie_chart_svg(&distribution(&context.regions))?,
            rows: table_rows(&context.regions),
            unmatched,
        })
    }
}

/// Full dashboard page for one filter state
pub fn render_dashboard(context: &AppContext, filter: &ViewFilter) -> askama::Result<String> {
    DashboardPage::new(context, filter)?.render()
}
