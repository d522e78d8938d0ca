// 🗺️ Choropleth Map - Two SVG layers over the department polygons
//
// Layer 1 paints every department in a flat neutral fill so the whole
// country is always visible. Layer 2 repaints only the filtered departments,
// colored by their office count. Filtering recolors; it never removes
// geography.

use super::palette::{
    count_color_lookup, svg_fill, MapPalette, BASE_FILL, FALLBACK_COLOR, OUTLINE_COLOR,
    OUTLINE_WEIGHT,
};
use crate::join::JoinedRegion;
use askama::Template;
use geo::{BoundingRect, MultiPolygon, Rect};
use std::fmt::Write;

const MAP_WIDTH: f64 = 600.0;
const PADDING: f64 = 10.0;

// ============================================================================
// PROJECTION
// ============================================================================

/// Equirectangular projection fitted to a lon/lat bounding box
#[derive(Debug, Clone, Copy)]
struct Projection {
    min_lon: f64,
    max_lat: f64,
    x_scale: f64,
    y_scale: f64,
    height: f64,
}

impl Projection {
    fn fit(bounds: Rect<f64>) -> Self {
        let mid_lat = (bounds.min().y + bounds.max().y) / 2.0;
        let lon_stretch = mid_lat.to_radians().cos().max(0.1);

        let span_x = (bounds.width() * lon_stretch).max(f64::EPSILON);
        let span_y = bounds.height().max(f64::EPSILON);
        let scale = (MAP_WIDTH - 2.0 * PADDING) / span_x;

        Projection {
            min_lon: bounds.min().x,
            max_lat: bounds.max().y,
            x_scale: scale * lon_stretch,
            y_scale: scale,
            height: span_y * scale + 2.0 * PADDING,
        }
    }

    fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        (
            PADDING + (lon - self.min_lon) * self.x_scale,
            PADDING + (self.max_lat - lat) * self.y_scale,
        )
    }

    fn path(&self, geometry: &MultiPolygon<f64>) -> String {
        let mut d = String::new();
        for polygon in geometry {
            for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
                for (i, coord) in ring.coords().enumerate() {
                    let (x, y) = self.project(coord.x, coord.y);
                    let cmd = if i == 0 { 'M' } else { 'L' };
                    let _ = write!(d, "{}{:.2} {:.2} ", cmd, x, y);
                }
                d.push_str("Z ");
            }
        }
        d.trim_end().to_string()
    }
}

fn merge(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        geo::Coord {
            x: a.min().x.min(b.min().x),
            y: a.min().y.min(b.min().y),
        },
        geo::Coord {
            x: a.max().x.max(b.max().x),
            y: a.max().y.max(b.max().y),
        },
    )
}

// ============================================================================
// MAP
// ============================================================================

#[derive(Debug)]
pub struct ChoroplethMap<'a> {
    /// Every region with geometry
    pub base_layer: Vec<&'a JoinedRegion>,

    /// Filtered regions with geometry, paired with their fill
    pub highlight_layer: Vec<(&'a JoinedRegion, &'static str)>,

    pub palette: MapPalette,

    projection: Option<Projection>,
}

impl<'a> ChoroplethMap<'a> {
    pub fn new(all: &'a [JoinedRegion], filtered: &[&'a JoinedRegion], palette: MapPalette) -> Self {
        let base_layer: Vec<&JoinedRegion> = all.iter().filter(|r| r.geometry.is_some()).collect();

        let bounds = base_layer
            .iter()
            .filter_map(|r| r.geometry.as_ref().and_then(|g| g.bounding_rect()))
            .reduce(merge);

        let lookup = count_color_lookup(filtered.iter().map(|r| r.count), palette);
        let highlight_layer = filtered
            .iter()
            .filter(|r| r.geometry.is_some())
            .map(|r| (*r, lookup.get(&r.count).copied().unwrap_or(FALLBACK_COLOR)))
            .collect();

        ChoroplethMap {
            base_layer,
            highlight_layer,
            palette,
            projection: bounds.map(Projection::fit),
        }
    }

    pub fn has_geometry(&self) -> bool {
        self.projection.is_some()
    }

    pub fn to_svg(&self) -> askama::Result<String> {
        let Some(projection) = self.projection else {
            return MapSvg {
                width: MAP_WIDTH,
                height: EMPTY_HEIGHT,
                palette: self.palette.as_str(),
                has_geometry: false,
                layers: Vec::new(),
                stroke: OUTLINE_COLOR,
                stroke_width: OUTLINE_WEIGHT,
            }
            .render();
        };

        let base = self
            .base_layer
            .iter()
            .filter_map(|region| region_path(&projection, region, BASE_FILL))
            .collect();
        let highlight = self
            .highlight_layer
            .iter()
            .filter_map(|(region, color)| region_path(&projection, region, color))
            .collect();

        MapSvg {
            width: MAP_WIDTH,
            height: projection.height,
            palette: self.palette.as_str(),
            has_geometry: true,
            layers: vec![
                MapLayer {
                    id: "coverage-layer",
                    class: "base",
                    paths: base,
                },
                MapLayer {
                    id: "highlight-layer",
                    class: "highlight",
                    paths: highlight,
                },
            ],
            stroke: OUTLINE_COLOR,
            stroke_width: OUTLINE_WEIGHT,
        }
        .render()
    }
}

// ============================================================================
// SVG
// ============================================================================

const EMPTY_HEIGHT: f64 = 60.0;

struct RegionPath<'a> {
    name: &'a str,
    count: u32,
    d: String,
    fill: String,
    opacity: f64,
}

struct MapLayer<'a> {
    id: &'static str,
    class: &'static str,
    paths: Vec<RegionPath<'a>>,
}

#[derive(Template)]
#[template(path = "map.svg")]
struct MapSvg<'a> {
    width: f64,
    height: f64,
    palette: &'static str,
    has_geometry: bool,
    layers: Vec<MapLayer<'a>>,
    stroke: &'static str,
    stroke_width: f64,
}

fn region_path<'a>(projection: &Projection, region: &'a JoinedRegion, color: &str) -> Option<RegionPath<'a>> {
    let geometry = region.geometry.as_ref()?;
    let (fill, opacity) = svg_fill(color);

    Some(RegionPath {
        name: &region.name,
        count: region.count,
        d: projection.path(geometry),
        fill,
        opacity,
    })
}

/// One legend line next to the map
#[derive(Debug, Clone, Copy)]
pub struct LegendEntry {
    pub color: &'static str,
    pub label: &'static str,
}

/// Static legend; mirrors the bar-chart colors
pub const LEGEND: &[LegendEntry] = &[
    LegendEntry { color: "#7CFC00", label: "1 office" },
    LegendEntry { color: "#FFFF00", label: "2 offices" },
    LegendEntry { color: "#FFA500", label: "3 offices" },
    LegendEntry { color: "#FF0000", label: "4 offices" },
    LegendEntry { color: "#800080", label: "20 offices (Bogotá)" },
    LegendEntry { color: "#F7F7F7", label: "Other departments" },
];

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ViewFilter;
    use crate::test_support::joined;

    fn sample() -> Vec<JoinedRegion> {
        joined(&[
            ("BOGOTA, D.C.", 20),
            ("ANTIOQUIA", 4),
            ("SANTANDER", 3),
            ("ATLANTICO", 2),
            ("CHOCO", 1),
            ("VICHADA", 0),
        ])
    }

    fn count(svg: &str, needle: &str) -> usize {
        svg.matches(needle).count()
    }

    #[test]
    fn test_base_layer_ignores_filters() {
        let regions = sample();

        for filter in [
            ViewFilter::default(),
            ViewFilter::from_pairs([("min", "20")]),
            ViewFilter::from_pairs([("region", "NOWHERE")]),
        ] {
            let filtered = filter.apply(&regions);
            let map = ChoroplethMap::new(&regions, &filtered, filter.palette);
            let svg = map.to_svg().unwrap();

            assert_eq!(map.base_layer.len(), regions.len());
            assert_eq!(count(&svg, r#"class="region base""#), regions.len());
            assert_eq!(count(&svg, r#"class="region highlight""#), filtered.len());
        }
    }

    #[test]
    fn test_highlight_layer_follows_filter() {
        let regions = sample();

        let none = ViewFilter::from_pairs([("region", "NOWHERE")]);
        let filtered = none.apply(&regions);
        assert!(ChoroplethMap::new(&regions, &filtered, none.palette)
            .highlight_layer
            .is_empty());

        let all = ViewFilter::from_pairs([("min", "1")]);
        let filtered = all.apply(&regions);
        assert_eq!(
            ChoroplethMap::new(&regions, &filtered, all.palette).highlight_layer.len(),
            5
        );
    }

    #[test]
    fn test_highlight_colors_come_from_filtered_counts() {
        let regions = sample();
        let filter = ViewFilter::from_pairs([("min", "3")]);
        let filtered = filter.apply(&regions);

        let map = ChoroplethMap::new(&regions, &filtered, MapPalette::Thematic);
        let colors: Vec<(&str, &str)> = map
            .highlight_layer
            .iter()
            .map(|(r, c)| (r.name.as_str(), *c))
            .collect();

        assert_eq!(
            colors,
            vec![
                ("BOGOTA, D.C.", "#FFA500"),
                ("ANTIOQUIA", "#FFFF00"),
                ("SANTANDER", "#7CFC00"),
            ]
        );
    }

    #[test]
    fn test_blues_palette_alpha_becomes_opacity() {
        let regions = joined(&[("ANTIOQUIA", 4)]);
        let filtered: Vec<&JoinedRegion> = regions.iter().collect();

        let svg = ChoroplethMap::new(&regions, &filtered, MapPalette::Blues).to_svg().unwrap();
        assert!(svg.contains(r##"fill="#9FBFFF""##));
        assert!(svg.contains(r#"data-palette="blues""#));
    }

    #[test]
    fn test_tooltip_and_escaping() {
        let regions = joined(&[("A & B", 2)]);
        let filtered: Vec<&JoinedRegion> = Vec::new();

        let svg = ChoroplethMap::new(&regions, &filtered, MapPalette::Thematic).to_svg().unwrap();
        assert!(svg.contains("Department: A &amp; B&#10;Offices: 2"));
    }

    #[test]
    fn test_regions_without_geometry() {
        let mut regions = sample();
        for region in &mut regions {
            region.geometry = None;
        }
        let filtered: Vec<&JoinedRegion> = regions.iter().collect();

        let map = ChoroplethMap::new(&regions, &filtered, MapPalette::Thematic);
        assert!(!map.has_geometry());
        assert!(map.base_layer.is_empty());
        assert!(map.to_svg().unwrap().contains("No boundary geometry loaded"));
    }

    #[test]
    fn test_projection_keeps_shapes_inside_viewbox() {
        let regions = sample();
        let map = ChoroplethMap::new(&regions, &[], MapPalette::Thematic);
        let projection = map.projection.unwrap();

        let (x0, y0) = projection.project(-78.0, 5.0);
        let (x1, y1) = projection.project(-72.0, 2.0);
        assert!((x0 - PADDING).abs() < 1e-9);
        assert!((y0 - PADDING).abs() < 1e-9);
        assert!((x1 - (MAP_WIDTH - PADDING)).abs() < 1e-6);
        assert!((y1 - (projection.height - PADDING)).abs() < 1e-6);
    }
}
