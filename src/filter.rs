// 🔍 View Filter - What the highlighted map layer shows
//
// Filters never touch the cached joined table. Each interaction builds a
// ViewFilter and asks it for the subset; the coverage layer, the charts and
// the table keep using the full table.

use crate::join::JoinedRegion;
use crate::render::palette::MapPalette;
use serde::Serialize;
use std::collections::BTreeSet;

/// Office-count slider bounds
pub const MIN_OFFICES: u32 = 1;
pub const MAX_OFFICES: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewFilter {
    pub palette: MapPalette,

    /// Inclusive office-count range
    pub min_offices: u32,
    pub max_offices: u32,

    /// Normalized names; empty means every region
    pub regions: BTreeSet<String>,
}

impl Default for ViewFilter {
    fn default() -> Self {
        ViewFilter {
            palette: MapPalette::Thematic,
            min_offices: MIN_OFFICES,
            max_offices: MAX_OFFICES,
            regions: BTreeSet::new(),
        }
    }
}

impl ViewFilter {
    /// Build from decoded `key=value` pairs (`map`, `min`, `max`, repeated `region`).
    ///
    /// Unknown keys and unparsable values are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filter = ViewFilter::default();

        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "map" => {
                    if let Some(palette) = MapPalette::parse(value) {
                        filter.palette = palette;
                    }
                }
                "min" => {
                    if let Ok(min) = value.trim().parse() {
                        filter.min_offices = min;
                    }
                }
                "max" => {
                    if let Ok(max) = value.trim().parse() {
                        filter.max_offices = max;
                    }
                }
                "region" if !value.trim().is_empty() => {
                    filter.regions.insert(value.to_string());
                }
                _ => {}
            }
        }

        filter.clamped()
    }

    /// Keep the range inside the slider bounds with min <= max
    pub fn clamped(mut self) -> Self {
        self.min_offices = self.min_offices.clamp(MIN_OFFICES, MAX_OFFICES);
        self.max_offices = self.max_offices.clamp(MIN_OFFICES, MAX_OFFICES);
        if self.min_offices > self.max_offices {
            std::mem::swap(&mut self.min_offices, &mut self.max_offices);
        }
        self
    }

    pub fn is_default(&self) -> bool {
        *self == ViewFilter::default()
    }

    pub fn matches(&self, region: &JoinedRegion) -> bool {
        (self.regions.is_empty() || self.regions.contains(&region.normalized_name))
            && region.count >= self.min_offices
            && region.count <= self.max_offices
    }

    /// Regions for the highlighted layer, in table order
    pub fn apply<'a>(&self, regions: &'a [JoinedRegion]) -> Vec<&'a JoinedRegion> {
        regions.iter().filter(|r| self.matches(r)).collect()
    }

    pub fn toggle_region(&mut self, normalized_name: &str) {
        if !self.regions.remove(normalized_name) {
            self.regions.insert(normalized_name.to_string());
        }
    }

    pub fn adjust_min(&mut self, delta: i32) {
        self.min_offices = step(self.min_offices, delta).min(self.max_offices);
    }

    pub fn adjust_max(&mut self, delta: i32) {
        self.max_offices = step(self.max_offices, delta).max(self.min_offices);
    }

    pub fn reset(&mut self) {
        *self = ViewFilter::default();
    }

    /// One-line description for status bars and logs
    pub fn describe(&self) -> String {
        let regions = if self.regions.is_empty() {
            "all regions".to_string()
        } else {
            format!("{} region(s)", self.regions.len())
        };
        format!(
            "{} | offices {}-{} | {}",
            self.palette.as_str(),
            self.min_offices,
            self.max_offices,
            regions
        )
    }
}

fn step(value: u32, delta: i32) -> u32 {
    (value as i64 + delta as i64).clamp(MIN_OFFICES as i64, MAX_OFFICES as i64) as u32
}

/// Sorted distinct normalized names for the region picker
pub fn region_options(regions: &[JoinedRegion]) -> Vec<String> {
    regions
        .iter()
        .map(|r| r.normalized_name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
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

    #[test]
    fn test_default_range_hides_empty_regions() {
        let regions = sample();
        let filtered = ViewFilter::default().apply(&regions);

        assert_eq!(filtered.len(), 5);
        assert!(filtered.iter().all(|r| r.count >= 1));
    }

    #[test]
    fn test_range_is_inclusive() {
        let regions = sample();
        let filter = ViewFilter {
            min_offices: 2,
            max_offices: 4,
            ..Default::default()
        };

        let names: Vec<&str> = filter.apply(&regions).iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["ANTIOQUIA", "SANTANDER", "ATLANTICO"]);
    }

    #[test]
    fn test_region_selection_combines_with_range() {
        let regions = sample();
        let mut filter = ViewFilter::default();
        filter.toggle_region("ANTIOQUIA");
        filter.toggle_region("VICHADA");

        let names: Vec<&str> = filter.apply(&regions).iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["ANTIOQUIA"]);

        filter.toggle_region("ANTIOQUIA");
        assert!(filter.apply(&regions).is_empty());
    }

    #[test]
    fn test_from_pairs() {
        let filter = ViewFilter::from_pairs([
            ("map", "blues"),
            ("min", "3"),
            ("max", "25"),
            ("region", "BOGOTA, D.C."),
            ("region", "CHOCO"),
            ("region", ""),
            ("page", "2"),
        ]);

        assert_eq!(filter.palette, MapPalette::Blues);
        assert_eq!(filter.min_offices, 3);
        assert_eq!(filter.max_offices, MAX_OFFICES);
        assert_eq!(filter.regions.len(), 2);
    }

    #[test]
    fn test_from_pairs_ignores_garbage() {
        let filter = ViewFilter::from_pairs([("map", "heat"), ("min", "abc")]);

        assert!(filter.is_default());
    }

    #[test]
    fn test_inverted_range_is_swapped() {
        let filter = ViewFilter::from_pairs([("min", "10"), ("max", "2")]);

        assert_eq!((filter.min_offices, filter.max_offices), (2, 10));
    }

    #[test]
    fn test_adjust_keeps_bounds() {
        let mut filter = ViewFilter::default();

        filter.adjust_min(-5);
        assert_eq!(filter.min_offices, MIN_OFFICES);

        filter.adjust_max(-30);
        assert_eq!(filter.max_offices, MIN_OFFICES);

        filter.adjust_max(4);
        filter.adjust_min(10);
        assert_eq!((filter.min_offices, filter.max_offices), (5, 5));

        filter.reset();
        assert!(filter.is_default());
    }

    #[test]
    fn test_region_options_sorted_and_distinct() {
        let mut regions = sample();
        regions.push(regions[1].clone());

        let options = region_options(&regions);
        assert_eq!(options.len(), 6);
        assert_eq!(options[0], "ANTIOQUIA");
        assert_eq!(options[5], "VICHADA");
    }
}
