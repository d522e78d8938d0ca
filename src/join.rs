// 🔗 Spatial Joiner - Office counts onto department polygons
//
// Left join on the normalized name: every boundary survives, unmatched
// boundaries get a count of zero. Output order follows boundary order.
// Features sharing a normalized name become one region whose geometry is
// the union of their polygons, so each office is counted once.

use crate::aggregate::{RegionCount, RegionCounts};
use crate::boundaries::RegionBoundary;
use crate::normalize::NameNormalizer;
use geo::MultiPolygon;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// One department with its office count
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRegion {
    /// Name as published in the boundary dataset
    pub name: String,

    /// Join key, also used by the region filter
    pub normalized_name: String,

    pub count: u32,

    /// `None` only for the built-in fallback table
    pub geometry: Option<MultiPolygon<f64>>,
}

impl JoinedRegion {
    pub fn has_offices(&self) -> bool {
        self.count > 0
    }
}

/// What the join matched and what it left behind
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JoinReport {
    /// Offices that went into the frequency table
    pub tallied_offices: u32,

    /// Offices whose normalized name matched a boundary
    pub matched_offices: u32,

    /// Normalized names with no boundary, sorted by name
    pub unmatched: Vec<RegionCount>,
}

impl JoinReport {
    pub fn unmatched_offices(&self) -> u32 {
        self.tallied_offices - self.matched_offices
    }

    pub fn is_complete(&self) -> bool {
        self.unmatched.is_empty()
    }
}

/// Fold features that normalize to the same name into the first one seen
fn merge_boundaries(boundaries: &[RegionBoundary], normalizer: &NameNormalizer) -> Vec<JoinedRegion> {
    let mut merged: Vec<JoinedRegion> = Vec::with_capacity(boundaries.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for boundary in boundaries {
        let normalized_name = normalizer.normalize_boundary_name(&boundary.name);

        match index.get(&normalized_name).copied() {
            Some(i) => {
                let region = &mut merged[i];
                tracing::warn!(
                    region = %normalized_name,
                    kept = %region.name,
                    merged = %boundary.name,
                    "boundary features share a name, merging polygons"
                );
                if let Some(geometry) = region.geometry.as_mut() {
                    geometry.0.extend(boundary.geometry.0.iter().cloned());
                }
            }
            None => {
                index.insert(normalized_name.clone(), merged.len());
                merged.push(JoinedRegion {
                    name: boundary.name.clone(),
                    normalized_name,
                    count: 0,
                    geometry: Some(boundary.geometry.clone()),
                });
            }
        }
    }

    merged
}

/// Boundary-preserving join of `counts` onto `boundaries`
pub fn join_counts(
    boundaries: &[RegionBoundary],
    counts: &RegionCounts,
    normalizer: &NameNormalizer,
) -> (Vec<JoinedRegion>, JoinReport) {
    let mut joined = merge_boundaries(boundaries, normalizer);
    for region in &mut joined {
        region.count = counts.get(&region.normalized_name).unwrap_or(0);
    }

    let keys: HashSet<&str> = joined.iter().map(|r| r.normalized_name.as_str()).collect();

    let (matched, unmatched): (Vec<RegionCount>, Vec<RegionCount>) = counts
        .rows()
        .into_iter()
        .partition(|row| keys.contains(row.region.as_str()));

    let report = JoinReport {
        tallied_offices: counts.total(),
        matched_offices: matched.iter().map(|row| row.count).sum(),
        unmatched,
    };

    for row in &report.unmatched {
        tracing::warn!(
            region = %row.region,
            offices = row.count,
            spellings = ?row.spellings,
            "region name matched no boundary"
        );
    }

    (joined, report)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::square;

    fn boundaries(names: &[&str]) -> Vec<RegionBoundary> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| RegionBoundary {
                name: name.to_string(),
                geometry: square(-75.0 + i as f64, 4.0),
            })
            .collect()
    }

    #[test]
    fn test_every_boundary_survives() {
        let normalizer = NameNormalizer::new();
        let input = boundaries(&["ANTIOQUIA", "BOYACÁ", "AMAZONAS", "VAUPÉS"]);
        let counts = RegionCounts::from_names(["Antioquia", "Boyaca", "Boyaca"], &normalizer);

        let (joined, _) = join_counts(&input, &counts, &normalizer);

        assert_eq!(joined.len(), input.len());
        for (region, boundary) in joined.iter().zip(&input) {
            assert_eq!(region.name, boundary.name);
            assert_eq!(region.geometry.as_ref(), Some(&boundary.geometry));
        }
        assert_eq!(
            joined.iter().map(|r| r.count).collect::<Vec<_>>(),
            vec![1, 2, 0, 0]
        );
        assert_eq!(joined[1].normalized_name, "BOYACA");
        assert!(!joined[3].has_offices());
    }

    #[test]
    fn test_no_counts_at_all() {
        let normalizer = NameNormalizer::new();
        let input = boundaries(&["ANTIOQUIA", "CAUCA"]);

        let (joined, report) = join_counts(&input, &RegionCounts::default(), &normalizer);

        assert_eq!(joined.len(), 2);
        assert!(joined.iter().all(|r| r.count == 0));
        assert_eq!(report, JoinReport::default());
    }

    #[test]
    fn test_complete_match_preserves_total() {
        let normalizer = NameNormalizer::new();
        let input = boundaries(&["BOGOTÁ, D.C.", "TOLIMA", "LA GUAJIRA", "VALLE DEL CAUCA"]);
        let counts = RegionCounts::from_names(
            ["BOGOTA D.C.", "BOGOTA  D.C.", "HONDA", "Tolima", "GUAJIRA", "VALLE"],
            &normalizer,
        );

        let (joined, report) = join_counts(&input, &counts, &normalizer);

        let joined_total: u32 = joined.iter().map(|r| r.count).sum();
        assert_eq!(joined_total, 6);
        assert_eq!(report.tallied_offices, 6);
        assert_eq!(report.matched_offices, 6);
        assert!(report.is_complete());
    }

    #[test]
    fn test_unmatched_names_are_reported() {
        let normalizer = NameNormalizer::new();
        let input = boundaries(&["ANTIOQUIA", "CAUCA"]);
        let counts = RegionCounts::from_names(
            ["ANTIOQUIA", "ANTIOQUA", "Atlantis", "ANTIOQUA"],
            &normalizer,
        );

        let (joined, report) = join_counts(&input, &counts, &normalizer);

        let joined_total: u32 = joined.iter().map(|r| r.count).sum();
        assert!(joined_total < report.tallied_offices);
        assert_eq!(joined_total, report.matched_offices);
        assert_eq!(report.unmatched_offices(), 3);
        assert_eq!(
            report
                .unmatched
                .iter()
                .map(|r| (r.region.as_str(), r.count))
                .collect::<Vec<_>>(),
            vec![("ANTIOQUA", 2), ("ATLANTIS", 1)]
        );
    }

    #[test]
    fn test_same_name_features_merge() {
        let normalizer = NameNormalizer::new();
        let input = boundaries(&["BOYACÁ", "CAUCA", "BOYACA"]);
        let counts = RegionCounts::from_names(["Boyaca", "Boyaca", "Boyaca"], &normalizer);

        let (joined, report) = join_counts(&input, &counts, &normalizer);

        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].name, "BOYACÁ");
        assert_eq!(joined[0].count, 3);
        assert_eq!(joined[0].geometry.as_ref().map(|g| g.0.len()), Some(2));
        assert_eq!(joined[1].name, "CAUCA");

        let joined_total: u32 = joined.iter().map(|r| r.count).sum();
        assert_eq!(joined_total, 3);
        assert_eq!(joined_total, report.matched_offices);
        assert!(joined_total <= report.tallied_offices);
    }
}
