// 🔢 Aggregator - Offices per normalized department name

use crate::normalize::NameNormalizer;
use crate::offices::OfficeRecord;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Number of offices attributed to one normalized name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionCount {
    pub region: String,
    pub count: u32,

    /// Raw spellings folded into this name, sorted
    pub spellings: Vec<String>,
}

/// Frequency table keyed by normalized name
#[derive(Debug, Clone, Default)]
pub struct RegionCounts {
    counts: HashMap<String, u32>,
    spellings: HashMap<String, BTreeSet<String>>,
}

impl RegionCounts {
    /// Tally raw names. Every name observed gets a row.
    pub fn from_names<'a, I>(names: I, normalizer: &NameNormalizer) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut table = RegionCounts::default();

        for raw in names {
            let normalized = normalizer.normalize_office_name(raw);
            *table.counts.entry(normalized.clone()).or_insert(0) += 1;
            table
                .spellings
                .entry(normalized)
                .or_default()
                .insert(raw.to_string());
        }

        table
    }

    /// Tally the region column of the office table. Blank cells are not counted.
    pub fn from_offices(offices: &[OfficeRecord], normalizer: &NameNormalizer) -> Self {
        Self::from_names(
            offices.iter().filter_map(|office| office.region.as_deref()),
            normalizer,
        )
    }

    /// Count for a normalized name, if any office was attributed to it
    pub fn get(&self, region: &str) -> Option<u32> {
        self.counts.get(region).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total offices tallied
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    /// Rows sorted by name
    pub fn rows(&self) -> Vec<RegionCount> {
        let mut rows: Vec<RegionCount> = self
            .counts
            .iter()
            .map(|(region, count)| RegionCount {
                region: region.clone(),
                count: *count,
                spellings: self
                    .spellings
                    .get(region)
                    .map(|set| set.iter().cloned().collect())
                    .unwrap_or_default(),
            })
            .collect();

        rows.sort_by(|a, b| a.region.cmp(&b.region));
        rows
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_tallies() {
        let normalizer = NameNormalizer::new();
        let table = RegionCounts::from_names(
            ["ANTIOQUIA", "Antioquia", "CAUCA", "antioquia"],
            &normalizer,
        );

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("ANTIOQUIA"), Some(3));
        assert_eq!(table.get("CAUCA"), Some(1));
        assert_eq!(table.get("Antioquia"), None);
        assert_eq!(table.total(), 4);
    }

    #[test]
    fn test_honda_counts_for_tolima() {
        let normalizer = NameNormalizer::new();
        let table = RegionCounts::from_names(["TOLIMA", "HONDA", "Tolima"], &normalizer);

        assert_eq!(table.get("TOLIMA"), Some(3));
        assert_eq!(table.get("HONDA"), None);
    }

    #[test]
    fn test_spellings_fold_into_one_row() {
        let normalizer = NameNormalizer::new();
        let table = RegionCounts::from_names(
            ["BOGOTA D.C.", "BOGOTA  D.C.", "Bogota D.C.", "VALLE"],
            &normalizer,
        );

        let rows = table.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].region, "BOGOTA, D.C.");
        assert_eq!(rows[0].count, 3);
        assert_eq!(
            rows[0].spellings,
            vec!["BOGOTA  D.C.", "BOGOTA D.C.", "Bogota D.C."]
        );
        assert_eq!(rows[1].region, "VALLE DEL CAUCA");
    }

    #[test]
    fn test_blank_regions_are_skipped() {
        let normalizer = NameNormalizer::new();
        let mut blank = OfficeRecord::new(2, "");
        blank.region = None;
        let offices = vec![OfficeRecord::new(1, "CAUCA"), blank];

        let table = RegionCounts::from_offices(&offices, &normalizer);
        assert_eq!(table.total(), 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        let table = RegionCounts::from_names(std::iter::empty(), &NameNormalizer::new());

        assert!(table.is_empty());
        assert_eq!(table.total(), 0);
        assert!(table.rows().is_empty());
    }
}
