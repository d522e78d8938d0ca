// 📦 Application Context - Load once, read many
//
// Runs the whole pipeline (read files → normalize → tally → join) a single
// time at startup. Shells hold the resulting AppContext and only ever read
// it. Any failure during load is collapsed into one warning and the fixed
// fallback table takes its place so the dashboard still renders.

use crate::aggregate::RegionCounts;
use crate::boundaries::parse_boundaries;
use crate::config::DataConfig;
use crate::filter::region_options;
use crate::join::{join_counts, JoinReport, JoinedRegion};
use crate::normalize::NameNormalizer;
use crate::offices::read_offices;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

/// Data load/join failure. Causes are not distinguished.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not load office data: {0:#}")]
    Data(#[from] anyhow::Error),
}

// ============================================================================
// FALLBACK TABLE
// ============================================================================

/// Shown when the source files can't be loaded; no geometry
pub const FALLBACK_REGIONS: &[(&str, u32)] = &[
    ("BOGOTA, D.C.", 20),
    ("ANTIOQUIA", 4),
    ("VALLE DEL CAUCA", 4),
    ("CUNDINAMARCA", 4),
    ("SANTANDER", 3),
    ("NARIÑO", 3),
    ("TOLIMA", 3),
    ("ATLANTICO", 2),
    ("BOLIVAR", 2),
    ("BOYACA", 2),
];

/// National office total reported alongside the fallback table
pub const FALLBACK_TOTAL_OFFICES: usize = 71;

fn fallback_regions(normalizer: &NameNormalizer) -> Vec<JoinedRegion> {
    FALLBACK_REGIONS
        .iter()
        .map(|(name, count)| JoinedRegion {
            name: name.to_string(),
            normalized_name: normalizer.normalize_boundary_name(name),
            count: *count,
            geometry: None,
        })
        .collect()
}

// ============================================================================
// METRICS
// ============================================================================

/// Headline numbers for the metric cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub total_offices: usize,
    /// Departments with at least one office
    pub covered_regions: usize,
    /// Fewest offices among covered departments
    pub min_offices: u32,
    pub max_offices: u32,
}

// ============================================================================
// CONTEXT
// ============================================================================

#[derive(Debug, Clone)]
pub struct AppContext {
    /// Joined table in boundary order
    pub regions: Vec<JoinedRegion>,
    pub report: JoinReport,
    /// Rows in the office table
    pub office_rows: usize,
    /// Set when the fallback table is in use
    pub warning: Option<String>,
    /// SHA-256 over both source files, `None` if they couldn't be read
    pub fingerprint: Option<String>,
    pub loaded_at: DateTime<Utc>,
}

impl AppContext {
    /// Load and join the configured sources, falling back on any failure
    pub fn load(config: &DataConfig) -> Self {
        match Self::try_load(config) {
            Ok(context) => context,
            Err(err) => {
                tracing::warn!(error = %err, "using built-in fallback data");
                Self::fallback(&config.normalizer(), err.to_string(), source_fingerprint(config).ok())
            }
        }
    }

    /// Load without the fallback
    pub fn try_load(config: &DataConfig) -> Result<Self, LoadError> {
        let normalizer = config.normalizer();

        // One read per file; the fingerprint covers exactly what was parsed
        let boundary_bytes = read_source(&config.boundaries)?;
        let office_bytes = read_source(&config.offices)?;
        let fingerprint = fingerprint_sources(&boundary_bytes, &office_bytes);

        let geojson = std::str::from_utf8(&boundary_bytes)
            .with_context(|| format!("Boundary file is not UTF-8: {:?}", config.boundaries))?;
        let boundaries = parse_boundaries(geojson, &config.name_field)
            .with_context(|| format!("Failed to parse boundary file: {:?}", config.boundaries))?;
        let offices = read_offices(office_bytes.as_slice(), &config.office_options())
            .with_context(|| format!("Failed to read office table: {:?}", config.offices))?;

        let counts = RegionCounts::from_offices(&offices, &normalizer);
        let (regions, report) = join_counts(&boundaries, &counts, &normalizer);

        tracing::info!(
            regions = regions.len(),
            offices = offices.len(),
            matched = report.matched_offices,
            unmatched = report.unmatched_offices(),
            "office data loaded"
        );

        Ok(AppContext {
            regions,
            report,
            office_rows: offices.len(),
            warning: None,
            fingerprint: Some(fingerprint),
            loaded_at: Utc::now(),
        })
    }

    /// Context over the fixed fallback table
    pub fn fallback(normalizer: &NameNormalizer, warning: String, fingerprint: Option<String>) -> Self {
        AppContext {
            regions: fallback_regions(normalizer),
            report: JoinReport::default(),
            office_rows: 0,
            warning: Some(warning),
            fingerprint,
            loaded_at: Utc::now(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.warning.is_some()
    }

    pub fn metrics(&self) -> Metrics {
        let covered: Vec<u32> = self
            .regions
            .iter()
            .filter(|r| r.has_offices())
            .map(|r| r.count)
            .collect();

        Metrics {
            total_offices: if self.is_fallback() {
                FALLBACK_TOTAL_OFFICES
            } else {
                self.office_rows
            },
            covered_regions: covered.len(),
            min_offices: covered.iter().copied().min().unwrap_or(0),
            max_offices: self.regions.iter().map(|r| r.count).max().unwrap_or(0),
        }
    }

    /// Look up a region by normalized name
    pub fn region(&self, normalized_name: &str) -> Option<&JoinedRegion> {
        self.regions
            .iter()
            .find(|r| r.normalized_name == normalized_name)
    }

    pub fn region_options(&self) -> Vec<String> {
        region_options(&self.regions)
    }

    /// True when the files on disk no longer match what was loaded
    pub fn is_stale(&self, config: &DataConfig) -> bool {
        source_fingerprint(config).ok() != self.fingerprint
    }
}

// ============================================================================
// FINGERPRINT
// ============================================================================

fn read_source(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))
}

/// SHA-256 over the boundary bytes followed by the office bytes
pub fn fingerprint_sources(boundaries: &[u8], offices: &[u8]) -> String {
    let mut hasher = Sha256::new();
    for bytes in [boundaries, offices] {
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }
    format!("{:x}", hasher.finalize())
}

/// Fingerprint of the configured source files as they are on disk now
pub fn source_fingerprint(config: &DataConfig) -> anyhow::Result<String> {
    let boundaries = read_source(&config.boundaries)?;
    let offices = read_source(&config.offices)?;
    Ok(fingerprint_sources(&boundaries, &offices))
}

// ============================================================================
// TESTS
// ============================================================================
