// Office Coverage - Core Library
// Loading, joining and rendering shared by the terminal dashboard and the web server

pub mod normalize;     // Department name folding
pub mod offices;       // Office table (CSV)
pub mod boundaries;    // Department polygons (GeoJSON)
pub mod aggregate;     // Offices per department
pub mod join;          // Boundaries ⟕ counts
pub mod filter;        // Highlighted layer selection
pub mod render;        // Map, charts, table, page
pub mod config;
pub mod context;
pub mod logging;

#[cfg(feature = "server")]
pub mod server;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use normalize::{fold_accents, NameNormalizer};
pub use offices::{read_offices, OfficeRecord, OfficeTableOptions};
pub use boundaries::{parse_boundaries, RegionBoundary};
pub use aggregate::{RegionCount, RegionCounts};
pub use join::{join_counts, JoinReport, JoinedRegion};
pub use filter::{region_options, ViewFilter, MAX_OFFICES, MIN_OFFICES};
pub use render::page::render_dashboard;
pub use render::palette::MapPalette;
pub use config::{Config, DataConfig, ServerConfig};
pub use context::{fingerprint_sources, source_fingerprint, AppContext, LoadError, Metrics};
pub use logging::init_logging;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
