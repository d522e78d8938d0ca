// ⚙️ Configuration - Optional TOML file with data and server settings
//
// `office-coverage.toml` in the working directory, or the path in
// `OFFICE_COVERAGE_CONFIG`. Missing file → defaults; malformed → startup error.
//
//   [data]
//   boundaries = "data/MGN_DPTO_POLITICO.geojson"
//   offices = "data/Oficinas_Fondo_Nacional_del_Ahorro.csv"
//   region_column = "departamentos"
//   name_field = "DPTO_CNMBR"
//   delimiter = ","
//
//   [data.aliases]
//   "BOGOTA DC" = "BOGOTA, D.C."
//
//   [server]
//   listen = "0.0.0.0:3000"

use crate::boundaries::DEFAULT_NAME_FIELD;
use crate::normalize::NameNormalizer;
use crate::offices::{OfficeTableOptions, DEFAULT_REGION_COLUMN};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "office-coverage.toml";

/// Environment variable overriding the config file path
pub const CONFIG_ENV: &str = "OFFICE_COVERAGE_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Input files and how to read them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// GeoJSON FeatureCollection
    #[serde(default = "default_boundaries")]
    pub boundaries: PathBuf,

    #[serde(default = "default_offices")]
    pub offices: PathBuf,

    /// Office column with the department name
    #[serde(default = "default_region_column")]
    pub region_column: String,

    /// Boundary attribute with the department name
    #[serde(default = "default_name_field")]
    pub name_field: String,

    /// Single ASCII character
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Extra alias → canonical name, on top of the built-in table
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            boundaries: default_boundaries(),
            offices: default_offices(),
            region_column: default_region_column(),
            name_field: default_name_field(),
            delimiter: default_delimiter(),
            aliases: BTreeMap::new(),
        }
    }
}

fn default_boundaries() -> PathBuf {
    PathBuf::from("data/MGN_DPTO_POLITICO.geojson")
}

fn default_offices() -> PathBuf {
    PathBuf::from("data/Oficinas_Fondo_Nacional_del_Ahorro.csv")
}

fn default_region_column() -> String {
    DEFAULT_REGION_COLUMN.to_string()
}

fn default_name_field() -> String {
    DEFAULT_NAME_FIELD.to_string()
}

fn default_delimiter() -> char {
    ','
}

impl DataConfig {
    /// Normalizer with the built-in tables plus configured aliases
    pub fn normalizer(&self) -> NameNormalizer {
        self.aliases
            .iter()
            .fold(NameNormalizer::new(), |normalizer, (alias, canonical)| {
                normalizer.with_alias(alias, canonical)
            })
    }

    pub fn office_options(&self) -> OfficeTableOptions {
        OfficeTableOptions {
            region_column: self.region_column.clone(),
            // Validated as ASCII in Config::validate
            delimiter: self.delimiter as u8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:3000".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config.validate()?;
        Ok(config)
    }

    /// Env override, then the local file, then defaults
    pub fn discover() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            tracing::info!(path = %path, "loading config from {}", CONFIG_ENV);
            return Self::load(Path::new(&path));
        }

        let local = Path::new(CONFIG_FILE);
        if local.exists() {
            tracing::info!(path = CONFIG_FILE, "loading config");
            return Self::load(local);
        }

        tracing::debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    fn validate(&self) -> Result<()> {
        if !self.data.delimiter.is_ascii() {
            bail!(
                "Delimiter must be a single ASCII character, got '{}'",
                self.data.delimiter
            );
        }
        if self.data.region_column.trim().is_empty() {
            bail!("region_column must not be empty");
        }
        if self.data.name_field.trim().is_empty() {
            bail!("name_field must not be empty");
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::temp_file;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.data.region_column, "departamentos");
        assert_eq!(config.data.name_field, "DPTO_CNMBR");
        assert_eq!(config.data.delimiter, ',');
        assert_eq!(config.server.listen, "0.0.0.0:3000");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = temp_file(
            r#"
            [data]
            offices = "/srv/oficinas.csv"
            delimiter = ";"

            [data.aliases]
            "Bogota DC" = "BOGOTA, D.C."
            "#,
        );

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.data.offices, PathBuf::from("/srv/oficinas.csv"));
        assert_eq!(config.data.office_options().delimiter, b';');
        assert_eq!(config.data.name_field, "DPTO_CNMBR");
        assert_eq!(config.server.listen, "0.0.0.0:3000");

        let normalizer = config.data.normalizer();
        assert_eq!(normalizer.normalize_office_name("bogota dc"), "BOGOTA, D.C.");
    }

    #[test]
    fn test_rejects_non_ascii_delimiter() {
        let file = temp_file("[data]\ndelimiter = \"¦\"\n");

        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("ASCII"));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let file = temp_file("[data\noffices = 3");

        assert!(Config::load(file.path()).is_err());
    }
}
