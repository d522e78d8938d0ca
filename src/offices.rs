// 🏢 Office Table - One row per physical office
//
// Only the region column is required. Every other column is kept as an
// attribute map so descriptive fields (office name, municipality, address,
// opening hours) survive without a fixed schema.

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::io;

/// Column holding the department name in the published office table
pub const DEFAULT_REGION_COLUMN: &str = "departamentos";

/// One office as read from the delimited file
#[derive(Debug, Clone, Serialize)]
pub struct OfficeRecord {
    /// 1-based data row (header excluded)
    pub line_number: usize,

    /// Raw department name, `None` when the cell is blank
    pub region: Option<String>,

    /// Every other column, keyed by header
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, String>,
}

impl OfficeRecord {
    pub fn new(line_number: usize, region: &str) -> Self {
        OfficeRecord {
            line_number,
            region: Some(region.to_string()),
            attributes: HashMap::new(),
        }
    }

    pub fn attribute(&self, column: &str) -> Option<&str> {
        self.attributes.get(column).map(String::as_str)
    }
}

/// How to read the office file
#[derive(Debug, Clone)]
pub struct OfficeTableOptions {
    pub region_column: String,
    pub delimiter: u8,
}

impl Default for OfficeTableOptions {
    fn default() -> Self {
        OfficeTableOptions {
            region_column: DEFAULT_REGION_COLUMN.to_string(),
            delimiter: b',',
        }
    }
}

/// Read offices from any delimited source with a header row
pub fn read_offices<R: io::Read>(reader: R, options: &OfficeTableOptions) -> Result<Vec<OfficeRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .from_reader(reader);

    let headers = rdr.headers().context("Failed to read header row")?.clone();

    let region_index = headers
        .iter()
        .position(|h| h.trim() == options.region_column)
        .ok_or_else(|| anyhow!("Missing region column '{}'", options.region_column))?;

    let mut offices = Vec::new();

    for (i, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Malformed row {}", i + 1))?;

        let region = record
            .get(region_index)
            .filter(|value| !value.trim().is_empty())
            .map(str::to_string);

        let attributes = headers
            .iter()
            .zip(record.iter())
            .enumerate()
            .filter(|(idx, _)| *idx != region_index)
            .map(|(_, (header, value))| (header.trim().to_string(), value.to_string()))
            .collect();

        offices.push(OfficeRecord {
            line_number: i + 1,
            region,
            attributes,
        });
    }

    Ok(offices)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "nombre_oficina,departamentos,municipio\n\
                          Centro,Bogota D.C.,Bogota\n\
                          Honda,HONDA,Honda\n\
                          Medellin,Antioquia,Medellin\n\
                          Sin dato,,\n";

    #[test]
    fn test_read_offices_keeps_raw_region() {
        let offices = read_offices(SAMPLE.as_bytes(), &OfficeTableOptions::default()).unwrap();

        assert_eq!(offices.len(), 4);
        assert_eq!(offices[0].region.as_deref(), Some("Bogota D.C."));
        assert_eq!(offices[1].region.as_deref(), Some("HONDA"));
        assert_eq!(offices[2].attribute("municipio"), Some("Medellin"));
        assert_eq!(offices[2].line_number, 3);
        assert!(offices[0].attribute("departamentos").is_none());
    }

    #[test]
    fn test_blank_region_is_none() {
        let offices = read_offices(SAMPLE.as_bytes(), &OfficeTableOptions::default()).unwrap();

        assert!(offices[3].region.is_none());
    }

    #[test]
    fn test_missing_region_column() {
        let options = OfficeTableOptions {
            region_column: "departamento".to_string(),
            ..Default::default()
        };

        let err = read_offices(SAMPLE.as_bytes(), &options).unwrap_err();
        assert!(err.to_string().contains("Missing region column"));
    }

    #[test]
    fn test_custom_delimiter() {
        let data = "departamentos;ciudad\nCAUCA;Popayan\n";
        let options = OfficeTableOptions {
            delimiter: b';',
            ..Default::default()
        };

        let offices = read_offices(data.as_bytes(), &options).unwrap();
        assert_eq!(offices.len(), 1);
        assert_eq!(offices[0].region.as_deref(), Some("CAUCA"));
        assert_eq!(offices[0].attribute("ciudad"), Some("Popayan"));
    }

    #[test]
    fn test_ragged_row_is_an_error() {
        let data = "departamentos,ciudad\nCAUCA,Popayan,extra\n";

        assert!(read_offices(data.as_bytes(), &OfficeTableOptions::default()).is_err());
    }
}
