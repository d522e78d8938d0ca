// 📋 Detail Table - Offices per department with row styling
//
// Rows feed the dashboard template and the terminal table alike.

use super::palette::table_row_background;
use crate::join::JoinedRegion;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub name: String,
    pub normalized_name: String,
    pub offices: u32,
    pub background: &'static str,
}

/// All regions, most offices first. Ties keep table order.
pub fn table_rows(regions: &[JoinedRegion]) -> Vec<TableRow> {
    let mut rows: Vec<TableRow> = regions
        .iter()
        .map(|r| TableRow {
            name: r.name.clone(),
            normalized_name: r.normalized_name.clone(),
            offices: r.count,
            background: table_row_background(r.count),
        })
        .collect();

    rows.sort_by(|a, b| b.offices.cmp(&a.offices));
    rows
}
