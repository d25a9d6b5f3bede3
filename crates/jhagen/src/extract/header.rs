use tracing::debug;

use crate::docx::model::Table;

/// Header rows are scanned only this deep into each table. Header position
/// varies across MOP authors, but a bounded early-row scan keeps cost down
/// and avoids false positives from data rows.
pub const HEADER_SCAN_ROWS: usize = 6;

/// Location of the step-description column in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLocation {
    pub table: usize,
    pub row: usize,
    pub column: usize,
}

/// Scans every table's first [`HEADER_SCAN_ROWS`] rows for a cell whose
/// upper-cased text contains both tokens. First match wins across the
/// whole document; there is no best-match ranking.
pub fn locate_header(tables: &[Table], primary: &str, qualifier: &str) -> Option<HeaderLocation> {
    let primary = primary.to_uppercase();
    let qualifier = qualifier.to_uppercase();

    for (t_idx, table) in tables.iter().enumerate() {
        for (r_idx, row) in table.rows.iter().take(HEADER_SCAN_ROWS).enumerate() {
            for (c_idx, cell) in row.cells.iter().enumerate() {
                let text = cell.text().trim().to_uppercase();
                if text.contains(&primary) && text.contains(&qualifier) {
                    debug!(table = t_idx, row = r_idx, column = c_idx, "found header cell");
                    return Some(HeaderLocation {
                        table: t_idx,
                        row: r_idx,
                        column: c_idx,
                    });
                }
            }
        }
    }

    None
}
