//! Data row shape detection.
//!
//! A table's row format is looked up from the widest data row in the table.
//! Each format is a string of one-letter tags per column, e.g.
//! `YAQQQQMMMMMMMMMMMM` for year, annual, 4 quarters and 12 months.

use crate::config::RowReader;
use crate::constants::{FISCAL_ROW_FORMATS, ROW_FORMATS, tags};
use crate::error::{KepError, Result};
use crate::models::RawRow;
use tracing::warn;

/// Known shape for a cell count, if any
pub fn lookup_format(count: usize, reader: Option<RowReader>) -> Option<&'static str> {
    let table = match reader {
        None => ROW_FORMATS,
        Some(RowReader::Fiscal) => FISCAL_ROW_FORMATS,
    };
    table
        .iter()
        .find(|(length, _)| *length == count)
        .map(|(_, format)| *format)
}

/// Infer the per-column tag string of a table's data rows
pub fn detect_row_format(datarows: &[RawRow], reader: Option<RowReader>) -> Result<String> {
    let count = datarows.iter().map(RawRow::len).max().unwrap_or(0);

    if let Some(format) = lookup_format(count, reader) {
        return Ok(format.to_string());
    }

    match reader {
        Some(RowReader::Fiscal) => {
            warn!(
                "Fiscal reader: no known shape with {} columns, passing row through unread",
                count
            );
            Ok(tags::SKIP.to_string().repeat(count))
        }
        None => Err(KepError::UnknownRowFormat {
            count,
            sample: datarows
                .iter()
                .find(|row| row.len() == count)
                .map(|row| row.cells.clone())
                .unwrap_or_default(),
        }),
    }
}
