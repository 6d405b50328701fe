//! Datapoint emission from decoded data rows.
//!
//! Walks a data row alongside its row format and yields one observation per
//! non-missing value cell, in column order.

use crate::config::RowReader;
use crate::constants::tags;
use crate::error::{KepError, Result};
use crate::models::{Frequency, Observation, RawRow};
use crate::rows::{RowClassifier, normalize_value};
use crate::table::Table;
use std::collections::HashMap;

/// Decode one data row into observations
pub fn emit_observations(
    row: &RawRow,
    label: &str,
    row_format: &str,
    classifier: &RowClassifier,
) -> Result<Vec<Observation>> {
    let mut year: Option<i32> = None;
    let mut seen: HashMap<char, u32> = HashMap::new();
    let mut observations = Vec::new();

    for (cell, tag) in row.cells.iter().zip(row_format.chars()) {
        if tag == tags::YEAR {
            year = Some(classifier.extract_year(cell).ok_or_else(|| {
                KepError::InvalidYear {
                    cell: cell.clone(),
                    row: row.cells.clone(),
                }
            })?);
            continue;
        }

        let Some(frequency) = Frequency::from_tag(tag) else {
            continue;
        };

        let period = {
            let count = seen.entry(tag).or_insert(0);
            *count += 1;
            *count
        };

        let Some(value) = normalize_value(cell)? else {
            continue;
        };

        let year = year.ok_or_else(|| KepError::ValueBeforeYear {
            label: label.to_string(),
            row: row.cells.clone(),
        })?;

        observations.push(Observation {
            label: label.to_string(),
            frequency,
            year,
            month: frequency.period_end_month(period),
            value,
        });
    }

    Ok(observations)
}

/// Decode all data rows of a labeled table with an inferred row format
pub fn emit_table(
    table: &Table,
    reader: Option<RowReader>,
    classifier: &RowClassifier,
) -> Result<Vec<Observation>> {
    let (Some(label), Some(row_format)) = (table.label(), table.row_format.as_deref()) else {
        return Ok(Vec::new());
    };
    let label = label.to_string();

    let mut observations = Vec::new();
    for row in &table.datarows {
        let mut emitted = emit_observations(row, &label, row_format, classifier)?;
        if reader == Some(RowReader::Fiscal) && row_format.contains(tags::MONTH) {
            emitted.extend(fiscal_december(&emitted));
        }
        observations.extend(emitted);
    }
    Ok(observations)
}

/// The annual total of a year-to-date series is also its December value
fn fiscal_december(observations: &[Observation]) -> Vec<Observation> {
    observations
        .iter()
        .filter(|obs| obs.frequency == Frequency::Annual)
        .map(|obs| Observation {
            frequency: Frequency::Monthly,
            month: 12,
            ..obs.clone()
        })
        .collect()
}
