//! Boundary matching and segment extraction.
//!
//! Boundary-scoped parsing units pop their row ranges out of one shared row
//! list in configured order; whatever is left belongs to the default unit.
//! Later boundary searches only see rows earlier pops left behind.

use crate::config::{Boundary, ParsingConfig, ParsingUnit};
use crate::error::{KepError, Result};
use crate::models::RawRow;
use tracing::debug;

/// Marker length kept in diagnostics
const MARKER_PREVIEW_CHARS: usize = 20;

/// Rows assigned to one parsing unit
#[derive(Debug, Clone)]
pub struct Segment<'c> {
    pub unit: &'c ParsingUnit,
    pub rows: Vec<RawRow>,
}

/// True if any row's first cell starts with `marker`
pub fn find_boundary(rows: &[RawRow], marker: &str) -> bool {
    rows.iter().any(|row| row.starts_with(marker))
}

/// First candidate pair whose start and end markers are both present
pub fn select_boundaries<'b>(
    rows: &[RawRow],
    candidates: &'b [Boundary],
    unit_name: &str,
) -> Result<&'b Boundary> {
    candidates
        .iter()
        .find(|b| find_boundary(rows, &b.start) && find_boundary(rows, &b.end))
        .ok_or_else(|| KepError::BoundaryNotFound {
            unit: unit_name.to_string(),
            attempted: candidates
                .iter()
                .map(|b| format!("'{}' .. '{}'", preview(&b.start), preview(&b.end)))
                .collect::<Vec<_>>()
                .join("; "),
        })
}

fn preview(marker: &str) -> String {
    if marker.chars().count() > MARKER_PREVIEW_CHARS {
        let head: String = marker.chars().take(MARKER_PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        marker.to_string()
    }
}

/// Remove and return rows from the first `start` row up to, not including,
/// the next `end` row.
///
/// Returns an empty segment if `start` is absent. Without an `end` row the
/// segment runs to the end of input.
pub fn pop_segment(rows: &mut Vec<RawRow>, start: &str, end: &str) -> Vec<RawRow> {
    enum State {
        Before,
        Inside,
        After,
    }

    let mut state = State::Before;
    let mut segment = Vec::new();
    let mut remainder = Vec::with_capacity(rows.len());

    for row in rows.drain(..) {
        match state {
            State::Before if row.starts_with(start) => {
                state = State::Inside;
                segment.push(row);
            }
            State::Inside if row.starts_with(end) => {
                state = State::After;
                remainder.push(row);
            }
            State::Inside => segment.push(row),
            State::Before | State::After => remainder.push(row),
        }
    }

    *rows = remainder;
    segment
}

/// Shared row list that scoped units pop their segments from
#[derive(Debug)]
pub struct SegmentStack {
    rows: Vec<RawRow>,
}

impl SegmentStack {
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self { rows }
    }

    /// Pop the segment of a boundary-scoped unit
    pub fn pop<'c>(&mut self, unit: &'c ParsingUnit) -> Result<Segment<'c>> {
        let boundary = select_boundaries(&self.rows, &unit.boundaries, &unit.name)?;
        let rows = pop_segment(&mut self.rows, &boundary.start, &boundary.end);
        debug!(
            "Parsing unit '{}': popped {} rows between '{}' and '{}', {} remain",
            unit.name,
            rows.len(),
            preview(&boundary.start),
            preview(&boundary.end),
            self.rows.len()
        );
        Ok(Segment { unit, rows })
    }

    /// Hand the remaining rows to the default unit
    pub fn remainder(self, unit: &ParsingUnit) -> Segment<'_> {
        Segment {
            unit,
            rows: self.rows,
        }
    }
}

/// Split rows into one segment per parsing unit, scoped units first
pub fn split_segments(rows: Vec<RawRow>, config: &ParsingConfig) -> Result<Vec<Segment<'_>>> {
    let default_unit = config.default_unit().ok_or_else(|| KepError::Configuration {
        message: "no default parsing unit".to_string(),
    })?;

    let mut stack = SegmentStack::new(rows);
    let mut segments = Vec::new();
    for unit in config.scoped_units() {
        segments.push(stack.pop(unit)?);
    }
    segments.push(stack.remainder(default_unit));
    Ok(segments)
}
