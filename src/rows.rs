//! Row reading, year row classification and value normalization.
//!
//! Splits the tab-delimited release text into raw rows, decides which rows
//! start a data block and converts locale-formatted, footnote-annotated
//! cells into numbers.

use crate::config::ParsingConfig;
use crate::constants::{MAX_NORMALIZE_ATTEMPTS, MAX_YEAR, MIN_YEAR, MISSING_GLYPHS};
use crate::error::{KepError, Result};
use crate::models::RawRow;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Leading 4-digit run
static LEADING_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\d{4})").unwrap());

/// A year followed only by footnote markers such as `2)3)`
static YEAR_CELL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{4})(\s*\d{1,2}\))*\s*$").unwrap());

/// Signed number followed by a footnote digit and a closing parenthesis
static FOOTNOTE_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(-?\d*\.?\d*)\d\)").unwrap());

/// Split release text into rows, dropping empty and ignored lines
pub fn read_rows(text: &str, config: &ParsingConfig) -> Vec<RawRow> {
    let mut skipped = 0usize;
    let rows: Vec<RawRow> = text
        .lines()
        .filter_map(|line| {
            let row = parse_line(line);
            let keep = !row.name().is_empty()
                && !config
                    .ignore_prefixes
                    .iter()
                    .any(|prefix| row.starts_with(prefix));
            if !keep {
                skipped += 1;
            }
            keep.then_some(row)
        })
        .collect();

    debug!("Read {} rows, skipped {}", rows.len(), skipped);
    rows
}

/// Split one tab-delimited line into trimmed cells without trailing empties
fn parse_line(line: &str) -> RawRow {
    let mut cells: Vec<String> = line
        .split('\t')
        .map(|cell| cell.trim().trim_matches('"').trim().to_string())
        .collect();
    while cells.last().is_some_and(|cell| cell.is_empty()) {
        cells.pop();
    }
    RawRow { cells }
}

/// Year row classification over a plausible year range
#[derive(Debug, Clone, Copy)]
pub struct RowClassifier {
    min_year: i32,
    max_year: i32,
}

impl Default for RowClassifier {
    fn default() -> Self {
        Self {
            min_year: MIN_YEAR,
            max_year: MAX_YEAR,
        }
    }
}

impl RowClassifier {
    pub fn new(min_year: i32, max_year: i32) -> Self {
        Self { min_year, max_year }
    }

    pub fn from_config(config: &ParsingConfig) -> Self {
        Self::new(config.min_year, config.max_year)
    }

    /// True if the first cell holds a plausible year, footnotes aside
    pub fn is_year_row(&self, row: &RawRow) -> bool {
        YEAR_CELL
            .captures(row.name())
            .and_then(|caps| caps[1].parse::<i32>().ok())
            .is_some_and(|year| self.is_plausible(year))
    }

    /// Leading 4-digit year of a text, `None` if absent or out of range
    pub fn extract_year(&self, text: &str) -> Option<i32> {
        LEADING_YEAR
            .captures(text)
            .and_then(|caps| caps[1].parse::<i32>().ok())
            .filter(|year| self.is_plausible(*year))
    }

    fn is_plausible(&self, year: i32) -> bool {
        (self.min_year..=self.max_year).contains(&year)
    }
}

/// Year row check with the default year range
pub fn is_year_row(row: &RawRow) -> bool {
    RowClassifier::default().is_year_row(row)
}

/// Leading year extraction with the default year range
pub fn extract_year(text: &str) -> Option<i32> {
    RowClassifier::default().extract_year(text)
}

/// Convert a raw cell to a number.
///
/// Returns `Ok(None)` for missing values (empty cells, placeholder glyphs,
/// non-numeric text). Multi-value artifacts keep the first number and
/// footnote markers are stripped. Input that is still unreadable after
/// [`MAX_NORMALIZE_ATTEMPTS`] cleaning steps is an error.
pub fn normalize_value(text: &str) -> Result<Option<f64>> {
    normalize_attempt(text, 1)
}

fn normalize_attempt(text: &str, attempt: usize) -> Result<Option<f64>> {
    if attempt > MAX_NORMALIZE_ATTEMPTS {
        return Err(KepError::NormalizationDepthExceeded {
            text: text.to_string(),
        });
    }

    let text = text.trim();
    if text.is_empty() || MISSING_GLYPHS.contains(&text) {
        return Ok(None);
    }

    let text = text.replace(',', ".");
    if let Some(value) = text.parse::<f64>().ok().filter(|v| v.is_finite()) {
        return Ok(Some(value));
    }

    // "542.0 5881)": first number wins
    if let Some((first, _)) = text.split_once(' ') {
        return normalize_attempt(first, attempt + 1);
    }

    // "6762.31)2)": drop the footnote digit and everything after it
    if text.contains(')') {
        return match FOOTNOTE_VALUE.captures(&text) {
            Some(caps) => normalize_attempt(&caps[1], attempt + 1),
            None => Ok(None),
        };
    }

    if let Some(stripped) = text.strip_suffix('.') {
        return normalize_attempt(stripped, attempt + 1);
    }

    Ok(None)
}
