//! Core data structures and types for bulletin processing.
//!
//! Defines raw rows, frequencies, labels, observations, checkpoints
//! and the processing statistics shared across the library.

use crate::constants::tags;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One input line split into text cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub cells: Vec<String>,
}

impl RawRow {
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
        }
    }

    /// First cell of the row, empty string for an empty row
    pub fn name(&self) -> &str {
        self.cells.first().map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Prefix match on the first cell
    pub fn starts_with(&self, marker: &str) -> bool {
        self.name().starts_with(marker)
    }

    /// Non-empty cells joined by a single space
    pub fn text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Observation frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Annual,
    Quarterly,
    Monthly,
}

impl Frequency {
    pub const ALL: [Frequency; 3] = [Frequency::Annual, Frequency::Quarterly, Frequency::Monthly];

    /// Map a row format tag letter to a frequency
    pub fn from_tag(tag: char) -> Option<Self> {
        match tag {
            tags::ANNUAL => Some(Frequency::Annual),
            tags::QUARTER => Some(Frequency::Quarterly),
            tags::MONTH => Some(Frequency::Monthly),
            _ => None,
        }
    }

    /// Month number at which the n-th (1-based) period of this frequency ends
    pub fn period_end_month(&self, period: u32) -> u32 {
        match self {
            Frequency::Annual => 12,
            Frequency::Quarterly => period * 3,
            Frequency::Monthly => period,
        }
    }

    /// Short code used in output file names (dfa, dfq, dfm)
    pub fn code(&self) -> char {
        match self {
            Frequency::Annual => 'a',
            Frequency::Quarterly => 'q',
            Frequency::Monthly => 'm',
        }
    }

    /// Month of the first period within a year
    pub fn first_period_month(&self) -> u32 {
        self.period_end_month(1)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Annual => "annual",
            Frequency::Quarterly => "quarterly",
            Frequency::Monthly => "monthly",
        };
        f.write_str(name)
    }
}

/// Canonical variable name combined with a unit code, e.g. `GDP_bln_rub`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Label {
    pub varname: String,
    pub unit: String,
}

impl Label {
    pub fn new(varname: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            varname: varname.into(),
            unit: unit.into(),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.varname, self.unit)
    }
}

/// A single dated value decoded from a data row
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub label: String,
    pub frequency: Frequency,
    pub year: i32,
    /// Month number (1-12) at which the period ends
    pub month: u32,
    pub value: f64,
}

impl Observation {
    /// Last calendar day of the observation period
    pub fn date(&self) -> Option<NaiveDate> {
        month_end(self.year, self.month)
    }
}

/// Last calendar day of a month, `None` for an invalid month
pub fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// Known-correct value used to validate a parsing run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub label: String,
    pub frequency: Frequency,
    pub year: i32,
    /// Quarter (1-4) for quarterly, month (1-12) for monthly, unused for annual
    #[serde(default)]
    pub period: Option<u32>,
    pub value: f64,
}

impl Checkpoint {
    pub fn annual(label: impl Into<String>, year: i32, value: f64) -> Self {
        Self {
            label: label.into(),
            frequency: Frequency::Annual,
            year,
            period: None,
            value,
        }
    }

    pub fn quarterly(label: impl Into<String>, year: i32, qtr: u32, value: f64) -> Self {
        Self {
            label: label.into(),
            frequency: Frequency::Quarterly,
            year,
            period: Some(qtr),
            value,
        }
    }

    pub fn monthly(label: impl Into<String>, year: i32, month: u32, value: f64) -> Self {
        Self {
            label: label.into(),
            frequency: Frequency::Monthly,
            year,
            period: Some(month),
            value,
        }
    }

    /// Index date of the frame cell this checkpoint refers to
    pub fn date(&self) -> Option<NaiveDate> {
        let period = self.period.unwrap_or(1);
        month_end(self.year, self.frequency.period_end_month(period))
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.period {
            Some(p) => write!(
                f,
                "{} {} {}/{} = {}",
                self.label, self.frequency, self.year, p, self.value
            ),
            None => write!(f, "{} {} {} = {}", self.label, self.frequency, self.year, self.value),
        }
    }
}

/// Mandatory checkpoints plus "at least one of" groups
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckpointSet {
    #[serde(default)]
    pub mandatory: Vec<Checkpoint>,
    #[serde(default)]
    pub optional: Vec<Vec<Checkpoint>>,
}

/// One dated release of the bulletin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Vintage {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for Vintage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Statistics for a batch of release files
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub files_processed: usize,
    pub files_failed: usize,
    pub observations: usize,
    pub output_path: PathBuf,
    pub processing_time_ms: u128,
}
