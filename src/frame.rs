//! Frame assembly from observations.
//!
//! Observations are partitioned by frequency and pivoted into one
//! date-indexed frame per frequency with a column per label. Year-to-date
//! fiscal series are turned into per-period values before the frames are
//! handed out.

use crate::config::{AccumulationRule, DuplicatePolicy, ParsingConfig};
use crate::constants::DATE_COLUMN;
use crate::error::{KepError, Result};
use crate::models::{Frequency, Observation, month_end};
use chrono::{Datelike, NaiveDate};
use polars::prelude::{Column, DataFrame};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Date-indexed values of one frequency, one series per label
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    frequency: Frequency,
    series: BTreeMap<String, BTreeMap<NaiveDate, f64>>,
}

impl Frame {
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            series: BTreeMap::new(),
        }
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Column labels in sorted order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Sorted union of the dates of all series
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.series
            .values()
            .flat_map(|values| values.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn get(&self, label: &str, date: NaiveDate) -> Option<f64> {
        self.series.get(label)?.get(&date).copied()
    }

    pub fn series(&self, label: &str) -> Option<&BTreeMap<NaiveDate, f64>> {
        self.series.get(label)
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.series.contains_key(label)
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Number of index rows
    pub fn height(&self) -> usize {
        self.dates().len()
    }

    /// Non-missing cells across all columns
    pub fn value_count(&self) -> usize {
        self.series.values().map(BTreeMap::len).sum()
    }

    /// Export as a polars DataFrame with date, year, qtr/month and label columns
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let dates = self.dates();
        let years: Vec<i32> = dates.iter().map(|d| d.year()).collect();

        let mut columns = vec![
            Column::new(DATE_COLUMN.into(), dates.clone()),
            Column::new("year".into(), years),
        ];
        match self.frequency {
            Frequency::Annual => {}
            Frequency::Quarterly => {
                let qtrs: Vec<i32> = dates.iter().map(|d| d.month().div_ceil(3) as i32).collect();
                columns.push(Column::new("qtr".into(), qtrs));
            }
            Frequency::Monthly => {
                let months: Vec<i32> = dates.iter().map(|d| d.month() as i32).collect();
                columns.push(Column::new("month".into(), months));
            }
        }

        for (label, values) in &self.series {
            let cells: Vec<Option<f64>> = dates.iter().map(|d| values.get(d).copied()).collect();
            columns.push(Column::new(label.as_str().into(), cells));
        }

        Ok(DataFrame::new(columns)?)
    }
}

/// Annual, quarterly and monthly frames of one release
#[derive(Debug, Clone, PartialEq)]
pub struct Frames {
    pub annual: Frame,
    pub quarterly: Frame,
    pub monthly: Frame,
}

impl Frames {
    pub fn get(&self, frequency: Frequency) -> &Frame {
        match frequency {
            Frequency::Annual => &self.annual,
            Frequency::Quarterly => &self.quarterly,
            Frequency::Monthly => &self.monthly,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        [&self.annual, &self.quarterly, &self.monthly].into_iter()
    }

    pub fn value_count(&self) -> usize {
        self.iter().map(Frame::value_count).sum()
    }
}

/// Builds frames from observations under a duplicate policy
#[derive(Debug, Clone)]
pub struct FrameAssembler {
    policy: DuplicatePolicy,
    accumulation: AccumulationRule,
}

impl FrameAssembler {
    pub fn new(policy: DuplicatePolicy, accumulation: AccumulationRule) -> Self {
        Self {
            policy,
            accumulation,
        }
    }

    pub fn from_config(config: &ParsingConfig) -> Self {
        Self::new(config.duplicate_policy, config.accumulation.clone())
    }

    pub fn assemble(&self, observations: &[Observation]) -> Result<Frames> {
        let mut frames = Frames {
            annual: Frame::new(Frequency::Annual),
            quarterly: Frame::new(Frequency::Quarterly),
            monthly: Frame::new(Frequency::Monthly),
        };
        let mut duplicates = 0usize;

        for obs in observations {
            let date = obs.date().ok_or_else(|| KepError::Configuration {
                message: format!(
                    "invalid period {}/{} for {}",
                    obs.year, obs.month, obs.label
                ),
            })?;
            let frame = match obs.frequency {
                Frequency::Annual => &mut frames.annual,
                Frequency::Quarterly => &mut frames.quarterly,
                Frequency::Monthly => &mut frames.monthly,
            };
            if self.insert(frame, obs, date)? {
                duplicates += 1;
            }
        }

        if duplicates > 0 {
            warn!("{} duplicate observations ignored", duplicates);
        }

        for frame in [&mut frames.annual, &mut frames.quarterly, &mut frames.monthly] {
            self.deaccumulate(frame);
        }

        debug!(
            "Assembled frames: {} annual, {} quarterly, {} monthly values",
            frames.annual.value_count(),
            frames.quarterly.value_count(),
            frames.monthly.value_count()
        );
        Ok(frames)
    }

    /// Insert one observation, returning true if it duplicated an existing cell
    fn insert(&self, frame: &mut Frame, obs: &Observation, date: NaiveDate) -> Result<bool> {
        let values = frame.series.entry(obs.label.clone()).or_default();
        match values.get(&date).copied() {
            None => {
                values.insert(date, obs.value);
                Ok(false)
            }
            Some(existing) if existing == obs.value => {
                debug!(
                    "Duplicate observation {} at {} = {}",
                    obs.label, date, obs.value
                );
                Ok(true)
            }
            Some(existing) => match self.policy {
                DuplicatePolicy::Strict => Err(KepError::ConflictingObservation {
                    label: obs.label.clone(),
                    date,
                    first: existing,
                    second: obs.value,
                }),
                DuplicatePolicy::FirstWins => {
                    warn!(
                        "Conflicting observation {} at {}: keeping {}, ignoring {}",
                        obs.label, date, existing, obs.value
                    );
                    Ok(true)
                }
            },
        }
    }

    /// Replace accumulated series by per-period values and drop the marker
    fn deaccumulate(&self, frame: &mut Frame) {
        let accumulated: Vec<String> = frame
            .series
            .keys()
            .filter(|label| self.accumulation.is_accumulated(label))
            .cloned()
            .collect();

        for label in accumulated {
            let Some(values) = frame.series.remove(&label) else {
                continue;
            };
            let values = match frame.frequency {
                Frequency::Annual => values,
                frequency => reverse_accumulation(&values, frequency),
            };
            let renamed = self.accumulation.strip_marker(&label);
            debug!("Deaccumulated {} into {}", label, renamed);
            if frame.series.insert(renamed.clone(), values).is_some() {
                warn!("Deaccumulated series {} replaced an existing column", renamed);
            }
        }
    }
}

/// Turn year-to-date values into per-period values.
///
/// The first period of each year is kept as is; every later period becomes
/// the difference to the preceding period of the same year. A period whose
/// predecessor is missing cannot be recovered and is dropped.
pub fn reverse_accumulation(
    values: &BTreeMap<NaiveDate, f64>,
    frequency: Frequency,
) -> BTreeMap<NaiveDate, f64> {
    let step = frequency.period_end_month(1);
    let first_month = frequency.first_period_month();
    let mut result = BTreeMap::new();

    for (date, value) in values {
        if date.month() == first_month {
            result.insert(*date, *value);
            continue;
        }
        let previous = month_end(date.year(), date.month() - step)
            .and_then(|prev| values.get(&prev));
        match previous {
            Some(previous) => {
                result.insert(*date, value - previous);
            }
            None => debug!("No preceding period for accumulated value at {}", date),
        }
    }
    result
}
