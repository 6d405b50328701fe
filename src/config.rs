//! Configuration management and validation.
//!
//! Provides the parsing instructions handed to the core: the unit
//! vocabulary, the ordered parsing units with their header mappings and
//! boundaries, the accumulated-series naming rule and the duplicate policy.
//! The configuration is built once by the caller and passed by reference.

use crate::constants::{
    ACCUMULATED_MARKER, ACCUMULATED_PREFIX, DEFAULT_IGNORE_PREFIXES, MAX_YEAR, MIN_YEAR,
};
use crate::error::{KepError, Result};
use crate::models::Label;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Unit text found in table headers and the code it maps to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPattern {
    pub pattern: String,
    pub code: String,
}

/// Header phrase and the canonical variable name it maps to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderPattern {
    pub text: String,
    pub varname: String,
}

/// Start/end marker pair delimiting a range of rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boundary {
    pub start: String,
    pub end: String,
}

/// Alternate data row layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowReader {
    /// Year-to-date fiscal tables: annual total plus January..November
    Fiscal,
}

/// Named set of parsing instructions for one range of rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsingUnit {
    pub name: String,

    /// Header phrases recognised in this unit
    #[serde(default)]
    pub headers: Vec<HeaderPattern>,

    /// Labels this unit must produce
    #[serde(default)]
    pub required: Vec<Label>,

    /// Candidate boundary pairs, tried in order; empty for the default unit
    #[serde(default)]
    pub boundaries: Vec<Boundary>,

    /// Alternate row layout, `None` for the shape lookup by cell count
    #[serde(default)]
    pub reader: Option<RowReader>,
}

impl ParsingUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            headers: Vec::new(),
            required: Vec::new(),
            boundaries: Vec::new(),
            reader: None,
        }
    }

    /// Register a header phrase for a variable name
    pub fn with_header(mut self, text: impl Into<String>, varname: impl Into<String>) -> Self {
        self.headers.push(HeaderPattern {
            text: text.into(),
            varname: varname.into(),
        });
        self
    }

    /// Require a (variable, unit) label
    pub fn require(mut self, varname: impl Into<String>, unit: impl Into<String>) -> Self {
        self.required.push(Label::new(varname, unit));
        self
    }

    /// Add a candidate boundary pair
    pub fn with_boundary(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.boundaries.push(Boundary {
            start: start.into(),
            end: end.into(),
        });
        self
    }

    pub fn with_reader(mut self, reader: RowReader) -> Self {
        self.reader = Some(reader);
        self
    }

    /// The default unit has no boundaries
    pub fn is_default(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// Single required unit code for a variable, if exactly one exists
    pub fn sole_required_unit(&self, varname: &str) -> Option<&str> {
        let mut units = self
            .required
            .iter()
            .filter(|label| label.varname == varname)
            .map(|label| label.unit.as_str());
        match (units.next(), units.next()) {
            (Some(unit), None) => Some(unit),
            _ => None,
        }
    }

    pub fn is_required(&self, label: &Label) -> bool {
        self.required.contains(label)
    }
}

/// Naming rule for year-to-date accumulated series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccumulationRule {
    pub prefix: String,
    pub marker: String,
}

impl Default for AccumulationRule {
    fn default() -> Self {
        Self {
            prefix: ACCUMULATED_PREFIX.to_string(),
            marker: ACCUMULATED_MARKER.to_string(),
        }
    }
}

impl AccumulationRule {
    pub fn is_accumulated(&self, label: &str) -> bool {
        label.starts_with(&self.prefix) && label.contains(&self.marker)
    }

    /// Label with the accumulation marker removed
    pub fn strip_marker(&self, label: &str) -> String {
        label.replacen(&self.marker, "", 1)
    }
}

/// Handling of two observations for the same label and date with different values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Conflicting values are a hard error
    #[default]
    Strict,
    /// Keep the first value and log a warning
    FirstWins,
}

/// Complete parsing configuration for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsingConfig {
    /// Unit vocabulary searched with longest-match-wins
    pub units: Vec<UnitPattern>,

    /// Parsing units; scoped units are applied in declared order
    pub parsing_units: Vec<ParsingUnit>,

    #[serde(default)]
    pub accumulation: AccumulationRule,

    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,

    #[serde(default = "default_ignore_prefixes")]
    pub ignore_prefixes: Vec<String>,

    #[serde(default = "default_min_year")]
    pub min_year: i32,

    #[serde(default = "default_max_year")]
    pub max_year: i32,
}

fn default_ignore_prefixes() -> Vec<String> {
    DEFAULT_IGNORE_PREFIXES.iter().map(|s| s.to_string()).collect()
}

fn default_min_year() -> i32 {
    MIN_YEAR
}

fn default_max_year() -> i32 {
    MAX_YEAR
}

impl ParsingConfig {
    /// Build and validate a configuration
    pub fn new(units: Vec<UnitPattern>, parsing_units: Vec<ParsingUnit>) -> Result<Self> {
        let config = Self {
            units,
            parsing_units,
            accumulation: AccumulationRule::default(),
            duplicate_policy: DuplicatePolicy::default(),
            ignore_prefixes: default_ignore_prefixes(),
            min_year: MIN_YEAR,
            max_year: MAX_YEAR,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML configuration
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a YAML configuration file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        debug!("Loading parsing configuration from {}", path.display());
        Self::from_yaml_str(&text)
    }

    /// Check the structural invariants of the configuration
    pub fn validate(&self) -> Result<()> {
        let defaults: Vec<&str> = self
            .parsing_units
            .iter()
            .filter(|unit| unit.is_default())
            .map(|unit| unit.name.as_str())
            .collect();
        if defaults.len() != 1 {
            return Err(KepError::Configuration {
                message: format!(
                    "exactly one parsing unit without boundaries is required, found {}: [{}]",
                    defaults.len(),
                    defaults.join(", ")
                ),
            });
        }

        if self.min_year > self.max_year {
            return Err(KepError::Configuration {
                message: format!(
                    "invalid year range {}..={}",
                    self.min_year, self.max_year
                ),
            });
        }

        if let Some(unit) = self.units.iter().find(|u| u.pattern.is_empty()) {
            return Err(KepError::Configuration {
                message: format!("empty unit pattern for code '{}'", unit.code),
            });
        }

        Ok(())
    }

    /// The catch-all unit applied to rows no scoped unit claims
    pub fn default_unit(&self) -> Option<&ParsingUnit> {
        self.parsing_units.iter().find(|unit| unit.is_default())
    }

    /// Boundary-scoped units in application order
    pub fn scoped_units(&self) -> impl Iterator<Item = &ParsingUnit> {
        self.parsing_units.iter().filter(|unit| !unit.is_default())
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    pub fn with_accumulation(mut self, rule: AccumulationRule) -> Self {
        self.accumulation = rule;
        self
    }

    pub fn with_year_range(mut self, min_year: i32, max_year: i32) -> Self {
        self.min_year = min_year;
        self.max_year = max_year;
        self
    }

    pub fn with_ignore_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.ignore_prefixes = prefixes;
        self
    }
}
