//! Table building and labeling within a segment.
//!
//! A segment is a run of header blocks each followed by a block of year
//! rows. Every header block is resolved to a label; tables that cannot be
//! labeled, or whose label the parsing unit does not track, are dropped
//! with a diagnostic.

use crate::config::ParsingConfig;
use crate::error::{KepError, Result};
use crate::labels::{LabelResolver, header_text};
use crate::models::{Label, RawRow};
use crate::rows::RowClassifier;
use crate::segment::Segment;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Header rows followed by the data rows they describe
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<RawRow>,
    pub datarows: Vec<RawRow>,
    pub varname: Option<String>,
    pub unit: Option<String>,
    pub row_format: Option<String>,
}

impl Table {
    /// Header rows merged into a single line of text
    pub fn header_text(&self) -> String {
        header_text(&self.headers)
    }

    pub fn label(&self) -> Option<Label> {
        match (&self.varname, &self.unit) {
            (Some(varname), Some(unit)) => Some(Label::new(varname.clone(), unit.clone())),
            _ => None,
        }
    }
}

/// Split segment rows into consecutive header/data tables
pub fn split_tables(rows: Vec<RawRow>, classifier: &RowClassifier) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut current = Table::default();

    for row in rows {
        if classifier.is_year_row(&row) {
            current.datarows.push(row);
        } else if current.datarows.is_empty() {
            current.headers.push(row);
        } else {
            tables.push(std::mem::take(&mut current));
            current.headers.push(row);
        }
    }

    if !current.headers.is_empty() || !current.datarows.is_empty() {
        tables.push(current);
    }
    tables
}

/// Assign variable names and units to tables in segment order.
///
/// A table with a unit but no variable name inherits the variable name of
/// the table right before it; a table resolving neither breaks the chain. A table with a variable name but no unit takes the
/// unit's single required unit for that variable, if there is exactly one.
pub fn label_tables(tables: &mut [Table], segment: &Segment<'_>, config: &ParsingConfig) {
    let unit = segment.unit;
    let resolver = LabelResolver::new(&unit.headers, &config.units);
    let mut last_varname: Option<String> = None;

    for table in tables.iter_mut() {
        let (varname, unit_code) = resolver.resolve_label(&table.headers);
        let varname = varname.map(str::to_string);
        let unit_code = unit_code.map(str::to_string);

        table.varname = match varname {
            Some(name) => {
                last_varname = Some(name.clone());
                Some(name)
            }
            None if unit_code.is_some() => last_varname.clone(),
            None => {
                last_varname = None;
                None
            }
        };

        table.unit = unit_code.or_else(|| {
            table
                .varname
                .as_deref()
                .and_then(|name| unit.sole_required_unit(name))
                .map(str::to_string)
        });
    }
}

/// Build the labeled, tracked tables of one segment
pub fn build_tables(segment: &Segment<'_>, config: &ParsingConfig) -> Result<Vec<Table>> {
    let classifier = RowClassifier::from_config(config);
    let unit = segment.unit;

    let mut tables = split_tables(segment.rows.clone(), &classifier);
    label_tables(&mut tables, segment, config);

    let mut found = BTreeSet::new();
    let mut kept = Vec::with_capacity(tables.len());
    for table in tables {
        let Some(label) = table.label() else {
            if !table.datarows.is_empty() {
                warn!(
                    "Parsing unit '{}': discarding unlabeled table ({} data rows): {}",
                    unit.name,
                    table.datarows.len(),
                    truncate(&table.header_text(), 80)
                );
            }
            continue;
        };

        if !unit.required.is_empty() && !unit.is_required(&label) {
            debug!(
                "Parsing unit '{}': skipping untracked label {}",
                unit.name, label
            );
            continue;
        }

        found.insert(label);
        kept.push(table);
    }

    let missing: Vec<String> = unit
        .required
        .iter()
        .filter(|label| !found.contains(*label))
        .map(Label::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(KepError::RequiredLabelMissing {
            unit: unit.name.clone(),
            labels: missing,
        });
    }

    debug!(
        "Parsing unit '{}': {} labeled tables from {} rows",
        unit.name,
        kept.len(),
        segment.rows.len()
    );
    Ok(kept)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ParsingUnit, UnitPattern};

    fn rows(lines: &[&[&str]]) -> Vec<RawRow> {
        lines.iter().map(|cells| RawRow::new(cells.iter().copied())).collect()
    }

    fn config(unit: ParsingUnit) -> ParsingConfig {
        let units = vec![
            UnitPattern {
                pattern: "млрд.рублей".into(),
                code: "bln_rub".into(),
            },
            UnitPattern {
                pattern: "в % к соответствующему периоду предыдущего года".into(),
                code: "yoy".into(),
            },
        ];
        ParsingConfig::new(units, vec![unit]).unwrap()
    }

    #[test]
    fn test_split_tables() {
        let input = rows(&[
            &["Объем ВВП", "млрд.рублей"],
            &["1999", "4823"],
            &["2000", "7306"],
            &["в % к соответствующему периоду предыдущего года"],
            &["1999", "106,4"],
            &["Примечание"],
        ]);
        let tables = split_tables(input, &RowClassifier::default());
        assert_eq!(tables.len(), 3);
        assert_eq!(tables[0].headers.len(), 1);
        assert_eq!(tables[0].datarows.len(), 2);
        assert_eq!(tables[1].datarows.len(), 1);
        assert!(tables[2].datarows.is_empty());
        assert_eq!(tables[0].header_text(), "Объем ВВП млрд.рублей");
    }

    #[test]
    fn test_split_tables_without_year_rows() {
        let tables = split_tables(rows(&[&["Текст"], &["Ещё текст"]]), &RowClassifier::default());
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].headers.len(), 2);
        assert!(tables[0].datarows.is_empty());

        assert!(split_tables(vec![], &RowClassifier::default()).is_empty());
    }

    #[test]
    fn test_varname_inherited_by_unit_only_table() {
        let unit = ParsingUnit::new("main")
            .with_header("Объем ВВП", "GDP")
            .require("GDP", "bln_rub")
            .require("GDP", "yoy");
        let config = config(unit);
        let segment = Segment {
            unit: config.default_unit().unwrap(),
            rows: rows(&[
                &["Объем ВВП, млрд.рублей"],
                &["1999", "4823"],
                &["в % к соответствующему периоду предыдущего года"],
                &["1999", "106,4"],
            ]),
        };

        let tables = build_tables(&segment, &config).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].label(), Some(Label::new("GDP", "bln_rub")));
        assert_eq!(tables[1].label(), Some(Label::new("GDP", "yoy")));
    }

    #[test]
    fn test_unresolved_table_breaks_varname_inheritance() {
        let unit = ParsingUnit::new("main")
            .with_header("Объем ВВП", "GDP")
            .require("GDP", "bln_rub");
        let config = config(unit);
        let segment = Segment {
            unit: config.default_unit().unwrap(),
            rows: rows(&[
                &["Объем ВВП, млрд.рублей"],
                &["1999", "4823"],
                &["Численность населения, тысяч человек"],
                &["1999", "146304"],
                &["в % к соответствующему периоду предыдущего года"],
                &["1999", "99,5"],
            ]),
        };

        let mut tables = split_tables(segment.rows.clone(), &RowClassifier::default());
        label_tables(&mut tables, &segment, &config);
        assert_eq!(tables.len(), 3);
        assert_eq!(tables[0].label(), Some(Label::new("GDP", "bln_rub")));
        assert_eq!(tables[1].varname, None);
        assert_eq!(tables[2].varname, None);
        assert_eq!(tables[2].unit.as_deref(), Some("yoy"));

        let kept = build_tables(&segment, &config).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].label(), Some(Label::new("GDP", "bln_rub")));
    }

    #[test]
    fn test_sole_required_unit_fills_missing_unit() {
        let unit = ParsingUnit::new("main")
            .with_header("Объем ВВП", "GDP")
            .require("GDP", "bln_rub");
        let config = config(unit);
        let segment = Segment {
            unit: config.default_unit().unwrap(),
            rows: rows(&[&["Объем ВВП..."], &["1999", "4823"]]),
        };

        let tables = build_tables(&segment, &config).unwrap();
        assert_eq!(tables[0].label(), Some(Label::new("GDP", "bln_rub")));
    }

    #[test]
    fn test_unlabeled_and_untracked_tables_are_dropped() {
        let unit = ParsingUnit::new("main")
            .with_header("Объем ВВП", "GDP")
            .with_header("Инвестиции", "INVESTMENT")
            .require("GDP", "bln_rub");
        let config = config(unit);
        let segment = Segment {
            unit: config.default_unit().unwrap(),
            rows: rows(&[
                &["Численность населения"],
                &["1999", "146"],
                &["Инвестиции, млрд.рублей"],
                &["1999", "670"],
                &["Объем ВВП, млрд.рублей"],
                &["1999", "4823"],
            ]),
        };

        let tables = build_tables(&segment, &config).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].varname.as_deref(), Some("GDP"));
    }

    #[test]
    fn test_missing_required_label_is_error() {
        let unit = ParsingUnit::new("main")
            .with_header("Объем ВВП", "GDP")
            .require("GDP", "bln_rub")
            .require("GDP", "yoy");
        let config = config(unit);
        let segment = Segment {
            unit: config.default_unit().unwrap(),
            rows: rows(&[&["Объем ВВП, млрд.рублей"], &["1999", "4823"]]),
        };

        match build_tables(&segment, &config) {
            Err(KepError::RequiredLabelMissing { unit, labels }) => {
                assert_eq!(unit, "main");
                assert_eq!(labels, vec!["GDP_yoy".to_string()]);
            }
            other => panic!("Expected RequiredLabelMissing, got {:?}", other),
        }
    }
}
