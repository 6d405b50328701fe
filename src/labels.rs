//! Header text to label resolution.
//!
//! Both the variable-name and the unit vocabularies are searched by
//! substring containment; when several patterns occur in a header the
//! longest pattern wins, ties going to the first declared.

use crate::config::{HeaderPattern, UnitPattern};
use crate::models::RawRow;

/// Header rows merged into a single line of text
pub fn header_text(rows: &[RawRow]) -> String {
    rows.iter()
        .map(RawRow::text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Value of the longest pattern contained in `text`
pub fn longest_match<'p, I>(text: &str, patterns: I) -> Option<&'p str>
where
    I: IntoIterator<Item = (&'p str, &'p str)>,
{
    let haystack = text.to_lowercase();
    let mut best: Option<(usize, &'p str)> = None;
    for (pattern, value) in patterns {
        if pattern.is_empty() || !haystack.contains(&pattern.to_lowercase()) {
            continue;
        }
        let length = pattern.chars().count();
        if best.is_none_or(|(best_length, _)| length > best_length) {
            best = Some((length, value));
        }
    }
    best.map(|(_, value)| value)
}

/// Resolves header text against one unit's header phrases and the unit vocabulary
#[derive(Debug, Clone, Copy)]
pub struct LabelResolver<'a> {
    headers: &'a [HeaderPattern],
    units: &'a [UnitPattern],
}

impl<'a> LabelResolver<'a> {
    pub fn new(headers: &'a [HeaderPattern], units: &'a [UnitPattern]) -> Self {
        Self { headers, units }
    }

    /// Canonical variable name registered for a phrase in `text`
    pub fn varname(&self, text: &str) -> Option<&'a str> {
        longest_match(
            text,
            self.headers
                .iter()
                .map(|h| (h.text.as_str(), h.varname.as_str())),
        )
    }

    /// Unit code of the longest unit pattern in `text`
    pub fn unit(&self, text: &str) -> Option<&'a str> {
        longest_match(
            text,
            self.units.iter().map(|u| (u.pattern.as_str(), u.code.as_str())),
        )
    }

    /// Variable name and unit code of a table's header rows
    pub fn resolve_label(&self, header_rows: &[RawRow]) -> (Option<&'a str>, Option<&'a str>) {
        let text = header_text(header_rows);
        (self.varname(&text), self.unit(&text))
    }
}
