//! Column-scoped filtering
//!
//! Every active entry must hold for a row to be kept. Comparisons run on the
//! lower-cased display text of the cell against the lower-cased filter value.

use crate::data::datatable::{DataValue, GridRow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Comparison applied by a filter entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    #[default]
    Contains,
    Equals,
    StartsWith,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Contains => "contains",
            FilterOperator::Equals => "equals",
            FilterOperator::StartsWith => "startsWith",
        }
    }

    /// Both arguments are expected to be lower-cased already
    fn matches(&self, cell: &str, needle: &str) -> bool {
        match self {
            FilterOperator::Contains => cell.contains(needle),
            FilterOperator::Equals => cell == needle,
            FilterOperator::StartsWith => cell.starts_with(needle),
        }
    }
}

impl FromStr for FilterOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "contains" => Ok(FilterOperator::Contains),
            "equals" => Ok(FilterOperator::Equals),
            "startswith" | "starts_with" => Ok(FilterOperator::StartsWith),
            other => Err(format!("Unknown filter operator '{}'", other)),
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A per-field constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterEntry {
    pub value: String,
    pub operator: FilterOperator,
}

impl FilterEntry {
    pub fn new(value: impl Into<String>, operator: FilterOperator) -> Self {
        Self {
            value: value.into(),
            operator,
        }
    }

    pub fn contains(value: impl Into<String>) -> Self {
        Self::new(value, FilterOperator::Contains)
    }

    pub fn equals(value: impl Into<String>) -> Self {
        Self::new(value, FilterOperator::Equals)
    }

    pub fn starts_with(value: impl Into<String>) -> Self {
        Self::new(value, FilterOperator::StartsWith)
    }

    /// Whether a cell satisfies this entry. Null or missing cells never do.
    pub fn accepts(&self, cell: Option<&DataValue>) -> bool {
        match cell {
            None | Some(DataValue::Null) => false,
            Some(value) => self
                .operator
                .matches(&value.to_string().to_lowercase(), &self.value.to_lowercase()),
        }
    }
}

/// Active filters keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    entries: BTreeMap<String, FilterEntry>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for a field. An empty value removes it.
    pub fn set(&mut self, field: impl Into<String>, entry: FilterEntry) {
        let field = field.into();
        if entry.value.is_empty() {
            self.entries.remove(&field);
        } else {
            self.entries.insert(field, entry);
        }
    }

    pub fn with(mut self, field: impl Into<String>, entry: FilterEntry) -> Self {
        self.set(field, entry);
        self
    }

    pub fn remove(&mut self, field: &str) -> Option<FilterEntry> {
        self.entries.remove(field)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, field: &str) -> Option<&FilterEntry> {
        self.entries.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn matches<R: GridRow>(&self, row: &R) -> bool {
        self.entries
            .iter()
            .all(|(field, entry)| entry.accepts(row.field(field).as_ref()))
    }
}

/// Indices of the rows that pass every filter, in source order
pub fn filter_indices<R: GridRow>(rows: &[R], filters: &FilterSet) -> Vec<usize> {
    if filters.is_empty() {
        return (0..rows.len()).collect();
    }
    rows.iter()
        .enumerate()
        .filter(|(_, row)| filters.matches(*row))
        .map(|(idx, _)| idx)
        .collect()
}

/// Filter a slice of rows, keeping source order
pub fn apply_filters<R: GridRow + Clone>(rows: &[R], filters: &FilterSet) -> Vec<R> {
    filter_indices(rows, filters)
        .into_iter()
        .map(|idx| rows[idx].clone())
        .collect()
}
