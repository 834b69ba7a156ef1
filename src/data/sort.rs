//! Single-column, tri-state sorting

use crate::data::datatable::{DataValue, GridRow};
use crate::data::datavalue_compare::{compare_datavalues, Collation};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
    #[default]
    #[serde(rename = "none")]
    Unsorted,
}

impl SortDirection {
    /// none -> asc -> desc -> none
    pub fn next(self) -> Self {
        match self {
            SortDirection::Unsorted => SortDirection::Ascending,
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Unsorted,
        }
    }
}

/// Which field is sorted, and how. Only one field at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        if direction == SortDirection::Unsorted {
            return Self::default();
        }
        Self {
            key: Some(field.into()),
            direction,
        }
    }

    pub fn ascending(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Ascending)
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Descending)
    }

    /// Advance the cycle for `field`. A different field starts again at ascending.
    pub fn toggle(&mut self, field: &str) {
        let next = if self.key.as_deref() == Some(field) {
            self.direction.next()
        } else {
            SortDirection::Ascending
        };
        *self = Self::new(field, next);
    }

    pub fn is_active(&self) -> bool {
        self.key.is_some() && self.direction != SortDirection::Unsorted
    }

    /// Direction applied to `field`, `Unsorted` for any other column
    pub fn direction_for(&self, field: &str) -> SortDirection {
        if self.key.as_deref() == Some(field) {
            self.direction
        } else {
            SortDirection::Unsorted
        }
    }
}

/// Order two cells for the given direction. Null and missing values always
/// come after every non-null value, whichever the direction.
pub fn compare_for_sort(
    a: Option<&DataValue>,
    b: Option<&DataValue>,
    direction: SortDirection,
    collation: &Collation,
) -> Ordering {
    let a_null = a.map_or(true, DataValue::is_null);
    let b_null = b.map_or(true, DataValue::is_null);
    match (a_null, b_null, a, b) {
        (true, true, _, _) => Ordering::Equal,
        (true, false, _, _) => Ordering::Greater,
        (false, true, _, _) => Ordering::Less,
        (false, false, Some(a), Some(b)) => {
            let ordering = compare_datavalues(a, b, collation);
            match direction {
                SortDirection::Descending => ordering.reverse(),
                _ => ordering,
            }
        }
        _ => Ordering::Equal,
    }
}

/// Stable sort of row indices in place. `Unsorted` leaves the order untouched.
pub fn sort_indices<R: GridRow>(
    rows: &[R],
    indices: &mut Vec<usize>,
    sort: &SortState,
    collation: &Collation,
) {
    let field = match (&sort.key, sort.direction) {
        (Some(field), SortDirection::Ascending | SortDirection::Descending) => field,
        _ => return,
    };

    let mut keyed: Vec<(usize, Option<DataValue>)> = indices
        .iter()
        .map(|&idx| (idx, rows[idx].field(field)))
        .collect();

    // slice::sort_by is stable, ties keep the filtered order
    keyed.sort_by(|(_, a), (_, b)| compare_for_sort(a.as_ref(), b.as_ref(), sort.direction, collation));

    trace!(target: "sort", "Sorted {} rows by '{}' {:?}", keyed.len(), field, sort.direction);
    *indices = keyed.into_iter().map(|(idx, _)| idx).collect();
}

/// Sort a slice of rows into a new vector
pub fn apply_sort<R: GridRow + Clone>(rows: &[R], sort: &SortState, collation: &Collation) -> Vec<R> {
    let mut indices: Vec<usize> = (0..rows.len()).collect();
    sort_indices(rows, &mut indices, sort, collation);
    indices.into_iter().map(|idx| rows[idx].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::datatable::Record;

    fn scores() -> Vec<Record> {
        vec![
            Record::new(1).with_field("score", 50),
            Record::new(2).with_field("score", DataValue::Null),
            Record::new(3).with_field("score", 30),
        ]
    }

    fn score_values(rows: &[Record]) -> Vec<Option<i64>> {
        rows.iter()
            .map(|r| match r.get("score") {
                Some(DataValue::Integer(v)) => Some(*v),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_nulls_sort_last_in_both_directions() {
        let collation = Collation::default();
        let asc = apply_sort(&scores(), &SortState::ascending("score"), &collation);
        assert_eq!(score_values(&asc), vec![Some(30), Some(50), None]);

        let desc = apply_sort(&scores(), &SortState::descending("score"), &collation);
        assert_eq!(score_values(&desc), vec![Some(50), Some(30), None]);
    }

    #[test]
    fn test_toggle_cycles_three_states() {
        let mut sort = SortState::default();
        sort.toggle("name");
        assert_eq!(sort, SortState::ascending("name"));
        sort.toggle("name");
        assert_eq!(sort, SortState::descending("name"));
        sort.toggle("name");
        assert_eq!(sort, SortState::default());
        assert!(!sort.is_active());
    }

    #[test]
    fn test_toggle_other_column_restarts_ascending() {
        let mut sort = SortState::descending("name");
        sort.toggle("city");
        assert_eq!(sort, SortState::ascending("city"));
        assert_eq!(sort.direction_for("name"), SortDirection::Unsorted);
    }

    #[test]
    fn test_sort_is_stable() {
        let rows = vec![
            Record::new(1).with_field("grade", 2),
            Record::new(2).with_field("grade", 1),
            Record::new(3).with_field("grade", 2),
            Record::new(4).with_field("grade", 1),
        ];
        let collation = Collation::default();
        let asc = apply_sort(&rows, &SortState::ascending("grade"), &collation);
        let ids: Vec<String> = asc.iter().map(|r| r.id().to_string()).collect();
        assert_eq!(ids, vec!["2", "4", "1", "3"]);

        let desc = apply_sort(&rows, &SortState::descending("grade"), &collation);
        let ids: Vec<String> = desc.iter().map(|r| r.id().to_string()).collect();
        assert_eq!(ids, vec!["1", "3", "2", "4"]);
    }

    #[test]
    fn test_unsorted_keeps_input_order() {
        let rows = scores();
        let mut indices = vec![2, 0, 1];
        sort_indices(&rows, &mut indices, &SortState::default(), &Collation::default());
        assert_eq!(indices, vec![2, 0, 1]);
    }

    #[test]
    fn test_string_sort_ignores_case() {
        let rows = vec![
            Record::new(1).with_field("name", "bernard"),
            Record::new(2).with_field("name", "Alice"),
            Record::new(3).with_field("name", "Céline"),
        ];
        let sorted = apply_sort(&rows, &SortState::ascending("name"), &Collation::default());
        let ids: Vec<String> = sorted.iter().map(|r| r.id().to_string()).collect();
        assert_eq!(ids, vec!["2", "1", "3"]);
    }
}
