//! Row grouping by one or more columns

use crate::data::datatable::{GridRow, RowId};
use std::collections::HashSet;

/// Key shown for rows whose grouped value is null or missing
pub const EMPTY_GROUP_LABEL: &str = "(vide)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowGroup {
    pub field: String,
    pub key: String,
    /// `field=key` segments of this group and its ancestors, joined by `/`
    pub path: String,
    pub count: usize,
    pub expanded: bool,
    /// Every row under this group, in displayed order
    pub row_ids: Vec<RowId>,
    pub subgroups: Vec<RowGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingState {
    fields: Vec<String>,
    collapsed: HashSet<String>,
}

impl GroupingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn is_grouped(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Append a grouping level, returns false if the field is already grouped
    pub fn add(&mut self, field: &str) -> bool {
        if self.fields.iter().any(|f| f == field) {
            return false;
        }
        self.fields.push(field.to_string());
        true
    }

    pub fn remove(&mut self, field: &str) -> bool {
        let before = self.fields.len();
        self.fields.retain(|f| f != field);
        before != self.fields.len()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
        self.collapsed.clear();
    }

    pub fn toggle_expanded(&mut self, path: &str) {
        if !self.collapsed.remove(path) {
            self.collapsed.insert(path.to_string());
        }
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        !self.collapsed.contains(path)
    }

    pub fn group<R: GridRow>(&self, rows: &[&R]) -> Vec<RowGroup> {
        group_rows(rows, &self.fields, &self.collapsed, "")
    }
}

fn group_key<R: GridRow>(row: &R, field: &str) -> String {
    match row.field(field) {
        Some(value) if !value.is_null() => value.to_string(),
        _ => EMPTY_GROUP_LABEL.to_string(),
    }
}

/// Nest `rows` by `fields` in order. Groups appear in order of first occurrence.
pub fn group_rows<R: GridRow>(
    rows: &[&R],
    fields: &[String],
    collapsed: &HashSet<String>,
    parent_path: &str,
) -> Vec<RowGroup> {
    let Some((field, rest)) = fields.split_first() else {
        return Vec::new();
    };

    let mut buckets: Vec<(String, Vec<&R>)> = Vec::new();
    for row in rows {
        let key = group_key(*row, field);
        match buckets.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(*row),
            None => buckets.push((key, vec![*row])),
        }
    }

    buckets
        .into_iter()
        .map(|(key, members)| {
            let segment = format!("{}={}", field, key);
            let path = if parent_path.is_empty() {
                segment
            } else {
                format!("{}/{}", parent_path, segment)
            };
            RowGroup {
                field: field.clone(),
                count: members.len(),
                expanded: !collapsed.contains(&path),
                row_ids: members.iter().map(|r| r.row_id()).collect(),
                subgroups: group_rows(&members, rest, collapsed, &path),
                key,
                path,
            }
        })
        .collect()
}
