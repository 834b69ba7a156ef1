//! Row selection keyed by row id

use crate::data::datatable::{GridRow, RowId};
use std::collections::HashSet;

/// State of the header "select all" checkbox for the current page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderCheckState {
    Unchecked,
    Indeterminate,
    Checked,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: HashSet<RowId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &RowId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &RowId> {
        self.ids.iter()
    }

    /// Flip membership, returns whether the id is now selected
    pub fn toggle(&mut self, id: RowId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.ids.is_empty();
        self.ids.clear();
        changed
    }

    pub fn header_state(&self, page_ids: &[RowId]) -> HeaderCheckState {
        let selected = page_ids.iter().filter(|id| self.ids.contains(*id)).count();
        if page_ids.is_empty() || selected == 0 {
            HeaderCheckState::Unchecked
        } else if selected == page_ids.len() {
            HeaderCheckState::Checked
        } else {
            HeaderCheckState::Indeterminate
        }
    }

    /// Header checkbox click: clear the page when it is fully selected,
    /// otherwise select every id on it. Ids on other pages are untouched.
    pub fn toggle_page(&mut self, page_ids: &[RowId]) -> bool {
        if page_ids.is_empty() {
            return false;
        }
        if self.header_state(page_ids) == HeaderCheckState::Checked {
            for id in page_ids {
                self.ids.remove(id);
            }
        } else {
            self.ids.extend(page_ids.iter().cloned());
        }
        true
    }

    /// Drop ids that are not in `rows`, returns whether anything was removed
    pub fn retain_present<R: GridRow>(&mut self, rows: &[R]) -> bool {
        let present: HashSet<RowId> = rows.iter().map(GridRow::row_id).collect();
        let before = self.ids.len();
        self.ids.retain(|id| present.contains(id));
        before != self.ids.len()
    }

    /// Selected rows looked up in `rows`, in the order of `rows`
    pub fn materialize<'a, R: GridRow>(&self, rows: &'a [R]) -> Vec<&'a R> {
        rows.iter()
            .filter(|row| self.ids.contains(&row.row_id()))
            .collect()
    }
}
