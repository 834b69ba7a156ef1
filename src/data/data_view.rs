use std::borrow::Cow;
use std::ops::Range;

use crate::data::datatable::{GridRow, RowId};
use crate::data::datavalue_compare::Collation;
use crate::data::filter::{filter_indices, FilterEntry, FilterSet};
use crate::data::pagination::{PageItem, Pagination};
use crate::data::sort::{sort_indices, SortState};

/// A transition of the filter/sort/page state
#[derive(Debug, Clone, PartialEq)]
pub enum GridAction {
    SetFilter { field: String, entry: FilterEntry },
    ClearFilter(String),
    ClearFilters,
    ToggleSort(String),
    SetSort(SortState),
    SetPage(usize),
    SetPageSize(usize),
    NextPage,
    PreviousPage,
    FirstPage,
    LastPage,
}

/// Everything the displayed rows depend on, besides the rows themselves
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridState {
    pub filters: FilterSet,
    pub sort: SortState,
    pub pagination: Pagination,
}

impl GridState {
    pub fn new(page_size: usize) -> Self {
        Self {
            pagination: Pagination::new(page_size),
            ..Default::default()
        }
    }

    /// Set or replace a filter entry. Any filter change goes back to page 1.
    pub fn apply_filter(mut self, field: impl Into<String>, entry: FilterEntry) -> Self {
        self.filters.set(field, entry);
        self.pagination.reset();
        self
    }

    pub fn clear_filter(mut self, field: &str) -> Self {
        if self.filters.remove(field).is_some() {
            self.pagination.reset();
        }
        self
    }

    pub fn apply_sort(mut self, field: &str) -> Self {
        self.sort.toggle(field);
        self
    }

    pub fn set_page(mut self, page: usize, filtered_count: usize) -> Self {
        self.pagination.set_page(page, filtered_count);
        self
    }

    pub fn set_page_size(mut self, page_size: usize, filtered_count: usize) -> Self {
        self.pagination.set_page_size(page_size, filtered_count);
        self
    }

    /// Pure reducer: the state after `action`, given the source rows
    pub fn reduce<R: GridRow>(self, action: &GridAction, rows: &[R]) -> Self {
        let filtered_count = |state: &GridState| filter_indices(rows, &state.filters).len();

        match action {
            GridAction::SetFilter { field, entry } => self.apply_filter(field.clone(), entry.clone()),
            GridAction::ClearFilter(field) => self.clear_filter(field),
            GridAction::ClearFilters => {
                let mut state = self;
                if !state.filters.is_empty() {
                    state.filters.clear();
                    state.pagination.reset();
                }
                state
            }
            GridAction::ToggleSort(field) => self.apply_sort(field),
            GridAction::SetSort(sort) => {
                let mut state = self;
                state.sort = sort.clone();
                state
            }
            GridAction::SetPage(page) => {
                let count = filtered_count(&self);
                self.set_page(*page, count)
            }
            GridAction::SetPageSize(size) => {
                let count = filtered_count(&self);
                self.set_page_size(*size, count)
            }
            GridAction::NextPage => {
                let count = filtered_count(&self);
                let mut state = self;
                state.pagination.next(count);
                state
            }
            GridAction::PreviousPage => {
                let count = filtered_count(&self);
                let mut state = self;
                state.pagination.previous(count);
                state
            }
            GridAction::FirstPage => {
                let mut state = self;
                state.pagination.first();
                state
            }
            GridAction::LastPage => {
                let count = filtered_count(&self);
                let mut state = self;
                state.pagination.last(count);
                state
            }
        }
    }
}

/// Filter then sort, returning source indices in display order
pub fn process_indices<R: GridRow>(
    rows: &[R],
    filters: &FilterSet,
    sort: &SortState,
    collation: &Collation,
) -> Vec<usize> {
    let mut indices = filter_indices(rows, filters);
    sort_indices(rows, &mut indices, sort, collation);
    indices
}

/// A filtered, sorted and paginated view over borrowed rows
/// that never modifies the underlying data
#[derive(Debug, Clone)]
pub struct DataView<'a, R> {
    source: &'a [R],
    /// Row indices after filtering and sorting
    processed: Cow<'a, [usize]>,
    pagination: Pagination,
}

impl<'a, R: GridRow> DataView<'a, R> {
    /// Compute the view from scratch
    pub fn new(source: &'a [R], state: &GridState, collation: &Collation) -> Self {
        let processed = process_indices(source, &state.filters, &state.sort, collation);
        Self::from_parts(source, Cow::Owned(processed), state.pagination)
    }

    /// Reuse an already processed index list. The page is clamped against it.
    pub fn from_parts(source: &'a [R], processed: Cow<'a, [usize]>, pagination: Pagination) -> Self {
        let mut pagination = pagination;
        pagination.clamp(processed.len());
        Self {
            source,
            processed,
            pagination,
        }
    }

    /// Number of rows after filtering
    pub fn row_count(&self) -> usize {
        self.processed.len()
    }

    pub fn total_pages(&self) -> usize {
        self.pagination.total_pages(self.processed.len())
    }

    pub fn current_page(&self) -> usize {
        self.pagination.current_page()
    }

    pub fn page_range(&self) -> Range<usize> {
        self.pagination.page_range(self.processed.len())
    }

    pub fn page_window(&self) -> Vec<PageItem> {
        self.pagination.page_window(self.processed.len())
    }

    /// Filtered and sorted rows, all pages
    pub fn processed_rows(&self) -> Vec<&'a R> {
        let source = self.source;
        self.processed.iter().map(|&idx| &source[idx]).collect()
    }

    /// Rows of the current page
    pub fn displayed_rows(&self) -> Vec<&'a R> {
        let source = self.source;
        self.processed[self.page_range()]
            .iter()
            .map(|&idx| &source[idx])
            .collect()
    }

    pub fn page_ids(&self) -> Vec<RowId> {
        self.displayed_rows().iter().map(|row| row.row_id()).collect()
    }

    pub fn source(&self) -> &'a [R] {
        self.source
    }

    pub fn processed_indices(&self) -> &[usize] {
        &self.processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::datatable::{DataValue, Record};

    fn rows(n: i64) -> Vec<Record> {
        (1..=n)
            .map(|i| {
                Record::new(i)
                    .with_field("name", format!("consultant {}", i))
                    .with_field("team", if i % 2 == 0 { "Data" } else { "Web" })
            })
            .collect()
    }

    #[test]
    fn test_view_paginates_processed_rows() {
        let data = rows(15);
        let state = GridState::new(10).set_page(2, 15);
        let view = DataView::new(&data, &state, &Collation::default());
        assert_eq!(view.row_count(), 15);
        assert_eq!(view.total_pages(), 2);
        assert_eq!(view.displayed_rows().len(), 5);
        assert_eq!(view.page_ids().first(), Some(&RowId::Number(11)));
    }

    #[test]
    fn test_filter_resets_page() {
        let data = rows(30);
        let state = GridState::new(10)
            .reduce(&GridAction::SetPage(3), &data)
            .reduce(
                &GridAction::SetFilter {
                    field: "team".into(),
                    entry: FilterEntry::equals("data"),
                },
                &data,
            );
        assert_eq!(state.pagination.current_page(), 1);
        let view = DataView::new(&data, &state, &Collation::default());
        assert_eq!(view.row_count(), 15);
    }

    #[test]
    fn test_view_clamps_page_when_filtered_set_shrinks() {
        let data = rows(30);
        let mut state = GridState::new(10).reduce(&GridAction::SetPage(3), &data);
        // bypass the reducer so the page is stale
        state.filters.set("team", FilterEntry::equals("web"));
        let view = DataView::new(&data, &state, &Collation::default());
        assert_eq!(view.total_pages(), 2);
        assert_eq!(view.current_page(), 2);
    }

    #[test]
    fn test_reducer_page_navigation() {
        let data = rows(25);
        let state = GridState::new(10)
            .reduce(&GridAction::LastPage, &data);
        assert_eq!(state.pagination.current_page(), 3);
        let state = state
            .reduce(&GridAction::NextPage, &data)
            .reduce(&GridAction::PreviousPage, &data);
        assert_eq!(state.pagination.current_page(), 2);
        let state = state.reduce(&GridAction::SetPageSize(25), &data);
        assert_eq!(state.pagination.current_page(), 1);
        let state = state.reduce(&GridAction::SetPage(99), &data);
        assert_eq!(state.pagination.current_page(), 1);
    }

    #[test]
    fn test_sort_none_restores_filtered_order() {
        let mut data = rows(6);
        data[0].set("team", DataValue::Null);
        let filtered = GridState::new(10).apply_filter("team", FilterEntry::contains("a"));
        let base = DataView::new(&data, &filtered, &Collation::default())
            .processed_indices()
            .to_vec();

        let cycled = filtered
            .apply_sort("name")
            .apply_sort("name")
            .apply_sort("name");
        let view = DataView::new(&data, &cycled, &Collation::default());
        assert_eq!(view.processed_indices(), base.as_slice());
    }

    #[test]
    fn test_view_is_deterministic() {
        let data = rows(12);
        let state = GridState::new(5)
            .apply_sort("team")
            .apply_filter("name", FilterEntry::contains("1"))
            .set_page(1, 12);
        let a = DataView::new(&data, &state, &Collation::default()).page_ids();
        let b = DataView::new(&data, &state, &Collation::default()).page_ids();
        assert_eq!(a, b);
    }
}
