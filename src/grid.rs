use std::borrow::Cow;
use std::collections::HashSet;

use anyhow::Result;
use tracing::{debug, info, trace};

use crate::columns::Column;
use crate::column_manager::{ColumnWidths, DEFAULT_COLUMN_WIDTH, DEFAULT_MIN_COLUMN_WIDTH};
use crate::data::data_exporter::{CsvExport, DataExporter};
use crate::data::data_view::{process_indices, DataView, GridAction, GridState};
use crate::data::datatable::{ensure_unique_ids, DataValue, GridRow, RowId};
use crate::data::datavalue_compare::{Collation, DEFAULT_LOCALE};
use crate::data::filter::{FilterEntry, FilterOperator};
use crate::data::grouping::{GroupingState, RowGroup};
use crate::data::pagination::{PageItem, DEFAULT_PAGE_SIZE};
use crate::data::selection::{HeaderCheckState, SelectionSet};
use crate::data::sort::SortState;

/// Feature toggles and presentation settings of a grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridOptions {
    pub enable_filtering: bool,
    pub enable_sorting: bool,
    pub enable_selection: bool,
    pub enable_export: bool,
    pub enable_grouping: bool,
    pub enable_drag_to_group: bool,
    pub page_size: usize,
    /// Viewport height as given by the host, e.g. `"600px"`. Informational for renderers.
    pub height: Option<String>,
    pub title: String,
    /// Locale used to collate text when sorting
    pub locale: String,
    pub default_column_width: f64,
    pub default_min_column_width: f64,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            enable_filtering: true,
            enable_sorting: true,
            enable_selection: true,
            enable_export: true,
            enable_grouping: false,
            enable_drag_to_group: false,
            page_size: DEFAULT_PAGE_SIZE,
            height: None,
            title: "Données".to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            default_column_width: DEFAULT_COLUMN_WIDTH,
            default_min_column_width: DEFAULT_MIN_COLUMN_WIDTH,
        }
    }
}

pub type RowClickFn<R> = Box<dyn FnMut(&R)>;
pub type SelectionChangeFn<R> = Box<dyn FnMut(&[&R])>;
pub type CellEditFn = Box<dyn FnMut(&RowId, &str, &DataValue)>;

/// Optional observers notified by the grid
pub struct GridCallbacks<R> {
    pub on_row_click: Option<RowClickFn<R>>,
    pub on_selection_change: Option<SelectionChangeFn<R>>,
    pub on_cell_edit: Option<CellEditFn>,
}

impl<R> Default for GridCallbacks<R> {
    fn default() -> Self {
        Self {
            on_row_click: None,
            on_selection_change: None,
            on_cell_edit: None,
        }
    }
}

/// The data grid: source rows, columns and every piece of interactive state.
///
/// All transitions are synchronous methods. The processed row order
/// (filtered then sorted) is recomputed by every transition that can
/// change it, and the current page is clamped against it.
pub struct DataGrid<R> {
    rows: Vec<R>,
    columns: Vec<Column<R>>,
    options: GridOptions,
    state: GridState,
    processed: Vec<usize>,
    collation: Collation,
    selection: SelectionSet,
    widths: ColumnWidths,
    grouping: GroupingState,
    hidden: HashSet<String>,
    callbacks: GridCallbacks<R>,
}

impl<R: GridRow> DataGrid<R> {
    pub fn new(columns: Vec<Column<R>>, options: GridOptions) -> Self {
        let collation = Collation::new(&options.locale);
        let widths = ColumnWidths::new(options.default_column_width, options.default_min_column_width);
        Self {
            rows: Vec::new(),
            columns,
            state: GridState::new(options.page_size),
            processed: Vec::new(),
            collation,
            selection: SelectionSet::new(),
            widths,
            grouping: GroupingState::new(),
            hidden: HashSet::new(),
            callbacks: GridCallbacks::default(),
            options,
        }
    }

    pub fn with_rows(mut self, rows: Vec<R>) -> Result<Self> {
        self.set_rows(rows)?;
        Ok(self)
    }

    pub fn on_row_click(mut self, callback: impl FnMut(&R) + 'static) -> Self {
        self.callbacks.on_row_click = Some(Box::new(callback));
        self
    }

    pub fn on_selection_change(mut self, callback: impl FnMut(&[&R]) + 'static) -> Self {
        self.callbacks.on_selection_change = Some(Box::new(callback));
        self
    }

    pub fn on_cell_edit(mut self, callback: impl FnMut(&RowId, &str, &DataValue) + 'static) -> Self {
        self.callbacks.on_cell_edit = Some(Box::new(callback));
        self
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn state(&self) -> &GridState {
        &self.state
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Replace the dataset. Filters and sort are re-applied and the page is
    /// clamped. Selected ids that disappeared are dropped. A dataset with
    /// duplicate ids is rejected and the current one is kept.
    pub fn set_rows(&mut self, rows: Vec<R>) -> Result<()> {
        ensure_unique_ids(&rows)?;
        self.rows = rows;
        self.refresh();
        info!(target: "grid", "Loaded {} rows ({} after filters)", self.rows.len(), self.processed.len());

        if self.selection.retain_present(&self.rows) {
            self.notify_selection();
        }
        Ok(())
    }

    fn refresh(&mut self) {
        self.processed = process_indices(&self.rows, &self.state.filters, &self.state.sort, &self.collation);
        self.state.pagination.clamp(self.processed.len());
    }

    pub fn column(&self, field: &str) -> Option<&Column<R>> {
        self.columns.iter().find(|c| c.field() == field)
    }

    pub fn columns(&self) -> &[Column<R>] {
        &self.columns
    }

    fn find_row(&self, id: &RowId) -> Option<&R> {
        self.rows.iter().find(|row| &row.row_id() == id)
    }

    // ---- filter / sort / pagination ----

    /// Whether an action may be applied given the feature toggles and columns
    fn accepts(&self, action: &GridAction) -> bool {
        match action {
            GridAction::SetFilter { field, .. } | GridAction::ClearFilter(field) => {
                self.options.enable_filtering
                    && self
                        .column(field)
                        .is_some_and(|c| !c.spec.disable_filtering)
            }
            GridAction::ClearFilters => self.options.enable_filtering,
            GridAction::ToggleSort(field) => self.is_sortable(field),
            GridAction::SetSort(sort) => match &sort.key {
                Some(field) => self.is_sortable(field),
                None => self.options.enable_sorting,
            },
            _ => true,
        }
    }

    fn is_sortable(&self, field: &str) -> bool {
        self.options.enable_sorting && self.column(field).is_some_and(|c| !c.spec.disable_sorting)
    }

    /// Apply a state transition. Returns false when the action was ignored.
    pub fn dispatch(&mut self, action: GridAction) -> bool {
        if !self.accepts(&action) {
            debug!(target: "grid", "Ignoring {:?}", action);
            return false;
        }
        trace!(target: "grid", "Dispatch {:?}", action);
        let state = std::mem::take(&mut self.state);
        self.state = state.reduce(&action, &self.rows);
        self.refresh();
        true
    }

    pub fn set_filter(&mut self, field: &str, entry: FilterEntry) -> bool {
        debug!(target: "filter", "Filter '{}' {} '{}'", field, entry.operator, entry.value);
        self.dispatch(GridAction::SetFilter {
            field: field.to_string(),
            entry,
        })
    }

    /// Like `set_filter` with an operator given by name. Unknown operators are ignored.
    pub fn set_filter_str(&mut self, field: &str, operator: &str, value: &str) -> bool {
        match operator.parse::<FilterOperator>() {
            Ok(op) => self.set_filter(field, FilterEntry::new(value, op)),
            Err(e) => {
                debug!(target: "filter", "Ignoring filter on '{}': {}", field, e);
                false
            }
        }
    }

    pub fn clear_filter(&mut self, field: &str) -> bool {
        self.dispatch(GridAction::ClearFilter(field.to_string()))
    }

    pub fn clear_filters(&mut self) -> bool {
        self.dispatch(GridAction::ClearFilters)
    }

    /// Header click: cycle the sort on `field`
    pub fn toggle_sort(&mut self, field: &str) -> bool {
        self.dispatch(GridAction::ToggleSort(field.to_string()))
    }

    pub fn set_sort(&mut self, sort: SortState) -> bool {
        self.dispatch(GridAction::SetSort(sort))
    }

    pub fn sort_state(&self) -> &SortState {
        &self.state.sort
    }

    pub fn set_page(&mut self, page: usize) -> bool {
        self.dispatch(GridAction::SetPage(page))
    }

    pub fn set_page_size(&mut self, page_size: usize) -> bool {
        self.dispatch(GridAction::SetPageSize(page_size))
    }

    pub fn next_page(&mut self) -> bool {
        self.dispatch(GridAction::NextPage)
    }

    pub fn previous_page(&mut self) -> bool {
        self.dispatch(GridAction::PreviousPage)
    }

    pub fn first_page(&mut self) -> bool {
        self.dispatch(GridAction::FirstPage)
    }

    pub fn last_page(&mut self) -> bool {
        self.dispatch(GridAction::LastPage)
    }

    pub fn view(&self) -> DataView<'_, R> {
        DataView::from_parts(&self.rows, Cow::Borrowed(&self.processed), self.state.pagination)
    }

    pub fn displayed_rows(&self) -> Vec<&R> {
        self.view().displayed_rows()
    }

    pub fn processed_rows(&self) -> Vec<&R> {
        self.view().processed_rows()
    }

    /// Number of rows that pass the filters
    pub fn filtered_count(&self) -> usize {
        self.processed.len()
    }

    pub fn current_page(&self) -> usize {
        self.state.pagination.current_page()
    }

    pub fn page_size(&self) -> usize {
        self.state.pagination.page_size()
    }

    pub fn total_pages(&self) -> usize {
        self.state.pagination.total_pages(self.processed.len())
    }

    pub fn page_window(&self) -> Vec<PageItem> {
        self.state.pagination.page_window(self.processed.len())
    }

    // ---- selection ----

    fn notify_selection(&mut self) {
        let selected = self.selection.materialize(&self.rows);
        debug!(target: "grid", "Selection changed: {} rows", selected.len());
        if let Some(callback) = self.callbacks.on_selection_change.as_mut() {
            callback(&selected);
        }
    }

    pub fn toggle_row_selection(&mut self, id: &RowId) -> bool {
        if !self.options.enable_selection || self.find_row(id).is_none() {
            return false;
        }
        self.selection.toggle(id.clone());
        self.notify_selection();
        true
    }

    /// Header checkbox: select or clear the rows of the current page
    pub fn toggle_select_all(&mut self) -> bool {
        if !self.options.enable_selection {
            return false;
        }
        let page_ids = self.view().page_ids();
        if !self.selection.toggle_page(&page_ids) {
            return false;
        }
        self.notify_selection();
        true
    }

    pub fn clear_selection(&mut self) -> bool {
        if !self.selection.clear() {
            return false;
        }
        self.notify_selection();
        true
    }

    pub fn header_check_state(&self) -> HeaderCheckState {
        self.selection.header_state(&self.view().page_ids())
    }

    pub fn is_selected(&self, id: &RowId) -> bool {
        self.selection.contains(id)
    }

    /// Selected rows in source order
    pub fn selected_rows(&self) -> Vec<&R> {
        self.selection.materialize(&self.rows)
    }

    // ---- row interaction ----

    pub fn click_row(&mut self, id: &RowId) -> bool {
        let Some(row) = self.rows.iter().find(|row| &row.row_id() == id) else {
            return false;
        };
        if let Some(callback) = self.callbacks.on_row_click.as_mut() {
            callback(row);
        }
        true
    }

    /// Report an edit to the owner. The grid's own rows are left untouched.
    pub fn edit_cell(&mut self, id: &RowId, field: &str, value: DataValue) -> bool {
        let editable = self.column(field).is_some_and(|c| c.spec.editable);
        if !editable || self.find_row(id).is_none() {
            debug!(target: "grid", "Ignoring edit of '{}' on row {}", field, id);
            return false;
        }
        if let Some(callback) = self.callbacks.on_cell_edit.as_mut() {
            callback(id, field, &value);
        }
        true
    }

    pub fn render_cell(&self, row: &R, field: &str) -> Option<String> {
        self.column(field).map(|c| c.render(row))
    }

    // ---- column visibility ----

    pub fn visible_columns(&self) -> Vec<&Column<R>> {
        self.columns
            .iter()
            .filter(|c| !self.hidden.contains(c.field()))
            .collect()
    }

    pub fn hide_column(&mut self, field: &str) -> bool {
        self.column(field).is_some() && self.hidden.insert(field.to_string())
    }

    pub fn show_column(&mut self, field: &str) -> bool {
        self.hidden.remove(field)
    }

    // ---- column resize ----

    pub fn begin_resize(&mut self, field: &str, pointer_x: f64) -> bool {
        let Some(column) = self.columns.iter().find(|c| c.field() == field) else {
            return false;
        };
        self.widths
            .begin(field, pointer_x, column.spec.width, column.spec.min_width);
        true
    }

    pub fn drag_resize(&mut self, pointer_x: f64) -> Option<f64> {
        self.widths.drag(pointer_x)
    }

    pub fn end_resize(&mut self) -> Option<String> {
        let field = self.widths.end();
        if let Some(field) = &field {
            debug!(target: "grid", "Column '{}' resized to {}", field, self.column_width(field));
        }
        field
    }

    pub fn column_width(&self, field: &str) -> f64 {
        let declared = self.column(field).and_then(|c| c.spec.width);
        self.widths.width_of(field, declared)
    }

    // ---- grouping ----

    pub fn group_by(&mut self, field: &str) -> bool {
        let groupable = self.options.enable_grouping
            && self.column(field).is_some_and(|c| !c.spec.disable_grouping);
        groupable && self.grouping.add(field)
    }

    /// Drag-and-drop of a column header onto the grouping panel
    pub fn drop_on_group_panel(&mut self, field: &str) -> bool {
        self.options.enable_drag_to_group && self.group_by(field)
    }

    pub fn ungroup(&mut self, field: &str) -> bool {
        self.grouping.remove(field)
    }

    pub fn grouping_fields(&self) -> &[String] {
        self.grouping.fields()
    }

    pub fn toggle_group_expanded(&mut self, path: &str) {
        self.grouping.toggle_expanded(path);
    }

    /// Current page grouped by the grouping fields. Empty when not grouped.
    pub fn grouped_rows(&self) -> Vec<RowGroup> {
        self.grouping.group(&self.displayed_rows())
    }

    // ---- export ----

    /// CSV of the filtered and sorted rows over the visible columns
    pub fn export_csv(&self) -> Option<CsvExport> {
        if !self.options.enable_export {
            return None;
        }
        let rows = self.processed_rows();
        let columns = self.visible_columns();
        Some(DataExporter::export(&self.options.title, &rows, &columns))
    }
}
