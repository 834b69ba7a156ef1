use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use crossterm::style::Stylize;

use crate::data::datatable::GridRow;
use crate::data::grouping::RowGroup;
use crate::data::pagination::PageItem;
use crate::data::selection::HeaderCheckState;
use crate::data::sort::SortDirection;
use crate::grid::DataGrid;

fn check_mark(state: HeaderCheckState) -> &'static str {
    match state {
        HeaderCheckState::Unchecked => "[ ]",
        HeaderCheckState::Indeterminate => "[-]",
        HeaderCheckState::Checked => "[x]",
    }
}

fn sort_marker(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Ascending => " ▲",
        SortDirection::Descending => " ▼",
        SortDirection::Unsorted => "",
    }
}

/// The current page as a table over the visible columns
pub fn build_table<R: GridRow>(grid: &DataGrid<R>) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let columns = grid.visible_columns();
    let selectable = grid.options().enable_selection;

    let mut headers = Vec::with_capacity(columns.len() + 1);
    if selectable {
        headers.push(Cell::new(check_mark(grid.header_check_state())));
    }
    for column in &columns {
        let label = format!(
            "{}{}",
            column.header_name(),
            sort_marker(grid.sort_state().direction_for(column.field()))
        );
        headers.push(Cell::new(label).add_attribute(Attribute::Bold));
    }
    table.set_header(headers);

    for row in grid.displayed_rows() {
        let mut cells = Vec::with_capacity(columns.len() + 1);
        if selectable {
            let mark = if grid.is_selected(&row.row_id()) { "[x]" } else { "[ ]" };
            cells.push(mark.to_string());
        }
        cells.extend(columns.iter().map(|column| column.render(row)));
        table.add_row(cells);
    }

    table
}

/// Page buttons, the current page in brackets: `1 … 4 [5] 6 … 10`
pub fn format_page_window(items: &[PageItem], current: usize) -> String {
    items
        .iter()
        .map(|item| match item {
            PageItem::Page(page) if *page == current => format!("[{}]", page),
            PageItem::Page(page) => page.to_string(),
            PageItem::Ellipsis => "…".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn status_line<R: GridRow>(grid: &DataGrid<R>) -> String {
    let mut status = format!(
        "{}: {} of {} rows, page {}/{}",
        grid.options().title,
        grid.filtered_count(),
        grid.rows().len(),
        grid.current_page(),
        grid.total_pages().max(1)
    );
    let selected = grid.selected_rows().len();
    if selected > 0 {
        status.push_str(&format!(", {} selected", selected));
    }
    status
}

/// Indented group tree with row counts
pub fn format_groups(groups: &[RowGroup]) -> Vec<String> {
    fn walk(groups: &[RowGroup], depth: usize, out: &mut Vec<String>) {
        for group in groups {
            let marker = if group.expanded { "▾" } else { "▸" };
            out.push(format!(
                "{}{} {}: {} ({})",
                "  ".repeat(depth),
                marker,
                group.field,
                group.key,
                group.count
            ));
            if group.expanded {
                walk(&group.subgroups, depth + 1, out);
            }
        }
    }

    let mut lines = Vec::new();
    walk(groups, 0, &mut lines);
    lines
}

pub fn display_grid<R: GridRow>(grid: &DataGrid<R>) {
    if grid.filtered_count() == 0 {
        println!("{}", "Aucune donnée".yellow());
    } else {
        println!("{}", build_table(grid));
    }

    let groups = grid.grouped_rows();
    if !groups.is_empty() {
        println!();
        for line in format_groups(&groups) {
            println!("{}", line);
        }
    }

    if grid.total_pages() > 1 {
        println!(
            "\n{}",
            format_page_window(&grid.page_window(), grid.current_page())
        );
    }
    println!("\n{}", status_line(grid).green());
}
