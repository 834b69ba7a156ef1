use esn_grid::data::datatable::records_from_json;
use esn_grid::data::datatable_loaders::load_csv_records;
use esn_grid::data::filter::{apply_filters, FilterEntry, FilterSet};
use esn_grid::data::selection::HeaderCheckState;
use esn_grid::{Column, DataGrid, DataValue, GridOptions, GridRow, Record, RowId};
use serde_json::json;

fn ids(rows: &[&Record]) -> Vec<RowId> {
    rows.iter().map(|r| r.row_id()).collect()
}

fn nums(values: &[i64]) -> Vec<RowId> {
    values.iter().copied().map(RowId::Number).collect()
}

#[test]
fn test_comma_value_is_quoted_in_export() {
    let rows = records_from_json(&json!([{"id": 1, "name": "A,B"}])).unwrap();
    let grid = DataGrid::new(vec![Column::new("name", "Name")], GridOptions::default())
        .with_rows(rows)
        .unwrap();

    let export = grid.export_csv().unwrap();
    let lines: Vec<&str> = export.content.lines().collect();
    assert_eq!(lines, vec!["Name", "\"A,B\""]);
}

#[test]
fn test_score_sort_keeps_null_last() {
    let rows = records_from_json(&json!([
        {"id": 1, "score": 50},
        {"id": 2, "score": null},
        {"id": 3, "score": 30}
    ]))
    .unwrap();
    let mut grid = DataGrid::new(vec![Column::new("score", "Score")], GridOptions::default())
        .with_rows(rows)
        .unwrap();

    grid.toggle_sort("score");
    let scores: Vec<Option<DataValue>> = grid.displayed_rows().iter().map(|r| r.field("score")).collect();
    assert_eq!(
        scores,
        vec![Some(DataValue::Integer(30)), Some(DataValue::Integer(50)), Some(DataValue::Null)]
    );

    grid.toggle_sort("score");
    assert_eq!(ids(&grid.displayed_rows()), nums(&[1, 3, 2]));
}

#[test]
fn test_equals_filter_matches_case_insensitively() {
    let rows = records_from_json(&json!([
        {"id": 1, "status": "Actif"},
        {"id": 2, "status": "Inactif"}
    ]))
    .unwrap();
    let mut grid = DataGrid::new(vec![Column::new("status", "Statut")], GridOptions::default())
        .with_rows(rows)
        .unwrap();

    assert!(grid.set_filter_str("status", "equals", "actif"));
    assert_eq!(ids(&grid.displayed_rows()), nums(&[1]));
}

#[test]
fn test_select_all_fifteen_rows_page_by_page() {
    let rows: Vec<Record> = (1..=15).map(Record::new).collect();
    let mut grid = DataGrid::new(vec![Column::new("id", "ID")], GridOptions::default())
        .with_rows(rows)
        .unwrap();

    grid.toggle_select_all();
    assert_eq!(grid.selected_rows().len(), 10);

    grid.set_page(2);
    assert_eq!(grid.header_check_state(), HeaderCheckState::Unchecked);
    grid.toggle_select_all();
    assert_eq!(grid.selected_rows().len(), 15);
    assert_eq!(grid.header_check_state(), HeaderCheckState::Checked);
}

#[test]
fn test_filter_is_idempotent() {
    let rows: Vec<Record> = (1..=40)
        .map(|i| Record::new(i).with_field("code", format!("C{:02}", i)))
        .collect();
    let filters = FilterSet::new().with("code", FilterEntry::starts_with("c1"));
    let once = apply_filters(&rows, &filters);
    let twice = apply_filters(&once, &filters);
    assert_eq!(once, twice);
    assert_eq!(once.len(), 10);
}

#[test]
fn test_asc_then_desc_reverses_distinct_keys() {
    let values = [7, 3, 9, 1, 4, 8];
    let rows: Vec<Record> = values
        .iter()
        .enumerate()
        .map(|(i, v)| Record::new(i as i64).with_field("n", *v as i64))
        .collect();
    let mut grid = DataGrid::new(vec![Column::new("n", "N")], GridOptions::default())
        .with_rows(rows)
        .unwrap();

    grid.toggle_sort("n");
    let asc = ids(&grid.displayed_rows());
    grid.toggle_sort("n");
    let mut desc = ids(&grid.displayed_rows());
    desc.reverse();
    assert_eq!(asc, desc);
}

#[test]
fn test_equal_keys_keep_source_order() {
    let rows: Vec<Record> = (1..=6)
        .map(|i| Record::new(i).with_field("team", if i % 2 == 0 { "B" } else { "A" }))
        .collect();
    let mut grid = DataGrid::new(vec![Column::new("team", "Équipe")], GridOptions::default())
        .with_rows(rows)
        .unwrap();

    grid.toggle_sort("team");
    assert_eq!(ids(&grid.displayed_rows()), nums(&[1, 3, 5, 2, 4, 6]));
    grid.toggle_sort("team");
    assert_eq!(ids(&grid.displayed_rows()), nums(&[2, 4, 6, 1, 3, 5]));
}

#[test]
fn test_page_bounds_hold_under_every_page_size() {
    let rows: Vec<Record> = (1..=23).map(Record::new).collect();
    let mut grid = DataGrid::new(vec![Column::new("id", "ID")], GridOptions::default())
        .with_rows(rows)
        .unwrap();

    for size in [0, 1, 5, 10, 23, 50] {
        grid.set_page(usize::MAX);
        grid.set_page_size(size);
        let expected_pages = 23usize.div_ceil(size.max(1));
        assert_eq!(grid.total_pages(), expected_pages);
        assert!(grid.current_page() >= 1 && grid.current_page() <= expected_pages.max(1));
    }
}

#[test]
fn test_sorting_a_mixed_type_column_is_total() {
    let rows: Vec<Record> = (0..240i64)
        .map(|i| {
            let value = match i % 3 {
                0 => DataValue::Integer(i),
                1 => DataValue::String("Na".to_string()),
                _ => DataValue::Float(i as f64 / 7.0),
            };
            Record::new(i).with_field("v", value)
        })
        .collect();
    let mut grid = DataGrid::new(vec![Column::new("v", "V")], GridOptions::default())
        .with_rows(rows)
        .unwrap();

    assert!(grid.toggle_sort("v"));
    let sorted: Vec<Option<DataValue>> = grid.processed_rows().iter().map(|r| r.field("v")).collect();
    assert_eq!(sorted.len(), 240);
    // numbers in ascending order, then the text cells
    let numbers: Vec<f64> = sorted.iter().filter_map(|v| v.as_ref().and_then(DataValue::as_f64)).collect();
    assert_eq!(numbers.len(), 160);
    assert!(numbers.windows(2).all(|w| w[0] <= w[1]));
    assert!(sorted[160..].iter().all(|v| v == &Some(DataValue::String("Na".to_string()))));

    assert!(grid.toggle_sort("v"));
    assert_eq!(grid.processed_rows().len(), 240);
}

#[test]
fn test_nan_cells_from_csv_sort_last() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scores.csv");
    let mut content = String::from("id,score\n");
    for i in 0..300 {
        if i % 4 == 0 {
            content.push_str(&format!("{},NaN\n", i));
        } else {
            content.push_str(&format!("{},{}.5\n", i, (i * 37) % 100));
        }
    }
    std::fs::write(&path, content).unwrap();

    let rows = load_csv_records(&path).unwrap();
    let mut grid = DataGrid::new(vec![Column::new("score", "Score")], GridOptions::default())
        .with_rows(rows)
        .unwrap();
    grid.toggle_sort("score");

    let scores: Vec<Option<DataValue>> = grid.processed_rows().iter().map(|r| r.field("score")).collect();
    let numbers: Vec<f64> = scores[..225].iter().filter_map(|v| v.as_ref().and_then(DataValue::as_f64)).collect();
    assert_eq!(numbers.len(), 225);
    assert!(numbers.windows(2).all(|w| w[0] <= w[1]));
    assert!(scores[225..].iter().all(|v| v == &Some(DataValue::Null)));
}
