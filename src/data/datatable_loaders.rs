use crate::columns::ColumnSpec;
use crate::data::datatable::{ensure_unique_ids, records_from_json, DataType, DataValue, Record, RowId};
use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use serde_json::Value as JsonValue;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Load a JSON array of row objects
pub fn load_json_records<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open JSON file: {:?}", path.as_ref()))?;
    let reader = BufReader::new(file);

    let json_data: JsonValue =
        serde_json::from_reader(reader).with_context(|| "Failed to parse JSON file")?;
    let records = records_from_json(&json_data)
        .with_context(|| format!("Invalid rows in {:?}", path.as_ref()))?;

    info!(target: "grid", "Loaded {} rows from {:?}", records.len(), path.as_ref());
    Ok(records)
}

/// Load a CSV file with a header line. An `id` column is required.
pub fn load_csv_records<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path.as_ref()))?;

    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);
    let headers = reader.headers()?.clone();
    let id_idx = headers
        .iter()
        .position(|h| h == "id")
        .ok_or_else(|| anyhow!("CSV file has no 'id' column: {:?}", path.as_ref()))?;

    // Read all rows first to collect data
    let mut string_rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        string_rows.push(record.iter().map(|s| s.to_string()).collect::<Vec<_>>());
    }

    // Infer column types by sampling the data
    let mut column_types = vec![DataType::Null; headers.len()];
    for row in string_rows.iter().take(100) {
        for (col_idx, value) in row.iter().enumerate().take(headers.len()) {
            if !value.is_empty() {
                let inferred = DataType::infer_from_string(value);
                column_types[col_idx] = column_types[col_idx].merge(&inferred);
            }
        }
    }

    let mut records = Vec::with_capacity(string_rows.len());
    for (line, row) in string_rows.iter().enumerate() {
        let id = match row.get(id_idx).map(String::as_str) {
            Some(raw) if !raw.is_empty() => raw
                .parse::<i64>()
                .map(RowId::Number)
                .unwrap_or_else(|_| RowId::Text(raw.to_string())),
            _ => return Err(anyhow!("Row {} has an empty id", line + 1)),
        };

        let mut record = Record::new(id);
        for (col_idx, header) in headers.iter().enumerate() {
            if col_idx == id_idx {
                continue;
            }
            let value = row
                .get(col_idx)
                .map(|v| DataValue::from_string(v, &column_types[col_idx]))
                .unwrap_or(DataValue::Null);
            record.set(header, value);
        }
        records.push(record);
    }

    ensure_unique_ids(&records)?;
    info!(target: "grid", "Loaded {} rows from {:?}", records.len(), path.as_ref());
    Ok(records)
}

/// Load rows, choosing the format from the file extension
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    let is_csv = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        load_csv_records(path)
    } else {
        load_json_records(path)
    }
}

/// Load a JSON array of column descriptors
pub fn load_column_specs<P: AsRef<Path>>(path: P) -> Result<Vec<ColumnSpec>> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open columns file: {:?}", path.as_ref()))?;
    let specs: Vec<ColumnSpec> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse columns file: {:?}", path.as_ref()))?;
    Ok(specs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::datatable::GridRow;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_csv_infers_types() {
        let file = temp_file(
            ".csv",
            "id,name,tjm,available,start\n1,Durand,550,true,2024-01-15\n2,\"Martin, Paul\",620.5,false,\n",
        );
        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].field("tjm"), Some(DataValue::Float(550.0)));
        assert_eq!(records[1].field("name"), Some(DataValue::String("Martin, Paul".into())));
        assert_eq!(records[0].field("available"), Some(DataValue::Boolean(true)));
        assert_eq!(records[0].field("start"), Some(DataValue::DateTime("2024-01-15".into())));
        assert_eq!(records[1].field("start"), Some(DataValue::Null));
    }

    #[test]
    fn test_load_csv_requires_id_column() {
        let file = temp_file(".csv", "name\nDurand\n");
        assert!(load_csv_records(file.path()).is_err());

        let file = temp_file(".csv", "id,name\n1,A\n1,B\n");
        let err = load_csv_records(file.path()).unwrap_err();
        assert!(err.to_string().contains("Duplicate row id"));
    }

    #[test]
    fn test_load_json_records() {
        let file = temp_file(".json", r#"[{"id": "c-1", "name": "ACME"}, {"id": "c-2", "name": null}]"#);
        let records = load_records(file.path()).unwrap();
        assert_eq!(records[0].row_id(), RowId::Text("c-1".into()));
        assert_eq!(records[1].field("name"), Some(DataValue::Null));

        let bad = temp_file(".json", r#"[{"name": "no id"}]"#);
        assert!(load_json_records(bad.path()).is_err());
    }

    #[test]
    fn test_load_column_specs() {
        let file = temp_file(".json", r#"[{"field": "name", "headerName": "Nom", "editable": true}]"#);
        let specs = load_column_specs(file.path()).unwrap();
        assert_eq!(specs[0].header_name, "Nom");
        assert!(specs[0].editable);
    }
}
