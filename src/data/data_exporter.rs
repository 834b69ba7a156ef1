use crate::columns::Column;
use crate::data::datatable::{DataValue, GridRow};
use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};

/// A CSV document built from the grid, not yet written anywhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
    pub row_count: usize,
}

impl CsvExport {
    /// Write the document into `dir` under its file name
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create export directory {}", dir.display()))?;
        let path = dir.join(&self.filename);
        fs::write(&path, &self.content)
            .with_context(|| format!("Cannot write export file {}", path.display()))?;
        info!(target: "export", "Exported {} rows to {}", self.row_count, path.display());
        Ok(path)
    }
}

/// Builds CSV exports of grid rows
pub struct DataExporter;

impl DataExporter {
    /// `<title>_export.csv`, whitespace runs in the title replaced by `_`
    pub fn export_filename(title: &str) -> String {
        static WHITESPACE: OnceLock<Regex> = OnceLock::new();
        let re = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("static regex"));
        format!("{}_export.csv", re.replace_all(title, "_"))
    }

    /// Serialise `rows` with one column per entry of `columns`, header first
    pub fn rows_to_csv<R: GridRow>(rows: &[&R], columns: &[&Column<R>]) -> String {
        let mut out = String::new();

        let header: Vec<String> = columns
            .iter()
            .map(|c| Self::escape_csv_field(c.header_name()))
            .collect();
        out.push_str(&header.join(","));
        out.push('\n');

        for row in rows {
            let line: Vec<String> = columns
                .iter()
                .map(|c| Self::csv_cell(row.field(c.field()).as_ref()))
                .collect();
            out.push_str(&line.join(","));
            out.push('\n');
        }

        debug!(target: "export", "Built CSV with {} rows and {} columns", rows.len(), columns.len());
        out
    }

    pub fn export<R: GridRow>(title: &str, rows: &[&R], columns: &[&Column<R>]) -> CsvExport {
        CsvExport {
            filename: Self::export_filename(title),
            content: Self::rows_to_csv(rows, columns),
            row_count: rows.len(),
        }
    }

    /// Numbers and booleans are written bare, text is escaped, null is empty
    fn csv_cell(value: Option<&DataValue>) -> String {
        match value {
            None | Some(DataValue::Null) => String::new(),
            Some(DataValue::Integer(i)) => i.to_string(),
            Some(DataValue::Float(f)) => f.to_string(),
            Some(DataValue::Boolean(b)) => b.to_string(),
            Some(other) => Self::escape_csv_field(&other.to_string()),
        }
    }

    /// Helper to escape CSV fields that contain special characters
    fn escape_csv_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
            // Escape quotes by doubling them and wrap field in quotes
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }
}
