use crate::columns::ColumnType;
use crate::data::datatable::DataValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt;
use std::sync::Arc;

/// Custom cell formatter: receives the cell value (`Null` when missing) and the whole row
pub type RenderFn<R> = Arc<dyn Fn(&DataValue, &R) -> String + Send + Sync>;

/// How a column turns a value into display text
pub enum CellRenderer<R> {
    /// Type-driven default formatting
    Default,
    Custom(RenderFn<R>),
}

impl<R> CellRenderer<R> {
    pub fn custom<F>(render: F) -> Self
    where
        F: Fn(&DataValue, &R) -> String + Send + Sync + 'static,
    {
        CellRenderer::Custom(Arc::new(render))
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, CellRenderer::Custom(_))
    }

    pub fn render(&self, value: Option<&DataValue>, row: &R, column_type: ColumnType) -> String {
        match self {
            CellRenderer::Default => default_render(value, column_type),
            CellRenderer::Custom(render) => render(value.unwrap_or(&DataValue::Null), row),
        }
    }
}

impl<R> Default for CellRenderer<R> {
    fn default() -> Self {
        CellRenderer::Default
    }
}

impl<R> Clone for CellRenderer<R> {
    fn clone(&self) -> Self {
        match self {
            CellRenderer::Default => CellRenderer::Default,
            CellRenderer::Custom(render) => CellRenderer::Custom(Arc::clone(render)),
        }
    }
}

impl<R> fmt::Debug for CellRenderer<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellRenderer::Default => f.write_str("Default"),
            CellRenderer::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Default text for a cell.
///
/// Dates (and text in date columns that parses as one) render as
/// `dd/mm/yyyy`, arrays as a `, ` separated list, null as empty.
pub fn default_render(value: Option<&DataValue>, column_type: ColumnType) -> String {
    match value {
        None | Some(DataValue::Null) => String::new(),
        Some(DataValue::DateTime(s)) => parse_date(s)
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| s.clone()),
        Some(DataValue::String(s)) if column_type == ColumnType::Date => parse_date(s)
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| s.clone()),
        Some(DataValue::Array(items)) => items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::datatable::Record;

    #[test]
    fn test_default_render() {
        assert_eq!(default_render(None, ColumnType::String), "");
        assert_eq!(
            default_render(Some(&DataValue::DateTime("2024-03-09".into())), ColumnType::String),
            "09/03/2024"
        );
        assert_eq!(
            default_render(Some(&DataValue::String("2024-03-09T10:00:00Z".into())), ColumnType::Date),
            "09/03/2024"
        );
        assert_eq!(
            default_render(
                Some(&DataValue::Array(vec!["Rust".into(), "SQL".into()])),
                ColumnType::Array
            ),
            "Rust, SQL"
        );
        assert_eq!(default_render(Some(&DataValue::Float(12.5)), ColumnType::Number), "12.5");
    }

    #[test]
    fn test_custom_renderer_sees_row() {
        let renderer: CellRenderer<Record> = CellRenderer::custom(|value: &DataValue, row: &Record| {
            format!("{} ({})", value, row.get("unit").map(|u| u.to_string()).unwrap_or_default())
        });
        let row = Record::new(1).with_field("tjm", 600).with_field("unit", "€/j");
        assert_eq!(
            renderer.render(row.get("tjm"), &row, ColumnType::Number),
            "600 (€/j)"
        );
        assert!(renderer.is_custom());
        assert_eq!(renderer.render(None, &row, ColumnType::Number), " (€/j)");
    }
}
