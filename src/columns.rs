//! Column descriptors

use crate::cell_renderer::CellRenderer;
use crate::data::datatable::{DataValue, GridRow, Record};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    String,
    Number,
    Date,
    Boolean,
    Array,
}

impl ColumnType {
    fn infer(value: &DataValue) -> Self {
        match value {
            DataValue::Integer(_) | DataValue::Float(_) => ColumnType::Number,
            DataValue::DateTime(_) => ColumnType::Date,
            DataValue::Boolean(_) => ColumnType::Boolean,
            DataValue::Array(_) => ColumnType::Array,
            DataValue::String(_) | DataValue::Null => ColumnType::String,
        }
    }
}

/// Serialisable part of a column descriptor, as found in column JSON files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    pub field: String,
    pub header_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<f64>,
    #[serde(default, rename = "type")]
    pub column_type: ColumnType,
    #[serde(default)]
    pub editable: bool,
    #[serde(default)]
    pub disable_sorting: bool,
    #[serde(default)]
    pub disable_filtering: bool,
    #[serde(default)]
    pub disable_grouping: bool,
}

impl ColumnSpec {
    pub fn new(field: impl Into<String>, header_name: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            header_name: header_name.into(),
            width: None,
            min_width: None,
            column_type: ColumnType::default(),
            editable: false,
            disable_sorting: false,
            disable_filtering: false,
            disable_grouping: false,
        }
    }
}

/// A column of the grid: its descriptor plus how its cells are rendered
pub struct Column<R> {
    pub spec: ColumnSpec,
    pub renderer: CellRenderer<R>,
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        Self {
            spec: self.spec.clone(),
            renderer: self.renderer.clone(),
        }
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("spec", &self.spec)
            .field("renderer", &self.renderer)
            .finish()
    }
}

impl<R> Column<R> {
    pub fn new(field: impl Into<String>, header_name: impl Into<String>) -> Self {
        ColumnSpec::new(field, header_name).into()
    }

    pub fn field(&self) -> &str {
        &self.spec.field
    }

    pub fn header_name(&self) -> &str {
        &self.spec.header_name
    }

    pub fn width(mut self, width: f64) -> Self {
        self.spec.width = Some(width);
        self
    }

    pub fn min_width(mut self, min_width: f64) -> Self {
        self.spec.min_width = Some(min_width);
        self
    }

    pub fn column_type(mut self, column_type: ColumnType) -> Self {
        self.spec.column_type = column_type;
        self
    }

    pub fn editable(mut self) -> Self {
        self.spec.editable = true;
        self
    }

    pub fn disable_sorting(mut self) -> Self {
        self.spec.disable_sorting = true;
        self
    }

    pub fn disable_filtering(mut self) -> Self {
        self.spec.disable_filtering = true;
        self
    }

    pub fn disable_grouping(mut self) -> Self {
        self.spec.disable_grouping = true;
        self
    }

    pub fn with_renderer<F>(mut self, render: F) -> Self
    where
        F: Fn(&DataValue, &R) -> String + Send + Sync + 'static,
    {
        self.renderer = CellRenderer::custom(render);
        self
    }
}

impl<R: GridRow> Column<R> {
    pub fn render(&self, row: &R) -> String {
        let value = row.field(&self.spec.field);
        self.renderer
            .render(value.as_ref(), row, self.spec.column_type)
    }
}

impl<R> From<ColumnSpec> for Column<R> {
    fn from(spec: ColumnSpec) -> Self {
        Self {
            spec,
            renderer: CellRenderer::Default,
        }
    }
}

/// Derive column specs from the fields of the first row, `id` first
pub fn infer_columns(rows: &[Record]) -> Vec<ColumnSpec> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };

    let mut names: Vec<&str> = first.field_names().filter(|n| *n != "id").collect();
    names.insert(0, "id");

    names
        .into_iter()
        .map(|name| {
            let mut spec = ColumnSpec::new(name, name);
            if let Some(value) = first.get(name) {
                spec.column_type = ColumnType::infer(value);
            }
            spec
        })
        .collect()
}
