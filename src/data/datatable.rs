use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use tracing::debug;

/// Identity key of a row, used for selection and edit callbacks
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Number(i64),
    Text(String),
}

impl RowId {
    /// Read an id from a JSON value. Only integers and non-empty strings qualify;
    /// fractional numbers are kept as their textual form.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Number(n) => Some(
                n.as_i64()
                    .map(RowId::Number)
                    .unwrap_or_else(|| RowId::Text(n.to_string())),
            ),
            JsonValue::String(s) if !s.is_empty() => Some(RowId::Text(s.clone())),
            _ => None,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            RowId::Number(n) => JsonValue::from(*n),
            RowId::Text(s) => JsonValue::String(s.clone()),
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Number(n) => write!(f, "{}", n),
            RowId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RowId {
    fn from(value: i64) -> Self {
        RowId::Number(value)
    }
}

impl From<i32> for RowId {
    fn from(value: i32) -> Self {
        RowId::Number(value as i64)
    }
}

impl From<&str> for RowId {
    fn from(value: &str) -> Self {
        RowId::Text(value.to_string())
    }
}

impl From<String> for RowId {
    fn from(value: String) -> Self {
        RowId::Text(value)
    }
}

/// Represents the data type of a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataType {
    String,
    Integer,
    Float,
    Boolean,
    DateTime,
    Null,
    Mixed, // For columns with mixed types
}

impl DataType {
    /// Infer type from a string value
    pub fn infer_from_string(value: &str) -> Self {
        if value.is_empty() || value.eq_ignore_ascii_case("null") {
            return DataType::Null;
        }

        if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false") {
            return DataType::Boolean;
        }

        if value.parse::<i64>().is_ok() {
            return DataType::Integer;
        }

        if value.parse::<f64>().is_ok() {
            return DataType::Float;
        }

        if looks_like_date(value) {
            return DataType::DateTime;
        }

        DataType::String
    }

    /// Combine the types seen in one column
    pub fn merge(&self, other: &DataType) -> DataType {
        match (self, other) {
            (a, b) if a == b => a.clone(),
            (DataType::Null, t) | (t, DataType::Null) => t.clone(),
            (DataType::Integer, DataType::Float) | (DataType::Float, DataType::Integer) => DataType::Float,
            _ => DataType::Mixed,
        }
    }
}

/// True for ISO-8601 dates and date-times (`2024-03-01`, `2024-03-01T09:30:00`, RFC 3339)
pub fn looks_like_date(value: &str) -> bool {
    if value.len() < 10 {
        return false;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || DateTime::parse_from_rfc3339(value).is_ok()
}

/// A single cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(String), // ISO 8601 text
    Array(Vec<DataValue>),
    Null,
}

impl DataValue {
    pub fn from_string(s: &str, data_type: &DataType) -> Self {
        if s.is_empty() || s.eq_ignore_ascii_case("null") {
            return DataValue::Null;
        }

        match data_type {
            DataType::String => DataValue::String(s.to_string()),
            DataType::Integer => s
                .parse::<i64>()
                .map(DataValue::Integer)
                .unwrap_or_else(|_| DataValue::String(s.to_string())),
            DataType::Float => match s.parse::<f64>() {
                // "NaN" parses as a float but carries no value
                Ok(f) if f.is_nan() => DataValue::Null,
                Ok(f) => DataValue::Float(f),
                Err(_) => DataValue::String(s.to_string()),
            },
            DataType::Boolean => {
                let lower = s.to_lowercase();
                DataValue::Boolean(lower == "true" || lower == "1" || lower == "yes")
            }
            DataType::DateTime => DataValue::DateTime(s.to_string()),
            DataType::Null => DataValue::Null,
            DataType::Mixed => {
                let inferred = DataType::infer_from_string(s);
                Self::from_string(s, &inferred)
            }
        }
    }

    /// Convert a JSON value. Nested objects are kept as their JSON text.
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => DataValue::Null,
            JsonValue::Bool(b) => DataValue::Boolean(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => DataValue::Integer(i),
                None => n
                    .as_f64()
                    .map(DataValue::Float)
                    .unwrap_or_else(|| DataValue::String(n.to_string())),
            },
            JsonValue::String(s) if looks_like_date(s) => DataValue::DateTime(s.clone()),
            JsonValue::String(s) => DataValue::String(s.clone()),
            JsonValue::Array(items) => DataValue::Array(items.iter().map(Self::from_json).collect()),
            JsonValue::Object(_) => DataValue::String(value.to_string()),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            DataValue::String(s) | DataValue::DateTime(s) => JsonValue::String(s.clone()),
            DataValue::Integer(i) => JsonValue::from(*i),
            DataValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            DataValue::Boolean(b) => JsonValue::Bool(*b),
            DataValue::Array(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
            DataValue::Null => JsonValue::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, DataValue::Integer(_) | DataValue::Float(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DataValue::Integer(i) => Some(*i as f64),
            DataValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            DataValue::String(_) | DataValue::Array(_) => DataType::String,
            DataValue::Integer(_) => DataType::Integer,
            DataValue::Float(_) => DataType::Float,
            DataValue::Boolean(_) => DataType::Boolean,
            DataValue::DateTime(_) => DataType::DateTime,
            DataValue::Null => DataType::Null,
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::String(s) => write!(f, "{}", s),
            DataValue::Integer(i) => write!(f, "{}", i),
            DataValue::Float(fl) => write!(f, "{}", fl),
            DataValue::Boolean(b) => write!(f, "{}", b),
            DataValue::DateTime(dt) => write!(f, "{}", dt),
            DataValue::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            DataValue::Null => write!(f, ""),
        }
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::String(value.to_string())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::String(value)
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Integer(value)
    }
}

impl From<i32> for DataValue {
    fn from(value: i32) -> Self {
        DataValue::Integer(value as i64)
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Float(value)
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Boolean(value)
    }
}

impl<T: Into<DataValue>> From<Option<T>> for DataValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(DataValue::Null)
    }
}

/// A row the grid can display.
///
/// Implementors expose a stable identity and named field access. A field
/// that does not exist is reported as `None` and treated like `Null`.
pub trait GridRow {
    fn row_id(&self) -> RowId;

    fn field(&self, name: &str) -> Option<DataValue>;
}

/// Dynamic row built from a JSON object
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: RowId,
    fields: BTreeMap<String, DataValue>,
}

impl Record {
    pub fn new(id: impl Into<RowId>) -> Self {
        let id = id.into();
        let mut fields = BTreeMap::new();
        fields.insert("id".to_string(), id_value(&id));
        Self { id, fields }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<DataValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a field. Writing `id` is ignored, the identity is fixed at construction.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<DataValue>) {
        let name = name.into();
        if name == "id" {
            return;
        }
        self.fields.insert(name, value.into());
    }

    pub fn id(&self) -> &RowId {
        &self.id
    }

    pub fn get(&self, name: &str) -> Option<&DataValue> {
        self.fields.get(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Build a record from a JSON object, requiring a string or numeric `id`
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| anyhow!("Row is not a JSON object: {}", value))?;
        let id = obj
            .get("id")
            .and_then(RowId::from_json)
            .ok_or_else(|| anyhow!("Row has no usable 'id' field"))?;

        let mut record = Record::new(id);
        for (key, v) in obj {
            record.set(key.as_str(), DataValue::from_json(v));
        }
        Ok(record)
    }

    pub fn to_json(&self) -> JsonValue {
        let mut obj = serde_json::Map::new();
        for (key, value) in &self.fields {
            obj.insert(key.clone(), value.to_json());
        }
        JsonValue::Object(obj)
    }
}

fn id_value(id: &RowId) -> DataValue {
    match id {
        RowId::Number(n) => DataValue::Integer(*n),
        RowId::Text(s) => DataValue::String(s.clone()),
    }
}

impl GridRow for Record {
    fn row_id(&self) -> RowId {
        self.id.clone()
    }

    fn field(&self, name: &str) -> Option<DataValue> {
        self.fields.get(name).cloned()
    }
}

/// Parse a JSON array of row objects, validating ids
pub fn records_from_json(value: &JsonValue) -> Result<Vec<Record>> {
    let items = value
        .as_array()
        .ok_or_else(|| anyhow!("Expected a JSON array of rows"))?;

    let records = items
        .iter()
        .enumerate()
        .map(|(idx, item)| Record::from_json(item).with_context(|| format!("Invalid row at index {}", idx)))
        .collect::<Result<Vec<_>>>()?;

    ensure_unique_ids(&records)?;
    debug!(target: "grid", "Parsed {} records from JSON", records.len());
    Ok(records)
}

/// Reject datasets where two rows share an id
pub fn ensure_unique_ids<R: GridRow>(rows: &[R]) -> Result<()> {
    let mut seen = HashSet::with_capacity(rows.len());
    for row in rows {
        let id = row.row_id();
        if !seen.insert(id.clone()) {
            bail!("Duplicate row id: {}", id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_from_json_keeps_id_and_fields() {
        let record = Record::from_json(&json!({"id": 7, "name": "Dupont", "tjm": 550.5})).unwrap();
        assert_eq!(record.id(), &RowId::Number(7));
        assert_eq!(record.field("name"), Some(DataValue::String("Dupont".into())));
        assert_eq!(record.field("tjm"), Some(DataValue::Float(550.5)));
        assert_eq!(record.field("id"), Some(DataValue::Integer(7)));
        assert_eq!(record.field("missing"), None);
    }

    #[test]
    fn test_record_requires_id() {
        assert!(Record::from_json(&json!({"name": "x"})).is_err());
        assert!(Record::from_json(&json!({"id": null})).is_err());
        assert!(Record::from_json(&json!({"id": ""})).is_err());
        assert!(Record::from_json(&json!("not an object")).is_err());
        assert_eq!(
            Record::from_json(&json!({"id": "c-12"})).unwrap().id(),
            &RowId::Text("c-12".into())
        );
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = records_from_json(&json!([{"id": 1}, {"id": 2}, {"id": 1}])).unwrap_err();
        assert!(err.to_string().contains("Duplicate row id: 1"));
    }

    #[test]
    fn test_json_conversion() {
        assert_eq!(
            DataValue::from_json(&json!("2024-03-01")),
            DataValue::DateTime("2024-03-01".into())
        );
        assert_eq!(
            DataValue::from_json(&json!(["Rust", "Go"])).to_string(),
            "Rust,Go"
        );
        assert_eq!(DataValue::Float(2.0).to_string(), "2");
        assert_eq!(DataValue::Null.to_string(), "");
    }

    #[test]
    fn test_record_round_trips_to_json() {
        let value = json!({"id": 3, "name": "Martin", "skills": ["SQL"], "active": true});
        let record = Record::from_json(&value).unwrap();
        assert_eq!(record.to_json(), value);
    }

    #[test]
    fn test_infer_from_string() {
        assert_eq!(DataType::infer_from_string("42"), DataType::Integer);
        assert_eq!(DataType::infer_from_string("4.2"), DataType::Float);
        assert_eq!(DataType::infer_from_string("TRUE"), DataType::Boolean);
        assert_eq!(DataType::infer_from_string("2024-01-15"), DataType::DateTime);
        assert_eq!(DataType::infer_from_string("Paris"), DataType::String);
        assert_eq!(DataType::infer_from_string(""), DataType::Null);
    }

    #[test]
    fn test_nan_text_becomes_null() {
        assert_eq!(DataValue::from_string("NaN", &DataType::Float), DataValue::Null);
        assert_eq!(DataValue::from_string("nan", &DataType::Mixed), DataValue::Null);
        assert_eq!(DataValue::from_string("2.5", &DataType::Float), DataValue::Float(2.5));
    }
}
