use std::collections::HashMap;
use tracing::trace;

pub const DEFAULT_COLUMN_WIDTH: f64 = 150.0;
pub const DEFAULT_MIN_COLUMN_WIDTH: f64 = 50.0;

#[derive(Debug, Clone, PartialEq)]
struct ResizeDrag {
    field: String,
    start_x: f64,
    start_width: f64,
    min_width: f64,
}

/// Tracks user-resized column widths and the drag gesture in progress.
///
/// Widths are keyed by field name and override the column's declared width.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnWidths {
    widths: HashMap<String, f64>,
    active: Option<ResizeDrag>,
    default_width: f64,
    default_min_width: f64,
}

impl Default for ColumnWidths {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMN_WIDTH, DEFAULT_MIN_COLUMN_WIDTH)
    }
}

impl ColumnWidths {
    pub fn new(default_width: f64, default_min_width: f64) -> Self {
        Self {
            widths: HashMap::new(),
            active: None,
            default_width,
            default_min_width,
        }
    }

    pub fn default_min_width(&self) -> f64 {
        self.default_min_width
    }

    /// Tracked width, else the declared one, else the default
    pub fn width_of(&self, field: &str, declared: Option<f64>) -> f64 {
        self.widths
            .get(field)
            .copied()
            .or(declared)
            .unwrap_or(self.default_width)
    }

    /// Start a drag on `field`'s resize handle
    pub fn begin(&mut self, field: &str, pointer_x: f64, declared: Option<f64>, min_width: Option<f64>) {
        self.active = Some(ResizeDrag {
            field: field.to_string(),
            start_x: pointer_x,
            start_width: self.width_of(field, declared),
            min_width: min_width.unwrap_or(self.default_min_width),
        });
    }

    /// Follow the pointer, returns the new width of the dragged column
    pub fn drag(&mut self, pointer_x: f64) -> Option<f64> {
        let drag = self.active.as_ref()?;
        let width = (drag.start_width + (pointer_x - drag.start_x)).max(drag.min_width);
        trace!(target: "grid", "Resizing '{}' to {}", drag.field, width);
        self.widths.insert(drag.field.clone(), width);
        Some(width)
    }

    /// Finish the gesture, returns the field that was being resized
    pub fn end(&mut self) -> Option<String> {
        self.active.take().map(|drag| drag.field)
    }

    pub fn is_resizing(&self) -> bool {
        self.active.is_some()
    }

    pub fn resizing_field(&self) -> Option<&str> {
        self.active.as_ref().map(|drag| drag.field.as_str())
    }

    pub fn reset(&mut self, field: &str) {
        self.widths.remove(field);
    }
}
