//! Data-grid engine for the ESN Manager Pro screens: column filters,
//! tri-state sorting, pagination, selection, grouping, column resize and
//! CSV export over any row type with a stable id.

pub mod api_client;
pub mod cell_renderer;
pub mod cli;
pub mod column_manager;
pub mod columns;
pub mod config;
pub mod data;
pub mod grid;
pub mod logging;
pub mod resource_store;
pub mod table_display;
pub mod utils;

pub use columns::{Column, ColumnSpec, ColumnType};
pub use data::datatable::{DataValue, GridRow, Record, RowId};
pub use grid::{DataGrid, GridOptions};
