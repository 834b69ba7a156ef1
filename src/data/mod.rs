//! Data layer: rows and values, and the pure transforms the grid applies
//! to them before anything is rendered.

// Core data modules
pub mod data_view;
pub mod datatable;
pub mod datavalue_compare;

// Transforms
pub mod filter;
pub mod grouping;
pub mod pagination;
pub mod selection;
pub mod sort;

// Input and output
pub mod data_exporter;
pub mod datatable_loaders;
