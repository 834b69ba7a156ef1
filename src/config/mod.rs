//! Configuration module
//!
//! Grid defaults, API location and export settings, stored as TOML.

pub mod config;
