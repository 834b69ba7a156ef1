use anyhow::{anyhow, Result};
use std::fs;
use std::path::PathBuf;

use crate::config::config::Config;

pub struct AppPaths;

impl AppPaths {
    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow!("Cannot determine data directory"))?
            .join("esn-grid");

        fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    /// Configured export directory, else `<data_dir>/exports`
    pub fn export_dir(config: &Config) -> Result<PathBuf> {
        let export_dir = match &config.export.directory {
            Some(dir) => dir.clone(),
            None => Self::data_dir()?.join("exports"),
        };
        fs::create_dir_all(&export_dir)?;
        Ok(export_dir)
    }
}
