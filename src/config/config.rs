use crate::column_manager::{DEFAULT_COLUMN_WIDTH, DEFAULT_MIN_COLUMN_WIDTH};
use crate::data::datavalue_compare::DEFAULT_LOCALE;
use crate::data::pagination::DEFAULT_PAGE_SIZE;
use crate::grid::GridOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub grid: GridConfig,
    pub api: ApiConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Rows per page
    pub page_size: usize,

    /// Title used in the status line and export file names
    pub title: String,

    /// Locale for sorting text (e.g. "fr", "en", "de")
    pub locale: String,

    /// Viewport height handed to renderers (e.g. "600px")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,

    pub enable_filtering: bool,
    pub enable_sorting: bool,
    pub enable_selection: bool,
    pub enable_export: bool,
    pub enable_grouping: bool,
    pub enable_drag_to_group: bool,

    /// Width of columns that declare none
    pub default_column_width: f64,

    /// Smallest width a column can be resized to when it declares no minimum
    pub default_min_column_width: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Root URL of the backend, `/api/<resource>` is appended
    pub base_url: String,

    /// Resource loaded when neither `--resource` nor a data file is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_resource: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory for CSV exports (leave unset to use the data directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            title: "Données".to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            height: None,
            enable_filtering: true,
            enable_sorting: true,
            enable_selection: true,
            enable_export: true,
            enable_grouping: false,
            enable_drag_to_group: false,
            default_column_width: DEFAULT_COLUMN_WIDTH,
            default_min_column_width: DEFAULT_MIN_COLUMN_WIDTH,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            default_resource: None,
        }
    }
}

impl GridConfig {
    pub fn to_options(&self) -> GridOptions {
        GridOptions {
            enable_filtering: self.enable_filtering,
            enable_sorting: self.enable_sorting,
            enable_selection: self.enable_selection,
            enable_export: self.enable_export,
            enable_grouping: self.enable_grouping,
            enable_drag_to_group: self.enable_drag_to_group,
            page_size: self.page_size,
            height: self.height.clone(),
            title: self.title.clone(),
            locale: self.locale.clone(),
            default_column_width: self.default_column_width,
            default_min_column_width: self.default_min_column_width,
        }
    }
}

impl Config {
    /// Load config from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            // Create default config if it doesn't exist
            let default_config = Self::default();
            default_config.save()?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        debug!(target: "config", "Loaded config from {:?}", path);
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        debug!(target: "config", "Saved config to {:?}", path);

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("esn-grid").join("config.toml"))
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# ESN Grid Configuration File
# Location: ~/.config/esn-grid/config.toml (Linux)
#           ~/Library/Application Support/esn-grid/config.toml (macOS)
#           %APPDATA%\esn-grid\config.toml (Windows)

[grid]
# Rows per page
page_size = 10

# Title shown in the status line, also used for export file names
title = "Données"

# Locale used to sort text columns ("fr", "en", "de", ...)
locale = "fr"

# Viewport height passed to renderers
# height = "600px"

# Feature toggles
enable_filtering = true
enable_sorting = true
enable_selection = true
enable_export = true

# Group rows by column values (--group)
enable_grouping = false
enable_drag_to_group = false

# Column widths in pixels
default_column_width = 150.0
default_min_column_width = 50.0

[api]
# Backend root, used when --api is omitted. Resources are served under /api/<resource>
base_url = "http://localhost:3000"

# Resource loaded when neither --resource nor a data file is given
# default_resource = "consultants"

[export]
# Directory for CSV exports (leave commented to use the data directory)
# directory = "/path/to/exports"
"#
        .to_string()
    }

    /// Initialize config with a setup wizard
    pub fn init_wizard() -> Result<Self> {
        println!("ESN Grid Configuration Setup");
        println!("============================");

        let mut config = Config::default();

        print!("Rows per page [{}]: ", config.grid.page_size);
        std::io::Write::flush(&mut std::io::stdout())?;
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        if let Ok(size) = input.trim().parse::<usize>() {
            config.grid.page_size = size.max(1);
        }

        print!("Sort locale [{}]: ", config.grid.locale);
        std::io::Write::flush(&mut std::io::stdout())?;
        input.clear();
        std::io::stdin().read_line(&mut input)?;
        if !input.trim().is_empty() {
            config.grid.locale = input.trim().to_string();
        }

        print!("API base URL [{}]: ", config.api.base_url);
        std::io::Write::flush(&mut std::io::stdout())?;
        input.clear();
        std::io::stdin().read_line(&mut input)?;
        if !input.trim().is_empty() {
            config.api.base_url = input.trim().to_string();
        }

        config.save()?;

        println!("\nConfiguration saved to: {:?}", Config::get_config_path()?);
        println!("You can edit this file directly to customize further.");

        Ok(config)
    }
}
