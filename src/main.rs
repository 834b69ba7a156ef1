use anyhow::{anyhow, Context, Result};
use crossterm::style::Stylize;
use esn_grid::api_client::ApiClient;
use esn_grid::cli::{CliArgs, DataSource, ExportTarget};
use esn_grid::columns::{infer_columns, Column};
use esn_grid::config::config::Config;
use esn_grid::data::datatable::Record;
use esn_grid::data::datatable_loaders::{load_column_specs, load_records};
use esn_grid::grid::DataGrid;
use esn_grid::logging::init_tracing;
use esn_grid::resource_store::ResourceStore;
use esn_grid::table_display::display_grid;
use esn_grid::utils::app_paths::AppPaths;
use tracing::warn;

fn print_help() {
    println!("{}", "ESN Grid - filter, sort, page and export tabular data".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  esn-grid [OPTIONS] <FILE.json|FILE.csv>");
    println!("  esn-grid [OPTIONS] --api <URL> --resource <NAME>");
    println!("  esn-grid [OPTIONS] --resource <NAME>   (configured API base URL)");
    println!();
    println!("{}", "Options:".yellow());
    println!("  {} - Column descriptors (JSON array)", "--columns <file>".green());
    println!("  {} - Filter rows (contains, equals, startsWith)", "--filter field:op:value".green());
    println!("  {} - Sort by a column", "--sort field[:asc|:desc]".green());
    println!("  {} - Page to show", "--page <n>".green());
    println!("  {} - Rows per page", "--page-size <n>".green());
    println!("  {} - Group the page by a column", "--group <field>".green());
    println!("  {} - Hide a column", "--hide <field>".green());
    println!("  {} - Grid title", "--title <text>".green());
    println!("  {} - Export filtered rows to CSV", "--export [dir]".green());
    println!("  {} - Load rows from the REST API", "--api <url>".green());
    println!("  {} - Resource under /api/", "--resource <name>".green());
    println!("  {} - Print captured logs", "--debug".green());
    println!("  {} - Initialize configuration with wizard", "--init-config".green());
    println!("  {} - Generate config file with defaults", "--generate-config".green());
    println!();
}

fn generate_config() -> Result<()> {
    let path = Config::get_config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Error creating config directory")?;
    }
    std::fs::write(&path, Config::create_default_with_comments())
        .context("Error writing config file")?;
    println!("Configuration file created at: {:?}", path);
    println!("Edit this file to customize your grid defaults.");
    Ok(())
}

async fn load_rows(cli: &CliArgs, config: &Config) -> Result<Vec<Record>> {
    match cli.data_source(&config.api)? {
        DataSource::File(path) => load_records(path),
        DataSource::Api { base_url, resource } => {
            let mut store = ResourceStore::new(ApiClient::new(&base_url), resource);
            store.refresh().await;
            if let Some(message) = store.error() {
                return Err(anyhow!("{}", message));
            }
            Ok(store.rows().to_vec())
        }
    }
}

async fn run(cli: CliArgs) -> Result<()> {
    let config = Config::load().unwrap_or_else(|e| {
        warn!(target: "config", "Using default configuration: {:#}", e);
        Config::default()
    });

    let rows = load_rows(&cli, &config).await?;

    let specs = match &cli.columns_file {
        Some(path) => load_column_specs(path)?,
        None => infer_columns(&rows),
    };
    let columns: Vec<Column<Record>> = specs.into_iter().map(Column::from).collect();

    let mut options = config.grid.to_options();
    if let Some(title) = &cli.title {
        options.title = title.clone();
    }
    if let Some(size) = cli.page_size {
        options.page_size = size;
    }
    if !cli.group_by.is_empty() {
        options.enable_grouping = true;
    }

    let mut grid = DataGrid::new(columns, options).with_rows(rows)?;

    for (field, entry) in &cli.filters {
        if !grid.set_filter(field, entry.clone()) {
            eprintln!("{}", format!("Filter on '{}' ignored", field).yellow());
        }
    }
    if let Some(sort) = &cli.sort {
        if !grid.set_sort(sort.clone()) {
            eprintln!("{}", "Sort ignored".yellow());
        }
    }
    for field in &cli.hidden {
        grid.hide_column(field);
    }
    for field in &cli.group_by {
        if !grid.group_by(field) {
            eprintln!("{}", format!("Cannot group by '{}'", field).yellow());
        }
    }
    if let Some(page) = cli.page {
        grid.set_page(page);
    }

    display_grid(&grid);

    if let Some(target) = &cli.export {
        let dir = match target {
            ExportTarget::Dir(dir) => dir.clone(),
            ExportTarget::Default => AppPaths::export_dir(&config)?,
        };
        match grid.export_csv() {
            Some(export) => {
                let path = export.write_to(&dir)?;
                println!(
                    "{}",
                    format!("✓ Exported {} rows to {}", export.row_count, path.display()).green()
                );
            }
            None => eprintln!("{}", "Export is disabled".yellow()),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = CliArgs::parse(&args)?;

    if cli.help {
        print_help();
        return Ok(());
    }

    let logs = init_tracing(if cli.debug { "debug" } else { "info" });

    if cli.init_config {
        Config::init_wizard()?;
        println!("\nConfiguration initialized successfully!");
        return Ok(());
    }
    if cli.generate_config {
        return generate_config();
    }

    let debug = cli.debug;
    let result = run(cli).await;

    if debug {
        println!("\n{}", "Debug log:".cyan());
        for entry in logs.get_recent(200) {
            println!("{}", entry.format_for_display());
        }
    }

    if let Err(e) = &result {
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
    Ok(())
}
