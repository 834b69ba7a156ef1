//! Command-line arguments of the `esn-grid` binary

use crate::config::config::ApiConfig;
use crate::data::filter::{FilterEntry, FilterOperator};
use crate::data::sort::{SortDirection, SortState};
use anyhow::{anyhow, bail, Context, Result};
use std::path::PathBuf;

/// Where `--export` writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// The configured export directory
    Default,
    Dir(PathBuf),
}

/// Where the rows come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Api { base_url: String, resource: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    pub data_file: Option<PathBuf>,
    pub columns_file: Option<PathBuf>,
    pub filters: Vec<(String, FilterEntry)>,
    pub sort: Option<SortState>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub group_by: Vec<String>,
    pub hidden: Vec<String>,
    pub title: Option<String>,
    pub export: Option<ExportTarget>,
    pub api_url: Option<String>,
    pub resource: Option<String>,
    pub debug: bool,
    pub help: bool,
    pub init_config: bool,
    pub generate_config: bool,
}

/// `field:operator:value`, the value may itself contain `:`
pub fn parse_filter(arg: &str) -> Result<(String, FilterEntry)> {
    let mut parts = arg.splitn(3, ':');
    let (Some(field), Some(op), Some(value)) = (parts.next(), parts.next(), parts.next()) else {
        bail!("Expected field:operator:value, got '{}'", arg);
    };
    let operator: FilterOperator = op.parse().map_err(|e: String| anyhow!(e))?;
    Ok((field.to_string(), FilterEntry::new(value, operator)))
}

/// `field`, `field:asc` or `field:desc`
pub fn parse_sort(arg: &str) -> Result<SortState> {
    let (field, direction) = match arg.split_once(':') {
        None => (arg, SortDirection::Ascending),
        Some((field, "asc")) => (field, SortDirection::Ascending),
        Some((field, "desc")) => (field, SortDirection::Descending),
        Some((_, other)) => bail!("Unknown sort direction '{}'", other),
    };
    Ok(SortState::new(field, direction))
}

impl CliArgs {
    /// Parse arguments, program name excluded
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut cli = CliArgs::default();
        let mut iter = args.iter().peekable();

        while let Some(arg) = iter.next() {
            let mut value = |flag: &str| {
                iter.next()
                    .cloned()
                    .ok_or_else(|| anyhow!("Missing value for {}", flag))
            };
            match arg.as_str() {
                "--help" | "-h" => cli.help = true,
                "--debug" => cli.debug = true,
                "--init-config" => cli.init_config = true,
                "--generate-config" => cli.generate_config = true,
                "--columns" => cli.columns_file = Some(value("--columns")?.into()),
                "--filter" => cli.filters.push(parse_filter(&value("--filter")?)?),
                "--sort" => cli.sort = Some(parse_sort(&value("--sort")?)?),
                "--page" => {
                    cli.page = Some(value("--page")?.parse().context("Invalid --page")?);
                }
                "--page-size" => {
                    cli.page_size = Some(value("--page-size")?.parse().context("Invalid --page-size")?);
                }
                "--group" => cli.group_by.push(value("--group")?),
                "--hide" => cli.hidden.push(value("--hide")?),
                "--title" => cli.title = Some(value("--title")?),
                "--api" => cli.api_url = Some(value("--api")?),
                "--resource" => cli.resource = Some(value("--resource")?),
                "--export" => {
                    cli.export = Some(match iter.next_if(|next| !next.starts_with("--")) {
                        Some(dir) => ExportTarget::Dir(dir.into()),
                        None => ExportTarget::Default,
                    });
                }
                other if other.starts_with("--") => bail!("Unknown option '{}'", other),
                file => {
                    if cli.data_file.is_some() {
                        bail!("Only one data file can be given");
                    }
                    cli.data_file = Some(file.into());
                }
            }
        }

        Ok(cli)
    }

    /// `--api` wins, then a data file. Without either, `--resource` or the
    /// configured default resource is loaded from the configured base URL.
    pub fn data_source(&self, api: &ApiConfig) -> Result<DataSource> {
        let resource = self.resource.clone().or_else(|| api.default_resource.clone());

        if let Some(url) = &self.api_url {
            let resource = resource.ok_or_else(|| anyhow!("--api requires --resource"))?;
            return Ok(DataSource::Api {
                base_url: url.clone(),
                resource,
            });
        }
        if let Some(path) = &self.data_file {
            return Ok(DataSource::File(path.clone()));
        }
        match resource {
            Some(resource) => Ok(DataSource::Api {
                base_url: api.base_url.clone(),
                resource,
            }),
            None => bail!("No data file given (see --help)"),
        }
    }
}
