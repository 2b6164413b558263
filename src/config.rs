//! Process configuration: a `crawld.toml` file layered under CLI flags and
//! environment variables, the way the teacher's `CrawlerBuilder` layers
//! explicit overrides atop defaults.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

fn default_num_scrapers() -> usize {
    8
}

fn default_bind_addr() -> String {
    "[::1]:50061".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default = "default_num_scrapers")]
    pub num_scrapers: usize,
    pub frontier_endpoint: Option<String>,
    pub page_store_endpoint: Option<String>,
    pub cache_endpoint: Option<String>,
    #[serde(default)]
    pub seed_urls: Vec<String>,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            num_scrapers: default_num_scrapers(),
            frontier_endpoint: None,
            page_store_endpoint: None,
            cache_endpoint: None,
            seed_urls: Vec::new(),
            bind_addr: default_bind_addr(),
        }
    }
}

/// CLI flags (and their `env`-backed equivalents) that override a config
/// file's values when present.
#[derive(Debug, Parser)]
#[command(name = "crawld", about = "Distributed crawl coordinator")]
pub struct Cli {
    /// Path to a crawld.toml config file.
    #[arg(long, env = "CRAWLD_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "CRAWLD_NUM_SCRAPERS")]
    pub num_scrapers: Option<usize>,

    #[arg(long, env = "CRAWLD_FRONTIER_ENDPOINT")]
    pub frontier_endpoint: Option<String>,

    #[arg(long, env = "CRAWLD_PAGE_STORE_ENDPOINT")]
    pub page_store_endpoint: Option<String>,

    #[arg(long, env = "CRAWLD_CACHE_ENDPOINT")]
    pub cache_endpoint: Option<String>,

    #[arg(long, env = "CRAWLD_SEED_URLS", value_delimiter = ',')]
    pub seed_urls: Vec<String>,

    #[arg(long, env = "CRAWLD_BIND_ADDR")]
    pub bind_addr: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub num_scrapers: usize,
    pub frontier_endpoint: Option<String>,
    pub page_store_endpoint: Option<String>,
    pub cache_endpoint: Option<String>,
    pub seed_urls: Vec<String>,
    pub bind_addr: String,
}

impl Config {
    /// Loads the config file named by `--config`/`CRAWLD_CONFIG`, if any,
    /// then applies CLI/env overrides on top.
    pub fn load(cli: Cli) -> Result<Self> {
        let mut file_config = match &cli.config {
            Some(path) => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                toml::from_str(&contents)
                    .with_context(|| format!("failed to parse config file {}", path.display()))?
            }
            None => FileConfig::default(),
        };

        if let Some(n) = cli.num_scrapers {
            file_config.num_scrapers = n;
        }
        if cli.frontier_endpoint.is_some() {
            file_config.frontier_endpoint = cli.frontier_endpoint;
        }
        if cli.page_store_endpoint.is_some() {
            file_config.page_store_endpoint = cli.page_store_endpoint;
        }
        if cli.cache_endpoint.is_some() {
            file_config.cache_endpoint = cli.cache_endpoint;
        }
        if !cli.seed_urls.is_empty() {
            file_config.seed_urls = cli.seed_urls;
        }
        if let Some(addr) = cli.bind_addr {
            file_config.bind_addr = addr;
        }

        if file_config.num_scrapers == 0 {
            anyhow::bail!("num_scrapers must be positive");
        }

        Ok(Config {
            num_scrapers: file_config.num_scrapers,
            frontier_endpoint: file_config.frontier_endpoint,
            page_store_endpoint: file_config.page_store_endpoint,
            cache_endpoint: file_config.cache_endpoint,
            seed_urls: file_config.seed_urls,
            bind_addr: file_config.bind_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_take_precedence_over_file_defaults() {
        let cli = Cli {
            config: None,
            num_scrapers: Some(4),
            frontier_endpoint: Some("memory".into()),
            page_store_endpoint: None,
            cache_endpoint: None,
            seed_urls: vec!["http://a.test/".into()],
            bind_addr: None,
        };
        let config = Config::load(cli).unwrap();
        assert_eq!(config.num_scrapers, 4);
        assert_eq!(config.seed_urls, vec!["http://a.test/".to_string()]);
        assert_eq!(config.bind_addr, default_bind_addr());
    }

    #[test]
    fn zero_scrapers_is_rejected() {
        let cli = Cli {
            config: None,
            num_scrapers: Some(0),
            frontier_endpoint: None,
            page_store_endpoint: None,
            cache_endpoint: None,
            seed_urls: vec![],
            bind_addr: None,
        };
        assert!(Config::load(cli).is_err());
    }
}
