//! # Feed Configuration
//!
//! Unified configuration for the node client, the indexer client, the scan
//! drivers and the chain constants.
//!
//! ## Load Order
//!
//! 1. Built-in defaults (public node, public indexer, mainnet constants)
//! 2. Optional TOML file
//! 3. `SF_*` environment variables
//! 4. CLI flags (applied by the binary)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sf_02_scan_sources::{IndexerConfig, NodeConfig};
use sf_04_scan_controller::ScanConfig;
use shared_types::ChainParams;

/// Complete feed configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Node JSON-RPC client.
    pub node: NodeConfig,
    /// Indexer API client.
    pub indexer: IndexerConfig,
    /// Scan drivers.
    pub scan: ScanConfig,
    /// Contract addresses, migration timestamps and channel rules.
    pub chain: ChainParams,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for `FeedConfig`.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// An `SF_*` variable holds an unusable value.
    #[error("Invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },

    /// The merged configuration is inconsistent.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl FeedConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Defaults, then `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml_str(&raw)?
            }
            None => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Apply `SF_*` overrides read through `lookup`.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `SF_NODE_URL` | `node.url` |
    /// | `SF_NODE_API_KEY` | `node.api_key` |
    /// | `SF_INDEXER_URL` | `indexer.url` |
    /// | `SF_HISTORY_SOURCE` | `scan.history_source` |
    /// | `SF_INITIAL_BLOCK` | `scan.initial_block` |
    /// | `SF_POLLING_INTERVAL_MS` | `scan.polling_interval_ms` |
    /// | `SF_SCAN_BUDGET_SECS` | `scan.scan_budget_secs` |
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup("SF_NODE_URL") {
            self.node.url = url;
        }
        if let Some(key) = lookup("SF_NODE_API_KEY") {
            self.node.api_key = key;
        }
        if let Some(url) = lookup("SF_INDEXER_URL") {
            self.indexer.url = url;
        }
        if let Some(value) = lookup("SF_HISTORY_SOURCE") {
            self.scan.history_source =
                value.parse().map_err(|_| ConfigError::InvalidEnv {
                    var: "SF_HISTORY_SOURCE",
                    value,
                })?;
        }
        if let Some(value) = lookup("SF_INITIAL_BLOCK") {
            self.scan.initial_block = Some(parse_env("SF_INITIAL_BLOCK", value)?);
        }
        if let Some(value) = lookup("SF_POLLING_INTERVAL_MS") {
            self.scan.polling_interval_ms = parse_env("SF_POLLING_INTERVAL_MS", value)?;
        }
        if let Some(value) = lookup("SF_SCAN_BUDGET_SECS") {
            self.scan.scan_budget_secs = parse_env("SF_SCAN_BUDGET_SECS", value)?;
        }
        Ok(())
    }

    /// Reject settings the drivers cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node.url.is_empty() {
            return Err(ConfigError::Invalid("node.url is empty".to_string()));
        }
        if self.indexer.page_limit == 0 {
            return Err(ConfigError::Invalid(
                "indexer.page_limit must be positive".to_string(),
            ));
        }
        if self.scan.polling_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "scan.polling_interval_ms must be positive".to_string(),
            ));
        }
        if self.chain.v3_timestamp > self.chain.v5_timestamp {
            return Err(ConfigError::Invalid(
                "chain.v3_timestamp is after chain.v5_timestamp".to_string(),
            ));
        }
        if let Some(initial) = self.scan.initial_block {
            if initial < self.chain.first_block {
                return Err(ConfigError::Invalid(format!(
                    "scan.initial_block {initial} is below chain.first_block {}",
                    self.chain.first_block
                )));
            }
        }
        Ok(())
    }
}

fn parse_env(var: &'static str, value: String) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { var, value })
}
