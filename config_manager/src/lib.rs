use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] ConfigError),
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Tronscan explorer API configuration
    pub explorer: ExplorerConfig,

    /// Pagination and consistency-retry settings
    pub pagination: PaginationConfig,

    /// CSV output settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Explorer API base URL
    pub api_base_url: String,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Request timeout in seconds (None = wait indefinitely)
    pub request_timeout_seconds: Option<u64>,

    /// TRX and TRC10 transfers
    pub transfers_path: String,

    /// TRC20 transfer events
    pub contract_events_path: String,

    /// Single TRC10 token lookup by id
    pub trc10_token_path: String,

    /// Bulk TRC20 token listing
    pub trc20_tokens_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Number of items requested per page
    pub page_size: u32,

    /// Maximum immediate re-issues of one inconsistent page (None = unbounded)
    pub max_page_retries: Option<u32>,

    /// Maximum full-pass restarts after the dataset changed (None = unbounded)
    pub max_pass_restarts: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output file used when none is given on the command line
    pub default_path: String,

    /// Write a column header row before the first record
    pub include_header: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            explorer: ExplorerConfig {
                api_base_url: "https://apilist.tronscan.org".to_string(),
                user_agent: concat!("tron_history/", env!("CARGO_PKG_VERSION")).to_string(),
                request_timeout_seconds: None,
                transfers_path: "api/transfer".to_string(),
                contract_events_path: "api/contract/events".to_string(),
                trc10_token_path: "api/token".to_string(),
                trc20_tokens_path: "api/token_trc20".to_string(),
            },
            pagination: PaginationConfig {
                page_size: 20,
                max_page_retries: None,
                max_pass_restarts: None,
            },
            output: OutputConfig {
                default_path: "output.csv".to_string(),
                include_header: false,
            },
        }
    }
}

impl ExplorerConfig {
    /// Validate explorer configuration
    pub fn validate(&self) -> Result<()> {
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(ConfigurationError::InvalidValue(format!(
                "Explorer base URL must be http(s): '{}'",
                self.api_base_url
            )));
        }

        if self.request_timeout_seconds == Some(0) {
            return Err(ConfigurationError::InvalidValue(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        for (name, path) in [
            ("transfers_path", &self.transfers_path),
            ("contract_events_path", &self.contract_events_path),
            ("trc10_token_path", &self.trc10_token_path),
            ("trc20_tokens_path", &self.trc20_tokens_path),
        ] {
            if path.trim().is_empty() {
                return Err(ConfigurationError::InvalidValue(format!(
                    "Explorer endpoint '{}' cannot be empty",
                    name
                )));
            }
        }

        Ok(())
    }
}

impl PaginationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(ConfigurationError::InvalidValue(
                "Page size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl SystemConfig {
    /// Load configuration from a specific file path
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let mut config_builder = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&SystemConfig::default())?);

        // Add config file if it exists
        if config_path.as_ref().exists() {
            info!(
                "Loading configuration from: {}",
                config_path.as_ref().display()
            );
            config_builder = config_builder.add_source(File::from(config_path.as_ref()));
        } else {
            debug!("Config file not found, using defaults and environment variables");
        }

        config_builder = config_builder.add_source(
            Environment::with_prefix("TRONHIST")
                .try_parsing(true)
                .separator("__"),
        );

        let system_config: SystemConfig = config_builder.build()?.try_deserialize()?;

        system_config.validate()?;

        Ok(system_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.explorer.validate()?;
        self.pagination.validate()?;

        if self.output.default_path.trim().is_empty() {
            return Err(ConfigurationError::InvalidValue(
                "Default output path cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
