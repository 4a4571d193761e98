//! Configuration loading and validation.
//!
//! All values are read from environment variables. Only the storage service
//! URL has no default, and it is required only by commands that talk to the
//! service.

use std::path::PathBuf;

use anyhow::{Context, Result};
use hidr_common::HidrError;
use serde::Deserialize;

/// Legacy variable consulted when `RPC_URL` is unset.
const FALLBACK_RPC_URL_VAR: &str = "DEFAULT_RPC_URL";

/// Validated runtime configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Storage service base URL.
    #[serde(default)]
    pub rpc_url: Option<String>,

    /// Directory holding the private key and identity file.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Per-request timeout for storage service calls.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Size cap for `share --file`.
    #[serde(default = "default_max_secret_file_bytes")]
    pub max_secret_file_bytes: u64,

    /// Tracing log level (e.g. `"warn"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// `text` or `json`.
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".hidr")
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_secret_file_bytes() -> u64 {
    100 * 1024
}
fn default_log_level() -> String {
    "warn".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Ok(fallback) = std::env::var(FALLBACK_RPC_URL_VAR) {
            builder = builder
                .set_default("rpc_url", fallback)
                .context("failed to apply RPC URL fallback")?;
        }
        let cfg = builder
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// The storage service URL, for commands that need one.
    ///
    /// # Errors
    ///
    /// Returns [`HidrError::Input`] if neither `RPC_URL` nor `DEFAULT_RPC_URL`
    /// is set.
    pub fn require_rpc_url(&self) -> Result<&str, HidrError> {
        self.rpc_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| HidrError::Input("RPC_URL is not set".into()))
    }

    fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be > 0");
        }
        if self.max_secret_file_bytes == 0 {
            anyhow::bail!("MAX_SECRET_FILE_BYTES must be > 0");
        }
        if let Some(url) = &self.rpc_url {
            if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!("RPC_URL must be an http(s) URL, got `{url}`");
            }
        }
        if !matches!(self.log_format.as_str(), "text" | "json") {
            anyhow::bail!("LOG_FORMAT must be `text` or `json`");
        }
        Ok(())
    }
}
