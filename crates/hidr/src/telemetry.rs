//! Logging initialisation.
//!
//! Logs go to stderr so that stdout carries only command output (identifiers,
//! decrypted secrets, converted files).
//!
//! # Telemetry invariants
//!
//! - **No secret material** (plaintext, password, symmetric key, private key,
//!   signature) may appear in any log field.
//! - Log level is configurable via `LOG_LEVEL` (default: `warn`); `RUST_LOG`
//!   takes precedence.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Output encoding for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// `json` selects JSON lines; anything else is compact text.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Initialise the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the subscriber has already been set.
pub fn init(log_level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let res = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.compact().without_time().try_init(),
    };
    res.map_err(|e| anyhow::anyhow!("failed to initialise tracing subscriber: {e}"))
}
