//! Tracing subscriber setup
//!
//! `pretty` writes human-readable lines for local use; `json` writes one
//! object per line for log collectors. `RUST_LOG` overrides the configured
//! level when set.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::{Result, SailError};

pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(std::env::var("RUST_LOG").ok().as_deref(), &config.level)?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let installed = match config.format.as_str() {
        "json" => builder.json().with_current_span(true).try_init(),
        _ => builder.try_init(),
    };

    installed.map_err(|e| SailError::config(format!("Failed to install log subscriber: {e}")))
}

/// `RUST_LOG` wins when it holds a valid directive; otherwise the
/// configured level must parse
fn build_filter(env_directive: Option<&str>, level: &str) -> Result<EnvFilter> {
    if let Some(filter) = env_directive
        .filter(|directive| !directive.trim().is_empty())
        .and_then(|directive| EnvFilter::try_new(directive).ok())
    {
        return Ok(filter);
    }
    EnvFilter::try_new(level)
        .map_err(|e| SailError::config(format!("Invalid log filter '{level}': {e}")))
}
