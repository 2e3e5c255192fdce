// src/config/models.rs
use anyhow::{bail, Result};
use serde::Deserialize;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_LOG_FILTER: &str = "fixture_server=debug,hyper=info";

/// Settings for the standalone fixture runner.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    pub port: u16,
    /// `tracing` filter used when `RUST_LOG` is unset; ignored otherwise.
    pub log_filter: Option<String>,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            log_filter: None,
        }
    }
}

impl FixtureConfig {
    /// Filter the runner installs when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    pub fn validate(&self) -> Result<()> {
        // Browsers under test need a port known ahead of time.
        if self.port == 0 {
            bail!("port must be non-zero");
        }
        if matches!(&self.log_filter, Some(f) if f.trim().is_empty()) {
            bail!("log_filter must not be empty when set");
        }
        Ok(())
    }
}
