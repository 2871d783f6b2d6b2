//! Runtime settings for the terminal front-end.
//!
//! Read from an optional `sleuth` config file (e.g. `sleuth.toml`) merged
//! with `SLEUTH_*` environment variables, on top of coded defaults. Without
//! a `storage_path` the session runs on in-memory slots and forgets
//! everything at exit.

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{Result, SleuthError};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub storage_path: Option<String>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_path: None,
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Settings> {
        let config = Config::builder()
            .set_default("log_filter", "info")
            .map_err(|e| SleuthError::Config(e.to_string()))?
            .add_source(File::with_name("sleuth").required(false))
            .add_source(Environment::with_prefix("SLEUTH"))
            .build()
            .map_err(|e| SleuthError::Config(e.to_string()))?;
        config
            .try_deserialize()
            .map_err(|e| SleuthError::Config(e.to_string()))
    }
}
