//! Application configuration.
//!
//! Loaded from an optional TOML file layered with `TOKENSTORE__*` environment
//! variables, e.g. `TOKENSTORE__MONGO__URL=mongodb://db:27017`.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tokenstore_core::TokenConfig;
use tokenstore_mongo::MongoConfig;

/// File read when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "tokenstore.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "TOKENSTORE";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub mongo: MongoConfig,
    pub tokens: TokenConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter level; `RUST_LOG` takes precedence when set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        self.mongo.validate()?;
        self.tokens.validate()?;
        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            bail!(
                "logging.level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.logging.level
            );
        }
        Ok(())
    }
}

pub mod loader {
    use std::path::PathBuf;

    use config::{Config, Environment, File, FileFormat, Map};

    use super::*;

    /// Load configuration from `path` (or the default file) and the process
    /// environment.
    pub fn load_config(path: Option<&str>) -> Result<AppConfig> {
        load_config_with_env(path, None)
    }

    /// Load configuration with an explicit environment map in place of the
    /// process environment.
    pub fn load_config_with_env(
        path: Option<&str>,
        env: Option<Map<String, String>>,
    ) -> Result<AppConfig> {
        let mut builder = Config::builder();
        match path {
            // An explicit path must exist.
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if !pathbuf.exists() {
                    bail!("config file not found: {p}");
                }
                builder = builder.add_source(File::from(pathbuf).format(FileFormat::Toml));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path).format(FileFormat::Toml));
                }
            }
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .separator("__")
                .source(env),
        );

        let merged: AppConfig = builder
            .build()
            .context("config build error")?
            .try_deserialize()
            .context("config deserialize error")?;
        merged.validate()?;
        Ok(merged)
    }
}
