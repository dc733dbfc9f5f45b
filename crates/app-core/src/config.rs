//! Configuration management for the application.
//!
//! This module provides a `Config` struct that loads settings from a file and
//! overlays them with `APP_`-prefixed environment variables, so deployments
//! can override any key without editing the file. Configuration is read once
//! at startup and handed to the modules as explicit values; nothing in the
//! application mutates it afterwards.

use std::path::{Path, PathBuf};

use config::{Config as RawConfig, Environment, File};
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load or parse configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug)]
pub struct Config {
    inner: RawConfig,
}

impl Config {
    pub fn builder<P: AsRef<Path>>(path: P) -> ConfigBuilder {
        ConfigBuilder::new(path.as_ref().to_path_buf())
    }

    /// Fetches and deserializes the value at `key` (dot-separated).
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        self.inner.get(key).map_err(ConfigError::from)
    }
}

pub struct ConfigBuilder {
    path: PathBuf,
    env_prefix: String,
}

impl ConfigBuilder {
    fn new(path: PathBuf) -> Self {
        Self { path, env_prefix: "APP".to_string() }
    }

    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    pub fn build(self) -> Result<Config, ConfigError> {
        // Environment variables win over file values, e.g.
        // APP__ZOHO__CLIENT_SECRET overrides `zoho.client_secret`.
        let inner = RawConfig::builder()
            .add_source(File::from(self.path.as_path()).required(true))
            .add_source(Environment::with_prefix(&self.env_prefix).separator("__"))
            .build()?;

        Ok(Config { inner })
    }
}

pub mod test_utils {
    use std::collections::HashMap;

    use config::Value;

    use super::*;

    /// Builds an in-memory `Config` from literal key/value pairs for tests.
    #[derive(Default)]
    pub struct TestConfigBuilder {
        values: HashMap<String, Value>,
    }

    impl TestConfigBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with<T: Into<Value>>(mut self, key: &str, value: T) -> Self {
            self.values.insert(key.to_string(), value.into());
            self
        }

        pub fn build(self) -> Config {
            let mut builder = RawConfig::builder();

            for (key, value) in self.values {
                builder = builder.set_override(key, value).expect("override failed");
            }

            let inner = builder.build().expect("Failed to create config from test values");

            Config { inner }
        }
    }
}
