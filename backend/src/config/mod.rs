//! Application configuration from the environment.
//!
//! | Variable                   | Default                  |
//! |----------------------------|--------------------------|
//! | `NUMFMT_PORT`              | `3000`                   |
//! | `NUMFMT_SETTINGS`          | `.numfmt/settings.json`  |
//! | `NUMFMT_MAX_UPLOAD_BYTES`  | `52428800` (50 MB)       |
//!
//! A `.env` file is loaded first when present.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{ConfigError, ConfigResult};
use crate::settings::DEFAULT_SETTINGS_PATH;

pub const ENV_PORT: &str = "NUMFMT_PORT";
pub const ENV_SETTINGS: &str = "NUMFMT_SETTINGS";
pub const ENV_MAX_UPLOAD_BYTES: &str = "NUMFMT_MAX_UPLOAD_BYTES";

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Runtime configuration shared by the CLI and the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub settings_path: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            settings_path: PathBuf::from(DEFAULT_SETTINGS_PATH),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl AppConfig {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Unset or blank variables
    /// keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            port: match get(ENV_PORT) {
                Some(v) => parse_var(ENV_PORT, &v)?,
                None => defaults.port,
            },
            settings_path: get(ENV_SETTINGS)
                .map(PathBuf::from)
                .unwrap_or(defaults.settings_path),
            max_upload_bytes: match get(ENV_MAX_UPLOAD_BYTES) {
                Some(v) => parse_var(ENV_MAX_UPLOAD_BYTES, &v)?,
                None => defaults.max_upload_bytes,
            },
        })
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

fn parse_var<T: FromStr>(var: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var: var.to_string(),
        value: value.to_string(),
    })
}
