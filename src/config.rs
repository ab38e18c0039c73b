//! Configuration loading
//!
//! Loads connection parameters and run options from environment variables,
//! optionally reading from a .env file first. The resulting [`RunConfig`] is
//! built once and passed by reference to every stage of the run.

use crate::prelude::DataDictError;
use std::{env, path::Path, path::PathBuf};
use tracing::{debug, error, trace, warn};

/// Number of rows sampled from each table
pub const DEFAULT_SAMPLE_LIMIT: usize = 5;

/// Run configuration
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub output_dir: PathBuf,
    /// Databases to document; empty means all user databases
    pub database_filter: Vec<String>,
    pub sample_limit: usize,
    pub pii_protection: bool,
}

/// Read `primary`, falling back to `fallback` when unset or empty
fn var_with_fallback(primary: &str, fallback: &str) -> Option<String> {
    [primary, fallback]
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.is_empty())
}

/// Parse a boolean flag such as `true`, `1`, `yes`, `on`
fn parse_flag(name: &str, value: &str) -> Result<bool, DataDictError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => {
            error!(variable = name, value = ?value, "Invalid boolean value");
            Err(DataDictError::Config(format!(
                "{} must be one of true/false/1/0/yes/no/on/off",
                name
            )))
        }
    }
}

/// Split a comma-separated list, dropping blank entries
pub fn parse_name_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

impl RunConfig {
    /// Load configuration from environment variables
    ///
    /// Expected variables:
    /// - DB_USER / MYSQL_USER (required)
    /// - DB_PASSWORD / MYSQL_PASSWORD (required)
    /// - DB_HOST / MYSQL_HOST (default: localhost)
    /// - DB_PORT / MYSQL_PORT (default: 3306)
    /// - OUTPUT_DIR (default: data_dictionary)
    /// - DB_DATABASE_FILTER (comma-separated, default: all databases)
    /// - PII_PROTECTION (default: true)
    pub fn from_env() -> Result<Self, DataDictError> {
        debug!("Loading run configuration from environment");

        let host = var_with_fallback("DB_HOST", "MYSQL_HOST").unwrap_or_else(|| {
            trace!("DB_HOST not set, using default");
            "localhost".to_string()
        });

        let port_str = var_with_fallback("DB_PORT", "MYSQL_PORT").unwrap_or_else(|| {
            trace!("DB_PORT not set, using default");
            "3306".to_string()
        });

        let port = port_str.trim().parse::<u16>().map_err(|e| {
            error!(port = ?port_str, error = ?e, "Invalid DB_PORT value");
            DataDictError::Config("DB_PORT must be a valid port number".to_string())
        })?;

        let user = var_with_fallback("DB_USER", "MYSQL_USER").ok_or_else(|| {
            error!("DB_USER environment variable is not set");
            DataDictError::Config("DB_USER environment variable is required".to_string())
        })?;

        // An empty password is valid for accounts without one
        let password = env::var("DB_PASSWORD")
            .or_else(|_| env::var("MYSQL_PASSWORD"))
            .map_err(|_| {
                error!("DB_PASSWORD environment variable is not set");
                DataDictError::Config("DB_PASSWORD environment variable is required".to_string())
            })?;

        let output_dir = env::var("OUTPUT_DIR")
            .ok()
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                trace!("OUTPUT_DIR not set, using default");
                PathBuf::from("data_dictionary")
            });

        let database_filter = env::var("DB_DATABASE_FILTER")
            .map(|raw| parse_name_list(&raw))
            .unwrap_or_default();

        let pii_protection = match env::var("PII_PROTECTION") {
            Ok(value) => parse_flag("PII_PROTECTION", &value)?,
            Err(_) => true,
        };

        debug!(
            host = ?host,
            port = ?port,
            user = ?user,
            output_dir = ?output_dir,
            database_filter = ?database_filter,
            pii_protection = ?pii_protection,
            "Configuration loaded"
        );

        Ok(Self {
            host,
            port,
            user,
            password,
            output_dir,
            database_filter,
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            pii_protection,
        })
    }

    /// Load a .env file and then read configuration from environment
    pub fn load(env_file: &Path) -> Result<Self, DataDictError> {
        if env_file.exists() {
            debug!(path = ?env_file, "Loading environment file");
            dotenvy::from_path(env_file).map_err(|e| {
                error!(path = ?env_file, error = ?e, "Failed to load environment file");
                DataDictError::Config(format!("Failed to load {}: {}", env_file.display(), e))
            })?;
        } else {
            warn!(path = ?env_file, "Environment file not found, using existing environment");
        }

        Self::from_env()
    }

    /// Connection target with the password redacted (for logs and error messages)
    pub fn redacted_connection_string(&self) -> String {
        format!("mysql://{}:***@{}:{}", self.user, self.host, self.port)
    }
}
