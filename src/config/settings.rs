//! TOML-based configuration.
//!
//! Supports a config file (cluster-schema.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [connection]
//! connection_string = "Data Source=https://help.kusto.windows.net;AAD Federated Security=True"
//! default_domain = ".kusto.windows.net"
//! admin_database = "NetDefaultDB"
//!
//! [loader]
//! strict = false
//! follow_up_concurrency = 4
//! negative_cache_on_failure = false
//!
//! [bridge]
//! path = "${HOME}/bin/cluster-schema-bridge"
//! timeout_secs = 30
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::connection::{ConnectionDescriptor, ConnectionError};
use super::resolver::{EndpointResolver, ADMIN_DATABASE, DEFAULT_DOMAIN};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid connection: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Bridge binary not found. Set bridge.path in config")]
    BridgeNotFound,
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Default connection and endpoint resolution.
    pub connection: ConnectionSettings,

    /// Loader behavior.
    pub loader: LoaderSettings,

    /// Bridge process configuration.
    pub bridge: BridgeSettings,
}

/// Default connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Connection string (supports ${ENV_VAR} expansion).
    pub connection_string: String,

    /// Domain appended to short cluster names. Must start with `.`.
    pub default_domain: String,

    /// Catalog used for cross-database control commands.
    pub admin_database: String,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            connection_string: String::new(),
            default_domain: DEFAULT_DOMAIN.to_string(),
            admin_database: ADMIN_DATABASE.to_string(),
        }
    }
}

impl ConnectionSettings {
    /// Get the connection string with environment variables expanded.
    pub fn resolved_connection_string(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.connection_string)
    }

    /// Parse the default connection descriptor.
    pub fn descriptor(&self) -> Result<ConnectionDescriptor, SettingsError> {
        Ok(ConnectionDescriptor::parse(&self.resolved_connection_string()?)?)
    }

    /// Build the endpoint resolver for this connection.
    pub fn resolver(&self) -> Result<EndpointResolver, SettingsError> {
        Ok(EndpointResolver::new(self.descriptor()?, Some(&self.default_domain))?
            .with_admin_database(self.admin_database.clone()))
    }
}

/// Loader configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoaderSettings {
    /// Propagate command failures instead of returning no result.
    pub strict: bool,

    /// Maximum in-flight describe calls in the two-step assemblers.
    pub follow_up_concurrency: usize,

    /// Record a database as missing when its table schema command fails,
    /// not only when the server reports it absent.
    pub negative_cache_on_failure: bool,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            strict: false,
            follow_up_concurrency: 1,
            negative_cache_on_failure: false,
        }
    }
}

/// Bridge configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BridgeSettings {
    /// Path to the bridge binary.
    pub path: Option<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            path: None,
            timeout_secs: 30,
        }
    }
}

impl BridgeSettings {
    /// Get the bridge binary path.
    ///
    /// Returns the configured path, or searches common locations and `PATH`.
    /// A configured path that references an unset variable is an error.
    pub fn resolve_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        if let Some(path) = &self.path {
            return Ok(Some(PathBuf::from(expand_env_vars(path)?)));
        }

        Ok(Self::search_path())
    }

    fn search_path() -> Option<PathBuf> {
        let candidates = ["./cluster-schema-bridge", "./bridge/cluster-schema-bridge"];
        for candidate in candidates {
            let path = PathBuf::from(candidate);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(output) = std::process::Command::new("which")
            .arg("cluster-schema-bridge")
            .output()
        {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    return Some(PathBuf::from(path));
                }
            }
        }

        None
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `CLUSTER_SCHEMA_CONFIG`
    /// 2. `./cluster-schema.toml`
    /// 3. `~/.config/cluster-schema/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("CLUSTER_SCHEMA_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("cluster-schema.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("cluster-schema").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.connection.default_domain.starts_with('.') {
            return Err(SettingsError::Connection(ConnectionError::InvalidDomain(
                self.connection.default_domain.clone(),
            )));
        }
        if self.loader.follow_up_concurrency == 0 {
            return Err(SettingsError::InvalidConfig(
                "loader.follow_up_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.peek() == Some(&'{') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            while let Some(&ch) = chars.peek() {
                if !(ch.is_alphanumeric() || ch == '_') {
                    break;
                }
                var_name.push(ch);
                chars.next();
            }
            if var_name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
        }

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name))?;
        result.push_str(&value);
    }

    Ok(result)
}
