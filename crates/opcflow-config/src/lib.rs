//! Configuration for the `opc` client
//!
//! Settings come from a YAML file and are then overridden by `OPC_*`
//! environment variables. When no file exists the environment alone may
//! supply every required setting.
//!
//! ```yaml
//! identity_domain: idcs-4a2b
//! username: admin@example.com
//! password: secret
//! endpoint: https://lbaas-1234.balancer.oraclecloud.com
//! region: uscom-central-1
//! max_retries: 3
//! poll_interval_secs: 30
//! timeout_secs: 3600
//! ```

pub mod error;

pub use error::*;

use opcflow_core::{AuthScheme, ClientConfig, Credentials};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Points directly at a configuration file
pub const CONFIG_PATH_ENV: &str = "OPC_CONFIG_PATH";

const CONFIG_FILE_NAME: &str = "opc.yaml";

/// Upper bound for `timeout_secs` and `poll_interval_secs` (7 days)
pub const MAX_WAIT_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthKind {
    #[default]
    Basic,
    Bearer,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpcConfig {
    pub identity_domain: String,
    pub username: String,
    pub password: String,
    /// Base URL of the REST endpoint
    pub endpoint: String,
    pub region: Option<String>,
    pub max_retries: u32,
    pub poll_interval_secs: u64,
    pub timeout_secs: u64,
    pub auth: AuthKind,
    pub token: Option<String>,
}

impl Default for OpcConfig {
    fn default() -> Self {
        Self {
            identity_domain: String::new(),
            username: String::new(),
            password: String::new(),
            endpoint: String::new(),
            region: None,
            max_retries: 1,
            poll_interval_secs: 30,
            timeout_secs: 3600,
            auth: AuthKind::Basic,
            token: None,
        }
    }
}

impl fmt::Debug for OpcConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpcConfig")
            .field("identity_domain", &self.identity_domain)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("max_retries", &self.max_retries)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("timeout_secs", &self.timeout_secs)
            .field("auth", &self.auth)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl OpcConfig {
    pub fn from_yaml_str(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `OPC_*` environment variables on top of the current values.
    ///
    /// Empty variables are ignored. `OPC_TOKEN` also selects bearer auth.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(v) = env_var("OPC_IDENTITY_DOMAIN") {
            self.identity_domain = v;
        }
        if let Some(v) = env_var("OPC_USERNAME") {
            self.username = v;
        }
        if let Some(v) = env_var("OPC_PASSWORD") {
            self.password = v;
        }
        if let Some(v) = env_var("OPC_ENDPOINT") {
            self.endpoint = v;
        }
        if let Some(v) = env_var("OPC_REGION") {
            self.region = Some(v);
        }
        if let Some(v) = env_var("OPC_MAX_RETRIES") {
            self.max_retries = v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "OPC_MAX_RETRIES".to_string(),
                value: v.clone(),
            })?;
        }
        if let Some(v) = env_var("OPC_TOKEN") {
            self.token = Some(v);
            self.auth = AuthKind::Bearer;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.identity_domain.trim().is_empty() {
            return Err(ConfigError::MissingField("identity_domain"));
        }
        if self.username.trim().is_empty() {
            return Err(ConfigError::MissingField("username"));
        }
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingField("endpoint"));
        }
        match self.auth {
            AuthKind::Basic if self.password.is_empty() => {
                return Err(ConfigError::MissingField("password"));
            }
            AuthKind::Bearer if self.token.as_deref().is_none_or(str::is_empty) => {
                return Err(ConfigError::MissingField("token"));
            }
            _ => {}
        }
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(ConfigError::InvalidEndpoint(self.endpoint.clone()));
        }
        if self.poll_interval_secs == 0 || self.poll_interval_secs > MAX_WAIT_SECS {
            return Err(ConfigError::InvalidValue {
                key: "poll_interval_secs".to_string(),
                value: self.poll_interval_secs.to_string(),
            });
        }
        if self.timeout_secs > MAX_WAIT_SECS {
            return Err(ConfigError::InvalidValue {
                key: "timeout_secs".to_string(),
                value: self.timeout_secs.to_string(),
            });
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn to_client_config(&self) -> ClientConfig {
        let credentials = Credentials::new(
            self.identity_domain.as_str(),
            self.username.as_str(),
            self.password.as_str(),
        );
        let mut config = ClientConfig::new(self.endpoint.trim_end_matches('/'), credentials);
        config.auth = match self.auth {
            AuthKind::Basic => AuthScheme::Basic,
            AuthKind::Bearer => AuthScheme::Bearer {
                token: self.token.clone().unwrap_or_default(),
            },
        };
        config.region = self.region.clone();
        config.max_retries = self.max_retries;
        config.poll_interval = self.poll_interval();
        config.poll_timeout = self.timeout();
        config
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// `<config dir>/opcflow`
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("opcflow"))
}

/// Locate the configuration file.
///
/// Search order:
/// 1. `OPC_CONFIG_PATH`
/// 2. `./opc.yaml`
/// 3. `./.opcflow/opc.yaml`
/// 4. `<config dir>/opcflow/opc.yaml`
pub fn find_config_file() -> Result<PathBuf> {
    if let Some(config_path) = env_var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        debug!("{} points at a missing file: {}", CONFIG_PATH_ENV, path.display());
    }

    let current_dir = std::env::current_dir()?;

    let path = current_dir.join(CONFIG_FILE_NAME);
    if path.exists() {
        return Ok(path);
    }

    let path = current_dir.join(".opcflow").join(CONFIG_FILE_NAME);
    if path.exists() {
        return Ok(path);
    }

    if let Some(config_dir) = get_config_dir() {
        let path = config_dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            return Ok(path);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

/// Load, apply environment overrides and validate.
///
/// An explicit path must exist. Without one the search order of
/// [`find_config_file`] applies, and finding nothing leaves the environment
/// as the only source.
pub fn load(explicit: Option<&Path>) -> Result<OpcConfig> {
    let mut config = match explicit {
        Some(path) if !path.exists() => return Err(ConfigError::MissingFile(path.to_path_buf())),
        Some(path) => OpcConfig::from_file(path)?,
        None => match find_config_file() {
            Ok(path) => {
                debug!("Loading configuration from {}", path.display());
                OpcConfig::from_file(&path)?
            }
            Err(ConfigError::ConfigFileNotFound) => {
                debug!("No configuration file found, using environment only");
                OpcConfig::default()
            }
            Err(e) => return Err(e),
        },
    };
    config.apply_env_overrides()?;
    config.validate()?;
    Ok(config)
}
