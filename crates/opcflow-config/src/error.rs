use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "No configuration file found. Searched:\n\
        - $OPC_CONFIG_PATH\n\
        - ./opc.yaml\n\
        - ./.opcflow/opc.yaml\n\
        - ~/.config/opcflow/opc.yaml"
    )]
    ConfigFileNotFound,

    #[error("Configuration file does not exist: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required setting: {0}")]
    MissingField(&'static str),

    #[error("Endpoint must be an http(s) URL: {0}")]
    InvalidEndpoint(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
