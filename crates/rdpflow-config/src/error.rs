use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found")]
    ConfigDirNotFound,

    #[error(
        "Missing required setting: {key}\n\
        Set it in rdpflow.yaml (current directory or ~/.config/rdpflow/config.yaml)\n\
        or via the {env} environment variable"
    )]
    MissingSetting { key: &'static str, env: &'static str },

    #[error("Invalid setting {key}: {message}")]
    InvalidSetting { key: &'static str, message: String },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
