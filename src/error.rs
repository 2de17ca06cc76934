use std::path::PathBuf;

/// Errors raised by the learned agent.
#[derive(Debug, thiserror::Error)]
pub enum GanglionError {
    #[error("unrecognized piece type {piece_type} on square {square}")]
    Encoding { square: u8, piece_type: u8 },

    #[error("tensor error: {0}")]
    Tensor(#[from] tch::TchError),

    #[error("invalid sampling weights: {0}")]
    Sampling(#[from] rand::distributions::WeightedError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
