use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unknown scheduling policy: {0}")]
    UnknownPolicy(String),

    #[error("Duplicate queue name: {0}")]
    DuplicateQueue(String),

    #[error("Invalid queue definition '{queue}': {reason}")]
    InvalidQueue { queue: String, reason: String },

    #[error("Invalid config value for {key}: {value}")]
    InvalidConfig { key: String, value: String },
}
