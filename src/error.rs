use thiserror::Error;

#[derive(Debug, Error)]
pub enum HubError {
    #[error("unknown channel code {0}")]
    UnknownChannelCode(u8),
    #[error("unknown channel '{0}'")]
    UnknownChannelName(String),
    #[error("failed to read config file: {0}")]
    ConfigIo(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
