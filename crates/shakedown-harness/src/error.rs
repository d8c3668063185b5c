use shakedown_transport::TransportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("invalid configuration: {reason}")]
    Config { reason: String },

    #[error("unsupported config file extension: {0}")]
    UnsupportedConfigFormat(String),

    #[error("endpoint setup failed: {0}")]
    Setup(#[from] TransportError),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HarnessError>;
