use thiserror::Error;

/// Back-pressure signal from a [`ByteChannel`](crate::channel::ByteChannel).
///
/// Returned by `write` when the channel is already full and by `read` when
/// it is empty, so "no room" is never confused with "wrote nothing".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation would block")]
pub struct WouldBlock;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("TLS engine error: {0}")]
    Tls(#[from] rustls::Error),

    #[error("TLS setup failed: {reason}")]
    TlsSetup { reason: String },

    #[error("invalid server name: {name}")]
    InvalidServerName { name: String },

    #[error("protocol engine reported fatal code {0}")]
    EngineFatal(i32),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
