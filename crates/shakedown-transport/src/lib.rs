//! Shakedown transport: bounded in-memory byte channels, the handshake
//! endpoint contract, and the `rustls` adapter driven by the fuzz harness.

pub mod channel;
pub mod endpoint;
pub mod entropy;
pub mod error;
pub mod record;
pub mod tls;

pub use channel::{ByteChannel, ChannelPair, Wire, CHANNEL_CAPACITY};
pub use endpoint::{EndpointFactory, HandshakeEndpoint, HandshakeState, Role, StepOutcome};
pub use error::{Result, TransportError, WouldBlock};
pub use tls::{PresharedCredential, TlsEndpoint, TlsEndpointFactory, TlsHandshakeConfig};
