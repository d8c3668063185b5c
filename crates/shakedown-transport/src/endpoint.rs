//! Handshake endpoint contract.
//!
//! The scheduler never looks inside a protocol engine. It only needs to know
//! where an endpoint is in the handshake and how to nudge it forward by one
//! unit, so every engine is adapted to the narrow [`HandshakeEndpoint`] trait.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::channel::ChannelPair;
use crate::error::{Result, TransportError};

/// Which side of the handshake an endpoint plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Client,
    Server,
}

impl Role {
    /// Evaluation order within one scheduler iteration.
    pub const ORDER: [Role; 2] = [Role::Client, Role::Server];

    pub fn peer(self) -> Role {
        match self {
            Role::Client => Role::Server,
            Role::Server => Role::Client,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Server => "server",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of an endpoint in the handshake.
///
/// The discriminants are stable: fuzz inputs select an injection target by
/// value, so renumbering would invalidate every stored crash input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum HandshakeState {
    HelloRequest = 0,
    ClientHello = 1,
    ServerHello = 2,
    ServerCertificate = 3,
    ServerKeyExchange = 4,
    CertificateRequest = 5,
    ServerHelloDone = 6,
    ClientCertificate = 7,
    ClientKeyExchange = 8,
    CertificateVerify = 9,
    ClientChangeCipherSpec = 10,
    ClientFinished = 11,
    ServerChangeCipherSpec = 12,
    ServerFinished = 13,
    FlushBuffers = 14,
    HandshakeWrapup = 15,
    /// Terminal state.
    HandshakeOver = 16,
    ServerNewSessionTicket = 17,
    ServerHelloVerifyRequestSent = 18,
}

impl HandshakeState {
    /// Every state, in discriminant order.
    pub const ALL: [HandshakeState; 19] = [
        HandshakeState::HelloRequest,
        HandshakeState::ClientHello,
        HandshakeState::ServerHello,
        HandshakeState::ServerCertificate,
        HandshakeState::ServerKeyExchange,
        HandshakeState::CertificateRequest,
        HandshakeState::ServerHelloDone,
        HandshakeState::ClientCertificate,
        HandshakeState::ClientKeyExchange,
        HandshakeState::CertificateVerify,
        HandshakeState::ClientChangeCipherSpec,
        HandshakeState::ClientFinished,
        HandshakeState::ServerChangeCipherSpec,
        HandshakeState::ServerFinished,
        HandshakeState::FlushBuffers,
        HandshakeState::HandshakeWrapup,
        HandshakeState::HandshakeOver,
        HandshakeState::ServerNewSessionTicket,
        HandshakeState::ServerHelloVerifyRequestSent,
    ];

    /// Looks a state up by its discriminant.
    pub fn from_value(value: i32) -> Option<HandshakeState> {
        usize::try_from(value)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
    }

    pub fn value(self) -> i32 {
        self as i32
    }

    pub fn is_complete(self) -> bool {
        self == HandshakeState::HandshakeOver
    }

    /// Whether a state can be reached before the handshake completes, which
    /// is what makes it a meaningful injection target.
    pub fn is_pre_completion(self) -> bool {
        !self.is_complete()
    }
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.value())
    }
}

/// Result of one [`HandshakeEndpoint::step`].
#[derive(Debug)]
pub enum StepOutcome {
    /// Some protocol work was done; the state may have advanced.
    Progress,
    /// The endpoint needs inbound bytes that are not there yet.
    WouldBlockRead,
    /// The endpoint has output but its outbound channel is full.
    WouldBlockWrite,
    /// The engine gave up on the handshake.
    Fatal(TransportError),
}

impl StepOutcome {
    pub fn is_would_block(&self) -> bool {
        matches!(self, StepOutcome::WouldBlockRead | StepOutcome::WouldBlockWrite)
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, StepOutcome::Fatal(_))
    }
}

/// Adapter over one side of an external handshake engine.
pub trait HandshakeEndpoint {
    fn role(&self) -> Role;

    /// Current handshake state. Must not change except through `step`.
    fn state(&self) -> HandshakeState;

    /// Attempts one unit of progress against the channels bound to this
    /// endpoint's role.
    fn step(&mut self, link: ChannelPair<'_>) -> StepOutcome;
}

impl<E: HandshakeEndpoint + ?Sized> HandshakeEndpoint for Box<E> {
    fn role(&self) -> Role {
        (**self).role()
    }

    fn state(&self) -> HandshakeState {
        (**self).state()
    }

    fn step(&mut self, link: ChannelPair<'_>) -> StepOutcome {
        (**self).step(link)
    }
}

/// Builds a fresh client/server pair for each run.
pub trait EndpointFactory {
    type Client: HandshakeEndpoint;
    type Server: HandshakeEndpoint;

    fn build(&self) -> Result<(Self::Client, Self::Server)>;
}
