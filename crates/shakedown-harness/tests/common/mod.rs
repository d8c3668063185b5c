//! Scripted endpoints for exercising the scheduler without a TLS engine.

#![allow(dead_code)]

use std::cell::Cell;

use shakedown_transport::{
    ChannelPair, EndpointFactory, HandshakeEndpoint, HandshakeState, Result, Role, StepOutcome,
    TransportError,
};

/// Endpoint that walks a fixed list of states, one per step, and swallows
/// everything its peer sends.
#[derive(Debug, Clone)]
pub struct ScriptedEndpoint {
    role: Role,
    state: HandshakeState,
    script: Vec<HandshakeState>,
    next: usize,
    steps: u64,
    received: Vec<u8>,
    fatal_on_step: Option<u64>,
    blocked: bool,
    deaf: bool,
}

impl ScriptedEndpoint {
    pub fn new(role: Role, initial: HandshakeState) -> Self {
        Self {
            role,
            state: initial,
            script: Vec::new(),
            next: 0,
            steps: 0,
            received: Vec::new(),
            fatal_on_step: None,
            blocked: false,
            deaf: false,
        }
    }

    /// States entered on successive steps.
    pub fn then(mut self, states: &[HandshakeState]) -> Self {
        self.script.extend_from_slice(states);
        self
    }

    /// Fails on the n-th step (1-based).
    pub fn fatal_on_step(mut self, n: u64) -> Self {
        self.fatal_on_step = Some(n);
        self
    }

    /// Never advances.
    pub fn blocked(mut self) -> Self {
        self.blocked = true;
        self
    }

    /// Leaves inbound bytes in the channel.
    pub fn deaf(mut self) -> Self {
        self.deaf = true;
        self
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn received(&self) -> &[u8] {
        &self.received
    }
}

impl HandshakeEndpoint for ScriptedEndpoint {
    fn role(&self) -> Role {
        self.role
    }

    fn state(&self) -> HandshakeState {
        self.state
    }

    fn step(&mut self, link: ChannelPair<'_>) -> StepOutcome {
        self.steps += 1;
        if !self.deaf {
            if let Ok(bytes) = link.inbound.read(usize::MAX) {
                self.received.extend(bytes);
            }
        }
        if self.fatal_on_step == Some(self.steps) {
            return StepOutcome::Fatal(TransportError::EngineFatal(-1));
        }
        if self.blocked {
            return StepOutcome::WouldBlockRead;
        }
        match self.script.get(self.next) {
            Some(&state) => {
                self.state = state;
                self.next += 1;
                StepOutcome::Progress
            }
            None => StepOutcome::WouldBlockRead,
        }
    }
}

/// Hands out clones of two template endpoints and counts builds.
#[derive(Debug)]
pub struct ScriptedFactory {
    client: ScriptedEndpoint,
    server: ScriptedEndpoint,
    builds: Cell<u32>,
}

impl ScriptedFactory {
    pub fn new(client: ScriptedEndpoint, server: ScriptedEndpoint) -> Self {
        Self {
            client,
            server,
            builds: Cell::new(0),
        }
    }

    pub fn builds(&self) -> u32 {
        self.builds.get()
    }
}

impl EndpointFactory for ScriptedFactory {
    type Client = ScriptedEndpoint;
    type Server = ScriptedEndpoint;

    fn build(&self) -> Result<(ScriptedEndpoint, ScriptedEndpoint)> {
        self.builds.set(self.builds.get() + 1);
        Ok((self.client.clone(), self.server.clone()))
    }
}

/// A client that runs to completion on its own.
pub fn completing_client() -> ScriptedEndpoint {
    use HandshakeState::*;
    ScriptedEndpoint::new(Role::Client, HelloRequest).then(&[
        ClientHello,
        ServerHello,
        ServerCertificate,
        ServerHelloDone,
        ClientKeyExchange,
        ClientChangeCipherSpec,
        ClientFinished,
        ServerChangeCipherSpec,
        ServerFinished,
        FlushBuffers,
        HandshakeOver,
    ])
}

/// Selector bytes followed by `payload`.
pub fn input(selector: i32, payload: &[u8]) -> Vec<u8> {
    let mut data = selector.to_ne_bytes().to_vec();
    data.extend_from_slice(payload);
    data
}
