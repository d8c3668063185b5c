//! Dual-endpoint handshake scheduler.
//!
//! Drives a client and a server in lock-step over a [`Wire`]. The fuzz input
//! picks one handshake state as the injection target: the first side seen in
//! that state stops stepping and from then on writes raw payload into its
//! outbound channel, so the peer parses attacker bytes at exactly that point
//! of the handshake.

use shakedown_transport::{HandshakeEndpoint, HandshakeState, Role, StepOutcome, Wire};
use tracing::{debug, info, trace};

use crate::cursor::InputCursor;
use crate::report::{RunExit, RunReport, SideReport};

/// Injection target decoded from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Target(HandshakeState),
    /// Matches no state; injection is disabled for the rest of the run.
    NeverMatch,
}

impl Selector {
    /// Values outside the pre-completion range decode to `NeverMatch`.
    pub fn decode(raw: i32) -> Selector {
        match HandshakeState::from_value(raw) {
            Some(state) if state.is_pre_completion() => Selector::Target(state),
            _ => Selector::NeverMatch,
        }
    }

    pub fn matches(self, state: HandshakeState) -> bool {
        self == Selector::Target(state)
    }

    pub fn is_never_match(self) -> bool {
        self == Selector::NeverMatch
    }
}

pub struct FuzzScheduler<'a, C, S> {
    client: C,
    server: S,
    wire: Wire,
    cursor: InputCursor<'a>,
    raw_selector: i32,
    selector: Selector,
    injection_owner: Option<Role>,
    iterations: u64,
    client_stats: SideReport,
    server_stats: SideReport,
}

impl<'a, C, S> FuzzScheduler<'a, C, S>
where
    C: HandshakeEndpoint,
    S: HandshakeEndpoint,
{
    /// `cursor` must already be positioned past the selector.
    pub fn new(client: C, server: S, wire: Wire, raw_selector: i32, cursor: InputCursor<'a>) -> Self {
        let selector = Selector::decode(raw_selector);
        debug!(
            raw_selector,
            ?selector,
            payload = cursor.remaining_len(),
            "scheduler ready"
        );
        Self {
            client,
            server,
            wire,
            cursor,
            raw_selector,
            selector,
            injection_owner: None,
            iterations: 0,
            client_stats: SideReport::default(),
            server_stats: SideReport::default(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn server(&self) -> &S {
        &self.server
    }

    pub fn wire(&self) -> &Wire {
        &self.wire
    }

    pub fn selector(&self) -> Selector {
        self.selector
    }

    pub fn injection_owner(&self) -> Option<Role> {
        self.injection_owner
    }

    pub fn remaining_input(&self) -> &'a [u8] {
        self.cursor.remaining()
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn stats(&self, role: Role) -> &SideReport {
        match role {
            Role::Client => &self.client_stats,
            Role::Server => &self.server_stats,
        }
    }

    fn stats_mut(&mut self, role: Role) -> &mut SideReport {
        match role {
            Role::Client => &mut self.client_stats,
            Role::Server => &mut self.server_stats,
        }
    }

    fn state_of(&self, role: Role) -> HandshakeState {
        match role {
            Role::Client => self.client.state(),
            Role::Server => self.server.state(),
        }
    }

    /// Runs one iteration: the client's turn, then the server's.
    ///
    /// Returns the exit reason once the run is over. Completion and
    /// exhaustion are checked before the iteration starts; a fatal step
    /// ends it immediately.
    pub fn tick(&mut self) -> Option<RunExit> {
        if self.client.state().is_complete() || self.server.state().is_complete() {
            return Some(RunExit::Completed);
        }
        if self.cursor.is_exhausted() {
            return Some(RunExit::Exhausted);
        }

        self.iterations += 1;
        for role in Role::ORDER {
            if let Some(exit) = self.turn(role) {
                return Some(exit);
            }
        }
        None
    }

    fn turn(&mut self, role: Role) -> Option<RunExit> {
        let state = self.state_of(role);
        if self.selector.matches(state) || self.injection_owner == Some(role) {
            self.inject(role, state);
            return None;
        }

        let outcome = match role {
            Role::Client => self.client.step(self.wire.link(Role::Client)),
            Role::Server => self.server.step(self.wire.link(Role::Server)),
        };
        trace!(
            iteration = self.iterations,
            role = %role,
            state = %self.state_of(role),
            ?outcome,
            "step"
        );

        let stats = self.stats_mut(role);
        stats.steps += 1;
        if outcome.is_would_block() {
            stats.would_blocks += 1;
        }
        match outcome {
            StepOutcome::Progress => stats.progress += 1,
            StepOutcome::WouldBlockRead | StepOutcome::WouldBlockWrite => {}
            StepOutcome::Fatal(err) => {
                debug!(role = %role, error = %err, "endpoint failed");
                return Some(RunExit::Fatal {
                    role,
                    reason: err.to_string(),
                });
            }
        }
        None
    }

    fn inject(&mut self, role: Role, state: HandshakeState) {
        let payload = self.cursor.remaining();
        // A full channel accepts nothing this turn.
        let written = self.wire.link(role).outbound.write(payload).unwrap_or(0);
        self.cursor.advance(written);

        if self.injection_owner.is_none() {
            info!(
                role = %role,
                peer = %role.peer(),
                state = %state,
                bytes = written,
                pending = self.cursor.remaining_len(),
                "injection started"
            );
        } else {
            trace!(role = %role, bytes = written, "injected");
        }
        self.injection_owner = Some(role);
        self.selector = Selector::NeverMatch;

        let stats = self.stats_mut(role);
        stats.injections += 1;
        stats.injected_bytes += written;
    }

    /// Loops until the run ends and reports on it.
    pub fn run(mut self) -> RunReport {
        let exit = loop {
            if let Some(exit) = self.tick() {
                break exit;
            }
        };
        self.finish(exit)
    }

    /// Consumes the scheduler, dropping both endpoints and the wire.
    pub fn finish(mut self, exit: RunExit) -> RunReport {
        self.client_stats.final_state = Some(self.client.state());
        self.server_stats.final_state = Some(self.server.state());

        info!(
            exit = ?exit,
            iterations = self.iterations,
            owner = ?self.injection_owner,
            in_flight = self.wire.in_flight(),
            client_state = %self.client.state(),
            server_state = %self.server.state(),
            "run finished"
        );

        RunReport {
            exit,
            input_len: self.cursor.consumed() + self.cursor.remaining_len(),
            selector: Some(self.raw_selector),
            selector_in_range: !Selector::decode(self.raw_selector).is_never_match(),
            injection_owner: self.injection_owner,
            iterations: self.iterations,
            consumed_bytes: self.cursor.consumed(),
            client: self.client_stats,
            server: self.server_stats,
        }
    }
}
