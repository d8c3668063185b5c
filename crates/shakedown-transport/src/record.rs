//! TLS record stream observation.
//!
//! `rustls` does not expose its internal handshake state, so the adapter
//! derives a [`HandshakeState`] from what an endpoint puts on and takes off
//! the wire. A [`RecordObserver`] reassembles one direction of the record
//! stream and reports [`WireEvent`]s; a [`HandshakeTracker`] maps the events
//! of both directions onto the state enumeration for one role.
//!
//! Only the plaintext part of a TLS 1.2 handshake is visible. After a
//! ChangeCipherSpec the observer reports encrypted handshake records without
//! looking inside them.

use bytes::{Buf, BytesMut};

use crate::endpoint::{HandshakeState, Role};

const RECORD_HEADER_LEN: usize = 5;
const HANDSHAKE_HEADER_LEN: usize = 4;

/// Largest record accepted before the stream is considered desynchronised
/// (2^14 plaintext plus the 2048 bytes of expansion TLS 1.2 allows).
pub const MAX_RECORD_LEN: usize = 16384 + 2048;

/// Cap on buffered handshake bytes awaiting a complete message.
const MAX_HANDSHAKE_BACKLOG: usize = 64 * 1024;

const CONTENT_CHANGE_CIPHER_SPEC: u8 = 20;
const CONTENT_ALERT: u8 = 21;
const CONTENT_HANDSHAKE: u8 = 22;
const CONTENT_APPLICATION_DATA: u8 = 23;

/// TLS handshake message type codes.
pub mod handshake_type {
    pub const HELLO_REQUEST: u8 = 0;
    pub const CLIENT_HELLO: u8 = 1;
    pub const SERVER_HELLO: u8 = 2;
    pub const NEW_SESSION_TICKET: u8 = 4;
    pub const CERTIFICATE: u8 = 11;
    pub const SERVER_KEY_EXCHANGE: u8 = 12;
    pub const CERTIFICATE_REQUEST: u8 = 13;
    pub const SERVER_HELLO_DONE: u8 = 14;
    pub const CERTIFICATE_VERIFY: u8 = 15;
    pub const CLIENT_KEY_EXCHANGE: u8 = 16;
    pub const FINISHED: u8 = 20;
}

/// Something observed on one direction of the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireEvent {
    /// A complete plaintext handshake message of the given type.
    Handshake(u8),
    ChangeCipherSpec,
    /// A handshake record sent after ChangeCipherSpec.
    EncryptedHandshake,
    Alert,
    ApplicationData,
}

/// Direction of a byte flow relative to the observing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Sent,
    Received,
}

/// Reassembles one direction of a TLS record stream.
///
/// Plaintext handshake records are parsed as their bytes arrive, so a
/// message is reported as soon as its last byte is seen even when the rest
/// of its record has not been. Every other record is reported when it ends.
#[derive(Debug, Clone, Default)]
pub struct RecordObserver {
    header: BytesMut,
    current: Option<OpenRecord>,
    handshake: BytesMut,
    cipher_active: bool,
    desynced: bool,
}

#[derive(Debug, Clone, Copy)]
struct OpenRecord {
    content_type: u8,
    remaining: usize,
}

impl RecordObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the stream stopped looking like TLS; no further events are
    /// reported after that.
    pub fn is_desynced(&self) -> bool {
        self.desynced
    }

    /// Feeds the next bytes of the stream and returns the events they
    /// completed, in wire order.
    pub fn feed(&mut self, mut bytes: &[u8]) -> Vec<WireEvent> {
        let mut events = Vec::new();
        while !bytes.is_empty() && !self.desynced {
            match self.current {
                None => {
                    let take = (RECORD_HEADER_LEN - self.header.len()).min(bytes.len());
                    self.header.extend_from_slice(&bytes[..take]);
                    bytes = &bytes[take..];
                    if self.header.len() == RECORD_HEADER_LEN {
                        self.open_record(&mut events);
                    }
                }
                Some(mut record) => {
                    let take = record.remaining.min(bytes.len());
                    let (chunk, rest) = bytes.split_at(take);
                    bytes = rest;
                    record.remaining -= take;
                    let done = record.remaining == 0;
                    self.current = if done { None } else { Some(record) };
                    self.on_fragment(record.content_type, chunk, done, &mut events);
                }
            }
        }
        events
    }

    /// Length of the shortest prefix of `bytes` that completes an event, or
    /// `None` if all of `bytes` completes nothing.
    pub fn lookahead(&self, bytes: &[u8]) -> Option<usize> {
        if self.desynced {
            return None;
        }
        let mut ahead = self.clone();
        for (i, byte) in bytes.iter().enumerate() {
            if !ahead.feed(std::slice::from_ref(byte)).is_empty() {
                return Some(i + 1);
            }
            if ahead.desynced {
                return None;
            }
        }
        None
    }

    fn open_record(&mut self, events: &mut Vec<WireEvent>) {
        let content_type = self.header[0];
        let len = u16::from_be_bytes([self.header[3], self.header[4]]) as usize;
        let known = (CONTENT_CHANGE_CIPHER_SPEC..=CONTENT_APPLICATION_DATA).contains(&content_type);
        if !known || self.header[1] != 3 || len > MAX_RECORD_LEN {
            self.desync();
            return;
        }
        self.header.clear();
        if len == 0 {
            self.on_fragment(content_type, &[], true, events);
        } else {
            self.current = Some(OpenRecord {
                content_type,
                remaining: len,
            });
        }
    }

    fn on_fragment(&mut self, content_type: u8, chunk: &[u8], done: bool, events: &mut Vec<WireEvent>) {
        match content_type {
            CONTENT_CHANGE_CIPHER_SPEC if done => {
                self.cipher_active = true;
                events.push(WireEvent::ChangeCipherSpec);
            }
            CONTENT_ALERT if done => events.push(WireEvent::Alert),
            CONTENT_HANDSHAKE if self.cipher_active => {
                if done {
                    events.push(WireEvent::EncryptedHandshake);
                }
            }
            CONTENT_HANDSHAKE => {
                if self.handshake.len() + chunk.len() > MAX_HANDSHAKE_BACKLOG {
                    self.desync();
                    return;
                }
                self.handshake.extend_from_slice(chunk);
                self.drain_handshake_messages(events);
            }
            CONTENT_APPLICATION_DATA if done => events.push(WireEvent::ApplicationData),
            _ => {}
        }
    }

    fn drain_handshake_messages(&mut self, events: &mut Vec<WireEvent>) {
        while self.handshake.len() >= HANDSHAKE_HEADER_LEN {
            let msg_type = self.handshake[0];
            let len = u32::from_be_bytes([0, self.handshake[1], self.handshake[2], self.handshake[3]])
                as usize;
            if self.handshake.len() < HANDSHAKE_HEADER_LEN + len {
                break;
            }
            self.handshake.advance(HANDSHAKE_HEADER_LEN + len);
            events.push(WireEvent::Handshake(msg_type));
        }
    }

    fn desync(&mut self) {
        tracing::trace!(header = self.header.len(), "record stream desynchronised");
        self.desynced = true;
        self.header.clear();
        self.current = None;
        self.handshake.clear();
    }
}

/// Derives the handshake state of one endpoint from its wire traffic.
///
/// The state only ever moves forward along the enumeration order; events
/// that would map to an earlier state are ignored.
#[derive(Debug)]
pub struct HandshakeTracker {
    role: Role,
    state: HandshakeState,
    sent: RecordObserver,
    received: RecordObserver,
}

impl HandshakeTracker {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            state: HandshakeState::HelloRequest,
            sent: RecordObserver::new(),
            received: RecordObserver::new(),
        }
    }

    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Marks the first step: the endpoint starts working on its hello.
    pub fn begin(&mut self) {
        self.advance(HandshakeState::ClientHello);
    }

    /// How many leading bytes of an outbound write complete the next
    /// observable event.
    pub fn sent_lookahead(&self, bytes: &[u8]) -> Option<usize> {
        self.sent.lookahead(bytes)
    }

    /// Same as [`sent_lookahead`](Self::sent_lookahead) for inbound bytes.
    pub fn received_lookahead(&self, bytes: &[u8]) -> Option<usize> {
        self.received.lookahead(bytes)
    }

    /// Records bytes the endpoint wrote to its outbound channel.
    pub fn on_sent(&mut self, bytes: &[u8]) {
        for event in self.sent.feed(bytes) {
            if let Some(next) = transition(self.role, Direction::Sent, event) {
                self.advance(next);
            }
        }
    }

    /// Records bytes the endpoint took from its inbound channel.
    pub fn on_received(&mut self, bytes: &[u8]) {
        for event in self.received.feed(bytes) {
            if let Some(next) = transition(self.role, Direction::Received, event) {
                self.advance(next);
            }
        }
    }

    /// Moves to `next` if it lies ahead of the current state. The terminal
    /// state is never left.
    pub fn advance(&mut self, next: HandshakeState) {
        if self.state.is_complete() || next <= self.state {
            return;
        }
        tracing::trace!(role = %self.role, from = %self.state, to = %next, "handshake state advanced");
        self.state = next;
    }
}

/// State an endpoint of `role` enters after observing `event`.
pub fn transition(role: Role, direction: Direction, event: WireEvent) -> Option<HandshakeState> {
    use handshake_type as ht;
    use Direction::{Received, Sent};
    use HandshakeState as S;
    use WireEvent::{ChangeCipherSpec, EncryptedHandshake, Handshake};

    let next = match (role, direction, event) {
        (Role::Client, Sent, Handshake(ht::CLIENT_HELLO)) => S::ServerHello,
        (Role::Client, Received, Handshake(ht::SERVER_HELLO)) => S::ServerCertificate,
        (Role::Client, Received, Handshake(ht::CERTIFICATE)) => S::ServerKeyExchange,
        (Role::Client, Received, Handshake(ht::SERVER_KEY_EXCHANGE)) => S::CertificateRequest,
        (Role::Client, Received, Handshake(ht::CERTIFICATE_REQUEST)) => S::ServerHelloDone,
        (Role::Client, Received, Handshake(ht::SERVER_HELLO_DONE)) => S::ClientCertificate,
        (Role::Client, Sent, Handshake(ht::CERTIFICATE)) => S::ClientKeyExchange,
        (Role::Client, Sent, Handshake(ht::CLIENT_KEY_EXCHANGE)) => S::CertificateVerify,
        (Role::Client, Sent, Handshake(ht::CERTIFICATE_VERIFY)) => S::ClientChangeCipherSpec,
        (Role::Client, Sent, ChangeCipherSpec) => S::ClientFinished,
        (Role::Client, Sent, EncryptedHandshake) => S::ServerChangeCipherSpec,
        (Role::Client, Received, Handshake(ht::NEW_SESSION_TICKET)) => S::ServerChangeCipherSpec,
        (Role::Client, Received, ChangeCipherSpec) => S::ServerFinished,
        (Role::Client, Received, EncryptedHandshake) => S::FlushBuffers,

        (Role::Server, Received, Handshake(ht::CLIENT_HELLO)) => S::ServerHello,
        (Role::Server, Sent, Handshake(ht::SERVER_HELLO)) => S::ServerCertificate,
        (Role::Server, Sent, Handshake(ht::CERTIFICATE)) => S::ServerKeyExchange,
        (Role::Server, Sent, Handshake(ht::SERVER_KEY_EXCHANGE)) => S::CertificateRequest,
        (Role::Server, Sent, Handshake(ht::CERTIFICATE_REQUEST)) => S::ServerHelloDone,
        (Role::Server, Sent, Handshake(ht::SERVER_HELLO_DONE)) => S::ClientCertificate,
        (Role::Server, Received, Handshake(ht::CERTIFICATE)) => S::ClientKeyExchange,
        (Role::Server, Received, Handshake(ht::CLIENT_KEY_EXCHANGE)) => S::CertificateVerify,
        (Role::Server, Received, Handshake(ht::CERTIFICATE_VERIFY)) => S::ClientChangeCipherSpec,
        (Role::Server, Received, ChangeCipherSpec) => S::ClientFinished,
        (Role::Server, Received, EncryptedHandshake) => S::ServerChangeCipherSpec,
        (Role::Server, Sent, Handshake(ht::NEW_SESSION_TICKET)) => S::ServerChangeCipherSpec,
        (Role::Server, Sent, ChangeCipherSpec) => S::ServerFinished,
        (Role::Server, Sent, EncryptedHandshake) => S::FlushBuffers,

        _ => return None,
    };
    Some(next)
}
