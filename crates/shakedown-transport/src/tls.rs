//! `rustls` adapter for the handshake endpoint contract.
//!
//! Both sides run TLS 1.2 over the in-memory channels with a
//! [seeded crypto provider](crate::entropy::seeded_provider), so a fuzz input
//! replays the same handshake bytes every time. The client accepts any server
//! certificate (handshake signatures are still checked against it) and the
//! server identity is derived from a fixed pre-shared credential pair, which
//! lets the exchange run deep into the state space without a PKI.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::Resumption;
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, WebPkiSupportedAlgorithms};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer, ServerName, UnixTime};
use rustls::server::NoServerSessionStorage;
use rustls::{ClientConfig, ClientConnection, Connection, DigitallySignedStruct, ServerConfig, ServerConnection, SignatureScheme};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::channel::{ByteChannel, ChannelPair};
use crate::endpoint::{EndpointFactory, HandshakeEndpoint, HandshakeState, Role, StepOutcome};
use crate::entropy::{seeded_provider, HANDSHAKE_ENTROPY};
use crate::error::{Result, TransportError};
use crate::record::HandshakeTracker;

/// RFC 8410 PKCS#8 v1 prefix for a bare Ed25519 private key.
const ED25519_PKCS8_PREFIX: [u8; 16] = [
    0x30, 0x2e, 0x02, 0x01, 0x00, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x04, 0x22, 0x04, 0x20,
];

/// Fixed identity/secret pair both sides are configured with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresharedCredential {
    pub identity: String,
    pub secret: String,
}

impl Default for PresharedCredential {
    fn default() -> Self {
        Self {
            identity: "42".to_string(),
            secret: "galaxy".to_string(),
        }
    }
}

/// PEM files overriding the credential-derived server identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PemIdentity {
    /// PEM-encoded certificate chain (leaf first).
    pub cert_chain: PathBuf,
    /// PEM-encoded PKCS#8 private key.
    pub private_key: PathBuf,
}

/// Configuration shared by both handshake participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsHandshakeConfig {
    /// Seed the engine's randomness is reset to before every run.
    pub rng_seed: String,
    pub credential: PresharedCredential,
    /// Name the client asks for (SNI) and the derived certificate carries.
    pub server_name: String,
    pub identity_pem: Option<PemIdentity>,
}

impl Default for TlsHandshakeConfig {
    fn default() -> Self {
        Self {
            rng_seed: "test".to_string(),
            credential: PresharedCredential::default(),
            server_name: "localhost".to_string(),
            identity_pem: None,
        }
    }
}

/// A server certificate chain with its private key.
#[derive(Debug)]
pub struct ServerIdentity {
    pub cert_chain: Vec<CertificateDer<'static>>,
    pub private_key: PrivateKeyDer<'static>,
}

impl ServerIdentity {
    /// Derives an Ed25519 key and a self-signed certificate from `credential`.
    ///
    /// Both are pure functions of the credential and `server_name`, so every
    /// process presents byte-identical server certificates.
    pub fn from_credential(credential: &PresharedCredential, server_name: &str) -> Result<Self> {
        let mut hasher = Sha256::new();
        hasher.update(credential.identity.as_bytes());
        hasher.update([0u8]);
        hasher.update(credential.secret.as_bytes());
        let seed: [u8; 32] = hasher.finalize().into();

        let mut pkcs8 = Vec::with_capacity(ED25519_PKCS8_PREFIX.len() + seed.len());
        pkcs8.extend_from_slice(&ED25519_PKCS8_PREFIX);
        pkcs8.extend_from_slice(&seed);

        let key_pair = rcgen::KeyPair::try_from(pkcs8.as_slice()).map_err(|e| TransportError::TlsSetup {
            reason: format!("failed to load derived key: {}", e),
        })?;

        let mut params = rcgen::CertificateParams::new(vec![server_name.to_string()]).map_err(|e| {
            TransportError::TlsSetup {
                reason: format!("failed to create certificate params: {}", e),
            }
        })?;
        params.serial_number = Some(rcgen::SerialNumber::from_slice(&[1]));

        let cert = params.self_signed(&key_pair).map_err(|e| TransportError::TlsSetup {
            reason: format!("failed to create self-signed certificate: {}", e),
        })?;

        Ok(Self {
            cert_chain: vec![cert.der().clone()],
            private_key: PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(pkcs8)),
        })
    }

    /// Loads a certificate chain and key from PEM data.
    pub fn from_pem(cert_chain_pem: &[u8], private_key_pem: &[u8]) -> Result<Self> {
        Ok(Self {
            cert_chain: load_certs_from_pem(cert_chain_pem)?,
            private_key: load_private_key_from_pem(private_key_pem)?,
        })
    }

    /// Resolves the identity a configuration asks for.
    pub fn from_config(config: &TlsHandshakeConfig) -> Result<Self> {
        match &config.identity_pem {
            Some(pem) => {
                let certs = std::fs::read(&pem.cert_chain)?;
                let key = std::fs::read(&pem.private_key)?;
                Self::from_pem(&certs, &key)
            }
            None => Self::from_credential(&config.credential, &config.server_name),
        }
    }
}

/// Loads certificates from PEM-encoded data.
pub fn load_certs_from_pem(pem: &[u8]) -> Result<Vec<CertificateDer<'static>>> {
    let mut certs = Vec::new();
    let mut cursor = io::Cursor::new(pem);
    while let Ok(Some(item)) = rustls_pemfile::read_one(&mut cursor) {
        if let rustls_pemfile::Item::X509Certificate(cert) = item {
            certs.push(cert);
        }
    }

    if certs.is_empty() {
        return Err(TransportError::TlsSetup {
            reason: "no certificates found in PEM".to_string(),
        });
    }

    Ok(certs)
}

/// Loads a PKCS#8 private key from PEM-encoded data.
pub fn load_private_key_from_pem(pem: &[u8]) -> Result<PrivateKeyDer<'static>> {
    let mut cursor = io::Cursor::new(pem);
    while let Ok(Some(item)) = rustls_pemfile::read_one(&mut cursor) {
        if let rustls_pemfile::Item::Pkcs8Key(key) = item {
            return Ok(PrivateKeyDer::Pkcs8(key));
        }
    }

    Err(TransportError::TlsSetup {
        reason: "no private key found in PEM".to_string(),
    })
}

/// Accepts any server certificate chain.
///
/// Handshake signatures are still verified against the presented leaf, so
/// the key-exchange parsing and signature paths keep running.
#[derive(Debug)]
struct AcceptAnyServerCert {
    algorithms: WebPkiSupportedAlgorithms,
}

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.algorithms.supported_schemes()
    }
}

/// Builds TLS client/server pairs wired for fuzzing.
///
/// The configurations are immutable and carry no session state (resumption
/// and the server session cache are disabled), so one factory can serve any
/// number of runs.
pub struct TlsEndpointFactory {
    client_config: Arc<ClientConfig>,
    server_config: Arc<ServerConfig>,
    server_name: ServerName<'static>,
    rng_seed: Vec<u8>,
}

impl std::fmt::Debug for TlsEndpointFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsEndpointFactory")
            .field("server_name", &self.server_name)
            .finish()
    }
}

impl TlsEndpointFactory {
    pub fn new(config: &TlsHandshakeConfig) -> Result<Self> {
        let identity = ServerIdentity::from_config(config)?;
        Self::with_identity(config, identity)
    }

    pub fn with_identity(config: &TlsHandshakeConfig, identity: ServerIdentity) -> Result<Self> {
        let provider = Arc::new(seeded_provider());

        let mut server_config = ServerConfig::builder_with_provider(provider.clone())
            .with_protocol_versions(&[&rustls::version::TLS12])?
            .with_no_client_auth()
            .with_single_cert(identity.cert_chain, identity.private_key)?;
        server_config.session_storage = Arc::new(NoServerSessionStorage {});

        let verifier = Arc::new(AcceptAnyServerCert {
            algorithms: provider.signature_verification_algorithms,
        });
        let mut client_config = ClientConfig::builder_with_provider(provider)
            .with_protocol_versions(&[&rustls::version::TLS12])?
            .dangerous()
            .with_custom_certificate_verifier(verifier)
            .with_no_client_auth();
        client_config.resumption = Resumption::disabled();

        let server_name = ServerName::try_from(config.server_name.clone()).map_err(|_| {
            TransportError::InvalidServerName {
                name: config.server_name.clone(),
            }
        })?;

        tracing::debug!(server_name = %config.server_name, "TLS endpoint factory ready");

        Ok(Self {
            client_config: Arc::new(client_config),
            server_config: Arc::new(server_config),
            server_name,
            rng_seed: config.rng_seed.as_bytes().to_vec(),
        })
    }
}

impl EndpointFactory for TlsEndpointFactory {
    type Client = TlsEndpoint;
    type Server = TlsEndpoint;

    /// Reseeds the engine randomness, then creates the server and the client
    /// (which queues its ClientHello immediately).
    fn build(&self) -> Result<(TlsEndpoint, TlsEndpoint)> {
        HANDSHAKE_ENTROPY.reseed(&self.rng_seed);
        let server = ServerConnection::new(self.server_config.clone())?;
        let client = ClientConnection::new(self.client_config.clone(), self.server_name.clone())?;
        Ok((
            TlsEndpoint::new(Role::Client, client.into()),
            TlsEndpoint::new(Role::Server, server.into()),
        ))
    }
}

/// One side of a `rustls` handshake.
pub struct TlsEndpoint {
    role: Role,
    conn: Connection,
    tracker: HandshakeTracker,
}

impl std::fmt::Debug for TlsEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsEndpoint")
            .field("role", &self.role)
            .field("state", &self.tracker.state())
            .finish()
    }
}

impl TlsEndpoint {
    pub fn new(role: Role, conn: Connection) -> Self {
        Self {
            role,
            conn,
            tracker: HandshakeTracker::new(role),
        }
    }

    /// Whether the engine still considers the handshake in progress.
    pub fn is_handshaking(&self) -> bool {
        self.conn.is_handshaking()
    }

    fn refresh(&mut self) {
        if !self.conn.is_handshaking() {
            let next = if self.conn.wants_write() {
                HandshakeState::FlushBuffers
            } else {
                HandshakeState::HandshakeOver
            };
            self.tracker.advance(next);
        }
    }

    fn write_out(&mut self, outbound: &mut ByteChannel) -> StepOutcome {
        let mut tap = Tap {
            channel: outbound,
            tracker: &mut self.tracker,
        };
        match self.conn.write_tls(&mut tap) {
            Ok(n) => {
                tracing::trace!(role = %self.role, bytes = n, "wrote records");
                self.refresh();
                StepOutcome::Progress
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => StepOutcome::WouldBlockWrite,
            Err(e) => StepOutcome::Fatal(e.into()),
        }
    }

    fn read_in(&mut self, link: ChannelPair<'_>) -> StepOutcome {
        let mut tap = Tap {
            channel: link.inbound,
            tracker: &mut self.tracker,
        };
        match self.conn.read_tls(&mut tap) {
            Ok(0) => return StepOutcome::WouldBlockRead,
            Ok(n) => tracing::trace!(role = %self.role, bytes = n, "read records"),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return StepOutcome::WouldBlockRead,
            Err(e) => return StepOutcome::Fatal(e.into()),
        }

        match self.conn.process_new_packets() {
            Ok(_) => {
                self.refresh();
                StepOutcome::Progress
            }
            Err(e) => {
                tracing::debug!(role = %self.role, error = %e, "handshake aborted");
                // Push the alert out the way a real peer would; its fate
                // does not change the outcome.
                if self.conn.wants_write() {
                    match self.write_out(link.outbound) {
                        StepOutcome::WouldBlockWrite => {
                            tracing::trace!(role = %self.role, "no room for alert");
                        }
                        StepOutcome::Fatal(err) => {
                            tracing::trace!(role = %self.role, error = %err, "alert not sent");
                        }
                        _ => {}
                    }
                }
                StepOutcome::Fatal(e.into())
            }
        }
    }
}

impl HandshakeEndpoint for TlsEndpoint {
    fn role(&self) -> Role {
        self.role
    }

    fn state(&self) -> HandshakeState {
        self.tracker.state()
    }

    /// Writes pending records if there are any, otherwise reads and
    /// processes whatever the peer has queued.
    fn step(&mut self, link: ChannelPair<'_>) -> StepOutcome {
        self.tracker.begin();
        if self.conn.wants_write() {
            return self.write_out(link.outbound);
        }
        if self.conn.wants_read() {
            return self.read_in(link);
        }
        self.refresh();
        StepOutcome::WouldBlockRead
    }
}

/// Channel view that reports every byte it moves to the state tracker.
///
/// A single call moves bytes up to the end of the next observable message
/// at most, so each step exposes the state that message leads to before the
/// next one goes through.
struct Tap<'a> {
    channel: &'a mut ByteChannel,
    tracker: &'a mut HandshakeTracker,
}

impl io::Write for Tap<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let limit = self.tracker.sent_lookahead(buf).unwrap_or(buf.len());
        let n = io::Write::write(self.channel, &buf[..limit])?;
        self.tracker.on_sent(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Read for Tap<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let queued = self.channel.peek(buf.len());
        let limit = self
            .tracker
            .received_lookahead(&queued)
            .unwrap_or(buf.len());
        let n = io::Read::read(self.channel, &mut buf[..limit])?;
        self.tracker.on_received(&buf[..n]);
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Wire;
    use std::sync::{Mutex, MutexGuard};

    /// Factories reseed the process-wide entropy on build; tests that build
    /// endpoints hold this so their draws do not interleave.
    static ENTROPY_LOCK: Mutex<()> = Mutex::new(());

    fn lock_entropy() -> MutexGuard<'static, ()> {
        ENTROPY_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs one pair to completion and returns every byte either side wrote,
    /// in the order it hit the wire.
    fn transcript(factory: &TlsEndpointFactory) -> Vec<u8> {
        let (mut client, mut server) = factory.build().unwrap();
        let mut wire = Wire::default();
        let mut bytes = Vec::new();
        for _ in 0..200 {
            if client.state().is_complete() && server.state().is_complete() {
                return bytes;
            }
            let before = wire.c2s.available();
            assert!(!client.step(wire.link(Role::Client)).is_fatal());
            bytes.extend_from_slice(&wire.c2s.peek(usize::MAX)[before..]);

            let before = wire.s2c.available();
            assert!(!server.step(wire.link(Role::Server)).is_fatal());
            bytes.extend_from_slice(&wire.s2c.peek(usize::MAX)[before..]);
        }
        panic!("handshake did not finish");
    }

    fn handshake(wire: &mut Wire, client: &mut TlsEndpoint, server: &mut TlsEndpoint) {
        for _ in 0..200 {
            if client.state().is_complete() && server.state().is_complete() {
                return;
            }
            let outcome = client.step(wire.link(Role::Client));
            assert!(!outcome.is_fatal(), "client failed: {:?}", outcome);
            let outcome = server.step(wire.link(Role::Server));
            assert!(!outcome.is_fatal(), "server failed: {:?}", outcome);
        }
        panic!(
            "handshake did not finish: client {} server {}",
            client.state(),
            server.state()
        );
    }

    #[test]
    fn test_derived_identity_is_deterministic() {
        let cred = PresharedCredential::default();
        let a = ServerIdentity::from_credential(&cred, "localhost").unwrap();
        let b = ServerIdentity::from_credential(&cred, "localhost").unwrap();
        assert_eq!(a.cert_chain, b.cert_chain);
        assert_eq!(a.private_key.secret_der(), b.private_key.secret_der());
    }

    #[test]
    fn test_derived_identity_depends_on_credential() {
        let a = ServerIdentity::from_credential(&PresharedCredential::default(), "localhost").unwrap();
        let other = PresharedCredential {
            identity: "43".to_string(),
            secret: "galaxy".to_string(),
        };
        let b = ServerIdentity::from_credential(&other, "localhost").unwrap();
        assert_ne!(a.private_key.secret_der(), b.private_key.secret_der());
    }

    #[test]
    fn test_load_certs_rejects_empty_pem() {
        assert!(load_certs_from_pem(b"").is_err());
        assert!(load_private_key_from_pem(b"not pem").is_err());
    }

    #[test]
    fn test_factory_rejects_bad_server_name() {
        let config = TlsHandshakeConfig {
            server_name: "not a valid name!".to_string(),
            ..TlsHandshakeConfig::default()
        };
        assert!(matches!(
            TlsEndpointFactory::new(&config),
            Err(TransportError::InvalidServerName { .. })
        ));
    }

    #[test]
    fn test_endpoints_start_before_hello() {
        let _entropy = lock_entropy();
        let factory = TlsEndpointFactory::new(&TlsHandshakeConfig::default()).unwrap();
        let (client, server) = factory.build().unwrap();
        assert_eq!(client.role(), Role::Client);
        assert_eq!(server.role(), Role::Server);
        assert_eq!(client.state(), HandshakeState::HelloRequest);
        assert_eq!(server.state(), HandshakeState::HelloRequest);
        assert!(client.is_handshaking());
    }

    #[test]
    fn test_client_first_step_sends_hello() {
        let _entropy = lock_entropy();
        let factory = TlsEndpointFactory::new(&TlsHandshakeConfig::default()).unwrap();
        let (mut client, mut server) = factory.build().unwrap();
        let mut wire = Wire::default();

        assert!(matches!(client.step(wire.link(Role::Client)), StepOutcome::Progress));
        assert_eq!(client.state(), HandshakeState::ServerHello);
        assert!(wire.c2s.available() > 0);

        assert!(matches!(server.step(wire.link(Role::Server)), StepOutcome::Progress));
        assert_eq!(server.state(), HandshakeState::ServerHello);
    }

    #[test]
    fn test_server_waits_for_client_hello() {
        let _entropy = lock_entropy();
        let factory = TlsEndpointFactory::new(&TlsHandshakeConfig::default()).unwrap();
        let (_client, mut server) = factory.build().unwrap();
        let mut wire = Wire::default();
        assert!(matches!(
            server.step(wire.link(Role::Server)),
            StepOutcome::WouldBlockRead
        ));
        assert_eq!(server.state(), HandshakeState::ClientHello);
    }

    #[test]
    fn test_full_handshake_completes() {
        let _entropy = lock_entropy();
        let factory = TlsEndpointFactory::new(&TlsHandshakeConfig::default()).unwrap();
        let (mut client, mut server) = factory.build().unwrap();
        let mut wire = Wire::default();
        handshake(&mut wire, &mut client, &mut server);
        assert!(!client.is_handshaking());
        assert!(!server.is_handshaking());
    }

    #[test]
    fn test_server_flight_goes_out_one_message_per_step() {
        let _entropy = lock_entropy();
        let factory = TlsEndpointFactory::new(&TlsHandshakeConfig::default()).unwrap();
        let (mut client, mut server) = factory.build().unwrap();
        let mut wire = Wire::default();

        client.step(wire.link(Role::Client));
        server.step(wire.link(Role::Server));
        assert_eq!(server.state(), HandshakeState::ServerHello);

        let expected = [
            HandshakeState::ServerCertificate,
            HandshakeState::ServerKeyExchange,
            HandshakeState::CertificateRequest,
            HandshakeState::ClientCertificate,
        ];
        for want in expected {
            assert!(matches!(server.step(wire.link(Role::Server)), StepOutcome::Progress));
            assert_eq!(server.state(), want);
        }

        // The client takes the flight in the same units.
        for want in expected {
            assert!(matches!(client.step(wire.link(Role::Client)), StepOutcome::Progress));
            assert_eq!(client.state(), want);
        }
    }

    #[test]
    fn test_transcript_is_byte_identical_across_builds() {
        let _entropy = lock_entropy();
        let factory = TlsEndpointFactory::new(&TlsHandshakeConfig::default()).unwrap();
        let first = transcript(&factory);
        let second = transcript(&factory);
        assert!(!first.is_empty());
        assert_eq!(first, second);

        let reseeded = TlsEndpointFactory::new(&TlsHandshakeConfig {
            rng_seed: "other".to_string(),
            ..TlsHandshakeConfig::default()
        })
        .unwrap();
        assert_ne!(transcript(&reseeded), first);
    }

    #[test]
    fn test_garbage_from_peer_is_fatal() {
        let _entropy = lock_entropy();
        let factory = TlsEndpointFactory::new(&TlsHandshakeConfig::default()).unwrap();
        let (_client, mut server) = factory.build().unwrap();
        let mut wire = Wire::default();
        wire.c2s.write(&[0x41; 64]).unwrap();
        let outcome = server.step(wire.link(Role::Server));
        assert!(outcome.is_fatal(), "expected fatal, got {:?}", outcome);
    }

    #[test]
    fn test_fatal_read_flushes_alert() {
        let _entropy = lock_entropy();
        let factory = TlsEndpointFactory::new(&TlsHandshakeConfig::default()).unwrap();
        let (_client, mut server) = factory.build().unwrap();

        let mut wire = Wire::default();
        wire.c2s.write(&[0x41; 64]).unwrap();
        assert!(server.step(wire.link(Role::Server)).is_fatal());
        assert_eq!(wire.s2c.peek(1), vec![21u8]);

        // No room for the alert does not change the outcome.
        let mut wire = Wire::new(64);
        wire.c2s.write(&[0x41; 64]).unwrap();
        wire.s2c.write(&[0u8; 64]).unwrap();
        let (_client, mut server) = factory.build().unwrap();
        assert!(server.step(wire.link(Role::Server)).is_fatal());
        assert_eq!(wire.s2c.available(), 64);
    }

    #[test]
    fn test_write_blocks_on_full_channel() {
        let _entropy = lock_entropy();
        let factory = TlsEndpointFactory::new(&TlsHandshakeConfig::default()).unwrap();
        let (mut client, _server) = factory.build().unwrap();
        let mut wire = Wire::new(8);
        wire.c2s.write(&[0u8; 8]).unwrap();
        assert!(matches!(
            client.step(wire.link(Role::Client)),
            StepOutcome::WouldBlockWrite
        ));
        assert_eq!(client.state(), HandshakeState::ClientHello);
    }

    #[test]
    fn test_config_fills_missing_fields() {
        let config: TlsHandshakeConfig =
            serde_json::from_str(r#"{ "credential": { "secret": "other" } }"#).unwrap();
        assert_eq!(config.rng_seed, "test");
        assert_eq!(config.credential.identity, "42");
        assert_eq!(config.credential.secret, "other");
        assert!(config.identity_pem.is_none());
    }
}
