//! Deterministic randomness for reproducible handshakes.
//!
//! `rustls` draws randomness from the `secure_random` of its
//! [`CryptoProvider`] and from each key-exchange group, and both must be
//! `'static`. [`HANDSHAKE_ENTROPY`] is the single seeded stream behind both;
//! it is reseeded with the fixed seed at the start of every run so that a
//! given fuzz input always replays the same handshake bytes.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rustls::crypto::{
    ActiveKeyExchange, CryptoProvider, GetRandomFailed, SecureRandom, SharedSecret,
    SupportedKxGroup,
};
use rustls::{NamedGroup, PeerMisbehaved};
use sha2::{Digest, Sha256};
use x25519_dalek::{PublicKey, StaticSecret};

/// Seed used when none is configured.
pub const DEFAULT_SEED: &[u8] = b"test";

/// Process-wide seeded stream handed to the TLS engine.
pub static HANDSHAKE_ENTROPY: SeededRandom = SeededRandom::new();

static SEEDED_X25519: SeededX25519 = SeededX25519 {
    entropy: &HANDSHAKE_ENTROPY,
};

/// A `SecureRandom` backed by a reseedable `StdRng`.
///
/// Not secure in any sense; it exists so that fuzz runs are reproducible.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<Option<StdRng>>,
}

impl SeededRandom {
    pub const fn new() -> Self {
        Self {
            rng: Mutex::new(None),
        }
    }

    /// Restarts the stream from `seed`.
    pub fn reseed(&self, seed: &[u8]) {
        let rng = StdRng::from_seed(derive_seed(seed));
        match self.rng.lock() {
            Ok(mut guard) => *guard = Some(rng),
            Err(poisoned) => *poisoned.into_inner() = Some(rng),
        }
    }

    pub fn fill_bytes(&self, buf: &mut [u8]) -> Result<(), GetRandomFailed> {
        let mut guard = self.rng.lock().map_err(|_| GetRandomFailed)?;
        guard
            .get_or_insert_with(|| StdRng::from_seed(derive_seed(DEFAULT_SEED)))
            .fill_bytes(buf);
        Ok(())
    }
}

impl Default for SeededRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl SecureRandom for SeededRandom {
    fn fill(&self, buf: &mut [u8]) -> Result<(), GetRandomFailed> {
        self.fill_bytes(buf)
    }
}

fn derive_seed(seed: &[u8]) -> [u8; 32] {
    Sha256::digest(seed).into()
}

/// X25519 key exchange whose ephemeral secrets come from a [`SeededRandom`].
#[derive(Debug)]
pub struct SeededX25519 {
    entropy: &'static SeededRandom,
}

impl SupportedKxGroup for SeededX25519 {
    fn start(&self) -> Result<Box<dyn ActiveKeyExchange>, rustls::Error> {
        let mut secret = [0u8; 32];
        self.entropy
            .fill_bytes(&mut secret)
            .map_err(|_| rustls::Error::FailedToGetRandomBytes)?;
        let secret = StaticSecret::from(secret);
        let public = PublicKey::from(&secret);
        Ok(Box::new(X25519Exchange { secret, public }))
    }

    fn name(&self) -> NamedGroup {
        NamedGroup::X25519
    }
}

struct X25519Exchange {
    secret: StaticSecret,
    public: PublicKey,
}

impl ActiveKeyExchange for X25519Exchange {
    fn complete(self: Box<Self>, peer_pub_key: &[u8]) -> Result<SharedSecret, rustls::Error> {
        let peer: [u8; 32] = peer_pub_key
            .try_into()
            .map_err(|_| rustls::Error::from(PeerMisbehaved::InvalidKeyShare))?;
        let shared = self.secret.diffie_hellman(&PublicKey::from(peer));
        if !shared.was_contributory() {
            return Err(PeerMisbehaved::InvalidKeyShare.into());
        }
        Ok(SharedSecret::from(&shared.as_bytes()[..]))
    }

    fn pub_key(&self) -> &[u8] {
        self.public.as_bytes()
    }

    fn group(&self) -> NamedGroup {
        NamedGroup::X25519
    }
}

/// The ring provider with every source of randomness replaced by
/// [`HANDSHAKE_ENTROPY`].
pub fn seeded_provider() -> CryptoProvider {
    CryptoProvider {
        kx_groups: vec![&SEEDED_X25519],
        secure_random: &HANDSHAKE_ENTROPY,
        ..rustls::crypto::ring::default_provider()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reseed_restarts_stream() {
        let rng = SeededRandom::new();
        rng.reseed(b"test");
        let mut a = [0u8; 48];
        rng.fill_bytes(&mut a).unwrap();
        rng.reseed(b"test");
        let mut b = [0u8; 48];
        rng.fill_bytes(&mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let rng = SeededRandom::new();
        rng.reseed(b"test");
        let mut a = [0u8; 32];
        rng.fill_bytes(&mut a).unwrap();
        rng.reseed(b"other");
        let mut b = [0u8; 32];
        rng.fill_bytes(&mut b).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_unseeded_uses_default_seed() {
        let unseeded = SeededRandom::new();
        let mut a = [0u8; 16];
        unseeded.fill_bytes(&mut a).unwrap();

        let seeded = SeededRandom::new();
        seeded.reseed(DEFAULT_SEED);
        let mut b = [0u8; 16];
        seeded.fill_bytes(&mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_stream_advances() {
        let rng = SeededRandom::new();
        let mut a = [0u8; 16];
        let mut b = [0u8; 16];
        rng.fill_bytes(&mut a).unwrap();
        rng.fill_bytes(&mut b).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_x25519_agreement() {
        let kx = SeededX25519 {
            entropy: Box::leak(Box::new(SeededRandom::new())),
        };
        let alice = kx.start().unwrap();
        let bob = kx.start().unwrap();
        let alice_pub = alice.pub_key().to_vec();
        let bob_pub = bob.pub_key().to_vec();
        assert_eq!(alice_pub.len(), 32);

        let s1 = alice.complete(&bob_pub).unwrap();
        let s2 = bob.complete(&alice_pub).unwrap();
        assert_eq!(s1.secret_bytes(), s2.secret_bytes());
    }

    #[test]
    fn test_x25519_rejects_bad_share() {
        let kx = SeededX25519 {
            entropy: Box::leak(Box::new(SeededRandom::new())),
        };
        let short = kx.start().unwrap();
        assert!(short.complete(&[1u8; 31]).is_err());
        let zero = kx.start().unwrap();
        assert!(zero.complete(&[0u8; 32]).is_err());
    }

    #[test]
    fn test_seeded_provider_uses_single_group() {
        let provider = seeded_provider();
        assert_eq!(provider.kx_groups.len(), 1);
        assert_eq!(provider.kx_groups[0].name(), NamedGroup::X25519);
        assert!(!provider.cipher_suites.is_empty());
    }
}
