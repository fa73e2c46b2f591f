//! Recoverable secp256k1 signatures.
//!
//! Agents sign the prefixed message hash with ECDSA over secp256k1. The
//! consensus engine never receives a public key: it recovers the signer
//! from `(v, r, s)` and the digest, then derives the agent [`Address`].

use crate::{Address, Hash};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Offset added to the recovery id in the `v` byte (Ethereum convention).
const V_OFFSET: u8 = 27;

/// A recoverable signature: 1-byte recovery id plus the `(r, s)` pair.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    /// Recovery id, 27/28 (0/1 is accepted on recovery).
    pub v: u8,
    /// First half of the compact signature.
    pub r: [u8; 32],
    /// Second half of the compact signature.
    pub s: [u8; 32],
}

impl Signature {
    /// Create a signature from its parts.
    pub fn new(v: u8, r: [u8; 32], s: [u8; 32]) -> Self {
        Self { v, r, s }
    }

    /// Create a zero/placeholder signature for testing.
    pub fn zero() -> Self {
        Self::new(0, [0u8; 32], [0u8; 32])
    }

    /// The 64-byte compact `(r, s)` form.
    pub fn compact(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r);
        out[32..].copy_from_slice(&self.s);
        out
    }

    fn recovery_id(&self) -> Result<RecoveryId, CryptoError> {
        let id = match self.v {
            0 | 1 => self.v,
            v if v == V_OFFSET || v == V_OFFSET + 1 => v - V_OFFSET,
            v => return Err(CryptoError::InvalidRecoveryId(v)),
        };
        RecoveryId::from_i32(i32::from(id)).map_err(|_| CryptoError::InvalidRecoveryId(self.v))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Signature(v={}, r={}.., s={}..)",
            self.v,
            &hex::encode(self.r)[..8],
            &hex::encode(self.s)[..8]
        )
    }
}

/// A secp256k1 signing key with its cached public key.
#[derive(Clone)]
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl KeyPair {
    /// Build a keypair from 32 secret bytes (for testing/simulation).
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self, CryptoError> {
        let secret = SecretKey::from_slice(seed).map_err(|_| CryptoError::InvalidSecretKey)?;
        let secp = Secp256k1::signing_only();
        let public = PublicKey::from_secret_key(&secp, &secret);
        Ok(Self { secret, public })
    }

    /// Get the public key.
    pub fn public_key(&self) -> PublicKey {
        self.public
    }

    /// The agent address for this key.
    pub fn address(&self) -> Address {
        address_from_public_key(&self.public)
    }

    /// Sign a 32-byte digest as-is (no further hashing or prefixing).
    pub fn sign_prehashed(&self, digest: &Hash) -> Signature {
        let secp = Secp256k1::signing_only();
        let message = Message::from_digest(digest.to_bytes());
        let (recovery_id, compact) = secp
            .sign_ecdsa_recoverable(&message, &self.secret)
            .serialize_compact();

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&compact[..32]);
        s.copy_from_slice(&compact[32..]);
        // Recovery ids are 0..=3; only 0 and 1 occur for valid curve points.
        Signature::new(V_OFFSET + recovery_id.to_i32() as u8, r, s)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair({})", self.address())
    }
}

/// Derive the Ethereum-style address of a public key.
pub fn address_from_public_key(public: &PublicKey) -> Address {
    let uncompressed = public.serialize_uncompressed();
    let hash = Hash::from_bytes(&uncompressed[1..]);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash.as_bytes()[12..]);
    Address(bytes)
}

/// Recover the address that produced `signature` over `digest`.
pub fn recover_address(digest: &Hash, signature: &Signature) -> Result<Address, CryptoError> {
    let recovery_id = signature.recovery_id()?;
    let recoverable = RecoverableSignature::from_compact(&signature.compact(), recovery_id)
        .map_err(|_| CryptoError::MalformedSignature)?;
    let message = Message::from_digest(digest.to_bytes());
    let secp = Secp256k1::verification_only();
    let public = secp
        .recover_ecdsa(&message, &recoverable)
        .map_err(|_| CryptoError::RecoveryFailed)?;
    Ok(address_from_public_key(&public))
}

/// Errors from key handling and signature recovery.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    /// Secret key bytes are zero or exceed the curve order.
    #[error("Invalid secret key")]
    InvalidSecretKey,

    /// The `v` byte is not a usable recovery id.
    #[error("Invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    /// `(r, s)` does not form a valid signature.
    #[error("Malformed signature")]
    MalformedSignature,

    /// No public key could be recovered.
    #[error("Signature recovery failed")]
    RecoveryFailed,
}
