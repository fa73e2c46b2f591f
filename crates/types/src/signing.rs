//! Signed-message prefixing and signature phase tags.
//!
//! Agents sign the message hash the way Ethereum wallets sign a 32-byte
//! message, so the digest that signature recovery runs against is:
//!
//! ```text
//! keccak256("\x19Ethereum Signed Message:\n32" || msg_hash)
//! ```
//!
//! The phase tag keys the per-message `signed` set, so the same agent may
//! attest once for transmission and once for execution.

use crate::{Address, Hash};
use serde::{Deserialize, Serialize};

/// Prefix applied before the final hash of every signed message.
pub const ETH_SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Apply the signed-message prefix to a 32-byte hash.
pub fn eth_signed_message_hash(hash: &Hash) -> Hash {
    Hash::from_parts(&[ETH_SIGNED_MESSAGE_PREFIX, hash.as_bytes()])
}

/// Which of the two signature phases an attestation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignaturePhase {
    /// The message was validly proposed on its source chain.
    Transmission,
    /// The message was delivered on its destination chain.
    Execution,
}

impl SignaturePhase {
    /// One-byte tag for this phase.
    pub fn tag(self) -> u8 {
        match self {
            SignaturePhase::Transmission => 0x01,
            SignaturePhase::Execution => 0x02,
        }
    }

    /// Key under which `signer` is recorded in a message's signed set.
    pub fn signer_key(self, signer: &Address) -> Vec<u8> {
        let mut key = Vec::with_capacity(1 + Address::BYTES);
        key.push(self.tag());
        key.extend_from_slice(signer.as_bytes());
        key
    }
}
