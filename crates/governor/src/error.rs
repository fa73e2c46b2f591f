//! Governor errors.

use xmsg_core::{CollaboratorError, Role};
use xmsg_types::{Address, ChainId, EncodingError, Hash};

/// Why a governance call or allow-list update was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GovernorError {
    /// The caller lacks the required role.
    #[error("Caller {caller} lacks the {role} role")]
    Unauthorized { caller: Address, role: Role },

    /// The `(chain, contract)` pair is not allow-listed.
    #[error("Origin not allowed: {chain}, key {key}")]
    OriginNotAllowed { chain: ChainId, key: Hash },

    /// An address list and its flag list differ in length.
    #[error("Mismatched lengths: {addresses} addresses, {flags} flags")]
    MismatchedLengths { addresses: usize, flags: usize },

    /// Consensus rate above the denominator.
    #[error("Invalid consensus rate: {0}")]
    InvalidRate(u64),

    /// Allow-list entry with an empty contract.
    #[error("Invalid origin on {0}: empty contract")]
    InvalidOrigin(ChainId),

    /// The call or payload bytes do not decode.
    #[error("Malformed governance data: {0}")]
    Malformed(#[from] EncodingError),

    /// The agent manager rejected the batch.
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}
